//! Orbital and surface facilities.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use super::id::EntityId;
use super::listing::Listing;
use super::record::DbEntity;
use super::Timestamped;

/// Bit set of services a facility offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FacilityFeatures(u32);

impl FacilityFeatures {
    pub const NONE: Self = Self(0);
    pub const MARKET: Self = Self(1 << 0);
    pub const BLACK_MARKET: Self = Self(1 << 1);
    pub const COMMODITIES: Self = Self(1 << 2);
    pub const DOCKING: Self = Self(1 << 3);
    pub const FLEET: Self = Self(1 << 4);
    pub const LARGE_PAD: Self = Self(1 << 5);
    pub const MEDIUM_PAD: Self = Self(1 << 6);
    pub const OUTFITTING: Self = Self(1 << 7);
    pub const PLANETARY: Self = Self(1 << 8);
    pub const REARM: Self = Self(1 << 9);
    pub const REFUEL: Self = Self(1 << 10);
    pub const REPAIR: Self = Self(1 << 11);
    pub const SHIPYARD: Self = Self(1 << 12);
    pub const SMALL_PAD: Self = Self(1 << 13);

    const ALL: u32 = (1 << 14) - 1;

    /// Keep only the bits that name a known feature.
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::ALL)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for FacilityFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FacilityFeatures {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for FacilityFeatures {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// A station, outpost or settlement inside a system.
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    entity: DbEntity,
    system_id: EntityId,
    pub facility_type: u32,
    pub features: FacilityFeatures,
    pub ls_from_star: f64,
    pub government: u32,
    pub allegiance: u32,
    pub timestamp_utc: u64,
    listings: BTreeMap<EntityId, Listing>,
}

impl Facility {
    pub fn new(entity: DbEntity, system_id: EntityId) -> Self {
        Self {
            entity,
            system_id,
            facility_type: 0,
            features: FacilityFeatures::NONE,
            ls_from_star: 0.0,
            government: 0,
            allegiance: 0,
            timestamp_utc: 0,
            listings: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.entity.id()
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.entity.name()
    }

    pub fn entity(&self) -> &DbEntity {
        &self.entity
    }

    /// Id of the owning system.
    #[inline]
    pub fn system_id(&self) -> EntityId {
        self.system_id
    }

    /// Whether the facility offers every feature in `mask`.
    ///
    /// An empty mask asks for a facility with no features at all.
    pub fn has_features(&self, mask: FacilityFeatures) -> bool {
        if mask.is_empty() {
            self.features.is_empty()
        } else {
            self.features.contains(mask)
        }
    }

    /// Whether a ship needing a `size` pad can dock. Larger pads serve
    /// smaller ships; anything other than a single pad size is rejected.
    pub fn supports_pad_size(&self, size: FacilityFeatures) -> bool {
        let acceptable = match size {
            FacilityFeatures::LARGE_PAD => FacilityFeatures::LARGE_PAD,
            FacilityFeatures::MEDIUM_PAD => {
                FacilityFeatures::MEDIUM_PAD | FacilityFeatures::LARGE_PAD
            }
            FacilityFeatures::SMALL_PAD => {
                FacilityFeatures::SMALL_PAD
                    | FacilityFeatures::MEDIUM_PAD
                    | FacilityFeatures::LARGE_PAD
            }
            _ => return false,
        };
        self.features.intersects(acceptable)
    }

    /// Has a market or has ever reported a listing.
    pub fn is_trading(&self) -> bool {
        self.has_features(FacilityFeatures::MARKET) || !self.listings.is_empty()
    }

    /// `SYSTEM/FACILITY` label given the owning system's name.
    pub fn display_name(&self, system_name: &str) -> String {
        format!("{}/{}", system_name, self.name())
    }

    pub fn listing(&self, commodity: EntityId) -> Option<&Listing> {
        self.listings.get(&commodity)
    }

    /// Listings ordered by commodity id.
    pub fn listings(&self) -> impl Iterator<Item = &Listing> {
        self.listings.values()
    }

    pub fn listing_count(&self) -> usize {
        self.listings.len()
    }

    pub(crate) fn entity_mut(&mut self) -> &mut DbEntity {
        &mut self.entity
    }

    pub(crate) fn replace_listings(&mut self, listings: impl IntoIterator<Item = Listing>) {
        self.listings = listings
            .into_iter()
            .map(|listing| (listing.commodity_id, listing))
            .collect();
    }

    pub(crate) fn upsert_listing(&mut self, listing: Listing) {
        self.listings.insert(listing.commodity_id, listing);
    }

    /// Copy the mutable attributes of `other`; identity, owner and listings stay.
    pub(crate) fn absorb(&mut self, other: Facility) {
        self.facility_type = other.facility_type;
        self.features = other.features;
        self.ls_from_star = other.ls_from_star;
        self.government = other.government;
        self.allegiance = other.allegiance;
        self.timestamp_utc = other.timestamp_utc;
    }
}

impl Timestamped for Facility {
    fn timestamp_utc(&self) -> u64 {
        self.timestamp_utc
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}
