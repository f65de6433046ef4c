//! Star system record.

use crate::geometry::{Coordinate, Positioned, SectorKey};

use super::id::EntityId;
use super::record::DbEntity;
use super::Timestamped;

/// A star system and the ids of the facilities it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct System {
    entity: DbEntity,
    position: Coordinate,
    pub populated: bool,
    pub needs_permit: bool,
    pub security_level: u32,
    pub government: u32,
    pub allegiance: u32,
    pub timestamp_utc: u64,
    facilities: Vec<EntityId>,
    sector: Option<SectorKey>,
}

impl System {
    pub fn new(entity: DbEntity, position: Coordinate) -> Self {
        Self {
            entity,
            position,
            populated: false,
            needs_permit: false,
            security_level: 0,
            government: 0,
            allegiance: 0,
            timestamp_utc: 0,
            facilities: Vec::new(),
            sector: None,
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

    /// Ids of the facilities registered under this system.
    pub fn facility_ids(&self) -> &[EntityId] {
        &self.facilities
    }

    /// Sector the registry has this system bucketed under.
    pub fn sector(&self) -> Option<SectorKey> {
        self.sector
    }

    pub(crate) fn entity_mut(&mut self) -> &mut DbEntity {
        &mut self.entity
    }

    pub(crate) fn set_sector(&mut self, key: SectorKey) {
        self.sector = Some(key);
    }

    pub(crate) fn add_facility(&mut self, id: EntityId) {
        if !self.facilities.contains(&id) {
            self.facilities.push(id);
        }
    }

    /// Copy everything but identity, owned facilities and sector from `other`.
    pub(crate) fn absorb(&mut self, other: System) {
        self.position = other.position;
        self.populated = other.populated;
        self.needs_permit = other.needs_permit;
        self.security_level = other.security_level;
        self.government = other.government;
        self.allegiance = other.allegiance;
        self.timestamp_utc = other.timestamp_utc;
    }
}

impl Positioned for System {
    fn position(&self) -> Coordinate {
        self.position
    }
}

impl Timestamped for System {
    fn timestamp_utc(&self) -> u64 {
        self.timestamp_utc
    }
}
