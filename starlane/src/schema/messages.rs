//! Typed schema messages.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entity::{
    CategoryId, Commodity, DbEntity, EntityError, EntityId, Facility, FacilityFeatures, Listing,
    System, Timestamped,
};
use crate::geometry::{Coordinate, Positioned};

use super::codec::{self, CodecError};

/// The record type a container carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    Commodity,
    System,
    Facility,
    FacilityListing,
}

impl MessageKind {
    /// Numeric code stored in container headers.
    pub const fn code(self) -> u32 {
        match self {
            MessageKind::Commodity => 1,
            MessageKind::System => 2,
            MessageKind::Facility => 3,
            MessageKind::FacilityListing => 4,
        }
    }

    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(MessageKind::Commodity),
            2 => Some(MessageKind::System),
            3 => Some(MessageKind::Facility),
            4 => Some(MessageKind::FacilityListing),
            _ => None,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::Commodity => "commodity",
            MessageKind::System => "system",
            MessageKind::Facility => "facility",
            MessageKind::FacilityListing => "facility listing",
        };
        f.write_str(name)
    }
}

/// A message type that can be stored under its id and carried in a container.
pub trait SchemaMessage: Serialize + DeserializeOwned + Sized {
    const KIND: MessageKind;

    /// Id the message is keyed under in its table.
    fn id(&self) -> u32;

    fn into_message(self) -> Message;

    /// Store key: the id as 4 little-endian bytes.
    fn key(&self) -> [u8; 4] {
        self.id().to_le_bytes()
    }

    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommodityMessage {
    pub id: u32,
    pub name: String,
    pub category_id: u32,
    pub is_rare: bool,
    pub is_non_marketable: bool,
    pub average_cr: u32,
}

impl CommodityMessage {
    pub fn to_commodity(&self) -> Result<Commodity, EntityError> {
        let mut commodity = Commodity::new(
            DbEntity::new(i64::from(self.id), &self.name)?,
            CategoryId(self.category_id),
        );
        commodity.is_rare = self.is_rare;
        commodity.is_non_marketable = self.is_non_marketable;
        commodity.average_price = self.average_cr;
        Ok(commodity)
    }
}

impl From<&Commodity> for CommodityMessage {
    fn from(commodity: &Commodity) -> Self {
        Self {
            id: commodity.id().get(),
            name: commodity.name().to_string(),
            category_id: commodity.category.0,
            is_rare: commodity.is_rare,
            is_non_marketable: commodity.is_non_marketable,
            average_cr: commodity.average_price,
        }
    }
}

impl SchemaMessage for CommodityMessage {
    const KIND: MessageKind = MessageKind::Commodity;

    fn id(&self) -> u32 {
        self.id
    }

    fn into_message(self) -> Message {
        Message::Commodity(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMessage {
    pub id: u32,
    pub name: String,
    pub position: Coordinate,
    pub populated: bool,
    pub needs_permit: bool,
    pub security_level: u32,
    pub government: u32,
    pub allegiance: u32,
    pub timestamp_utc: u64,
}

impl SystemMessage {
    pub fn to_system(&self) -> Result<System, EntityError> {
        let mut system = System::new(DbEntity::new(i64::from(self.id), &self.name)?, self.position);
        system.populated = self.populated;
        system.needs_permit = self.needs_permit;
        system.security_level = self.security_level;
        system.government = self.government;
        system.allegiance = self.allegiance;
        system.timestamp_utc = self.timestamp_utc;
        Ok(system)
    }
}

impl From<&System> for SystemMessage {
    fn from(system: &System) -> Self {
        Self {
            id: system.id().get(),
            name: system.name().to_string(),
            position: system.position(),
            populated: system.populated,
            needs_permit: system.needs_permit,
            security_level: system.security_level,
            government: system.government,
            allegiance: system.allegiance,
            timestamp_utc: system.timestamp_utc,
        }
    }
}

impl Timestamped for SystemMessage {
    fn timestamp_utc(&self) -> u64 {
        self.timestamp_utc
    }
}

impl SchemaMessage for SystemMessage {
    const KIND: MessageKind = MessageKind::System;

    fn id(&self) -> u32 {
        self.id
    }

    fn into_message(self) -> Message {
        Message::System(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityMessage {
    pub id: u32,
    pub name: String,
    pub system_id: u32,
    pub facility_type: u32,
    pub features: u32,
    pub ls_from_star: f64,
    pub government: u32,
    pub allegiance: u32,
    pub timestamp_utc: u64,
}

impl FacilityMessage {
    /// Build the facility record. The owning system is not checked here.
    pub fn to_facility(&self) -> Result<Facility, EntityError> {
        let entity = DbEntity::new(i64::from(self.id), &self.name)?;
        let mut facility = Facility::new(entity, EntityId::try_from(self.system_id)?);
        facility.facility_type = self.facility_type;
        facility.features = FacilityFeatures::from_bits_truncate(self.features);
        facility.ls_from_star = self.ls_from_star;
        facility.government = self.government;
        facility.allegiance = self.allegiance;
        facility.timestamp_utc = self.timestamp_utc;
        Ok(facility)
    }
}

impl From<&Facility> for FacilityMessage {
    fn from(facility: &Facility) -> Self {
        Self {
            id: facility.id().get(),
            name: facility.name().to_string(),
            system_id: facility.system_id().get(),
            facility_type: facility.facility_type,
            features: facility.features.bits(),
            ls_from_star: facility.ls_from_star,
            government: facility.government,
            allegiance: facility.allegiance,
            timestamp_utc: facility.timestamp_utc,
        }
    }
}

impl Timestamped for FacilityMessage {
    fn timestamp_utc(&self) -> u64 {
        self.timestamp_utc
    }
}

impl SchemaMessage for FacilityMessage {
    const KIND: MessageKind = MessageKind::Facility;

    fn id(&self) -> u32 {
        self.id
    }

    fn into_message(self) -> Message {
        Message::Facility(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingMessage {
    pub commodity_id: u32,
    pub supply_units: u32,
    pub supply_credits: u32,
    pub demand_units: u32,
    pub demand_credits: u32,
    pub timestamp_utc: u64,
}

impl ListingMessage {
    pub fn to_listing(&self) -> Result<Listing, EntityError> {
        Ok(Listing {
            commodity_id: EntityId::try_from(self.commodity_id)?,
            supply_units: self.supply_units,
            supply_credits: self.supply_credits,
            demand_units: self.demand_units,
            demand_credits: self.demand_credits,
            timestamp_utc: self.timestamp_utc,
        })
    }
}

impl From<&Listing> for ListingMessage {
    fn from(listing: &Listing) -> Self {
        Self {
            commodity_id: listing.commodity_id.get(),
            supply_units: listing.supply_units,
            supply_credits: listing.supply_credits,
            demand_units: listing.demand_units,
            demand_credits: listing.demand_credits,
            timestamp_utc: listing.timestamp_utc,
        }
    }
}

impl Timestamped for ListingMessage {
    fn timestamp_utc(&self) -> u64 {
        self.timestamp_utc
    }
}

/// Every listing known for one facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityListingMessage {
    /// Facility id.
    pub id: u32,
    pub listings: Vec<ListingMessage>,
}

impl From<&Facility> for FacilityListingMessage {
    fn from(facility: &Facility) -> Self {
        Self {
            id: facility.id().get(),
            listings: facility.listings().map(ListingMessage::from).collect(),
        }
    }
}

impl SchemaMessage for FacilityListingMessage {
    const KIND: MessageKind = MessageKind::FacilityListing;

    fn id(&self) -> u32 {
        self.id
    }

    fn into_message(self) -> Message {
        Message::FacilityListing(self)
    }
}

/// Any decoded schema message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Commodity(CommodityMessage),
    System(SystemMessage),
    Facility(FacilityMessage),
    FacilityListing(FacilityListingMessage),
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Commodity(_) => MessageKind::Commodity,
            Message::System(_) => MessageKind::System,
            Message::Facility(_) => MessageKind::Facility,
            Message::FacilityListing(_) => MessageKind::FacilityListing,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            Message::Commodity(m) => m.id,
            Message::System(m) => m.id,
            Message::Facility(m) => m.id,
            Message::FacilityListing(m) => m.id,
        }
    }

    /// Decode a record of a known kind.
    pub fn decode(kind: MessageKind, bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(match kind {
            MessageKind::Commodity => Message::Commodity(codec::decode(bytes)?),
            MessageKind::System => Message::System(codec::decode(bytes)?),
            MessageKind::Facility => Message::Facility(codec::decode(bytes)?),
            MessageKind::FacilityListing => Message::FacilityListing(codec::decode(bytes)?),
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            Message::Commodity(m) => m.encode(),
            Message::System(m) => m.encode(),
            Message::Facility(m) => m.encode(),
            Message::FacilityListing(m) => m.encode(),
        }
    }
}
