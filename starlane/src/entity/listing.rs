//! Per-facility market listings.

use super::id::EntityId;
use super::Timestamped;

/// Supply and demand for one commodity at one facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub commodity_id: EntityId,
    pub supply_units: u32,
    pub supply_credits: u32,
    pub demand_units: u32,
    pub demand_credits: u32,
    pub timestamp_utc: u64,
}

impl Listing {
    pub fn new(commodity_id: EntityId) -> Self {
        Self {
            commodity_id,
            supply_units: 0,
            supply_credits: 0,
            demand_units: 0,
            demand_credits: 0,
            timestamp_utc: 0,
        }
    }

    /// Composite hex key: six digits of facility id, then the commodity id.
    pub fn store_key(&self, facility: EntityId) -> String {
        format!("{:06x}{:04x}", facility.get(), self.commodity_id.get())
    }
}

impl Timestamped for Listing {
    fn timestamp_utc(&self) -> u64 {
        self.timestamp_utc
    }
}
