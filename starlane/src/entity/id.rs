//! Entity identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

use super::record::EntityError;

/// Identifier of a catalogue record, in `1..=u32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct EntityId(NonZeroU32);

impl EntityId {
    /// Validate an id from a wider integer.
    pub fn new(raw: i64) -> Result<Self, EntityError> {
        u32::try_from(raw)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(EntityError::InvalidId(raw))
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Little-endian bytes used as the store key.
    #[inline]
    pub const fn to_key(self) -> [u8; 4] {
        self.0.get().to_le_bytes()
    }
}

impl TryFrom<u32> for EntityId {
    type Error = EntityError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::new(i64::from(raw))
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> u32 {
        id.get()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
