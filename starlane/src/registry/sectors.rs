//! Sector buckets of system ids.

use std::collections::HashMap;

use crate::entity::EntityId;
use crate::geometry::{Coordinate, SectorKey, SectorShift};

/// Maps each occupied sector cell to the systems inside it.
#[derive(Debug, Clone, Default)]
pub struct SectorIndex {
    shift: SectorShift,
    buckets: HashMap<SectorKey, Vec<EntityId>>,
}

impl SectorIndex {
    pub fn new(shift: SectorShift) -> Self {
        Self {
            shift,
            buckets: HashMap::new(),
        }
    }

    pub fn shift(&self) -> SectorShift {
        self.shift
    }

    pub fn key_for(&self, position: &Coordinate) -> SectorKey {
        position.sector_key(self.shift)
    }

    /// Add `id` to the bucket for `key`. Already present ids are left in place.
    pub fn insert(&mut self, key: SectorKey, id: EntityId) {
        let bucket = self.buckets.entry(key).or_default();
        if !bucket.contains(&id) {
            bucket.push(id);
        }
    }

    /// Swap-remove `id` from the bucket for `key`, dropping emptied buckets.
    pub fn remove(&mut self, key: SectorKey, id: EntityId) -> bool {
        let Some(bucket) = self.buckets.get_mut(&key) else {
            return false;
        };
        let Some(at) = bucket.iter().position(|member| *member == id) else {
            return false;
        };
        bucket.swap_remove(at);
        if bucket.is_empty() {
            self.buckets.remove(&key);
        }
        true
    }

    pub fn bucket(&self, key: &SectorKey) -> &[EntityId] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Occupied sectors and their members.
    pub fn iter(&self) -> impl Iterator<Item = (&SectorKey, &[EntityId])> {
        self.buckets.iter().map(|(key, ids)| (key, ids.as_slice()))
    }

    /// Number of occupied sectors.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
