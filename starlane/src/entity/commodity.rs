//! Tradable commodities.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::id::EntityId;
use super::record::DbEntity;

/// Identifier of a commodity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct CategoryId(pub u32);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "category {}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Commodity {
    entity: DbEntity,
    pub category: CategoryId,
    pub is_rare: bool,
    pub is_non_marketable: bool,
    /// Average galactic price in credits.
    pub average_price: u32,
}

impl Commodity {
    pub fn new(entity: DbEntity, category: CategoryId) -> Self {
        Self {
            entity,
            category,
            is_rare: false,
            is_non_marketable: false,
            average_price: 0,
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

    pub(crate) fn entity_mut(&mut self) -> &mut DbEntity {
        &mut self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let gold = Commodity::new(DbEntity::new(42, "Gold").unwrap(), CategoryId(3));
        assert_eq!(gold.id().get(), 42);
        assert_eq!(gold.name(), "Gold");
        assert_eq!(gold.category.to_string(), "category 3");
        assert!(!gold.is_rare);
    }
}
