//! Catalogue entity records.
//!
//! Every record carries a [`DbEntity`] base (validated id and name). Records
//! refer to one another by [`EntityId`] only; the registry resolves those ids.

mod commodity;
mod facility;
mod id;
mod listing;
mod record;
mod system;

pub use commodity::{CategoryId, Commodity};
pub use facility::{Facility, FacilityFeatures};
pub use id::EntityId;
pub use listing::Listing;
pub use record::{DbEntity, EntityError};
pub(crate) use record::lookup_key;
pub use system::System;

/// Records that carry a last-updated stamp in UTC seconds.
///
/// A stamp of zero means the record has never been updated.
pub trait Timestamped {
    fn timestamp_utc(&self) -> u64;

    /// Whether an incoming stamp should replace this one.
    fn is_superseded_by(&self, incoming: u64) -> bool {
        supersedes(incoming, self.timestamp_utc())
    }
}

/// An incoming stamp wins when it is strictly newer, or when nothing
/// has been recorded yet.
#[inline]
pub fn supersedes(incoming: u64, stored: u64) -> bool {
    stored == 0 || incoming > stored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supersedes_newer() {
        assert!(supersedes(200, 100));
    }

    #[test]
    fn test_equal_or_older_does_not_supersede() {
        assert!(!supersedes(100, 100));
        assert!(!supersedes(99, 100));
    }

    #[test]
    fn test_zero_stored_always_superseded() {
        assert!(supersedes(0, 0));
        assert!(supersedes(1, 0));
    }
}
