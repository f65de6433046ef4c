//! Update-or-insert of incoming messages.
//!
//! Commodities and systems are matched by name, facilities and listings by
//! id. Existing records only take an update whose timestamp is strictly
//! newer than the stored one (or when nothing was stored); older updates are
//! reported as [`UpdateOutcome::Stale`]. Accepted messages are written back
//! to the supplied table under their id key.

use crate::entity::{lookup_key, EntityId, Timestamped};
use crate::error::{Reference, RegistryError};
use crate::schema::{
    CommodityMessage, FacilityListingMessage, FacilityMessage, Message, SystemMessage,
};
use crate::store::Table;

use super::database::SystemDatabase;

/// What an update did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Inserted,
    Updated,
    /// Older than (or as old as) what is registered; nothing changed.
    Stale,
}

impl SystemDatabase {
    /// Apply any message, writing it to `table` when accepted.
    pub fn register_from_message(
        &mut self,
        message: &Message,
        table: &mut Table,
    ) -> Result<UpdateOutcome, RegistryError> {
        match message {
            Message::Commodity(item) => self.update_commodity(item, table),
            Message::System(item) => self.update_system(item, table),
            Message::Facility(item) => self.update_facility(item, table),
            Message::FacilityListing(item) => self.update_facility_listing(item, table),
        }
    }

    pub fn update_commodity(
        &mut self,
        item: &CommodityMessage,
        table: &mut Table,
    ) -> Result<UpdateOutcome, RegistryError> {
        let outcome = match self.catalogue.commodity_id_for(&item.name) {
            Some(existing) if existing.get() != item.id => {
                return Err(name_collision(&item.name, item.id, existing));
            }
            Some(existing) => {
                self.catalogue
                    .update_commodity(existing, item.to_commodity()?)?;
                UpdateOutcome::Updated
            }
            None => {
                self.catalogue.new_commodity(item)?;
                UpdateOutcome::Inserted
            }
        };
        table.put_message(item)?;
        Ok(outcome)
    }

    pub fn update_system(
        &mut self,
        item: &SystemMessage,
        table: &mut Table,
    ) -> Result<UpdateOutcome, RegistryError> {
        let outcome = match self.galaxy.system_id_for(&item.name) {
            Some(existing) if existing.get() != item.id => {
                return Err(name_collision(&item.name, item.id, existing));
            }
            Some(existing) => {
                let stored = self
                    .galaxy
                    .system(existing)
                    .map(Timestamped::timestamp_utc)
                    .unwrap_or_default();
                if !is_newer(&item.name, item.id, item.timestamp_utc, stored) {
                    return Ok(UpdateOutcome::Stale);
                }
                self.galaxy.update_system(existing, item.to_system()?)?;
                UpdateOutcome::Updated
            }
            None => {
                self.galaxy.new_system(item)?;
                UpdateOutcome::Inserted
            }
        };
        table.put_message(item)?;
        Ok(outcome)
    }

    pub fn update_facility(
        &mut self,
        item: &FacilityMessage,
        table: &mut Table,
    ) -> Result<UpdateOutcome, RegistryError> {
        let id = EntityId::try_from(item.id)?;
        let system_id = EntityId::try_from(item.system_id)?;
        if self.galaxy.system(system_id).is_none() {
            return Err(RegistryError::unknown(
                Reference::System,
                item.system_id,
                format!("{} ({})", item.name, id),
            ));
        }

        let outcome = match self.galaxy.facility(id) {
            Some(existing) => {
                if !is_newer(&item.name, item.id, item.timestamp_utc, existing.timestamp_utc) {
                    return Ok(UpdateOutcome::Stale);
                }
                if existing.system_id() != system_id
                    || existing.entity().lookup_key() != lookup_key(&item.name)
                {
                    let label = self
                        .system_of(existing)
                        .map(|system| existing.display_name(system.name()))
                        .unwrap_or_else(|| existing.name().to_string());
                    return Err(RegistryError::FacilityMoved {
                        name: label,
                        id: item.id,
                    });
                }
                self.galaxy.update_facility(id, item.to_facility()?)?;
                UpdateOutcome::Updated
            }
            None => {
                self.galaxy.new_facility(item)?;
                UpdateOutcome::Inserted
            }
        };
        table.put_message(item)?;
        Ok(outcome)
    }

    /// Merge listings one commodity at a time.
    ///
    /// Entries naming an unregistered commodity go through the error filter
    /// and are skipped when demoted. Entries no newer than the stored listing
    /// are skipped. The facility's full listing set is written back when at
    /// least one entry was applied.
    pub fn update_facility_listing(
        &mut self,
        item: &FacilityListingMessage,
        table: &mut Table,
    ) -> Result<UpdateOutcome, RegistryError> {
        let facility_id = EntityId::try_from(item.id)?;
        let label = match self.galaxy.facility(facility_id) {
            Some(facility) => self
                .system_of(facility)
                .map(|system| facility.display_name(system.name()))
                .unwrap_or_else(|| facility.name().to_string()),
            None => {
                return Err(RegistryError::unknown(
                    Reference::Facility,
                    item.id,
                    "listing",
                ))
            }
        };

        let mut applied = 0;
        for entry in &item.listings {
            let listing = entry.to_listing()?;
            if self.catalogue.commodity(listing.commodity_id).is_none() {
                self.filter.filter(RegistryError::unknown(
                    Reference::Commodity,
                    entry.commodity_id,
                    format!("{} ({})", label, facility_id),
                ))?;
                continue;
            }
            let Some(facility) = self.galaxy.facility_mut(facility_id) else {
                break;
            };
            if let Some(existing) = facility.listing(listing.commodity_id) {
                if !existing.is_superseded_by(listing.timestamp_utc) {
                    continue;
                }
            }
            facility.upsert_listing(listing);
            applied += 1;
        }

        if applied == 0 {
            tracing::debug!(facility = %label, "No listing entries applied");
            return Ok(UpdateOutcome::Stale);
        }
        if let Some(facility) = self.galaxy.facility(facility_id) {
            table.put_message(&FacilityListingMessage::from(facility))?;
        }
        Ok(UpdateOutcome::Updated)
    }
}

fn name_collision(name: &str, id: u32, existing: EntityId) -> RegistryError {
    RegistryError::NameCollision {
        name: name.to_string(),
        id,
        existing: existing.get(),
    }
}

fn is_newer(name: &str, id: u32, incoming: u64, stored: u64) -> bool {
    let newer = crate::entity::supersedes(incoming, stored);
    if !newer {
        tracing::debug!(name, id, incoming, stored, "Stale update");
    }
    newer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorFilter, ErrorKind, FilterPolicy};
    use crate::geometry::{Coordinate, Positioned, SectorShift};
    use crate::log::MemoryLogger;
    use crate::schema::ListingMessage;
    use std::sync::Arc;

    fn system(id: u32, name: &str, x: f64, timestamp_utc: u64) -> SystemMessage {
        SystemMessage {
            id,
            name: name.into(),
            position: Coordinate::new(x, 0.0, 0.0),
            populated: false,
            needs_permit: false,
            security_level: 0,
            government: 0,
            allegiance: 0,
            timestamp_utc,
        }
    }

    fn facility(id: u32, name: &str, system_id: u32, timestamp_utc: u64) -> FacilityMessage {
        FacilityMessage {
            id,
            name: name.into(),
            system_id,
            facility_type: 1,
            features: 0,
            ls_from_star: 10.0,
            government: 0,
            allegiance: 0,
            timestamp_utc,
        }
    }

    fn commodity(id: u32, name: &str) -> CommodityMessage {
        CommodityMessage {
            id,
            name: name.into(),
            category_id: 1,
            is_rare: false,
            is_non_marketable: false,
            average_cr: 100,
        }
    }

    fn entry(commodity_id: u32, supply_units: u32, timestamp_utc: u64) -> ListingMessage {
        ListingMessage {
            commodity_id,
            supply_units,
            supply_credits: 0,
            demand_units: 0,
            demand_credits: 0,
            timestamp_utc,
        }
    }

    fn id(raw: u32) -> EntityId {
        EntityId::try_from(raw).unwrap()
    }

    #[test]
    fn test_system_insert_then_update() {
        let mut sdb = SystemDatabase::default();
        let mut table = Table::in_memory("systems");

        let outcome = sdb.update_system(&system(1, "Sol", 0.0, 100), &mut table).unwrap();
        assert_eq!(outcome, UpdateOutcome::Inserted);

        let outcome = sdb.update_system(&system(1, "SOL", 500.0, 200), &mut table).unwrap();
        assert_eq!(outcome, UpdateOutcome::Updated);

        let sol = sdb.get_system_by_id(id(1)).unwrap();
        assert_eq!(sol.name(), "SOL");
        assert_eq!(sol.position(), Coordinate::new(500.0, 0.0, 0.0));
        assert_eq!(sdb.sector_count(), 1);

        let stored: SystemMessage = table.get_message(1).unwrap().unwrap();
        assert_eq!(stored.timestamp_utc, 200);
    }

    #[test]
    fn test_stale_system_update_is_skipped() {
        let mut sdb = SystemDatabase::default();
        let mut table = Table::in_memory("systems");
        sdb.update_system(&system(1, "Sol", 0.0, 200), &mut table).unwrap();

        for timestamp in [200, 150] {
            let outcome = sdb
                .update_system(&system(1, "Sol", 99.0, timestamp), &mut table)
                .unwrap();
            assert_eq!(outcome, UpdateOutcome::Stale);
        }

        let sol = sdb.get_system("sol").unwrap();
        assert_eq!(sol.position(), Coordinate::default());
        assert_eq!(sol.timestamp_utc, 200);
        let stored: SystemMessage = table.get_message(1).unwrap().unwrap();
        assert_eq!(stored.position, Coordinate::default());
    }

    #[test]
    fn test_never_updated_system_accepts_anything() {
        let mut sdb = SystemDatabase::default();
        let mut table = Table::in_memory("systems");
        sdb.update_system(&system(1, "Sol", 0.0, 0), &mut table).unwrap();
        let outcome = sdb.update_system(&system(1, "Sol", 1.0, 0), &mut table).unwrap();
        assert_eq!(outcome, UpdateOutcome::Updated);
    }

    #[test]
    fn test_system_name_collision_is_conflict() {
        let mut sdb = SystemDatabase::default();
        let mut table = Table::in_memory("systems");
        sdb.update_system(&system(1, "Sol", 0.0, 1), &mut table).unwrap();

        let err = sdb
            .update_system(&system(2, "sol", 0.0, 2), &mut table)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "sol (#2): name collides with #1");
        assert_eq!(table.count(), 1);
    }

    #[test]
    fn test_system_update_relocates_sector() {
        let mut sdb = SystemDatabase::new(SectorShift::default(), ErrorFilter::default());
        let mut table = Table::in_memory("systems");
        sdb.update_system(&system(1, "Sol", 0.0, 1), &mut table).unwrap();
        sdb.update_system(&system(2, "Lave", 5.0, 1), &mut table).unwrap();
        sdb.update_system(&system(1, "Sol", 1000.0, 2), &mut table).unwrap();

        let near = sdb.range_query(&Coordinate::default(), 10.0).unwrap();
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].system.name(), "Lave");

        let far = sdb.range_query(&Coordinate::new(1000.0, 0.0, 0.0), 1.0).unwrap();
        assert_eq!(far[0].system.position().x, 1000.0);
    }

    #[test]
    fn test_commodity_update() {
        let mut sdb = SystemDatabase::default();
        let mut table = Table::in_memory("commodities");
        assert_eq!(
            sdb.update_commodity(&commodity(5, "Tea"), &mut table).unwrap(),
            UpdateOutcome::Inserted
        );
        let mut pricier = commodity(5, "TEA");
        pricier.average_cr = 250;
        assert_eq!(
            sdb.update_commodity(&pricier, &mut table).unwrap(),
            UpdateOutcome::Updated
        );
        assert_eq!(sdb.get_commodity("tea").unwrap().average_price, 250);

        let err = sdb.update_commodity(&commodity(6, "tea"), &mut table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_facility_paths() {
        let mut sdb = SystemDatabase::default();
        let mut systems = Table::in_memory("systems");
        let mut facilities = Table::in_memory("facilities");
        sdb.update_system(&system(1, "Sol", 0.0, 1), &mut systems).unwrap();
        sdb.update_system(&system(2, "Lave", 5.0, 1), &mut systems).unwrap();

        let galileo = facility(10, "Galileo", 1, 100);
        assert_eq!(
            sdb.update_facility(&galileo, &mut facilities).unwrap(),
            UpdateOutcome::Inserted
        );
        assert_eq!(
            sdb.update_facility(&facility(10, "Galileo", 1, 100), &mut facilities)
                .unwrap(),
            UpdateOutcome::Stale
        );

        let mut newer = facility(10, "galileo", 1, 200);
        newer.ls_from_star = 499.0;
        assert_eq!(
            sdb.update_facility(&newer, &mut facilities).unwrap(),
            UpdateOutcome::Updated
        );
        assert_eq!(sdb.get_facility_by_id(id(10)).unwrap().ls_from_star, 499.0);

        let moved = sdb
            .update_facility(&facility(10, "galileo", 2, 300), &mut facilities)
            .unwrap_err();
        assert_eq!(moved.kind(), ErrorKind::Conflict);
        assert_eq!(
            moved.to_string(),
            "Sol/galileo (#10): facility renames and relocations are not supported"
        );

        let renamed = sdb
            .update_facility(&facility(10, "Galilei", 1, 300), &mut facilities)
            .unwrap_err();
        assert_eq!(renamed.kind(), ErrorKind::Conflict);

        let orphan = sdb
            .update_facility(&facility(11, "Nowhere", 9, 1), &mut facilities)
            .unwrap_err();
        assert_eq!(orphan.kind(), ErrorKind::Unknown);
        assert_eq!(facilities.count(), 1);
    }

    fn listing_fixture(policy: FilterPolicy) -> (SystemDatabase, Arc<MemoryLogger>) {
        let sink = Arc::new(MemoryLogger::new());
        let mut sdb = SystemDatabase::new(
            SectorShift::default(),
            ErrorFilter::new(policy, sink.clone()),
        );
        let mut scratch = Table::in_memory("scratch");
        sdb.update_system(&system(1, "Sol", 0.0, 1), &mut scratch).unwrap();
        sdb.update_facility(&facility(10, "Galileo", 1, 1), &mut scratch).unwrap();
        sdb.update_commodity(&commodity(5, "Tea"), &mut scratch).unwrap();
        sdb.update_commodity(&commodity(6, "Gold"), &mut scratch).unwrap();
        (sdb, sink)
    }

    #[test]
    fn test_listing_merge_per_commodity() {
        let (mut sdb, _) = listing_fixture(FilterPolicy::default());
        let mut table = Table::in_memory("listings");

        let first = FacilityListingMessage {
            id: 10,
            listings: vec![entry(5, 10, 100), entry(6, 20, 100)],
        };
        assert_eq!(
            sdb.update_facility_listing(&first, &mut table).unwrap(),
            UpdateOutcome::Updated
        );

        let mixed = FacilityListingMessage {
            id: 10,
            listings: vec![entry(5, 11, 200), entry(6, 99, 50)],
        };
        assert_eq!(
            sdb.update_facility_listing(&mixed, &mut table).unwrap(),
            UpdateOutcome::Updated
        );

        let galileo = sdb.get_facility_by_id(id(10)).unwrap();
        assert_eq!(galileo.listing(id(5)).unwrap().supply_units, 11);
        assert_eq!(galileo.listing(id(6)).unwrap().supply_units, 20);

        let stored: FacilityListingMessage = table.get_message(10).unwrap().unwrap();
        assert_eq!(stored.listings.len(), 2);
        assert_eq!(stored.listings[0].supply_units, 11);
    }

    #[test]
    fn test_listing_all_stale() {
        let (mut sdb, _) = listing_fixture(FilterPolicy::default());
        let mut table = Table::in_memory("listings");
        let message = FacilityListingMessage {
            id: 10,
            listings: vec![entry(5, 10, 100)],
        };
        sdb.update_facility_listing(&message, &mut table).unwrap();
        table.delete(&10u32.to_le_bytes()).unwrap();

        assert_eq!(
            sdb.update_facility_listing(&message, &mut table).unwrap(),
            UpdateOutcome::Stale
        );
        assert_eq!(table.count(), 0);
    }

    #[test]
    fn test_listing_unknown_commodity_demoted() {
        let (mut sdb, sink) = listing_fixture(FilterPolicy {
            show_warnings: true,
            ..FilterPolicy::default()
        });
        let mut table = Table::in_memory("listings");
        let message = FacilityListingMessage {
            id: 10,
            listings: vec![entry(77, 1, 1), entry(5, 2, 1)],
        };

        assert_eq!(
            sdb.update_facility_listing(&message, &mut table).unwrap(),
            UpdateOutcome::Updated
        );
        assert_eq!(sdb.get_facility_by_id(id(10)).unwrap().listing_count(), 1);
        assert_eq!(
            sink.messages(),
            vec!["NOTE: Sol/Galileo (#10): unknown commodity #77".to_string()]
        );
    }

    #[test]
    fn test_listing_unknown_commodity_fatal() {
        let (mut sdb, _) = listing_fixture(FilterPolicy::strict());
        let mut table = Table::in_memory("listings");
        let message = FacilityListingMessage {
            id: 10,
            listings: vec![entry(77, 1, 1)],
        };
        let err = sdb.update_facility_listing(&message, &mut table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(table.count(), 0);
    }

    #[test]
    fn test_listing_unknown_facility() {
        let (mut sdb, _) = listing_fixture(FilterPolicy::default());
        let mut table = Table::in_memory("listings");
        let err = sdb
            .update_facility_listing(
                &FacilityListingMessage {
                    id: 99,
                    listings: vec![],
                },
                &mut table,
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "listing: unknown facility #99");
    }

    #[test]
    fn test_register_from_message_dispatch() {
        let mut sdb = SystemDatabase::default();
        let mut table = Table::in_memory("systems");
        let message = Message::System(system(3, "Diso", 1.0, 1));
        assert_eq!(
            sdb.register_from_message(&message, &mut table).unwrap(),
            UpdateOutcome::Inserted
        );
        assert_eq!(sdb.get_system("diso").unwrap().id(), id(3));
        assert!(table.get(&3u32.to_le_bytes()).unwrap().is_some());
    }
}
