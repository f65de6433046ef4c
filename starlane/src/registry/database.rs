//! The in-memory registry.
//!
//! [`SystemDatabase`] is assembled from two halves that can be built on
//! separate threads: a [`Galaxy`] (systems, facilities and the sector index)
//! and a [`Catalogue`] (commodities).

use std::collections::HashMap;

use crate::entity::{lookup_key, Commodity, EntityId, Facility, System};
use crate::error::{Constraint, ErrorFilter, Reference, RegistryError};
use crate::geometry::{Positioned, SectorShift};
use crate::schema::{CommodityMessage, FacilityListingMessage, FacilityMessage, SystemMessage};

use super::sectors::SectorIndex;

/// Systems, their facilities and the spatial index over systems.
#[derive(Debug, Clone, Default)]
pub struct Galaxy {
    systems: HashMap<EntityId, System>,
    system_ids: HashMap<String, EntityId>,
    facilities: HashMap<EntityId, Facility>,
    sectors: SectorIndex,
}

impl Galaxy {
    pub fn new(shift: SectorShift) -> Self {
        Self {
            sectors: SectorIndex::new(shift),
            ..Self::default()
        }
    }

    /// Index a system by id, name and sector.
    pub fn register_system(&mut self, mut system: System) -> Result<EntityId, RegistryError> {
        let id = system.id();
        if self.systems.contains_key(&id) {
            return Err(RegistryError::duplicate(Constraint::SystemId, system.name(), id.get()));
        }
        let name_key = system.entity().lookup_key();
        if self.system_ids.contains_key(&name_key) {
            return Err(RegistryError::duplicate(Constraint::SystemName, system.name(), id.get()));
        }

        let sector = self.sectors.key_for(&system.position());
        system.set_sector(sector);
        self.sectors.insert(sector, id);
        self.system_ids.insert(name_key, id);
        self.systems.insert(id, system);
        Ok(id)
    }

    /// Attach a facility to its (already registered) system.
    pub fn register_facility(&mut self, facility: Facility) -> Result<EntityId, RegistryError> {
        let id = facility.id();
        let Some(system) = self.systems.get(&facility.system_id()) else {
            return Err(RegistryError::unknown(
                Reference::System,
                facility.system_id().get(),
                format!("{} ({})", facility.name(), id),
            ));
        };

        if self.facilities.contains_key(&id) {
            return Err(RegistryError::duplicate(
                Constraint::FacilityId,
                facility.display_name(system.name()),
                id.get(),
            ));
        }
        let name_key = facility.entity().lookup_key();
        let clash = system
            .facility_ids()
            .iter()
            .filter_map(|sibling| self.facilities.get(sibling))
            .any(|sibling| sibling.entity().lookup_key() == name_key);
        if clash {
            return Err(RegistryError::duplicate(
                Constraint::FacilityNameInSystem,
                facility.display_name(system.name()),
                id.get(),
            ));
        }

        if let Some(system) = self.systems.get_mut(&facility.system_id()) {
            system.add_facility(id);
        }
        self.facilities.insert(id, facility);
        Ok(id)
    }

    pub fn new_system(&mut self, item: &SystemMessage) -> Result<(), RegistryError> {
        self.register_system(item.to_system()?)?;
        Ok(())
    }

    pub fn new_facility(&mut self, item: &FacilityMessage) -> Result<(), RegistryError> {
        self.register_facility(item.to_facility()?)?;
        Ok(())
    }

    pub fn system(&self, id: EntityId) -> Option<&System> {
        self.systems.get(&id)
    }

    pub fn system_id_for(&self, name: &str) -> Option<EntityId> {
        self.system_ids.get(&lookup_key(name)).copied()
    }

    pub fn facility(&self, id: EntityId) -> Option<&Facility> {
        self.facilities.get(&id)
    }

    pub(crate) fn facility_mut(&mut self, id: EntityId) -> Option<&mut Facility> {
        self.facilities.get_mut(&id)
    }

    pub fn sectors(&self) -> &SectorIndex {
        &self.sectors
    }

    pub fn systems(&self) -> impl Iterator<Item = &System> {
        self.systems.values()
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    pub fn facility_count(&self) -> usize {
        self.facilities.len()
    }

    /// Apply an accepted update to a registered system, moving it between
    /// sector buckets when its cell changes.
    pub(crate) fn update_system(&mut self, id: EntityId, update: System) -> Result<(), RegistryError> {
        let new_sector = self.sectors.key_for(&update.position());
        let Some(system) = self.systems.get_mut(&id) else {
            return Err(RegistryError::unknown(Reference::System, id.get(), "update"));
        };

        system.entity_mut().rename(update.name())?;
        system.absorb(update);

        let old_sector = system.sector();
        if old_sector != Some(new_sector) {
            system.set_sector(new_sector);
            if let Some(old) = old_sector {
                self.sectors.remove(old, id);
            }
            self.sectors.insert(new_sector, id);
            tracing::debug!(system = %id, from = ?old_sector, to = %new_sector, "Moved system between sectors");
        }
        Ok(())
    }

    pub(crate) fn update_facility(&mut self, id: EntityId, update: Facility) -> Result<(), RegistryError> {
        let Some(facility) = self.facilities.get_mut(&id) else {
            return Err(RegistryError::unknown(Reference::Facility, id.get(), "update"));
        };
        facility.entity_mut().rename(update.name())?;
        facility.absorb(update);
        Ok(())
    }
}

/// Commodities indexed by id and name.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    commodities: HashMap<EntityId, Commodity>,
    commodity_ids: HashMap<String, EntityId>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_commodity(&mut self, commodity: Commodity) -> Result<EntityId, RegistryError> {
        let id = commodity.id();
        if self.commodities.contains_key(&id) {
            return Err(RegistryError::duplicate(Constraint::CommodityId, commodity.name(), id.get()));
        }
        let name_key = commodity.entity().lookup_key();
        if self.commodity_ids.contains_key(&name_key) {
            return Err(RegistryError::duplicate(
                Constraint::CommodityName,
                commodity.name(),
                id.get(),
            ));
        }
        self.commodity_ids.insert(name_key, id);
        self.commodities.insert(id, commodity);
        Ok(id)
    }

    pub fn new_commodity(&mut self, item: &CommodityMessage) -> Result<(), RegistryError> {
        self.register_commodity(item.to_commodity()?)?;
        Ok(())
    }

    pub fn commodity(&self, id: EntityId) -> Option<&Commodity> {
        self.commodities.get(&id)
    }

    pub fn commodity_id_for(&self, name: &str) -> Option<EntityId> {
        self.commodity_ids.get(&lookup_key(name)).copied()
    }

    pub fn commodity_count(&self) -> usize {
        self.commodities.len()
    }

    pub(crate) fn update_commodity(
        &mut self,
        id: EntityId,
        update: Commodity,
    ) -> Result<(), RegistryError> {
        let Some(commodity) = self.commodities.get_mut(&id) else {
            return Err(RegistryError::unknown(Reference::Commodity, id.get(), "update"));
        };
        commodity.entity_mut().rename(update.name())?;
        commodity.category = update.category;
        commodity.is_rare = update.is_rare;
        commodity.is_non_marketable = update.is_non_marketable;
        commodity.average_price = update.average_price;
        Ok(())
    }
}

/// Registry of systems, facilities, commodities and listings.
#[derive(Debug, Clone, Default)]
pub struct SystemDatabase {
    pub(crate) galaxy: Galaxy,
    pub(crate) catalogue: Catalogue,
    pub(crate) filter: ErrorFilter,
}

impl SystemDatabase {
    pub fn new(shift: SectorShift, filter: ErrorFilter) -> Self {
        Self::from_parts(Galaxy::new(shift), Catalogue::new(), filter)
    }

    /// Join separately built halves.
    pub fn from_parts(galaxy: Galaxy, catalogue: Catalogue, filter: ErrorFilter) -> Self {
        tracing::info!(
            systems = galaxy.system_count(),
            facilities = galaxy.facility_count(),
            commodities = catalogue.commodity_count(),
            sectors = galaxy.sectors.len(),
            "Built system database"
        );
        Self {
            galaxy,
            catalogue,
            filter,
        }
    }

    pub fn filter(&self) -> &ErrorFilter {
        &self.filter
    }

    pub fn galaxy(&self) -> &Galaxy {
        &self.galaxy
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn register_system(&mut self, system: System) -> Result<EntityId, RegistryError> {
        self.galaxy.register_system(system)
    }

    pub fn register_facility(&mut self, facility: Facility) -> Result<EntityId, RegistryError> {
        self.galaxy.register_facility(facility)
    }

    pub fn register_commodity(&mut self, commodity: Commodity) -> Result<EntityId, RegistryError> {
        self.catalogue.register_commodity(commodity)
    }

    pub fn new_system(&mut self, item: &SystemMessage) -> Result<(), RegistryError> {
        self.galaxy.new_system(item)
    }

    pub fn new_facility(&mut self, item: &FacilityMessage) -> Result<(), RegistryError> {
        self.galaxy.new_facility(item)
    }

    pub fn new_commodity(&mut self, item: &CommodityMessage) -> Result<(), RegistryError> {
        self.catalogue.new_commodity(item)
    }

    /// Replace a facility's listings with a stored snapshot.
    pub fn new_listings(&mut self, item: &FacilityListingMessage) -> Result<(), RegistryError> {
        let facility_id = EntityId::try_from(item.id)?;
        let listings = item
            .listings
            .iter()
            .map(|entry| entry.to_listing())
            .collect::<Result<Vec<_>, _>>()?;
        let Some(facility) = self.galaxy.facility_mut(facility_id) else {
            return Err(RegistryError::unknown(Reference::Facility, item.id, "listings"));
        };
        facility.replace_listings(listings);
        Ok(())
    }

    pub fn get_system_by_id(&self, id: EntityId) -> Option<&System> {
        self.galaxy.system(id)
    }

    /// Case-insensitive lookup by name.
    pub fn get_system(&self, name: &str) -> Option<&System> {
        self.galaxy
            .system_id_for(name)
            .and_then(|id| self.galaxy.system(id))
    }

    pub fn get_facility_by_id(&self, id: EntityId) -> Option<&Facility> {
        self.galaxy.facility(id)
    }

    pub fn get_commodity_by_id(&self, id: EntityId) -> Option<&Commodity> {
        self.catalogue.commodity(id)
    }

    pub fn get_commodity(&self, name: &str) -> Option<&Commodity> {
        self.catalogue
            .commodity_id_for(name)
            .and_then(|id| self.catalogue.commodity(id))
    }

    /// Facilities owned by `system`, in registration order.
    pub fn facilities_of<'a>(&'a self, system: &'a System) -> impl Iterator<Item = &'a Facility> + 'a {
        system
            .facility_ids()
            .iter()
            .filter_map(|id| self.galaxy.facility(*id))
    }

    /// Case-insensitive lookup of a facility within one system.
    pub fn facility_in(&self, system: &System, name: &str) -> Option<&Facility> {
        let wanted = lookup_key(name);
        system
            .facility_ids()
            .iter()
            .filter_map(|id| self.galaxy.facility(*id))
            .find(|facility| facility.entity().lookup_key() == wanted)
    }

    /// The system owning `facility`.
    pub fn system_of(&self, facility: &Facility) -> Option<&System> {
        self.galaxy.system(facility.system_id())
    }

    pub fn systems(&self) -> impl Iterator<Item = &System> {
        self.galaxy.systems()
    }

    pub fn system_count(&self) -> usize {
        self.galaxy.system_count()
    }

    pub fn facility_count(&self) -> usize {
        self.galaxy.facility_count()
    }

    pub fn commodity_count(&self) -> usize {
        self.catalogue.commodity_count()
    }

    /// Number of occupied sectors.
    pub fn sector_count(&self) -> usize {
        self.galaxy.sectors.len()
    }

    pub fn sector_shift(&self) -> SectorShift {
        self.galaxy.sectors.shift()
    }
}
