//! Application-level grouping of nodes into zones, plus per-node
//! installation coordinates.

use std::collections::{BTreeMap, BTreeSet};

use glmesh_wire::Address;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::store::{self, Store};

/// Number of the catch-all zone that stands for every node.
pub const ALL_ZONE: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub name: String,
    pub number: u8,
    #[serde(default)]
    node_addresses: BTreeSet<Address>,
}

impl Zone {
    pub fn new(name: impl Into<String>, number: u8) -> Self {
        Self { name: name.into(), number, node_addresses: BTreeSet::new() }
    }

    pub fn is_all(&self) -> bool {
        self.number == ALL_ZONE
    }

    pub fn node_addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.node_addresses.iter().copied()
    }

    pub fn contains(&self, address: Address) -> bool {
        self.node_addresses.contains(&address)
    }

    pub fn len(&self) -> usize {
        self.node_addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_addresses.is_empty()
    }
}

/// Zones of one network. Each node sits in at most one non-zero zone; the
/// "All" zone is always present and holds no explicit members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStore {
    #[serde(default)]
    zones: Vec<Zone>,
    #[serde(default)]
    node_coordinates: BTreeMap<Address, String>,
}

impl Default for ZoneStore {
    fn default() -> Self {
        Self { zones: vec![Zone::new("All", ALL_ZONE)], node_coordinates: BTreeMap::new() }
    }
}

impl ZoneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(store: &dyn Store) -> Result<Self, StoreError> {
        let Some(mut zones) = store::load_json::<Self>(store)? else {
            return Ok(Self::new());
        };
        zones.normalize();
        Ok(zones)
    }

    pub fn save(&self, store: &dyn Store) -> Result<(), StoreError> {
        store::save_json(store, self)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, number: u8) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.number == number)
    }

    /// Creates an empty zone. Fails for zone 0 and for taken numbers.
    pub fn add_zone(&mut self, name: impl Into<String>, number: u8) -> bool {
        if number == ALL_ZONE || self.zone(number).is_some() {
            return false;
        }
        self.zones.push(Zone::new(name, number));
        true
    }

    /// Deletes a zone; its nodes fall back to belonging only to "All".
    pub fn remove_zone(&mut self, number: u8) -> Option<Zone> {
        if number == ALL_ZONE {
            log::warn!("zones: the All zone cannot be removed");
            return None;
        }
        let index = self.zones.iter().position(|zone| zone.number == number)?;
        Some(self.zones.remove(index))
    }

    pub fn rename_zone(&mut self, number: u8, name: impl Into<String>) -> bool {
        match self.zones.iter_mut().find(|zone| zone.number == number) {
            Some(zone) => {
                zone.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Move `address` into zone `number`, taking it out of any other zone.
    /// Assigning to zone 0 just unassigns.
    pub fn assign(&mut self, number: u8, address: Address) -> bool {
        if !address.is_unicast() {
            return false;
        }
        if number == ALL_ZONE {
            return self.unassign(address);
        }
        if self.zone(number).is_none() {
            return false;
        }
        for zone in self.zones.iter_mut().filter(|zone| zone.number != number) {
            zone.node_addresses.remove(&address);
        }
        self.zones
            .iter_mut()
            .find(|zone| zone.number == number)
            .is_some_and(|zone| zone.node_addresses.insert(address))
    }

    pub fn unassign(&mut self, address: Address) -> bool {
        let mut changed = false;
        for zone in &mut self.zones {
            changed |= zone.node_addresses.remove(&address);
        }
        changed
    }

    /// The non-zero zone `address` belongs to.
    pub fn zone_of(&self, address: Address) -> Option<&Zone> {
        self.zones.iter().find(|zone| !zone.is_all() && zone.contains(address))
    }

    pub fn set_coordinate(&mut self, address: Address, label: impl Into<String>) -> bool {
        if !address.is_unicast() {
            return false;
        }
        self.node_coordinates.insert(address, label.into());
        true
    }

    pub fn coordinate(&self, address: Address) -> Option<&str> {
        self.node_coordinates.get(&address).map(String::as_str)
    }

    pub fn coordinates(&self) -> impl Iterator<Item = (Address, &str)> {
        self.node_coordinates.iter().map(|(address, label)| (*address, label.as_str()))
    }

    /// Drop everything known about a node that left the network.
    pub fn forget_node(&mut self, address: Address) {
        self.unassign(address);
        self.node_coordinates.remove(&address);
    }

    // Restores the invariants on state read from disk: the All zone exists,
    // holds nobody, zone numbers are unique and a node sits in one zone.
    fn normalize(&mut self) {
        let mut seen = BTreeSet::new();
        self.zones.retain(|zone| seen.insert(zone.number));
        let all = self.zones.iter().position(Zone::is_all);
        match all {
            Some(index) => self.zones[index].node_addresses.clear(),
            None => self.zones.insert(0, Zone::new("All", ALL_ZONE)),
        }
        let mut placed = BTreeSet::new();
        for zone in &mut self.zones {
            zone.node_addresses.retain(|address| address.is_unicast() && placed.insert(*address));
        }
        self.node_coordinates.retain(|address, _| address.is_unicast());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(raw: u16) -> Address {
        Address::new(raw)
    }

    #[test]
    fn all_zone_always_present() {
        let mut zones = ZoneStore::new();
        assert!(zones.zone(ALL_ZONE).is_some());
        assert!(zones.remove_zone(ALL_ZONE).is_none());
        assert!(!zones.add_zone("Another all", ALL_ZONE));
    }

    #[test]
    fn membership_is_exclusive() {
        let mut zones = ZoneStore::new();
        zones.add_zone("Kitchen", 1);
        zones.add_zone("Hall", 2);
        let x = addr(0x0031);
        assert!(zones.assign(1, x));
        assert!(zones.assign(2, x));
        assert!(zones.zone(2).is_some_and(|zone| zone.contains(x)));
        assert!(zones.zone(1).is_some_and(|zone| !zone.contains(x)));
        assert_eq!(zones.zone_of(x).map(|zone| zone.number), Some(2));
    }

    #[test]
    fn assign_to_all_unassigns() {
        let mut zones = ZoneStore::new();
        zones.add_zone("Kitchen", 1);
        zones.assign(1, addr(0x0031));
        assert!(zones.assign(ALL_ZONE, addr(0x0031)));
        assert!(zones.zone_of(addr(0x0031)).is_none());
        assert!(zones.zone(ALL_ZONE).is_some_and(Zone::is_empty));
    }

    #[test]
    fn invalid_assignments_are_ignored() {
        let mut zones = ZoneStore::new();
        zones.add_zone("Kitchen", 1);
        assert!(!zones.assign(1, addr(0xC000)));
        assert!(!zones.assign(9, addr(0x0001)));
        assert!(zones.zone(1).is_some_and(Zone::is_empty));
    }

    #[test]
    fn removing_zone_releases_nodes() {
        let mut zones = ZoneStore::new();
        zones.add_zone("Kitchen", 1);
        zones.assign(1, addr(0x0040));
        let removed = zones.remove_zone(1).expect("zone 1");
        assert!(removed.contains(addr(0x0040)));
        assert!(zones.zone_of(addr(0x0040)).is_none());
    }

    #[test]
    fn forget_node_drops_coordinate() {
        let mut zones = ZoneStore::new();
        zones.add_zone("Kitchen", 1);
        zones.assign(1, addr(0x0040));
        zones.set_coordinate(addr(0x0040), "01A3");
        zones.forget_node(addr(0x0040));
        assert!(zones.coordinate(addr(0x0040)).is_none());
        assert!(zones.zone_of(addr(0x0040)).is_none());
    }

    #[test]
    fn document_layout() {
        let mut zones = ZoneStore::new();
        zones.add_zone("Kitchen", 1);
        zones.assign(1, addr(0x0004));
        zones.set_coordinate(addr(0x0004), "02 east wall");
        let json = serde_json::to_value(&zones).expect("serialize");
        assert_eq!(json["zones"][1]["name"], "Kitchen");
        assert_eq!(json["zones"][1]["nodeAddresses"][0], "0004");
        assert_eq!(json["nodeCoordinates"]["0004"], "02 east wall");
    }
}
