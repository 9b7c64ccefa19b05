//! Scenes and the phone-side view of each element's Scene Register.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

use glmesh_wire::Address;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::node::Node;
use crate::store::{self, Store};

/// Scene numbers reserved for the built-in modes.
pub const DEFAULT_SCENES: [u16; 4] = [1, 2, 3, 4];

/// Display precedence of the built-in modes: Standard, Eco, Comfort, Display.
pub const DEFAULT_SCENE_ORDER: [u16; 4] = [3, 2, 1, 4];

const DEFAULT_SCENE_NAMES: [(u16, &str); 4] =
    [(3, "Standard"), (2, "Eco"), (1, "Comfort"), (4, "Display")];

/// A numbered scene and the unicast addresses known to have stored it.
///
/// Identity is the scene number alone: two values with the same number are
/// equal and hash alike whatever their name or detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    #[serde(with = "hex_number")]
    number: u16,
    pub name: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    addresses: BTreeSet<Address>,
}

impl Scene {
    pub fn new(number: u16, name: impl Into<String>) -> Self {
        Self { number, name: name.into(), detail: String::new(), addresses: BTreeSet::new() }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn number(&self) -> u16 {
        self.number
    }

    /// Scene number 0 is prohibited on the wire.
    pub fn is_valid(&self) -> bool {
        self.number != 0
    }

    pub fn is_default(&self) -> bool {
        DEFAULT_SCENES.contains(&self.number)
    }

    /// Addresses in ascending order.
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.addresses.iter().copied()
    }

    pub fn contains(&self, address: Address) -> bool {
        self.addresses.contains(&address)
    }

    /// Record `address` as storing this scene. Non-unicast addresses are
    /// ignored. Returns whether the register changed.
    pub fn add(&mut self, address: Address) -> bool {
        if !address.is_unicast() {
            log::debug!("scene {}: ignoring non-unicast {address}", self.number);
            return false;
        }
        self.addresses.insert(address)
    }

    /// Returns whether the register changed.
    pub fn remove(&mut self, address: Address) -> bool {
        self.addresses.remove(&address)
    }
}

impl PartialEq for Scene {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
    }
}

impl Eq for Scene {}

impl Hash for Scene {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.number.hash(state);
    }
}

/// Every scene of one network, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneStore {
    #[serde(default)]
    scenes: Vec<Scene>,
    /// Unix seconds of the last register change.
    #[serde(default)]
    timestamp: u64,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the four built-in modes.
    pub fn with_defaults() -> Self {
        let mut store = Self::new();
        for (number, name) in DEFAULT_SCENE_NAMES {
            store.add(Scene::new(number, name));
        }
        store
    }

    pub fn load(store: &dyn Store) -> Result<Self, StoreError> {
        let Some(mut scenes) = store::load_json::<Self>(store)? else {
            return Ok(Self::new());
        };
        // a hand-edited file must not break the invariants
        let mut seen = BTreeSet::new();
        scenes.scenes.retain(|scene| scene.is_valid() && seen.insert(scene.number));
        for scene in &mut scenes.scenes {
            scene.addresses.retain(|address| address.is_unicast());
        }
        Ok(scenes)
    }

    /// Persist the whole current snapshot.
    pub fn save(&self, store: &dyn Store) -> Result<(), StoreError> {
        store::save_json(store, self)
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn get(&self, number: u16) -> Option<&Scene> {
        self.scenes.iter().find(|scene| scene.number == number)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter()
    }

    /// Adds `scene` unless its number is taken or invalid.
    pub fn add(&mut self, scene: Scene) -> bool {
        if !scene.is_valid() || self.get(scene.number).is_some() {
            return false;
        }
        self.scenes.push(scene);
        true
    }

    /// Drops the scene from the local set only. Nodes keep it in their
    /// Scene Registers until a SceneDelete reaches them.
    pub fn remove(&mut self, number: u16) -> Option<Scene> {
        let index = self.scenes.iter().position(|scene| scene.number == number)?;
        Some(self.scenes.remove(index))
    }

    pub fn rename(&mut self, number: u16, name: impl Into<String>) -> bool {
        match self.scenes.iter_mut().find(|scene| scene.number == number) {
            Some(scene) => {
                scene.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Record that `address` stored scene `number`.
    pub fn register(&mut self, number: u16, address: Address) -> bool {
        let changed = self
            .scenes
            .iter_mut()
            .find(|scene| scene.number == number)
            .is_some_and(|scene| scene.add(address));
        if changed {
            self.touch();
        }
        changed
    }

    /// Record that `address` no longer holds scene `number`.
    pub fn unregister(&mut self, number: u16, address: Address) -> bool {
        let changed = self
            .scenes
            .iter_mut()
            .find(|scene| scene.number == number)
            .is_some_and(|scene| scene.remove(address));
        if changed {
            self.touch();
        }
        changed
    }

    /// Remove `address` from every register, e.g. after the node left the
    /// network. Returns how many scenes changed.
    pub fn forget_address(&mut self, address: Address) -> usize {
        let changed = self
            .scenes
            .iter_mut()
            .map(|scene| scene.remove(address))
            .filter(|removed| *removed)
            .count();
        if changed > 0 {
            self.touch();
        }
        changed
    }

    /// Built-in modes first in display precedence, then the rest in
    /// insertion order.
    pub fn ordered(&self) -> Vec<&Scene> {
        let defaults = DEFAULT_SCENE_ORDER.iter().filter_map(|number| self.get(*number));
        defaults.chain(self.custom_scenes()).collect()
    }

    pub fn default_scenes(&self) -> Vec<&Scene> {
        DEFAULT_SCENE_ORDER.iter().filter_map(|number| self.get(*number)).collect()
    }

    pub fn custom_scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter().filter(|scene| !scene.is_default())
    }

    /// Scenes stored on any element of `node`, in [`Self::ordered`] order.
    pub fn scenes_for_node(&self, node: &Node) -> Vec<&Scene> {
        self.ordered()
            .into_iter()
            .filter(|scene| node.element_addresses().any(|address| scene.contains(address)))
            .collect()
    }

    fn touch(&mut self) {
        self.timestamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    }
}

mod hex_number {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(number: &u16, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{number:04X}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        let raw = String::deserialize(deserializer)?;
        u16::from_str_radix(raw.trim(), 16).map_err(serde::de::Error::custom)
    }
}
