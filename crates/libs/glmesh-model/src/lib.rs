//! Phone-side state of a lighting mesh: nodes, scenes and zones.
//!
//! The authoritative scene state lives in the Scene Registers of the
//! physical nodes. [`SceneStore`] is a best-effort cache of which elements
//! are known to have stored which scene; invalid mutations are ignored
//! rather than reported. [`ZoneStore`] holds the application-level grouping
//! of nodes, which has no counterpart on the devices at all.
//!
//! Both stores persist as whole JSON snapshots through a [`Store`].

pub mod error;
pub mod node;
pub mod scene;
pub mod store;
pub mod zone;

pub use error::StoreError;
pub use node::Node;
pub use scene::{Scene, SceneStore, DEFAULT_SCENES, DEFAULT_SCENE_ORDER};
pub use store::{FileStore, MemoryStore, Store};
pub use zone::{Zone, ZoneStore, ALL_ZONE};
