//! Standard configuration and scene messages issued during setup flows.
//!
//! These are encoded and decoded by the mesh stack underneath; this crate
//! only needs their identity and the fields the controller acts on.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// SIG Scene Server.
pub const SCENE_SERVER: ModelId = ModelId::Sig(0x1203);
/// SIG Scene Setup Server.
pub const SCENE_SETUP_SERVER: ModelId = ModelId::Sig(0x1204);

/// Status code meaning success in every Foundation and Scene status.
pub const STATUS_SUCCESS: u8 = 0x00;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelId {
    Sig(u16),
    Vendor { company_id: u16, model_id: u16 },
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sig(id) => write!(f, "{id:04X}"),
            Self::Vendor { company_id, model_id } => write!(f, "{company_id:04X}{model_id:04X}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigRequest {
    CompositionDataGet { page: u8 },
    DefaultTtlGet,
    AppKeyAdd { net_key_index: u16, app_key_index: u16 },
    ModelAppBind { app_key_index: u16 },
    ModelPublicationSet { publish_address: Address, app_key_index: u16, ttl: u8 },
    ModelSubscriptionAdd { group: Address },
    SceneStore { scene: u16 },
    SceneDelete { scene: u16 },
    SceneRegisterGet,
}

impl ConfigRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CompositionDataGet { .. } => "composition-data-get",
            Self::DefaultTtlGet => "default-ttl-get",
            Self::AppKeyAdd { .. } => "app-key-add",
            Self::ModelAppBind { .. } => "model-app-bind",
            Self::ModelPublicationSet { .. } => "model-publication-set",
            Self::ModelSubscriptionAdd { .. } => "model-subscription-add",
            Self::SceneStore { .. } => "scene-store",
            Self::SceneDelete { .. } => "scene-delete",
            Self::SceneRegisterGet => "scene-register-get",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigStatus {
    CompositionData { page: u8 },
    DefaultTtl { ttl: u8 },
    AppKey { status: u8, net_key_index: u16, app_key_index: u16 },
    ModelAppBind { status: u8, app_key_index: u16 },
    ModelPublication { status: u8, publish_address: Address },
    ModelSubscription { status: u8, group: Address },
    /// Scenes currently stored on the element that answered.
    SceneRegister { status: u8, current: u16, scenes: Vec<u16> },
}

impl ConfigStatus {
    /// Explicit status code, for the statuses that carry one.
    pub fn status_code(&self) -> Option<u8> {
        match self {
            Self::CompositionData { .. } | Self::DefaultTtl { .. } => None,
            Self::AppKey { status, .. }
            | Self::ModelAppBind { status, .. }
            | Self::ModelPublication { status, .. }
            | Self::ModelSubscription { status, .. }
            | Self::SceneRegister { status, .. } => Some(*status),
        }
    }
}
