//! Configuration tasks: one outbound message, where it goes, and how it
//! ended.

use core::fmt;

use glmesh_model::{Node, Scene};
use glmesh_wire::config::{SCENE_SERVER, SCENE_SETUP_SERVER, STATUS_SUCCESS};
use glmesh_wire::{Address, ConfigRequest, ModelId, VendorMessage};

use crate::error::TaskError;
use crate::transport::{Destination, OutboundMessage};

/// Where a task is sent, relative to the node being configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// The primary element.
    Node,
    /// Element at `offset` from the primary address.
    Element(u8),
    Model { element: u8, model: ModelId },
    Group(Address),
}

impl Target {
    /// The concrete destination on `node`, or `None` when the node has no
    /// such element.
    pub fn resolve(&self, node: &Node) -> Option<Destination> {
        match *self {
            Self::Node => node.element(0).map(Destination::Element),
            Self::Element(offset) => node.element(offset).map(Destination::Element),
            Self::Model { element, model } => {
                node.element(element).map(|element| Destination::Model { element, model })
            }
            Self::Group(address) => Some(Destination::Group(address)),
        }
    }

    /// Element offset the target refers to; the primary element for
    /// [`Target::Node`] and groups.
    pub fn element_offset(&self) -> u8 {
        match self {
            Self::Element(offset) | Self::Model { element: offset, .. } => *offset,
            Self::Node | Self::Group(_) => 0,
        }
    }
}

/// Why a task was not sent. Recorded as [`TaskStatus::Skipped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("node does not know network key {0}")]
    UnknownNetKey(u16),
    #[error("node does not know application key {0}")]
    UnknownAppKey(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub message: OutboundMessage,
    pub target: Target,
}

impl Task {
    pub fn new(message: impl Into<OutboundMessage>, target: Target) -> Self {
        Self { message: message.into(), target }
    }

    pub fn vendor(message: VendorMessage, target: Target) -> Self {
        Self::new(message, target)
    }

    pub fn composition_data_get(page: u8) -> Self {
        Self::new(ConfigRequest::CompositionDataGet { page }, Target::Node)
    }

    pub fn default_ttl_get() -> Self {
        Self::new(ConfigRequest::DefaultTtlGet, Target::Node)
    }

    pub fn app_key_add(net_key_index: u16, app_key_index: u16) -> Self {
        Self::new(ConfigRequest::AppKeyAdd { net_key_index, app_key_index }, Target::Node)
    }

    pub fn bind(app_key_index: u16, element: u8, model: ModelId) -> Self {
        Self::new(ConfigRequest::ModelAppBind { app_key_index }, Target::Model { element, model })
    }

    pub fn publish(
        element: u8,
        model: ModelId,
        publish_address: Address,
        app_key_index: u16,
        ttl: u8,
    ) -> Self {
        Self::new(
            ConfigRequest::ModelPublicationSet { publish_address, app_key_index, ttl },
            Target::Model { element, model },
        )
    }

    pub fn subscribe(element: u8, model: ModelId, group: Address) -> Self {
        Self::new(ConfigRequest::ModelSubscriptionAdd { group }, Target::Model { element, model })
    }

    pub fn scene_store(scene: u16, element: u8) -> Self {
        Self::new(
            ConfigRequest::SceneStore { scene },
            Target::Model { element, model: SCENE_SETUP_SERVER },
        )
    }

    pub fn scene_delete(scene: u16, element: u8) -> Self {
        Self::new(
            ConfigRequest::SceneDelete { scene },
            Target::Model { element, model: SCENE_SETUP_SERVER },
        )
    }

    pub fn scene_register_get(element: u8) -> Self {
        Self::new(ConfigRequest::SceneRegisterGet, Target::Model { element, model: SCENE_SERVER })
    }

    pub fn name(&self) -> &'static str {
        self.message.name()
    }

    /// The element address this task concerns on `node`.
    pub fn element_address(&self, node: &Node) -> Option<Address> {
        node.element(self.target.element_offset())
    }

    /// Checks the task's key prerequisites against what `node` is known to
    /// hold. A task that would certainly be rejected is skipped instead.
    pub fn skip_reason(&self, node: &Node) -> Option<SkipReason> {
        let OutboundMessage::Config(request) = &self.message else {
            return None;
        };
        match *request {
            ConfigRequest::AppKeyAdd { net_key_index, .. }
                if !node.knows_net_key(net_key_index) =>
            {
                Some(SkipReason::UnknownNetKey(net_key_index))
            }
            ConfigRequest::ModelAppBind { app_key_index }
            | ConfigRequest::ModelPublicationSet { app_key_index, .. }
                if !node.knows_app_key(app_key_index) =>
            {
                Some(SkipReason::UnknownAppKey(app_key_index))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {:?}", self.name(), self.target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Success,
    Skipped,
    Failed(TaskError),
}

impl TaskStatus {
    /// Maps a status code from a reply: 0 is success, anything else a
    /// failure carrying the code.
    pub fn result_of(code: u8) -> Self {
        if code == STATUS_SUCCESS {
            Self::Success
        } else {
            Self::Failed(TaskError::Status(code))
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Success | Self::Skipped | Self::Failed(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// What a freshly provisioned node needs before it is usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationPlan {
    pub net_key_index: u16,
    pub app_key_index: u16,
    /// Models to bind to the application key, by element offset.
    pub models: Vec<(u8, ModelId)>,
    /// Group every listed model subscribes to.
    pub group: Option<Address>,
    /// Publication address set on every listed model.
    pub publish: Option<Address>,
    pub ttl: u8,
}

impl ConfigurationPlan {
    pub fn new(net_key_index: u16, app_key_index: u16) -> Self {
        Self {
            net_key_index,
            app_key_index,
            models: Vec::new(),
            group: None,
            publish: None,
            ttl: 5,
        }
    }

    pub fn with_model(mut self, element: u8, model: ModelId) -> Self {
        self.models.push((element, model));
        self
    }

    pub fn with_group(mut self, group: Address) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_publication(mut self, address: Address) -> Self {
        self.publish = Some(address);
        self
    }

    /// Composition data and default TTL first, then the application key,
    /// then per model: bind, subscription and publication.
    pub fn tasks(&self) -> Vec<Task> {
        let mut tasks = vec![
            Task::composition_data_get(0),
            Task::default_ttl_get(),
            Task::app_key_add(self.net_key_index, self.app_key_index),
        ];
        for &(element, model) in &self.models {
            tasks.push(Task::bind(self.app_key_index, element, model));
            if let Some(group) = self.group {
                tasks.push(Task::subscribe(element, model, group));
            }
            if let Some(address) = self.publish {
                tasks.push(Task::publish(element, model, address, self.app_key_index, self.ttl));
            }
        }
        tasks
    }
}

/// Store scene `number` on every element of `node`.
pub fn scene_store_tasks(number: u16, node: &Node) -> Vec<Task> {
    (0..node.element_count).map(|element| Task::scene_store(number, element)).collect()
}

/// Delete `scene` from each element of `node` that is known to hold it.
pub fn scene_delete_tasks(scene: &Scene, node: &Node) -> Vec<Task> {
    (0..node.element_count)
        .filter(|offset| node.element(*offset).is_some_and(|address| scene.contains(address)))
        .map(|element| Task::scene_delete(scene.number(), element))
        .collect()
}
