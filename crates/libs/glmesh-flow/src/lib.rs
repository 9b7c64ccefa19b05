//! Configuration flows for GL mesh nodes.
//!
//! A [`ConfigurationFlow`] walks a node through an ordered list of
//! [`Task`]s over a [`Transport`], sending one message at a time and
//! matching replies by kind through a [`ResponseTable`]. The
//! [`MessageCorrelator`] does the same for ad-hoc vendor messages with
//! queued follow-ups.
//!
//! Everything runs on one task. Mesh events arrive on a channel and are fed
//! in with `on_event`; no state is shared across threads.
//!
//! ```
//! use glmesh_flow::{Task, TaskSequencer};
//!
//! let mut sequencer = TaskSequencer::with_tasks([Task::default_ttl_get()]);
//! assert!(sequencer.next_task().is_some());
//! assert!(sequencer.next_task().is_none());
//! assert!(sequencer.is_finished());
//! ```
//!
//! [`ResponseTable`]: glmesh_wire::ResponseTable

pub mod correlator;
pub mod error;
pub mod flow;
pub mod scenes;
pub mod sequencer;
pub mod task;
pub mod transport;

pub use correlator::{CorrelatorEvent, MessageCorrelator};
pub use error::{TaskError, TransportError};
pub use flow::{ConfigurationFlow, FlowState, TaskOutcome};
pub use scenes::{apply_outcomes, apply_scene_register};
pub use sequencer::TaskSequencer;
pub use task::{
    scene_delete_tasks, scene_store_tasks, ConfigurationPlan, SkipReason, Target, Task, TaskStatus,
};
pub use transport::{
    Destination, LoopbackTransport, MeshEvent, MeshMessage, MessageHandle, OutboundMessage,
    Transport,
};
