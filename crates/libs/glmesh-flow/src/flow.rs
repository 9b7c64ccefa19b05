//! Drives a task sequence against one node, one message in flight at a
//! time.

use std::sync::Arc;

use glmesh_model::Node;
use glmesh_wire::{Address, ConfigRequest, ConfigStatus, ResponseKind, ResponseTable};
use tokio::sync::mpsc;

use crate::error::{TaskError, TransportError};
use crate::sequencer::TaskSequencer;
use crate::task::{Task, TaskStatus};
use crate::transport::{
    Destination, MeshEvent, MeshMessage, MessageHandle, OutboundMessage, Transport,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// Not started yet.
    Idle,
    /// Waiting for the reply to the current task.
    Awaiting { handle: MessageHandle, expected: ResponseKind },
    Completed,
    /// Stopped after a transport failure; later tasks stay pending.
    Aborted(TransportError),
}

/// How one task ended, with the reply that ended it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub task: Task,
    pub status: TaskStatus,
    pub response: Option<MeshMessage>,
    pub source: Option<Address>,
}

/// Sends each task of a [`TaskSequencer`] to `node` and waits for its
/// reply before sending the next.
///
/// Tasks whose key prerequisites the node lacks are skipped. A non-zero
/// status in a reply fails the task and the flow continues; a transport
/// failure fails the task and aborts the flow.
pub struct ConfigurationFlow {
    transport: Arc<dyn Transport>,
    responses: Arc<ResponseTable>,
    node: Node,
    sequencer: TaskSequencer,
    state: FlowState,
    outcomes: Vec<TaskOutcome>,
}

impl ConfigurationFlow {
    pub fn new(
        transport: Arc<dyn Transport>,
        responses: Arc<ResponseTable>,
        node: Node,
        tasks: impl IntoIterator<Item = Task>,
    ) -> Self {
        Self {
            transport,
            responses,
            node,
            sequencer: TaskSequencer::with_tasks(tasks),
            state: FlowState::Idle,
            outcomes: Vec::new(),
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn into_node(self) -> Node {
        self.node
    }

    pub fn sequencer(&self) -> &TaskSequencer {
        &self.sequencer
    }

    pub fn outcomes(&self) -> &[TaskOutcome] {
        &self.outcomes
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, FlowState::Completed | FlowState::Aborted(_))
    }

    /// Queue another task. Refused once the flow has finished.
    pub fn append(&mut self, task: Task) -> bool {
        !self.is_done() && self.sequencer.append(task)
    }

    /// Send the first task. Does nothing unless the flow is idle.
    pub async fn start(&mut self) {
        if self.state != FlowState::Idle {
            log::debug!("flow {}: already started", self.node.primary);
            return;
        }
        log::info!("flow {}: starting {} tasks", self.node.primary, self.sequencer.len());
        self.dispatch().await;
    }

    /// Feed one mesh event. Replies from elements the current task did not
    /// address, replies of the wrong kind and failures of other sends are
    /// ignored.
    pub async fn on_event(&mut self, event: &MeshEvent) {
        let FlowState::Awaiting { handle, expected } = self.state else {
            return;
        };
        match event {
            MeshEvent::Received { message, source, .. } => {
                if !self.answers_current(*source) || message.response_kind() != Some(expected) {
                    return;
                }
                let status =
                    message.status_code().map_or(TaskStatus::Success, TaskStatus::result_of);
                if status.is_success() {
                    self.learn(message);
                }
                self.finish(status, Some(message.clone()), Some(*source));
                self.dispatch().await;
            }
            MeshEvent::SendFailed { handle: failed, error, .. } if *failed == handle => {
                log::warn!("flow {}: {handle} failed: {error}", self.node.primary);
                self.abort(error.clone());
            }
            _ => {}
        }
    }

    /// Start and feed events from `events` until the flow is done or the
    /// channel closes.
    pub async fn run(&mut self, events: &mut mpsc::UnboundedReceiver<MeshEvent>) {
        self.start().await;
        while !self.is_done() {
            let Some(event) = events.recv().await else {
                log::warn!("flow {}: event stream closed", self.node.primary);
                self.abort(TransportError::BearerClosed);
                return;
            };
            self.on_event(&event).await;
        }
    }

    // Sends tasks until one needs a reply, the list runs out, or the
    // transport refuses a send.
    async fn dispatch(&mut self) {
        loop {
            let Some(task) = self.sequencer.next_task().cloned() else {
                log::info!("flow {}: completed", self.node.primary);
                self.state = FlowState::Completed;
                return;
            };
            if let Some(reason) = task.skip_reason(&self.node) {
                log::info!("flow {}: skipping {task}: {reason}", self.node.primary);
                self.finish(TaskStatus::Skipped, None, None);
                continue;
            }
            let Some(destination) = task.target.resolve(&self.node) else {
                log::warn!("flow {}: {task} has no destination", self.node.primary);
                let error = TaskError::NoSuchElement(task.target.element_offset());
                self.finish(TaskStatus::Failed(error), None, None);
                continue;
            };
            let expected = task.message.expected_response(&self.responses);
            match self.transport.send(&task.message, destination).await {
                Ok(handle) => match expected {
                    Some(expected) => {
                        log::debug!(
                            "flow {}: {handle} {task} awaiting {expected:?}",
                            self.node.primary
                        );
                        self.state = FlowState::Awaiting { handle, expected };
                        return;
                    }
                    None => self.finish(TaskStatus::Success, None, None),
                },
                Err(error) => {
                    log::warn!("flow {}: sending {task} failed: {error}", self.node.primary);
                    self.abort(error);
                    return;
                }
            }
        }
    }

    // A group task may be answered by any element of the node; anything else
    // only by the element it was sent to.
    fn answers_current(&self, source: Address) -> bool {
        let destination =
            self.sequencer.current_task().and_then(|task| task.target.resolve(&self.node));
        match destination {
            Some(Destination::Group(_)) | None => self.node.owns(source),
            Some(destination) => destination.address() == source,
        }
    }

    fn abort(&mut self, error: TransportError) {
        self.finish(TaskStatus::Failed(TaskError::Transport(error.clone())), None, None);
        self.state = FlowState::Aborted(error);
    }

    fn finish(
        &mut self,
        status: TaskStatus,
        response: Option<MeshMessage>,
        source: Option<Address>,
    ) {
        self.sequencer.update(status.clone());
        if let Some(task) = self.sequencer.current_task() {
            self.outcomes.push(TaskOutcome { task: task.clone(), status, response, source });
        }
    }

    // Keys confirmed by a successful reply become prerequisites for the
    // tasks that follow.
    fn learn(&mut self, message: &MeshMessage) {
        let Some(Task { message: OutboundMessage::Config(request), .. }) =
            self.sequencer.current_task()
        else {
            return;
        };
        if let (
            ConfigRequest::AppKeyAdd { net_key_index, app_key_index },
            MeshMessage::Config(ConfigStatus::AppKey { .. }),
        ) = (request, message)
        {
            self.node.net_keys.insert(*net_key_index);
            self.node.app_keys.insert(*app_key_index);
            log::debug!("flow {}: node now holds app key {app_key_index}", self.node.primary);
        }
    }
}

#[cfg(test)]
mod tests {
    use glmesh_wire::ModelId;

    use super::*;
    use crate::transport::LoopbackTransport;

    fn node() -> Node {
        Node::new("lamp", Address::new(0x0010), 1).with_net_key(0)
    }

    fn app_key_ok() -> MeshMessage {
        MeshMessage::Config(ConfigStatus::AppKey { status: 0, net_key_index: 0, app_key_index: 1 })
    }

    #[tokio::test]
    async fn learned_app_key_unlocks_bind() {
        let (transport, mut events) = LoopbackTransport::new();
        let transport = Arc::new(transport);
        let mut flow = ConfigurationFlow::new(
            transport.clone(),
            Arc::new(ResponseTable::standard()),
            node(),
            [Task::app_key_add(0, 1), Task::bind(1, 0, ModelId::Sig(0x1000))],
        );
        flow.start().await;
        assert!(matches!(flow.state(), FlowState::Awaiting { expected: ResponseKind::AppKey, .. }));

        transport.deliver(app_key_ok(), Address::new(0x0010), Address::new(0x0001));
        while let Ok(event) = events.try_recv() {
            flow.on_event(&event).await;
        }
        assert!(flow.node().knows_app_key(1));
        assert!(matches!(
            flow.state(),
            FlowState::Awaiting { expected: ResponseKind::ModelAppBind, .. }
        ));
        assert_eq!(transport.sent_count(), 2);
    }

    #[tokio::test]
    async fn reply_from_another_node_is_ignored() {
        let (transport, mut events) = LoopbackTransport::new();
        let transport = Arc::new(transport);
        let mut flow = ConfigurationFlow::new(
            transport.clone(),
            Arc::new(ResponseTable::standard()),
            node(),
            [Task::app_key_add(0, 1)],
        );
        flow.start().await;
        transport.deliver(app_key_ok(), Address::new(0x0020), Address::new(0x0001));
        while let Ok(event) = events.try_recv() {
            flow.on_event(&event).await;
        }
        assert!(matches!(flow.state(), FlowState::Awaiting { .. }));
        assert!(flow.outcomes().is_empty());
    }

    #[tokio::test]
    async fn reply_from_sibling_element_is_ignored() {
        let (transport, mut events) = LoopbackTransport::new();
        let transport = Arc::new(transport);
        let lamp = Node::new("lamp", Address::new(0x0010), 2).with_net_key(0);
        let mut flow = ConfigurationFlow::new(
            transport.clone(),
            Arc::new(ResponseTable::standard()),
            lamp,
            [Task::scene_register_get(0), Task::default_ttl_get()],
        );
        flow.start().await;
        let register = |current| {
            MeshMessage::Config(ConfigStatus::SceneRegister { status: 0, current, scenes: vec![] })
        };
        let provisioner = Address::new(0x0001);
        transport.deliver(register(7), Address::new(0x0011), provisioner);
        while let Ok(event) = events.try_recv() {
            flow.on_event(&event).await;
        }
        assert!(flow.outcomes().is_empty());
        assert!(matches!(
            flow.state(),
            FlowState::Awaiting { expected: ResponseKind::SceneRegister, .. }
        ));

        transport.deliver(register(0), Address::new(0x0010), provisioner);
        while let Ok(event) = events.try_recv() {
            flow.on_event(&event).await;
        }
        assert_eq!(flow.outcomes()[0].source, Some(Address::new(0x0010)));
        assert!(matches!(
            flow.state(),
            FlowState::Awaiting { expected: ResponseKind::DefaultTtl, .. }
        ));
    }

    #[tokio::test]
    async fn non_zero_status_fails_task_and_continues() {
        let (transport, mut events) = LoopbackTransport::new();
        let transport = Arc::new(transport);
        let mut flow = ConfigurationFlow::new(
            transport.clone(),
            Arc::new(ResponseTable::standard()),
            node(),
            [Task::app_key_add(0, 1), Task::default_ttl_get()],
        );
        flow.start().await;
        let refused = ConfigStatus::AppKey { status: 0x04, net_key_index: 0, app_key_index: 1 };
        let source = Address::new(0x0010);
        transport.deliver(MeshMessage::Config(refused), source, Address::new(0x0001));
        while let Ok(event) = events.try_recv() {
            flow.on_event(&event).await;
        }
        assert_eq!(flow.outcomes()[0].status, TaskStatus::Failed(TaskError::Status(0x04)));
        assert!(!flow.node().knows_app_key(1));
        assert!(matches!(
            flow.state(),
            FlowState::Awaiting { expected: ResponseKind::DefaultTtl, .. }
        ));
    }
}
