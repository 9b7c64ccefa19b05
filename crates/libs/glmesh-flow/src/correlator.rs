//! One acknowledged message in flight, with queued follow-ups.

use std::collections::VecDeque;
use std::sync::Arc;

use glmesh_wire::{Address, ResponseTable};
use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::transport::{
    Destination, MeshEvent, MeshMessage, MessageHandle, OutboundMessage, Transport,
};

/// What the correlator passes on to its subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrelatorEvent {
    Received { message: MeshMessage, source: Address, destination: Address },
    Failed { message: OutboundMessage, destination: Destination, error: TransportError },
}

/// Sends one message at a time and starts the next queued follow-up once
/// the previous one is answered, or confirmed sent when no answer is
/// expected. A failed send does not advance the queue, and inbound traffic
/// with nothing in flight is only forwarded.
pub struct MessageCorrelator {
    transport: Arc<dyn Transport>,
    responses: Arc<ResponseTable>,
    in_flight: Option<MessageHandle>,
    follow_ups: VecDeque<(OutboundMessage, Destination)>,
    subscriber: mpsc::UnboundedSender<CorrelatorEvent>,
}

impl MessageCorrelator {
    pub fn new(
        transport: Arc<dyn Transport>,
        responses: Arc<ResponseTable>,
    ) -> (Self, mpsc::UnboundedReceiver<CorrelatorEvent>) {
        let (subscriber, rx) = mpsc::unbounded_channel();
        let correlator = Self {
            transport,
            responses,
            in_flight: None,
            follow_ups: VecDeque::new(),
            subscriber,
        };
        (correlator, rx)
    }

    /// Send `message` on the next scheduler turn. Returns `false` if the
    /// transport refused it; the refusal is logged and nothing is in flight.
    pub async fn start(&mut self, message: OutboundMessage, destination: Destination) -> bool {
        tokio::task::yield_now().await;
        match self.transport.send(&message, destination).await {
            Ok(handle) => {
                log::debug!("correlator: {handle} {} -> {destination}", message.name());
                self.in_flight = Some(handle);
                true
            }
            Err(error) => {
                log::warn!(
                    "correlator: sending {} to {destination} failed: {error}",
                    message.name()
                );
                self.in_flight = None;
                false
            }
        }
    }

    /// Queue a message to send after the current one completes.
    pub fn enqueue(&mut self, message: OutboundMessage, destination: Destination) {
        self.follow_ups.push_back((message, destination));
    }

    pub fn in_flight(&self) -> Option<MessageHandle> {
        self.in_flight
    }

    pub fn pending(&self) -> usize {
        self.follow_ups.len()
    }

    /// Drop the in-flight message and start the next follow-up, if any.
    pub async fn done(&mut self) {
        self.in_flight = None;
        if let Some((message, destination)) = self.follow_ups.pop_front() {
            self.start(message, destination).await;
        }
    }

    pub async fn on_event(&mut self, event: &MeshEvent) {
        match event {
            MeshEvent::Received { message, source, destination } => {
                self.forward(CorrelatorEvent::Received {
                    message: message.clone(),
                    source: *source,
                    destination: *destination,
                });
                if self.in_flight.is_some() {
                    self.done().await;
                }
            }
            MeshEvent::Sent { handle, message, .. } => {
                let ours = self.in_flight == Some(*handle);
                if ours && message.expected_response(&self.responses).is_none() {
                    self.done().await;
                }
            }
            MeshEvent::SendFailed { handle, message, destination, error } => {
                if self.in_flight == Some(*handle) {
                    self.in_flight = None;
                }
                self.forward(CorrelatorEvent::Failed {
                    message: message.clone(),
                    destination: *destination,
                    error: error.clone(),
                });
            }
        }
    }

    fn forward(&self, event: CorrelatorEvent) {
        if self.subscriber.send(event).is_err() {
            log::debug!("correlator: subscriber dropped");
        }
    }
}
