use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use glmesh_wire::Address;
use tokio::sync::mpsc;

use super::{Destination, MeshEvent, MeshMessage, MessageHandle, OutboundMessage, Transport};
use crate::error::TransportError;

/// In-process transport that records every send and lets the caller play
/// the mesh: inject replies, fail sends, time out in-flight messages.
///
/// Accepted sends are echoed as [`MeshEvent::Sent`] on the event channel.
pub struct LoopbackTransport {
    events: mpsc::UnboundedSender<MeshEvent>,
    next_handle: AtomicU64,
    sent: Mutex<Vec<(MessageHandle, OutboundMessage, Destination)>>,
    refusals: Mutex<VecDeque<TransportError>>,
}

impl LoopbackTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MeshEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let transport = Self {
            events,
            next_handle: AtomicU64::new(1),
            sent: Mutex::new(Vec::new()),
            refusals: Mutex::new(VecDeque::new()),
        };
        (transport, rx)
    }

    /// Make the next call to `send` return `error` without sending.
    pub fn refuse_next(&self, error: TransportError) {
        self.refusals.lock().unwrap_or_else(PoisonError::into_inner).push_back(error);
    }

    /// Everything accepted so far, oldest first.
    pub fn sent(&self) -> Vec<(MessageHandle, OutboundMessage, Destination)> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Deliver `message` as if `source` had sent it to `destination`.
    pub fn deliver(&self, message: MeshMessage, source: Address, destination: Address) {
        self.emit(MeshEvent::Received { message, source, destination });
    }

    /// Report a late failure for an accepted send. Returns `false` for an
    /// unknown handle.
    pub fn fail(&self, handle: MessageHandle, error: TransportError) -> bool {
        let sent = self.sent.lock().unwrap_or_else(PoisonError::into_inner);
        let Some((_, message, destination)) = sent.iter().find(|(h, ..)| *h == handle) else {
            return false;
        };
        let event = MeshEvent::SendFailed {
            handle,
            message: message.clone(),
            destination: *destination,
            error,
        };
        drop(sent);
        self.emit(event);
        true
    }

    fn emit(&self, event: MeshEvent) {
        if self.events.send(event).is_err() {
            log::debug!("loopback: event receiver dropped");
        }
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn send(
        &self,
        message: &OutboundMessage,
        destination: Destination,
    ) -> Result<MessageHandle, TransportError> {
        let refusal = self.refusals.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
        if let Some(error) = refusal {
            log::debug!("loopback: refusing {} to {destination}: {error}", message.name());
            return Err(error);
        }
        let handle = MessageHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).push((
            handle,
            message.clone(),
            destination,
        ));
        log::trace!("loopback: {handle} {} -> {destination}", message.name());
        self.emit(MeshEvent::Sent { handle, message: message.clone(), destination });
        Ok(handle)
    }
}
