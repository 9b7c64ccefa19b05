//! The seam between the controller logic and a Bluetooth mesh stack.
//!
//! The stack owns encryption, segmentation, retransmission and timeouts.
//! Controller logic hands it [`OutboundMessage`]s through [`Transport`] and
//! observes the outcome as a stream of [`MeshEvent`]s.

mod loopback;

pub use loopback::LoopbackTransport;

use core::fmt;

use async_trait::async_trait;
use glmesh_wire::{
    Address, ConfigRequest, ConfigStatus, InboundStatus, MessageRegistry, ModelId, RequestKind,
    ResponseKind, ResponseTable, VendorMessage,
};

use crate::error::TransportError;

/// Identifies one accepted send, so a later failure can be matched to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageHandle(pub u64);

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a message goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// A node's element, addressed by unicast address.
    Element(Address),
    /// A specific model on an element; configuration messages need this.
    Model { element: Address, model: ModelId },
    /// Group or virtual address.
    Group(Address),
}

impl Destination {
    pub fn address(&self) -> Address {
        match self {
            Self::Element(address) | Self::Group(address) => *address,
            Self::Model { element, .. } => *element,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(address) => write!(f, "{address}"),
            Self::Model { element, model } => write!(f, "{element}/{model}"),
            Self::Group(address) => write!(f, "group {address}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Vendor(VendorMessage),
    Config(ConfigRequest),
}

impl OutboundMessage {
    pub fn request_kind(&self) -> RequestKind {
        match self {
            Self::Vendor(message) => RequestKind::Vendor(message.kind()),
            Self::Config(request) => RequestKind::from(request),
        }
    }

    /// The reply that completes this message, or `None` if nothing comes
    /// back. A vendor message built unacknowledged never expects a reply.
    pub fn expected_response(&self, responses: &ResponseTable) -> Option<ResponseKind> {
        if let Self::Vendor(message) = self {
            if !message.is_acknowledged() {
                return None;
            }
        }
        responses.expected(self.request_kind())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Vendor(message) => message.kind().as_str(),
            Self::Config(request) => request.name(),
        }
    }
}

impl From<VendorMessage> for OutboundMessage {
    fn from(message: VendorMessage) -> Self {
        Self::Vendor(message)
    }
}

impl From<ConfigRequest> for OutboundMessage {
    fn from(request: ConfigRequest) -> Self {
        Self::Config(request)
    }
}

/// A message delivered to the controller by the mesh stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshMessage {
    Vendor(InboundStatus),
    Config(ConfigStatus),
    /// Traffic no registered decoder recognized; left for other consumers.
    Unrecognized { opcode: u32, payload: Vec<u8> },
}

impl MeshMessage {
    /// Classify a raw vendor access message through `registry`.
    pub fn from_vendor(registry: &MessageRegistry, opcode: u32, payload: &[u8]) -> Self {
        match registry.decode(opcode, payload) {
            Some(status) => Self::Vendor(status),
            None => Self::Unrecognized { opcode, payload: payload.to_vec() },
        }
    }

    pub fn response_kind(&self) -> Option<ResponseKind> {
        match self {
            Self::Vendor(status) => Some(ResponseKind::from(&status.status)),
            Self::Config(status) => Some(ResponseKind::from(status)),
            Self::Unrecognized { .. } => None,
        }
    }

    /// Explicit status code carried by the reply, if any.
    pub fn status_code(&self) -> Option<u8> {
        match self {
            Self::Config(status) => status.status_code(),
            Self::Vendor(_) | Self::Unrecognized { .. } => None,
        }
    }
}

/// What the mesh stack reports back, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshEvent {
    Received { message: MeshMessage, source: Address, destination: Address },
    /// The stack handed the message to the bearer.
    Sent { handle: MessageHandle, message: OutboundMessage, destination: Destination },
    /// Delivery failed after the send was accepted, timeouts included.
    SendFailed {
        handle: MessageHandle,
        message: OutboundMessage,
        destination: Destination,
        error: TransportError,
    },
}

/// Hands messages to the mesh stack.
///
/// `send` returns once the stack accepted or refused the message; replies,
/// delivery confirmations and late failures arrive as [`MeshEvent`]s.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        message: &OutboundMessage,
        destination: Destination,
    ) -> Result<MessageHandle, TransportError>;
}

#[cfg(test)]
mod tests {
    use glmesh_wire::{MessageKind, VendorRequest, COMPANY_ID};

    use super::*;

    #[test]
    fn unacknowledged_vendor_message_expects_nothing() {
        let responses = ResponseTable::standard();
        let message = VendorRequest::SceneRecall(3).encode(COMPANY_ID).expect("encode");
        let acked = OutboundMessage::from(message.clone());
        assert_eq!(
            acked.expected_response(&responses),
            Some(ResponseKind::Vendor(MessageKind::Scene))
        );
        let unacked = OutboundMessage::from(message.unacknowledged());
        assert_eq!(unacked.expected_response(&responses), None);
    }

    #[test]
    fn missing_table_entry_means_fire_and_forget() {
        let mut responses = ResponseTable::standard();
        responses.remove(RequestKind::DefaultTtlGet);
        let message = OutboundMessage::Config(ConfigRequest::DefaultTtlGet);
        assert_eq!(message.expected_response(&responses), None);
    }

    #[test]
    fn foreign_vendor_traffic_is_unrecognized() {
        let registry = MessageRegistry::new(COMPANY_ID);
        let message = MeshMessage::from_vendor(&registry, 0x00C1_0059, &[0x01]);
        assert!(matches!(message, MeshMessage::Unrecognized { opcode: 0x00C1_0059, .. }));
        assert_eq!(message.response_kind(), None);
    }

    #[test]
    fn destination_address() {
        let element = Address::new(0x0011);
        let destination = Destination::Model { element, model: glmesh_wire::config::SCENE_SERVER };
        assert_eq!(destination.address(), element);
        assert_eq!(destination.to_string(), "0x0011/1203");
    }
}
