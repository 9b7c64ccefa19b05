//! Opcode → status decoder table.

use std::collections::HashMap;

use crate::codec;
use crate::message::{InboundStatus, MessageKind, VendorStatus};

/// Parses a status payload. `None` means the frame is unparseable.
pub type Decoder = fn(&[u8]) -> Option<VendorStatus>;

/// Static table of every status opcode this controller understands.
///
/// Unknown opcodes are expected on a shared mesh (other vendors, newer
/// firmware) and decode to `None` without error.
#[derive(Clone)]
pub struct MessageRegistry {
    company_id: u16,
    decoders: HashMap<u32, Decoder>,
}

impl MessageRegistry {
    pub fn new(company_id: u16) -> Self {
        let mut registry = Self { company_id, decoders: HashMap::new() };
        for kind in MessageKind::ALL {
            registry.register(kind.code(), decoder_for(kind));
        }
        registry
    }

    pub fn company_id(&self) -> u16 {
        self.company_id
    }

    /// Install `decoder` for message `code`, returning the one it replaces.
    pub fn register(&mut self, code: u8, decoder: Decoder) -> Option<Decoder> {
        self.decoders.insert(codec::opcode(code, self.company_id), decoder)
    }

    pub fn contains(&self, opcode: u32) -> bool {
        self.decoders.contains_key(&opcode)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    pub fn decode(&self, opcode: u32, payload: &[u8]) -> Option<InboundStatus> {
        let Some(decoder) = self.decoders.get(&opcode) else {
            log::debug!("registry: ignoring unknown opcode {opcode:#08x}");
            return None;
        };
        let Some(status) = decoder(payload) else {
            log::debug!(
                "registry: unparseable payload for {opcode:#08x} ({} bytes)",
                payload.len()
            );
            return None;
        };
        Some(InboundStatus { opcode, payload: payload.to_vec(), status })
    }
}

impl core::fmt::Debug for MessageRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MessageRegistry")
            .field("company_id", &format_args!("{:#06x}", self.company_id))
            .field("opcodes", &self.decoders.len())
            .finish()
    }
}

fn decoder_for(kind: MessageKind) -> Decoder {
    match kind {
        MessageKind::RunTime => |p| VendorStatus::decode_as(MessageKind::RunTime, p),
        MessageKind::FadeTime => |p| VendorStatus::decode_as(MessageKind::FadeTime, p),
        MessageKind::Levels => |p| VendorStatus::decode_as(MessageKind::Levels, p),
        MessageKind::Scene => |p| VendorStatus::decode_as(MessageKind::Scene, p),
        MessageKind::ColorTemperature => {
            |p| VendorStatus::decode_as(MessageKind::ColorTemperature, p)
        }
        MessageKind::Sensor => |p| VendorStatus::decode_as(MessageKind::Sensor, p),
        MessageKind::Relay => |p| VendorStatus::decode_as(MessageKind::Relay, p),
        MessageKind::Angle | MessageKind::Coordinate => decode_angle_or_coordinate,
        MessageKind::GlobalOnOff => |p| VendorStatus::decode_as(MessageKind::GlobalOnOff, p),
        MessageKind::Ai => |p| VendorStatus::decode_as(MessageKind::Ai, p),
        MessageKind::BeaconOnOff => |p| VendorStatus::decode_as(MessageKind::BeaconOnOff, p),
        MessageKind::BeaconRssi => |p| VendorStatus::decode_as(MessageKind::BeaconRssi, p),
        MessageKind::BeaconTimeInterval => {
            |p| VendorStatus::decode_as(MessageKind::BeaconTimeInterval, p)
        }
        MessageKind::BeaconUuid => |p| VendorStatus::decode_as(MessageKind::BeaconUuid, p),
    }
}

// Code 0x11 carries either a one-byte angle or a three-byte coordinate.
fn decode_angle_or_coordinate(payload: &[u8]) -> Option<VendorStatus> {
    match payload.len() {
        1 => VendorStatus::decode_as(MessageKind::Angle, payload),
        3 => VendorStatus::decode_as(MessageKind::Coordinate, payload),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Coordinate, Switch};
    use crate::COMPANY_ID;

    #[test]
    fn covers_every_distinct_code() {
        let registry = MessageRegistry::new(COMPANY_ID);
        // 15 kinds, angle and coordinate share one opcode
        assert_eq!(registry.len(), 14);
        for kind in MessageKind::ALL {
            assert!(registry.contains(kind.opcode(COMPANY_ID)), "{kind}");
        }
    }

    #[test]
    fn unknown_opcode_is_none() {
        let registry = MessageRegistry::new(COMPANY_ID);
        assert!(registry.decode(0x8204, &[1]).is_none());
        assert!(registry.decode(codec::opcode(0x3F, COMPANY_ID), &[]).is_none());
        assert!(registry.decode(MessageKind::Relay.opcode(0x0059), &[1]).is_none());
    }

    #[test]
    fn wrong_length_is_none() {
        let registry = MessageRegistry::new(COMPANY_ID);
        assert!(registry.decode(MessageKind::Relay.opcode(COMPANY_ID), &[1, 1]).is_none());
        assert!(registry.decode(MessageKind::Levels.opcode(COMPANY_ID), &[0; 7]).is_none());
    }

    #[test]
    fn shared_code_selects_by_width() {
        let registry = MessageRegistry::new(COMPANY_ID);
        let opcode = MessageKind::Angle.opcode(COMPANY_ID);
        let angle = registry.decode(opcode, &[90]).expect("angle");
        assert_eq!(angle.status, VendorStatus::Angle(90));
        let coordinate = registry.decode(opcode, &[1, 5, 9]).expect("coordinate");
        assert_eq!(coordinate.status, VendorStatus::Coordinate(Coordinate::new(1, 5, 9)));
        assert!(registry.decode(opcode, &[1, 2]).is_none());
    }

    #[test]
    fn decoded_status_keeps_raw_frame() {
        let registry = MessageRegistry::new(COMPANY_ID);
        let opcode = MessageKind::Ai.opcode(COMPANY_ID);
        let status = registry.decode(opcode, &[1]).expect("ai");
        assert_eq!(status.opcode, opcode);
        assert_eq!(status.payload, vec![1]);
        assert_eq!(status.status, VendorStatus::Ai(Switch::On));
    }

    #[test]
    fn register_extends_table() {
        let mut registry = MessageRegistry::new(COMPANY_ID);
        let previous = registry.register(0x30, |p| codec::decode_u8(p).map(VendorStatus::Angle));
        assert!(previous.is_none());
        let opcode = codec::opcode(0x30, COMPANY_ID);
        assert_eq!(registry.decode(opcode, &[7]).map(|s| s.status), Some(VendorStatus::Angle(7)));
    }
}
