//! Vendor message kinds, outbound requests and decoded statuses.

use core::fmt;
use core::str::FromStr;

use crate::codec::{self, Coordinate, Switch, LEVEL_CHANNELS, UUID_LEN};
use crate::error::WireError;

/// Vendor message kinds.
///
/// A request and its status share the kind's code. `Angle` and `Coordinate`
/// share code `0x11`; payload width tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKind {
    RunTime,
    FadeTime,
    Levels,
    Scene,
    ColorTemperature,
    Sensor,
    Relay,
    Angle,
    Coordinate,
    GlobalOnOff,
    Ai,
    BeaconOnOff,
    BeaconRssi,
    BeaconTimeInterval,
    BeaconUuid,
}

impl MessageKind {
    pub const ALL: [Self; 15] = [
        Self::RunTime,
        Self::FadeTime,
        Self::Levels,
        Self::Scene,
        Self::ColorTemperature,
        Self::Sensor,
        Self::Relay,
        Self::Angle,
        Self::Coordinate,
        Self::GlobalOnOff,
        Self::Ai,
        Self::BeaconOnOff,
        Self::BeaconRssi,
        Self::BeaconTimeInterval,
        Self::BeaconUuid,
    ];

    pub const fn code(self) -> u8 {
        match self {
            Self::RunTime => 0x01,
            Self::FadeTime => 0x02,
            Self::Levels => 0x03,
            Self::Scene => 0x04,
            Self::ColorTemperature => 0x05,
            Self::Sensor => 0x0C,
            Self::Relay => 0x10,
            Self::Angle | Self::Coordinate => 0x11,
            Self::GlobalOnOff => 0x12,
            Self::Ai => 0x13,
            Self::BeaconOnOff => 0x20,
            Self::BeaconRssi => 0x21,
            Self::BeaconTimeInterval => 0x22,
            Self::BeaconUuid => 0x23,
        }
    }

    pub const fn opcode(self, company_id: u16) -> u32 {
        codec::opcode(self.code(), company_id)
    }

    /// Fixed payload width for both directions.
    pub const fn payload_len(self) -> usize {
        match self {
            Self::Sensor
            | Self::Relay
            | Self::GlobalOnOff
            | Self::Ai
            | Self::BeaconOnOff
            | Self::Angle
            | Self::BeaconRssi => 1,
            Self::RunTime
            | Self::FadeTime
            | Self::Scene
            | Self::ColorTemperature
            | Self::BeaconTimeInterval => 2,
            Self::Coordinate => 3,
            Self::Levels => LEVEL_CHANNELS * 2,
            Self::BeaconUuid => UUID_LEN,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RunTime => "run-time",
            Self::FadeTime => "fade-time",
            Self::Levels => "levels",
            Self::Scene => "scene",
            Self::ColorTemperature => "color-temperature",
            Self::Sensor => "sensor",
            Self::Relay => "relay",
            Self::Angle => "angle",
            Self::Coordinate => "coordinate",
            Self::GlobalOnOff => "global-on-off",
            Self::Ai => "ai",
            Self::BeaconOnOff => "beacon-on-off",
            Self::BeaconRssi => "beacon-rssi",
            Self::BeaconTimeInterval => "beacon-time-interval",
            Self::BeaconUuid => "beacon-uuid",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| WireError::UnknownKind(s.to_string()))
    }
}

/// Typed outbound vendor request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorRequest {
    /// Seconds the fixture stays on after a trigger, `0..=9999`.
    RunTime(u16),
    /// Seconds to fade between levels, `0..=9999`.
    FadeTime(u16),
    Levels([u16; LEVEL_CHANNELS]),
    SceneRecall(u16),
    ColorTemperature(u16),
    Sensor(Switch),
    Relay(Switch),
    Angle(u8),
    Coordinate(Coordinate),
    GlobalOnOff(Switch),
    Ai(Switch),
    BeaconOnOff(Switch),
    BeaconRssi(i8),
    BeaconTimeInterval(u16),
    BeaconUuid([u8; UUID_LEN]),
}

impl VendorRequest {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::RunTime(_) => MessageKind::RunTime,
            Self::FadeTime(_) => MessageKind::FadeTime,
            Self::Levels(_) => MessageKind::Levels,
            Self::SceneRecall(_) => MessageKind::Scene,
            Self::ColorTemperature(_) => MessageKind::ColorTemperature,
            Self::Sensor(_) => MessageKind::Sensor,
            Self::Relay(_) => MessageKind::Relay,
            Self::Angle(_) => MessageKind::Angle,
            Self::Coordinate(_) => MessageKind::Coordinate,
            Self::GlobalOnOff(_) => MessageKind::GlobalOnOff,
            Self::Ai(_) => MessageKind::Ai,
            Self::BeaconOnOff(_) => MessageKind::BeaconOnOff,
            Self::BeaconRssi(_) => MessageKind::BeaconRssi,
            Self::BeaconTimeInterval(_) => MessageKind::BeaconTimeInterval,
            Self::BeaconUuid(_) => MessageKind::BeaconUuid,
        }
    }

    /// A read request for kinds whose payload is a [`Switch`].
    pub fn read(kind: MessageKind) -> Option<Self> {
        let read = Switch::Read;
        match kind {
            MessageKind::Sensor => Some(Self::Sensor(read)),
            MessageKind::Relay => Some(Self::Relay(read)),
            MessageKind::GlobalOnOff => Some(Self::GlobalOnOff(read)),
            MessageKind::Ai => Some(Self::Ai(read)),
            MessageKind::BeaconOnOff => Some(Self::BeaconOnOff(read)),
            _ => None,
        }
    }

    pub fn encode_payload(&self) -> Result<Vec<u8>, WireError> {
        let payload = match self {
            Self::RunTime(secs) | Self::FadeTime(secs) => codec::encode_time(*secs)?.to_vec(),
            Self::Levels(levels) => codec::encode_levels(*levels).to_vec(),
            Self::SceneRecall(value)
            | Self::ColorTemperature(value)
            | Self::BeaconTimeInterval(value) => codec::encode_u16_be(*value).to_vec(),
            Self::Sensor(switch)
            | Self::Relay(switch)
            | Self::GlobalOnOff(switch)
            | Self::Ai(switch)
            | Self::BeaconOnOff(switch) => switch.encode().to_vec(),
            Self::Angle(angle) => vec![*angle],
            Self::Coordinate(coordinate) => coordinate.encode().to_vec(),
            Self::BeaconRssi(rssi) => codec::encode_i8(*rssi).to_vec(),
            Self::BeaconUuid(uuid) => uuid.to_vec(),
        };
        Ok(payload)
    }

    /// Parse a request of `kind` from its text form: decimal numbers
    /// (`0x` hex accepted for scene numbers), `on`/`off`/`read` for
    /// switches, comma lists for levels and coordinates (`z,x,y`), 32 hex
    /// digits for a beacon UUID. A switch kind without a value reads.
    pub fn parse(kind: MessageKind, value: Option<&str>) -> Result<Self, WireError> {
        let Some(value) = value.map(str::trim) else {
            return Self::read(kind).ok_or(WireError::InvalidLength {
                kind,
                expected: kind.payload_len(),
                actual: 0,
            });
        };
        let request = match kind {
            MessageKind::RunTime => Self::RunTime(parse_number(value)?),
            MessageKind::FadeTime => Self::FadeTime(parse_number(value)?),
            MessageKind::Levels => Self::Levels(parse_list(kind, value)?),
            MessageKind::Scene => Self::SceneRecall(parse_number(value)?),
            MessageKind::ColorTemperature => Self::ColorTemperature(parse_number(value)?),
            MessageKind::Sensor => Self::Sensor(parse_switch(value)?),
            MessageKind::Relay => Self::Relay(parse_switch(value)?),
            MessageKind::Angle => Self::Angle(parse_number(value)?),
            MessageKind::Coordinate => {
                let [z, x, y] = parse_list(kind, value)?;
                Self::Coordinate(Coordinate::new(z, x, y))
            }
            MessageKind::GlobalOnOff => Self::GlobalOnOff(parse_switch(value)?),
            MessageKind::Ai => Self::Ai(parse_switch(value)?),
            MessageKind::BeaconOnOff => Self::BeaconOnOff(parse_switch(value)?),
            MessageKind::BeaconRssi => Self::BeaconRssi(parse_number(value)?),
            MessageKind::BeaconTimeInterval => Self::BeaconTimeInterval(parse_number(value)?),
            MessageKind::BeaconUuid => {
                let digits = value.replace('-', "");
                let mut uuid = [0u8; UUID_LEN];
                if digits.len() != UUID_LEN * 2 {
                    return Err(WireError::InvalidLength {
                        kind,
                        expected: UUID_LEN,
                        actual: digits.len() / 2,
                    });
                }
                hex::decode_to_slice(&digits, &mut uuid)?;
                Self::BeaconUuid(uuid)
            }
        };
        Ok(request)
    }

    /// Build the acknowledged wire message for this request.
    pub fn encode(&self, company_id: u16) -> Result<VendorMessage, WireError> {
        let payload = self.encode_payload()?;
        Ok(VendorMessage::new(self.kind(), company_id, payload))
    }
}

/// An encoded outbound vendor message. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorMessage {
    kind: MessageKind,
    opcode: u32,
    payload: Vec<u8>,
    acknowledged: bool,
}

impl VendorMessage {
    /// An acknowledged message carrying `payload` as-is.
    pub fn new(kind: MessageKind, company_id: u16, payload: Vec<u8>) -> Self {
        Self { kind, opcode: kind.opcode(company_id), payload, acknowledged: true }
    }

    /// The same message sent without expecting a status reply.
    pub fn unacknowledged(self) -> Self {
        Self { acknowledged: false, ..self }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn opcode(&self) -> u32 {
        self.opcode
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// Access-layer bytes: 3-byte opcode followed by the payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(3 + self.payload.len());
        buf.extend_from_slice(&self.opcode.to_be_bytes()[1..]);
        buf.extend_from_slice(&self.payload);
        buf
    }
}

fn parse_number<T: FromStr>(value: &str) -> Result<T, WireError> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(digits) => u32::from_str_radix(digits, 16)
            .ok()
            .and_then(|raw| raw.to_string().parse().ok()),
        None => value.parse().ok(),
    };
    parsed.ok_or_else(|| WireError::NotDecimal(value.to_string()))
}

fn parse_list<T: FromStr + Default + Copy, const N: usize>(
    kind: MessageKind,
    value: &str,
) -> Result<[T; N], WireError> {
    let fields: Vec<&str> = value.split(',').map(str::trim).collect();
    if fields.len() != N {
        return Err(WireError::InvalidLength {
            kind,
            expected: kind.payload_len(),
            actual: fields.len() * kind.payload_len() / N,
        });
    }
    let mut out = [T::default(); N];
    for (slot, field) in out.iter_mut().zip(fields) {
        *slot = parse_number(field)?;
    }
    Ok(out)
}

fn parse_switch(value: &str) -> Result<Switch, WireError> {
    match value.to_ascii_lowercase().as_str() {
        "off" | "0" => Ok(Switch::Off),
        "on" | "1" => Ok(Switch::On),
        "read" | "2" => Ok(Switch::Read),
        _ => Err(WireError::NotDecimal(value.to_string())),
    }
}

/// Decoded vendor status, one variant per status kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorStatus {
    RunTime(u16),
    FadeTime(u16),
    Levels([u16; LEVEL_CHANNELS]),
    Scene(u16),
    ColorTemperature(u16),
    Sensor(Switch),
    Relay(Switch),
    Angle(u8),
    Coordinate(Coordinate),
    GlobalOnOff(Switch),
    Ai(Switch),
    BeaconOnOff(Switch),
    BeaconRssi(i8),
    BeaconTimeInterval(u16),
    BeaconUuid([u8; UUID_LEN]),
}

impl VendorStatus {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::RunTime(_) => MessageKind::RunTime,
            Self::FadeTime(_) => MessageKind::FadeTime,
            Self::Levels(_) => MessageKind::Levels,
            Self::Scene(_) => MessageKind::Scene,
            Self::ColorTemperature(_) => MessageKind::ColorTemperature,
            Self::Sensor(_) => MessageKind::Sensor,
            Self::Relay(_) => MessageKind::Relay,
            Self::Angle(_) => MessageKind::Angle,
            Self::Coordinate(_) => MessageKind::Coordinate,
            Self::GlobalOnOff(_) => MessageKind::GlobalOnOff,
            Self::Ai(_) => MessageKind::Ai,
            Self::BeaconOnOff(_) => MessageKind::BeaconOnOff,
            Self::BeaconRssi(_) => MessageKind::BeaconRssi,
            Self::BeaconTimeInterval(_) => MessageKind::BeaconTimeInterval,
            Self::BeaconUuid(_) => MessageKind::BeaconUuid,
        }
    }

    /// Parse `payload` as a status of `kind`.
    pub fn decode_as(kind: MessageKind, payload: &[u8]) -> Option<Self> {
        match kind {
            MessageKind::RunTime => codec::decode_time(payload).map(Self::RunTime),
            MessageKind::FadeTime => codec::decode_time(payload).map(Self::FadeTime),
            MessageKind::Levels => codec::decode_levels(payload).map(Self::Levels),
            MessageKind::Scene => codec::decode_u16_be(payload).map(Self::Scene),
            MessageKind::ColorTemperature => {
                codec::decode_u16_be(payload).map(Self::ColorTemperature)
            }
            MessageKind::Sensor => Switch::decode(payload).map(Self::Sensor),
            MessageKind::Relay => Switch::decode(payload).map(Self::Relay),
            MessageKind::Angle => codec::decode_u8(payload).map(Self::Angle),
            MessageKind::Coordinate => Coordinate::decode(payload).map(Self::Coordinate),
            MessageKind::GlobalOnOff => Switch::decode(payload).map(Self::GlobalOnOff),
            MessageKind::Ai => Switch::decode(payload).map(Self::Ai),
            MessageKind::BeaconOnOff => Switch::decode(payload).map(Self::BeaconOnOff),
            MessageKind::BeaconRssi => codec::decode_i8(payload).map(Self::BeaconRssi),
            MessageKind::BeaconTimeInterval => {
                codec::decode_u16_be(payload).map(Self::BeaconTimeInterval)
            }
            MessageKind::BeaconUuid => codec::decode_uuid(payload).map(Self::BeaconUuid),
        }
    }
}

/// A status as received: opcode, raw payload and its typed reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundStatus {
    pub opcode: u32,
    pub payload: Vec<u8>,
    pub status: VendorStatus,
}

impl InboundStatus {
    pub fn kind(&self) -> MessageKind {
        self.status.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::COMPANY_ID;

    #[test]
    fn parses_text_forms() {
        let parse = |kind, value| VendorRequest::parse(kind, value).expect("parse");
        assert_eq!(parse(MessageKind::RunTime, Some("300")), VendorRequest::RunTime(300));
        assert_eq!(parse(MessageKind::Scene, Some("0x0010")), VendorRequest::SceneRecall(16));
        assert_eq!(parse(MessageKind::Relay, Some("ON")), VendorRequest::Relay(Switch::On));
        assert_eq!(parse(MessageKind::Ai, None), VendorRequest::Ai(Switch::Read));
        assert_eq!(
            parse(MessageKind::Coordinate, Some("1, 2, 3")),
            VendorRequest::Coordinate(Coordinate::new(1, 2, 3))
        );
        assert_eq!(
            parse(MessageKind::Levels, Some("100,200,300,400")),
            VendorRequest::Levels([100, 200, 300, 400])
        );
        assert_eq!(parse(MessageKind::BeaconRssi, Some("-59")), VendorRequest::BeaconRssi(-59));
    }

    #[test]
    fn rejects_bad_text() {
        assert!(matches!(
            VendorRequest::parse(MessageKind::Angle, Some("300")),
            Err(WireError::NotDecimal(_))
        ));
        assert!(matches!(
            VendorRequest::parse(MessageKind::Levels, Some("1,2")),
            Err(WireError::InvalidLength { .. })
        ));
        assert!(matches!(
            VendorRequest::parse(MessageKind::BeaconUuid, Some("abcd")),
            Err(WireError::InvalidLength { expected: 16, .. })
        ));
        assert!(VendorRequest::parse(MessageKind::RunTime, None).is_err());
    }

    #[test]
    fn kind_names_parse_back() {
        for kind in MessageKind::ALL {
            assert_eq!(kind.as_str().parse::<MessageKind>().expect("parse"), kind);
        }
        let kind = "global_on_off".parse::<MessageKind>().expect("parse");
        assert_eq!(kind, MessageKind::GlobalOnOff);
        assert!("warp-drive".parse::<MessageKind>().is_err());
    }

    #[test]
    fn encoded_payload_width_matches_kind() {
        let requests = [
            VendorRequest::RunTime(300),
            VendorRequest::FadeTime(2),
            VendorRequest::Levels([1, 2, 3, 4]),
            VendorRequest::SceneRecall(7),
            VendorRequest::ColorTemperature(4000),
            VendorRequest::Sensor(Switch::On),
            VendorRequest::Relay(Switch::Off),
            VendorRequest::Angle(45),
            VendorRequest::Coordinate(Coordinate::new(1, 2, 3)),
            VendorRequest::GlobalOnOff(Switch::Read),
            VendorRequest::Ai(Switch::On),
            VendorRequest::BeaconOnOff(Switch::On),
            VendorRequest::BeaconRssi(-59),
            VendorRequest::BeaconTimeInterval(100),
            VendorRequest::BeaconUuid([0xAB; 16]),
        ];
        for request in requests {
            let message = request.encode(COMPANY_ID).expect("encode");
            assert_eq!(message.payload().len(), request.kind().payload_len(), "{request:?}");
            assert_eq!(message.opcode(), request.kind().opcode(COMPANY_ID));
        }
    }

    #[test]
    fn run_time_request_bytes() {
        let message = VendorRequest::RunTime(300).encode(COMPANY_ID).expect("encode");
        assert_eq!(message.to_bytes(), vec![0xC1, 0x41, 0x08, 0x03, 0x00]);
        assert!(message.is_acknowledged());
    }

    #[test]
    fn out_of_range_time_does_not_encode() {
        assert!(VendorRequest::FadeTime(12_000).encode(COMPANY_ID).is_err());
    }

    #[test]
    fn unacknowledged_keeps_opcode() {
        let message = VendorRequest::GlobalOnOff(Switch::Off)
            .encode(COMPANY_ID)
            .expect("encode")
            .unacknowledged();
        assert!(!message.is_acknowledged());
        assert_eq!(message.opcode(), MessageKind::GlobalOnOff.opcode(COMPANY_ID));
    }

    #[test]
    fn read_only_for_switch_kinds() {
        let read = VendorRequest::read(MessageKind::Relay);
        assert_eq!(read, Some(VendorRequest::Relay(Switch::Read)));
        assert_eq!(VendorRequest::read(MessageKind::Levels), None);
    }

    #[test]
    fn status_decode_roundtrips_requests() {
        let cases = [
            (VendorRequest::RunTime(45), VendorStatus::RunTime(45)),
            (VendorRequest::Levels([9, 8, 7, 6]), VendorStatus::Levels([9, 8, 7, 6])),
            (VendorRequest::SceneRecall(0x1234), VendorStatus::Scene(0x1234)),
            (VendorRequest::BeaconRssi(-70), VendorStatus::BeaconRssi(-70)),
        ];
        for (request, expected) in cases {
            let payload = request.encode_payload().expect("encode");
            assert_eq!(VendorStatus::decode_as(request.kind(), &payload), Some(expected));
        }
    }
}
