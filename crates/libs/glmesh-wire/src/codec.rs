//! Opcode derivation and fixed-width payload field codecs.
//!
//! Every decoder here takes the whole payload and returns `None` unless it
//! is exactly the width of the field. Nothing in this module panics on
//! foreign input.

use serde::{Deserialize, Serialize};

use crate::error::WireError;

/// Largest value the four-digit time encoding can carry.
pub const MAX_TIME: u16 = 9999;

/// Derive the vendor opcode for a message code.
///
/// The company identifier goes on air little-endian after the code byte, so
/// its bytes are swapped into the low half of the widened opcode.
pub const fn opcode(kind: u8, company_id: u16) -> u32 {
    let code = (0xC0 | kind) as u32;
    (code << 16) | company_id.swap_bytes() as u32
}

/// Split a widened opcode back into its message code and company identifier.
/// Returns `None` for opcodes that are not 3-byte vendor opcodes.
pub const fn split_opcode(opcode: u32) -> Option<(u8, u16)> {
    let first = (opcode >> 16) as u8;
    if opcode > 0x00FF_FFFF || first & 0xC0 != 0xC0 {
        return None;
    }
    Some((first & 0x3F, (opcode as u16).swap_bytes()))
}

/// Single status byte used by the on/off style messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Switch {
    Off = 0,
    On = 1,
    /// Ask the node to report its current state.
    Read = 2,
}

impl Switch {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Off),
            1 => Some(Self::On),
            2 => Some(Self::Read),
            _ => None,
        }
    }

    pub fn encode(self) -> [u8; 1] {
        [self as u8]
    }

    pub fn decode(payload: &[u8]) -> Option<Self> {
        match payload {
            [b] => Self::from_byte(*b),
            _ => None,
        }
    }
}

/// Encode a time in seconds the way deployed firmware expects: the value is
/// printed as four zero-padded decimal digits and those digits are read as
/// hex nibbles, so `300` goes out as `[0x03, 0x00]`.
pub fn encode_time(secs: u16) -> Result<[u8; 2], WireError> {
    if secs > MAX_TIME {
        return Err(WireError::TimeOutOfRange(secs));
    }
    let digits = format!("{secs:04}");
    let mut out = [0u8; 2];
    hex::decode_to_slice(digits, &mut out)?;
    Ok(out)
}

/// Inverse of [`encode_time`]. Nibbles above 9 make the frame unparseable.
pub fn decode_time(payload: &[u8]) -> Option<u16> {
    let bytes: [u8; 2] = payload.try_into().ok()?;
    let digits = hex::encode(bytes);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn encode_u16_be(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

pub fn decode_u16_be(payload: &[u8]) -> Option<u16> {
    let bytes: [u8; 2] = payload.try_into().ok()?;
    Some(u16::from_be_bytes(bytes))
}

pub fn decode_u8(payload: &[u8]) -> Option<u8> {
    match payload {
        [b] => Some(*b),
        _ => None,
    }
}

pub fn encode_i8(value: i8) -> [u8; 1] {
    value.to_be_bytes()
}

pub fn decode_i8(payload: &[u8]) -> Option<i8> {
    let bytes: [u8; 1] = payload.try_into().ok()?;
    Some(i8::from_be_bytes(bytes))
}

/// Number of channels in a levels message.
pub const LEVEL_CHANNELS: usize = 4;

pub fn encode_levels(levels: [u16; LEVEL_CHANNELS]) -> [u8; LEVEL_CHANNELS * 2] {
    let mut out = [0u8; LEVEL_CHANNELS * 2];
    for (chunk, level) in out.chunks_exact_mut(2).zip(levels) {
        chunk.copy_from_slice(&level.to_be_bytes());
    }
    out
}

pub fn decode_levels(payload: &[u8]) -> Option<[u16; LEVEL_CHANNELS]> {
    if payload.len() != LEVEL_CHANNELS * 2 {
        return None;
    }
    let mut levels = [0u16; LEVEL_CHANNELS];
    for (level, chunk) in levels.iter_mut().zip(payload.chunks_exact(2)) {
        *level = u16::from_be_bytes([chunk[0], chunk[1]]);
    }
    Some(levels)
}

pub const UUID_LEN: usize = 16;

pub fn decode_uuid(payload: &[u8]) -> Option<[u8; UUID_LEN]> {
    payload.try_into().ok()
}

/// Installed position of a fixture, sent as three raw bytes `(z, x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub z: u8,
    pub x: u8,
    pub y: u8,
}

impl Coordinate {
    pub const fn new(z: u8, x: u8, y: u8) -> Self {
        Self { z, x, y }
    }

    pub fn encode(self) -> [u8; 3] {
        [self.z, self.x, self.y]
    }

    pub fn decode(payload: &[u8]) -> Option<Self> {
        match payload {
            [z, x, y] => Some(Self::new(*z, *x, *y)),
            _ => None,
        }
    }
}
