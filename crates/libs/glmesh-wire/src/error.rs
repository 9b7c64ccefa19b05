use crate::message::MessageKind;

/// Errors from vendor payload encoding and field parsing.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("{kind:?} payload must be {expected} bytes, got {actual}")]
    InvalidLength { kind: MessageKind, expected: usize, actual: usize },

    #[error("time value {0} does not fit four decimal digits (max 9999)")]
    TimeOutOfRange(u16),

    #[error("not a decimal value: {0}")]
    NotDecimal(String),

    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    #[error("unknown message kind: {0}")]
    UnknownKind(String),

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
