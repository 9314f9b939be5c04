//! Error types for wire format operations.

use std::fmt;

use bitstream::BitError;

/// Result type for wire format decoding.
pub type WireResult<T> = Result<T, DecodeError>;

/// Errors that can occur while decoding frames and payload fields.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Buffer ended before the field or frame was complete.
    Truncated { needed: usize, available: usize },

    /// Opcode has no known frame layout.
    UnknownOpcode { opcode: u8 },

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// String field had no terminator before the end of the buffer.
    UnterminatedString,

    /// Bit-level decoding error.
    Bits(BitError),

    /// A decoded value is not valid for its field.
    InvalidValue { field: &'static str, value: u64 },
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    PayloadBytes,
    StringBytes,
}

/// Errors that can occur during encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeError {
    /// Payload is larger than the frame kind or configured limit allows.
    PayloadTooLarge { limit: usize, actual: usize },

    /// Fixed-size frame payload has the wrong length.
    FixedLengthMismatch {
        opcode: u8,
        expected: usize,
        actual: usize,
    },

    /// String contains the terminator byte.
    InvalidString,

    /// Bit-level encoding error.
    Bits(BitError),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { needed, available } => {
                write!(f, "truncated: need {needed} bytes, have {available}")
            }
            Self::UnknownOpcode { opcode } => write!(f, "unknown opcode: {opcode}"),
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::UnterminatedString => write!(f, "unterminated string"),
            Self::Bits(err) => write!(f, "bitstream error: {err}"),
            Self::InvalidValue { field, value } => {
                write!(f, "invalid value {value} for {field}")
            }
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PayloadBytes => "payload bytes",
            Self::StringBytes => "string bytes",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayloadTooLarge { limit, actual } => {
                write!(f, "payload too large: {actual} bytes, limit {limit}")
            }
            Self::FixedLengthMismatch {
                opcode,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "fixed frame {opcode} expects {expected} bytes, got {actual}"
                )
            }
            Self::InvalidString => write!(f, "string contains terminator byte"),
            Self::Bits(err) => write!(f, "bitstream error: {err}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bits(err) => Some(err),
            _ => None,
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bits(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BitError> for DecodeError {
    fn from(err: BitError) -> Self {
        Self::Bits(err)
    }
}

impl From<BitError> for EncodeError {
    fn from(err: BitError) -> Self {
        Self::Bits(err)
    }
}
