//! Error types for codec operations.

use std::fmt;

use world::{MobId, UpdateFlag};

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding sync messages.
///
/// On the encode side every variant is a protocol-invariant violation: the
/// message for that observer cannot be built this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodecError {
    /// Wire format decoding error.
    Wire(wire::DecodeError),

    /// Wire format encoding error (payload over the limit, bad string).
    Encode(wire::EncodeError),

    /// Bitstream error.
    Bitstream(bitstream::BitError),

    /// A flag is raised but the data it refers to was never set.
    MissingBlockData { id: MobId, flag: UpdateFlag },

    /// An npc refers to a definition the table does not have.
    MissingDefinition { id: MobId, definition: u16 },

    /// A field value cannot be represented on the wire.
    InvalidValue {
        id: MobId,
        field: &'static str,
        value: i64,
    },

    /// A position falls outside the observer's coordinate frame.
    CoordinateOutOfRange { id: MobId, local: (i32, i32) },

    /// A mob to add is too far from the observer for the 5-bit offsets.
    DeltaOutOfRange { id: MobId, dx: i32, dy: i32 },

    /// The observer is not a registered player.
    UnknownObserver { id: MobId },

    /// Limits exceeded while decoding.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Mask has bits no block in the table claims.
    InvalidMask { mask: u16 },

    /// Frame opcode is not a sync message of the expected kind.
    UnexpectedOpcode { opcode: u8 },

    /// Bytes left after the last block of the message.
    TrailingData { remaining: usize },
}

/// Specific limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    LocalMobs,
    Additions,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wire(e) => write!(f, "wire error: {e}"),
            Self::Encode(e) => write!(f, "encode error: {e}"),
            Self::Bitstream(e) => write!(f, "bitstream error: {e}"),
            Self::MissingBlockData { id, flag } => {
                write!(f, "{id} has {flag:?} flagged without data")
            }
            Self::MissingDefinition { id, definition } => {
                write!(f, "{id} uses missing definition {definition}")
            }
            Self::InvalidValue { id, field, value } => {
                write!(f, "{id}: {field} value {value} cannot be encoded")
            }
            Self::CoordinateOutOfRange { id, local } => {
                write!(
                    f,
                    "{id} at local ({}, {}) is outside the coordinate frame",
                    local.0, local.1
                )
            }
            Self::DeltaOutOfRange { id, dx, dy } => {
                write!(f, "{id} offset ({dx}, {dy}) does not fit in 5 bits")
            }
            Self::UnknownObserver { id } => write!(f, "observer {id} is not a registered player"),
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::InvalidMask { mask } => write!(f, "invalid block mask 0x{mask:04X}"),
            Self::UnexpectedOpcode { opcode } => write!(f, "unexpected opcode {opcode}"),
            Self::TrailingData { remaining } => {
                write!(f, "{remaining} trailing bytes after update blocks")
            }
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LocalMobs => "local mobs",
            Self::Additions => "additions",
        };
        write!(f, "{name}")
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wire(e) => Some(e),
            Self::Encode(e) => Some(e),
            Self::Bitstream(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wire::DecodeError> for CodecError {
    fn from(err: wire::DecodeError) -> Self {
        Self::Wire(err)
    }
}

impl From<wire::EncodeError> for CodecError {
    fn from(err: wire::EncodeError) -> Self {
        Self::Encode(err)
    }
}

impl From<bitstream::BitError> for CodecError {
    fn from(err: bitstream::BitError) -> Self {
        Self::Bitstream(err)
    }
}
