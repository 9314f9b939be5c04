//! Configurable limits for bounded encoding and decoding.

/// Wire-level limits for message payloads.
///
/// Encoding a payload above `max_payload_bytes` fails instead of producing a
/// frame the client cannot buffer. Decoding enforces the same bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum payload size in bytes (excluding opcode and length prefix).
    pub max_payload_bytes: usize,

    /// Maximum length of a terminated string field, excluding the terminator.
    pub max_string_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // The client's inbound buffer holds 5000 bytes per frame.
            max_payload_bytes: 5000,
            max_string_bytes: 100,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_payload_bytes: 1024,
            max_string_bytes: 80,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_payload_bytes: usize::MAX,
            max_string_bytes: usize::MAX,
        }
    }
}
