//! Message framing and payload fields for the mobsync protocol.
//!
//! This crate handles the binary wire format below the sync messages: frame
//! kinds and length prefixes, the client's byte transforms, bit-mode
//! sections, and limit enforcement. It does not know about mobs or regions,
//! only the structure of messages.
//!
//! # Design Principles
//!
//! - **Bit-exact** - Byte order and value transforms match what the client reads.
//! - **Bounded decoding** - Length fields are validated against limits before use.
//! - **No domain knowledge** - This crate handles framing, not game logic.
//!
//! # Example
//!
//! ```
//! use wire::{FrameKind, Limits, MessageBuilder};
//!
//! let mut message = MessageBuilder::new(73, FrameKind::Fixed(4));
//! message.put_u16_add(400);
//! message.put_u16(401);
//! let frame = message.finish(&Limits::default()).unwrap();
//! assert_eq!(frame.to_bytes(), vec![73, 0x01, 0x10, 0x01, 0x91]);
//! ```

mod buffer;
mod builder;
mod error;
mod frame;
mod limits;

pub use buffer::{ByteReader, ByteWriter, STRING_TERMINATOR};
pub use builder::MessageBuilder;
pub use error::{DecodeError, EncodeError, LimitKind, WireResult};
pub use frame::{decode_frame, decode_frames, Frame, FrameKind, FrameRef};
pub use limits::Limits;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = Limits::default();
        let _ = FrameKind::VariableShort;
        let _ = ByteWriter::new();
        let _ = ByteReader::new(&[]);
        let _ = STRING_TERMINATOR;

        let _: WireResult<()> = Ok(());
    }

    #[test]
    fn limits_default_fits_client_buffer() {
        let limits = Limits::default();
        assert!(limits.max_payload_bytes <= FrameKind::VariableShort.max_payload());
    }
}
