//! Bit packing primitives for the mobsync synchronization protocol.
//!
//! Sync messages open with a bit-access section: movement segments, the
//! local mob additions and the 2047 terminator. [`BitWriter`] packs those
//! fields and [`BitReader`] unpacks them for tests, tooling and fuzzing.
//!
//! # Design Principles
//!
//! - **MSB first** - Bits fill each byte from the most significant end, the
//!   order the client reads them in.
//! - **Checked widths** - A value that does not fit its field is an error,
//!   never a silent truncation.
//! - **Mob-agnostic** - Nothing here knows about mobs, regions or ticks.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bit(true);
//! writer.write_bits(42, 7).unwrap();
//! writer.write_signed_bits(-2, 5).unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert!(reader.read_bit().unwrap());
//! assert_eq!(reader.read_bits(7).unwrap(), 42);
//! assert_eq!(reader.read_signed_bits(5).unwrap(), -2);
//! ```

mod error;
mod reader;
mod writer;

pub use error::{BitError, BitResult};
pub use reader::BitReader;
pub use writer::BitWriter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_widths_survive_a_pass() {
        // type, direction, delta, local coordinate, count, index
        let fields = [(3u64, 2u8), (5, 3), (22, 5), (103, 7), (255, 8), (2047, 11)];

        let mut writer = BitWriter::new();
        for (value, bits) in fields {
            writer.write_bits(value, bits).unwrap();
        }
        assert_eq!(writer.bits_written(), 36);
        let bytes = writer.finish();
        assert_eq!(bytes.len(), 5);

        let mut reader = BitReader::new(&bytes);
        for (value, bits) in fields {
            assert_eq!(reader.read_bits(bits).unwrap(), value, "{bits}-bit field");
        }
        reader.align_to_byte().unwrap();
        assert!(reader.is_empty());
    }
}
