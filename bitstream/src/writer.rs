//! Bit-level writer for packed update segments.

use crate::error::{BitError, BitResult};

/// Writes bit fields most-significant first into a growable buffer.
///
/// The writer tracks an absolute bit position. Each field is split into the
/// spans that fall inside one byte, so an 11-bit index costs at most three
/// byte touches. Unwritten trailing bits of the last byte stay zero.
#[derive(Debug, Default)]
pub struct BitWriter {
    buf: Vec<u8>,
    bit_pos: usize,
}

impl BitWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves room for `bytes` bytes of output.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: Vec::with_capacity(bytes),
            bit_pos: 0,
        }
    }

    #[must_use]
    pub fn bits_written(&self) -> usize {
        self.bit_pos
    }

    /// Returns `true` if the next field starts on a byte boundary.
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.bit_pos % 8 == 0
    }

    pub fn write_bit(&mut self, value: bool) {
        self.put(u64::from(value), 1);
    }

    /// Writes the low `bits` bits of `value`.
    ///
    /// # Errors
    ///
    /// [`BitError::InvalidBitCount`] for widths above 64 and
    /// [`BitError::ValueOutOfRange`] when `value` has bits set above `bits`.
    pub fn write_bits(&mut self, value: u64, bits: u8) -> BitResult<()> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits < 64 && value >> bits != 0 {
            return Err(BitError::ValueOutOfRange { value, bits });
        }
        self.put(value, bits);
        Ok(())
    }

    /// Writes `value` as a `bits`-wide two's complement field.
    ///
    /// Movement deltas use 5 bits, so `-16..=15`. Read back with
    /// [`BitReader::read_signed_bits`](crate::BitReader::read_signed_bits).
    ///
    /// # Errors
    ///
    /// [`BitError::SignedValueOutOfRange`] when `value` does not fit.
    pub fn write_signed_bits(&mut self, value: i64, bits: u8) -> BitResult<()> {
        if bits == 0 || bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        let half = 1i128 << (bits - 1);
        if !(-half..half).contains(&i128::from(value)) {
            return Err(BitError::SignedValueOutOfRange { value, bits });
        }
        let mask = u64::MAX >> (64 - u32::from(bits));
        self.put((value as u64) & mask, bits);
        Ok(())
    }

    /// Skips to the next byte boundary. The skipped bits are zero.
    pub fn align_to_byte(&mut self) {
        self.bit_pos = self.bit_pos.next_multiple_of(8);
    }

    /// Consumes the writer and returns the packed bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    /// Consumes the writer, appending the packed bytes to `out`.
    pub fn finish_into(mut self, out: &mut Vec<u8>) {
        out.append(&mut self.buf);
    }

    fn put(&mut self, value: u64, bits: u8) {
        let end = self.bit_pos + usize::from(bits);
        self.buf.resize(end.div_ceil(8), 0);
        let mut left = u32::from(bits);
        while left > 0 {
            let offset = (self.bit_pos % 8) as u32;
            let span = (8 - offset).min(left);
            let chunk = (value >> (left - span)) & ((1u64 << span) - 1);
            self.buf[self.bit_pos / 8] |= (chunk as u8) << (8 - offset - span);
            self.bit_pos += span as usize;
            left -= span;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_writer_is_empty_and_aligned() {
        let writer = BitWriter::new();
        assert_eq!(writer.bits_written(), 0);
        assert!(writer.is_aligned());
        assert!(writer.finish().is_empty());
    }

    #[test]
    fn update_flag_lands_in_high_bit() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        assert_eq!(writer.bits_written(), 1);
        assert!(!writer.is_aligned());
        assert_eq!(writer.finish(), vec![0x80]);
    }

    #[test]
    fn walk_segment_packs_flag_type_direction_and_update() {
        // update=1, type=1 (walk), direction=6, block-update=1
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(1, 2).unwrap();
        writer.write_bits(6, 3).unwrap();
        writer.write_bit(true);
        assert_eq!(writer.finish(), vec![0b1011_1010]);
    }

    #[test]
    fn eleven_bit_index_spans_two_bytes() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(2047, 11).unwrap();
        assert_eq!(writer.bits_written(), 14);
        assert_eq!(writer.finish(), vec![0b1011_1111, 0b1111_1100]);
    }

    #[test]
    fn zero_width_field_is_a_no_op() {
        let mut writer = BitWriter::new();
        writer.write_bits(0, 0).unwrap();
        assert_eq!(writer.bits_written(), 0);
    }

    #[test]
    fn oversized_fields_are_rejected() {
        let mut writer = BitWriter::new();
        assert_eq!(
            writer.write_bits(0, 65),
            Err(BitError::InvalidBitCount {
                bits: 65,
                max_bits: 64
            })
        );
        assert_eq!(
            writer.write_bits(2048, 11),
            Err(BitError::ValueOutOfRange {
                value: 2048,
                bits: 11
            })
        );
        assert_eq!(writer.bits_written(), 0);
    }

    #[test]
    fn full_width_field() {
        let mut writer = BitWriter::new();
        writer.write_bits(1, 1).unwrap();
        writer.write_bits(u64::MAX, 64).unwrap();
        let mut expected = vec![0xFF; 8];
        expected.push(0x80);
        assert_eq!(writer.finish(), expected);
    }

    #[test]
    fn signed_deltas_use_twos_complement() {
        let mut writer = BitWriter::new();
        writer.write_signed_bits(-2, 5).unwrap();
        writer.write_signed_bits(3, 5).unwrap();
        assert_eq!(writer.finish(), vec![0b1111_0000, 0b1100_0000]);
    }

    #[test]
    fn signed_delta_bounds() {
        let mut writer = BitWriter::new();
        writer.write_signed_bits(15, 5).unwrap();
        writer.write_signed_bits(-16, 5).unwrap();
        writer.write_signed_bits(i64::MIN, 64).unwrap();
        assert_eq!(
            writer.write_signed_bits(16, 5),
            Err(BitError::SignedValueOutOfRange { value: 16, bits: 5 })
        );
        assert_eq!(
            writer.write_signed_bits(-17, 5),
            Err(BitError::SignedValueOutOfRange {
                value: -17,
                bits: 5
            })
        );
    }

    #[test]
    fn align_leaves_zero_padding() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3).unwrap();
        writer.align_to_byte();
        assert_eq!(writer.bits_written(), 8);
        writer.align_to_byte();
        assert_eq!(writer.bits_written(), 8);
        writer.write_bits(0xAB, 8).unwrap();
        assert_eq!(writer.finish(), vec![0b1010_0000, 0xAB]);
    }

    #[test]
    fn finish_into_appends_after_header() {
        let mut writer = BitWriter::with_capacity(4);
        writer.write_bit(true);
        let mut out = vec![81, 0x00];
        writer.finish_into(&mut out);
        assert_eq!(out, vec![81, 0x00, 0x80]);
    }
}
