//! Bounded bit-level reader.

use crate::error::{BitError, BitResult};

/// Reads MSB-first bit fields out of a borrowed slice.
///
/// Every read is checked against the slice length; malformed input yields
/// [`BitError::EndOfBuffer`] and leaves the position untouched.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.bit_pos)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }

    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Offset of the first byte not yet touched. A partly read byte counts
    /// as consumed.
    #[must_use]
    pub const fn byte_position(&self) -> usize {
        self.bit_pos.div_ceil(8)
    }

    pub fn read_bit(&mut self) -> BitResult<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Reads a `bits`-wide unsigned field.
    pub fn read_bits(&mut self, bits: u8) -> BitResult<u64> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        let available = self.bits_remaining();
        if usize::from(bits) > available {
            return Err(BitError::EndOfBuffer {
                requested: usize::from(bits),
                available,
            });
        }

        let mut value = 0u64;
        let mut left = u32::from(bits);
        while left > 0 {
            let offset = (self.bit_pos % 8) as u32;
            let span = (8 - offset).min(left);
            let byte = u64::from(self.data[self.bit_pos / 8]);
            let chunk = (byte >> (8 - offset - span)) & ((1u64 << span) - 1);
            value = (value << span) | chunk;
            self.bit_pos += span as usize;
            left -= span;
        }
        Ok(value)
    }

    /// Reads a `bits`-wide two's complement field, sign-extended to `i64`.
    pub fn read_signed_bits(&mut self, bits: u8) -> BitResult<i64> {
        if bits == 0 || bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        let raw = self.read_bits(bits)?;
        let shift = 64 - u32::from(bits);
        Ok(((raw << shift) as i64) >> shift)
    }

    /// Skips the rest of a partly read byte.
    pub fn align_to_byte(&mut self) -> BitResult<()> {
        let aligned = self.bit_pos.next_multiple_of(8);
        if aligned > self.data.len() * 8 {
            return Err(BitError::EndOfBuffer {
                requested: aligned - self.bit_pos,
                available: self.bits_remaining(),
            });
        }
        self.bit_pos = aligned;
        Ok(())
    }

    /// The unread tail as bytes. Fails unless the reader is aligned.
    pub fn remaining_bytes(&self) -> BitResult<&'a [u8]> {
        if self.bit_pos % 8 != 0 {
            return Err(BitError::MisalignedAccess {
                bit_position: self.bit_pos,
            });
        }
        Ok(&self.data[self.bit_pos / 8..])
    }
}
