//! Byte-level payload writer and reader with the client's value transforms.
//!
//! Transform names follow the client's conventions:
//!
//! | Name | Write | Read |
//! |---|---|---|
//! | `add` | `v + 128` | `v - 128` |
//! | `negate` | `-v` | `-v` |
//! | `subtract` | `128 - v` | `128 - v` |
//!
//! On a `u16`, a transform applies to the low byte only. All arithmetic wraps.

use bitstream::{BitReader, BitWriter};

use crate::error::{DecodeError, EncodeError, LimitKind, WireResult};
use crate::limits::Limits;

/// Terminates string fields.
pub const STRING_TERMINATOR: u8 = 10;

/// Growable payload buffer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn put_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn put_u8_add(&mut self, value: u8) {
        self.bytes.push(value.wrapping_add(128));
    }

    pub fn put_u8_negate(&mut self, value: u8) {
        self.bytes.push(value.wrapping_neg());
    }

    pub fn put_u8_subtract(&mut self, value: u8) {
        self.bytes.push(128u8.wrapping_sub(value));
    }

    /// Big-endian.
    pub fn put_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn put_u16_le(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Big-endian with `add` on the low byte.
    pub fn put_u16_add(&mut self, value: u16) {
        let [high, low] = value.to_be_bytes();
        self.bytes.push(high);
        self.bytes.push(low.wrapping_add(128));
    }

    /// Little-endian with `add` on the low byte.
    pub fn put_u16_le_add(&mut self, value: u16) {
        let [high, low] = value.to_be_bytes();
        self.bytes.push(low.wrapping_add(128));
        self.bytes.push(high);
    }

    pub fn put_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn put_u64(&mut self, value: u64) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes `value` followed by [`STRING_TERMINATOR`].
    pub fn put_str(&mut self, value: &str) -> Result<(), EncodeError> {
        if value.as_bytes().contains(&STRING_TERMINATOR) {
            return Err(EncodeError::InvalidString);
        }
        self.bytes.extend_from_slice(value.as_bytes());
        self.bytes.push(STRING_TERMINATOR);
        Ok(())
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub fn put_bytes_reversed(&mut self, bytes: &[u8]) {
        self.bytes.extend(bytes.iter().rev());
    }

    /// Runs `f` in bit mode. The bits are padded to a byte boundary and
    /// appended when `f` returns successfully; on error nothing is appended.
    pub fn bit_access<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut BitWriter) -> Result<T, E>,
    {
        let mut bits = BitWriter::new();
        let value = f(&mut bits)?;
        bits.finish_into(&mut self.bytes);
        Ok(value)
    }
}

/// Bounded cursor over a payload.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Unread bytes.
    #[must_use]
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn take(&mut self, len: usize) -> WireResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(DecodeError::Truncated {
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> WireResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn get_u8(&mut self) -> WireResult<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn get_u8_add(&mut self) -> WireResult<u8> {
        Ok(self.get_u8()?.wrapping_sub(128))
    }

    pub fn get_u8_negate(&mut self) -> WireResult<u8> {
        Ok(self.get_u8()?.wrapping_neg())
    }

    pub fn get_u8_subtract(&mut self) -> WireResult<u8> {
        Ok(128u8.wrapping_sub(self.get_u8()?))
    }

    pub fn get_u16(&mut self) -> WireResult<u16> {
        Ok(u16::from_be_bytes(self.take_array()?))
    }

    pub fn get_u16_le(&mut self) -> WireResult<u16> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn get_u16_add(&mut self) -> WireResult<u16> {
        let [high, low] = self.take_array()?;
        Ok(u16::from_be_bytes([high, low.wrapping_sub(128)]))
    }

    pub fn get_u16_le_add(&mut self) -> WireResult<u16> {
        let [low, high] = self.take_array()?;
        Ok(u16::from_be_bytes([high, low.wrapping_sub(128)]))
    }

    pub fn get_u32(&mut self) -> WireResult<u32> {
        Ok(u32::from_be_bytes(self.take_array()?))
    }

    pub fn get_u64(&mut self) -> WireResult<u64> {
        Ok(u64::from_be_bytes(self.take_array()?))
    }

    /// Reads a terminated string, enforcing `limits.max_string_bytes`.
    pub fn get_str(&mut self, limits: &Limits) -> WireResult<String> {
        let rest = self.rest();
        let len = rest
            .iter()
            .position(|&b| b == STRING_TERMINATOR)
            .ok_or(DecodeError::UnterminatedString)?;
        if len > limits.max_string_bytes {
            return Err(DecodeError::LimitsExceeded {
                kind: LimitKind::StringBytes,
                limit: limits.max_string_bytes,
                actual: len,
            });
        }
        let value = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.pos += len + 1;
        Ok(value)
    }

    pub fn get_bytes(&mut self, len: usize) -> WireResult<&'a [u8]> {
        self.take(len)
    }

    pub fn get_bytes_reversed(&mut self, len: usize) -> WireResult<Vec<u8>> {
        Ok(self.take(len)?.iter().rev().copied().collect())
    }

    /// Runs `f` over a bit reader positioned at the cursor, then advances the
    /// cursor past every byte the bits touched.
    pub fn bit_access<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut BitReader<'a>) -> Result<T, E>,
    {
        let mut bits = BitReader::new(self.rest());
        let value = f(&mut bits)?;
        self.pos += bits.byte_position();
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_transforms() {
        let mut w = ByteWriter::new();
        w.put_u8_add(5);
        w.put_u8_negate(5);
        w.put_u8_subtract(5);
        assert_eq!(w.as_slice(), &[133, 251, 123]);

        let mut r = ByteReader::new(w.as_slice());
        assert_eq!(r.get_u8_add().unwrap(), 5);
        assert_eq!(r.get_u8_negate().unwrap(), 5);
        assert_eq!(r.get_u8_subtract().unwrap(), 5);
        assert!(r.is_empty());
    }

    #[test]
    fn short_transforms() {
        let mut w = ByteWriter::new();
        w.put_u16(0x1234);
        w.put_u16_le(0x1234);
        w.put_u16_add(0x1234);
        w.put_u16_le_add(0x1234);
        assert_eq!(
            w.as_slice(),
            &[0x12, 0x34, 0x34, 0x12, 0x12, 0xB4, 0xB4, 0x12]
        );

        let mut r = ByteReader::new(w.as_slice());
        assert_eq!(r.get_u16().unwrap(), 0x1234);
        assert_eq!(r.get_u16_le().unwrap(), 0x1234);
        assert_eq!(r.get_u16_add().unwrap(), 0x1234);
        assert_eq!(r.get_u16_le_add().unwrap(), 0x1234);
    }

    #[test]
    fn wide_integers_big_endian() {
        let mut w = ByteWriter::new();
        w.put_u32(0x0102_0304);
        w.put_u64(7);
        assert_eq!(&w.as_slice()[..4], &[1, 2, 3, 4]);

        let mut r = ByteReader::new(w.as_slice());
        assert_eq!(r.get_u32().unwrap(), 0x0102_0304);
        assert_eq!(r.get_u64().unwrap(), 7);
    }

    #[test]
    fn string_roundtrip() {
        let mut w = ByteWriter::new();
        w.put_str("Hello").unwrap();
        w.put_u8(1);
        assert_eq!(w.as_slice(), b"Hello\n\x01");

        let mut r = ByteReader::new(w.as_slice());
        assert_eq!(r.get_str(&Limits::default()).unwrap(), "Hello");
        assert_eq!(r.get_u8().unwrap(), 1);
    }

    #[test]
    fn string_with_terminator_rejected() {
        let mut w = ByteWriter::new();
        assert_eq!(w.put_str("a\nb"), Err(EncodeError::InvalidString));
        assert!(w.is_empty());
    }

    #[test]
    fn string_limits() {
        let mut r = ByteReader::new(b"abc");
        assert_eq!(
            r.get_str(&Limits::default()),
            Err(DecodeError::UnterminatedString)
        );

        let long = [b'x'; 90].iter().copied().chain([10]).collect::<Vec<_>>();
        let mut r = ByteReader::new(&long);
        assert!(matches!(
            r.get_str(&Limits::for_testing()),
            Err(DecodeError::LimitsExceeded {
                kind: LimitKind::StringBytes,
                ..
            })
        ));
    }

    #[test]
    fn reversed_bytes() {
        let mut w = ByteWriter::new();
        w.put_bytes_reversed(&[1, 2, 3]);
        assert_eq!(w.as_slice(), &[3, 2, 1]);

        let mut r = ByteReader::new(w.as_slice());
        assert_eq!(r.get_bytes_reversed(3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn truncated_read() {
        let mut r = ByteReader::new(&[1]);
        assert_eq!(
            r.get_u16(),
            Err(DecodeError::Truncated {
                needed: 2,
                available: 1
            })
        );
        // Failed read does not consume.
        assert_eq!(r.get_u8().unwrap(), 1);
    }

    #[test]
    fn bit_access_pads_and_appends() {
        let mut w = ByteWriter::new();
        w.put_u8(0xAA);
        w.bit_access(|bits| -> Result<(), EncodeError> {
            bits.write_bit(true);
            bits.write_bits(3, 2)?;
            Ok(())
        })
        .unwrap();
        w.put_u8(0xBB);
        assert_eq!(w.as_slice(), &[0xAA, 0b1110_0000, 0xBB]);

        let mut r = ByteReader::new(w.as_slice());
        assert_eq!(r.get_u8().unwrap(), 0xAA);
        let value = r
            .bit_access(|bits| -> Result<u64, DecodeError> {
                assert!(bits.read_bit()?);
                Ok(bits.read_bits(2)?)
            })
            .unwrap();
        assert_eq!(value, 3);
        assert_eq!(r.get_u8().unwrap(), 0xBB);
    }

    #[test]
    fn bit_access_error_appends_nothing() {
        let mut w = ByteWriter::new();
        let result = w.bit_access(|bits| -> Result<(), EncodeError> {
            bits.write_bits(8, 3)?;
            Ok(())
        });
        assert!(matches!(result, Err(EncodeError::Bits(_))));
        assert!(w.is_empty());
    }
}
