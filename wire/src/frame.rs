//! Message framing: opcode, optional length prefix, payload.

use crate::error::{DecodeError, EncodeError, LimitKind, WireResult};
use crate::limits::Limits;

/// How a frame's payload length is conveyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Length is implied by the opcode.
    Fixed(u16),
    /// One length byte follows the opcode.
    VariableByte,
    /// A big-endian `u16` length follows the opcode.
    VariableShort,
}

impl FrameKind {
    /// Size of the length prefix in bytes.
    #[must_use]
    pub const fn prefix_len(self) -> usize {
        match self {
            Self::Fixed(_) => 0,
            Self::VariableByte => 1,
            Self::VariableShort => 2,
        }
    }

    /// Largest payload this kind can express.
    #[must_use]
    pub const fn max_payload(self) -> usize {
        match self {
            Self::Fixed(len) => len as usize,
            Self::VariableByte => u8::MAX as usize,
            Self::VariableShort => u16::MAX as usize,
        }
    }
}

/// A finished outbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub opcode: u8,
    pub kind: FrameKind,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Builds a frame, validating the payload against the kind and limits.
    pub fn new(
        opcode: u8,
        kind: FrameKind,
        payload: Vec<u8>,
        limits: &Limits,
    ) -> Result<Self, EncodeError> {
        let actual = payload.len();
        if let FrameKind::Fixed(expected) = kind {
            if actual != expected as usize {
                return Err(EncodeError::FixedLengthMismatch {
                    opcode,
                    expected: expected as usize,
                    actual,
                });
            }
        }
        let limit = kind.max_payload().min(limits.max_payload_bytes);
        if actual > limit {
            return Err(EncodeError::PayloadTooLarge { limit, actual });
        }
        Ok(Self {
            opcode,
            kind,
            payload,
        })
    }

    /// Total encoded size including opcode and length prefix.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        1 + self.kind.prefix_len() + self.payload.len()
    }

    /// Appends the encoded frame to `out` and returns the bytes written.
    pub fn encode_into(&self, out: &mut Vec<u8>) -> usize {
        out.reserve(self.encoded_len());
        out.push(self.opcode);
        // Payload length was validated in `Frame::new`.
        match self.kind {
            FrameKind::Fixed(_) => {}
            FrameKind::VariableByte => out.push(self.payload.len() as u8),
            FrameKind::VariableShort => {
                out.extend_from_slice(&(self.payload.len() as u16).to_be_bytes());
            }
        }
        out.extend_from_slice(&self.payload);
        self.encoded_len()
    }

    /// Encodes the frame into a fresh buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut out);
        out
    }
}

/// A frame decoded from a byte stream, borrowing its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRef<'a> {
    pub opcode: u8,
    pub kind: FrameKind,
    pub payload: &'a [u8],
}

/// Decodes one frame from the front of `buf`.
///
/// `layout` maps an opcode to its frame kind. Returns the frame and the
/// number of bytes consumed.
pub fn decode_frame<'a, F>(
    buf: &'a [u8],
    layout: F,
    limits: &Limits,
) -> WireResult<(FrameRef<'a>, usize)>
where
    F: Fn(u8) -> Option<FrameKind>,
{
    let Some(&opcode) = buf.first() else {
        return Err(DecodeError::Truncated {
            needed: 1,
            available: 0,
        });
    };
    let kind = layout(opcode).ok_or(DecodeError::UnknownOpcode { opcode })?;
    let header = 1 + kind.prefix_len();
    if buf.len() < header {
        return Err(DecodeError::Truncated {
            needed: header,
            available: buf.len(),
        });
    }

    let len = match kind {
        FrameKind::Fixed(len) => len as usize,
        FrameKind::VariableByte => buf[1] as usize,
        FrameKind::VariableShort => u16::from_be_bytes([buf[1], buf[2]]) as usize,
    };
    if len > limits.max_payload_bytes {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::PayloadBytes,
            limit: limits.max_payload_bytes,
            actual: len,
        });
    }
    let end = header + len;
    if buf.len() < end {
        return Err(DecodeError::Truncated {
            needed: end,
            available: buf.len(),
        });
    }

    Ok((
        FrameRef {
            opcode,
            kind,
            payload: &buf[header..end],
        },
        end,
    ))
}

/// Decodes every frame in `buf`, which must end on a frame boundary.
pub fn decode_frames<'a, F>(buf: &'a [u8], layout: F, limits: &Limits) -> WireResult<Vec<FrameRef<'a>>>
where
    F: Fn(u8) -> Option<FrameKind>,
{
    let mut frames = Vec::new();
    let mut offset = 0;
    while offset < buf.len() {
        let (frame, used) = decode_frame(&buf[offset..], &layout, limits)?;
        frames.push(frame);
        offset += used;
    }
    Ok(frames)
}
