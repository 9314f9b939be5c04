//! The region change message.

use wire::{ByteReader, ByteWriter, Frame, FrameKind, FrameRef, Limits};
use world::CoordinateFrame;

use crate::error::{CodecError, CodecResult};
use crate::protocol::REGION_CHANGE_OPCODE;

/// Tells the client to load the map around a new central chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionChangeMessage {
    pub chunk_x: u16,
    pub chunk_y: u16,
}

impl RegionChangeMessage {
    #[must_use]
    pub const fn for_frame(frame: CoordinateFrame) -> Self {
        let (chunk_x, chunk_y) = frame.central_chunk();
        Self { chunk_x, chunk_y }
    }

    pub fn encode(&self, limits: &Limits) -> CodecResult<Frame> {
        let mut payload = ByteWriter::with_capacity(4);
        payload.put_u16_add(self.chunk_x);
        payload.put_u16(self.chunk_y);
        Ok(Frame::new(
            REGION_CHANGE_OPCODE,
            FrameKind::Fixed(4),
            payload.into_vec(),
            limits,
        )?)
    }

    pub fn decode(frame: &FrameRef<'_>) -> CodecResult<Self> {
        if frame.opcode != REGION_CHANGE_OPCODE {
            return Err(CodecError::UnexpectedOpcode {
                opcode: frame.opcode,
            });
        }
        let mut reader = ByteReader::new(frame.payload);
        let chunk_x = reader.get_u16_add()?;
        let chunk_y = reader.get_u16()?;
        if !reader.is_empty() {
            return Err(CodecError::TrailingData {
                remaining: reader.remaining(),
            });
        }
        Ok(Self { chunk_x, chunk_y })
    }
}
