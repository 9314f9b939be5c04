//! Incremental message construction.

use std::ops::{Deref, DerefMut};

use crate::buffer::ByteWriter;
use crate::error::EncodeError;
use crate::frame::{Frame, FrameKind};
use crate::limits::Limits;

/// Builds one framed message.
///
/// Dereferences to [`ByteWriter`], so payload fields (and bit sections via
/// [`ByteWriter::bit_access`]) are written directly on the builder.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    opcode: u8,
    kind: FrameKind,
    body: ByteWriter,
}

impl MessageBuilder {
    #[must_use]
    pub fn new(opcode: u8, kind: FrameKind) -> Self {
        Self {
            opcode,
            kind,
            body: ByteWriter::new(),
        }
    }

    #[must_use]
    pub fn with_capacity(opcode: u8, kind: FrameKind, capacity: usize) -> Self {
        Self {
            opcode,
            kind,
            body: ByteWriter::with_capacity(capacity),
        }
    }

    #[must_use]
    pub const fn opcode(&self) -> u8 {
        self.opcode
    }

    /// Validates the payload and produces the frame.
    pub fn finish(self, limits: &Limits) -> Result<Frame, EncodeError> {
        Frame::new(self.opcode, self.kind, self.body.into_vec(), limits)
    }
}

impl Deref for MessageBuilder {
    type Target = ByteWriter;

    fn deref(&self) -> &ByteWriter {
        &self.body
    }
}

impl DerefMut for MessageBuilder {
    fn deref_mut(&mut self) -> &mut ByteWriter {
        &mut self.body
    }
}
