//! Errors that abort one observer's update.

use std::fmt;

use codec::CodecError;
use world::WorldError;

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SyncError {
    /// A message could not be built.
    Codec(CodecError),
    /// The observer's state could not be read or written back.
    World(WorldError),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec(e) => write!(f, "codec error: {e}"),
            Self::World(e) => write!(f, "world error: {e}"),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Codec(e) => Some(e),
            Self::World(e) => Some(e),
        }
    }
}

impl From<CodecError> for SyncError {
    fn from(err: CodecError) -> Self {
        Self::Codec(err)
    }
}

impl From<WorldError> for SyncError {
    fn from(err: WorldError) -> Self {
        Self::World(err)
    }
}
