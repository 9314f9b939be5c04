//! Hand-off of finished frames to the network layer.

use std::collections::{HashMap, HashSet};
use std::fmt;

use wire::Frame;
use world::SessionId;

/// Per-session outbound queue owned by the network layer.
///
/// The synchronizer queues every frame of a tick with `send` and then calls
/// `flush` at most once per session.
pub trait Transport {
    fn send(&mut self, session: SessionId, frame: Frame) -> Result<(), TransportError>;

    fn flush(&mut self, session: SessionId) -> Result<(), TransportError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportError {
    /// The connection is gone.
    Closed { session: SessionId },
    /// The outbound queue is full.
    Backpressure { session: SessionId, queued: usize },
}

impl TransportError {
    #[must_use]
    pub const fn session(&self) -> SessionId {
        match self {
            Self::Closed { session } | Self::Backpressure { session, .. } => *session,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed { session } => write!(f, "session {} is closed", session.0),
            Self::Backpressure { session, queued } => {
                write!(f, "session {} has {queued} frames queued", session.0)
            }
        }
    }
}

impl std::error::Error for TransportError {}

#[derive(Debug, Default)]
struct Queue {
    pending: Vec<Frame>,
    delivered: Vec<Frame>,
    flushes: usize,
}

/// In-memory transport that records what each session received.
#[derive(Debug)]
pub struct MemoryTransport {
    queues: HashMap<SessionId, Queue>,
    closed: HashSet<SessionId>,
    max_pending: usize,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_pending(usize::MAX)
    }

    /// Rejects sends once a session has `max_pending` unflushed frames.
    #[must_use]
    pub fn with_max_pending(max_pending: usize) -> Self {
        Self {
            queues: HashMap::new(),
            closed: HashSet::new(),
            max_pending,
        }
    }

    /// Makes every later call for `session` fail.
    pub fn close(&mut self, session: SessionId) {
        self.closed.insert(session);
    }

    /// Frames flushed to `session` so far.
    #[must_use]
    pub fn delivered(&self, session: SessionId) -> &[Frame] {
        self.queues
            .get(&session)
            .map_or(&[], |queue| queue.delivered.as_slice())
    }

    /// Takes the frames flushed to `session`.
    pub fn take_delivered(&mut self, session: SessionId) -> Vec<Frame> {
        self.queues
            .get_mut(&session)
            .map(|queue| std::mem::take(&mut queue.delivered))
            .unwrap_or_default()
    }

    /// Frames queued but not flushed.
    #[must_use]
    pub fn pending(&self, session: SessionId) -> usize {
        self.queues.get(&session).map_or(0, |queue| queue.pending.len())
    }

    #[must_use]
    pub fn flushes(&self, session: SessionId) -> usize {
        self.queues.get(&session).map_or(0, |queue| queue.flushes)
    }

    /// Sessions that have received anything, sorted.
    #[must_use]
    pub fn sessions(&self) -> Vec<SessionId> {
        let mut sessions: Vec<_> = self.queues.keys().copied().collect();
        sessions.sort_unstable();
        sessions
    }
}

impl Transport for MemoryTransport {
    fn send(&mut self, session: SessionId, frame: Frame) -> Result<(), TransportError> {
        if self.closed.contains(&session) {
            return Err(TransportError::Closed { session });
        }
        let queue = self.queues.entry(session).or_default();
        if queue.pending.len() >= self.max_pending {
            return Err(TransportError::Backpressure {
                session,
                queued: queue.pending.len(),
            });
        }
        queue.pending.push(frame);
        Ok(())
    }

    fn flush(&mut self, session: SessionId) -> Result<(), TransportError> {
        if self.closed.contains(&session) {
            return Err(TransportError::Closed { session });
        }
        let queue = self.queues.entry(session).or_default();
        queue.delivered.append(&mut queue.pending);
        queue.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire::{FrameKind, Limits};

    fn frame(byte: u8) -> Frame {
        Frame::new(73, FrameKind::Fixed(4), vec![byte; 4], &Limits::default()).unwrap()
    }

    #[test]
    fn frames_arrive_on_flush() {
        let mut transport = MemoryTransport::new();
        let session = SessionId(1);
        transport.send(session, frame(1)).unwrap();
        transport.send(session, frame(2)).unwrap();
        assert_eq!(transport.pending(session), 2);
        assert!(transport.delivered(session).is_empty());

        transport.flush(session).unwrap();
        assert_eq!(transport.delivered(session), &[frame(1), frame(2)]);
        assert_eq!(transport.flushes(session), 1);
        assert_eq!(transport.take_delivered(session).len(), 2);
        assert!(transport.delivered(session).is_empty());
    }

    #[test]
    fn closed_sessions_fail() {
        let mut transport = MemoryTransport::new();
        transport.close(SessionId(4));
        let err = transport.send(SessionId(4), frame(0)).unwrap_err();
        assert_eq!(err, TransportError::Closed { session: SessionId(4) });
        assert_eq!(err.session(), SessionId(4));
        assert!(transport.flush(SessionId(4)).is_err());
    }

    #[test]
    fn backpressure_limits_pending() {
        let mut transport = MemoryTransport::with_max_pending(1);
        transport.send(SessionId(1), frame(0)).unwrap();
        assert!(matches!(
            transport.send(SessionId(1), frame(0)),
            Err(TransportError::Backpressure { queued: 1, .. })
        ));
    }
}
