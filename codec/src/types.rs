//! Core types for the codec.

/// A simulation tick number.
///
/// Ticks increase by one per update pass and only label logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tick(u64);

impl Tick {
    #[must_use]
    pub const fn new(tick: u64) -> Self {
        Self(tick)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// The following tick.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl From<u64> for Tick {
    fn from(tick: u64) -> Self {
        Self(tick)
    }
}

impl From<Tick> for u64 {
    fn from(tick: Tick) -> Self {
        tick.0
    }
}

impl std::fmt::Display for Tick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which reader a mob's update blocks are encoded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Perspective {
    /// The observer's own blocks. Chat is suppressed; the client echoes it locally.
    SelfView,
    /// A mob the observer starts tracking this tick. Appearance is forced.
    AddNew,
    /// A mob the observer already tracks. Bytes are shareable between observers.
    MaintainExisting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_new_and_raw() {
        let tick = Tick::new(100);
        assert_eq!(tick.raw(), 100);
        assert_eq!(tick.next(), Tick::new(101));
    }

    #[test]
    fn tick_conversions() {
        let tick: Tick = 42u64.into();
        let raw: u64 = tick.into();
        assert_eq!(raw, 42);
        assert_eq!(tick.to_string(), "42");
    }

    #[test]
    fn tick_ordering() {
        assert!(Tick::new(1) < Tick::new(2));
        assert_eq!(Tick::default(), Tick::new(0));
    }

    #[test]
    fn tick_next_wraps() {
        assert_eq!(Tick::new(u64::MAX).next(), Tick::new(0));
    }

    #[test]
    fn tick_const() {
        const TICK: Tick = Tick::new(7);
        assert_eq!(TICK.raw(), 7);
    }
}
