//! Per-mob dirty markers for update blocks.

/// A field of a mob that can change during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum UpdateFlag {
    Appearance = 0,
    Chat = 1,
    Graphic = 2,
    Animation = 3,
    ForcedChat = 4,
    Interacting = 5,
    FacePosition = 6,
    PrimaryHit = 7,
    SecondaryHit = 8,
    Transform = 9,
    ForcedMovement = 10,
}

impl UpdateFlag {
    pub const ALL: [Self; 11] = [
        Self::Appearance,
        Self::Chat,
        Self::Graphic,
        Self::Animation,
        Self::ForcedChat,
        Self::Interacting,
        Self::FacePosition,
        Self::PrimaryHit,
        Self::SecondaryHit,
        Self::Transform,
        Self::ForcedMovement,
    ];

    const fn bit(self) -> u16 {
        1 << self as u8
    }
}

/// Set of [`UpdateFlag`]s raised on a mob this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UpdateFlagSet {
    bits: u16,
}

impl UpdateFlagSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    pub fn flag(&mut self, flag: UpdateFlag) {
        self.bits |= flag.bit();
    }

    pub fn unflag(&mut self, flag: UpdateFlag) {
        self.bits &= !flag.bit();
    }

    #[must_use]
    pub const fn get(&self, flag: UpdateFlag) -> bool {
        self.bits & flag.bit() != 0
    }

    pub fn clear(&mut self) {
        self.bits = 0;
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Raised flags in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = UpdateFlag> + '_ {
        UpdateFlag::ALL.into_iter().filter(|flag| self.get(*flag))
    }
}

impl FromIterator<UpdateFlag> for UpdateFlagSet {
    fn from_iter<I: IntoIterator<Item = UpdateFlag>>(iter: I) -> Self {
        let mut set = Self::new();
        for flag in iter {
            set.flag(flag);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_and_unflag() {
        let mut flags = UpdateFlagSet::new();
        assert!(flags.is_empty());

        flags.flag(UpdateFlag::Chat);
        flags.flag(UpdateFlag::PrimaryHit);
        assert!(flags.get(UpdateFlag::Chat));
        assert!(!flags.get(UpdateFlag::Appearance));
        assert_eq!(flags.len(), 2);

        flags.unflag(UpdateFlag::Chat);
        assert!(!flags.get(UpdateFlag::Chat));
        assert_eq!(flags.len(), 1);
    }

    #[test]
    fn flagging_twice_is_idempotent() {
        let mut flags = UpdateFlagSet::new();
        flags.flag(UpdateFlag::Graphic);
        flags.flag(UpdateFlag::Graphic);
        assert_eq!(flags.len(), 1);
    }

    #[test]
    fn clear_empties() {
        let mut flags: UpdateFlagSet = UpdateFlag::ALL.into_iter().collect();
        assert_eq!(flags.len(), UpdateFlag::ALL.len());
        flags.clear();
        assert!(flags.is_empty());
    }

    #[test]
    fn iter_in_declaration_order() {
        let flags: UpdateFlagSet = [
            UpdateFlag::ForcedMovement,
            UpdateFlag::Appearance,
            UpdateFlag::Interacting,
        ]
        .into_iter()
        .collect();
        let listed: Vec<_> = flags.iter().collect();
        assert_eq!(
            listed,
            vec![
                UpdateFlag::Appearance,
                UpdateFlag::Interacting,
                UpdateFlag::ForcedMovement
            ]
        );
    }
}
