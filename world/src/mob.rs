//! The mob model shared by players and npcs.

use std::fmt;

use crate::block::{
    Animation, BlockState, ChatMessage, ForcedMovement, Graphic, Hit, InteractionTarget,
};
use crate::flags::{UpdateFlag, UpdateFlagSet};
use crate::local::LocalViewSet;
use crate::position::{CoordinateFrame, Direction, Position};

/// Highest assignable mob index. 2047 is the end-of-additions marker in the
/// 11-bit index field, and 0 is never assigned.
pub const MAX_MOB_INDEX: u16 = 2046;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MobKind {
    Player,
    Npc,
}

impl fmt::Display for MobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Npc => write!(f, "npc"),
        }
    }
}

/// Identifies a mob. Players and npcs have separate index spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MobId {
    pub kind: MobKind,
    pub index: u16,
}

impl MobId {
    #[must_use]
    pub const fn new(kind: MobKind, index: u16) -> Self {
        Self { kind, index }
    }

    #[must_use]
    pub const fn player(index: u16) -> Self {
        Self::new(MobKind::Player, index)
    }

    #[must_use]
    pub const fn npc(index: u16) -> Self {
        Self::new(MobKind::Npc, index)
    }
}

impl fmt::Display for MobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Logged in but not yet ready to receive updates.
    Connecting,
    Active,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Privilege {
    #[default]
    Standard,
    Moderator,
    Administrator,
}

impl Privilege {
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Standard => 0,
            Self::Moderator => 1,
            Self::Administrator => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Gender {
    #[default]
    Male,
    Female,
}

/// How a player looks. Equipment slots hold raw wire values: `0` for an
/// empty slot, `0x100 + style` for a body part, `0x200 + item` for an item.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Appearance {
    pub gender: Gender,
    /// `u8::MAX` hides the icon.
    pub head_icon: u8,
    pub equipment: [u16; 12],
    pub colors: [u8; 5],
    /// Stand, turn, walk, turn 180, turn 90 clockwise, turn 90 counter-clockwise, run.
    pub animations: [u16; 7],
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            head_icon: u8::MAX,
            equipment: [
                0,
                0,
                0,
                0,
                0x100 + 18,
                0,
                0x100 + 26,
                0x100 + 36,
                0x100,
                0x100 + 33,
                0x100 + 42,
                0x100 + 10,
            ],
            colors: [0; 5],
            animations: [808, 823, 819, 820, 821, 822, 824],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerData {
    pub username: String,
    pub appearance: Appearance,
    pub combat_level: u8,
    pub total_level: u16,
    pub privilege: Privilege,
    pub session: Session,
    pub(crate) local_players: LocalViewSet,
    pub(crate) local_npcs: LocalViewSet,
}

impl PlayerData {
    /// A fresh account with default looks and levels.
    #[must_use]
    pub fn new(username: impl Into<String>, session: SessionId) -> Self {
        Self {
            username: username.into(),
            appearance: Appearance::default(),
            combat_level: 3,
            total_level: 32,
            privilege: Privilege::Standard,
            session: Session {
                id: session,
                status: SessionStatus::Connecting,
            },
            local_players: LocalViewSet::new(),
            local_npcs: LocalViewSet::new(),
        }
    }

    /// The local view set tracking mobs of `kind`.
    #[must_use]
    pub const fn local(&self, kind: MobKind) -> &LocalViewSet {
        match kind {
            MobKind::Player => &self.local_players,
            MobKind::Npc => &self.local_npcs,
        }
    }

    pub(crate) fn local_mut(&mut self, kind: MobKind) -> &mut LocalViewSet {
        match kind {
            MobKind::Player => &mut self.local_players,
            MobKind::Npc => &mut self.local_npcs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NpcData {
    pub definition: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MobData {
    Player(Box<PlayerData>),
    Npc(NpcData),
}

impl MobData {
    #[must_use]
    pub fn player(data: PlayerData) -> Self {
        Self::Player(Box::new(data))
    }

    #[must_use]
    pub const fn npc(definition: u16) -> Self {
        Self::Npc(NpcData { definition })
    }

    #[must_use]
    pub const fn kind(&self) -> MobKind {
        match self {
            Self::Player(_) => MobKind::Player,
            Self::Npc(_) => MobKind::Npc,
        }
    }
}

/// A player or npc in the world.
#[derive(Debug, Clone)]
pub struct Mob {
    id: MobId,
    spawn: u64,
    position: Position,
    frame: CoordinateFrame,
    teleporting: bool,
    frame_changed: bool,
    active: bool,
    walking_direction: Option<Direction>,
    running_direction: Option<Direction>,
    in_combat: bool,
    flags: UpdateFlagSet,
    blocks: BlockState,
    data: MobData,
}

impl Mob {
    /// Creates an active mob at `position`. Its frame is anchored there and
    /// marked changed, so the first tick sends a region change.
    #[must_use]
    pub fn new(index: u16, position: Position, data: MobData) -> Self {
        Self {
            id: MobId::new(data.kind(), index),
            spawn: 0,
            position,
            frame: CoordinateFrame::anchored_at(position),
            teleporting: false,
            frame_changed: true,
            active: true,
            walking_direction: None,
            running_direction: None,
            in_combat: false,
            flags: UpdateFlagSet::new(),
            blocks: BlockState::default(),
            data,
        }
    }

    #[must_use]
    pub const fn id(&self) -> MobId {
        self.id
    }

    /// Serial of this incarnation. Indices are reused after a mob leaves;
    /// the serial tells a newcomer apart from the mob that held its index.
    #[must_use]
    pub const fn spawn(&self) -> u64 {
        self.spawn
    }

    pub(crate) fn with_spawn(mut self, spawn: u64) -> Self {
        self.spawn = spawn;
        self
    }

    #[must_use]
    pub const fn kind(&self) -> MobKind {
        self.id.kind
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub const fn frame(&self) -> CoordinateFrame {
        self.frame
    }

    #[must_use]
    pub const fn is_teleporting(&self) -> bool {
        self.teleporting
    }

    #[must_use]
    pub const fn frame_changed(&self) -> bool {
        self.frame_changed
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub const fn walking_direction(&self) -> Option<Direction> {
        self.walking_direction
    }

    #[must_use]
    pub const fn running_direction(&self) -> Option<Direction> {
        self.running_direction
    }

    #[must_use]
    pub const fn in_combat(&self) -> bool {
        self.in_combat
    }

    #[must_use]
    pub const fn flags(&self) -> &UpdateFlagSet {
        &self.flags
    }

    #[must_use]
    pub const fn blocks(&self) -> &BlockState {
        &self.blocks
    }

    #[must_use]
    pub const fn data(&self) -> &MobData {
        &self.data
    }

    #[must_use]
    pub fn player(&self) -> Option<&PlayerData> {
        match &self.data {
            MobData::Player(player) => Some(&**player),
            MobData::Npc(_) => None,
        }
    }

    pub fn player_mut(&mut self) -> Option<&mut PlayerData> {
        match &mut self.data {
            MobData::Player(player) => Some(&mut **player),
            MobData::Npc(_) => None,
        }
    }

    #[must_use]
    pub const fn npc(&self) -> Option<&NpcData> {
        match &self.data {
            MobData::Npc(npc) => Some(npc),
            MobData::Player(_) => None,
        }
    }

    /// The session, for players.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.player().map(|player| player.session)
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn set_in_combat(&mut self, in_combat: bool) {
        self.in_combat = in_combat;
    }

    pub fn play_animation(&mut self, animation: Animation) {
        self.blocks.animation = Some(animation);
        self.flags.flag(UpdateFlag::Animation);
    }

    pub fn play_graphic(&mut self, graphic: Graphic) {
        self.blocks.graphic = Some(graphic);
        self.flags.flag(UpdateFlag::Graphic);
    }

    pub fn say(&mut self, message: ChatMessage) {
        self.blocks.chat = Some(message);
        self.flags.flag(UpdateFlag::Chat);
    }

    pub fn force_chat(&mut self, text: impl Into<String>) {
        self.blocks.forced_chat = Some(text.into());
        self.flags.flag(UpdateFlag::ForcedChat);
    }

    pub fn interact(&mut self, target: InteractionTarget) {
        self.blocks.interacting = Some(target);
        self.flags.flag(UpdateFlag::Interacting);
    }

    pub fn face(&mut self, position: Position) {
        self.blocks.face_position = Some(position);
        self.flags.flag(UpdateFlag::FacePosition);
    }

    /// Records a hit. The first hit of a tick is primary, later ones
    /// overwrite the secondary slot.
    pub fn hit(&mut self, hit: Hit) {
        if self.flags.get(UpdateFlag::PrimaryHit) {
            self.blocks.secondary_hit = Some(hit);
            self.flags.flag(UpdateFlag::SecondaryHit);
        } else {
            self.blocks.primary_hit = Some(hit);
            self.flags.flag(UpdateFlag::PrimaryHit);
        }
    }

    /// Changes an npc's definition. Players carry the flag but never send it.
    pub fn transform(&mut self, definition: u16) {
        if let MobData::Npc(npc) = &mut self.data {
            npc.definition = definition;
        }
        self.blocks.transform = Some(definition);
        self.flags.flag(UpdateFlag::Transform);
    }

    pub fn force_move(&mut self, movement: ForcedMovement) {
        self.blocks.forced_movement = Some(movement);
        self.flags.flag(UpdateFlag::ForcedMovement);
    }

    /// Flags the appearance block; its bytes come from the kind data.
    pub fn update_appearance(&mut self) {
        self.flags.flag(UpdateFlag::Appearance);
    }

    /// Re-anchors the frame if the mob left its comfortable area. Returns
    /// `true` if the frame changed this tick (including at registration).
    pub fn update_frame(&mut self) -> bool {
        if !self.frame.keeps(self.position) {
            self.frame = CoordinateFrame::anchored_at(self.position);
            self.frame_changed = true;
        }
        self.frame_changed
    }

    /// Clears everything that lives for a single tick.
    pub fn reset_tick_state(&mut self) {
        self.flags.clear();
        self.blocks.clear();
        self.teleporting = false;
        self.frame_changed = false;
        self.walking_direction = None;
        self.running_direction = None;
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn set_teleporting(&mut self) {
        self.teleporting = true;
    }

    pub(crate) fn set_directions(&mut self, walk: Option<Direction>, run: Option<Direction>) {
        self.walking_direction = walk;
        self.running_direction = run;
    }

    pub(crate) fn local_mut(&mut self, kind: MobKind) -> Option<&mut LocalViewSet> {
        self.player_mut().map(|player| player.local_mut(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::HitKind;

    fn npc_at(x: u16, y: u16) -> Mob {
        Mob::new(7, Position::new(x, y, 0), MobData::npc(1))
    }

    #[test]
    fn id_kind_follows_data() {
        let player = Mob::new(
            3,
            Position::default(),
            MobData::player(PlayerData::new("zezima", SessionId(1))),
        );
        assert_eq!(player.id(), MobId::player(3));
        assert_eq!(npc_at(0, 0).id(), MobId::npc(7));
        assert_eq!(MobId::npc(7).to_string(), "npc#7");
    }

    #[test]
    fn setters_store_data_and_flag() {
        let mut mob = npc_at(3200, 3200);
        mob.play_animation(Animation { id: 422, delay: 0 });
        mob.force_chat("Braaains");
        assert!(mob.flags().get(UpdateFlag::Animation));
        assert!(mob.flags().get(UpdateFlag::ForcedChat));
        assert_eq!(mob.blocks().animation, Some(Animation { id: 422, delay: 0 }));
        assert_eq!(mob.blocks().forced_chat.as_deref(), Some("Braaains"));
    }

    #[test]
    fn second_hit_goes_secondary() {
        let mut mob = npc_at(3200, 3200);
        let hit = |damage| Hit {
            damage,
            kind: HitKind::Normal,
            current_health: 10,
            max_health: 10,
        };
        mob.hit(hit(1));
        mob.hit(hit(2));
        mob.hit(hit(3));
        assert_eq!(mob.blocks().primary_hit.map(|h| h.damage), Some(1));
        assert_eq!(mob.blocks().secondary_hit.map(|h| h.damage), Some(3));
    }

    #[test]
    fn transform_updates_definition() {
        let mut mob = npc_at(3200, 3200);
        mob.transform(50);
        assert_eq!(mob.npc().map(|npc| npc.definition), Some(50));
        assert_eq!(mob.blocks().transform, Some(50));
    }

    #[test]
    fn frame_changes_at_creation_then_settles() {
        let mut mob = npc_at(3222, 3218);
        assert!(mob.update_frame());
        mob.reset_tick_state();
        assert!(!mob.update_frame());

        mob.set_position(Position::new(3222 + 40, 3218, 0));
        assert!(mob.update_frame());
        assert_eq!(mob.frame().anchor(), Position::new(3262, 3218, 0));
    }

    #[test]
    fn reset_clears_tick_state() {
        let mut mob = npc_at(3200, 3200);
        mob.play_graphic(Graphic {
            id: 1,
            height: 100,
            delay: 0,
        });
        mob.set_teleporting();
        mob.set_directions(Some(Direction::North), Some(Direction::North));
        mob.set_in_combat(true);

        mob.reset_tick_state();
        assert!(mob.flags().is_empty());
        assert_eq!(mob.blocks(), &BlockState::default());
        assert!(!mob.is_teleporting());
        assert!(!mob.frame_changed());
        assert_eq!(mob.walking_direction(), None);
        // Combat state outlives the tick.
        assert!(mob.in_combat());
    }
}
