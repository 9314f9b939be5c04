//! Seeded worlds that move and act on their own.

use anyhow::{Context, Result};
use serde::Serialize;
use world::{
    Animation, ChatMessage, DefinitionTable, Direction, Graphic, Hit, HitKind, MobData, MobId,
    MobKind, NpcDefinition, PlayerData, Position, SessionId, SessionStatus, World,
};

/// Lumbridge-ish spawn centre.
pub const CENTRE: Position = Position::new(3222, 3218, 0);

/// Shape of a generated world.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioConfig {
    pub players: u16,
    pub npcs: u16,
    pub seed: u64,
    /// Mobs spawn and wander within this many tiles of [`CENTRE`].
    pub spread: u16,
    /// One in `teleport_every` player steps is a teleport. Zero disables it.
    pub teleport_every: u32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            players: 64,
            npcs: 400,
            seed: 1,
            spread: 48,
            teleport_every: 200,
        }
    }
}

/// Npc definitions used when none are loaded.
#[must_use]
pub fn default_definitions() -> DefinitionTable {
    [
        (1, "Man", 1, 2),
        (2, "Goblin", 1, 5),
        (3, "Giant rat", 2, 3),
        (4, "Guard", 1, 21),
        (5, "Hill giant", 2, 28),
    ]
    .into_iter()
    .map(|(id, name, size, combat_level)| NpcDefinition {
        id,
        name: name.to_string(),
        size,
        combat_level,
    })
    .collect()
}

/// A world plus the generator driving it.
#[derive(Debug)]
pub struct Scenario {
    pub world: World,
    config: ScenarioConfig,
    rng: Rng,
    players: Vec<MobId>,
    npcs: Vec<MobId>,
    definitions: Vec<u16>,
}

impl Scenario {
    pub fn new(config: ScenarioConfig, definitions: DefinitionTable) -> Result<Self> {
        let mut ids: Vec<u16> = definitions.iter().map(|definition| definition.id).collect();
        ids.sort_unstable();
        anyhow::ensure!(!ids.is_empty(), "scenario needs at least one npc definition");

        let mut scenario = Self {
            world: World::new(definitions),
            rng: Rng::new(config.seed),
            config,
            players: Vec::new(),
            npcs: Vec::new(),
            definitions: ids,
        };

        for index in 0..scenario.config.players {
            let position = scenario.random_position();
            let data = PlayerData::new(format!("player{index}"), SessionId(u32::from(index) + 1));
            let id = scenario
                .world
                .register(position, MobData::player(data))
                .with_context(|| format!("register player {index}"))?;
            if let Some(player) = scenario.world.mob_mut(id).and_then(|mob| mob.player_mut()) {
                player.session.status = SessionStatus::Active;
            }
            scenario.players.push(id);
        }
        for index in 0..scenario.config.npcs {
            let position = scenario.random_position();
            let definition = scenario.definitions[scenario.rng.below(scenario.definitions.len())];
            let id = scenario
                .world
                .register(position, MobData::npc(definition))
                .with_context(|| format!("register npc {index}"))?;
            scenario.npcs.push(id);
        }
        Ok(scenario)
    }

    #[must_use]
    pub const fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    #[must_use]
    pub fn players(&self) -> &[MobId] {
        &self.players
    }

    #[must_use]
    pub fn npcs(&self) -> &[MobId] {
        &self.npcs
    }

    /// Applies one tick of gameplay: movement and the odd update block.
    pub fn step(&mut self) -> Result<()> {
        for index in 0..self.players.len() {
            let id = self.players[index];
            self.step_player(id).with_context(|| format!("step {id}"))?;
        }
        for index in 0..self.npcs.len() {
            let id = self.npcs[index];
            self.step_npc(id).with_context(|| format!("step {id}"))?;
        }
        Ok(())
    }

    fn step_player(&mut self, id: MobId) -> Result<()> {
        let every = self.config.teleport_every;
        if every > 0 && self.rng.next_u32() % every == 0 {
            let destination = self.random_position();
            self.world.teleport(id, destination)?;
        } else {
            match self.rng.below(4) {
                0 => {}
                1 => self.wander(id, false)?,
                _ => self.wander(id, true)?,
            }
        }

        let roll = self.rng.below(40);
        let Some(mob) = self.world.mob_mut(id) else {
            return Ok(());
        };
        match roll {
            0 => mob.say(ChatMessage {
                text: b"hello".to_vec(),
                color: 0,
                effects: 0,
            }),
            1 => mob.play_animation(Animation { id: 866, delay: 0 }),
            2 => mob.update_appearance(),
            3 => mob.play_graphic(Graphic {
                id: 86,
                height: 100,
                delay: 0,
            }),
            _ => {}
        }
        Ok(())
    }

    fn step_npc(&mut self, id: MobId) -> Result<()> {
        if self.rng.below(5) == 0 {
            self.wander(id, false)?;
        }

        let roll = self.rng.below(60);
        let damage = self.rng.below(10) as u8;
        let Some(mob) = self.world.mob_mut(id) else {
            return Ok(());
        };
        match roll {
            0 => mob.force_chat("Nice weather"),
            1 | 2 => {
                mob.set_in_combat(true);
                mob.hit(Hit {
                    damage,
                    kind: if damage == 0 {
                        HitKind::Block
                    } else {
                        HitKind::Normal
                    },
                    current_health: 10,
                    max_health: 10,
                });
            }
            3 => mob.set_in_combat(false),
            4 => mob.play_animation(Animation { id: 422, delay: 0 }),
            _ => {}
        }
        Ok(())
    }

    /// Takes a random step, or two when `run` is set, staying within the
    /// spawn area. Steps that would leave it are skipped.
    fn wander(&mut self, id: MobId, run: bool) -> Result<()> {
        let Some(from) = self.world.mob(id).map(world::Mob::position) else {
            return Ok(());
        };
        let walk = Direction::ALL[self.rng.below(Direction::ALL.len())];
        let run = run.then(|| Direction::ALL[self.rng.below(Direction::ALL.len())]);

        let mut to = from.step(walk);
        if let Some(run) = run {
            to = to.and_then(|position| position.step(run));
        }
        if to.is_some_and(|position| self.in_area(position)) {
            self.world.move_mob(id, walk, run)?;
        }
        Ok(())
    }

    fn in_area(&self, position: Position) -> bool {
        CENTRE.is_within(position, self.config.spread)
    }

    fn random_position(&mut self) -> Position {
        let spread = i64::from(self.config.spread);
        let dx = self.rng.range_i64(-spread, spread);
        let dy = self.rng.range_i64(-spread, spread);
        Position::new(
            (i64::from(CENTRE.x) + dx) as u16,
            (i64::from(CENTRE.y) + dy) as u16,
            CENTRE.plane,
        )
    }

    /// Mob count of `kind`.
    #[must_use]
    pub fn count(&self, kind: MobKind) -> usize {
        self.world.count(kind)
    }
}

/// 64-bit LCG; reproducible across platforms.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        (self.state >> 32) as u32
    }

    /// Uniform-ish value in `0..bound`; `bound` must be non-zero.
    pub fn below(&mut self, bound: usize) -> usize {
        self.next_u32() as usize % bound
    }

    /// Value in `min..=max`.
    pub fn range_i64(&mut self, min: i64, max: i64) -> i64 {
        let span = (max - min).unsigned_abs() + 1;
        min + (u64::from(self.next_u32()) % span) as i64
    }
}
