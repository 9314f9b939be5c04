//! Runs a scenario through the synchronizer and measures the traffic.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use synchronizer::{MemoryTransport, SyncConfig, Synchronizer, TickReport};
use world::{MobKind, ViewabilityResolver, World};

use crate::scenario::{Scenario, ScenarioConfig};

/// Totals and percentiles over a simulation run, written as `summary.json`.
#[derive(Debug, Default, Serialize)]
pub struct Summary {
    pub scenario: Option<ScenarioConfig>,
    pub config: Option<SyncConfig>,
    pub ticks: u32,
    pub messages: u64,
    pub unchanged: u64,
    pub region_changes: u64,
    pub bytes_total: u64,
    pub added: u64,
    pub removed: u64,
    pub deferred: u64,
    pub cache_hits: u64,
    pub failures: u64,
    pub transport_failures: u64,
    /// What bincode-encoding every viewable mob's full state per observer
    /// would have cost.
    pub naive_bincode_bytes_total: u64,
    pub avg_bytes_per_tick: u64,
    pub p95_tick_bytes: u64,
    pub avg_tick_us: u64,
    pub p95_tick_us: u64,
    /// Per-tick reports, oldest first.
    pub reports: Vec<TickReport>,
    #[serde(skip)]
    tick_bytes: Vec<u64>,
    #[serde(skip)]
    tick_us: Vec<u64>,
}

impl Summary {
    fn record(&mut self, report: TickReport, elapsed_us: u64, naive: u64) {
        self.ticks += 1;
        self.messages += report.messages as u64;
        self.unchanged += report.unchanged as u64;
        self.region_changes += report.region_changes as u64;
        self.bytes_total += report.bytes as u64;
        self.added += report.added as u64;
        self.removed += report.removed as u64;
        self.deferred += report.deferred as u64;
        self.cache_hits += report.cache_hits as u64;
        self.failures += report.failures.len() as u64;
        self.transport_failures += report.transport_failures.len() as u64;
        self.naive_bincode_bytes_total += naive;
        self.tick_bytes.push(report.bytes as u64);
        self.tick_us.push(elapsed_us);
        self.reports.push(report);
    }

    fn finalize(&mut self) {
        if self.ticks > 0 {
            self.avg_bytes_per_tick = self.bytes_total / u64::from(self.ticks);
            self.avg_tick_us = self.tick_us.iter().sum::<u64>() / u64::from(self.ticks);
        }
        self.p95_tick_bytes = p95(&mut self.tick_bytes);
        self.p95_tick_us = p95(&mut self.tick_us);
    }

    /// Fails if the p95 tick size exceeds `max`.
    pub fn assert_budget(&self, max_p95_tick_bytes: Option<u64>) -> Result<()> {
        if let Some(max) = max_p95_tick_bytes {
            if self.p95_tick_bytes > max {
                anyhow::bail!(
                    "p95 tick bytes {} exceeds budget {}",
                    self.p95_tick_bytes,
                    max
                );
            }
        }
        Ok(())
    }
}

fn p95(values: &mut [u64]) -> u64 {
    if values.is_empty() {
        return 0;
    }
    values.sort_unstable();
    let idx = ((values.len() as f64) * 0.95).ceil() as usize;
    values[idx.saturating_sub(1).min(values.len() - 1)]
}

/// Runs `ticks` ticks and returns the summary. With `dump_dir` set, every
/// delivered frame is written there as `t{tick}-s{session}-{n}-op{opcode}.bin`.
pub fn simulate(
    scenario: ScenarioConfig,
    definitions: world::DefinitionTable,
    config: SyncConfig,
    ticks: u32,
    dump_dir: Option<&Path>,
) -> Result<Summary> {
    let mut sync = Synchronizer::new(config.clone()).context("invalid sync config")?;
    let resolver = config.resolver().context("invalid viewing distance")?;
    let mut scenario = Scenario::new(scenario, definitions)?;
    let mut transport = MemoryTransport::new();
    if let Some(dir) = dump_dir {
        fs::create_dir_all(dir).with_context(|| format!("create dump dir {}", dir.display()))?;
    }

    let mut summary = Summary {
        scenario: Some(scenario.config().clone()),
        config: Some(config),
        ..Summary::default()
    };

    for _ in 0..ticks {
        scenario.step()?;
        let naive = naive_full_state_bytes(&scenario.world, &resolver)?;

        let start = Instant::now();
        let report = sync.run_tick(&mut scenario.world, &mut transport);
        let elapsed = start.elapsed().as_micros() as u64;

        if let Some(dir) = dump_dir {
            dump_frames(dir, report.tick, &mut transport)?;
        } else {
            for session in transport.sessions() {
                transport.take_delivered(session);
            }
        }
        tracing::info!(
            tick = report.tick,
            messages = report.messages,
            bytes = report.bytes,
            deferred = report.deferred,
            "tick"
        );
        summary.record(report, elapsed, naive);
    }

    summary.finalize();
    Ok(summary)
}

fn dump_frames(dir: &Path, tick: u64, transport: &mut MemoryTransport) -> Result<()> {
    for session in transport.sessions() {
        for (n, frame) in transport.take_delivered(session).into_iter().enumerate() {
            let path: PathBuf = dir.join(format!(
                "t{tick:05}-s{:04}-{n}-op{}.bin",
                session.0, frame.opcode
            ));
            fs::write(&path, frame.to_bytes())
                .with_context(|| format!("write frame {}", path.display()))?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct FullState {
    index: u16,
    npc: bool,
    x: u16,
    y: u16,
    plane: u8,
    flags: Vec<u8>,
}

/// Bytes of a bincode snapshot of every mob each observer can see.
fn naive_full_state_bytes(world: &World, resolver: &ViewabilityResolver) -> Result<u64> {
    let mut total = 0u64;
    for observer in world.mobs(MobKind::Player) {
        let visible: Vec<FullState> = [MobKind::Player, MobKind::Npc]
            .into_iter()
            .flat_map(|kind| world.mobs(kind))
            .filter(|mob| resolver.is_viewable(observer.position(), mob.position()))
            .map(|mob| FullState {
                index: mob.id().index,
                npc: mob.kind() == MobKind::Npc,
                x: mob.position().x,
                y: mob.position().y,
                plane: mob.position().plane,
                flags: mob.flags().iter().map(|flag| flag as u8).collect(),
            })
            .collect();
        total += bincode::serialized_size(&visible).context("bincode baseline")?;
    }
    Ok(total)
}

/// Writes `summary.json` into `out_dir`.
pub fn write_summary(out_dir: &Path, summary: &Summary) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir {}", out_dir.display()))?;
    let path = out_dir.join("summary.json");
    let contents = serde_json::to_string_pretty(summary).context("serialize summary")?;
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::default_definitions;

    fn small() -> ScenarioConfig {
        ScenarioConfig {
            players: 6,
            npcs: 40,
            seed: 11,
            spread: 12,
            teleport_every: 25,
        }
    }

    #[test]
    fn simulation_sends_traffic() {
        let summary =
            simulate(small(), default_definitions(), SyncConfig::default(), 20, None).unwrap();
        assert_eq!(summary.ticks, 20);
        assert_eq!(summary.reports.len(), 20);
        assert_eq!(summary.failures, 0);
        assert!(summary.messages > 0);
        assert!(summary.bytes_total > 0);
        assert!(summary.naive_bincode_bytes_total > 0);
        assert!(summary.reports[0].added > 0);
        assert_eq!(summary.reports[0].region_changes, 6);
    }

    #[test]
    fn same_seed_same_bytes() {
        let run = || {
            simulate(small(), default_definitions(), SyncConfig::default(), 10, None)
                .unwrap()
                .bytes_total
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn p95_picks_upper_tail() {
        let mut values: Vec<u64> = (1..=20).collect();
        assert_eq!(p95(&mut values), 19);
        assert_eq!(p95(&mut []), 0);
    }

    #[test]
    fn budget_is_enforced() {
        let summary = Summary {
            p95_tick_bytes: 500,
            ..Summary::default()
        };
        assert!(summary.assert_budget(Some(400)).is_err());
        assert!(summary.assert_budget(Some(500)).is_ok());
        assert!(summary.assert_budget(None).is_ok());
    }
}
