use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::Pattern;
use synchronizer::SyncConfig;
use tools::logging::init_logging;
use tools::{
    default_definitions, format_pretty, inspect_frames, simulate, write_summary, InspectReport,
    ScenarioConfig,
};
use world::DefinitionTable;

#[derive(Parser)]
#[command(
    name = "mobsync-tools",
    version,
    about = "mobsync simulation and frame inspection tools"
)]
struct Cli {
    /// Default log filter; RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    log: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a seeded world through the synchronizer and write summary.json.
    Simulate {
        #[arg(long, default_value_t = 64)]
        players: u16,
        #[arg(long, default_value_t = 400)]
        npcs: u16,
        #[arg(long, default_value_t = 100)]
        ticks: u32,
        /// RNG seed for deterministic results.
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Tiles around the spawn centre that mobs stay within.
        #[arg(long, default_value_t = 48)]
        spread: u16,
        /// One in N player steps is a teleport; 0 disables teleports.
        #[arg(long, default_value_t = 200)]
        teleport_every: u32,
        /// SyncConfig JSON; missing fields keep their defaults.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Npc definitions JSON (a list of definitions).
        #[arg(long)]
        definitions: Option<PathBuf>,
        /// Output directory for summary.json.
        #[arg(long, default_value = "target/mobsync-sim")]
        out_dir: PathBuf,
        /// Also write every delivered frame under out_dir/frames.
        #[arg(long)]
        dump_frames: bool,
        /// Fail if the p95 bytes per tick exceed this value.
        #[arg(long)]
        max_p95_tick_bytes: Option<u64>,
    },
    /// Decode dumped frames.
    Inspect {
        /// A frame file, or a directory of them.
        path: PathBuf,
        /// Glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected files.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected files (after sorting).
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log);
    match cli.command {
        Command::Simulate {
            players,
            npcs,
            ticks,
            seed,
            spread,
            teleport_every,
            config,
            definitions,
            out_dir,
            dump_frames,
            max_p95_tick_bytes,
        } => {
            let config = config
                .as_deref()
                .map(load_config)
                .transpose()?
                .unwrap_or_default();
            let definitions = definitions
                .as_deref()
                .map(load_definitions)
                .transpose()?
                .unwrap_or_else(default_definitions);
            let scenario = ScenarioConfig {
                players,
                npcs,
                seed,
                spread,
                teleport_every,
            };
            let dump_dir = dump_frames.then(|| out_dir.join("frames"));

            let summary = simulate(scenario, definitions, config, ticks, dump_dir.as_deref())?;
            let path = write_summary(&out_dir, &summary)?;
            println!(
                "{} ticks, {} messages, {} bytes (naive {}), p95 {} bytes/tick -> {}",
                summary.ticks,
                summary.messages,
                summary.bytes_total,
                summary.naive_bincode_bytes_total,
                summary.p95_tick_bytes,
                path.display()
            );
            summary.assert_budget(max_p95_tick_bytes)?;
        }
        Command::Inspect {
            path,
            glob,
            sort,
            limit,
            format,
        } => {
            let limits = wire::Limits::default();
            if path.is_dir() {
                let mut entries = collect_frame_entries(&path, glob.as_deref())?;
                sort_entries(&mut entries, sort);
                if let Some(limit) = limit.or(sort.map(|InspectSort::Size| 10)) {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let bytes = fs::read(&entry.path)
                        .with_context(|| format!("read frames {}", entry.path.display()))?;
                    let report = inspect_frames(&bytes, &limits)
                        .with_context(|| format!("inspect {}", entry.path.display()))?;
                    if matches!(format, OutputFormat::Pretty) {
                        println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    }
                    print_report(&report, format)?;
                }
            } else {
                let bytes = fs::read(&path)
                    .with_context(|| format!("read frames {}", path.display()))?;
                let report = inspect_frames(&bytes, &limits)?;
                print_report(&report, format)?;
            }
        }
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<SyncConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let config: SyncConfig = serde_json::from_str(&contents).context("parse config json")?;
    config.validate().context("invalid config")?;
    Ok(config)
}

fn load_definitions(path: &Path) -> Result<DefinitionTable> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read definitions {}", path.display()))?;
    serde_json::from_str(&contents).context("parse definitions json")
}

fn print_report(report: &InspectReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("serialize json")?;
            println!("{json}");
        }
        OutputFormat::Pretty => print!("{}", format_pretty(report)),
    }
    Ok(())
}

struct FrameEntry {
    path: PathBuf,
    size: u64,
}

fn collect_frame_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<FrameEntry>> {
    let pattern = glob
        .map(Pattern::new)
        .transpose()
        .context("invalid glob pattern")?;

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(FrameEntry { path, size });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn sort_entries(entries: &mut [FrameEntry], sort: Option<InspectSort>) {
    if let Some(InspectSort::Size) = sort {
        entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
    }
}
