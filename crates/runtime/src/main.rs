//! Scenario runner: fights every combat of a scenario and prints the playback.
//!
//! ```text
//! combat-sim --scenario skirmish --save-dir saves --rewind 2
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tactics_content::ContentFactory;
use tactics_core::{CombatState, PlaybackEntry, UnitId};
use tactics_runtime::{CombatReport, CombatSession, FileRepository, SaveRepository};

/// Resolve the combats of a scenario file
#[derive(Parser)]
#[command(name = "combat-sim")]
#[command(about = "Resolve the combats of a scenario file", long_about = None)]
#[command(version)]
struct Cli {
    /// Content directory (config.toml, tables.ron, items.ron, skills.ron, scenarios/)
    #[arg(short, long, value_name = "DIR", default_value = "crates/game/content/data")]
    data_dir: PathBuf,

    /// Scenario name, the file stem under scenarios/
    #[arg(short, long, value_name = "NAME")]
    scenario: String,

    /// Exchanges to rewind once every combat has been fought
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    rewind: usize,

    /// Directory to write the session save to, as <SCENARIO>.json
    #[arg(long, value_name = "DIR")]
    save_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// One line per playback entry
    Summary,
    /// Reports as JSON
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let factory = ContentFactory::new(&cli.data_dir);
    let content = factory
        .load_content()
        .with_context(|| format!("Failed to load content from {}", cli.data_dir.display()))?;
    let scenario = factory.load_scenario(&cli.scenario)?;
    let state = scenario
        .build_state(&content.catalog)
        .with_context(|| format!("Scenario '{}' does not match the catalog", cli.scenario))?;

    let mut session = CombatSession::new(content, state);
    let mut reports = Vec::with_capacity(scenario.combats.len());
    for (index, setup) in scenario.combats.iter().enumerate() {
        let report = session
            .fight(setup)
            .with_context(|| format!("Combat #{} of '{}' failed", index + 1, cli.scenario))?;
        if let OutputFormat::Summary = cli.format {
            println!("== combat {} ==", index + 1);
            print_report(session.state(), &report);
        }
        reports.push(report);
    }

    if let OutputFormat::Json = cli.format {
        let playback: Vec<_> = reports.iter().map(|report| &report.playback).collect();
        println!("{}", serde_json::to_string_pretty(&playback)?);
    }

    if cli.rewind > 0 {
        let rewound = session.rewind_by(cli.rewind)?;
        println!("rewound {} of {} requested exchanges", rewound, cli.rewind);
    }
    print_board(session.state());

    if let Some(dir) = cli.save_dir {
        let repository = FileRepository::new(&dir)?;
        repository.save(&cli.scenario, &session.save()?)?;
        println!("saved to {}", dir.join(format!("{}.json", cli.scenario)).display());
    }
    Ok(())
}

fn name(state: &CombatState, unit: UnitId) -> String {
    state
        .units
        .get(&unit)
        .map_or_else(|| unit.to_string(), |u| u.name.clone())
}

fn print_report(state: &CombatState, report: &CombatReport) {
    for entry in &report.playback {
        let line = match entry {
            PlaybackEntry::PhaseStart { side, unit } => {
                format!("{} phase: {}", side, name(state, *unit))
            }
            PlaybackEntry::Hit { attacker, defender } => {
                format!("  {} hits {}", name(state, *attacker), name(state, *defender))
            }
            PlaybackEntry::Crit { attacker, defender } => {
                format!("  {} CRITS {}", name(state, *attacker), name(state, *defender))
            }
            PlaybackEntry::Miss { attacker, defender } => {
                format!("  {} misses {}", name(state, *attacker), name(state, *defender))
            }
            PlaybackEntry::Damage { target, amount, dealt, .. } => {
                format!("    {} takes {} ({} computed)", name(state, *target), dealt, amount)
            }
            PlaybackEntry::Heal { target, restored, .. } => {
                format!("    {} recovers {}", name(state, *target), restored)
            }
            PlaybackEntry::Status { target, status, .. } => {
                format!("    {} is afflicted with {}", name(state, *target), status)
            }
            PlaybackEntry::Death { unit, .. } => format!("    {} falls", name(state, *unit)),
        };
        println!("{}", line);
    }
    for (unit, record) in report.records.iter() {
        println!(
            "  {}: {} hits, {} misses, {} crits, {} damage dealt",
            name(state, unit),
            record.hits,
            record.misses,
            record.crits,
            record.damage_dealt
        );
    }
}

fn print_board(state: &CombatState) {
    println!("== board ==");
    for unit in state.units.values() {
        println!(
            "{:>4} {:<12} {:>3}/{:<3} lv {:>2} exp {:>2}",
            unit.id.0, unit.name, unit.hp, unit.max_hp, unit.level, unit.exp
        );
    }
}
