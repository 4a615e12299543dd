#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Space Salvagers headless with the autopilot.

mod replay;
mod session;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use space_salvagers_catalog::Catalog;
use space_salvagers_system_autopilot::{BotConfig, Difficulty, Strategy};
use tracing::info;
use tracing_subscriber::EnvFilter;

use session::{play, RunSummary, SessionPlan};

/// Headless Space Salvagers runner.
#[derive(Debug, Parser)]
#[command(name = "space-salvagers", version, about)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Plays one autopilot-driven session and prints a summary.
    Run {
        #[command(flatten)]
        session: SessionArgs,
        /// Writes the decision log to this file as JSON.
        #[arg(long)]
        decisions_json: Option<PathBuf>,
        /// Prints the summary as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Plays the same seed twice and fails if the runs diverge.
    Verify {
        #[command(flatten)]
        session: SessionArgs,
        /// Decision log of an earlier run that the replay must reproduce.
        #[arg(long)]
        decisions_json: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct SessionArgs {
    /// Master seed of the session.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Investment strategy of the autopilot.
    #[arg(long, value_enum, default_value_t = StrategyArg::Balanced)]
    strategy: StrategyArg,
    /// Decision quality of the autopilot.
    #[arg(long, value_enum, default_value_t = DifficultyArg::Strategic)]
    difficulty: DifficultyArg,
    /// TOML catalog; the built-in tables are used when missing or invalid.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Frames after which the run stops.
    #[arg(long, default_value_t = 60 * 60 * 30)]
    max_frames: u32,
    /// Milliseconds per frame.
    #[arg(long, default_value_t = 1000.0 / 60.0)]
    frame_ms: f32,
    /// Minimum milliseconds between two autopilot decisions.
    #[arg(long, default_value_t = 500)]
    decision_ms: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    DpsRush,
    ControlHeavy,
    Balanced,
    Economic,
}

impl From<StrategyArg> for Strategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::DpsRush => Self::DpsRush,
            StrategyArg::ControlHeavy => Self::ControlHeavy,
            StrategyArg::Balanced => Self::Balanced,
            StrategyArg::Economic => Self::Economic,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    Random,
    Balanced,
    Strategic,
    Lookahead,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Random => Self::Random,
            DifficultyArg::Balanced => Self::Balanced,
            DifficultyArg::Strategic => Self::Strategic,
            DifficultyArg::Lookahead => Self::Lookahead,
        }
    }
}

impl SessionArgs {
    fn plan(&self) -> Result<SessionPlan> {
        if !(self.frame_ms.is_finite() && self.frame_ms > 0.0) {
            bail!("--frame-ms must be a positive number, got {}", self.frame_ms);
        }
        let catalog = self
            .catalog
            .as_ref()
            .map_or_else(Catalog::builtin, |path| Catalog::load_or_default(path));
        Ok(SessionPlan {
            seed: self.seed,
            catalog,
            bot: BotConfig {
                difficulty: self.difficulty.into(),
                strategy: self.strategy.into(),
                decision_interval: self.decision_ms as f64 / 1000.0,
                seed: self.seed,
            },
            max_frames: self.max_frames,
            frame_dt: self.frame_ms / 1000.0,
        })
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn print_summary(summary: &RunSummary) {
    println!("seed            {}", summary.seed);
    println!("outcome         {:?}", summary.state);
    println!("wave            {}", summary.wave);
    println!("waves cleared   {}", summary.waves_cleared);
    println!("station health  {}", summary.station_health);
    println!("kills           {}", summary.kills);
    println!("salvage earned  {}", summary.salvage_earned);
    println!("towers built    {}", summary.towers_built);
    println!("decisions       {}", summary.decisions);
    println!("frames          {} ({:.1}s simulated)", summary.frames, summary.elapsed);
    println!("event digest    {:#018x}", summary.event_fingerprint);
}

fn run(session: &SessionArgs, decisions_json: Option<&PathBuf>, json: bool) -> Result<()> {
    let record = play(&session.plan()?);
    if let Some(path) = decisions_json {
        replay::write_log(path, &record.log)?;
        info!(path = %path.display(), decisions = record.log.len(), "decision_log_written");
    }
    if json {
        let encoded =
            serde_json::to_string_pretty(&record.summary).context("could not encode summary")?;
        println!("{encoded}");
    } else {
        print_summary(&record.summary);
    }
    Ok(())
}

fn verify(session: &SessionArgs, decisions_json: Option<&PathBuf>) -> Result<()> {
    let plan = session.plan()?;
    let reference = play(&plan);
    let replayed = play(&plan);
    replay::compare(&reference, &replayed).context("replay desynchronised")?;

    if let Some(path) = decisions_json {
        let recorded = replay::read_log(path)?;
        replay::compare_commands(recorded.commands(), reference.log.commands())
            .with_context(|| format!("run diverged from {}", path.display()))?;
    }
    info!(
        seed = plan.seed,
        decisions = reference.log.len(),
        events = reference.summary.events,
        "replay_verified"
    );
    println!(
        "replay verified: {} decisions, {} events, digest {:#018x}",
        reference.log.len(),
        reference.summary.events,
        reference.summary.event_fingerprint
    );
    Ok(())
}

/// Entry point for the Space Salvagers command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match &cli.mode {
        Mode::Run {
            session,
            decisions_json,
            json,
        } => run(session, decisions_json.as_ref(), *json),
        Mode::Verify {
            session,
            decisions_json,
        } => verify(session, decisions_json.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_map_onto_a_session_plan() {
        let cli = Cli::parse_from([
            "space-salvagers",
            "run",
            "--seed",
            "42",
            "--strategy",
            "economic",
            "--difficulty",
            "lookahead",
            "--frame-ms",
            "20",
            "--decision-ms",
            "250",
            "--max-frames",
            "10",
        ]);
        let Mode::Run { session, json, .. } = cli.mode else {
            panic!("expected the run mode");
        };
        assert!(!json);
        let plan = session.plan().expect("valid plan");
        assert_eq!(plan.seed, 42);
        assert_eq!(plan.bot.strategy, Strategy::Economic);
        assert_eq!(plan.bot.difficulty, Difficulty::Lookahead);
        assert!((plan.bot.decision_interval - 0.25).abs() < 1e-9);
        assert!((plan.frame_dt - 0.02).abs() < 1e-6);
        assert_eq!(plan.max_frames, 10);
    }

    #[test]
    fn non_positive_frames_are_rejected() {
        let cli = Cli::parse_from(["space-salvagers", "verify", "--frame-ms", "0"]);
        let Mode::Verify { session, .. } = cli.mode else {
            panic!("expected the verify mode");
        };
        assert!(session.plan().is_err());
    }
}
