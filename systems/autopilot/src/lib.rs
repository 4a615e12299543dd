#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autonomous player driving a session through the public command surface.
//!
//! The policy is a pure function of a [`GameSnapshot`]; the [`Autopilot`]
//! wrapper adds rate limiting, its own seeded random stream and an
//! append-only decision log that replays compare run against run.

mod policy;

use serde::{Deserialize, Serialize};
use space_salvagers_core::{Command, GameSnapshot};
use space_salvagers_rng::SeededRandom;
use tracing::debug;

pub use policy::{choose, threat, Decision};

/// How much thought the autopilot puts into each decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Picks any applicable action at random.
    Random,
    /// Follows the strategy with simple heuristics.
    Balanced,
    /// Places towers where they cover the most path.
    Strategic,
    /// Strategic play plus upgrade planning and speed control.
    Lookahead,
}

/// What the autopilot invests in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Damage towers as fast as salvage allows.
    DpsRush,
    /// Crowd control first, damage second.
    ControlHeavy,
    /// A mix of damage, control and anti-air.
    Balanced,
    /// Income first, keeping a reserve while the threat is low.
    Economic,
}

impl Strategy {
    /// Short name used in decision rationales.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DpsRush => "dps-rush",
            Self::ControlHeavy => "control-heavy",
            Self::Balanced => "balanced",
            Self::Economic => "economic",
        }
    }
}

/// Configuration of an [`Autopilot`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Decision quality.
    pub difficulty: Difficulty,
    /// Investment strategy.
    pub strategy: Strategy,
    /// Minimum seconds between two decisions.
    pub decision_interval: f64,
    /// Seed of the autopilot's own random stream.
    pub seed: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Balanced,
            strategy: Strategy::Balanced,
            decision_interval: 0.5,
            seed: 0,
        }
    }
}

/// One entry of the decision log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Seconds on the caller's clock when the decision was taken.
    pub timestamp: f64,
    /// Command issued.
    pub command: Command,
    /// Human readable reason.
    pub rationale: String,
    /// Snapshot the decision was based on.
    pub snapshot: GameSnapshot,
}

/// Append-only record of every decision an autopilot took.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionLog {
    records: Vec<DecisionRecord>,
}

impl DecisionLog {
    /// Entries in decision order.
    #[must_use]
    pub fn records(&self) -> &[DecisionRecord] {
        &self.records
    }

    /// Commands in decision order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.records.iter().map(|record| &record.command)
    }

    /// Number of decisions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Reports whether no decision was taken yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Rate-limited policy controller.
#[derive(Clone, Debug)]
pub struct Autopilot {
    config: BotConfig,
    rng: SeededRandom,
    last_decision: Option<f64>,
    log: DecisionLog,
}

impl Autopilot {
    /// Creates an autopilot that has not decided anything yet.
    #[must_use]
    pub const fn new(config: BotConfig) -> Self {
        Self {
            rng: SeededRandom::new(config.seed),
            config,
            last_decision: None,
            log: DecisionLog {
                records: Vec::new(),
            },
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Decides on a command unless the previous decision is too recent.
    ///
    /// `now` is read from the caller's clock in seconds. Every decision,
    /// waiting included, is appended to the log.
    pub fn decide(&mut self, now: f64, snapshot: &GameSnapshot) -> Option<Command> {
        if let Some(last) = self.last_decision {
            if now - last < self.config.decision_interval {
                return None;
            }
        }
        self.last_decision = Some(now);

        let Decision { command, rationale } = choose(snapshot, &self.config, &mut self.rng);
        debug!(?command, rationale = %rationale, "autopilot_decision");
        self.log.records.push(DecisionRecord {
            timestamp: now,
            command: command.clone(),
            rationale,
            snapshot: snapshot.clone(),
        });
        Some(command)
    }

    /// Decisions taken so far.
    #[must_use]
    pub const fn log(&self) -> &DecisionLog {
        &self.log
    }

    /// Consumes the autopilot, keeping its log.
    #[must_use]
    pub fn into_log(self) -> DecisionLog {
        self.log
    }
}
