use serde::Serialize;
use space_salvagers_catalog::Catalog;
use space_salvagers_core::GameState;
use space_salvagers_engine::{GameEngine, SessionConfig};
use space_salvagers_system_autopilot::{Autopilot, BotConfig, DecisionLog};
use tracing::info;

/// Everything needed to play one headless session.
#[derive(Clone, Debug)]
pub(crate) struct SessionPlan {
    /// Master seed of the session.
    pub(crate) seed: u64,
    /// Tables the session runs with.
    pub(crate) catalog: Catalog,
    /// Autopilot parameters.
    pub(crate) bot: BotConfig,
    /// Frames after which the run stops even if the game has not ended.
    pub(crate) max_frames: u32,
    /// Seconds per frame.
    pub(crate) frame_dt: f32,
}

/// Summary of a finished run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct RunSummary {
    pub(crate) seed: u64,
    pub(crate) state: GameState,
    pub(crate) wave: u32,
    pub(crate) frames: u32,
    pub(crate) elapsed: f64,
    pub(crate) station_health: u32,
    pub(crate) kills: u32,
    pub(crate) salvage_earned: u32,
    pub(crate) towers_built: u32,
    pub(crate) waves_cleared: u32,
    pub(crate) decisions: usize,
    pub(crate) events: u64,
    pub(crate) event_fingerprint: u64,
    pub(crate) random_fingerprint: Option<u64>,
}

/// Summary plus the decision log of a run.
#[derive(Clone, Debug)]
pub(crate) struct RunRecord {
    pub(crate) summary: RunSummary,
    pub(crate) log: DecisionLog,
}

/// Plays an autopilot-driven session until it ends or the frame budget runs out.
pub(crate) fn play(plan: &SessionPlan) -> RunRecord {
    let config = SessionConfig::new(plan.seed).with_catalog(plan.catalog.clone());
    let mut engine = GameEngine::new(config);
    let mut autopilot = Autopilot::new(plan.bot);
    engine.start_new_game();

    let mut frames = 0;
    let mut events = 0_u64;
    while frames < plan.max_frames
        && !matches!(engine.state(), GameState::GameOver | GameState::Victory)
    {
        let now = f64::from(frames) * f64::from(plan.frame_dt);
        let snapshot = engine.snapshot();
        if let Some(command) = autopilot.decide(now, &snapshot) {
            let _ = engine.submit(command);
        }
        engine.update(plan.frame_dt);
        events += engine.drain_events().len() as u64;
        frames += 1;
    }

    let snapshot = engine.snapshot();
    let stats = engine.stats();
    let log = autopilot.into_log();
    let summary = RunSummary {
        seed: plan.seed,
        state: snapshot.state,
        wave: snapshot.wave,
        frames,
        elapsed: snapshot.elapsed,
        station_health: snapshot.station_health,
        kills: stats.kills,
        salvage_earned: stats.salvage_earned,
        towers_built: stats.towers_built,
        waves_cleared: stats.waves_cleared,
        decisions: log.len(),
        events,
        event_fingerprint: engine.event_fingerprint(),
        random_fingerprint: engine.random_fingerprint(),
    };
    info!(
        seed = plan.seed,
        state = ?summary.state,
        wave = summary.wave,
        frames,
        "run_finished"
    );
    RunRecord { summary, log }
}

#[cfg(test)]
mod tests {
    use super::*;
    use space_salvagers_system_autopilot::{Difficulty, Strategy};

    fn plan(seed: u64) -> SessionPlan {
        SessionPlan {
            seed,
            catalog: Catalog::builtin(),
            bot: BotConfig {
                difficulty: Difficulty::Balanced,
                strategy: Strategy::DpsRush,
                decision_interval: 0.5,
                seed,
            },
            max_frames: 1_200,
            frame_dt: 1.0 / 60.0,
        }
    }

    #[test]
    fn runs_stop_at_the_frame_budget() {
        let record = play(&plan(3));
        assert_eq!(record.summary.frames, 1_200);
        assert!(record.summary.towers_built >= 1);
        assert_eq!(record.summary.decisions, record.log.len());
        assert!(record.summary.events > 0);
    }

    #[test]
    fn identical_plans_produce_identical_summaries() {
        assert_eq!(play(&plan(9)).summary, play(&plan(9)).summary);
    }
}
