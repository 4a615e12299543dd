use std::{
    error::Error,
    fmt,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use space_salvagers_core::Command;
use space_salvagers_system_autopilot::DecisionLog;

use crate::session::RunRecord;

/// Divergence found while comparing two runs of the same seed.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ReplayMismatch {
    /// The runs took a different number of decisions.
    DecisionCount {
        /// Decisions of the reference run.
        expected: usize,
        /// Decisions of the replay.
        observed: usize,
    },
    /// The runs issued different commands at the same decision.
    Decision {
        /// Position of the first differing decision.
        index: usize,
        /// Command of the reference run.
        expected: Command,
        /// Command of the replay.
        observed: Command,
    },
    /// The event streams differ.
    Events {
        /// Event digest of the reference run.
        expected: u64,
        /// Event digest of the replay.
        observed: u64,
    },
    /// The random streams were drawn differently.
    RandomStreams {
        /// Registry digest of the reference run.
        expected: Option<u64>,
        /// Registry digest of the replay.
        observed: Option<u64>,
    },
}

impl fmt::Display for ReplayMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DecisionCount { expected, observed } => {
                write!(f, "replay took {observed} decisions, expected {expected}")
            }
            Self::Decision {
                index,
                expected,
                observed,
            } => write!(
                f,
                "decision {index} diverged: expected {expected:?}, observed {observed:?}"
            ),
            Self::Events { expected, observed } => write!(
                f,
                "event streams diverged: expected {expected:#018x}, observed {observed:#018x}"
            ),
            Self::RandomStreams { expected, observed } => write!(
                f,
                "random streams diverged: expected {expected:x?}, observed {observed:x?}"
            ),
        }
    }
}

impl Error for ReplayMismatch {}

/// Compares two command sequences decision by decision.
pub(crate) fn compare_commands<'a>(
    expected: impl IntoIterator<Item = &'a Command>,
    observed: impl IntoIterator<Item = &'a Command>,
) -> Result<(), ReplayMismatch> {
    let expected: Vec<&Command> = expected.into_iter().collect();
    let observed: Vec<&Command> = observed.into_iter().collect();
    if let Some(index) = expected
        .iter()
        .zip(&observed)
        .position(|(left, right)| left != right)
    {
        return Err(ReplayMismatch::Decision {
            index,
            expected: expected[index].clone(),
            observed: observed[index].clone(),
        });
    }
    if expected.len() != observed.len() {
        return Err(ReplayMismatch::DecisionCount {
            expected: expected.len(),
            observed: observed.len(),
        });
    }
    Ok(())
}

/// Checks that a replay reproduced the reference run exactly.
pub(crate) fn compare(expected: &RunRecord, observed: &RunRecord) -> Result<(), ReplayMismatch> {
    compare_commands(expected.log.commands(), observed.log.commands())?;
    let (reference, replay) = (&expected.summary, &observed.summary);
    if reference.event_fingerprint != replay.event_fingerprint {
        return Err(ReplayMismatch::Events {
            expected: reference.event_fingerprint,
            observed: replay.event_fingerprint,
        });
    }
    if reference.random_fingerprint != replay.random_fingerprint {
        return Err(ReplayMismatch::RandomStreams {
            expected: reference.random_fingerprint,
            observed: replay.random_fingerprint,
        });
    }
    Ok(())
}

/// Writes a decision log as pretty-printed JSON.
pub(crate) fn write_log(path: &Path, log: &DecisionLog) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("could not create decision log {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, log).context("could not encode decision log")?;
    writer.flush().context("could not write decision log")?;
    Ok(())
}

/// Reads a decision log written by [`write_log`].
pub(crate) fn read_log(path: &Path) -> anyhow::Result<DecisionLog> {
    let file = File::open(path)
        .with_context(|| format!("could not open decision log {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("could not parse decision log {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use space_salvagers_catalog::Catalog;
    use space_salvagers_core::{BuildNodeId, TowerKind};
    use space_salvagers_system_autopilot::{BotConfig, Difficulty, Strategy};

    use crate::session::{play, SessionPlan};

    fn plan() -> SessionPlan {
        SessionPlan {
            seed: 12,
            catalog: Catalog::builtin(),
            bot: BotConfig {
                difficulty: Difficulty::Strategic,
                strategy: Strategy::Balanced,
                decision_interval: 0.25,
                seed: 12,
            },
            max_frames: 900,
            frame_dt: 1.0 / 30.0,
        }
    }

    #[test]
    fn first_divergent_decision_is_reported() {
        let place = Command::PlaceTower {
            kind: TowerKind::Cannon,
            node: BuildNodeId::new(1),
        };
        let reference = [Command::Wait, place.clone(), Command::StartWave];
        let replay = [Command::Wait, Command::StartWave];

        assert_eq!(
            compare_commands(&reference, &replay),
            Err(ReplayMismatch::Decision {
                index: 1,
                expected: place,
                observed: Command::StartWave,
            })
        );
        assert_eq!(
            compare_commands(&reference[..1], &replay),
            Err(ReplayMismatch::DecisionCount {
                expected: 1,
                observed: 2,
            })
        );
        assert_eq!(compare_commands(&replay, &replay), Ok(()));
    }

    #[test]
    fn replays_of_the_same_plan_agree() {
        let plan = plan();
        assert_eq!(compare(&play(&plan), &play(&plan)), Ok(()));
    }

    #[test]
    fn decision_logs_survive_the_file_system() {
        let record = play(&plan());
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("decisions.json");

        write_log(&path, &record.log).expect("log written");
        let restored = read_log(&path).expect("log read back");
        assert_eq!(restored.len(), record.log.len());
        assert_eq!(
            compare_commands(record.log.commands(), restored.commands()),
            Ok(())
        );
    }
}
