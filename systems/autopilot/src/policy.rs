//! Decision rules of the autopilot.

use space_salvagers_core::{
    BuildNodeSnapshot, Command, GameSnapshot, GameState, TowerOffer, TowerRole, TowerSnapshot,
    Vec2, WaveStatus,
};
use space_salvagers_rng::SeededRandom;

use crate::{BotConfig, Difficulty, Strategy};

const LOW_THREAT: f32 = 2.0;
const HIGH_THREAT: f32 = 8.0;
const CRITICAL_STATION: f32 = 0.3;
const FAST_SPEED: f32 = 2.0;
const NORMAL_SPEED: f32 = 1.0;
const COVERAGE_STEP: f32 = 20.0;

/// Command chosen by the policy together with the reason for it.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    /// Command to submit.
    pub command: Command,
    /// Human readable reason.
    pub rationale: String,
}

impl Decision {
    fn new(command: Command, rationale: impl Into<String>) -> Self {
        Self {
            command,
            rationale: rationale.into(),
        }
    }

    fn wait(rationale: impl Into<String>) -> Self {
        Self::new(Command::Wait, rationale)
    }
}

/// Pressure on the defence: enemy health weighted by path progress plus station damage.
#[must_use]
pub fn threat(snapshot: &GameSnapshot) -> f32 {
    let field: f32 = snapshot
        .enemies
        .iter()
        .map(|enemy| enemy.health / 100.0 * (0.5 + enemy.progress))
        .sum();
    field + (1.0 - station_fraction(snapshot)) * 10.0
}

fn station_fraction(snapshot: &GameSnapshot) -> f32 {
    if snapshot.station_max_health == 0 {
        return 0.0;
    }
    snapshot.station_health as f32 / snapshot.station_max_health as f32
}

/// Picks the next command for `snapshot`.
///
/// Never fails: when nothing useful can be done the decision is
/// [`Command::Wait`].
pub fn choose(snapshot: &GameSnapshot, config: &BotConfig, rng: &mut SeededRandom) -> Decision {
    if !matches!(
        snapshot.state,
        GameState::Preparing | GameState::Playing | GameState::WaveComplete
    ) {
        return Decision::wait("session is not accepting commands");
    }
    let threat = threat(snapshot);
    if config.difficulty == Difficulty::Random {
        return choose_randomly(snapshot, rng);
    }

    if config.difficulty == Difficulty::Lookahead && snapshot.state == GameState::Playing {
        let desired = if threat < LOW_THREAT {
            FAST_SPEED
        } else {
            NORMAL_SPEED
        };
        if (snapshot.game_speed - desired).abs() > f32::EPSILON {
            return Decision::new(
                Command::SetGameSpeed { speed: desired },
                format!("threat {threat:.1} calls for speed {desired}"),
            );
        }
    }

    if matches!(config.difficulty, Difficulty::Strategic | Difficulty::Lookahead) {
        if let Some(sale) = emergency_sale(snapshot, threat) {
            return sale;
        }
    }

    let plan = Plan::for_strategy(config.strategy, snapshot, threat);
    let build = plan.build(snapshot, config.difficulty);
    let upgrade = plan.upgrade(snapshot);
    let chosen = match (build, upgrade) {
        (Some((_, build_cost)), Some((upgrade, upgrade_cost)))
            if config.difficulty == Difficulty::Lookahead && upgrade_cost < build_cost =>
        {
            Some(upgrade)
        }
        (Some((build, _)), _) => Some(build),
        (None, Some((upgrade, _))) => Some(upgrade),
        (None, None) => None,
    };
    if let Some(decision) = chosen {
        return decision;
    }

    if snapshot.wave_status == WaveStatus::Prepared {
        return Decision::new(
            Command::StartWave,
            format!("defence ready for wave {}", snapshot.wave),
        );
    }
    Decision::wait(format!(
        "nothing worth buying with {} salvage",
        snapshot.salvage
    ))
}

fn role_of(snapshot: &GameSnapshot, tower: &TowerSnapshot) -> Option<TowerRole> {
    snapshot.offer(tower.kind).map(|offer| offer.role)
}

fn count_role(snapshot: &GameSnapshot, role: TowerRole) -> usize {
    snapshot
        .towers
        .iter()
        .filter(|tower| role_of(snapshot, tower) == Some(role))
        .count()
}

/// Investment rules derived from the strategy and the current situation.
struct Plan {
    strategy: Strategy,
    reserve: u32,
    roles: Vec<TowerRole>,
    cap: Option<usize>,
}

impl Plan {
    fn for_strategy(strategy: Strategy, snapshot: &GameSnapshot, threat: f32) -> Self {
        let damage = count_role(snapshot, TowerRole::Damage);
        let control = count_role(snapshot, TowerRole::Control);
        let wave = snapshot.wave.max(1) as usize;
        let (reserve, roles, cap) = match strategy {
            Strategy::DpsRush => (0, vec![TowerRole::Damage], None),
            Strategy::ControlHeavy => {
                let roles = if control <= damage {
                    vec![TowerRole::Control, TowerRole::Damage]
                } else {
                    vec![TowerRole::Damage, TowerRole::Control]
                };
                (0, roles, None)
            }
            Strategy::Balanced => {
                let needs_air = snapshot.wave >= 3 && count_role(snapshot, TowerRole::AntiAir) == 0;
                let roles = if needs_air {
                    vec![TowerRole::AntiAir, TowerRole::Damage]
                } else if control * 2 < damage {
                    vec![TowerRole::Control, TowerRole::Damage]
                } else {
                    vec![TowerRole::Damage, TowerRole::Control]
                };
                (20, roles, Some(3 + 2 * wave))
            }
            Strategy::Economic => {
                let roles = if count_role(snapshot, TowerRole::Economy) < 2 {
                    vec![TowerRole::Economy, TowerRole::Damage]
                } else {
                    vec![TowerRole::Damage]
                };
                let reserve = if threat < HIGH_THREAT { 60 } else { 0 };
                let cap = (threat < LOW_THREAT).then_some(1 + wave / 2);
                (reserve, roles, cap)
            }
        };
        Self {
            strategy,
            reserve,
            roles,
            cap,
        }
    }

    fn budget(&self, snapshot: &GameSnapshot) -> u32 {
        snapshot.salvage.saturating_sub(self.reserve)
    }

    fn build(&self, snapshot: &GameSnapshot, difficulty: Difficulty) -> Option<(Decision, u32)> {
        if self.cap.is_some_and(|cap| snapshot.towers.len() >= cap) {
            return None;
        }
        let budget = self.budget(snapshot);
        let nodes: Vec<&BuildNodeSnapshot> = snapshot.available_nodes().collect();
        if nodes.is_empty() {
            return None;
        }
        for role in &self.roles {
            let offers: Vec<&TowerOffer> = snapshot
                .offers
                .iter()
                .filter(|offer| offer.role == *role && offer.cost <= budget)
                .collect();
            let choice = match difficulty {
                Difficulty::Strategic | Difficulty::Lookahead => {
                    best_covered(&offers, &nodes, &snapshot.path)
                }
                Difficulty::Random | Difficulty::Balanced => {
                    best_value(&offers).zip(closest_to_path(&nodes))
                }
            };
            if let Some((offer, node)) = choice {
                let decision = Decision::new(
                    Command::PlaceTower {
                        kind: offer.kind,
                        node: node.id,
                    },
                    format!(
                        "{}: build {} on node {} for {:?}",
                        self.strategy.name(),
                        offer.kind.name(),
                        node.id.get(),
                        role
                    ),
                );
                return Some((decision, offer.cost));
            }
        }
        None
    }

    fn upgrade(&self, snapshot: &GameSnapshot) -> Option<(Decision, u32)> {
        let budget = self.budget(snapshot);
        snapshot
            .towers
            .iter()
            .filter_map(|tower| {
                tower
                    .upgrade_cost
                    .filter(|cost| *cost <= budget)
                    .map(|cost| (tower, cost))
            })
            .min_by_key(|(tower, cost)| (tower.tier, *cost, tower.id))
            .map(|(tower, cost)| {
                let decision = Decision::new(
                    Command::UpgradeTower { tower: tower.id },
                    format!(
                        "{}: upgrade {} to tier {}",
                        self.strategy.name(),
                        tower.kind.name(),
                        tower.tier + 1
                    ),
                );
                (decision, cost)
            })
    }
}

fn value(offer: &TowerOffer) -> f32 {
    offer.damage_per_second / offer.cost.max(1) as f32
}

fn best_value<'a>(offers: &[&'a TowerOffer]) -> Option<&'a TowerOffer> {
    offers
        .iter()
        .copied()
        .max_by(|left, right| value(left).total_cmp(&value(right)).then(right.cost.cmp(&left.cost)))
}

fn closest_to_path<'a>(nodes: &[&'a BuildNodeSnapshot]) -> Option<&'a BuildNodeSnapshot> {
    nodes.iter().copied().min_by(|left, right| {
        left.path_distance
            .total_cmp(&right.path_distance)
            .then(left.id.cmp(&right.id))
    })
}

/// Path length within `range` of `position`, sampled every few units.
fn coverage(path: &[Vec2], position: Vec2, range: f32) -> f32 {
    let range_squared = range * range;
    let mut covered = 0.0;
    for pair in path.windows(2) {
        let length = pair[0].distance(pair[1]);
        let samples = (length / COVERAGE_STEP).ceil().max(1.0) as usize;
        let step = length / samples as f32;
        for index in 0..samples {
            let point = pair[0].lerp(pair[1], (index as f32 + 0.5) / samples as f32);
            if point.distance_squared(position) <= range_squared {
                covered += step;
            }
        }
    }
    covered
}

fn best_covered<'a>(
    offers: &[&'a TowerOffer],
    nodes: &[&'a BuildNodeSnapshot],
    path: &[Vec2],
) -> Option<(&'a TowerOffer, &'a BuildNodeSnapshot)> {
    let mut best: Option<(f32, &TowerOffer, &BuildNodeSnapshot)> = None;
    for offer in offers {
        for node in nodes {
            let reach = if path.len() >= 2 {
                coverage(path, node.position, offer.range)
            } else {
                (offer.range - node.path_distance).max(0.0)
            };
            let score = reach * offer.damage_per_second.max(1.0) / offer.cost.max(1) as f32;
            if best.map_or(true, |(top, _, _)| score > top) {
                best = Some((score, offer, node));
            }
        }
    }
    best.map(|(_, offer, node)| (offer, node))
}

fn emergency_sale(snapshot: &GameSnapshot, threat: f32) -> Option<Decision> {
    if station_fraction(snapshot) >= CRITICAL_STATION || threat < HIGH_THREAT {
        return None;
    }
    let cheapest_damage = snapshot
        .offers
        .iter()
        .filter(|offer| offer.role == TowerRole::Damage)
        .map(|offer| offer.cost)
        .min()?;
    if cheapest_damage <= snapshot.salvage {
        return None;
    }
    let tower = snapshot
        .towers
        .iter()
        .find(|tower| role_of(snapshot, tower) == Some(TowerRole::Economy))?;
    Some(Decision::new(
        Command::SellTower { tower: tower.id },
        format!(
            "station critical: sell {} for {} salvage",
            tower.kind.name(),
            tower.sell_value
        ),
    ))
}

fn choose_randomly(snapshot: &GameSnapshot, rng: &mut SeededRandom) -> Decision {
    let nodes: Vec<&BuildNodeSnapshot> = snapshot.available_nodes().collect();
    let offers: Vec<&TowerOffer> = snapshot.affordable_offers().collect();
    let upgrades: Vec<&TowerSnapshot> = snapshot
        .towers
        .iter()
        .filter(|tower| {
            tower
                .upgrade_cost
                .is_some_and(|cost| cost <= snapshot.salvage)
        })
        .collect();

    let mut options = Vec::with_capacity(4);
    if !nodes.is_empty() && !offers.is_empty() {
        options.push(Move::Build);
    }
    if !upgrades.is_empty() {
        options.push(Move::Upgrade);
    }
    if snapshot.wave_status == WaveStatus::Prepared {
        options.push(Move::StartWave);
    }
    options.push(Move::Wait);

    match rng.pick(&options).copied().unwrap_or(Move::Wait) {
        Move::Build => match (rng.pick(&offers), rng.pick(&nodes)) {
            (Some(offer), Some(node)) => Decision::new(
                Command::PlaceTower {
                    kind: offer.kind,
                    node: node.id,
                },
                format!("random: build {} on node {}", offer.kind.name(), node.id.get()),
            ),
            _ => Decision::wait("random: nothing to build"),
        },
        Move::Upgrade => match rng.pick(&upgrades) {
            Some(tower) => Decision::new(
                Command::UpgradeTower { tower: tower.id },
                format!("random: upgrade {}", tower.kind.name()),
            ),
            None => Decision::wait("random: nothing to upgrade"),
        },
        Move::StartWave => Decision::new(Command::StartWave, "random: start the wave"),
        Move::Wait => Decision::wait("random: wait"),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Move {
    Build,
    Upgrade,
    StartWave,
    Wait,
}
