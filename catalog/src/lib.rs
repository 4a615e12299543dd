#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tunable tables for the Space Salvagers simulation.
//!
//! The catalog is produced by outside tooling as TOML. Loading never fails
//! the game: malformed or missing files fall back to the built-in tables and
//! core tower kinds absent from a loaded table are filled from the built-ins.

mod defaults;
mod enemies;
mod map;
mod towers;
mod waves;

use std::{collections::BTreeMap, fs, path::Path, path::PathBuf};

use serde::Deserialize;
use space_salvagers_core::{EnemyKind, TowerKind, TowerOffer};
use thiserror::Error;
use tracing::{debug, warn};

pub use enemies::{speed_multiplier, AbilitySpec, EnemySpec, Resistances, ScaledEnemy};
pub use map::{MapLayout, PathGeometry};
pub use towers::{ExtraDelta, FireMode, StatDelta, TierUpgrade, TowerSpec, TowerStats};
pub use waves::{EconomyTuning, RosterEntry, StationTuning, WaveTuning};

/// Failures raised while loading an external catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The file could not be read.
    #[error("failed to read catalog {path}")]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for the catalog schema.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    /// The file parsed but describes an unusable table.
    #[error("invalid catalog: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogFile {
    towers: Vec<TowerSpec>,
    enemies: Vec<EnemySpec>,
    waves: Option<WaveTuning>,
    economy: Option<EconomyTuning>,
    station: Option<StationTuning>,
    map: Option<MapLayout>,
}

/// Complete set of tables consumed by a session.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    towers: BTreeMap<TowerKind, TowerSpec>,
    enemies: BTreeMap<EnemyKind, EnemySpec>,
    waves: WaveTuning,
    economy: EconomyTuning,
    station: StationTuning,
    map: MapLayout,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Built-in tables covering every tower and enemy kind.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            towers: defaults::towers()
                .into_iter()
                .map(|spec| (spec.kind, spec))
                .collect(),
            enemies: defaults::enemies()
                .into_iter()
                .map(|spec| (spec.kind, spec))
                .collect(),
            waves: WaveTuning::default(),
            economy: EconomyTuning::default(),
            station: StationTuning::default(),
            map: MapLayout::default(),
        }
    }

    /// Parses a TOML document.
    ///
    /// Sections that are absent take their built-in values. Core tower kinds
    /// and enemy kinds missing from the document are filled from the
    /// built-ins; other tower kinds are simply not offered.
    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(source)?;
        let builtin = Self::builtin();

        let mut towers = BTreeMap::new();
        for spec in file.towers {
            validate_tower(&spec)?;
            if towers.insert(spec.kind, spec).is_some() {
                return Err(CatalogError::Invalid(
                    "tower kinds must be listed once".to_owned(),
                ));
            }
        }
        for kind in TowerKind::CORE {
            if !towers.contains_key(&kind) {
                debug!(?kind, "catalog_core_tower_filled");
                let _ = towers.insert(kind, builtin.towers[&kind].clone());
            }
        }

        let mut enemies = builtin.enemies;
        for spec in file.enemies {
            if spec.health <= 0.0 || spec.speed < 0.0 {
                return Err(CatalogError::Invalid(format!(
                    "enemy {:?} needs positive health and non-negative speed",
                    spec.kind
                )));
            }
            let _ = enemies.insert(spec.kind, spec);
        }

        let map = file.map.unwrap_or(builtin.map);
        if map.path.len() < 2 {
            return Err(CatalogError::Invalid(
                "map path needs at least two points".to_owned(),
            ));
        }

        Ok(Self {
            towers,
            enemies,
            waves: file.waves.unwrap_or(builtin.waves),
            economy: file.economy.unwrap_or(builtin.economy),
            station: file.station.unwrap_or(builtin.station),
            map,
        })
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Reads a TOML file, falling back to the built-in tables on any failure.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(catalog) => catalog,
            Err(error) => {
                warn!(
                    path = %path.as_ref().display(),
                    error = %error,
                    "catalog_fallback_to_builtin"
                );
                Self::builtin()
            }
        }
    }

    /// Tower table entry, if the kind is configured.
    #[must_use]
    pub fn tower(&self, kind: TowerKind) -> Option<&TowerSpec> {
        self.towers.get(&kind)
    }

    /// Tower table entry for a kind that must exist.
    ///
    /// # Panics
    ///
    /// Panics when the kind is not configured; constructing such a tower is
    /// a fatal misconfiguration.
    #[must_use]
    pub fn tower_spec(&self, kind: TowerKind) -> &TowerSpec {
        match self.towers.get(&kind) {
            Some(spec) => spec,
            None => panic!("tower kind {kind:?} is missing from the catalog"),
        }
    }

    /// Every configured tower kind in catalog order.
    pub fn towers(&self) -> impl Iterator<Item = &TowerSpec> {
        self.towers.values()
    }

    /// Enemy table entry, if the kind is configured.
    #[must_use]
    pub fn enemy(&self, kind: EnemyKind) -> Option<&EnemySpec> {
        self.enemies.get(&kind)
    }

    /// Wave tuning.
    #[must_use]
    pub fn waves(&self) -> &WaveTuning {
        &self.waves
    }

    /// Economy tuning.
    #[must_use]
    pub fn economy(&self) -> &EconomyTuning {
        &self.economy
    }

    /// Station tuning.
    #[must_use]
    pub fn station(&self) -> &StationTuning {
        &self.station
    }

    /// Map layout.
    #[must_use]
    pub fn map(&self) -> &MapLayout {
        &self.map
    }

    /// Purchase options for every configured tower kind.
    #[must_use]
    pub fn offers(&self) -> Vec<TowerOffer> {
        self.towers
            .values()
            .map(|spec| {
                let stats = spec.stats_at(1);
                TowerOffer {
                    kind: spec.kind,
                    role: spec.role,
                    cost: spec.cost,
                    damage_per_second: stats.damage_per_second(),
                    range: stats.range,
                    anti_air: stats.can_target_air,
                }
            })
            .collect()
    }

    /// Replaces the wave tuning.
    #[must_use]
    pub fn with_waves(mut self, waves: WaveTuning) -> Self {
        self.waves = waves;
        self
    }

    /// Replaces the economy tuning.
    #[must_use]
    pub fn with_economy(mut self, economy: EconomyTuning) -> Self {
        self.economy = economy;
        self
    }

    /// Replaces the station tuning.
    #[must_use]
    pub fn with_station(mut self, station: StationTuning) -> Self {
        self.station = station;
        self
    }

    /// Replaces the map layout.
    #[must_use]
    pub fn with_map(mut self, map: MapLayout) -> Self {
        self.map = map;
        self
    }

    /// Adds or replaces a tower table entry.
    #[must_use]
    pub fn with_tower(mut self, spec: TowerSpec) -> Self {
        let _ = self.towers.insert(spec.kind, spec);
        self
    }

    /// Adds or replaces an enemy table entry.
    #[must_use]
    pub fn with_enemy(mut self, spec: EnemySpec) -> Self {
        let _ = self.enemies.insert(spec.kind, spec);
        self
    }
}

fn validate_tower(spec: &TowerSpec) -> Result<(), CatalogError> {
    if spec.max_tier == 0 {
        return Err(CatalogError::Invalid(format!(
            "tower {:?} needs a max tier of at least one",
            spec.kind
        )));
    }
    if spec.base.fire_rate <= 0.0 {
        return Err(CatalogError::Invalid(format!(
            "tower {:?} needs a positive fire rate",
            spec.kind
        )));
    }
    if matches!(spec.fire_mode, FireMode::Projectile | FireMode::Swarm) && spec.projectile.is_none()
    {
        return Err(CatalogError::Invalid(format!(
            "tower {:?} fires projectiles but names no projectile kind",
            spec.kind
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const PARTIAL: &str = r#"
[[towers]]
kind = "plasma_arc"
role = "damage"
cost = 250
max_tier = 3
targeting = "weakest"
fire_mode = "projectile"
projectile = "plasma"
damage_type = "energy"

[towers.base]
damage = 40.0
fire_rate = 0.5
range = 150.0
chains = 1
chain_radius = 60.0

[[towers.tiers]]
cost = 100
percent = { damage = 0.5 }

[[towers.tiers]]
cost = 150
flat = { range = 30.0 }

[economy]
starting_salvage = 500

[[enemies]]
kind = "scout"
health = 10.0
speed = 100.0
salvage = 1
core_damage = 1
ability = { type = "self_heal", interval = 1.0, fraction = 0.5 }
"#;

    #[test]
    fn builtin_covers_every_kind() {
        let catalog = Catalog::builtin();
        for kind in TowerKind::ALL {
            assert!(catalog.tower(kind).is_some());
        }
        for kind in EnemyKind::ALL {
            assert!(catalog.enemy(kind).is_some());
        }
        assert_eq!(catalog.offers().len(), TowerKind::ALL.len());
    }

    #[test]
    fn partial_document_keeps_core_kinds_and_defaults() {
        let catalog = Catalog::from_toml_str(PARTIAL).expect("parse");

        let plasma = catalog.tower(TowerKind::PlasmaArc).expect("plasma");
        assert_eq!(plasma.cost, 250);
        assert!((plasma.stats_at(2).damage - 60.0).abs() < 1e-4);
        assert!((plasma.stats_at(3).range - 180.0).abs() < 1e-4);

        for kind in TowerKind::CORE {
            assert_eq!(catalog.tower(kind), Catalog::builtin().tower(kind));
        }
        assert!(catalog.tower(TowerKind::CryoField).is_none());

        assert_eq!(catalog.economy().starting_salvage, 500);
        assert_eq!(catalog.economy().wave_bonus(5), 30);
        assert_eq!(catalog.waves(), &WaveTuning::default());

        let scout = catalog.enemy(EnemyKind::Scout).expect("scout");
        assert_eq!(scout.health, 10.0);
        assert_eq!(
            scout.ability,
            Some(AbilitySpec::SelfHeal {
                interval: 1.0,
                fraction: 0.5
            })
        );
        assert!(catalog.enemy(EnemyKind::Behemoth).is_some());
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(matches!(
            Catalog::from_toml_str("towers = 5"),
            Err(CatalogError::Parse(_))
        ));

        let no_projectile = r#"
[[towers]]
kind = "cannon"
role = "damage"
cost = 10
max_tier = 2
targeting = "nearest"
fire_mode = "projectile"
damage_type = "kinetic"
base = { damage = 1.0 }
"#;
        assert!(matches!(
            Catalog::from_toml_str(no_projectile),
            Err(CatalogError::Invalid(_))
        ));
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Catalog::load(&missing),
            Err(CatalogError::Read { .. })
        ));
        assert_eq!(Catalog::load_or_default(&missing), Catalog::builtin());
    }

    #[test]
    fn load_or_default_falls_back_on_garbage() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(b"[[towers]]\nkind = 42\n").expect("write");
        assert_eq!(Catalog::load_or_default(file.path()), Catalog::builtin());
    }

    #[test]
    fn load_reads_valid_files() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(PARTIAL.as_bytes()).expect("write");
        let catalog = Catalog::load(file.path()).expect("load");
        assert_eq!(catalog.economy().starting_salvage, 500);
    }

    #[test]
    #[should_panic(expected = "missing from the catalog")]
    fn tower_spec_panics_for_unconfigured_kinds() {
        let catalog = Catalog::from_toml_str("").expect("empty document");
        let _ = catalog.tower_spec(TowerKind::DroneBay);
    }
}
