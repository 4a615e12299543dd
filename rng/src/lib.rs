#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic random number generation for Space Salvagers.
//!
//! Every gameplay-affecting draw flows through [`SeededRandom`], a plain
//! 64-bit linear congruential generator. Independent streams are obtained
//! from a [`RandomRegistry`] keyed by name so that, for example, wave
//! composition and critical hit rolls never perturb each other. Nothing in
//! this crate reads the wall clock or hashes addresses: identical seeds and
//! identical draw counts always reproduce identical sequences.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use thiserror::Error;

const LCG_MULTIPLIER: u64 = 1_664_525;
const LCG_INCREMENT: u64 = 1_013_904_223;

/// Linear congruential generator with an explicit seed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededRandom {
    state: u64,
    draws: u64,
}

impl SeededRandom {
    /// Creates a generator whose first draw is derived from `seed`.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: seed,
            draws: 0,
        }
    }

    /// Current internal state.
    #[must_use]
    pub const fn state(&self) -> u64 {
        self.state
    }

    /// Number of raw draws taken since seeding.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }

    /// Advances the generator and returns the new raw state.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.draws = self.draws.wrapping_add(1);
        self.state
    }

    /// Draws an integer in the inclusive range `[min, max]`.
    ///
    /// The draw is a plain modulo reduction, so ranges that do not divide
    /// 2^64 evenly are slightly biased towards low offsets. Replays depend on
    /// that exact bias.
    pub fn int_in(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }

        let span = (i128::from(max) - i128::from(min) + 1) as u128;
        let raw = self.next_u64();
        if span > u128::from(u64::MAX) {
            return raw as i64;
        }

        let offset = u128::from(raw) % span;
        (i128::from(min) + offset as i128) as i64
    }

    /// Draws an index in `[0, len)`; returns zero for empty ranges without drawing.
    pub fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        let upper = i64::try_from(len - 1).unwrap_or(i64::MAX);
        self.int_in(0, upper) as usize
    }

    /// Draws a float in `[0, 1)` as the raw state divided by `u64::MAX`.
    pub fn unit(&mut self) -> f64 {
        self.next_u64() as f64 / u64::MAX as f64
    }

    /// Draws a float in `[min, max]` by linear interpolation.
    pub fn float_in(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.unit()
    }

    /// Returns `true` with probability `probability`.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.unit() < probability
    }

    /// Picks a uniformly drawn element, or `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.index(items.len());
        items.get(index)
    }

    /// Shuffles the slice in place using Fisher-Yates.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for index in (1..items.len()).rev() {
            let swap_index = self.index(index + 1);
            items.swap(index, swap_index);
        }
    }
}

/// Hashes a stream key into a seed offset.
///
/// The first eight bytes of the SHA-256 digest are used so the value is
/// stable across platforms and toolchains.
#[must_use]
pub fn key_hash(key: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    finalize_u64(hasher)
}

/// Running digest over an ordered sequence of records.
///
/// Used to compare long outputs (event streams, decision logs) of two runs
/// without keeping both in memory.
#[derive(Clone, Debug, Default)]
pub struct StreamDigest {
    hasher: Sha256,
    records: u64,
}

impl StreamDigest {
    /// Creates an empty digest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one record.
    pub fn record(&mut self, record: &str) {
        self.hasher.update((record.len() as u64).to_le_bytes());
        self.hasher.update(record.as_bytes());
        self.records += 1;
    }

    /// Number of records appended so far.
    #[must_use]
    pub const fn records(&self) -> u64 {
        self.records
    }

    /// Digest of everything recorded so far.
    #[must_use]
    pub fn value(&self) -> u64 {
        finalize_u64(self.hasher.clone())
    }
}

/// Derives the seed of the stream named `key` from a master seed.
#[must_use]
pub fn derive_stream_seed(master_seed: u64, key: &str) -> u64 {
    let mut temp = SeededRandom::new(master_seed);
    temp.next_u64() ^ key_hash(key)
}

/// Registry of independent generators keyed by stream name.
#[derive(Clone, Debug)]
pub struct RandomRegistry {
    master_seed: u64,
    generators: BTreeMap<String, SeededRandom>,
}

impl RandomRegistry {
    /// Creates an empty registry derived from `master_seed`.
    #[must_use]
    pub fn new(master_seed: u64) -> Self {
        Self {
            master_seed,
            generators: BTreeMap::new(),
        }
    }

    /// Master seed every stream is derived from.
    #[must_use]
    pub const fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Returns the generator for `key`, creating it deterministically on first use.
    pub fn generator(&mut self, key: &str) -> &mut SeededRandom {
        let master_seed = self.master_seed;
        self.generators
            .entry(key.to_owned())
            .or_insert_with(|| SeededRandom::new(derive_stream_seed(master_seed, key)))
    }

    /// Replaces the master seed and forgets every derived stream.
    pub fn reseed(&mut self, master_seed: u64) {
        self.master_seed = master_seed;
        self.generators.clear();
    }

    /// Number of streams materialised so far.
    #[must_use]
    pub fn stream_count(&self) -> usize {
        self.generators.len()
    }

    /// Digest of every stream's key, state and draw count.
    ///
    /// Two registries driven through the same sequence of draws always report
    /// the same fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.master_seed.to_le_bytes());
        for (key, generator) in &self.generators {
            hasher.update(key.as_bytes());
            hasher.update(generator.state().to_le_bytes());
            hasher.update(generator.draws().to_le_bytes());
        }
        finalize_u64(hasher)
    }
}

/// Failure reported when a replay does not reproduce the recorded checksum.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("replay desynchronised after {draws} draws from seed {seed:#x}: expected {expected:#x}, observed {observed:#x}")]
pub struct DesyncError {
    /// Seed the replay started from.
    pub seed: u64,
    /// Number of draws replayed.
    pub draws: u64,
    /// Checksum recorded by the original run.
    pub expected: u64,
    /// Checksum produced by the replay.
    pub observed: u64,
}

/// State reached after exactly `draws` draws from `seed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReplayChecksum {
    seed: u64,
    draws: u64,
    value: u64,
}

impl ReplayChecksum {
    /// Runs `draws` draws from `seed` and records the resulting state.
    #[must_use]
    pub fn compute(seed: u64, draws: u64) -> Self {
        let mut generator = SeededRandom::new(seed);
        for _ in 0..draws {
            let _ = generator.next_u64();
        }
        Self {
            seed,
            draws,
            value: generator.state(),
        }
    }

    /// Records the checksum of a generator that has already been driven.
    #[must_use]
    pub fn capture(seed: u64, generator: &SeededRandom) -> Self {
        Self {
            seed,
            draws: generator.draws(),
            value: generator.state(),
        }
    }

    /// Seed the checksum was taken from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of draws covered by the checksum.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }

    /// Generator state after the draws.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.value
    }

    /// Re-derives the checksum from scratch and compares it with the recorded value.
    pub fn verify(&self) -> Result<(), DesyncError> {
        let replayed = Self::compute(self.seed, self.draws);
        self.verify_against(replayed.value)
    }

    /// Compares the recorded value against an observed generator state.
    pub fn verify_against(&self, observed: u64) -> Result<(), DesyncError> {
        if observed == self.value {
            Ok(())
        } else {
            Err(DesyncError {
                seed: self.seed,
                draws: self.draws,
                expected: self.value,
                observed,
            })
        }
    }
}

fn finalize_u64(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_le_bytes(bytes)
}
