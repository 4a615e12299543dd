use space_salvagers_rng::{RandomRegistry, ReplayChecksum, SeededRandom};

const SEEDS: [u64; 6] = [0, 1, 42, 0x5eed_5a1e, u64::MAX, 0x8000_0000_0000_0001];
const DRAW_COUNTS: [u64; 4] = [0, 1, 17, 1_024];

fn mixed_sequence(seed: u64, draws: u64) -> Vec<u64> {
    let mut generator = SeededRandom::new(seed);
    let mut out = Vec::new();
    let mut values: Vec<u64> = (0..8).collect();
    for step in 0..draws {
        let value = match step % 5 {
            0 => generator.next_u64(),
            1 => generator.int_in(-50, 50) as u64,
            2 => generator.unit().to_bits(),
            3 => u64::from(generator.chance(0.3)),
            _ => {
                generator.shuffle(&mut values);
                values[0]
            }
        };
        out.push(value);
    }
    out
}

#[test]
fn identical_seeds_reproduce_identical_sequences() {
    for seed in SEEDS {
        for draws in DRAW_COUNTS {
            let first = mixed_sequence(seed, draws);
            let second = mixed_sequence(seed, draws);
            assert_eq!(first, second, "sequence diverged for seed {seed:#x}");
        }
    }
}

#[test]
fn identical_seeds_reproduce_identical_checksums() {
    for seed in SEEDS {
        for draws in DRAW_COUNTS {
            let first = ReplayChecksum::compute(seed, draws);
            let second = ReplayChecksum::compute(seed, draws);
            assert_eq!(first, second);
            assert!(first.verify().is_ok());
        }
    }
}

#[test]
fn registry_fingerprint_is_reproducible() {
    let drive = |seed: u64| {
        let mut registry = RandomRegistry::new(seed);
        for round in 0..50_u64 {
            let key = ["waves", "combat", "autopilot"][(round % 3) as usize];
            let _ = registry.generator(key).int_in(0, 99);
        }
        registry.fingerprint()
    };

    assert_eq!(drive(7), drive(7));
    assert_ne!(drive(7), drive(8));
}

#[test]
fn pinned_sequence_guards_against_silent_algorithm_changes() {
    let mut generator = SeededRandom::new(0);
    let values: Vec<u64> = (0..3).map(|_| generator.next_u64()).collect();
    assert_eq!(values[0], 1_013_904_223);
    assert_eq!(
        values[1],
        1_013_904_223_u64
            .wrapping_mul(1_664_525)
            .wrapping_add(1_013_904_223)
    );
    assert_eq!(
        values[2],
        values[1].wrapping_mul(1_664_525).wrapping_add(1_013_904_223)
    );
}
