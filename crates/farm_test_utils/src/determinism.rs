//! Determinism testing utilities.
//!
//! Provides harnesses for verifying that the farm simulation produces
//! identical results given identical inputs, and that offline
//! reconciliation is independent of how elapsed time is split.
//!
//! # Testing Strategy
//!
//! Sources of non-determinism the harness is meant to catch:
//!
//! - **Floating-point math**: cycle durations are converted once to
//!   [`farm_core::math::Fixed`]; all duration math is fixed-point.
//!
//! - **Hash map iteration order**: ledgers are `BTreeMap`s and plots,
//!   workers and tasks are ordered sequences.
//!
//! - **Hidden clocks**: every operation takes the current timestamp as an
//!   argument, so replaying the same calls replays the same state.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: per-entity readiness and spoilage
//! 2. **Property tests**: random partitions of an interval reconcile identically
//! 3. **Integration tests**: scripted sessions are reproducible
//! 4. **Parallel tests**: running N farms on separate threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use farm_core::config::GameConfig;
use farm_core::farm::Farm;
use farm_core::math::Timestamp;
use farm_core::reconcile::Reconciler;
use farm_core::snapshot::FarmSnapshot;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps simulated.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Farm simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `steps` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance the state by one step (receives the step index)
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for i in 0..steps {
            step(&mut state, i);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Outcome of comparing a partitioned reconciliation with a single one.
#[derive(Debug, Clone)]
pub struct PartitionResult {
    /// Farm after reconciling once to the end instant.
    pub whole: Farm,
    /// Farm after reconciling through every cut point, then to the end.
    pub split: Farm,
    /// Cut points used, in order.
    pub cuts: Vec<Timestamp>,
}

impl PartitionResult {
    /// Whether both farms are identical.
    #[must_use]
    pub fn is_idempotent(&self) -> bool {
        self.whole == self.split
    }

    /// Assert both farms are identical.
    ///
    /// # Panics
    ///
    /// Panics with both states when they differ.
    pub fn assert_idempotent(&self) {
        assert!(
            self.is_idempotent(),
            "Reconciliation depends on partitioning!\n\
             Cuts: {:?}\n\
             Whole hash: {} Split hash: {}\n\
             Whole: {:#?}\n\
             Split: {:#?}",
            self.cuts,
            self.whole.state_hash(),
            self.split.state_hash(),
            self.whole,
            self.split
        );
    }
}

/// Reconcile a copy of `farm` once to `end`, and another copy through each
/// of `cuts` (sorted here) and then to `end`.
#[must_use]
pub fn compare_partitions(
    config: &GameConfig,
    farm: &Farm,
    mut cuts: Vec<Timestamp>,
    end: Timestamp,
) -> PartitionResult {
    cuts.sort_unstable();
    let reconciler = Reconciler::new(config);

    let mut whole = farm.clone();
    reconciler.reconcile(&mut whole, end);

    let mut split = farm.clone();
    for &cut in &cuts {
        reconciler.reconcile(&mut split, cut);
    }
    reconciler.reconcile(&mut split, end);

    tracing::debug!(
        cuts = cuts.len(),
        whole = whole.state_hash(),
        split = split.state_hash(),
        "Compared partitions"
    );
    PartitionResult { whole, split, cuts }
}

/// Result of parallel farm runs.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Final state hash from each farm.
    pub hashes: Vec<u64>,
    /// Number of farms run.
    pub num_farms: usize,
}

impl ParallelRunResult {
    /// Check if all farms produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Run N copies of a scripted session on scoped threads and collect final hashes.
pub fn run_parallel_farms<Setup, Script>(
    setup: Setup,
    script: Script,
    num_farms: usize,
) -> ParallelRunResult
where
    Setup: Fn() -> Farm + Sync,
    Script: Fn(&mut Farm) + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_farms)
            .map(|_| {
                s.spawn(|| {
                    let mut farm = setup();
                    script(&mut farm);
                    farm.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("farm thread panicked"))
            .collect()
    });

    ParallelRunResult { hashes, num_farms }
}

/// Verify that a snapshot round-trip through bytes and JSON preserves the
/// farm exactly and needs no repair.
pub fn verify_snapshot_roundtrip(config: &GameConfig, farm: &Farm, saved_at: Timestamp) -> bool {
    let snapshot = FarmSnapshot::capture(farm, saved_at);

    let Ok(bytes) = snapshot.to_bytes() else {
        return false;
    };
    let Ok(from_bytes) = FarmSnapshot::from_bytes(&bytes) else {
        return false;
    };
    let Ok(text) = snapshot.to_json() else {
        return false;
    };
    let Ok(from_json) = FarmSnapshot::from_json(&text) else {
        return false;
    };

    [from_bytes, from_json].into_iter().all(|decoded| {
        let (restored, report) = decoded.restore(config);
        report.is_clean() && restored.state_hash() == farm.state_hash()
    })
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for farm property tests.
pub mod strategies {
    use farm_core::config::ProduceConfig;
    use farm_core::kind::CropKind;
    use farm_core::math::Timestamp;
    use proptest::prelude::*;

    use crate::fixtures::t0;

    /// Generate a base cycle duration in minutes (0.5 to 120).
    pub fn arb_cycle_minutes() -> impl Strategy<Value = f64> {
        (1u32..240u32).prop_map(|halves| f64::from(halves) / 2.0)
    }

    /// Generate a well-formed produce configuration.
    pub fn arb_produce_config() -> impl Strategy<Value = ProduceConfig> {
        (arb_cycle_minutes(), 1u32..5u32, 1u32..60u32, 1u32..50u32).prop_map(
            |(cycle, yield_per_cycle, lifespan, price)| {
                ProduceConfig::new(cycle, yield_per_cycle, lifespan, price, 10)
            },
        )
    }

    /// Generate an equipment tier (1-6).
    pub fn arb_tier() -> impl Strategy<Value = u32> {
        1u32..=6u32
    }

    /// Generate any crop kind.
    pub fn arb_crop() -> impl Strategy<Value = CropKind> {
        prop_oneof![
            Just(CropKind::Tomato),
            Just(CropKind::Blueberry),
            Just(CropKind::Strawberry),
        ]
    }

    /// Generate an offset from `t0()` in milliseconds, up to `max_minutes`.
    pub fn arb_offset_millis(max_minutes: i64) -> impl Strategy<Value = i64> {
        0i64..=(max_minutes * 60_000)
    }

    /// Generate an end instant and up to `max_cuts` cut points before it.
    pub fn arb_partition(
        max_minutes: i64,
        max_cuts: usize,
    ) -> impl Strategy<Value = (Vec<Timestamp>, Timestamp)> {
        (
            proptest::collection::vec(arb_offset_millis(max_minutes), 0..=max_cuts),
            arb_offset_millis(max_minutes),
        )
            .prop_map(|(cuts, end)| {
                let at = |millis: i64| Timestamp::from_millis(t0().as_millis() + millis);
                let cuts = cuts.into_iter().map(|c| at(c.min(end))).collect();
                (cuts, at(end))
            })
    }
}
