//! ---
//! herd_section: "11-simulation"
//! herd_subsection: "randomness"
//! herd_type: "source"
//! herd_scope: "code"
//! herd_description: "Pluggable random sources for the motion model."
//! herd_version: "v0.1.0"
//! herd_owner: "tbd"
//! ---
use herd_common::ValueRange;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform samples driving every random decision of a simulator.
///
/// Implementors only supply [`RandomSource::next_unit`]; all derived draws go
/// through it, so a scripted source fully determines a trajectory.
pub trait RandomSource: Send {
    /// Next sample in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    fn uniform(&mut self, range: &ValueRange<f64>) -> f64 {
        range.min + self.next_unit() * (range.max - range.min)
    }

    /// Inclusive integer draw.
    fn integer(&mut self, range: &ValueRange<u32>) -> u32 {
        let span = u64::from(range.max.saturating_sub(range.min)) + 1;
        let offset = (self.next_unit() * span as f64).floor() as u64;
        range.min + offset.min(span - 1) as u32
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.next_unit() < probability
    }
}

/// Production source backed by a seedable [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is present, entropy-seeded otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }

    /// Derive an independent child source, e.g. one per simulated entity.
    pub fn fork(&mut self) -> Self {
        Self::from_seed(self.rng.gen())
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed cycle of unit samples. Used to pin exact trajectories in tests.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    samples: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Samples are clamped into `[0, 1)`; an empty script always yields `0.0`.
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        Self {
            samples: samples
                .into_iter()
                .map(|s| s.clamp(0.0, 1.0 - f64::EPSILON))
                .collect(),
            cursor: 0,
        }
    }

    /// A source that always returns the same sample.
    pub fn constant(sample: f64) -> Self {
        Self::new([sample])
    }

    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sample = self.samples[self.cursor % self.samples.len()];
        self.cursor += 1;
        sample
    }
}
