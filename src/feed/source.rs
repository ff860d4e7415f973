use std::collections::VecDeque;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Anything that can hand out a heart-rate reading on request.
///
/// The simulated sources below stand in for a real device or health-data
/// client.
pub trait SampleSource: Send {
    fn produce_reading(&mut self) -> i32;
}

/// Inclusive BPM range a simulated source draws from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BpmRange {
    pub min: i32,
    pub max: i32,
}

impl BpmRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Bounds in ascending order, tolerating a reversed config.
    fn bounds(&self) -> (i32, i32) {
        if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        }
    }

    pub fn contains(&self, bpm: i32) -> bool {
        let (lo, hi) = self.bounds();
        (lo..=hi).contains(&bpm)
    }
}

pub struct RandomSource {
    rng: StdRng,
    range: BpmRange,
}

impl RandomSource {
    pub fn new(range: BpmRange) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            range,
        }
    }

    pub fn seeded(range: BpmRange, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            range,
        }
    }
}

impl SampleSource for RandomSource {
    fn produce_reading(&mut self) -> i32 {
        let (lo, hi) = self.range.bounds();
        self.rng.gen_range(lo..=hi)
    }
}

/// Replays a fixed list of readings, then repeats `fallback`.
pub struct ScriptedSource {
    readings: VecDeque<i32>,
    fallback: i32,
}

impl ScriptedSource {
    pub fn new(readings: impl IntoIterator<Item = i32>, fallback: i32) -> Self {
        Self {
            readings: readings.into_iter().collect(),
            fallback,
        }
    }
}

impl SampleSource for ScriptedSource {
    fn produce_reading(&mut self) -> i32 {
        self.readings.pop_front().unwrap_or(self.fallback)
    }
}
