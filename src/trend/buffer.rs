use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::models::Sample;

/// Maximum number of samples kept in the trend history.
pub const TREND_CAPACITY: usize = 14;

/// Weekday mock values a new session starts with.
pub const SEED_SAMPLES: [(&str, i32); 7] = [
    ("Mon", 78),
    ("Tue", 74),
    ("Wed", 80),
    ("Thu", 76),
    ("Fri", 82),
    ("Sat", 79),
    ("Sun", 77),
];

/// Rolling window of the most recent samples, oldest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "TrendRecord")]
pub struct TrendBuffer {
    samples: VecDeque<Sample>,
    last_sample_at: Option<DateTime<Local>>,
}

/// Wire form of a [`TrendBuffer`]; trimmed to capacity on the way in.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrendRecord {
    #[serde(default)]
    samples: VecDeque<Sample>,
    #[serde(default)]
    last_sample_at: Option<DateTime<Local>>,
}

impl From<TrendRecord> for TrendBuffer {
    fn from(record: TrendRecord) -> Self {
        let mut samples = record.samples;
        let overflow = samples.len().saturating_sub(TREND_CAPACITY);
        samples.drain(..overflow);
        Self {
            samples,
            last_sample_at: record.last_sample_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub min: i32,
    pub max: i32,
    pub average: f64,
    pub count: usize,
}

impl TrendBuffer {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(TREND_CAPACITY + 1),
            last_sample_at: None,
        }
    }

    pub fn seeded() -> Self {
        let mut buffer = Self::new();
        buffer.samples.extend(
            SEED_SAMPLES
                .iter()
                .map(|(label, bpm)| Sample::labelled(*label, *bpm)),
        );
        buffer
    }

    /// Appends a reading taken at `now` and returns the sample evicted to
    /// stay within [`TREND_CAPACITY`], if any.
    pub fn append(&mut self, bpm: i32, now: DateTime<Local>) -> Option<Sample> {
        self.samples.push_back(Sample::recorded(bpm, now));
        self.last_sample_at = Some(now);

        // One push can overflow by at most one.
        if self.samples.len() > TREND_CAPACITY {
            self.samples.pop_front()
        } else {
            None
        }
    }

    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn to_vec(&self) -> Vec<Sample> {
        self.samples.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn last_sample_at(&self) -> Option<DateTime<Local>> {
        self.last_sample_at
    }

    pub fn summary(&self) -> Option<TrendSummary> {
        let min = self.samples.iter().map(|s| s.bpm).min()?;
        let max = self.samples.iter().map(|s| s.bpm).max()?;
        let total: i64 = self.samples.iter().map(|s| i64::from(s.bpm)).sum();
        let count = self.samples.len();

        Some(TrendSummary {
            min,
            max,
            average: total as f64 / count as f64,
            count,
        })
    }
}
