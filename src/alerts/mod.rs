pub mod evaluator;

use serde::{Deserialize, Serialize};

pub use evaluator::{status, AlertStatus, Severity};

pub const THRESHOLD_MIN: i32 = 60;
pub const THRESHOLD_MAX: i32 = 140;
pub const DEFAULT_THRESHOLD: i32 = 95;

/// User-adjustable alert settings. The threshold always stays within
/// [`THRESHOLD_MIN`]..=[`THRESHOLD_MAX`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "AlertRecord")]
pub struct AlertConfig {
    threshold: i32,
    pub alerts_enabled: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlertRecord {
    threshold: i32,
    alerts_enabled: bool,
}

impl From<AlertRecord> for AlertConfig {
    fn from(record: AlertRecord) -> Self {
        Self::new(record.threshold, record.alerts_enabled)
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, true)
    }
}

impl AlertConfig {
    pub fn new(threshold: i32, alerts_enabled: bool) -> Self {
        Self {
            threshold: clamp_threshold(threshold),
            alerts_enabled,
        }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Stores the clamped value and returns it.
    pub fn set_threshold(&mut self, threshold: i32) -> i32 {
        self.threshold = clamp_threshold(threshold);
        self.threshold
    }

    pub fn evaluate(&self, latest_bpm: i32) -> AlertStatus {
        status(latest_bpm, self.threshold, self.alerts_enabled)
    }
}

fn clamp_threshold(value: i32) -> i32 {
    value.clamp(THRESHOLD_MIN, THRESHOLD_MAX)
}
