use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Label format used on chart axes, e.g. "Mon 3:45 PM".
const LABEL_FORMAT: &str = "%a %-I:%M %p";

/// One heart-rate reading. Never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub timestamp_label: String,
    pub bpm: i32,
    /// `None` for the fixed mock samples a session is seeded with.
    pub recorded_at: Option<DateTime<Local>>,
}

impl Sample {
    pub fn recorded(bpm: i32, now: DateTime<Local>) -> Self {
        Self {
            timestamp_label: format_label(&now),
            bpm,
            recorded_at: Some(now),
        }
    }

    pub fn labelled(label: impl Into<String>, bpm: i32) -> Self {
        Self {
            timestamp_label: label.into(),
            bpm,
            recorded_at: None,
        }
    }
}

pub fn format_label(at: &DateTime<Local>) -> String {
    at.format(LABEL_FORMAT).to_string()
}
