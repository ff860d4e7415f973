use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Neutral,
    Ok,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AlertStatus {
    pub text: String,
    pub severity: Severity,
}

impl AlertStatus {
    fn new(severity: Severity, text: &str) -> Self {
        Self {
            text: text.to_string(),
            severity,
        }
    }
}

/// Classifies the latest reading against the threshold. Total over all inputs.
pub fn status(latest_bpm: i32, threshold: i32, alerts_enabled: bool) -> AlertStatus {
    if !alerts_enabled {
        AlertStatus::new(Severity::Neutral, "Alerts disabled")
    } else if latest_bpm >= threshold {
        AlertStatus::new(Severity::Warning, "Above threshold now")
    } else {
        AlertStatus::new(Severity::Ok, "Below threshold")
    }
}
