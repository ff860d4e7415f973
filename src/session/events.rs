use serde::Serialize;

use crate::alerts::AlertStatus;
use crate::feed::Acquisition;
use crate::models::Sample;

/// Published to subscribers whenever the session changes.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MonitorEvent {
    SampleRecorded {
        sample: Sample,
        acquisition: Acquisition,
        status: AlertStatus,
    },
    AlertChanged {
        status: AlertStatus,
    },
    SyncProgress {
        progress: f64,
    },
    SyncFinished {
        bpm: i32,
    },
    SyncCancelled,
    MonitoringChanged {
        active: bool,
    },
}

impl MonitorEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MonitorEvent::SampleRecorded { .. } => "sample-recorded",
            MonitorEvent::AlertChanged { .. } => "alert-changed",
            MonitorEvent::SyncProgress { .. } => "sync-progress",
            MonitorEvent::SyncFinished { .. } => "sync-finished",
            MonitorEvent::SyncCancelled => "sync-cancelled",
            MonitorEvent::MonitoringChanged { .. } => "monitoring-changed",
        }
    }
}
