use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::alerts::{AlertConfig, AlertStatus};
use crate::models::Sample;
use crate::settings::MonitorSettings;
use crate::trend::TrendBuffer;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub status: SyncStatus,
    /// Fraction in `[0, 1]`.
    pub progress: f64,
    pub last_result: Option<i32>,
    /// Bumped on every start/cancel so steps from a superseded run are ignored.
    #[serde(skip)]
    pub generation: u64,
}

/// What a single sync step did to the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncStep {
    Stale,
    Advanced(f64),
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub trend: TrendBuffer,
    pub alert_config: AlertConfig,
    pub latest_bpm: i32,
    pub sync: SyncState,
    pub monitoring: bool,
    #[serde(skip)]
    pub monitor_generation: u64,
}

impl SessionState {
    pub fn new(id: String, settings: &MonitorSettings, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            started_at,
            trend: TrendBuffer::seeded(),
            alert_config: settings.alert_config(),
            latest_bpm: settings.initial_bpm,
            sync: SyncState::default(),
            monitoring: false,
            monitor_generation: 0,
        }
    }

    pub fn alert_status(&self) -> AlertStatus {
        self.alert_config.evaluate(self.latest_bpm)
    }

    /// Appends a reading to the trend and makes it the latest value.
    pub fn record_reading(&mut self, bpm: i32, now: DateTime<Local>) -> Sample {
        self.trend.append(bpm, now);
        self.latest_bpm = bpm;
        self.trend
            .latest()
            .cloned()
            .unwrap_or_else(|| Sample::recorded(bpm, now))
    }

    pub fn begin_monitoring(&mut self) -> u64 {
        self.monitor_generation = self.monitor_generation.wrapping_add(1);
        self.monitoring = true;
        self.monitor_generation
    }

    pub fn end_monitoring(&mut self) {
        self.monitor_generation = self.monitor_generation.wrapping_add(1);
        self.monitoring = false;
    }

    pub fn is_current_monitor(&self, generation: u64) -> bool {
        self.monitoring && self.monitor_generation == generation
    }

    pub fn begin_sync(&mut self) -> u64 {
        self.sync.generation = self.sync.generation.wrapping_add(1);
        self.sync.status = SyncStatus::Syncing;
        self.sync.progress = 0.0;
        self.sync.generation
    }

    /// Returns `false` when there was no running sync to cancel.
    pub fn cancel_sync(&mut self) -> bool {
        if self.sync.status != SyncStatus::Syncing {
            return false;
        }
        self.sync.generation = self.sync.generation.wrapping_add(1);
        self.sync.status = SyncStatus::Cancelled;
        true
    }

    /// Moves the sync forward by `increment`, keeping progress within `[0, 1]`.
    pub fn advance_sync(&mut self, generation: u64, increment: f64) -> SyncStep {
        if self.sync.status != SyncStatus::Syncing || self.sync.generation != generation {
            return SyncStep::Stale;
        }

        self.sync.progress = (self.sync.progress + increment).clamp(0.0, 1.0);
        if self.sync.progress >= 1.0 {
            SyncStep::Finished
        } else {
            SyncStep::Advanced(self.sync.progress)
        }
    }

    pub fn complete_sync(&mut self, bpm: i32, now: DateTime<Local>) -> Sample {
        self.sync.status = SyncStatus::Completed;
        self.sync.progress = 1.0;
        self.sync.last_result = Some(bpm);
        self.record_reading(bpm, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::Severity;

    fn new_state() -> SessionState {
        SessionState::new("s1".into(), &MonitorSettings::default(), Utc::now())
    }

    #[test]
    fn new_session_uses_seed_values() {
        let state = new_state();
        assert_eq!(state.trend.len(), 7);
        assert_eq!(state.latest_bpm, 72);
        assert_eq!(state.alert_config.threshold(), 95);
        assert!(state.alert_config.alerts_enabled);
        assert_eq!(state.sync.status, SyncStatus::Idle);
        assert_eq!(state.alert_status().severity, Severity::Ok);
    }

    #[test]
    fn record_reading_updates_latest_and_trend() {
        let mut state = new_state();
        let sample = state.record_reading(99, Local::now());
        assert_eq!(sample.bpm, 99);
        assert_eq!(state.latest_bpm, 99);
        assert_eq!(state.trend.len(), 8);
        assert_eq!(state.alert_status().severity, Severity::Warning);
    }

    #[test]
    fn sync_takes_seven_steps_of_fifteen_percent() {
        let mut state = new_state();
        let generation = state.begin_sync();

        for _ in 0..6 {
            assert!(matches!(
                state.advance_sync(generation, 0.15),
                SyncStep::Advanced(p) if p < 1.0
            ));
        }
        assert_eq!(state.advance_sync(generation, 0.15), SyncStep::Finished);
        assert!((state.sync.progress - 1.0).abs() < f64::EPSILON);

        state.complete_sync(64, Local::now());
        assert_eq!(state.sync.status, SyncStatus::Completed);
        assert_eq!(state.sync.last_result, Some(64));
        assert_eq!(state.latest_bpm, 64);
    }

    #[test]
    fn progress_never_leaves_unit_range() {
        let mut state = new_state();
        let generation = state.begin_sync();

        assert_eq!(state.advance_sync(generation, -0.15), SyncStep::Advanced(0.0));
        assert_eq!(state.sync.progress, 0.0);

        assert_eq!(state.advance_sync(generation, 4.0), SyncStep::Finished);
        assert_eq!(state.sync.progress, 1.0);
    }

    #[test]
    fn superseded_sync_steps_are_ignored() {
        let mut state = new_state();
        let first = state.begin_sync();
        assert!(state.cancel_sync());
        let second = state.begin_sync();

        assert_eq!(state.advance_sync(first, 0.15), SyncStep::Stale);
        assert!(matches!(state.advance_sync(second, 0.15), SyncStep::Advanced(_)));
    }

    #[test]
    fn cancelling_idle_sync_is_a_no_op() {
        let mut state = new_state();
        assert!(!state.cancel_sync());
        assert_eq!(state.sync.status, SyncStatus::Idle);

        state.begin_sync();
        assert!(state.cancel_sync());
        assert!(!state.cancel_sync());
        assert_eq!(state.sync.status, SyncStatus::Cancelled);
    }

    #[test]
    fn monitor_generation_tracks_restarts() {
        let mut state = new_state();
        let first = state.begin_monitoring();
        let second = state.begin_monitoring();
        assert!(!state.is_current_monitor(first));
        assert!(state.is_current_monitor(second));

        state.end_monitoring();
        assert!(!state.is_current_monitor(second));
    }
}
