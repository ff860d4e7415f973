use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use crate::alerts::{AlertConfig, DEFAULT_THRESHOLD};
use crate::feed::AcquisitionRanges;

const DEFAULT_SYNC_INCREMENT: f64 = 0.15;
const DEBUG_TICK_INTERVAL_MS: u64 = 1_000;

/// `"1"` or any casing of `"true"` turns debug mode on.
pub fn debug_mode(value: Option<&str>) -> bool {
    value
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorSettings {
    pub tick_interval_ms: u64,
    pub sync_step_ms: u64,
    pub sync_increment: f64,
    pub ranges: AcquisitionRanges,
    pub default_threshold: i32,
    pub alerts_enabled: bool,
    pub initial_bpm: i32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 7_000,
            sync_step_ms: 500,
            sync_increment: DEFAULT_SYNC_INCREMENT,
            ranges: AcquisitionRanges::default(),
            default_threshold: DEFAULT_THRESHOLD,
            alerts_enabled: true,
            initial_bpm: 72,
        }
    }
}

impl MonitorSettings {
    /// Applies `HEARTWATCH_DEBUG`, which shortens the periodic tick to one second.
    pub fn with_env_overrides(self) -> Self {
        let value = std::env::var("HEARTWATCH_DEBUG").ok();
        self.with_debug_mode(debug_mode(value.as_deref()))
    }

    pub fn with_debug_mode(mut self, enabled: bool) -> Self {
        if enabled {
            self.tick_interval_ms = DEBUG_TICK_INTERVAL_MS;
        }
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn sync_step(&self) -> Duration {
        Duration::from_millis(self.sync_step_ms.max(1))
    }

    /// Progress added per sync step; non-positive or non-finite values fall
    /// back to the default so a sync always completes.
    pub fn sync_increment(&self) -> f64 {
        if self.sync_increment.is_finite() && self.sync_increment > 0.0 {
            self.sync_increment
        } else {
            DEFAULT_SYNC_INCREMENT
        }
    }

    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig::new(self.default_threshold, self.alerts_enabled)
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<MonitorSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring malformed settings in {}: {err}", path.display());
                MonitorSettings::default()
            })
        } else {
            MonitorSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn monitor(&self) -> MonitorSettings {
        self.read().clone()
    }

    pub fn update(&self, settings: MonitorSettings) -> Result<()> {
        let mut guard = self.write();
        *guard = settings;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: MonitorSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", self.path.display()))?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &MonitorSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, MonitorSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, MonitorSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::BpmRange;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        let settings = store.monitor();

        assert_eq!(settings, MonitorSettings::default());
        assert_eq!(settings.tick_interval(), Duration::from_secs(7));
        assert_eq!(settings.sync_step(), Duration::from_millis(500));
        assert_eq!(settings.alert_config().threshold(), 95);
    }

    #[test]
    fn update_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut settings = store.monitor();
        settings.default_threshold = 110;
        settings.ranges.refresh = BpmRange::new(70, 90);
        store.update(settings.clone()).unwrap();

        let reopened = SettingsStore::new(path).unwrap();
        assert_eq!(reopened.monitor(), settings);
        reopened.reload().unwrap();
        assert_eq!(reopened.monitor().ranges.refresh, BpmRange::new(70, 90));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "tickIntervalMs": 2000 }"#).unwrap();

        let settings = SettingsStore::new(path).unwrap().monitor();
        assert_eq!(settings.tick_interval_ms, 2_000);
        assert_eq!(settings.ranges, AcquisitionRanges::default());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.monitor(), MonitorSettings::default());
        assert!(store.reload().is_err());
    }

    #[test]
    fn debug_flag_spellings() {
        assert!(debug_mode(Some("1")));
        assert!(debug_mode(Some("true")));
        assert!(debug_mode(Some("TRUE")));
        assert!(!debug_mode(Some("0")));
        assert!(!debug_mode(Some("yes")));
        assert!(!debug_mode(None));
    }

    #[test]
    fn debug_mode_shortens_tick_interval() {
        let debug = MonitorSettings::default().with_debug_mode(debug_mode(Some("true")));
        assert_eq!(debug.tick_interval(), Duration::from_secs(1));

        let normal = MonitorSettings::default().with_debug_mode(debug_mode(None));
        assert_eq!(normal.tick_interval(), Duration::from_secs(7));
    }

    #[test]
    fn env_override_reads_heartwatch_debug() {
        std::env::set_var("HEARTWATCH_DEBUG", "1");
        let debug = MonitorSettings::default().with_env_overrides();
        std::env::remove_var("HEARTWATCH_DEBUG");
        let normal = MonitorSettings::default().with_env_overrides();

        assert_eq!(debug.tick_interval(), Duration::from_secs(1));
        assert_eq!(normal.tick_interval(), Duration::from_secs(7));
    }

    #[test]
    fn invalid_sync_increment_falls_back() {
        for bad in [-0.15, 0.0, f64::NAN, f64::INFINITY] {
            let settings = MonitorSettings {
                sync_increment: bad,
                ..MonitorSettings::default()
            };
            assert_eq!(settings.sync_increment(), 0.15);
        }

        let custom = MonitorSettings {
            sync_increment: 0.25,
            ..MonitorSettings::default()
        };
        assert_eq!(custom.sync_increment(), 0.25);
    }

    #[test]
    fn out_of_range_threshold_is_clamped() {
        let settings = MonitorSettings {
            default_threshold: 300,
            ..MonitorSettings::default()
        };
        assert_eq!(settings.alert_config().threshold(), 140);
    }
}
