use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{Local, Utc};
use serde::Serialize;
use tokio::{
    sync::{broadcast, Mutex},
    time::Duration,
};
use uuid::Uuid;

use crate::{
    alerts::AlertStatus,
    feed::{Acquisition, SampleFeeds},
    models::Sample,
    scheduler::{PeriodicTask, TickFlow},
    settings::MonitorSettings,
    trend::TrendSummary,
};

use super::{
    events::MonitorEvent,
    state::{SessionState, SyncState, SyncStatus, SyncStep},
};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub alert: AlertStatus,
    pub summary: Option<TrendSummary>,
}

/// Owns the session state and is its only mutator. Cloning shares the session.
#[derive(Clone)]
pub struct MonitorController {
    state: Arc<Mutex<SessionState>>,
    feeds: Arc<Mutex<SampleFeeds>>,
    events: broadcast::Sender<MonitorEvent>,
    ticker: Arc<Mutex<Option<PeriodicTask>>>,
    sync_task: Arc<Mutex<Option<PeriodicTask>>>,
    tick_interval: Duration,
    sync_step: Duration,
    sync_increment: f64,
}

impl MonitorController {
    pub fn new(settings: &MonitorSettings) -> Self {
        Self::with_feeds(settings, SampleFeeds::random(&settings.ranges))
    }

    pub fn with_feeds(settings: &MonitorSettings, feeds: SampleFeeds) -> Self {
        let session_id = Uuid::new_v4().to_string();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            state: Arc::new(Mutex::new(SessionState::new(
                session_id,
                settings,
                Utc::now(),
            ))),
            feeds: Arc::new(Mutex::new(feeds)),
            events,
            ticker: Arc::new(Mutex::new(None)),
            sync_task: Arc::new(Mutex::new(None)),
            tick_interval: settings.tick_interval(),
            sync_step: settings.sync_step(),
            sync_increment: settings.sync_increment(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    pub async fn get_state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn get_snapshot(&self) -> SessionSnapshot {
        let guard = self.state.lock().await;
        SessionSnapshot {
            alert: guard.alert_status(),
            summary: guard.trend.summary(),
            state: guard.clone(),
        }
    }

    pub async fn alert_status(&self) -> AlertStatus {
        self.state.lock().await.alert_status()
    }

    /// Starts the periodic feed, replacing any ticker already running.
    pub async fn start_monitoring(&self) {
        let generation = self.state.lock().await.begin_monitoring();

        let mut ticker_guard = self.ticker.lock().await;
        if let Some(previous) = ticker_guard.take() {
            previous.cancel();
        }

        let state = self.state.clone();
        let feeds = self.feeds.clone();
        let events = self.events.clone();

        let task = PeriodicTask::spawn("monitor", self.tick_interval, move || {
            let state = state.clone();
            let feeds = feeds.clone();
            let events = events.clone();
            async move {
                let mut guard = state.lock().await;
                if !guard.is_current_monitor(generation) {
                    return TickFlow::Stop;
                }
                let bpm = feeds.lock().await.produce(Acquisition::Periodic);
                record_sample(&mut guard, &events, bpm, Acquisition::Periodic);
                TickFlow::Continue
            }
        });
        *ticker_guard = Some(task);
        drop(ticker_guard);

        log_info!(
            "Monitoring started, sampling every {}ms",
            self.tick_interval.as_millis()
        );
        emit(&self.events, MonitorEvent::MonitoringChanged { active: true });
    }

    /// Stops the periodic feed. Stopping twice is a no-op.
    pub async fn stop_monitoring(&self) {
        let was_monitoring = {
            let mut guard = self.state.lock().await;
            let was = guard.monitoring;
            guard.end_monitoring();
            was
        };

        let previous = self.ticker.lock().await.take();
        if let Some(task) = previous {
            task.shutdown().await;
        }

        if was_monitoring {
            log_info!("Monitoring stopped");
            emit(&self.events, MonitorEvent::MonitoringChanged { active: false });
        }
    }

    /// Takes a reading immediately from the refresh source.
    pub async fn refresh_now(&self) -> Sample {
        let mut guard = self.state.lock().await;
        let bpm = self.feeds.lock().await.produce(Acquisition::Refresh);
        record_sample(&mut guard, &self.events, bpm, Acquisition::Refresh)
    }

    /// Begins the stepped sync simulation. Fails if one is already running.
    pub async fn start_sync(&self) -> Result<SyncState> {
        let (generation, sync) = {
            let mut guard = self.state.lock().await;
            if guard.sync.status == SyncStatus::Syncing {
                bail!("sync already in progress");
            }
            let generation = guard.begin_sync();
            (generation, guard.sync.clone())
        };

        let state = self.state.clone();
        let feeds = self.feeds.clone();
        let events = self.events.clone();
        let increment = self.sync_increment;

        let task = PeriodicTask::spawn("sync", self.sync_step, move || {
            let state = state.clone();
            let feeds = feeds.clone();
            let events = events.clone();
            async move {
                let mut guard = state.lock().await;
                match guard.advance_sync(generation, increment) {
                    SyncStep::Stale => TickFlow::Stop,
                    SyncStep::Advanced(progress) => {
                        emit(&events, MonitorEvent::SyncProgress { progress });
                        TickFlow::Continue
                    }
                    SyncStep::Finished => {
                        let bpm = feeds.lock().await.produce(Acquisition::Sync);
                        emit(&events, MonitorEvent::SyncProgress { progress: 1.0 });

                        let previous = guard.alert_status();
                        let sample = guard.complete_sync(bpm, Local::now());
                        publish_sample(&guard, &events, &previous, sample, Acquisition::Sync);

                        log_info!("Sync finished with {} bpm", bpm);
                        emit(&events, MonitorEvent::SyncFinished { bpm });
                        TickFlow::Stop
                    }
                }
            }
        });

        let mut slot = self.sync_task.lock().await;
        if let Some(previous) = slot.replace(task) {
            previous.cancel();
        }
        drop(slot);

        emit(&self.events, MonitorEvent::SyncProgress { progress: 0.0 });
        Ok(sync)
    }

    /// Cancels a running sync. Returns `false` when nothing was running.
    pub async fn cancel_sync(&self) -> bool {
        let cancelled = self.state.lock().await.cancel_sync();

        let previous = self.sync_task.lock().await.take();
        if let Some(task) = previous {
            task.shutdown().await;
        }

        if cancelled {
            log_info!("Sync cancelled");
            emit(&self.events, MonitorEvent::SyncCancelled);
        }
        cancelled
    }

    /// Sets the alert threshold, clamped into range. Returns the stored value.
    pub async fn set_threshold(&self, threshold: i32) -> i32 {
        let mut guard = self.state.lock().await;
        let previous = guard.alert_status();
        let stored = guard.alert_config.set_threshold(threshold);
        if stored != threshold {
            log_warn!("Threshold {} clamped to {}", threshold, stored);
        }
        publish_alert_change(&guard, &self.events, &previous);
        stored
    }

    pub async fn set_alerts_enabled(&self, enabled: bool) {
        let mut guard = self.state.lock().await;
        let previous = guard.alert_status();
        guard.alert_config.alerts_enabled = enabled;
        publish_alert_change(&guard, &self.events, &previous);
    }

    /// Stops every background task owned by the session.
    pub async fn shutdown(&self) {
        self.stop_monitoring().await;
        self.cancel_sync().await;
    }
}

fn record_sample(
    state: &mut SessionState,
    events: &broadcast::Sender<MonitorEvent>,
    bpm: i32,
    acquisition: Acquisition,
) -> Sample {
    let previous = state.alert_status();
    let sample = state.record_reading(bpm, Local::now());
    publish_sample(state, events, &previous, sample.clone(), acquisition);
    sample
}

fn publish_sample(
    state: &SessionState,
    events: &broadcast::Sender<MonitorEvent>,
    previous: &AlertStatus,
    sample: Sample,
    acquisition: Acquisition,
) {
    log_info!(
        "Recorded {} bpm ({:?}) at {}",
        sample.bpm,
        acquisition,
        sample.timestamp_label
    );
    emit(
        events,
        MonitorEvent::SampleRecorded {
            sample,
            acquisition,
            status: state.alert_status(),
        },
    );
    publish_alert_change(state, events, previous);
}

fn publish_alert_change(
    state: &SessionState,
    events: &broadcast::Sender<MonitorEvent>,
    previous: &AlertStatus,
) {
    let status = state.alert_status();
    if status.severity != previous.severity {
        log_info!("Alert status changed: {}", status.text);
        emit(events, MonitorEvent::AlertChanged { status });
    }
}

fn emit(events: &broadcast::Sender<MonitorEvent>, event: MonitorEvent) {
    // No subscribers is fine; nobody is watching the session yet.
    let _ = events.send(event);
}
