use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, warn};
use tokio::sync::{watch, Mutex};
use tokio::time::{interval, timeout, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::display::format_elapsed;
use crate::models::HeartRateSample;
use crate::sensor::HeartRateSensor;
use crate::store::HealthStore;

use super::controller::DisplaySnapshot;
use super::state::{SessionState, SessionStatus};

const SENSOR_TIMEOUT_SECS: u64 = 5;

/// Drives one running session: every tick it refreshes the elapsed-time
/// display, polls the sensor, records the reading, and periodically writes
/// progress back to the store. Exits when cancelled or when the session
/// stops running.
pub(super) async fn run_sampling_loop(
    state: Arc<Mutex<SessionState>>,
    store: Arc<dyn HealthStore>,
    sensor: Arc<dyn HeartRateSensor>,
    display: Arc<watch::Sender<DisplaySnapshot>>,
    cancel_token: CancellationToken,
    tick_interval: Duration,
    persist_every_ticks: u32,
) {
    let mut ticker = interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks: u32 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !tick_once(&state, &store, &sensor, &display).await {
                    break;
                }

                ticks = ticks.wrapping_add(1);
                if ticks % persist_every_ticks.max(1) == 0 {
                    persist_progress(&state, &store).await;
                }
            }
            _ = cancel_token.cancelled() => {
                debug!("sampling loop shutting down");
                break;
            }
        }
    }
}

/// One display refresh. Returns false once the session is no longer
/// running.
async fn tick_once(
    state: &Arc<Mutex<SessionState>>,
    store: &Arc<dyn HealthStore>,
    sensor: &Arc<dyn HeartRateSensor>,
    display: &Arc<watch::Sender<DisplaySnapshot>>,
) -> bool {
    let now = Utc::now();

    // Poll before taking the state lock; the sensor may be slow.
    let bpm = match timeout(
        Duration::from_secs(SENSOR_TIMEOUT_SECS),
        sensor.latest_bpm(),
    )
    .await
    {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            // No data, not an error the wearer sees.
            debug!("heart rate query failed: {err:?}");
            None
        }
        Err(_) => {
            warn!("heart rate query timed out (> {SENSOR_TIMEOUT_SECS}s)");
            None
        }
    };

    let (elapsed_secs, recorded) = {
        let mut guard = state.lock().await;
        if guard.status != SessionStatus::Running {
            return false;
        }

        let elapsed_secs = guard.elapsed_secs(now);
        let recorded = bpm.map(|value| {
            let sample = HeartRateSample::new(value.max(0.0).round() as u32, now);
            guard.record_sample(sample.clone());
            sample
        });

        (elapsed_secs, recorded)
    };

    let snapshot = DisplaySnapshot {
        elapsed: format_elapsed(elapsed_secs),
        heart_rate: recorded
            .as_ref()
            .map(|sample| sample.bpm.to_string())
            .unwrap_or_else(|| DisplaySnapshot::NO_READING.to_string()),
    };
    let _ = display.send(snapshot);

    if let Some(sample) = recorded {
        if let Err(err) = store.insert_sample(&sample).await {
            error!("failed to persist heart rate sample: {err:?}");
        }
    }

    true
}

async fn persist_progress(state: &Arc<Mutex<SessionState>>, store: &Arc<dyn HealthStore>) {
    let workout_id = {
        let guard = state.lock().await;
        match (&guard.status, &guard.workout_id) {
            (SessionStatus::Running, Some(id)) => id.clone(),
            _ => return,
        }
    };

    if let Err(err) = store.update_workout_progress(&workout_id, Utc::now()).await {
        error!("failed to persist session progress: {err:?}");
    }
}
