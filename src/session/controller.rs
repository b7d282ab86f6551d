use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::display::format_elapsed;
use crate::models::{Workout, WorkoutInfo, WorkoutStatus};
use crate::review::average_heart_rate;
use crate::sensor::HeartRateSensor;
use crate::settings::RecordingSettings;
use crate::store::HealthStore;

use super::sampler::run_sampling_loop;
use super::state::{SessionState, SessionStatus};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// What the wearable screen shows on each tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySnapshot {
    pub elapsed: String,
    pub heart_rate: String,
}

impl DisplaySnapshot {
    /// Placeholder shown while no reading is available.
    pub const NO_READING: &'static str = "--";

    pub fn idle() -> Self {
        Self {
            elapsed: format_elapsed(0),
            heart_rate: Self::NO_READING.to_string(),
        }
    }
}

struct Ticker {
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

/// The recording flow: owns the active session's state, the one-second
/// tick loop, and the display channel the host renders from.
#[derive(Clone)]
pub struct SessionController {
    state: Arc<Mutex<SessionState>>,
    store: Arc<dyn HealthStore>,
    sensor: Arc<dyn HeartRateSensor>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    display_tx: Arc<watch::Sender<DisplaySnapshot>>,
    tick_interval: Duration,
    settings: RecordingSettings,
}

impl SessionController {
    pub fn new(
        store: Arc<dyn HealthStore>,
        sensor: Arc<dyn HeartRateSensor>,
        settings: RecordingSettings,
    ) -> Self {
        let (display_tx, _) = watch::channel(DisplaySnapshot::idle());

        Self {
            state: Arc::new(Mutex::new(SessionState::new())),
            store,
            sensor,
            ticker: Arc::new(Mutex::new(None)),
            display_tx: Arc::new(display_tx),
            tick_interval: TICK_INTERVAL,
            settings,
        }
    }

    /// Shorten the tick interval. Only useful for driving the loop fast in
    /// tests; sessions display wall-clock elapsed time either way.
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Watch the values the active-session screen renders.
    pub fn subscribe(&self) -> watch::Receiver<DisplaySnapshot> {
        self.display_tx.subscribe()
    }

    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn locked(&self) -> bool {
        self.state.lock().await.locked
    }

    /// Lock or unlock the finish action.
    pub async fn set_locked(&self, locked: bool) {
        self.state.lock().await.locked = locked;
    }

    /// Start recording a new session. Fails when a session is already
    /// active or when the store rejects the new workout; the caller
    /// presents the failure and the wearer retries manually.
    pub async fn begin(&self) -> Result<String> {
        {
            let state = self.state.lock().await;
            if state.status != SessionStatus::Idle {
                bail!("a session is already active");
            }
        }

        let started_at = Utc::now();
        let workout = Workout::begin(started_at);

        self.store
            .insert_workout(&workout)
            .await
            .context("could not start workout")?;

        {
            let mut state = self.state.lock().await;
            state.begin(workout.id.clone(), started_at, self.settings.lock_on_start);
        }

        self.spawn_ticker().await;

        info!("session {} started", workout.id);
        Ok(workout.id)
    }

    /// Re-attach the timer and lock state to an in-progress workout after
    /// the process was interrupted. The workout comes from the platform's
    /// recovery signal, not from polling.
    pub async fn resume(&self, workout: Workout) -> Result<()> {
        if workout.status != WorkoutStatus::Running {
            bail!("workout {} is not in progress", workout.id);
        }

        {
            let mut state = self.state.lock().await;
            if state.status != SessionStatus::Idle {
                bail!("a session is already active");
            }
            state.resume(workout.id.clone(), workout.started_at);
        }

        self.spawn_ticker().await;

        info!("session {} resumed after interruption", workout.id);
        Ok(())
    }

    /// Stop the session, persist the finished workout, and return its
    /// summary. A no-op returning `None` when no session is running; an
    /// error while the lock flag is set. A store failure is returned for
    /// the caller to present; the session does not restart.
    pub async fn finish(&self) -> Result<Option<WorkoutInfo>> {
        let ended_at = Utc::now();

        let (workout_id, started_at, samples) = {
            let mut state = self.state.lock().await;
            match state.status {
                SessionStatus::Idle => return Ok(None),
                SessionStatus::Running if state.locked => {
                    bail!("session is locked; unlock before finishing")
                }
                _ => {}
            }

            let workout_id = state
                .workout_id
                .clone()
                .ok_or_else(|| anyhow!("running session has no workout id"))?;
            let started_at = state.started_at.unwrap_or(ended_at);
            let samples = state.finish();

            (workout_id, started_at, samples)
        };

        self.cancel_ticker().await;

        self.store
            .finish_workout(&workout_id, ended_at)
            .await
            .context("could not save workout")?;

        let elapsed_secs = (ended_at - started_at).num_seconds().max(0) as u64;
        let info = WorkoutInfo {
            id: workout_id.clone(),
            started_at,
            ended_at: Some(ended_at),
            duration_text: format_elapsed(elapsed_secs),
            average_bpm: average_heart_rate(&samples),
        };

        // The store owns the record from here; drop the in-memory session.
        self.state.lock().await.reset();
        let _ = self.display_tx.send(DisplaySnapshot::idle());

        info!("session {} saved ({})", info.id, info.duration_text);
        Ok(Some(info))
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(previous) = ticker_guard.take() {
            previous.cancel_token.cancel();
            previous.handle.abort();
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(run_sampling_loop(
            self.state.clone(),
            self.store.clone(),
            self.sensor.clone(),
            self.display_tx.clone(),
            cancel_token.clone(),
            self.tick_interval,
            self.settings.persist_every_ticks,
        ));

        *ticker_guard = Some(Ticker {
            cancel_token,
            handle,
        });
    }

    /// Cancel the tick loop and wait for it to wind down, so no tick can
    /// land after the session is finalized.
    async fn cancel_ticker(&self) {
        let ticker = self.ticker.lock().await.take();
        if let Some(ticker) = ticker {
            ticker.cancel_token.cancel();
            if let Err(err) = ticker.handle.await {
                warn!("sampling loop did not join cleanly: {err}");
            }
        }
    }
}
