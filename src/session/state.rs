use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::HeartRateSample;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Idle,
    Running,
    Stopped,
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Idle
    }
}

/// The single owned state of the active session: what the timer loop reads
/// and mutates, and what the host renders from. The lock flag guards the
/// finish action against accidental taps on the wearable.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub status: SessionStatus,
    pub workout_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub locked: bool,
    pub samples: Vec<HeartRateSample>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole seconds since the session started, never negative.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        match self.started_at {
            Some(started_at) => (now - started_at).num_seconds().max(0) as u64,
            None => 0,
        }
    }

    pub fn begin(&mut self, workout_id: String, started_at: DateTime<Utc>, locked: bool) {
        *self = Self {
            status: SessionStatus::Running,
            workout_id: Some(workout_id),
            started_at: Some(started_at),
            locked,
            samples: Vec::new(),
        };
    }

    /// Re-attach to an externally tracked in-progress workout. Comes back
    /// locked; samples recorded before the interruption live in the store,
    /// not here.
    pub fn resume(&mut self, workout_id: String, started_at: DateTime<Utc>) {
        self.begin(workout_id, started_at, true);
    }

    /// Append a reading to the in-session list. Readings that arrive once
    /// the session is no longer running are dropped.
    pub fn record_sample(&mut self, sample: HeartRateSample) -> bool {
        if self.status != SessionStatus::Running {
            return false;
        }
        self.samples.push(sample);
        true
    }

    /// Stop the session and hand back the accumulated sample list.
    pub fn finish(&mut self) -> Vec<HeartRateSample> {
        self.status = SessionStatus::Stopped;
        std::mem::take(&mut self.samples)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
