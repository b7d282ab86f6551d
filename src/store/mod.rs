//! The health-data service seam.
//!
//! The recording and review flows never talk to a concrete storage engine;
//! they go through [`HealthStore`]. [`SqliteHealthStore`] is the bundled
//! implementation. A host embedding this crate on a platform with its own
//! health service provides an adapter over the same trait.

mod helpers;
mod migrations;
mod sqlite;

pub use sqlite::SqliteHealthStore;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{HeartRateSample, Workout};

/// Durable record keeper for workouts and heart-rate samples.
///
/// Save and delete are asynchronous and report success or failure exactly
/// once via the returned `Result`; nothing here retries on the caller's
/// behalf.
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Persist a freshly started workout.
    async fn insert_workout(&self, workout: &Workout) -> Result<()>;

    /// Record that a running workout was still alive at `seen_at`. Used by
    /// the tick loop so an interrupted session leaves a last-known time
    /// behind.
    async fn update_workout_progress(&self, id: &str, seen_at: DateTime<Utc>) -> Result<()>;

    /// Set the end time and mark the workout completed.
    async fn finish_workout(&self, id: &str, ended_at: DateTime<Utc>) -> Result<()>;

    /// Mark a workout that could not be resumed after an interruption.
    async fn mark_interrupted(&self, id: &str, stopped_at: DateTime<Utc>) -> Result<()>;

    async fn get_workout(&self, id: &str) -> Result<Option<Workout>>;

    /// The most recently started workout still in the running state, if
    /// any. Hosts call this when the platform signals a recoverable
    /// session.
    async fn find_running_workout(&self) -> Result<Option<Workout>>;

    /// Finished workouts (completed or interrupted), newest first.
    async fn list_workouts(&self) -> Result<Vec<Workout>>;

    async fn delete_workout(&self, id: &str) -> Result<()>;

    /// Atomically swap a stored workout for its edited replacement. A
    /// missing original is tolerated, so repeating the same replacement is
    /// harmless.
    async fn replace_workout(&self, original_id: &str, replacement: &Workout) -> Result<()>;

    async fn insert_sample(&self, sample: &HeartRateSample) -> Result<()>;

    /// Samples with `start <= sampled_at < end`, oldest first.
    async fn samples_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HeartRateSample>>;
}
