use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum WorkoutStatus {
    Running,
    Completed,
    Interrupted,
}

impl WorkoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutStatus::Running => "Running",
            WorkoutStatus::Completed => "Completed",
            WorkoutStatus::Interrupted => "Interrupted",
        }
    }
}

/// One recorded sauna sitting. `ended_at` stays empty until the wearer
/// finishes; after that it is never earlier than `started_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: WorkoutStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workout {
    /// A fresh running workout beginning at `started_at`.
    pub fn begin(started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            started_at,
            ended_at: None,
            status: WorkoutStatus::Running,
            created_at: started_at,
            updated_at: started_at,
        }
    }

    /// Whole seconds between start and end; `None` while still running.
    pub fn duration_secs(&self) -> Option<u64> {
        self.ended_at
            .map(|end| (end - self.started_at).num_seconds().max(0) as u64)
    }
}

/// Payload for the "Workout saved" confirmation after finishing a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutInfo {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_text: String,
    pub average_bpm: Option<u32>,
}

/// One row of the review list: the workout plus the derived display fields
/// the list renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSummary {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: WorkoutStatus,
    pub duration_text: String,
    pub caption: String,
    pub average_bpm: Option<u32>,
}
