use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A timestamped beats-per-minute reading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateSample {
    pub bpm: u32,
    pub sampled_at: DateTime<Utc>,
}

impl HeartRateSample {
    pub fn new(bpm: u32, sampled_at: DateTime<Utc>) -> Self {
        Self { bpm, sampled_at }
    }
}
