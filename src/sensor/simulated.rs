use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;

use super::HeartRateSensor;

/// In-process heart-rate sensor producing readings around a base rate.
///
/// Optical sensors take a few seconds to acquire a signal after a session
/// starts; `with_warmup` models that by answering `None` for the first few
/// polls.
pub struct SimulatedSensor {
    base_bpm: f64,
    jitter: f64,
    warmup_polls: u64,
    polls: AtomicU64,
}

impl SimulatedSensor {
    pub fn new(base_bpm: f64) -> Self {
        Self {
            base_bpm,
            jitter: 4.0,
            warmup_polls: 0,
            polls: AtomicU64::new(0),
        }
    }

    /// A sensor that reads exactly `base_bpm` every poll.
    pub fn steady(base_bpm: f64) -> Self {
        Self {
            jitter: 0.0,
            ..Self::new(base_bpm)
        }
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_warmup(mut self, polls: u64) -> Self {
        self.warmup_polls = polls;
        self
    }
}

#[async_trait]
impl HeartRateSensor for SimulatedSensor {
    async fn latest_bpm(&self) -> Result<Option<f64>> {
        let poll = self.polls.fetch_add(1, Ordering::Relaxed);
        if poll < self.warmup_polls {
            return Ok(None);
        }

        let value = if self.jitter > 0.0 {
            self.base_bpm + rand::thread_rng().gen_range(-self.jitter..=self.jitter)
        } else {
            self.base_bpm
        };

        Ok(Some(value.max(0.0)))
    }
}
