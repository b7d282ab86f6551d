//! The live heart-rate seam.
//!
//! On a real wearable the host adapts its optical sensor to
//! [`HeartRateSensor`]; [`SimulatedSensor`] stands in everywhere else.

mod simulated;

pub use simulated::SimulatedSensor;

use anyhow::Result;
use async_trait::async_trait;

/// Source of the most recent beats-per-minute reading.
#[async_trait]
pub trait HeartRateSensor: Send + Sync {
    /// The latest reading, or `None` if the sensor has nothing yet. Errors
    /// are treated by callers as "no data", never surfaced to the wearer.
    async fn latest_bpm(&self) -> Result<Option<f64>>;
}
