pub mod sample;
pub mod workout;

pub use sample::HeartRateSample;
pub use workout::{Workout, WorkoutInfo, WorkoutStatus, WorkoutSummary};
