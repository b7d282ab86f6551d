//! Core of a sauna-session companion app: record a sitting as a workout
//! on the wrist, sample heart rate while it runs, and review or shorten
//! saved workouts from the phone.
//!
//! The crate is UI-free. A host wires a [`store::HealthStore`] and a
//! [`sensor::HeartRateSensor`] into a [`session::SessionController`],
//! renders the controller's display channel, and drives the review flow
//! through [`review`].

pub mod chart;
pub mod display;
pub mod models;
pub mod review;
pub mod sensor;
pub mod session;
pub mod settings;
pub mod store;

pub use chart::{chart_workout, ChartPoint, HeartRateChart};
pub use models::{HeartRateSample, Workout, WorkoutInfo, WorkoutStatus, WorkoutSummary};
pub use sensor::{HeartRateSensor, SimulatedSensor};
pub use session::{DisplaySnapshot, SessionController, SessionState, SessionStatus};
pub use settings::{RecordingSettings, SettingsStore};
pub use store::{HealthStore, SqliteHealthStore};
