//! Plot geometry for the edit screen's heart-rate graph. Produces unit
//! coordinates and axis labels; drawing is the host's job.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{HeartRateSample, Workout};

/// The graph covers at most the first hour of a workout.
const WINDOW_SECS: i64 = 3600;
const MINUTES_PER_MARK: u32 = 5;

/// One plotted sample. Both coordinates are fractions in `[0, 1]`: `x` is
/// position within the time window, `y` grows with the rate (0 at the
/// window's minimum, 1 at its maximum).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateChart {
    pub points: Vec<ChartPoint>,
    pub min_bpm: u32,
    pub max_bpm: u32,
    /// Minute labels along the time axis: 0, 5, 10, ...
    pub minute_marks: Vec<u32>,
}

/// Lay out the graph for a finished workout from the samples inside its
/// charted window. `None` when the workout is unfinished, zero-length, or
/// the window holds no samples.
pub fn chart_workout(workout: &Workout, samples: &[HeartRateSample]) -> Option<HeartRateChart> {
    let ended_at = workout.ended_at?;
    let window_end = ended_at.min(workout.started_at + Duration::seconds(WINDOW_SECS));
    chart_window(samples, workout.started_at, window_end)
}

fn chart_window(
    samples: &[HeartRateSample],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<HeartRateChart> {
    let window_secs = (end - start).num_seconds();
    if window_secs <= 0 {
        return None;
    }

    let in_window: Vec<&HeartRateSample> = samples
        .iter()
        .filter(|sample| sample.sampled_at >= start && sample.sampled_at < end)
        .collect();

    let min_bpm = in_window.iter().map(|sample| sample.bpm).min()?;
    let max_bpm = in_window.iter().map(|sample| sample.bpm).max()?;
    let range = f64::from(max_bpm - min_bpm);

    let points = in_window
        .iter()
        .map(|sample| {
            let offset_secs = (sample.sampled_at - start).num_seconds();
            let x = offset_secs as f64 / window_secs as f64;
            // A flat trace sits mid-chart rather than dividing by zero.
            let y = if range > 0.0 {
                f64::from(sample.bpm - min_bpm) / range
            } else {
                0.5
            };
            ChartPoint { x, y }
        })
        .collect();

    Some(HeartRateChart {
        points,
        min_bpm,
        max_bpm,
        minute_marks: minute_marks(window_secs),
    })
}

/// Five-minute labels covering the window; always at least the zero mark.
fn minute_marks(window_secs: i64) -> Vec<u32> {
    let minutes = (window_secs / 60) as u32;
    let increments = (minutes / MINUTES_PER_MARK).max(1);
    (0..increments).map(|i| i * MINUTES_PER_MARK).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkoutStatus;
    use chrono::TimeZone;

    fn workout(duration_secs: i64) -> Workout {
        let start = Utc.with_ymd_and_hms(2020, 3, 25, 16, 0, 0).unwrap();
        let mut workout = Workout::begin(start);
        workout.ended_at = Some(start + Duration::seconds(duration_secs));
        workout.status = WorkoutStatus::Completed;
        workout
    }

    fn sample_at(workout: &Workout, offset_secs: i64, bpm: u32) -> HeartRateSample {
        HeartRateSample::new(bpm, workout.started_at + Duration::seconds(offset_secs))
    }

    #[test]
    fn no_samples_means_no_chart() {
        let workout = workout(20 * 60);
        assert!(chart_workout(&workout, &[]).is_none());
    }

    #[test]
    fn zero_length_workout_means_no_chart() {
        let workout = workout(0);
        let samples = [sample_at(&workout, 0, 100)];
        assert!(chart_workout(&workout, &samples).is_none());
    }

    #[test]
    fn points_scale_between_min_and_max() {
        let workout = workout(20 * 60);
        let samples = [
            sample_at(&workout, 0, 80),
            sample_at(&workout, 10 * 60, 100),
            sample_at(&workout, 15 * 60, 120),
        ];

        let chart = chart_workout(&workout, &samples).unwrap();
        assert_eq!(chart.min_bpm, 80);
        assert_eq!(chart.max_bpm, 120);
        assert_eq!(chart.points[0], ChartPoint { x: 0.0, y: 0.0 });
        assert_eq!(chart.points[1], ChartPoint { x: 0.5, y: 0.5 });
        assert_eq!(chart.points[2], ChartPoint { x: 0.75, y: 1.0 });
    }

    #[test]
    fn flat_trace_sits_mid_chart() {
        let workout = workout(10 * 60);
        let samples = [
            sample_at(&workout, 60, 95),
            sample_at(&workout, 120, 95),
        ];

        let chart = chart_workout(&workout, &samples).unwrap();
        assert!(chart.points.iter().all(|point| point.y == 0.5));
    }

    #[test]
    fn window_caps_at_one_hour() {
        let workout = workout(2 * 3600);
        let samples = [
            sample_at(&workout, 60, 90),
            sample_at(&workout, 90 * 60, 130),
        ];

        let chart = chart_workout(&workout, &samples).unwrap();
        // Only the first-hour sample is plotted.
        assert_eq!(chart.points.len(), 1);
        assert_eq!(chart.max_bpm, 90);
        assert_eq!(chart.minute_marks.len(), 12);
    }

    #[test]
    fn short_workouts_keep_at_least_one_mark() {
        let workout = workout(3 * 60);
        let samples = [sample_at(&workout, 30, 100)];

        let chart = chart_workout(&workout, &samples).unwrap();
        assert_eq!(chart.minute_marks, vec![0]);
    }
}
