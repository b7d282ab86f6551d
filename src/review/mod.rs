//! The review flow: averaging a workout's heart-rate samples, assembling
//! the review list, and shortening a workout's end time.
//!
//! The store treats saved workouts as immutable, so an edit produces a
//! replacement record and swaps it in via
//! [`HealthStore::replace_workout`](crate::store::HealthStore::replace_workout).

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::display::{format_elapsed, month_day_time, time_only};
use crate::models::{HeartRateSample, Workout, WorkoutSummary};
use crate::store::HealthStore;

/// Arithmetic mean of the readings, rounded to the nearest whole bpm.
/// `None` when there are no readings.
pub fn average_heart_rate(samples: &[HeartRateSample]) -> Option<u32> {
    if samples.is_empty() {
        return None;
    }

    let sum: f64 = samples.iter().map(|sample| f64::from(sample.bpm)).sum();
    Some((sum / samples.len() as f64).round() as u32)
}

/// Average over the samples stored strictly within the workout's
/// `[start, end)` window. `None` while the workout is still running or
/// when the window holds no samples.
pub async fn average_for_workout(
    store: &dyn HealthStore,
    workout: &Workout,
) -> Result<Option<u32>> {
    let Some(ended_at) = workout.ended_at else {
        return Ok(None);
    };

    let samples = store.samples_between(workout.started_at, ended_at).await?;
    Ok(average_heart_rate(&samples))
}

/// Whether shortening the workout to `minutes` from its start is a valid
/// edit. Backs the save action's enabled state on the edit screen.
pub fn can_save(workout: &Workout, minutes: u32) -> bool {
    let Some(duration_secs) = workout.duration_secs() else {
        return false;
    };

    minutes > 0 && u64::from(minutes) * 60 <= duration_secs
}

/// Build the replacement record for a workout shortened to `new_end`.
/// Edits only shorten: the new end must stay within the original interval
/// and after the start.
pub fn truncate_workout(workout: &Workout, new_end: DateTime<Utc>) -> Result<Workout> {
    let Some(original_end) = workout.ended_at else {
        bail!("workout {} has not finished", workout.id);
    };

    if new_end > original_end {
        bail!("edited end time cannot extend the workout");
    }
    if new_end <= workout.started_at {
        bail!("edited end time must fall after the workout start");
    }

    let now = Utc::now();
    Ok(Workout {
        id: Uuid::new_v4().to_string(),
        started_at: workout.started_at,
        ended_at: Some(new_end),
        status: workout.status,
        created_at: now,
        updated_at: now,
    })
}

/// Shorten a stored workout to `minutes` from its start and swap the
/// record atomically. Returns the replacement.
pub async fn shorten_workout(
    store: &dyn HealthStore,
    workout: &Workout,
    minutes: u32,
) -> Result<Workout> {
    let new_end = workout.started_at + Duration::seconds(i64::from(minutes) * 60);
    let replacement = truncate_workout(workout, new_end)?;
    store.replace_workout(&workout.id, &replacement).await?;
    Ok(replacement)
}

/// The review list: finished workouts newest first, each with its display
/// fields and average heart rate filled in.
pub async fn workout_summaries(store: &dyn HealthStore) -> Result<Vec<WorkoutSummary>> {
    let workouts = store.list_workouts().await?;

    let mut summaries = Vec::with_capacity(workouts.len());
    for workout in workouts {
        let average_bpm = average_for_workout(store, &workout).await?;
        summaries.push(summarize(&workout, average_bpm));
    }

    Ok(summaries)
}

fn summarize(workout: &Workout, average_bpm: Option<u32>) -> WorkoutSummary {
    let duration_text = format_elapsed(workout.duration_secs().unwrap_or(0));
    let caption = match workout.ended_at {
        Some(ended_at) => format!(
            "{} - {}",
            month_day_time(workout.started_at),
            time_only(ended_at)
        ),
        None => month_day_time(workout.started_at),
    };

    WorkoutSummary {
        id: workout.id.clone(),
        started_at: workout.started_at,
        ended_at: workout.ended_at,
        status: workout.status,
        duration_text,
        caption,
        average_bpm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkoutStatus;
    use chrono::TimeZone;

    fn finished_workout(duration_secs: i64) -> Workout {
        let start = Utc.with_ymd_and_hms(2020, 3, 25, 16, 0, 0).unwrap();
        let mut workout = Workout::begin(start);
        workout.ended_at = Some(start + Duration::seconds(duration_secs));
        workout.status = WorkoutStatus::Completed;
        workout
    }

    fn samples(values: &[u32]) -> Vec<HeartRateSample> {
        values
            .iter()
            .map(|&bpm| HeartRateSample::new(bpm, Utc::now()))
            .collect()
    }

    #[test]
    fn average_of_empty_set_is_none() {
        assert_eq!(average_heart_rate(&[]), None);
    }

    #[test]
    fn average_rounds_to_nearest_bpm() {
        assert_eq!(average_heart_rate(&samples(&[60, 70, 80])), Some(70));
        assert_eq!(average_heart_rate(&samples(&[60, 61])), Some(61));
        assert_eq!(average_heart_rate(&samples(&[104])), Some(104));
    }

    #[test]
    fn can_save_respects_the_original_duration() {
        let workout = finished_workout(30 * 60);
        assert!(can_save(&workout, 30));
        assert!(can_save(&workout, 5));
        assert!(!can_save(&workout, 31));
        assert!(!can_save(&workout, 0));
    }

    #[test]
    fn can_save_rejects_running_workouts() {
        let workout = Workout::begin(Utc::now());
        assert!(!can_save(&workout, 5));
    }

    #[test]
    fn truncate_only_shortens() {
        let workout = finished_workout(30 * 60);
        let original_end = workout.ended_at.unwrap();

        assert!(truncate_workout(&workout, original_end + Duration::seconds(1)).is_err());
        assert!(truncate_workout(&workout, workout.started_at).is_err());
        assert!(truncate_workout(&workout, workout.started_at - Duration::seconds(1)).is_err());

        let replacement = truncate_workout(&workout, original_end - Duration::minutes(10)).unwrap();
        assert_eq!(replacement.started_at, workout.started_at);
        assert_eq!(
            replacement.ended_at,
            Some(original_end - Duration::minutes(10))
        );
        assert_ne!(replacement.id, workout.id);
    }

    #[test]
    fn truncate_to_original_end_is_allowed() {
        let workout = finished_workout(30 * 60);
        let replacement = truncate_workout(&workout, workout.ended_at.unwrap()).unwrap();
        assert_eq!(replacement.ended_at, workout.ended_at);
    }

    #[test]
    fn summary_formats_duration_and_caption() {
        let workout = finished_workout(32 * 60 + 15);
        let summary = summarize(&workout, Some(104));
        assert_eq!(summary.duration_text, "32:15");
        assert_eq!(summary.caption, "3.25, 4:00pm - 4:32pm");
        assert_eq!(summary.average_bpm, Some(104));
    }

    #[test]
    fn zero_length_workout_summarizes_without_panicking() {
        let workout = finished_workout(0);
        let summary = summarize(&workout, None);
        assert_eq!(summary.duration_text, "0:00");
        assert_eq!(summary.average_bpm, None);
    }
}
