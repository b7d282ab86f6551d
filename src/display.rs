//! Text the screens show: stopwatch-style elapsed time and the review
//! list's date captions. Pure functions, no state.

use chrono::{DateTime, Utc};

/// Elapsed seconds as a stopwatch reading: `M:SS` under an hour,
/// `H:MM:SS` at or above. Seconds are always two digits; minutes are two
/// digits whenever the hour field is shown. With hours on screen and
/// minutes at ten or more, hours pick up a leading zero as well.
pub fn format_elapsed(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = total_secs / 60 % 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        if minutes > 9 {
            format!("{hours:02}:{minutes:02}:{seconds:02}")
        } else {
            format!("{hours}:{minutes:02}:{seconds:02}")
        }
    } else if minutes > 9 {
        format!("{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Month, day and clock time for a review row's start, e.g. `3.25, 4:05pm`.
pub fn month_day_time(value: DateTime<Utc>) -> String {
    value.format("%-m.%d, %-I:%M%P").to_string()
}

/// Clock time only, e.g. `4:32pm`.
pub fn time_only(value: DateTime<Utc>) -> String {
    value.format("%-I:%M%P").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn zero_seconds_formats_without_hours() {
        assert_eq!(format_elapsed(0), "0:00");
    }

    #[test]
    fn under_ten_minutes_uses_single_digit_minutes() {
        assert_eq!(format_elapsed(59), "0:59");
        assert_eq!(format_elapsed(69), "1:09");
        assert_eq!(format_elapsed(754), "12:34");
    }

    #[test]
    fn minutes_gain_a_digit_at_ten() {
        assert_eq!(format_elapsed(600), "10:00");
        assert_eq!(format_elapsed(3599), "59:59");
    }

    #[test]
    fn hour_boundary_switches_to_three_fields() {
        assert_eq!(format_elapsed(3600), "1:00:00");
        assert_eq!(format_elapsed(3661), "1:01:01");
        assert_eq!(format_elapsed(3900), "1:05:00");
    }

    #[test]
    fn hours_pad_when_minutes_reach_ten() {
        assert_eq!(format_elapsed(4500), "01:15:00");
        assert_eq!(format_elapsed(7 * 3600 + 59 * 60 + 59), "07:59:59");
        assert_eq!(format_elapsed(10 * 3600 + 10 * 60), "10:10:00");
    }

    #[test]
    fn captions_use_lowercase_meridiem() {
        let afternoon = Utc.with_ymd_and_hms(2020, 3, 25, 16, 5, 0).unwrap();
        assert_eq!(month_day_time(afternoon), "3.25, 4:05pm");
        assert_eq!(time_only(afternoon), "4:05pm");

        let morning = Utc.with_ymd_and_hms(2020, 11, 2, 9, 30, 0).unwrap();
        assert_eq!(month_day_time(morning), "11.02, 9:30am");
    }
}
