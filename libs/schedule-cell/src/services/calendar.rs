// libs/schedule-cell/src/services/calendar.rs
//
// Pure slot-grid computation. No storage access here: callers fetch the
// configuration snapshot and pass it in, which keeps every function
// directly testable.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

use crate::models::{ClinicConfig, ScheduleError, WeekDay};

/// Whether the clinic takes appointments on `date`.
///
/// A clinic with no configuration (or an empty `working_days` list) never
/// advertises working days.
pub fn is_working_day(config: Option<&ClinicConfig>, date: NaiveDate) -> bool {
    let Some(config) = config else {
        return false;
    };

    let weekday = WeekDay::from(date.weekday());
    config
        .working_days
        .as_ref()
        .is_some_and(|days| days.contains(&weekday))
}

/// The theoretical slot grid for a day: ascending start times, one every
/// `appointment_duration` minutes from `working_hours_start`, keeping only
/// slots that finish by `working_hours_end` and do not touch the break
/// window. Existing bookings are not consulted here.
///
/// Returns an empty grid when the configuration (or any required field) is
/// absent, and an error when the configuration is present but nonsensical.
///
/// The grid is currently identical for every working day; `date` is part
/// of the signature so per-day hours could be introduced without changing
/// callers.
pub fn available_time_slots(
    config: Option<&ClinicConfig>,
    _date: NaiveDate,
) -> Result<Vec<NaiveTime>, ScheduleError> {
    let Some(config) = config else {
        return Ok(Vec::new());
    };

    let (Some(start), Some(end), Some(duration)) = (
        config.working_hours_start,
        config.working_hours_end,
        config.appointment_duration,
    ) else {
        return Ok(Vec::new());
    };

    if duration <= 0 {
        return Err(ScheduleError::InvalidConfiguration(
            "appointment duration must be a positive number of minutes".to_string(),
        ));
    }

    let start_min = minutes_since_midnight(start);
    let end_min = minutes_since_midnight(end);
    if end_min <= start_min {
        return Err(ScheduleError::InvalidConfiguration(format!(
            "working hours end ({}) must be after working hours start ({})",
            end.format("%H:%M"),
            start.format("%H:%M"),
        )));
    }

    let break_window = match (config.break_time_start, config.break_time_end) {
        (Some(break_start), Some(break_end)) => {
            let break_start_min = minutes_since_midnight(break_start);
            let break_end_min = minutes_since_midnight(break_end);
            if break_end_min <= break_start_min {
                return Err(ScheduleError::InvalidConfiguration(format!(
                    "break end ({}) must be after break start ({})",
                    break_end.format("%H:%M"),
                    break_start.format("%H:%M"),
                )));
            }
            Some((break_start_min, break_end_min))
        }
        // A half-configured break is treated as no break at all.
        _ => None,
    };

    let mut slots = Vec::new();
    let mut t = start_min;
    while t + duration <= end_min {
        // Half-open intervals: a slot ending exactly at break start, or
        // starting exactly at break end, does not overlap the break.
        let overlaps_break =
            break_window.is_some_and(|(break_start, break_end)| {
                t < break_end && t + duration > break_start
            });

        if !overlaps_break {
            if let Some(time) = time_from_minutes(t) {
                slots.push(time);
            }
        }

        t += duration;
    }

    Ok(slots)
}

// ==============================================================================
// PRIVATE HELPER METHODS
// ==============================================================================

fn minutes_since_midnight(time: NaiveTime) -> i32 {
    time.hour() as i32 * 60 + time.minute() as i32
}

fn time_from_minutes(minutes: i32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt((minutes / 60) as u32, (minutes % 60) as u32, 0)
}
