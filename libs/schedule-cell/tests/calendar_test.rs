use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};

use schedule_cell::models::{ClinicConfig, ScheduleError, WeekDay};
use schedule_cell::services::calendar::{available_time_slots, is_working_day};

fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

fn weekday_config(
    start: &str,
    end: &str,
    duration: i32,
    break_window: Option<(&str, &str)>,
) -> ClinicConfig {
    let mut config = ClinicConfig::defaults();
    config.working_hours_start = Some(time(start));
    config.working_hours_end = Some(time(end));
    config.appointment_duration = Some(duration);
    match break_window {
        Some((break_start, break_end)) => {
            config.break_time_start = Some(time(break_start));
            config.break_time_end = Some(time(break_end));
        }
        None => {
            config.break_time_start = None;
            config.break_time_end = None;
        }
    }
    config
}

fn slot_strings(config: &ClinicConfig) -> Vec<String> {
    available_time_slots(Some(config), monday())
        .unwrap()
        .iter()
        .map(|t| t.format("%H:%M").to_string())
        .collect()
}

// ==============================================================================
// SLOT GRID
// ==============================================================================

#[test]
fn test_morning_grid_without_break() {
    let config = weekday_config("08:00", "12:00", 30, None);

    assert_eq!(
        slot_strings(&config),
        vec!["08:00", "08:30", "09:00", "09:30", "10:00", "10:30", "11:00", "11:30"]
    );
}

#[test]
fn test_break_excludes_whole_slots_and_keeps_boundaries() {
    let config = weekday_config("08:00", "12:00", 30, Some(("09:00", "10:00")));

    let slots = slot_strings(&config);
    assert_eq!(slots, vec!["08:00", "08:30", "10:00", "10:30", "11:00", "11:30"]);

    // The slot ending exactly at break start stays, as does the slot
    // starting exactly at break end.
    assert!(slots.contains(&"08:30".to_string()));
    assert!(slots.contains(&"10:00".to_string()));
    assert!(!slots.contains(&"09:00".to_string()));
    assert!(!slots.contains(&"09:30".to_string()));
}

#[test]
fn test_slot_count_is_floor_of_window_over_duration() {
    // 10:10 end leaves a 10-minute tail no slot can fill.
    let config = weekday_config("08:00", "10:10", 30, None);
    let slots = available_time_slots(Some(&config), monday()).unwrap();
    assert_eq!(slots.len(), 4);

    let config = weekday_config("09:00", "10:00", 45, None);
    let slots = available_time_slots(Some(&config), monday()).unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0], time("09:00"));
}

#[test]
fn test_slots_are_ascending_and_evenly_spaced() {
    let config = weekday_config("08:00", "18:00", 45, None);
    let slots = available_time_slots(Some(&config), monday()).unwrap();

    for pair in slots.windows(2) {
        let gap = pair[1].signed_duration_since(pair[0]);
        assert_eq!(gap.num_minutes(), 45);
    }
}

#[test]
fn test_default_configuration_grid() {
    let config = ClinicConfig::defaults();
    let slots = slot_strings(&config);

    // 08:00-18:00 every 30 minutes is 20 starts; the 12:00-14:00 break
    // swallows four of them.
    assert_eq!(slots.len(), 16);
    assert_eq!(slots.first().map(String::as_str), Some("08:00"));
    assert_eq!(slots.last().map(String::as_str), Some("17:30"));
    assert!(slots.contains(&"11:30".to_string()));
    assert!(slots.contains(&"14:00".to_string()));
    assert!(!slots.contains(&"12:00".to_string()));
    assert!(!slots.contains(&"13:30".to_string()));
}

#[test]
fn test_slot_spanning_break_is_dropped_not_truncated() {
    // With 90-minute slots the 11:00 candidate runs into the 12:00 break.
    // Its first hour is free, but the slot must disappear entirely rather
    // than shrink.
    let config = weekday_config("08:00", "18:00", 90, Some(("12:00", "14:00")));

    assert_eq!(slot_strings(&config), vec!["08:00", "09:30", "14:00", "15:30"]);
}

#[test]
fn test_absent_config_yields_empty_grid() {
    let slots = available_time_slots(None, monday()).unwrap();
    assert!(slots.is_empty());
}

#[test]
fn test_missing_required_field_yields_empty_grid() {
    let mut config = weekday_config("08:00", "12:00", 30, None);
    config.working_hours_start = None;

    let slots = available_time_slots(Some(&config), monday()).unwrap();
    assert!(slots.is_empty());
}

// ==============================================================================
// INVALID CONFIGURATIONS
// ==============================================================================

#[test]
fn test_inverted_working_hours_are_rejected() {
    let config = weekday_config("18:00", "08:00", 30, None);

    let result = available_time_slots(Some(&config), monday());
    assert_matches!(result, Err(ScheduleError::InvalidConfiguration(_)));
}

#[test]
fn test_zero_duration_is_rejected() {
    let config = weekday_config("08:00", "12:00", 0, None);

    let result = available_time_slots(Some(&config), monday());
    assert_matches!(result, Err(ScheduleError::InvalidConfiguration(_)));
}

#[test]
fn test_inverted_break_window_is_rejected() {
    let config = weekday_config("08:00", "18:00", 30, Some(("14:00", "12:00")));

    let result = available_time_slots(Some(&config), monday());
    assert_matches!(result, Err(ScheduleError::InvalidConfiguration(_)));
}

#[test]
fn test_validate_catches_break_outside_working_hours() {
    let config = weekday_config("08:00", "12:00", 30, Some(("11:00", "13:00")));

    assert_matches!(config.validate(), Err(ScheduleError::InvalidConfiguration(_)));
}

#[test]
fn test_validate_accepts_default_configuration() {
    assert!(ClinicConfig::defaults().validate().is_ok());
}

// ==============================================================================
// WORKING DAYS
// ==============================================================================

#[test]
fn test_weekday_membership() {
    let config = ClinicConfig::defaults();

    // 2024-01-15 is a Monday, 2024-01-20 a Saturday.
    assert!(is_working_day(Some(&config), monday()));
    assert!(!is_working_day(
        Some(&config),
        NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
    ));
}

#[test]
fn test_empty_working_days_never_match() {
    let mut config = ClinicConfig::defaults();
    config.working_days = Some(Vec::new());

    let mut date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    for _ in 0..7 {
        assert!(!is_working_day(Some(&config), date));
        date = date.succ_opt().unwrap();
    }
}

#[test]
fn test_absent_config_is_never_a_working_day() {
    assert!(!is_working_day(None, monday()));
    assert!(!is_working_day(
        None,
        NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
    ));
}

#[test]
fn test_saturday_clinic() {
    let mut config = ClinicConfig::defaults();
    config.working_days = Some(vec![WeekDay::Saturday]);

    assert!(is_working_day(
        Some(&config),
        NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
    ));
    assert!(!is_working_day(Some(&config), monday()));
}

#[test]
fn test_dates_built_from_components_are_stable() {
    // The same calendar day must classify identically however often it is
    // rebuilt; no clock or timezone is consulted.
    let config = ClinicConfig::defaults();
    for _ in 0..3 {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert!(is_working_day(Some(&config), date));
    }
}
