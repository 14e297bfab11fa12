// libs/schedule-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_utils::time_format::{hhmm, hhmm_option};

// ==============================================================================
// CLINIC CONFIGURATION MODELS
// ==============================================================================

/// Weekday identifiers as stored in the `working_days` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for WeekDay {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => WeekDay::Monday,
            Weekday::Tue => WeekDay::Tuesday,
            Weekday::Wed => WeekDay::Wednesday,
            Weekday::Thu => WeekDay::Thursday,
            Weekday::Fri => WeekDay::Friday,
            Weekday::Sat => WeekDay::Saturday,
            Weekday::Sun => WeekDay::Sunday,
        }
    }
}

/// One row of the `configurations` table. Every column is nullable in the
/// database, so schedule fields are optional here; slot computation treats
/// a missing required field the same as a missing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicConfig {
    pub id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub working_days: Option<Vec<WeekDay>>,
    #[serde(default, with = "hhmm_option")]
    pub working_hours_start: Option<NaiveTime>,
    #[serde(default, with = "hhmm_option")]
    pub working_hours_end: Option<NaiveTime>,
    #[serde(default, with = "hhmm_option")]
    pub break_time_start: Option<NaiveTime>,
    #[serde(default, with = "hhmm_option")]
    pub break_time_end: Option<NaiveTime>,
    pub appointment_duration: Option<i32>,
    pub clinic_name: Option<String>,
    pub clinic_address: Option<String>,
    pub clinic_phone: Option<String>,
    pub clinic_email: Option<String>,
    pub clinic_description: Option<String>,
    pub doctor_name: Option<String>,
    pub doctor_license: Option<String>,
    pub doctor_specialty: Option<String>,
    pub notifications_enabled: Option<bool>,
    pub email_reminders_enabled: Option<bool>,
    pub sms_reminders_enabled: Option<bool>,
    pub is_active: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ClinicConfig {
    /// Baseline schedule for a clinic that has never saved a configuration:
    /// Monday through Friday, 08:00-18:00, 30 minute appointments, lunch
    /// break from 12:00 to 14:00.
    pub fn defaults() -> Self {
        Self {
            id: None,
            user_id: None,
            working_days: Some(vec![
                WeekDay::Monday,
                WeekDay::Tuesday,
                WeekDay::Wednesday,
                WeekDay::Thursday,
                WeekDay::Friday,
            ]),
            working_hours_start: NaiveTime::from_hms_opt(8, 0, 0),
            working_hours_end: NaiveTime::from_hms_opt(18, 0, 0),
            break_time_start: NaiveTime::from_hms_opt(12, 0, 0),
            break_time_end: NaiveTime::from_hms_opt(14, 0, 0),
            appointment_duration: Some(30),
            clinic_name: None,
            clinic_address: None,
            clinic_phone: None,
            clinic_email: None,
            clinic_description: None,
            doctor_name: None,
            doctor_license: None,
            doctor_specialty: None,
            notifications_enabled: Some(true),
            email_reminders_enabled: Some(true),
            sms_reminders_enabled: Some(false),
            is_active: Some(true),
            created_at: None,
            updated_at: None,
        }
    }

    /// Checks the invariants a configuration must satisfy before it may be
    /// saved. Slot computation re-checks the subset it depends on.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        let start = self.working_hours_start.ok_or_else(|| {
            ScheduleError::InvalidConfiguration("working hours start is required".to_string())
        })?;
        let end = self.working_hours_end.ok_or_else(|| {
            ScheduleError::InvalidConfiguration("working hours end is required".to_string())
        })?;
        let duration = self.appointment_duration.ok_or_else(|| {
            ScheduleError::InvalidConfiguration("appointment duration is required".to_string())
        })?;

        if duration <= 0 {
            return Err(ScheduleError::InvalidConfiguration(
                "appointment duration must be a positive number of minutes".to_string(),
            ));
        }
        if end <= start {
            return Err(ScheduleError::InvalidConfiguration(
                "working hours end must be after working hours start".to_string(),
            ));
        }

        match (self.break_time_start, self.break_time_end) {
            (Some(break_start), Some(break_end)) => {
                if break_end <= break_start {
                    return Err(ScheduleError::InvalidConfiguration(
                        "break end must be after break start".to_string(),
                    ));
                }
                if break_start < start || break_end > end {
                    return Err(ScheduleError::InvalidConfiguration(
                        "break window must lie within working hours".to_string(),
                    ));
                }
            }
            (None, None) => {}
            _ => {
                return Err(ScheduleError::InvalidConfiguration(
                    "break window requires both a start and an end time".to_string(),
                ));
            }
        }

        Ok(())
    }
}

// ==============================================================================
// API REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveConfigRequest {
    pub working_days: Vec<WeekDay>,
    #[serde(with = "hhmm")]
    pub working_hours_start: NaiveTime,
    #[serde(with = "hhmm")]
    pub working_hours_end: NaiveTime,
    #[serde(default, with = "hhmm_option")]
    pub break_time_start: Option<NaiveTime>,
    #[serde(default, with = "hhmm_option")]
    pub break_time_end: Option<NaiveTime>,
    pub appointment_duration: i32,
    pub clinic_name: Option<String>,
    pub clinic_address: Option<String>,
    pub clinic_phone: Option<String>,
    pub clinic_email: Option<String>,
    pub clinic_description: Option<String>,
    pub doctor_name: Option<String>,
    pub doctor_license: Option<String>,
    pub doctor_specialty: Option<String>,
    pub notifications_enabled: Option<bool>,
    pub email_reminders_enabled: Option<bool>,
    pub sms_reminders_enabled: Option<bool>,
}

impl SaveConfigRequest {
    /// Assemble the configuration this request describes so it can be
    /// validated with the same rules as stored rows.
    pub fn to_config(&self, user_id: Option<Uuid>) -> ClinicConfig {
        ClinicConfig {
            id: None,
            user_id,
            working_days: Some(self.working_days.clone()),
            working_hours_start: Some(self.working_hours_start),
            working_hours_end: Some(self.working_hours_end),
            break_time_start: self.break_time_start,
            break_time_end: self.break_time_end,
            appointment_duration: Some(self.appointment_duration),
            clinic_name: self.clinic_name.clone(),
            clinic_address: self.clinic_address.clone(),
            clinic_phone: self.clinic_phone.clone(),
            clinic_email: self.clinic_email.clone(),
            clinic_description: self.clinic_description.clone(),
            doctor_name: self.doctor_name.clone(),
            doctor_license: self.doctor_license.clone(),
            doctor_specialty: self.doctor_specialty.clone(),
            notifications_enabled: self.notifications_enabled,
            email_reminders_enabled: self.email_reminders_enabled,
            sms_reminders_enabled: self.sms_reminders_enabled,
            is_active: Some(true),
            created_at: None,
            updated_at: None,
        }
    }
}

/// Day view consumed by the booking screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub is_working_day: bool,
    pub available_slots: Vec<String>,
    pub booked_times: Vec<String>,
}

// ==============================================================================
// SCHEDULE ERRORS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum ScheduleError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
