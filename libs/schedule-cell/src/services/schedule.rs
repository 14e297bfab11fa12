// libs/schedule-cell/src/services/schedule.rs
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_utils::time_format::{format_time, hhmm};

use crate::models::{DaySchedule, ScheduleError};
use crate::services::calendar;
use crate::services::configuration::ConfigurationService;

/// Projection of an appointment row when only the start time matters.
#[derive(Debug, Deserialize)]
struct BookedTime {
    #[serde(with = "hhmm")]
    time: NaiveTime,
}

/// Builds the day view the booking screen works from.
pub struct ScheduleService {
    supabase: Arc<SupabaseClient>,
    configuration: ConfigurationService,
}

impl ScheduleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            configuration: ConfigurationService::new(config),
        }
    }

    /// Working-day flag, theoretical slot grid, and the times already taken
    /// by non-cancelled appointments for one doctor on one date.
    pub async fn day_schedule(
        &self,
        date: NaiveDate,
        doctor_id: &str,
        auth_token: &str,
    ) -> Result<DaySchedule, ScheduleError> {
        let (config, _) = self
            .configuration
            .get_or_default(doctor_id, auth_token)
            .await?;

        let working = calendar::is_working_day(Some(&config), date);
        let slots = calendar::available_time_slots(Some(&config), date)?;

        let booked = if working {
            self.booked_times(date, doctor_id, auth_token).await?
        } else {
            Vec::new()
        };

        debug!(
            "Day schedule for {} on {}: {} slots, {} booked",
            doctor_id,
            date,
            slots.len(),
            booked.len()
        );

        Ok(DaySchedule {
            date,
            is_working_day: working,
            available_slots: slots.iter().map(format_time).collect(),
            booked_times: booked.iter().map(format_time).collect(),
        })
    }

    async fn booked_times(
        &self,
        date: NaiveDate,
        doctor_id: &str,
        auth_token: &str,
    ) -> Result<Vec<NaiveTime>, ScheduleError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&status=neq.cancelada&select=time&order=time.asc",
            doctor_id, date
        );

        let rows: Vec<BookedTime> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ScheduleError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(|row| row.time).collect())
    }
}
