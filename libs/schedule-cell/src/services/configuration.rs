// libs/schedule-cell/src/services/configuration.rs
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_utils::time_format::format_time;

use crate::models::{ClinicConfig, SaveConfigRequest, ScheduleError};

/// Reads and writes the per-clinic configuration row.
pub struct ConfigurationService {
    supabase: Arc<SupabaseClient>,
}

impl ConfigurationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    /// The active configuration row for a user, if one has been saved.
    pub async fn get_configuration(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Option<ClinicConfig>, ScheduleError> {
        let path = format!(
            "/rest/v1/configurations?user_id=eq.{}&is_active=eq.true&order=created_at.desc&limit=1",
            user_id
        );

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ScheduleError::DatabaseError(e.to_string()))?;

        match rows.into_iter().next() {
            Some(row) => {
                let config: ClinicConfig = serde_json::from_value(row)
                    .map_err(|e| ScheduleError::DatabaseError(e.to_string()))?;
                Ok(Some(config))
            }
            None => Ok(None),
        }
    }

    /// The configuration slot computation should use: the stored row, or
    /// the documented defaults when the clinic has never saved one. The
    /// second value reports whether defaults were substituted.
    pub async fn get_or_default(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<(ClinicConfig, bool), ScheduleError> {
        match self.get_configuration(user_id, auth_token).await? {
            Some(config) => Ok((config, false)),
            None => {
                debug!("No configuration stored for user {}, using defaults", user_id);
                Ok((ClinicConfig::defaults(), true))
            }
        }
    }

    /// Validated upsert: replaces the existing active row, or inserts the
    /// first one.
    pub async fn save_configuration(
        &self,
        request: &SaveConfigRequest,
        user_id: &str,
        auth_token: &str,
    ) -> Result<ClinicConfig, ScheduleError> {
        let config = request.to_config(None);
        config.validate()?;

        let body = json!({
            "user_id": user_id,
            "working_days": config.working_days,
            "working_hours_start": config.working_hours_start.map(|t| format_time(&t)),
            "working_hours_end": config.working_hours_end.map(|t| format_time(&t)),
            "break_time_start": config.break_time_start.map(|t| format_time(&t)),
            "break_time_end": config.break_time_end.map(|t| format_time(&t)),
            "appointment_duration": config.appointment_duration,
            "clinic_name": config.clinic_name,
            "clinic_address": config.clinic_address,
            "clinic_phone": config.clinic_phone,
            "clinic_email": config.clinic_email,
            "clinic_description": config.clinic_description,
            "doctor_name": config.doctor_name,
            "doctor_license": config.doctor_license,
            "doctor_specialty": config.doctor_specialty,
            "notifications_enabled": config.notifications_enabled,
            "email_reminders_enabled": config.email_reminders_enabled,
            "sms_reminders_enabled": config.sms_reminders_enabled,
            "is_active": true,
        });

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let existing_id = self
            .get_configuration(user_id, auth_token)
            .await?
            .and_then(|c| c.id);

        let saved: Vec<Value> = match existing_id {
            Some(id) => {
                info!("Updating configuration {} for user {}", id, user_id);
                let path = format!("/rest/v1/configurations?id=eq.{}", id);
                self.supabase
                    .request_with_headers(Method::PATCH, &path, Some(auth_token), Some(body), Some(headers))
                    .await
            }
            None => {
                info!("Creating configuration for user {}", user_id);
                self.supabase
                    .request_with_headers(Method::POST, "/rest/v1/configurations", Some(auth_token), Some(body), Some(headers))
                    .await
            }
        }
        .map_err(|e| ScheduleError::DatabaseError(e.to_string()))?;

        let row = saved.into_iter().next().ok_or_else(|| {
            ScheduleError::DatabaseError("Configuration save returned no rows".to_string())
        })?;

        serde_json::from_value(row).map_err(|e| ScheduleError::DatabaseError(e.to_string()))
    }
}
