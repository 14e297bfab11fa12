use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{DoctorError, DoctorProfile};

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Active profiles with the `doctor` role, ordered the way the booking
    /// form lists them.
    pub async fn list_doctors(&self, auth_token: &str) -> Result<Vec<DoctorProfile>, DoctorError> {
        debug!("Listing active doctor profiles");

        let path = "/rest/v1/user_profiles?role=eq.doctor&is_active=eq.true&order=full_name.asc";
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            path,
            Some(auth_token),
            None,
        ).await.map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let doctors: Vec<DoctorProfile> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor profiles: {}", e)))?;

        Ok(doctors)
    }

    /// Fetch one doctor profile by its auth user id. Deactivated profiles
    /// still resolve so history views can name the doctor.
    pub async fn get_doctor(
        &self,
        user_id: Uuid,
        auth_token: &str,
    ) -> Result<DoctorProfile, DoctorError> {
        debug!("Fetching doctor profile: {}", user_id);

        let path = format!("/rest/v1/user_profiles?user_id=eq.{}&role=eq.doctor", user_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(DoctorError::NotFound);
        }

        let doctor: DoctorProfile = serde_json::from_value(result[0].clone())
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor profile: {}", e)))?;
        Ok(doctor)
    }
}
