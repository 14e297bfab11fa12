// libs/appointment-cell/src/services/booking.rs
use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;
use std::sync::Arc;

use schedule_cell::models::ScheduleError;
use schedule_cell::services::calendar;
use schedule_cell::services::configuration::ConfigurationService;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_utils::time_format::format_time;

use crate::models::{
    Appointment, AppointmentError, AppointmentSearchQuery, AppointmentStatus,
    CreateAppointmentRequest, RescheduleAppointmentRequest, SlotCandidate,
    UpdateAppointmentRequest,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::AppointmentLifecycleService;

pub struct AppointmentBookingService {
    supabase: Arc<SupabaseClient>,
    conflict_service: ConflictDetectionService,
    lifecycle_service: AppointmentLifecycleService,
    configuration_service: ConfigurationService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));

        let conflict_service = ConflictDetectionService::new(Arc::clone(&supabase));
        let lifecycle_service = AppointmentLifecycleService::new();
        let configuration_service = ConfigurationService::new(config);

        Self {
            conflict_service,
            lifecycle_service,
            configuration_service,
            supabase,
        }
    }

    /// Book a new appointment into an open slot.
    pub async fn book_appointment(
        &self,
        request: CreateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        info!("Booking appointment for {} with doctor {} on {} at {}",
              request.patient_name, request.doctor_id, request.date, format_time(&request.time));

        // Step 1: Field validation
        self.validate_booking_request(&request)?;

        // Step 2: The slot must exist on the clinic's grid
        self.validate_slot_is_offered(request.doctor_id, request.date, request.time, auth_token).await?;

        // Step 3: Advisory conflict check against the day's bookings
        let candidate = SlotCandidate {
            date: request.date,
            time: request.time,
            doctor_id: request.doctor_id,
        };
        if let Some(taken) = self.conflict_service.check_slot(&candidate, None, auth_token).await? {
            return Err(AppointmentError::ConflictDetected {
                patient_name: taken.patient_name,
                time: format_time(&taken.time),
            });
        }

        // Step 4: Insert; the unique slot index settles any race the
        // advisory check missed
        let appointment = self.create_appointment_record(&request, auth_token).await?;

        info!("Appointment {} booked for {} on {} at {}",
              appointment.id, appointment.patient_name, appointment.date,
              format_time(&appointment.time));
        Ok(appointment)
    }

    /// Get appointment by ID
    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))?;

        Ok(appointment)
    }

    /// Search appointments with filters, in day-planner order.
    pub async fn search_appointments(
        &self,
        query: AppointmentSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Searching appointments with filters: {:?}", query);

        let mut query_parts = Vec::new();

        if let Some(date) = query.date {
            query_parts.push(format!("date=eq.{}", date));
        }
        if let Some(from_date) = query.from_date {
            query_parts.push(format!("date=gte.{}", from_date));
        }
        if let Some(to_date) = query.to_date {
            query_parts.push(format!("date=lte.{}", to_date));
        }
        if let Some(doctor_id) = query.doctor_id {
            query_parts.push(format!("doctor_id=eq.{}", doctor_id));
        }
        if let Some(status) = query.status {
            query_parts.push(format!("status=eq.{}", status));
        }

        let mut path = format!("/rest/v1/appointments?{}&order=date.asc,time.asc",
                              query_parts.join("&"));

        if let Some(limit) = query.limit {
            path.push_str(&format!("&limit={}", limit));
        }
        if let Some(offset) = query.offset {
            path.push_str(&format!("&offset={}", offset));
        }

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let appointments: Vec<Appointment> = result.into_iter()
            .map(|apt| serde_json::from_value(apt))
            .collect::<std::result::Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))?;

        Ok(appointments)
    }

    /// Update an appointment's descriptive fields. A status change rides
    /// through the same transition table as the dedicated endpoints.
    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment: {}", appointment_id);

        let current_appointment = self.get_appointment(appointment_id, auth_token).await?;

        if let Some(new_status) = &request.status {
            self.lifecycle_service.validate_status_transition(
                &current_appointment.status,
                new_status,
            )?;
        }

        let mut update_data = serde_json::Map::new();

        if let Some(status) = request.status {
            update_data.insert("status".to_string(), json!(status));
        }
        if let Some(patient_name) = request.patient_name {
            if patient_name.trim().is_empty() {
                return Err(AppointmentError::ValidationError(
                    "patient_name must not be empty".to_string()
                ));
            }
            update_data.insert("patient_name".to_string(), json!(patient_name));
        }
        if let Some(patient_phone) = request.patient_phone {
            update_data.insert("patient_phone".to_string(), json!(patient_phone));
        }
        if let Some(consultation_type) = request.consultation_type {
            if consultation_type.trim().is_empty() {
                return Err(AppointmentError::ValidationError(
                    "consultation_type must not be empty".to_string()
                ));
            }
            update_data.insert("consultation_type".to_string(), json!(consultation_type));
        }
        if let Some(notes) = request.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }

        if update_data.is_empty() {
            return Ok(current_appointment);
        }

        let updated_appointment = self.patch_appointment_record(
            appointment_id,
            Value::Object(update_data),
            auth_token,
        ).await?;

        info!("Appointment {} updated", appointment_id);
        Ok(updated_appointment)
    }

    /// Move an appointment to a new slot, keeping its status.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Rescheduling appointment {} to {} at {}",
               appointment_id, request.new_date, format_time(&request.new_time));

        let current_appointment = self.get_appointment(appointment_id, auth_token).await?;

        self.lifecycle_service.validate_reschedule(&current_appointment.status)?;

        self.validate_slot_is_offered(
            current_appointment.doctor_id,
            request.new_date,
            request.new_time,
            auth_token,
        ).await?;

        let candidate = SlotCandidate {
            date: request.new_date,
            time: request.new_time,
            doctor_id: current_appointment.doctor_id,
        };
        if let Some(taken) = self.conflict_service
            .check_slot(&candidate, Some(appointment_id), auth_token)
            .await?
        {
            return Err(AppointmentError::ConflictDetected {
                patient_name: taken.patient_name,
                time: format_time(&taken.time),
            });
        }

        let update_data = json!({
            "date": request.new_date,
            "time": format_time(&request.new_time),
        });

        let updated = self.patch_appointment_record(appointment_id, update_data, auth_token).await?;

        info!("Appointment {} moved to {} at {}",
              appointment_id, updated.date, format_time(&updated.time));
        Ok(updated)
    }

    /// Mark a consultation as attended. Calling it again on a completed
    /// appointment is a no-op.
    pub async fn attend_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Marking appointment {} as attended", appointment_id);

        let current_appointment = self.get_appointment(appointment_id, auth_token).await?;

        let Some(next_status) = self.lifecycle_service.attend_transition(&current_appointment.status)? else {
            return Ok(current_appointment);
        };

        let updated = self.patch_appointment_record(
            appointment_id,
            json!({ "status": next_status }),
            auth_token,
        ).await?;

        info!("Appointment {} completed", appointment_id);
        Ok(updated)
    }

    /// Cancel an appointment. The slot frees up immediately; the row stays
    /// for the clinic's records.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let current_appointment = self.get_appointment(appointment_id, auth_token).await?;

        self.lifecycle_service.validate_status_transition(
            &current_appointment.status,
            &AppointmentStatus::Cancelada,
        )?;

        let cancelled = self.patch_appointment_record(
            appointment_id,
            json!({ "status": AppointmentStatus::Cancelada }),
            auth_token,
        ).await?;

        info!("Appointment {} cancelled", appointment_id);
        Ok(cancelled)
    }

    /// Hard delete. Works from any status; the row is gone afterwards.
    pub async fn delete_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        debug!("Deleting appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::DELETE,
            &path,
            Some(auth_token),
            None,
            Some(headers),
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        info!("Appointment {} deleted", appointment_id);
        Ok(())
    }

    // ==============================================================================
    // PRIVATE HELPER METHODS
    // ==============================================================================

    fn validate_booking_request(&self, request: &CreateAppointmentRequest) -> Result<(), AppointmentError> {
        if request.patient_name.trim().is_empty() {
            return Err(AppointmentError::ValidationError(
                "patient_name must not be empty".to_string()
            ));
        }
        if request.consultation_type.trim().is_empty() {
            return Err(AppointmentError::ValidationError(
                "consultation_type must not be empty".to_string()
            ));
        }
        Ok(())
    }

    /// Closed days and off-grid times are rejected before any write.
    async fn validate_slot_is_offered(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        let (config, _) = self.configuration_service
            .get_or_default(&doctor_id.to_string(), auth_token)
            .await
            .map_err(map_schedule_error)?;

        if !calendar::is_working_day(Some(&config), date) {
            return Err(AppointmentError::InvalidTime(format!(
                "The clinic is closed on {}", date
            )));
        }

        let slots = calendar::available_time_slots(Some(&config), date)
            .map_err(map_schedule_error)?;
        if !slots.contains(&time) {
            return Err(AppointmentError::InvalidTime(format!(
                "{} is not an offered slot on {}", format_time(&time), date
            )));
        }

        Ok(())
    }

    async fn create_appointment_record(
        &self,
        request: &CreateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let appointment_data = json!({
            "date": request.date,
            "time": format_time(&request.time),
            "doctor_id": request.doctor_id,
            "patient_id": request.patient_id,
            "patient_name": request.patient_name,
            "patient_phone": request.patient_phone,
            "consultation_type": request.consultation_type,
            "status": AppointmentStatus::Programada,
            "notes": request.notes,
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/appointments",
            Some(auth_token),
            Some(appointment_data),
            Some(headers),
        ).await.map_err(map_database_error)?;

        if result.is_empty() {
            return Err(AppointmentError::DatabaseError("Failed to create appointment".to_string()));
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse created appointment: {}", e)))?;

        Ok(appointment)
    }

    async fn patch_appointment_record(
        &self,
        appointment_id: Uuid,
        update_data: Value,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(update_data),
            Some(headers),
        ).await.map_err(map_database_error)?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        let updated_appointment: Appointment = serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse updated appointment: {}", e)))?;

        Ok(updated_appointment)
    }
}

/// Storage is authoritative for slot uniqueness: a conflict response from
/// the unique index means somebody else took the slot between the advisory
/// check and the write.
fn map_database_error(error: anyhow::Error) -> AppointmentError {
    let message = error.to_string();
    if message.starts_with("Conflict") {
        AppointmentError::SlotNotAvailable
    } else {
        AppointmentError::DatabaseError(message)
    }
}

fn map_schedule_error(error: ScheduleError) -> AppointmentError {
    match error {
        ScheduleError::InvalidConfiguration(message) => AppointmentError::ValidationError(
            format!("Clinic configuration is invalid: {}", message)
        ),
        ScheduleError::DatabaseError(message) => AppointmentError::DatabaseError(message),
    }
}
