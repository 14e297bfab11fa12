// libs/appointment-cell/src/services/conflict.rs
use chrono::NaiveDate;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use std::sync::Arc;
use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, SlotCandidate};

/// First appointment occupying exactly the candidate's slot: same date, same
/// start time, same doctor. Cancelled appointments do not hold their slot.
pub fn find_conflict<'a>(
    existing: &'a [Appointment],
    candidate: &SlotCandidate,
) -> Option<&'a Appointment> {
    existing.iter().find(|appointment| {
        appointment.status != AppointmentStatus::Cancelada
            && appointment.date == candidate.date
            && appointment.time == candidate.time
            && appointment.doctor_id == candidate.doctor_id
    })
}

pub struct ConflictDetectionService {
    supabase: Arc<SupabaseClient>,
}

impl ConflictDetectionService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Snapshot check against the doctor's day. The unique slot index in
    /// storage has the final word under concurrency; this check exists to
    /// give callers a descriptive rejection before the write.
    pub async fn check_slot(
        &self,
        candidate: &SlotCandidate,
        exclude_appointment_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<Option<Appointment>, AppointmentError> {
        debug!("Checking slot {} {} for doctor {}",
               candidate.date, candidate.time, candidate.doctor_id);

        let mut existing = self.get_doctor_appointments_for_date(
            candidate.doctor_id,
            candidate.date,
            auth_token,
        ).await?;

        // A reschedule must not collide with the appointment being moved.
        if let Some(excluded) = exclude_appointment_id {
            existing.retain(|appointment| appointment.id != excluded);
        }

        let conflict = find_conflict(&existing, candidate).cloned();
        if let Some(taken) = &conflict {
            warn!("Slot {} on {} already booked by {}",
                  candidate.time, candidate.date, taken.patient_name);
        }

        Ok(conflict)
    }

    async fn get_doctor_appointments_for_date(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&order=time.asc",
            doctor_id, date
        );

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
}
