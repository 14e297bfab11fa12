// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, info, warn};

use crate::models::{AppointmentError, AppointmentStatus};

pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: &AppointmentStatus,
        new_status: &AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        let valid_transitions = self.get_valid_transitions(current_status);

        if !valid_transitions.contains(new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition(current_status.clone()));
        }

        info!("Status transition validated: {} -> {}", current_status, new_status);
        Ok(())
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(&self, current_status: &AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            // A walk-in can be completed without ever being confirmed
            AppointmentStatus::Programada => vec![
                AppointmentStatus::Confirmada,
                AppointmentStatus::Completada,
                AppointmentStatus::Cancelada,
            ],
            AppointmentStatus::Confirmada => vec![
                AppointmentStatus::Completada,
                AppointmentStatus::Cancelada,
            ],
            // Terminal states - no transitions allowed
            AppointmentStatus::Completada => vec![],
            AppointmentStatus::Cancelada => vec![],
        }
    }

    /// The status attend should move an appointment to. `None` means the
    /// appointment is already completed and the call is a no-op.
    pub fn attend_transition(
        &self,
        current_status: &AppointmentStatus,
    ) -> Result<Option<AppointmentStatus>, AppointmentError> {
        match current_status {
            AppointmentStatus::Completada => {
                debug!("Appointment already completed, attend is a no-op");
                Ok(None)
            }
            AppointmentStatus::Cancelada => {
                warn!("Attend attempted on a cancelled appointment");
                Err(AppointmentError::InvalidStatusTransition(AppointmentStatus::Cancelada))
            }
            _ => Ok(Some(AppointmentStatus::Completada)),
        }
    }

    /// A completed consultation took place; its slot is history and must not
    /// move. Every other status may be rescheduled.
    pub fn validate_reschedule(&self, current_status: &AppointmentStatus) -> Result<(), AppointmentError> {
        if *current_status == AppointmentStatus::Completada {
            warn!("Reschedule attempted on a completed appointment");
            return Err(AppointmentError::InvalidStatusTransition(AppointmentStatus::Completada));
        }
        Ok(())
    }
}
