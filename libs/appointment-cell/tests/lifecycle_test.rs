use assert_matches::assert_matches;

use appointment_cell::models::{AppointmentError, AppointmentStatus};
use appointment_cell::services::lifecycle::AppointmentLifecycleService;

// ==============================================================================
// STATUS TRANSITION TESTS
// ==============================================================================

#[test]
fn test_scheduled_appointment_can_be_confirmed() {
    let lifecycle = AppointmentLifecycleService::new();

    let result = lifecycle.validate_status_transition(
        &AppointmentStatus::Programada,
        &AppointmentStatus::Confirmada,
    );

    assert!(result.is_ok());
}

#[test]
fn test_scheduled_appointment_can_complete_without_confirmation() {
    let lifecycle = AppointmentLifecycleService::new();

    // Walk-ins get attended straight from the scheduled state
    let result = lifecycle.validate_status_transition(
        &AppointmentStatus::Programada,
        &AppointmentStatus::Completada,
    );

    assert!(result.is_ok());
}

#[test]
fn test_confirmed_appointment_can_complete_or_cancel() {
    let lifecycle = AppointmentLifecycleService::new();

    assert!(lifecycle.validate_status_transition(
        &AppointmentStatus::Confirmada,
        &AppointmentStatus::Completada,
    ).is_ok());
    assert!(lifecycle.validate_status_transition(
        &AppointmentStatus::Confirmada,
        &AppointmentStatus::Cancelada,
    ).is_ok());
}

#[test]
fn test_confirmed_appointment_cannot_return_to_scheduled() {
    let lifecycle = AppointmentLifecycleService::new();

    let result = lifecycle.validate_status_transition(
        &AppointmentStatus::Confirmada,
        &AppointmentStatus::Programada,
    );

    assert_matches!(result, Err(AppointmentError::InvalidStatusTransition(AppointmentStatus::Confirmada)));
}

#[test]
fn test_completed_appointment_is_terminal() {
    let lifecycle = AppointmentLifecycleService::new();

    let targets = [
        AppointmentStatus::Programada,
        AppointmentStatus::Confirmada,
        AppointmentStatus::Cancelada,
    ];

    for target in targets {
        let result = lifecycle.validate_status_transition(&AppointmentStatus::Completada, &target);
        assert_matches!(result, Err(AppointmentError::InvalidStatusTransition(_)));
    }

    assert!(lifecycle.get_valid_transitions(&AppointmentStatus::Completada).is_empty());
}

#[test]
fn test_cancelled_appointment_is_terminal() {
    let lifecycle = AppointmentLifecycleService::new();

    let targets = [
        AppointmentStatus::Programada,
        AppointmentStatus::Confirmada,
        AppointmentStatus::Completada,
    ];

    for target in targets {
        let result = lifecycle.validate_status_transition(&AppointmentStatus::Cancelada, &target);
        assert_matches!(result, Err(AppointmentError::InvalidStatusTransition(_)));
    }

    assert!(lifecycle.get_valid_transitions(&AppointmentStatus::Cancelada).is_empty());
}

#[test]
fn test_transition_listing_matches_the_table() {
    let lifecycle = AppointmentLifecycleService::new();

    assert_eq!(
        lifecycle.get_valid_transitions(&AppointmentStatus::Programada),
        vec![
            AppointmentStatus::Confirmada,
            AppointmentStatus::Completada,
            AppointmentStatus::Cancelada,
        ],
    );
    assert_eq!(
        lifecycle.get_valid_transitions(&AppointmentStatus::Confirmada),
        vec![AppointmentStatus::Completada, AppointmentStatus::Cancelada],
    );
}

// ==============================================================================
// ATTEND AND RESCHEDULE RULES
// ==============================================================================

#[test]
fn test_attend_moves_scheduled_appointment_to_completed() {
    let lifecycle = AppointmentLifecycleService::new();

    let next = lifecycle.attend_transition(&AppointmentStatus::Programada);
    assert_matches!(next, Ok(Some(AppointmentStatus::Completada)));

    let next = lifecycle.attend_transition(&AppointmentStatus::Confirmada);
    assert_matches!(next, Ok(Some(AppointmentStatus::Completada)));
}

#[test]
fn test_attend_on_completed_appointment_is_a_noop() {
    let lifecycle = AppointmentLifecycleService::new();

    let next = lifecycle.attend_transition(&AppointmentStatus::Completada);

    assert_matches!(next, Ok(None));
}

#[test]
fn test_attend_on_cancelled_appointment_is_rejected() {
    let lifecycle = AppointmentLifecycleService::new();

    let next = lifecycle.attend_transition(&AppointmentStatus::Cancelada);

    assert_matches!(next, Err(AppointmentError::InvalidStatusTransition(AppointmentStatus::Cancelada)));
}

#[test]
fn test_reschedule_allowed_for_open_appointments() {
    let lifecycle = AppointmentLifecycleService::new();

    assert!(lifecycle.validate_reschedule(&AppointmentStatus::Programada).is_ok());
    assert!(lifecycle.validate_reschedule(&AppointmentStatus::Confirmada).is_ok());
    // A cancelled appointment can be revived onto a new slot
    assert!(lifecycle.validate_reschedule(&AppointmentStatus::Cancelada).is_ok());
}

#[test]
fn test_reschedule_rejected_for_completed_appointments() {
    let lifecycle = AppointmentLifecycleService::new();

    let result = lifecycle.validate_reschedule(&AppointmentStatus::Completada);

    assert_matches!(result, Err(AppointmentError::InvalidStatusTransition(AppointmentStatus::Completada)));
}
