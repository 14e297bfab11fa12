use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentStatus, SlotCandidate};
use appointment_cell::services::conflict::find_conflict;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

fn appointment(
    day: &str,
    at: &str,
    doctor_id: Uuid,
    status: AppointmentStatus,
    patient_name: &str,
) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        date: date(day),
        time: time(at),
        doctor_id,
        patient_id: None,
        patient_name: patient_name.to_string(),
        patient_phone: None,
        consultation_type: "Consulta General".to_string(),
        status,
        notes: None,
        created_at: None,
    }
}

fn candidate(day: &str, at: &str, doctor_id: Uuid) -> SlotCandidate {
    SlotCandidate {
        date: date(day),
        time: time(at),
        doctor_id,
    }
}

// ==============================================================================
// SLOT CONFLICT TESTS
// ==============================================================================

#[test]
fn test_exact_slot_match_is_reported() {
    let doctor = Uuid::new_v4();
    let existing = vec![
        appointment("2024-01-15", "09:00", doctor, AppointmentStatus::Programada, "Carlos Ruiz"),
        appointment("2024-01-15", "10:00", doctor, AppointmentStatus::Confirmada, "María González"),
    ];

    let conflict = find_conflict(&existing, &candidate("2024-01-15", "10:00", doctor));

    assert_eq!(conflict.unwrap().patient_name, "María González");
}

#[test]
fn test_free_time_has_no_conflict() {
    let doctor = Uuid::new_v4();
    let existing = vec![
        appointment("2024-01-15", "10:00", doctor, AppointmentStatus::Programada, "María González"),
    ];

    let conflict = find_conflict(&existing, &candidate("2024-01-15", "10:30", doctor));

    assert!(conflict.is_none());
}

#[test]
fn test_same_time_on_another_date_is_free() {
    let doctor = Uuid::new_v4();
    let existing = vec![
        appointment("2024-01-15", "10:00", doctor, AppointmentStatus::Programada, "María González"),
    ];

    let conflict = find_conflict(&existing, &candidate("2024-01-16", "10:00", doctor));

    assert!(conflict.is_none());
}

#[test]
fn test_same_slot_with_another_doctor_is_free() {
    let doctor = Uuid::new_v4();
    let other_doctor = Uuid::new_v4();
    let existing = vec![
        appointment("2024-01-15", "10:00", doctor, AppointmentStatus::Programada, "María González"),
    ];

    let conflict = find_conflict(&existing, &candidate("2024-01-15", "10:00", other_doctor));

    assert!(conflict.is_none());
}

#[test]
fn test_cancelled_appointment_releases_its_slot() {
    let doctor = Uuid::new_v4();
    let existing = vec![
        appointment("2024-01-15", "10:00", doctor, AppointmentStatus::Cancelada, "María González"),
    ];

    let conflict = find_conflict(&existing, &candidate("2024-01-15", "10:00", doctor));

    assert!(conflict.is_none());
}

#[test]
fn test_cancelled_entry_does_not_mask_a_live_one() {
    let doctor = Uuid::new_v4();
    let existing = vec![
        appointment("2024-01-15", "10:00", doctor, AppointmentStatus::Cancelada, "Carlos Ruiz"),
        appointment("2024-01-15", "10:00", doctor, AppointmentStatus::Programada, "María González"),
    ];

    let conflict = find_conflict(&existing, &candidate("2024-01-15", "10:00", doctor));

    assert_eq!(conflict.unwrap().patient_name, "María González");
}

#[test]
fn test_empty_day_has_no_conflicts() {
    let doctor = Uuid::new_v4();

    let conflict = find_conflict(&[], &candidate("2024-01-15", "10:00", doctor));

    assert!(conflict.is_none());
}
