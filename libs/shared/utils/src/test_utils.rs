use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "mediclinic-test-jwt-secret-must-be-long-enough-for-hs256".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "doctor@mediclinic.test".to_string(),
            role: "doctor".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Canned PostgREST rows for wiremock-backed tests, shaped like the real
/// tables.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn configuration_response(user_id: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "user_id": user_id,
            "working_days": ["monday", "tuesday", "wednesday", "thursday", "friday"],
            "working_hours_start": "08:00:00",
            "working_hours_end": "18:00:00",
            "break_time_start": "12:00:00",
            "break_time_end": "14:00:00",
            "appointment_duration": 30,
            "clinic_name": "MediClinic",
            "clinic_address": "Av. Reforma 123",
            "clinic_phone": "+52 555 123 4567",
            "clinic_email": "contacto@mediclinic.test",
            "clinic_description": null,
            "doctor_name": "Dra. Laura Mendoza",
            "doctor_license": "12345678",
            "doctor_specialty": "medicina-general",
            "notifications_enabled": true,
            "email_reminders_enabled": true,
            "sms_reminders_enabled": false,
            "is_active": true,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_response(appointment_id: &str, doctor_id: &str) -> serde_json::Value {
        json!({
            "id": appointment_id,
            "date": "2024-01-15",
            "time": "10:00:00",
            "doctor_id": doctor_id,
            "patient_id": null,
            "patient_name": "María González",
            "patient_phone": "+52 555 987 6543",
            "consultation_type": "Consulta General",
            "status": "programada",
            "notes": null,
            "created_at": "2024-01-10T09:00:00Z"
        })
    }

    pub fn patient_response(patient_id: &str, name: &str) -> serde_json::Value {
        json!({
            "id": patient_id,
            "name": name,
            "phone": "+52 555 111 2222",
            "email": "paciente@example.com",
            "birth_date": "1985-06-20",
            "gender": "Femenino",
            "address": "Calle Juárez 45",
            "insurance": "GNP Seguros",
            "allergies": ["penicilina"],
            "medical_conditions": [],
            "medications": [],
            "emergency_contact": "Pedro González",
            "emergency_phone": "+52 555 333 4444",
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn medical_record_response(record_id: &str, patient_id: &str) -> serde_json::Value {
        json!({
            "id": record_id,
            "patient_id": patient_id,
            "patient_name": "María González",
            "doctor_id": Uuid::new_v4(),
            "date": "2024-01-15",
            "consultation_type": "consulta",
            "symptoms": "Cefalea intermitente",
            "diagnosis": "Migraña",
            "treatment": "Reposo e hidratación",
            "medications": "Ibuprofeno 400mg cada 8 horas",
            "notes": null,
            "follow_up_date": "2024-02-15",
            "created_at": "2024-01-15T11:00:00Z"
        })
    }

    pub fn doctor_profile_response(user_id: &str, full_name: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "user_id": user_id,
            "email": "doctor@mediclinic.test",
            "full_name": full_name,
            "role": "doctor",
            "specialty": "medicina-general",
            "license_number": "12345678",
            "is_active": true,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    /// Body PostgREST sends back when the unique index on
    /// (doctor_id, date, time) rejects an insert.
    pub fn duplicate_slot_error() -> serde_json::Value {
        json!({
            "code": "23505",
            "details": "Key (doctor_id, date, \"time\")=(...) already exists.",
            "hint": null,
            "message": "duplicate key value violates unique constraint \"appointments_doctor_slot_key\""
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert!(!app_config.supabase_jwt_secret.is_empty());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::doctor("doc@example.com");
        assert_eq!(user.email, "doc@example.com");
        assert_eq!(user.role, "doctor");

        let user_model = user.to_user();
        assert_eq!(user_model.email, Some(user.email.clone()));
        assert_eq!(user_model.role, Some(user.role.clone()));
        assert_eq!(user_model.id, user.id);
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::default();
        let secret = "test-secret";
        let token = JwtTestUtils::create_test_token(&user, secret, Some(1));

        assert!(token.contains('.'));
        assert_eq!(token.split('.').count(), 3);
    }
}
