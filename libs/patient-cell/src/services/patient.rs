use regex::Regex;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    CreatePatientRequest, Patient, PatientError, PatientSearchQuery, UpdatePatientRequest,
};

pub fn validate_email(email: &str) -> bool {
    let email_regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"
    ).unwrap();

    email_regex.is_match(email) && email.len() <= 254
}

pub fn validate_phone(phone: &str) -> bool {
    let phone_regex = Regex::new(
        r"^\+?[1-9]\d{1,14}$|^\+?\d{1,4}[\s\-\.\(\)]*\d{1,14}$"
    ).unwrap();

    phone_regex.is_match(phone)
}

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_patient(
        &self,
        request: CreatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Creating patient record for: {}", request.name);

        validate_contact_fields(Some(&request.name), request.email.as_deref(), request.phone.as_deref())?;

        let patient_data = json!({
            "name": request.name,
            "email": request.email,
            "phone": request.phone,
            "address": request.address,
            "birth_date": request.birth_date,
            "gender": request.gender,
            "insurance": request.insurance,
            "emergency_contact": request.emergency_contact,
            "emergency_phone": request.emergency_phone,
            "allergies": request.allergies,
            "medical_conditions": request.medical_conditions,
            "medications": request.medications,
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/patients",
            Some(auth_token),
            Some(patient_data),
            Some(headers),
        ).await.map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(PatientError::DatabaseError("Failed to create patient record".to_string()));
        }

        let patient: Patient = serde_json::from_value(result[0].clone())
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))?;
        debug!("Patient record created with ID: {}", patient.id);

        Ok(patient)
    }

    pub async fn get_patient(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Fetching patient record: {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(PatientError::NotFound);
        }

        let patient: Patient = serde_json::from_value(result[0].clone())
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))?;
        Ok(patient)
    }

    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient record: {}", patient_id);

        validate_contact_fields(
            request.name.as_deref(),
            request.email.as_deref(),
            request.phone.as_deref(),
        )?;

        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name {
            update_data.insert("name".to_string(), json!(name));
        }
        if let Some(email) = request.email {
            update_data.insert("email".to_string(), json!(email));
        }
        if let Some(phone) = request.phone {
            update_data.insert("phone".to_string(), json!(phone));
        }
        if let Some(address) = request.address {
            update_data.insert("address".to_string(), json!(address));
        }
        if let Some(birth_date) = request.birth_date {
            update_data.insert("birth_date".to_string(), json!(birth_date));
        }
        if let Some(gender) = request.gender {
            update_data.insert("gender".to_string(), json!(gender));
        }
        if let Some(insurance) = request.insurance {
            update_data.insert("insurance".to_string(), json!(insurance));
        }
        if let Some(emergency_contact) = request.emergency_contact {
            update_data.insert("emergency_contact".to_string(), json!(emergency_contact));
        }
        if let Some(emergency_phone) = request.emergency_phone {
            update_data.insert("emergency_phone".to_string(), json!(emergency_phone));
        }
        if let Some(allergies) = request.allergies {
            update_data.insert("allergies".to_string(), json!(allergies));
        }
        if let Some(medical_conditions) = request.medical_conditions {
            update_data.insert("medical_conditions".to_string(), json!(medical_conditions));
        }
        if let Some(medications) = request.medications {
            update_data.insert("medications".to_string(), json!(medications));
        }

        if update_data.is_empty() {
            return self.get_patient(patient_id, auth_token).await;
        }

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(Value::Object(update_data)),
            Some(headers),
        ).await.map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(PatientError::NotFound);
        }

        let updated_patient: Patient = serde_json::from_value(result[0].clone())
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))?;
        Ok(updated_patient)
    }

    pub async fn delete_patient(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<(), PatientError> {
        debug!("Deleting patient record: {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::DELETE,
            &path,
            Some(auth_token),
            None,
            Some(headers),
        ).await.map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(PatientError::NotFound);
        }

        Ok(())
    }

    pub async fn search_patients(
        &self,
        query: PatientSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<Patient>, PatientError> {
        debug!("Searching patients with query: {:?}", query);

        let mut query_parts = vec![];

        // PostgREST wildcard is `*`; user text gets percent-encoded so
        // spaces and accents survive the URL
        if let Some(name) = query.name {
            query_parts.push(format!("name=ilike.*{}*", urlencoding::encode(&name)));
        }
        if let Some(phone) = query.phone {
            query_parts.push(format!("phone=ilike.*{}*", urlencoding::encode(&phone)));
        }

        let query_string = if query_parts.is_empty() {
            String::new()
        } else {
            format!("?{}", query_parts.join("&"))
        };

        let limit = query.limit.unwrap_or(50);
        let offset = query.offset.unwrap_or(0);
        let separator = if query_string.is_empty() { "?" } else { "&" };
        let path = format!("/rest/v1/patients{}{}order=name.asc&limit={}&offset={}",
            query_string, separator, limit, offset);

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let patients: Vec<Patient> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patients: {}", e)))?;

        Ok(patients)
    }
}

fn validate_contact_fields(
    name: Option<&str>,
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<(), PatientError> {
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(PatientError::ValidationError("name must not be empty".to_string()));
        }
    }
    if let Some(email) = email {
        if !validate_email(email) {
            return Err(PatientError::ValidationError(format!("invalid email address: {}", email)));
        }
    }
    if let Some(phone) = phone {
        if !validate_phone(phone) {
            return Err(PatientError::ValidationError(format!("invalid phone number: {}", phone)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_email_forms() {
        assert!(validate_email("maria.gonzalez@example.com"));
        assert!(validate_email("dr_mendoza+clinic@mediclinic.mx"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("missing@tld"));
        assert!(!validate_email("@example.com"));
    }

    #[test]
    fn accepts_international_phone_forms() {
        assert!(validate_phone("+525512345678"));
        assert!(validate_phone("+52 55 1234 5678"));
        assert!(validate_phone("5512345678"));
    }

    #[test]
    fn rejects_non_numeric_phones() {
        assert!(!validate_phone("call me"));
        assert!(!validate_phone(""));
    }

    #[test]
    fn age_is_none_without_birth_date() {
        let patient = Patient {
            id: Uuid::new_v4(),
            name: "María González".to_string(),
            email: None,
            phone: None,
            address: None,
            birth_date: None,
            gender: None,
            insurance: None,
            emergency_contact: None,
            emergency_phone: None,
            allergies: None,
            medical_conditions: None,
            medications: None,
            created_at: None,
        };

        assert_eq!(patient.age(), None);
    }
}
