use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;
use headers::HeaderMap;
use headers::HeaderValue;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    CreateMedicalRecordRequest, MedicalRecord, MedicalRecordError, MedicalRecordSearchQuery,
    UpdateMedicalRecordRequest,
};

pub struct MedicalRecordService {
    supabase: SupabaseClient,
}

impl MedicalRecordService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_records(
        &self,
        query: MedicalRecordSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<MedicalRecord>, MedicalRecordError> {
        debug!("Listing medical records with query: {:?}", query);

        let mut query_parts = vec![];

        if let Some(patient_id) = query.patient_id {
            query_parts.push(format!("patient_id=eq.{}", patient_id));
        }

        let query_string = if query_parts.is_empty() {
            String::new()
        } else {
            format!("?{}", query_parts.join("&"))
        };

        let limit = query.limit.unwrap_or(100);
        let offset = query.offset.unwrap_or(0);
        let separator = if query_string.is_empty() { "?" } else { "&" };
        // Newest consultation first; created_at settles same-day entries
        let path = format!(
            "/rest/v1/medical_records{}{}order=date.desc,created_at.desc&limit={}&offset={}",
            query_string, separator, limit, offset
        );

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| MedicalRecordError::DatabaseError(e.to_string()))?;

        let records: Vec<MedicalRecord> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| MedicalRecordError::DatabaseError(format!("Failed to parse medical records: {}", e)))?;

        Ok(records)
    }

    pub async fn create_record(
        &self,
        request: CreateMedicalRecordRequest,
        doctor_id: &str,
        auth_token: &str,
    ) -> Result<MedicalRecord, MedicalRecordError> {
        debug!("Creating medical record for patient: {}", request.patient_name);

        validate_record_fields(Some(&request.patient_name), Some(&request.consultation_type))?;

        // The author comes from the verified token, never from the payload
        let record_data = json!({
            "patient_id": request.patient_id,
            "patient_name": request.patient_name,
            "doctor_id": doctor_id,
            "date": request.date,
            "consultation_type": request.consultation_type,
            "symptoms": request.symptoms,
            "diagnosis": request.diagnosis,
            "treatment": request.treatment,
            "medications": request.medications,
            "notes": request.notes,
            "follow_up_date": request.follow_up_date,
        });

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/medical_records",
            Some(auth_token),
            Some(record_data),
            Some(headers),
        ).await.map_err(|e| MedicalRecordError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(MedicalRecordError::DatabaseError(
                "Failed to create medical record".to_string(),
            ));
        }

        let record: MedicalRecord = serde_json::from_value(result[0].clone())
            .map_err(|e| MedicalRecordError::DatabaseError(format!("Failed to parse medical record: {}", e)))?;
        info!("Medical record {} created for patient {}", record.id, record.patient_name);

        Ok(record)
    }

    pub async fn get_record(
        &self,
        record_id: Uuid,
        auth_token: &str,
    ) -> Result<MedicalRecord, MedicalRecordError> {
        debug!("Fetching medical record: {}", record_id);

        let path = format!("/rest/v1/medical_records?id=eq.{}", record_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| MedicalRecordError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(MedicalRecordError::NotFound);
        }

        let record: MedicalRecord = serde_json::from_value(result[0].clone())
            .map_err(|e| MedicalRecordError::DatabaseError(format!("Failed to parse medical record: {}", e)))?;
        Ok(record)
    }

    pub async fn update_record(
        &self,
        record_id: Uuid,
        request: UpdateMedicalRecordRequest,
        auth_token: &str,
    ) -> Result<MedicalRecord, MedicalRecordError> {
        debug!("Amending medical record: {}", record_id);

        validate_record_fields(
            request.patient_name.as_deref(),
            request.consultation_type.as_deref(),
        )?;

        let mut update_data = serde_json::Map::new();

        if let Some(patient_name) = request.patient_name {
            update_data.insert("patient_name".to_string(), json!(patient_name));
        }
        if let Some(date) = request.date {
            update_data.insert("date".to_string(), json!(date));
        }
        if let Some(consultation_type) = request.consultation_type {
            update_data.insert("consultation_type".to_string(), json!(consultation_type));
        }
        if let Some(symptoms) = request.symptoms {
            update_data.insert("symptoms".to_string(), json!(symptoms));
        }
        if let Some(diagnosis) = request.diagnosis {
            update_data.insert("diagnosis".to_string(), json!(diagnosis));
        }
        if let Some(treatment) = request.treatment {
            update_data.insert("treatment".to_string(), json!(treatment));
        }
        if let Some(medications) = request.medications {
            update_data.insert("medications".to_string(), json!(medications));
        }
        if let Some(notes) = request.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }
        if let Some(follow_up_date) = request.follow_up_date {
            update_data.insert("follow_up_date".to_string(), json!(follow_up_date));
        }

        if update_data.is_empty() {
            return self.get_record(record_id, auth_token).await;
        }

        let path = format!("/rest/v1/medical_records?id=eq.{}", record_id);
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(Value::Object(update_data)),
            Some(headers),
        ).await.map_err(|e| MedicalRecordError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(MedicalRecordError::NotFound);
        }

        let amended_record: MedicalRecord = serde_json::from_value(result[0].clone())
            .map_err(|e| MedicalRecordError::DatabaseError(format!("Failed to parse medical record: {}", e)))?;
        info!("Medical record {} amended", record_id);

        Ok(amended_record)
    }

    pub async fn delete_record(
        &self,
        record_id: Uuid,
        auth_token: &str,
    ) -> Result<(), MedicalRecordError> {
        debug!("Deleting medical record: {}", record_id);

        let path = format!("/rest/v1/medical_records?id=eq.{}", record_id);
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::DELETE,
            &path,
            Some(auth_token),
            None,
            Some(headers),
        ).await.map_err(|e| MedicalRecordError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(MedicalRecordError::NotFound);
        }

        info!("Medical record {} deleted", record_id);
        Ok(())
    }
}

fn validate_record_fields(
    patient_name: Option<&str>,
    consultation_type: Option<&str>,
) -> Result<(), MedicalRecordError> {
    if let Some(patient_name) = patient_name {
        if patient_name.trim().is_empty() {
            return Err(MedicalRecordError::ValidationError(
                "patient_name must not be empty".to_string(),
            ));
        }
    }
    if let Some(consultation_type) = consultation_type {
        if consultation_type.trim().is_empty() {
            return Err(MedicalRecordError::ValidationError(
                "consultation_type must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}
