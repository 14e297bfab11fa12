use std::sync::Arc;
use axum::{
    extract::{Path, Query, State, Extension},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    CreateMedicalRecordRequest, MedicalRecordError, MedicalRecordSearchQuery,
    UpdateMedicalRecordRequest,
};
use crate::services::MedicalRecordService;

#[axum::debug_handler]
pub async fn list_medical_records(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Query(query): Query<MedicalRecordSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = MedicalRecordService::new(&config);

    let records = service.list_records(query, auth.token())
        .await
        .map_err(map_medical_record_error)?;

    Ok(Json(json!({
        "records": records,
        "total": records.len()
    })))
}

#[axum::debug_handler]
pub async fn create_medical_record(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateMedicalRecordRequest>,
) -> Result<Json<Value>, AppError> {
    let service = MedicalRecordService::new(&config);

    let record = service.create_record(request, &user.id, auth.token())
        .await
        .map_err(map_medical_record_error)?;

    Ok(Json(json!(record)))
}

#[axum::debug_handler]
pub async fn get_medical_record(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(record_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = MedicalRecordService::new(&config);

    let record = service.get_record(record_id, auth.token())
        .await
        .map_err(map_medical_record_error)?;

    Ok(Json(json!(record)))
}

#[axum::debug_handler]
pub async fn update_medical_record(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(record_id): Path<Uuid>,
    Json(request): Json<UpdateMedicalRecordRequest>,
) -> Result<Json<Value>, AppError> {
    let service = MedicalRecordService::new(&config);

    let record = service.update_record(record_id, request, auth.token())
        .await
        .map_err(map_medical_record_error)?;

    Ok(Json(json!(record)))
}

#[axum::debug_handler]
pub async fn delete_medical_record(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(record_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    // Removing clinical history is restricted to privileged roles
    let is_doctor = user.role.as_deref() == Some("doctor");
    let is_admin = user.role.as_deref() == Some("admin");

    if !is_doctor && !is_admin {
        return Err(AppError::Auth("Not authorized to delete medical records".to_string()));
    }

    let service = MedicalRecordService::new(&config);

    service.delete_record(record_id, auth.token())
        .await
        .map_err(map_medical_record_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Medical record deleted successfully"
    })))
}

fn map_medical_record_error(error: MedicalRecordError) -> AppError {
    match error {
        MedicalRecordError::NotFound => AppError::NotFound("Medical record not found".to_string()),
        MedicalRecordError::ValidationError(message) => AppError::ValidationError(message),
        MedicalRecordError::DatabaseError(message) => AppError::Database(message),
    }
}
