use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::NaiveDate;
use headers::{Authorization, authorization::Bearer};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{SaveConfigRequest, ScheduleError};
use crate::services::{ConfigurationService, ScheduleService};

#[derive(Debug, Deserialize)]
pub struct DayScheduleQuery {
    pub doctor_id: Option<String>,
}

// ==============================================================================
// CONFIGURATION HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_configuration(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let service = ConfigurationService::new(&state);

    let (configuration, defaults) = service
        .get_or_default(&user.id, token)
        .await
        .map_err(|e| match e {
            ScheduleError::InvalidConfiguration(msg) => AppError::ValidationError(msg),
            ScheduleError::DatabaseError(msg) => AppError::Database(msg),
        })?;

    Ok(Json(json!({
        "success": true,
        "configuration": configuration,
        "defaults": defaults
    })))
}

#[axum::debug_handler]
pub async fn save_configuration(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<SaveConfigRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    // Only the doctor or an admin may change the clinic schedule
    let is_doctor = user.role.as_deref() == Some("doctor");
    let is_admin = user.role.as_deref() == Some("admin");
    if !is_doctor && !is_admin {
        return Err(AppError::Auth(
            "Not authorized to update the clinic configuration".to_string(),
        ));
    }

    info!("Saving clinic configuration for user {}", user.id);
    let service = ConfigurationService::new(&state);

    let configuration = service
        .save_configuration(&request, &user.id, token)
        .await
        .map_err(|e| match e {
            ScheduleError::InvalidConfiguration(msg) => AppError::ValidationError(msg),
            ScheduleError::DatabaseError(msg) => AppError::Database(msg),
        })?;

    Ok(Json(json!({
        "success": true,
        "configuration": configuration,
        "message": "Configuration saved successfully"
    })))
}

// ==============================================================================
// DAY SCHEDULE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_day_schedule(
    State(state): State<Arc<AppConfig>>,
    Path(date): Path<NaiveDate>,
    Query(query): Query<DayScheduleQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let service = ScheduleService::new(&state);

    // The single-doctor clinic views its own calendar unless an explicit
    // doctor is requested.
    let doctor_id = query.doctor_id.as_deref().unwrap_or(&user.id);

    let schedule = service
        .day_schedule(date, doctor_id, token)
        .await
        .map_err(|e| match e {
            ScheduleError::InvalidConfiguration(msg) => AppError::ValidationError(msg),
            ScheduleError::DatabaseError(msg) => AppError::Database(msg),
        })?;

    Ok(Json(json!({
        "success": true,
        "schedule": schedule
    })))
}
