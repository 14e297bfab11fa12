use std::sync::Arc;
use axum::{middleware, routing::{delete, get, patch, post}, Router};
use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn create_medical_record_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(create_medical_record))
        .route("/", get(list_medical_records))
        .route("/{id}", get(get_medical_record))
        .route("/{id}", patch(update_medical_record))
        .route("/{id}", delete(delete_medical_record))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
