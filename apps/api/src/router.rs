use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use doctor_cell::router::doctor_routes;
use medical_record_cell::router::create_medical_record_router;
use patient_cell::router::create_patient_router;
use schedule_cell::router::{config_routes, schedule_routes};
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "MediClinic API is running!" }))
        .nest("/config", config_routes(state.clone()))
        .nest("/schedule", schedule_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/patients", create_patient_router(state.clone()))
        .nest("/medical-records", create_medical_record_router(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
}
