use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{body_partial_json, method, path, query_param};

use medical_record_cell::handlers;
use medical_record_cell::models::{
    CreateMedicalRecordRequest, MedicalRecordSearchQuery, UpdateMedicalRecordRequest,
};
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

fn create_test_user_extension(role: &str, id: &str) -> Extension<User> {
    Extension(User {
        id: id.to_string(),
        email: Some(format!("{}@example.com", role)),
        role: Some(role.to_string()),
        metadata: None,
        created_at: Some(chrono::Utc::now()),
    })
}

fn create_auth_header(token: &str) -> TypedHeader<Authorization<Bearer>> {
    let auth = Authorization::bearer(token).unwrap();
    TypedHeader(auth)
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn consultation_entry(patient_id: Uuid) -> CreateMedicalRecordRequest {
    CreateMedicalRecordRequest {
        patient_id,
        patient_name: "María González".to_string(),
        date: date("2024-01-15"),
        consultation_type: "Consulta General".to_string(),
        symptoms: Some("Cefalea intermitente".to_string()),
        diagnosis: Some("Migraña".to_string()),
        treatment: Some("Reposo e hidratación".to_string()),
        medications: Some("Ibuprofeno 400mg cada 8 horas".to_string()),
        notes: None,
        follow_up_date: None,
    }
}

async fn test_context(mock_server: &MockServer) -> (Arc<AppConfig>, String) {
    let test_config = TestConfig::default();
    let mut config = test_config.to_app_config();
    config.supabase_url = mock_server.uri();

    let doctor = TestUser::doctor("doctor@mediclinic.test");
    let token = JwtTestUtils::create_test_token(&doctor, &config.supabase_jwt_secret, Some(24));

    (Arc::new(config), token)
}

#[tokio::test]
async fn test_create_record_stamps_author_from_token() {
    let mock_server = MockServer::start().await;
    let (config, token) = test_context(&mock_server).await;

    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();
    let mut row = MockSupabaseResponses::medical_record_response(
        &Uuid::new_v4().to_string(),
        &patient_id.to_string(),
    );
    row["doctor_id"] = json!(doctor_id);

    // The insert must carry the token's user as the author
    Mock::given(method("POST"))
        .and(path("/rest/v1/medical_records"))
        .and(body_partial_json(json!({ "doctor_id": doctor_id })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let result = handlers::create_medical_record(
        State(config),
        create_auth_header(&token),
        create_test_user_extension("doctor", &doctor_id.to_string()),
        Json(consultation_entry(patient_id)),
    ).await;

    let Json(body) = result.unwrap();
    assert_eq!(body["patient_name"], json!("María González"));
    assert_eq!(body["doctor_id"], json!(doctor_id.to_string()));
}

#[tokio::test]
async fn test_create_record_rejects_blank_patient_name() {
    let mock_server = MockServer::start().await;
    let (config, token) = test_context(&mock_server).await;

    let mut request = consultation_entry(Uuid::new_v4());
    request.patient_name = "   ".to_string();

    let result = handlers::create_medical_record(
        State(config),
        create_auth_header(&token),
        create_test_user_extension("doctor", &Uuid::new_v4().to_string()),
        Json(request),
    ).await;

    match result.unwrap_err() {
        AppError::ValidationError(message) => assert!(message.contains("patient_name")),
        other => panic!("Expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_records_scopes_to_patient_newest_first() {
    let mock_server = MockServer::start().await;
    let (config, token) = test_context(&mock_server).await;

    let patient_id = Uuid::new_v4();
    let row = MockSupabaseResponses::medical_record_response(
        &Uuid::new_v4().to_string(),
        &patient_id.to_string(),
    );

    Mock::given(method("GET"))
        .and(path("/rest/v1/medical_records"))
        .and(query_param("patient_id", format!("eq.{}", patient_id)))
        .and(query_param("order", "date.desc,created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let query = MedicalRecordSearchQuery {
        patient_id: Some(patient_id),
        ..Default::default()
    };

    let result = handlers::list_medical_records(
        State(config),
        create_auth_header(&token),
        create_test_user_extension("doctor", &Uuid::new_v4().to_string()),
        Query(query),
    ).await;

    let Json(body) = result.unwrap();
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["records"][0]["diagnosis"], json!("Migraña"));
}

#[tokio::test]
async fn test_get_record_maps_missing_row_to_not_found() {
    let mock_server = MockServer::start().await;
    let (config, token) = test_context(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/medical_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let result = handlers::get_medical_record(
        State(config),
        create_auth_header(&token),
        create_test_user_extension("doctor", &Uuid::new_v4().to_string()),
        Path(Uuid::new_v4()),
    ).await;

    assert_matches!(result.unwrap_err(), AppError::NotFound(_));
}

#[tokio::test]
async fn test_amend_record_returns_updated_row() {
    let mock_server = MockServer::start().await;
    let (config, token) = test_context(&mock_server).await;

    let record_id = Uuid::new_v4();
    let mut amended = MockSupabaseResponses::medical_record_response(
        &record_id.to_string(),
        &Uuid::new_v4().to_string(),
    );
    amended["diagnosis"] = json!("Migraña crónica");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/medical_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([amended])))
        .mount(&mock_server)
        .await;

    let request = UpdateMedicalRecordRequest {
        diagnosis: Some("Migraña crónica".to_string()),
        ..Default::default()
    };

    let result = handlers::update_medical_record(
        State(config),
        create_auth_header(&token),
        create_test_user_extension("doctor", &Uuid::new_v4().to_string()),
        Path(record_id),
        Json(request),
    ).await;

    let Json(body) = result.unwrap();
    assert_eq!(body["diagnosis"], json!("Migraña crónica"));
}

#[tokio::test]
async fn test_amend_record_with_no_fields_returns_current_row() {
    let mock_server = MockServer::start().await;
    let (config, token) = test_context(&mock_server).await;

    let record_id = Uuid::new_v4();
    let row = MockSupabaseResponses::medical_record_response(
        &record_id.to_string(),
        &Uuid::new_v4().to_string(),
    );

    // Only the fetch is mocked: an empty amendment must not issue a write
    Mock::given(method("GET"))
        .and(path("/rest/v1/medical_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let result = handlers::update_medical_record(
        State(config),
        create_auth_header(&token),
        create_test_user_extension("doctor", &Uuid::new_v4().to_string()),
        Path(record_id),
        Json(UpdateMedicalRecordRequest::default()),
    ).await;

    let Json(body) = result.unwrap();
    assert_eq!(body["diagnosis"], json!("Migraña"));
}

#[tokio::test]
async fn test_delete_record_requires_privileged_role() {
    let mock_server = MockServer::start().await;
    let (config, token) = test_context(&mock_server).await;

    let result = handlers::delete_medical_record(
        State(config),
        create_auth_header(&token),
        create_test_user_extension("authenticated", &Uuid::new_v4().to_string()),
        Path(Uuid::new_v4()),
    ).await;

    assert_matches!(result.unwrap_err(), AppError::Auth(_));
}

#[tokio::test]
async fn test_delete_record_removes_row() {
    let mock_server = MockServer::start().await;
    let (config, token) = test_context(&mock_server).await;

    let record_id = Uuid::new_v4();
    let row = MockSupabaseResponses::medical_record_response(
        &record_id.to_string(),
        &Uuid::new_v4().to_string(),
    );

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/medical_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let result = handlers::delete_medical_record(
        State(config),
        create_auth_header(&token),
        create_test_user_extension("admin", &Uuid::new_v4().to_string()),
        Path(record_id),
    ).await;

    let Json(body) = result.unwrap();
    assert_eq!(body["success"], json!(true));
}
