//! HTTP API tests
//!
//! Drives the full router against the in-memory store:
//! - authentication and user administration
//! - company CRUD and the ownership policy
//! - questionnaire answers, ROI and exports
//! - data file export/import

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use roi_server::{
    config::Config, create_app, services::AuthService, storage::MemoryStore, AppState, DynStore,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "api-test-secret-0123456789";
const ADMIN_PASSWORD: &str = "admin-password";
const USER_PASSWORD: &str = "user-password";

struct TestApp {
    app: Router,
}

impl TestApp {
    async fn new() -> Self {
        let store: DynStore = Arc::new(MemoryStore::new());
        let config = Config::in_memory(SECRET);
        AuthService::new(store.clone(), &config)
            .ensure_bootstrap_admin("admin", ADMIN_PASSWORD)
            .await
            .unwrap();

        Self {
            app: create_app(AppState::new(store, config)),
        }
    }

    async fn raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, bytes.to_vec())
    }

    async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, _, bytes) = self.raw(method, uri, token, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Send a body as-is, for payloads that are not valid JSON
    async fn send_text(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn admin_token(&self) -> String {
        self.login("admin", ADMIN_PASSWORD).await
    }

    /// Create a regular user and return their token
    async fn user_token(&self, username: &str) -> String {
        let admin = self.admin_token().await;
        let (status, _) = self
            .request(
                "POST",
                "/api/auth/users",
                Some(&admin),
                Some(json!({ "username": username, "password": USER_PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        self.login(username, USER_PASSWORD).await
    }

    async fn create_company(&self, token: &str, name: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/companies",
                Some(token),
                Some(json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

fn fixture_answers() -> Value {
    let mut answers = json!({
        "annual_revenue": "10",
        "fte_count": 50,
        "cost_per_fte": 50,
        "annual_waste_value": 200,
        "transportation_cost": 500,
        "warehouse_size": 100000,
        "license_cost": 0.5,
        "implementation_cost": 0.5
    });
    for question in shared::QUESTIONS.iter().filter(|q| q.category.is_assessment()) {
        answers[question.id] = json!(2);
    }
    answers
}

// ============================================================================
// Public endpoints
// ============================================================================

#[tokio::test]
async fn test_health_and_root() {
    let app = TestApp::new().await;

    let (status, body) = app.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "connected");

    let (status, _, bytes) = app.raw("GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(bytes).unwrap().contains("Warehouse ROI"));
}

#[tokio::test]
async fn test_question_catalogue_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app.request("GET", "/api/questions", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let questions = body.as_array().unwrap();
    assert_eq!(questions.len(), shared::QUESTIONS.len());
    assert!(questions.iter().any(|q| q["id"] == "annual_revenue" && q["unit"] == "millions"));
    assert!(questions.iter().any(|q| q["type"] == "radio"));
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new().await;

    let (status, body) = app.request("GET", "/api/companies", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, body) = app
        .request("GET", "/api/companies", Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let app = TestApp::new().await;
    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "admin", "password": "nope-nope" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_user_administration() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let alice = app.user_token("alice").await;

    let (status, me) = app.request("GET", "/api/auth/me", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert_eq!(me["role"], "user");
    assert!(me.get("password_hash").is_none());

    // Regular users cannot manage accounts
    let (status, _) = app
        .request(
            "POST",
            "/api/auth/users",
            Some(&alice),
            Some(json!({ "username": "mallory", "password": USER_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Duplicate usernames conflict
    let (status, body) = app
        .request(
            "POST",
            "/api/auth/users",
            Some(&admin),
            Some(json!({ "username": "alice", "password": USER_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "DUPLICATE_ENTRY");

    let (status, users) = app.request("GET", "/api/auth/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);

    let alice_id = me["id"].as_str().unwrap();
    let (status, _) = app
        .request("DELETE", &format!("/api/auth/users/{}", alice_id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": USER_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Companies and questionnaire
// ============================================================================

#[tokio::test]
async fn test_company_crud_round_trip() {
    let app = TestApp::new().await;
    let alice = app.user_token("alice").await;
    let id = app.create_company(&alice, "Acme").await;

    let (status, body) = app
        .request(
            "PUT",
            &format!("/api/companies/{}", id),
            Some(&alice),
            Some(json!({ "name": "Acme Logistics" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Acme Logistics");

    let data = json!({ "notes": "pilot", "sites": 3 });
    let (status, _) = app
        .request(
            "POST",
            &format!("/api/companies/{}/data", id),
            Some(&alice),
            Some(data.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, fetched) = app
        .request("GET", &format!("/api/companies/{}/data", id), Some(&alice), None)
        .await;
    assert_eq!(fetched, data);

    let (status, _) = app
        .request("DELETE", &format!("/api/companies/{}", id), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .request("GET", &format!("/api/companies/{}", id), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_companies_are_scoped_to_owner() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let alice = app.user_token("alice").await;
    let bob = app.user_token("bob").await;
    let id = app.create_company(&alice, "Acme").await;

    let (_, list) = app.request("GET", "/api/companies", Some(&bob), None).await;
    assert!(list.as_array().unwrap().is_empty());

    for (method, uri, body) in [
        ("GET", format!("/api/companies/{}", id), None),
        ("GET", format!("/api/questionnaire/{}", id), None),
        ("GET", format!("/api/companies/{}/roi", id), None),
        (
            "PUT",
            format!("/api/companies/{}", id),
            Some(json!({ "name": "Taken" })),
        ),
        (
            "POST",
            format!("/api/questionnaire/{}", id),
            Some(json!({ "inv_accuracy": 1 })),
        ),
        ("DELETE", format!("/api/companies/{}", id), None),
    ] {
        let (status, _) = app.request(method, &uri, Some(&bob), body).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, uri);
    }

    let (_, company) = app
        .request("GET", &format!("/api/companies/{}", id), Some(&alice), None)
        .await;
    assert_eq!(company["name"], "Acme");
    let (_, answers) = app
        .request("GET", &format!("/api/questionnaire/{}", id), Some(&alice), None)
        .await;
    assert!(answers.get("inv_accuracy").is_none());

    let (_, list) = app.request("GET", "/api/companies", Some(&admin), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    let (status, _) = app
        .request("GET", &format!("/api/companies/{}", id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_answers_round_trip_and_roi() {
    let app = TestApp::new().await;
    let alice = app.user_token("alice").await;
    let id = app.create_company(&alice, "Acme").await;
    let answers = fixture_answers();

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/questionnaire/{}", id),
            Some(&alice),
            Some(answers.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, fetched) = app
        .request("GET", &format!("/api/questionnaire/{}", id), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, answers);

    let (status, roi) = app
        .request("GET", &format!("/api/companies/{}/roi", id), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        decimal(&roi["summary"]["annual_savings"]),
        Decimal::from(875_625)
    );
    assert_eq!(decimal(&roi["summary"]["roi_percent"]), Decimal::new(16269, 2));
    assert_eq!(roi["summary"]["payback_period_months"], 14);
    assert_eq!(roi["summary"]["maturity_level"], "defined");
    assert_eq!(roi["improvement_areas"][0]["category"], "labor_management");
}

#[tokio::test]
async fn test_invalid_answers_rejected() {
    let app = TestApp::new().await;
    let alice = app.user_token("alice").await;
    let id = app.create_company(&alice, "Acme").await;

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/questionnaire/{}", id),
            Some(&alice),
            Some(json!({ "inv_accuracy": 7 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "inv_accuracy");
}

#[tokio::test]
async fn test_malformed_json_uses_error_envelope() {
    let app = TestApp::new().await;
    let alice = app.user_token("alice").await;
    let id = app.create_company(&alice, "Acme").await;

    let (status, body) = app
        .send_text("POST", "/api/auth/login", None, r#"{"username": 1"#)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "body");

    let (status, body) = app
        .send_text(
            "POST",
            &format!("/api/questionnaire/{}", id),
            Some(&alice),
            "[1, 2",
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Well-formed JSON of the wrong shape
    let (status, body) = app
        .send_text("POST", "/api/auth/login", None, r#"{"username": 1}"#)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_stateless_calculation() {
    let app = TestApp::new().await;
    let alice = app.user_token("alice").await;

    let (status, roi) = app
        .request("POST", "/api/roi/calculate", Some(&alice), Some(fixture_answers()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roi["savings_breakdown"].as_array().unwrap().len(), 8);
    assert_eq!(roi["projections"].as_array().unwrap().len(), 3);
    assert_eq!(
        decimal(&roi["summary"]["total_investment"]),
        Decimal::from(1_000_000)
    );
}

// ============================================================================
// Exports
// ============================================================================

#[tokio::test]
async fn test_roi_csv_and_excel_exports() {
    let app = TestApp::new().await;
    let alice = app.user_token("alice").await;
    let id = app.create_company(&alice, "Acme").await;
    app.request(
        "POST",
        &format!("/api/questionnaire/{}", id),
        Some(&alice),
        Some(fixture_answers()),
    )
    .await;

    let (status, headers, bytes) = app
        .raw(
            "GET",
            &format!("/api/companies/{}/roi/export?format=csv", id),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
    let csv = String::from_utf8(bytes).unwrap();
    assert!(csv.starts_with("section,item,amount,percentage"));
    assert!(csv.contains("Payback period (months),14"));

    let (status, headers, bytes) = app
        .raw(
            "GET",
            &format!("/api/questionnaire/{}/export", id),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .contains("spreadsheetml"));
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn test_data_file_export_and_import() {
    let app = TestApp::new().await;
    let alice = app.user_token("alice").await;
    let bob = app.user_token("bob").await;
    let id = app.create_company(&alice, "Acme").await;
    app.request(
        "POST",
        &format!("/api/questionnaire/{}", id),
        Some(&alice),
        Some(json!({ "inv_accuracy": 3 })),
    )
    .await;

    let (status, file) = app.request("GET", "/api/export", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(file["version"], "1.0");
    assert!(file["exportDate"].is_string());
    assert_eq!(file["companies"].as_array().unwrap().len(), 1);
    assert_eq!(file["answers"][&id]["inv_accuracy"], 3);

    let (status, summary) = app
        .request("POST", "/api/import", Some(&bob), Some(file))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(summary["imported_companies"], 1);
    assert_eq!(summary["imported_answers"], 1);

    let new_id = summary["companies"][0]["id"].as_str().unwrap().to_string();
    assert_ne!(new_id, id);
    assert_eq!(summary["companies"][0]["created_by"], "bob");

    let (status, answers) = app
        .request("GET", &format!("/api/questionnaire/{}", new_id), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(answers["inv_accuracy"], 3);
}
