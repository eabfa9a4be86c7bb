//! Mock HTTP tests for BoothClient.
//!
//! These tests cover:
//! - Login and the profile fetch that follows it
//! - Bearer token refresh on 401 with a single retry
//! - Event pagination query parameters
//! - PIN verification outcomes
//! - Multipart media upload

use std::io::Write;

use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use selfie_booth::api::{ApiError, BoothClient, EventTab, MediaType, TokenPair};

fn client_for(server: &MockServer) -> BoothClient {
    BoothClient::new(&format!("{}/api/", server.uri())).unwrap()
}

fn logged_in_client(server: &MockServer, access: &str) -> BoothClient {
    let client = client_for(server);
    client.set_tokens(TokenPair {
        access: access.to_string(),
        refresh: "refresh-1".to_string(),
    });
    client
}

fn events_body(count: u64) -> serde_json::Value {
    json!({
        "count": count,
        "data": [
            {
                "id": 1,
                "name": "Summer Gala",
                "date": "2026-07-01T19:00:00Z",
                "location": "Rooftop",
                "description": "Drinks and photos",
                "package": { "name": "Premium" }
            },
            {
                "id": 2,
                "name": "Launch",
                "date": "2026-07-03",
                "location": "Office"
            }
        ]
    })
}

// === Login ===

#[tokio::test]
async fn test_login_stores_tokens_and_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/create/"))
        .and(body_json(json!({ "email": "ada@example.com", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "a1", "refresh": "r1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users/me/"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 5, "name": "Ada", "email": "ada@example.com" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let user = client.login("ada@example.com", "pw").await.unwrap();

    assert_eq!(user.display_name(), "Ada");
    assert!(client.is_authenticated());
    let tokens = client.tokens().unwrap();
    assert_eq!(tokens.access, "a1");
    assert_eq!(tokens.refresh, "r1");
    assert_eq!(client.user().and_then(|u| u.id), Some(5));

    client.logout();
    assert!(!client.is_authenticated());
    assert!(client.user().is_none());
}

#[tokio::test]
async fn test_login_rejected_is_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/create/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "No active account" })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.login("ada@example.com", "wrong").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredentials));
    assert_eq!(err.to_string(), "Invalid email or password");
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_login_falls_back_to_email_when_profile_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/create/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "a1", "refresh": "r1" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users/me/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let user = client.login("ada@example.com", "pw").await.unwrap();
    assert_eq!(user.display_name(), "ada@example.com");
}

// === Refresh on 401 ===

#[tokio::test]
async fn test_401_refreshes_and_retries_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/refresh/"))
        .and(body_json(json!({ "refresh": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body(2)["data"].clone()))
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "stale");
    let events = client.get_events().await.unwrap();

    assert_eq!(events.len(), 2);
    let tokens = client.tokens().unwrap();
    assert_eq!(tokens.access, "fresh");
    assert_eq!(tokens.refresh, "refresh-1");
}

#[tokio::test]
async fn test_failed_refresh_returns_original_401_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/7/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/refresh/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "stale");
    let err = client.get_event(7).await.unwrap_err();
    assert!(err.is_unauthorized(), "unexpected error: {}", err);
}

#[tokio::test]
async fn test_second_401_is_not_retried_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/templates/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "stale");
    let err = client.get_templates(None).await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_requests_without_login_fail_fast() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    assert!(matches!(client.get_events().await, Err(ApiError::NotAuthenticated)));
    assert!(matches!(client.refresh().await, Err(ApiError::NotAuthenticated)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

// === Events ===

#[tokio::test]
async fn test_paginated_events_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "10"))
        .and(query_param("date_filter", "lt"))
        .and(query_param("search", "gala"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body(25)))
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "a1");
    let page = client
        .get_events_paginated(2, 10, Some(EventTab::Past), Some("  gala "))
        .await
        .unwrap();

    assert_eq!(page.count, 25);
    assert_eq!(page.total_pages(10), 3);
    assert_eq!(page.data[0].package_name(), "Premium");
    assert_eq!(page.data[1].package_name(), "-");
    assert_eq!(
        page.data[1].parsed_date().map(|d| d.format("%b %d, %Y").to_string()),
        Some("Jul 03, 2026".to_string())
    );
}

#[tokio::test]
async fn test_event_server_error_is_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/3/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "a1");
    match client.get_event(3).await {
        Err(ApiError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("unexpected result {:?}", other.map(|e| e.id)),
    }
}

// === PIN ===

#[tokio::test]
async fn test_verify_pin_outcomes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/events/1/verify_pin/"))
        .and(body_json(json!({ "pin": "1234" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "valid": true })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/events/1/verify_pin/"))
        .and(body_json(json!({ "pin": "0000" })))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/events/1/verify_pin/"))
        .and(body_json(json!({ "pin": "9999" })))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "a1");
    assert!(client.verify_event_pin(1, "1234").await.unwrap());
    assert!(!client.verify_event_pin(1, "0000").await.unwrap());
    assert!(client.verify_event_pin(1, "9999").await.is_err());
}

// === Upload ===

#[tokio::test]
async fn test_upload_sends_multipart_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/events/9/media/"))
        .and(header("authorization", "Bearer a1"))
        .and(body_string_contains("name=\"media_type\""))
        .and(body_string_contains("boomerang"))
        .and(body_string_contains("name=\"template_id\""))
        .and(body_string_contains("filename=\"loop.gif\""))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("loop.gif");
    std::fs::File::create(&file).unwrap().write_all(b"GIF89a").unwrap();

    let client = logged_in_client(&server, "a1");
    client
        .upload_media(9, &file, MediaType::Boomerang, Some(4))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_upload_missing_file() {
    let server = MockServer::start().await;
    let client = logged_in_client(&server, "a1");
    let err = client
        .upload_media(9, std::path::Path::new("/nonexistent/photo.jpg"), MediaType::Photo, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::MissingFile(_)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_upload_rejected_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/events/9/media/"))
        .respond_with(ResponseTemplate::new(413))
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("photo.jpg");
    std::fs::write(&file, b"\xFF\xD8\xFF").unwrap();

    let client = logged_in_client(&server, "a1");
    let err = client.upload_media(9, &file, MediaType::Photo, None).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 413, .. }));
}
