//! Integration tests for the provisioning API client.
//!
//! These tests run the client against a `wiremock` server standing in for
//! the remote provisioning service.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mailprov_api::{ApiConfig, DeleteOutcome, Error, ProvisioningApi};

fn client(server: &MockServer) -> ProvisioningApi {
    let config = ApiConfig::new(server.uri(), "svc", "secret", "example.com").unwrap();
    ProvisioningApi::new(config).unwrap()
}

fn mailbox_body(with_password: bool) -> serde_json::Value {
    let mut body = json!({
        "email": "john@example.com",
        "imap": {"host": "imap.example.com", "port": 993, "sslMode": "TLS", "username": "john@example.com"},
        "smtp": {"host": "smtp.example.com", "port": 465, "sslMode": "SSL", "username": "john@example.com"}
    });
    if with_password {
        body["imap"]["password"] = json!("s3cret");
        body["smtp"]["password"] = json!("s3cret");
    }
    body
}

#[tokio::test]
async fn create_sends_local_part_and_domain() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/user-1/mailbox"))
        .and(basic_auth("svc", "secret"))
        .and(body_json(json!({"localPart": "john", "domain": "example.com"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(mailbox_body(true)))
        .expect(1)
        .mount(&server)
        .await;

    let mailbox = client(&server).create_mailbox("user-1", "john").await.unwrap();
    assert_eq!(mailbox.email, "john@example.com");
    assert_eq!(mailbox.imap.password.as_deref(), Some("s3cret"));
    assert_eq!(mailbox.smtp.port, 465);
}

#[tokio::test]
async fn create_conflict_is_reported_as_409() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/user-1/mailbox"))
        .respond_with(ResponseTemplate::new(409).set_body_string("mailbox already exists"))
        .mount(&server)
        .await;

    let err = client(&server).create_mailbox("user-1", "john").await.unwrap_err();
    assert!(err.is_conflict());
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "mailbox already exists");
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_error_body_uses_reason_phrase() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/user-1/mailbox"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client(&server).create_mailbox("user-1", "john").await.unwrap_err();
    assert!(err.is_server_error());
    assert!(err.to_string().contains("Bad Gateway"));
}

#[tokio::test]
async fn get_returns_mailbox_without_password() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/user-1/mailbox"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mailbox_body(false)))
        .mount(&server)
        .await;

    let mailbox = client(&server).get_mailbox("user-1").await.unwrap().unwrap();
    assert_eq!(mailbox.email, "john@example.com");
    assert!(mailbox.imap.password.is_none());
    assert!(mailbox.smtp.password.is_none());
}

#[tokio::test]
async fn get_not_found_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/nobody/mailbox"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(client(&server).get_mailbox("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn get_server_error_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/user-1/mailbox"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server).get_mailbox("user-1").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn delete_is_idempotent() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/users/user-1/mailbox"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/users/user-2/mailbox"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let api = client(&server);
    assert_eq!(api.delete_mailbox("user-1").await.unwrap(), DeleteOutcome::Deleted);
    assert_eq!(api.delete_mailbox("user-2").await.unwrap(), DeleteOutcome::NotFound);
}

#[tokio::test]
async fn delete_forbidden_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/users/user-1/mailbox"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let err = client(&server).delete_mailbox("user-1").await.unwrap_err();
    assert_eq!(err.status(), Some(403));
}

#[tokio::test]
async fn reset_password_returns_new_password() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/user-1/mailbox/password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"password": "fresh"})))
        .mount(&server)
        .await;

    let password = client(&server).reset_password("user-1").await.unwrap();
    assert_eq!(password, "fresh");
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/user-1/mailbox"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).get_mailbox("user-1").await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}
