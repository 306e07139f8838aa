//! ApiClient behaviour against a scripted transport

use serde_json::json;
use std::time::Duration;
use ticketload_http::{
    ApiClient, ApiResponse, ClientConfig, HttpError, HttpMethod, MockTransport, RetryPolicy,
    TransportError,
};
use tokio::time::Instant;

const BASE: &str = "https://host";

fn client_with(mock: &MockTransport, retry: RetryPolicy) -> ApiClient<MockTransport> {
    let config = ClientConfig::new(BASE).with_retry_policy(retry);
    ApiClient::with_transport(config, mock.clone()).unwrap()
}

fn token_response(token: &str) -> ApiResponse {
    ApiResponse::from_json(200, &json!({"token": token, "email": "admin@example.com"}))
}

#[tokio::test(start_paused = true)]
async fn test_transient_status_uses_every_attempt() {
    let mock = MockTransport::new();
    mock.respond_with(ApiResponse::from_text(503, "unavailable"));
    let client = client_with(&mock, RetryPolicy::default());

    let response = client.get("/api/tickets", None).await.unwrap();

    assert_eq!(response.status(), 503);
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_two_failures_then_success() {
    let mock = MockTransport::new();
    mock.push_error(TransportError::Connect("connection refused".into()))
        .push_response(ApiResponse::from_text(502, "bad gateway"))
        .push_response(ApiResponse::from_json(200, &json!([{"id": 1}])));
    let client = client_with(&mock, RetryPolicy::default().with_total(3).with_backoff_factor(1.0));
    let started = Instant::now();

    let response = client.get("/api/tickets", None).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(mock.call_count(), 3);
    assert!(started.elapsed() >= Duration::from_secs(2));
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    for status in [400, 401, 403, 404] {
        let mock = MockTransport::new();
        mock.respond_with(ApiResponse::from_text(status, ""));
        let client = client_with(&mock, RetryPolicy::default());

        let response = client.delete("/api/tickets/999999").await.unwrap();

        assert_eq!(response.status(), status);
        assert_eq!(mock.call_count(), 1, "status {} was retried", status);
    }
}

#[tokio::test(start_paused = true)]
async fn test_connection_failure_surfaces_after_retries() {
    let mock = MockTransport::new();
    mock.respond_with(ApiResponse::from_text(200, "never reached"));
    for _ in 0..3 {
        mock.push_error(TransportError::Connect("connection refused".into()));
    }
    let client = client_with(&mock, RetryPolicy::default());

    let err = client.get("/api/tickets", None).await.unwrap_err();

    assert!(matches!(err, HttpError::RetriesExhausted { attempts: 3, .. }));
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test]
async fn test_timeout_on_post_is_not_retried() {
    let mock = MockTransport::new();
    mock.push_error(TransportError::Timeout("30s elapsed".into()))
        .respond_with(ApiResponse::from_text(201, "created"));
    let client = client_with(&mock, RetryPolicy::default());

    let err = client
        .post("/api/tickets", Some(&json!({"titulo": "x"})))
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::Transport(TransportError::Timeout(_))));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retry_after_is_honoured() {
    let mock = MockTransport::new();
    mock.push_response(
        ApiResponse::from_text(429, "slow down")
            .with_header("Retry-After", "5")
            .unwrap(),
    )
    .push_response(ApiResponse::from_text(200, "ok"));
    let client = client_with(&mock, RetryPolicy::default());
    let started = Instant::now();

    let response = client.get("/api/tickets", None).await.unwrap();

    assert_eq!(response.status(), 200);
    assert!(started.elapsed() >= Duration::from_secs(5));
}

#[tokio::test]
async fn test_login_success_injects_bearer() {
    let mock = MockTransport::new();
    mock.push_response(token_response("abc.def.ghi"))
        .respond_with(ApiResponse::from_json(200, &json!([])));
    let mut client = client_with(&mock, RetryPolicy::default());

    assert!(client.login("admin@example.com", "secret").await.unwrap());
    assert_eq!(client.token(), Some("abc.def.ghi"));
    assert!(client.is_authenticated());

    client.get("/api/tickets/mis-tickets", None).await.unwrap();
    client.post("/api/tickets", Some(&json!({"titulo": "t"}))).await.unwrap();
    client.put("/api/tickets/1", Some(&json!({"estado": "CERRADO"}))).await.unwrap();
    client.delete("/api/tickets/1").await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 5);

    let login = &requests[0];
    assert_eq!(login.method, HttpMethod::Post);
    assert_eq!(login.url, "https://host/api/auth/login");
    assert_eq!(
        login.body,
        Some(json!({"email": "admin@example.com", "password": "secret"}))
    );
    assert!(login.header("authorization").is_none());

    for request in &requests[1..] {
        assert_eq!(request.header("authorization"), Some("Bearer abc.def.ghi"));
        assert_eq!(request.header("content-type"), Some("application/json"));
    }
}

#[tokio::test]
async fn test_login_without_token_fails_cleanly() {
    let mock = MockTransport::new();
    mock.push_response(ApiResponse::from_json(200, &json!({"message": "ok"})))
        .respond_with(ApiResponse::from_text(401, ""));
    let mut client = client_with(&mock, RetryPolicy::default());

    assert!(!client.login("admin@example.com", "secret").await.unwrap());
    assert!(!client.is_authenticated());
    assert!(client.default_headers().is_empty());

    client.get("/api/tickets", None).await.unwrap();
    assert!(mock.last_request().unwrap().header("authorization").is_none());
}

#[tokio::test]
async fn test_login_unauthorized_is_not_retried() {
    let mock = MockTransport::new();
    mock.respond_with(ApiResponse::from_json(401, &json!({"error": "Bad credentials"})));
    let mut client = client_with(&mock, RetryPolicy::default());

    assert!(!client.login("admin@example.com", "wrong").await.unwrap());
    assert_eq!(mock.call_count(), 1);
    assert!(client.token().is_none());
}

#[tokio::test]
async fn test_login_transient_status_is_not_retried() {
    let mock = MockTransport::new();
    mock.respond_with(ApiResponse::from_text(503, ""));
    let mut client = client_with(&mock, RetryPolicy::default());

    assert!(!client.login("admin@example.com", "secret").await.unwrap());
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_login_retries_connect_failures() {
    let mock = MockTransport::new();
    mock.push_error(TransportError::Connect("connection refused".into()))
        .push_response(token_response("tok"));
    let mut client = client_with(&mock, RetryPolicy::default());

    assert!(client.login("admin@example.com", "secret").await.unwrap());
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn test_failed_relogin_keeps_previous_session() {
    let mock = MockTransport::new();
    mock.push_response(token_response("first"))
        .push_response(ApiResponse::from_text(401, ""));
    let mut client = client_with(&mock, RetryPolicy::default());

    assert!(client.login("admin@example.com", "secret").await.unwrap());
    assert!(!client.login("admin@example.com", "wrong").await.unwrap());
    assert_eq!(client.token(), Some("first"));
}

#[tokio::test]
async fn test_logout_drops_auth_header() {
    let mock = MockTransport::new();
    mock.push_response(token_response("abc"))
        .respond_with(ApiResponse::from_text(200, ""));
    let mut client = client_with(&mock, RetryPolicy::default());

    assert!(client.login("admin@example.com", "secret").await.unwrap());
    client.logout();
    assert!(!client.is_authenticated());

    client.get("/api/tickets", None).await.unwrap();
    assert!(mock.last_request().unwrap().header("authorization").is_none());
}

#[tokio::test]
async fn test_custom_auth_path() {
    let mock = MockTransport::new();
    mock.add_route(
        HttpMethod::Post,
        "https://host/auth/signin",
        token_response("custom"),
    );
    let config = ClientConfig::new("https://host/").with_auth_path("/auth/signin");
    let mut client = ApiClient::with_transport(config, mock.clone()).unwrap();

    assert!(client.login("admin@example.com", "secret").await.unwrap());
    assert_eq!(client.token(), Some("custom"));
}

#[tokio::test]
async fn test_get_params_and_timeout_reach_transport() {
    let mock = MockTransport::new();
    mock.respond_with(ApiResponse::from_json(200, &json!({"content": []})));
    let config = ClientConfig::new(BASE).with_timeout(Duration::from_secs(5));
    let client = ApiClient::with_transport(config, mock.clone()).unwrap();

    client
        .get("/api/tickets", Some(&[("page", "0"), ("size", "10")]))
        .await
        .unwrap();

    let request = mock.last_request().unwrap();
    assert_eq!(
        request.query,
        vec![
            ("page".to_string(), "0".to_string()),
            ("size".to_string(), "10".to_string())
        ]
    );
    assert_eq!(request.timeout, Duration::from_secs(5));
    assert!(request.body.is_none());
}

#[tokio::test]
async fn test_clients_do_not_share_sessions() {
    let first_mock = MockTransport::new();
    first_mock
        .push_response(token_response("first"))
        .respond_with(ApiResponse::from_text(200, ""));
    let second_mock = MockTransport::new();
    second_mock.respond_with(ApiResponse::from_text(200, ""));

    let mut first = client_with(&first_mock, RetryPolicy::default());
    let second = client_with(&second_mock, RetryPolicy::default());

    assert!(first.login("a@example.com", "x").await.unwrap());
    second.get("/api/tickets", None).await.unwrap();

    assert!(!second.is_authenticated());
    assert!(second_mock.last_request().unwrap().header("authorization").is_none());
}
