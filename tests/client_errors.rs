//! Response classification and debug logging.

use std::sync::{Arc, Mutex};

use circleci_project::{ApiError, CircleCiClient, CircleCiError, ProjectRef};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_url(server: &MockServer) -> String {
    format!("{}/api/v1.1/", server.uri())
}

async fn list_projects_with(response: ResponseTemplate) -> CircleCiError {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1.1/projects"))
        .respond_with(response)
        .mount(&server)
        .await;

    let client = CircleCiClient::new("test-token", &api_url(&server)).unwrap();
    client.list_projects().await.unwrap_err()
}

#[tokio::test]
async fn test_error_with_message_body() {
    let err = list_projects_with(
        ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "You must log in first."
        })),
    )
    .await;

    assert_eq!(
        err.api_error(),
        Some(&ApiError::with_message(401, "You must log in first."))
    );
    assert_eq!(err.to_string(), "CircleCI API error: 401: You must log in first.");
}

#[tokio::test]
async fn test_error_with_empty_body() {
    let err = list_projects_with(ResponseTemplate::new(500)).await;

    assert_eq!(err.api_error(), Some(&ApiError::status(500)));
}

#[tokio::test]
async fn test_error_with_unparseable_body() {
    let err = list_projects_with(
        ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"),
    )
    .await;

    let api = err.api_error().unwrap();
    assert_eq!(api.status_code, 502);
    assert!(api
        .message
        .as_deref()
        .unwrap()
        .starts_with("unable to parse API response: "));
}

#[tokio::test]
async fn test_redirect_status_is_an_error() {
    let err = list_projects_with(
        ResponseTemplate::new(304).set_body_json(serde_json::json!({"message": "moved"})),
    )
    .await;

    assert_eq!(err.api_error().unwrap().status_code, 304);
}

#[tokio::test]
async fn test_not_found_status_is_not_a_lookup_miss() {
    let err = list_projects_with(
        ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "Not found"})),
    )
    .await;

    // Only an absent project in the followed list means "gone"
    assert!(!err.is_not_found());
    assert_eq!(err.api_error().unwrap().status_code, 404);
}

#[tokio::test]
async fn test_debug_logger_receives_redacted_dumps() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1.1/project/github/acme/widgets/envvar/API_TOKEN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "ok"
        })))
        .mount(&server)
        .await;

    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = seen.clone();

    let client = CircleCiClient::builder("super-secret-token")
        .base_url(api_url(&server))
        .debug(true)
        .logger(move |message: &str| sink.lock().unwrap().push(message.to_string()))
        .build()
        .unwrap();
    assert!(client.is_debug());

    client
        .delete_env_var(&ProjectRef::github("acme", "widgets"), "API_TOKEN")
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    let all = seen.join("\n");
    assert!(seen.len() >= 3);
    assert!(all.contains("DELETE "));
    assert!(all.contains("circle-token=REDACTED"));
    assert!(all.contains("HTTP 200 OK"));
    assert!(!all.contains("super-secret-token"));
}

#[tokio::test]
async fn test_debug_disabled_logs_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1.1/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = seen.clone();

    let client = CircleCiClient::builder("test-token")
        .base_url(api_url(&server))
        .logger(move |message: &str| sink.lock().unwrap().push(message.to_string()))
        .build()
        .unwrap();

    client.list_projects().await.unwrap();
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    let client = CircleCiClient::new("test-token", "http://127.0.0.1:1/api/v1.1/").unwrap();
    let err = client.list_projects().await.unwrap_err();

    assert!(matches!(err, CircleCiError::HttpError(_)));
}
