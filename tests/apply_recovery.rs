//! State recorded when an apply fails part way through.

use circleci_project::cli::{read_state, record_apply, write_state};
use circleci_project::{CircleCiClient, ProjectSpec, Reconciler, VcsType};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn reconciler(server: &MockServer) -> Reconciler<CircleCiClient> {
    let client = CircleCiClient::new("test-token", &format!("{}/api/v1.1/", server.uri())).unwrap();
    Reconciler::new(client)
}

fn followed(repo: &str) -> serde_json::Value {
    serde_json::json!([{
        "username": "acme",
        "reponame": repo,
        "vcs_type": "github",
        "aws": {"keypair": null}
    }])
}

#[tokio::test]
async fn test_failed_configuration_still_records_followed_project() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.1/project/github/acme/widgets/follow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"following": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1.1/project/github/acme/widgets/envvar"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "message": "Internal error"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1.1/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(followed("widgets")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1.1/project/github/acme/widgets/envvar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    let spec = ProjectSpec::new(VcsType::Github, "acme", "widgets").with_variable("TOKEN", "s3cret");

    let outcome = reconciler(&server).apply(None, &spec).await;
    let err = record_apply(&state_path, outcome).unwrap_err();

    assert_eq!(err.api_error().map(|e| e.status_code), Some(500));
    let recorded = read_state(&state_path).unwrap().expect("state should be recorded");
    assert_eq!(recorded.id, "github:acme:widgets");
    assert!(recorded.variable.is_empty());
}

#[tokio::test]
async fn test_failed_replacement_forgets_disabled_project() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1.1/project/github/acme/widgets/enable"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1.1/project/github/acme/gadgets/follow"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");

    // State left behind by an earlier apply of github:acme:widgets
    let earlier: circleci_project::ProjectState = serde_json::from_value(serde_json::json!({
        "id": "github:acme:widgets",
        "vcs_type": "github",
        "account": "acme",
        "project": "widgets"
    }))
    .unwrap();
    write_state(&state_path, &earlier).unwrap();

    let moved = ProjectSpec::new(VcsType::Github, "acme", "gadgets");
    let outcome = reconciler(&server).apply(Some(&earlier), &moved).await;
    let err = record_apply(&state_path, outcome).unwrap_err();

    assert_eq!(err.api_error().map(|e| e.status_code), Some(500));
    assert!(!state_path.exists());
}

#[tokio::test]
async fn test_failure_before_any_change_leaves_state_alone() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.1/project/github/acme/widgets/follow"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "message": "Permission denied"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    let spec = ProjectSpec::new(VcsType::Github, "acme", "widgets");

    let outcome = reconciler(&server).apply(None, &spec).await;
    let err = record_apply(&state_path, outcome).unwrap_err();

    assert!(err.to_string().starts_with("error following project: "));
    assert!(read_state(&state_path).unwrap().is_none());
}

#[tokio::test]
async fn test_successful_apply_is_recorded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.1/project/github/acme/widgets/follow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"following": true})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1.1/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(followed("widgets")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1.1/project/github/acme/widgets/envvar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    // Parent directories are created on demand
    let state_path = dir.path().join("nested").join("state.json");
    let spec = ProjectSpec::new(VcsType::Github, "acme", "widgets");

    let outcome = reconciler(&server).apply(None, &spec).await;
    let state = record_apply(&state_path, outcome).unwrap();

    assert_eq!(read_state(&state_path).unwrap(), Some(state));
    assert!(!dir.path().join("nested").join("state.json.tmp").exists());
}
