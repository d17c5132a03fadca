//! HTTP request handlers for the mock server.

pub mod env_vars;
pub mod projects;

pub use env_vars::*;
pub use projects::*;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::id::ProjectRef;
use crate::mock_server::state::{MockError, MockState};

pub type SharedState = Arc<RwLock<MockState>>;

/// Query parameters every endpoint accepts.
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    #[serde(rename = "circle-token")]
    pub circle_token: Option<String>,
}

/// CircleCI-style `{"message": ...}` error response.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "message": message.into() })),
    )
        .into_response()
}

pub(crate) fn mock_error_response(err: &MockError) -> Response {
    error_response(StatusCode::NOT_FOUND, err.message())
}

/// Reject requests without the required token.
pub(crate) fn check_token(state: &MockState, query: &TokenQuery) -> Result<(), Response> {
    if state.authorized(query.circle_token.as_deref()) {
        Ok(())
    } else {
        Err(error_response(StatusCode::UNAUTHORIZED, "You must log in first."))
    }
}

/// Build a project reference from path segments.
pub(crate) fn project_ref(vcs: &str, account: String, repo: String) -> Result<ProjectRef, Response> {
    let vcs_type = vcs
        .parse()
        .map_err(|_| error_response(StatusCode::NOT_FOUND, format!("Unknown vcs type: {vcs}")))?;
    Ok(ProjectRef::new(vcs_type, account, repo))
}
