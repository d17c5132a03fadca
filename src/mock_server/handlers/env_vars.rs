//! Environment variable endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::{check_token, mock_error_response, project_ref, SharedState, TokenQuery};
use crate::models::EnvVar;

/// GET /project/{vcs}/{account}/{repo}/envvar
pub async fn list_env_vars(
    State(state): State<SharedState>,
    Path((vcs, account, repo)): Path<(String, String, String)>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let state = state.read().await;
    if let Err(resp) = check_token(&state, &query) {
        return resp;
    }
    let project = match project_ref(&vcs, account, repo) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match state.list_env_vars(&project) {
        Ok(vars) => (StatusCode::OK, Json(vars)).into_response(),
        Err(err) => mock_error_response(&err),
    }
}

/// POST /project/{vcs}/{account}/{repo}/envvar
pub async fn add_env_var(
    State(state): State<SharedState>,
    Path((vcs, account, repo)): Path<(String, String, String)>,
    Query(query): Query<TokenQuery>,
    Json(var): Json<EnvVar>,
) -> Response {
    let mut state = state.write().await;
    if let Err(resp) = check_token(&state, &query) {
        return resp;
    }
    let project = match project_ref(&vcs, account, repo) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match state.add_env_var(&project, var) {
        Ok(masked) => (StatusCode::CREATED, Json(masked)).into_response(),
        Err(err) => mock_error_response(&err),
    }
}

/// DELETE /project/{vcs}/{account}/{repo}/envvar/{name}
pub async fn delete_env_var(
    State(state): State<SharedState>,
    Path((vcs, account, repo, name)): Path<(String, String, String, String)>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let mut state = state.write().await;
    if let Err(resp) = check_token(&state, &query) {
        return resp;
    }
    let project = match project_ref(&vcs, account, repo) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match state.delete_env_var(&project, &name) {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "message": "ok" }))).into_response(),
        Err(err) => mock_error_response(&err),
    }
}
