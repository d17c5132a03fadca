//! Project endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::{check_token, mock_error_response, project_ref, SharedState, TokenQuery};
use crate::models::AwsKeypair;

/// Body of `PUT .../settings`.
#[derive(Debug, Deserialize)]
pub struct SettingsParams {
    #[serde(default)]
    pub aws: Option<AwsParams>,
}

#[derive(Debug, Deserialize)]
pub struct AwsParams {
    pub keypair: Option<AwsKeypair>,
}

/// GET /projects
pub async fn list_projects(
    State(state): State<SharedState>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let state = state.read().await;
    if let Err(resp) = check_token(&state, &query) {
        return resp;
    }

    (StatusCode::OK, Json(state.list_projects())).into_response()
}

/// POST /project/{vcs}/{account}/{repo}/follow
pub async fn follow_project(
    State(state): State<SharedState>,
    Path((vcs, account, repo)): Path<(String, String, String)>,
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

    let followed = state.follow(&project);

    let mut body = serde_json::to_value(&followed).unwrap_or_default();
    if let Some(obj) = body.as_object_mut() {
        obj.insert("following".to_string(), serde_json::Value::Bool(true));
    }
    (StatusCode::OK, Json(body)).into_response()
}

/// DELETE /project/{vcs}/{account}/{repo}/enable
pub async fn disable_project(
    State(state): State<SharedState>,
    Path((vcs, account, repo)): Path<(String, String, String)>,
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

    match state.disable(&project) {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "enabled": false }))).into_response(),
        Err(err) => mock_error_response(&err),
    }
}

/// PUT /project/{vcs}/{account}/{repo}/settings
pub async fn update_settings(
    State(state): State<SharedState>,
    Path((vcs, account, repo)): Path<(String, String, String)>,
    Query(query): Query<TokenQuery>,
    Json(params): Json<SettingsParams>,
) -> Response {
    let mut state = state.write().await;
    if let Err(resp) = check_token(&state, &query) {
        return resp;
    }
    let project = match project_ref(&vcs, account, repo) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let result = match params.aws {
        Some(aws) => state.set_aws(&project, aws.keypair),
        None => state.project_view(&project),
    };

    match result {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(err) => mock_error_response(&err),
    }
}
