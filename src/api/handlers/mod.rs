use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use super::{AppState, RequestActor};
use crate::error::Error;
use crate::models::*;

type ApiResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Map a service error to a response.
///
/// Not-found and validation errors are the caller's and are returned as-is.
/// Anything else is logged in full and the client gets a generic message.
fn api_error(e: Error) -> (StatusCode, String) {
    if !e.is_client_error() {
        tracing::error!("Internal error: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        );
    }

    tracing::warn!("{}", e);
    let status = match e {
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, e.to_string())
}

fn created<T>(node: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(node))
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Projects
// ============================================================

pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    state.service.list_projects().map(Json).map_err(api_error)
}

pub async fn create_project(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Json(input): Json<CreateProjectInput>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    state
        .service
        .create_project(&actor, input)
        .map(created)
        .map_err(api_error)
}

pub async fn update_project(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProjectInput>,
) -> ApiResult<Json<Project>> {
    state
        .service
        .update_project(&actor, id, input)
        .map(Json)
        .map_err(api_error)
}

pub async fn project_tree(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TreeNode>> {
    state.service.project_tree(id).map(Json).map_err(api_error)
}

pub async fn recalculate_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    state
        .service
        .recalculate_project(id)
        .map(Json)
        .map_err(api_error)
}

// ============================================================
// Children
// ============================================================

pub async fn add_initiative(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(project_id): Path<Uuid>,
    Json(input): Json<CreateInitiativeInput>,
) -> ApiResult<(StatusCode, Json<Initiative>)> {
    state
        .service
        .add_initiative(&actor, project_id, input)
        .map(created)
        .map_err(api_error)
}

pub async fn add_goal(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(initiative_id): Path<Uuid>,
    Json(input): Json<CreateGoalInput>,
) -> ApiResult<(StatusCode, Json<Goal>)> {
    state
        .service
        .add_goal(&actor, initiative_id, input)
        .map(created)
        .map_err(api_error)
}

pub async fn add_objective(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(goal_id): Path<Uuid>,
    Json(input): Json<CreateObjectiveInput>,
) -> ApiResult<(StatusCode, Json<Objective>)> {
    state
        .service
        .add_objective(&actor, goal_id, input)
        .map(created)
        .map_err(api_error)
}

pub async fn add_key_result(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(objective_id): Path<Uuid>,
    Json(input): Json<CreateKeyResultInput>,
) -> ApiResult<(StatusCode, Json<KeyResult>)> {
    state
        .service
        .add_key_result(&actor, objective_id, input)
        .map(created)
        .map_err(api_error)
}

pub async fn add_action_item(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(key_result_id): Path<Uuid>,
    Json(input): Json<CreateActionItemInput>,
) -> ApiResult<(StatusCode, Json<ActionItem>)> {
    state
        .service
        .add_action_item(&actor, key_result_id, input)
        .map(created)
        .map_err(api_error)
}

// ============================================================
// Updates
// ============================================================

pub async fn update_initiative(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateInitiativeInput>,
) -> ApiResult<Json<Initiative>> {
    state
        .service
        .update_initiative(&actor, id, input)
        .map(Json)
        .map_err(api_error)
}

pub async fn update_goal(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateGoalInput>,
) -> ApiResult<Json<Goal>> {
    state
        .service
        .update_goal(&actor, id, input)
        .map(Json)
        .map_err(api_error)
}

pub async fn update_objective(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateObjectiveInput>,
) -> ApiResult<Json<Objective>> {
    state
        .service
        .update_objective(&actor, id, input)
        .map(Json)
        .map_err(api_error)
}

pub async fn update_key_result(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateKeyResultInput>,
) -> ApiResult<Json<KeyResult>> {
    state
        .service
        .update_key_result(&actor, id, input)
        .map(Json)
        .map_err(api_error)
}

pub async fn update_action_item(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateActionItemInput>,
) -> ApiResult<Json<ActionItem>> {
    state
        .service
        .update_action_item(&actor, id, input)
        .map(Json)
        .map_err(api_error)
}

// ============================================================
// Archive
// ============================================================

pub async fn list_archived(State(state): State<AppState>) -> ApiResult<Json<Vec<Node>>> {
    state.service.list_archived().map(Json).map_err(api_error)
}

/// `kind` accepts the snake or kebab form, e.g. `key_result` or `key-result`.
pub async fn restore(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path((kind, id)): Path<(NodeKind, Uuid)>,
) -> ApiResult<Json<Node>> {
    state
        .service
        .restore(&actor, kind, id)
        .map(Json)
        .map_err(api_error)
}
