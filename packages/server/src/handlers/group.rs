use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::judging::groups::GroupService;
use crate::models::group::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Groups",
    operation_id = "listJudgingGroups",
    summary = "List judging groups",
    responses(
        (status = 200, description = "All judging groups", body = Vec<GroupResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_groups(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<GroupResponse>>, AppError> {
    let groups = GroupService::new(&state.db).list().await?;
    Ok(Json(groups.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Groups",
    operation_id = "createJudgingGroup",
    summary = "Create a judging group",
    description = "New groups are active. Requires `manage_judging_groups`.",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = GroupResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(actor_id = auth_user.user_id(), name = %payload.name))]
pub async fn create_group(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateGroupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let group = GroupService::new(&state.db)
        .create(auth_user.actor(), &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(GroupResponse::from(group))))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Groups",
    operation_id = "updateJudgingGroup",
    summary = "Rename or (de)activate a judging group",
    description = "Inactive groups are skipped by future partitions; existing assignments stay. Requires `manage_judging_groups`.",
    params(("id" = i32, Path, description = "Group ID")),
    request_body = UpdateGroupRequest,
    responses(
        (status = 200, description = "Group updated", body = GroupResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Group not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(actor_id = auth_user.user_id()))]
pub async fn update_group(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateGroupRequest>,
) -> Result<Json<GroupResponse>, AppError> {
    if payload == UpdateGroupRequest::default() {
        return Err(AppError::Validation(
            "At least one of name, is_active must be provided".into(),
        ));
    }
    let group = GroupService::new(&state.db)
        .update(
            auth_user.actor(),
            id,
            payload.name.as_deref(),
            payload.is_active,
        )
        .await?;
    Ok(Json(group.into()))
}

#[utoipa::path(
    put,
    path = "/{id}/group",
    tag = "Groups",
    operation_id = "assignEvaluatorGroup",
    summary = "Assign an evaluator to a judging group",
    description = "Pass `null` to remove the evaluator from their group. Requires `assign_evaluator_groups`.",
    params(("id" = i32, Path, description = "Evaluator ID")),
    request_body = AssignEvaluatorGroupRequest,
    responses(
        (status = 200, description = "Evaluator updated", body = EvaluatorResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Evaluator or group not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(actor_id = auth_user.user_id(), group_id = ?payload.group_id))]
pub async fn assign_evaluator_group(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<AssignEvaluatorGroupRequest>,
) -> Result<Json<EvaluatorResponse>, AppError> {
    let account = GroupService::new(&state.db)
        .assign_evaluator(auth_user.actor(), id, payload.group_id)
        .await?;
    Ok(Json(account.into()))
}
