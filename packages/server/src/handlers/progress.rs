use axum::Json;
use axum::extract::{Path, State};
use common::Progress;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::judging::progress::ProgressService;
use crate::models::progress::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/progress",
    tag = "Progress",
    operation_id = "getJudgingProgress",
    summary = "Dashboard progress for the current contest",
    description = "The caller's own and group progress, plus contest-wide entry, evaluation and per-evaluator progress for holders of `view_admin_stats` (`null` otherwise).",
    responses(
        (status = 200, description = "Progress overview", body = ProgressOverviewResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No contest exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(actor_id = auth_user.user_id()))]
pub async fn overview(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ProgressOverviewResponse>, AppError> {
    let overview = ProgressService::new(&state.db)
        .overview(auth_user.actor())
        .await?
        .ok_or_else(|| AppError::NotFound("No contest to judge".into()))?;
    Ok(Json(overview.into()))
}

#[utoipa::path(
    get,
    path = "/{id}/progress/user/{user_id}",
    tag = "Progress",
    operation_id = "getUserProgress",
    summary = "An evaluator's progress",
    description = "Completed evaluations by the evaluator on eligible entries of their group, against that group's eligible entries. Reading another evaluator requires `view_admin_stats`.",
    params(
        ("id" = i32, Path, description = "Contest ID"),
        ("user_id" = i32, Path, description = "Evaluator ID"),
    ),
    responses(
        (status = 200, description = "Progress", body = Progress),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest or evaluator not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(actor_id = auth_user.user_id()))]
pub async fn user_progress(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i32, i32)>,
) -> Result<Json<Progress>, AppError> {
    let progress = ProgressService::new(&state.db)
        .user_progress(auth_user.actor(), id, user_id)
        .await?;
    Ok(Json(progress))
}

#[utoipa::path(
    get,
    path = "/{id}/progress/groups/{group_id}",
    tag = "Progress",
    operation_id = "getGroupProgress",
    summary = "A judging group's progress",
    description = "Completed evaluations by the group's active judges on its eligible entries, against entries x judges. Reading a group other than one's own requires `view_admin_stats`.",
    params(
        ("id" = i32, Path, description = "Contest ID"),
        ("group_id" = i32, Path, description = "Group ID"),
    ),
    responses(
        (status = 200, description = "Progress", body = Progress),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest or group not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(actor_id = auth_user.user_id()))]
pub async fn group_progress(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, group_id)): Path<(i32, i32)>,
) -> Result<Json<Progress>, AppError> {
    let progress = ProgressService::new(&state.db)
        .group_progress(auth_user.actor(), id, group_id)
        .await?;
    Ok(Json(progress))
}

#[utoipa::path(
    get,
    path = "/{id}/progress/entries",
    tag = "Progress",
    operation_id = "getEntryProgress",
    summary = "Contest-wide entry progress",
    description = "Eligible entries with at least one completed evaluation, against all eligible entries. Requires `view_admin_stats`.",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Progress", body = Progress),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(actor_id = auth_user.user_id()))]
pub async fn entry_progress(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Progress>, AppError> {
    let progress = ProgressService::new(&state.db)
        .entry_progress(auth_user.actor(), id)
        .await?;
    Ok(Json(progress))
}

#[utoipa::path(
    get,
    path = "/{id}/progress/evaluations",
    tag = "Progress",
    operation_id = "getEvaluationProgress",
    summary = "Contest-wide evaluation progress",
    description = "Completed evaluations against the sum over groups of eligible entries x active judges. Requires `view_admin_stats`.",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Progress", body = Progress),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(actor_id = auth_user.user_id()))]
pub async fn evaluation_progress(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Progress>, AppError> {
    let progress = ProgressService::new(&state.db)
        .evaluation_progress(auth_user.actor(), id)
        .await?;
    Ok(Json(progress))
}

#[utoipa::path(
    get,
    path = "/{id}/progress/evaluators",
    tag = "Progress",
    operation_id = "getEvaluatorProgress",
    summary = "Per-evaluator progress",
    description = "One row per evaluator with a completed evaluation in the contest. Requires `view_admin_stats`.",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Progress rows", body = Vec<EvaluatorProgressItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(actor_id = auth_user.user_id()))]
pub async fn evaluator_progress(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<EvaluatorProgressItem>>, AppError> {
    let rows = ProgressService::new(&state.db)
        .evaluator_progress(auth_user.actor(), id)
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
