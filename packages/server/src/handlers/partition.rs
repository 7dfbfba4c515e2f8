use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::judging::partition::GroupPartitioner;
use crate::models::group::{PartitionResponse, TransferGroupRequest, TransferResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/groups/assign-all",
    tag = "Partition",
    operation_id = "assignAllEntriesToGroups",
    summary = "Re-partition every entry of a contest",
    description = "Splits all non-disqualified entries of the contest across the active judging groups in ascending id order, overwriting existing assignments. Block sizes differ by at most one. Requires `assign_entry_groups`.",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Entries partitioned", body = PartitionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "No active judging groups (INTERNAL_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(actor_id = auth_user.user_id()))]
pub async fn assign_all(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PartitionResponse>, AppError> {
    let plan = GroupPartitioner::new(&state.db)
        .assign_all(auth_user.actor(), id)
        .await?;
    Ok(Json(PartitionResponse::new(id, plan)))
}

#[utoipa::path(
    post,
    path = "/{id}/groups/assign-new",
    tag = "Partition",
    operation_id = "assignNewEntriesToGroups",
    summary = "Partition entries that have no group yet",
    description = "Like assign-all, but only touches non-disqualified entries without a group. Requires `assign_entry_groups`.",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Entries partitioned", body = PartitionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "No active judging groups (INTERNAL_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(actor_id = auth_user.user_id()))]
pub async fn assign_new(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PartitionResponse>, AppError> {
    let plan = GroupPartitioner::new(&state.db)
        .assign_new(auth_user.actor(), id)
        .await?;
    Ok(Json(PartitionResponse::new(id, plan)))
}

#[utoipa::path(
    post,
    path = "/{id}/groups/transfer",
    tag = "Partition",
    operation_id = "transferEntryGroups",
    summary = "Move all entries of one group to another",
    description = "Reassigns every entry of the contest in `from_group_id` to `to_group_id`. Requires `assign_entry_groups`.",
    params(("id" = i32, Path, description = "Contest ID")),
    request_body = TransferGroupRequest,
    responses(
        (status = 200, description = "Entries moved", body = TransferResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest or target group not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(
    skip(state, auth_user, payload),
    fields(actor_id = auth_user.user_id(), from = payload.from_group_id, to = payload.to_group_id)
)]
pub async fn transfer(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<TransferGroupRequest>,
) -> Result<Json<TransferResponse>, AppError> {
    let moved = GroupPartitioner::new(&state.db)
        .transfer(
            auth_user.actor(),
            id,
            payload.from_group_id,
            payload.to_group_id,
        )
        .await?;
    Ok(Json(TransferResponse {
        contest_id: id,
        from_group_id: payload.from_group_id,
        to_group_id: payload.to_group_id,
        moved,
    }))
}
