use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::judging::classifier::SkillLevelClassifier;
use crate::judging::moderation::ModerationService;
use crate::models::entry::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/level/auto",
    tag = "Entries",
    operation_id = "autoUpdateEntryLevel",
    summary = "Reclassify an entry's skill level",
    description = "Leaves locked entries alone. Promotes and locks the entry when the author's three most recent other entries are all Advanced; otherwise takes the plurality of the evaluators' suggestions (ties go to the lower bracket). Requires `edit_entries`.",
    params(("id" = i32, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Classification result", body = LevelUpdateResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(actor_id = auth_user.user_id()))]
pub async fn auto_update_level(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LevelUpdateResponse>, AppError> {
    let outcome = SkillLevelClassifier::new(&state.db, state.config.judging.promotion_streak)
        .auto_update(auth_user.actor(), id)
        .await?;
    Ok(Json(LevelUpdateResponse::new(id, outcome)))
}

#[utoipa::path(
    put,
    path = "/{id}/level",
    tag = "Entries",
    operation_id = "setEntryLevel",
    summary = "Set an entry's skill level manually",
    description = "Sets the bracket and locks it against automatic updates. Requires `edit_entries`.",
    params(("id" = i32, Path, description = "Entry ID")),
    request_body = SetEntryLevelRequest,
    responses(
        (status = 200, description = "Entry updated", body = EntryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(actor_id = auth_user.user_id()))]
pub async fn set_level(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SetEntryLevelRequest>,
) -> Result<Json<EntryResponse>, AppError> {
    let entry = ModerationService::new(&state.db)
        .set_level(auth_user.actor(), id, payload.skill_level)
        .await?;
    Ok(Json(entry.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/flag",
    tag = "Entries",
    operation_id = "flagEntry",
    summary = "Flag an entry",
    description = "Flagged entries are skipped by claims and excluded from progress. Requires `edit_entries`.",
    params(("id" = i32, Path, description = "Entry ID")),
    request_body = FlagEntryRequest,
    responses(
        (status = 200, description = "Entry flagged", body = EntryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(actor_id = auth_user.user_id()))]
pub async fn flag_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<FlagEntryRequest>,
) -> Result<Json<EntryResponse>, AppError> {
    let entry = ModerationService::new(&state.db)
        .flag(auth_user.actor(), id, &payload.reason)
        .await?;
    Ok(Json(entry.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/approve",
    tag = "Entries",
    operation_id = "approveEntry",
    summary = "Clear an entry's flag and disqualification",
    description = "Requires `edit_entries`.",
    params(("id" = i32, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Entry approved", body = EntryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(actor_id = auth_user.user_id()))]
pub async fn approve_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EntryResponse>, AppError> {
    let entry = ModerationService::new(&state.db)
        .approve(auth_user.actor(), id)
        .await?;
    Ok(Json(entry.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/disqualify",
    tag = "Entries",
    operation_id = "disqualifyEntry",
    summary = "Disqualify an entry",
    description = "Disqualified entries are skipped by claims, partitions and progress. Requires `edit_entries`.",
    params(("id" = i32, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Entry disqualified", body = EntryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(actor_id = auth_user.user_id()))]
pub async fn disqualify_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EntryResponse>, AppError> {
    let entry = ModerationService::new(&state.db)
        .disqualify(auth_user.actor(), id)
        .await?;
    Ok(Json(entry.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/winner",
    tag = "Entries",
    operation_id = "addWinner",
    summary = "Mark an entry as a winner",
    description = "Requires `manage_winners`.",
    params(("id" = i32, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Entry marked as a winner", body = EntryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(actor_id = auth_user.user_id()))]
pub async fn add_winner(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EntryResponse>, AppError> {
    let entry = ModerationService::new(&state.db)
        .add_winner(auth_user.actor(), id)
        .await?;
    Ok(Json(entry.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}/winner",
    tag = "Entries",
    operation_id = "removeWinner",
    summary = "Clear an entry's winner mark",
    description = "Requires `manage_winners`.",
    params(("id" = i32, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Winner mark cleared", body = EntryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(actor_id = auth_user.user_id()))]
pub async fn remove_winner(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EntryResponse>, AppError> {
    let entry = ModerationService::new(&state.db)
        .remove_winner(auth_user.actor(), id)
        .await?;
    Ok(Json(entry.into()))
}
