use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::judging::claim::ClaimBroker;
use crate::judging::evaluation::EvaluationService;
use crate::models::entry::LevelUpdateResponse;
use crate::models::judging::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/claim",
    tag = "Judging",
    operation_id = "claimNextEntry",
    summary = "Claim the next entry to judge",
    description = "Returns the caller's outstanding claim if there is one. Otherwise binds the eligible entry of the caller's group with the fewest completed evaluations (lowest id on ties) to the caller. `entry_id` is `null` when nothing is left to judge. Requires `judge_entries`.",
    responses(
        (status = 200, description = "Claimed entry, or null", body = ClaimResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Evaluator account not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(actor_id = auth_user.user_id()))]
pub async fn claim_next(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ClaimResponse>, AppError> {
    let entry_id = ClaimBroker::new(&state.db)
        .claim_next(auth_user.actor())
        .await?;
    Ok(Json(ClaimResponse { entry_id }))
}

#[utoipa::path(
    delete,
    path = "/claim",
    tag = "Judging",
    operation_id = "releaseClaim",
    summary = "Abandon the outstanding claim",
    description = "Deletes the caller's placeholder evaluation so the entry can be claimed again. Requires `judge_entries`.",
    responses(
        (status = 200, description = "Released entry, or null", body = ReleaseResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(actor_id = auth_user.user_id()))]
pub async fn release_claim(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ReleaseResponse>, AppError> {
    let entry_id = ClaimBroker::new(&state.db)
        .release(auth_user.actor())
        .await?;
    Ok(Json(ReleaseResponse { entry_id }))
}

#[utoipa::path(
    get,
    path = "/review-level",
    tag = "Judging",
    operation_id = "getNextEntryToReviewSkillLevel",
    summary = "Next entry whose skill level needs review",
    description = "Most recently created entry that is not disqualified and whose level is not locked. Non-exclusive. Admin only.",
    responses(
        (status = 200, description = "Entry to review, or null", body = ReviewLevelResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(actor_id = auth_user.user_id()))]
pub async fn next_entry_to_review_level(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ReviewLevelResponse>, AppError> {
    let entry_id = ClaimBroker::new(&state.db)
        .next_entry_to_review_level(auth_user.actor())
        .await?;
    Ok(Json(ReviewLevelResponse { entry_id }))
}

#[utoipa::path(
    post,
    path = "/evaluations",
    tag = "Judging",
    operation_id = "submitEvaluation",
    summary = "Submit scores for the claimed entry",
    description = "Completes the caller's placeholder for `entry_id`. Each sub-score must be within 0-10 in half points. The entry's skill level is reclassified afterwards. Requires `judge_entries`.",
    request_body = SubmitEvaluationRequest,
    responses(
        (status = 200, description = "Evaluation completed", body = EvaluationResultResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No claim on this entry (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(
    skip(state, auth_user, payload),
    fields(actor_id = auth_user.user_id(), entry_id = payload.entry_id)
)]
pub async fn submit_evaluation(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SubmitEvaluationRequest>,
) -> Result<Json<EvaluationResultResponse>, AppError> {
    let (evaluation, outcome) =
        EvaluationService::new(&state.db, state.config.judging.promotion_streak)
            .submit(auth_user.actor(), payload.entry_id, payload.input())
            .await?;
    Ok(Json(EvaluationResultResponse {
        level: outcome.map(|o| LevelUpdateResponse::new(evaluation.entry_id, o)),
        evaluation: evaluation.into(),
    }))
}

#[utoipa::path(
    patch,
    path = "/evaluations/{id}",
    tag = "Judging",
    operation_id = "editEvaluation",
    summary = "Edit a completed evaluation",
    description = "Owners may edit their own evaluations of the current contest. Holders of `edit_all_evaluations` may edit any evaluation. The entry's skill level is reclassified afterwards.",
    params(("id" = i32, Path, description = "Evaluation ID")),
    request_body = EditEvaluationRequest,
    responses(
        (status = 200, description = "Evaluation updated", body = EvaluationResultResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Evaluation not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(actor_id = auth_user.user_id()))]
pub async fn edit_evaluation(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<EditEvaluationRequest>,
) -> Result<Json<EvaluationResultResponse>, AppError> {
    let (evaluation, outcome) =
        EvaluationService::new(&state.db, state.config.judging.promotion_streak)
            .edit(auth_user.actor(), id, payload.input())
            .await?;
    Ok(Json(EvaluationResultResponse {
        level: outcome.map(|o| LevelUpdateResponse::new(evaluation.entry_id, o)),
        evaluation: evaluation.into(),
    }))
}
