use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::judging::settings::SettingsService;
use crate::models::settings::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/current-contest",
    tag = "Settings",
    operation_id = "getCurrentContest",
    summary = "The contest judging currently targets",
    description = "The explicitly configured contest, or the most recent contest when none is configured.",
    responses(
        (status = 200, description = "Current contest", body = CurrentContestResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_current_contest(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<CurrentContestResponse>, AppError> {
    let contest = SettingsService::new(&state.db).current_contest().await?;
    Ok(Json(CurrentContestResponse {
        contest: contest.map(Into::into),
    }))
}

#[utoipa::path(
    put,
    path = "/current-contest",
    tag = "Settings",
    operation_id = "setCurrentContest",
    summary = "Choose the contest judging targets",
    description = "Pass `null` to fall back to the most recent contest. Requires `manage_judging_groups`.",
    request_body = SetCurrentContestRequest,
    responses(
        (status = 200, description = "Current contest", body = CurrentContestResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(actor_id = auth_user.user_id(), contest_id = ?payload.contest_id))]
pub async fn set_current_contest(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SetCurrentContestRequest>,
) -> Result<Json<CurrentContestResponse>, AppError> {
    let contest = SettingsService::new(&state.db)
        .set_current_contest(auth_user.actor(), payload.contest_id)
        .await?;
    Ok(Json(CurrentContestResponse {
        contest: contest.map(Into::into),
    }))
}
