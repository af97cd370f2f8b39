use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::contest::FinalizeResponse;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/contests/{contest_id}/finalize",
    tag = "Contests",
    operation_id = "finalizeContest",
    summary = "Finalize a contest",
    description = "Locks the contest for the calling student; later submissions are rejected with CONTEST_FINALIZED. Idempotent.",
    params(("contest_id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Contest finalized", body = FinalizeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(student_id = auth_user.student_id))]
pub async fn finalize_contest(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(contest_id): Path<i32>,
) -> Result<Json<FinalizeResponse>, AppError> {
    let finalized_at = state
        .judge
        .finalize(contest_id, auth_user.student_id)
        .await?;

    Ok(Json(FinalizeResponse {
        contest_id,
        finalized_at,
    }))
}
