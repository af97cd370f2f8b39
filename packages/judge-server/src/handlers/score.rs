use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::score::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/scores",
    tag = "Scores",
    operation_id = "listScores",
    summary = "Your best score per question",
    responses(
        (status = 200, description = "Score ledger, ordered by contest then question", body = ScoreListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(student_id = auth_user.student_id))]
pub async fn list_scores(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ScoreListResponse>, AppError> {
    let entries = state
        .judge
        .ledger()
        .entries_for_student(auth_user.student_id)
        .await?;

    Ok(Json(ScoreListResponse {
        data: entries.into_iter().map(ScoreEntryResponse::from).collect(),
    }))
}
