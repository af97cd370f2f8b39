use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::run::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/run",
    tag = "Runs",
    operation_id = "runCode",
    summary = "Run code without submitting",
    description = "With `contest_id` and `question_id`, scores the code against the question's visible test cases. Without them, runs the code once on `input`. Nothing is persisted and no attempt is consumed.",
    request_body = RunRequest,
    responses(
        (status = 200, description = "Run result", body = RunResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, LANGUAGE_NOT_ALLOWED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(student_id = auth_user.student_id, language = %payload.language))]
pub async fn run_code(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RunRequest>,
) -> Result<Json<RunResponse>, AppError> {
    let target = validate_run(&payload, state.config.submission.max_code_size)?;
    let language = payload.language.trim().to_string();

    let response: RunResponse = match target {
        RunTarget::Question {
            contest_id,
            question_id,
        } => state
            .judge
            .run_samples(contest_id, question_id, payload.code, language)
            .await?
            .into(),
        RunTarget::AdHoc => state
            .judge
            .run_ad_hoc(
                &payload.code,
                &language,
                payload.input.as_deref().unwrap_or_default(),
                state.config.submission.ad_hoc_time_limit_ms,
            )
            .await
            .into(),
    };

    Ok(Json(response))
}
