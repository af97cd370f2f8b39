use std::cmp;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{Duration, Utc};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::judge::Attempt;
use crate::models::submission::*;
use crate::state::AppState;
use crate::store::SubmissionStore;

/// Reject when the student has made `limit_per_minute` submissions in the last minute.
async fn check_rate_limit(
    submissions: &dyn SubmissionStore,
    student_id: i32,
    limit_per_minute: u32,
) -> Result<(), AppError> {
    if limit_per_minute == 0 {
        return Ok(()); // Rate limiting disabled
    }

    let one_minute_ago = Utc::now() - Duration::minutes(1);
    let (count, oldest) = submissions
        .recent_activity(student_id, one_minute_ago)
        .await?;

    if count >= limit_per_minute as u64 {
        let retry_after = oldest
            .map(|at| {
                let expires = at + Duration::minutes(1);
                cmp::max((expires - Utc::now()).num_seconds(), 1) as u64
            })
            .unwrap_or(60);

        return Err(AppError::RateLimited { retry_after });
    }

    Ok(())
}

#[utoipa::path(
    post,
    path = "/contests/{contest_id}/questions/{question_id}/submissions",
    tag = "Submissions",
    operation_id = "submitSolution",
    summary = "Submit code for judging",
    description = "Runs the attempt gate, judges the code against every test case of the question and returns the judged submission. The best score per question is kept in the score ledger. Output of hidden test cases is withheld.",
    params(
        ("contest_id" = i32, Path, description = "Contest ID"),
        ("question_id" = i32, Path, description = "Question ID"),
    ),
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Submission judged (status `completed` or `error`)", body = SubmissionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, LANGUAGE_NOT_ALLOWED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Rejected (CONTEST_INACTIVE, CONTEST_FINALIZED)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
        (status = 429, description = "Too many requests (ATTEMPTS_EXHAUSTED, RATE_LIMITED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(student_id = auth_user.student_id, username = %auth_user.username, language = %payload.language))]
pub async fn submit_solution(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((contest_id, question_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<CreateSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_submission(&payload, state.config.submission.max_code_size)?;
    check_rate_limit(
        state.judge.submissions(),
        auth_user.student_id,
        state.config.submission.rate_limit_per_minute,
    )
    .await?;

    let attempt = Attempt {
        contest_id,
        question_id,
        student_id: auth_user.student_id,
        language: payload.language.trim().to_string(),
    };
    let submission = state.judge.submit(attempt, payload.code).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse::from(submission)),
    ))
}

#[utoipa::path(
    get,
    path = "/submissions/{id}",
    tag = "Submissions",
    operation_id = "getSubmission",
    summary = "Get one of your submissions",
    params(("id" = i32, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission details", body = SubmissionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(student_id = auth_user.student_id))]
pub async fn get_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let submission = state
        .judge
        .submissions()
        .find(id)
        .await?
        // Other students' submissions look the same as missing ones.
        .filter(|s| s.student_id == auth_user.student_id)
        .ok_or_else(|| AppError::NotFound("Submission not found".into()))?;

    Ok(Json(SubmissionResponse::from(submission)))
}

#[utoipa::path(
    get,
    path = "/contests/{contest_id}/submissions",
    tag = "Submissions",
    operation_id = "listContestSubmissions",
    summary = "List your submissions in a contest",
    description = "Newest first. Test case results are omitted; fetch a single submission for them.",
    params(
        ("contest_id" = i32, Path, description = "Contest ID"),
        SubmissionListQuery,
    ),
    responses(
        (status = 200, description = "Your submissions", body = SubmissionListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(student_id = auth_user.student_id))]
pub async fn list_contest_submissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(contest_id): Path<i32>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<Json<SubmissionListResponse>, AppError> {
    let submissions = state
        .judge
        .submissions()
        .list_for_student(contest_id, auth_user.student_id, query.question_id)
        .await?;

    Ok(Json(SubmissionListResponse {
        data: submissions
            .into_iter()
            .map(SubmissionListItem::from)
            .collect(),
    }))
}
