use chrono::{DateTime, Utc};
use common::SubmissionStatus;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::store::Submission;

use super::shared::{TestCaseResultResponse, validate_source};

/// Request body for a judge request.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSubmissionRequest {
    /// Source code.
    #[schema(example = "a, b = map(int, input().split())\nprint(a + b)")]
    pub code: String,
    /// Programming language (e.g., "c", "cpp", "java", "python", "javascript").
    #[schema(example = "python")]
    pub language: String,
}

/// Query parameters for submission listing.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct SubmissionListQuery {
    /// Only submissions for this question.
    #[param(example = 1)]
    pub question_id: Option<i32>,
}

/// A judged submission.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    #[schema(example = 1)]
    pub submission_id: i32,
    #[schema(example = 1)]
    pub contest_id: i32,
    #[schema(example = 1)]
    pub question_id: i32,
    #[schema(example = "python")]
    pub language: String,
    pub status: SubmissionStatus,
    #[schema(example = 34)]
    pub marks_awarded: i32,
    #[schema(example = 50)]
    pub max_marks: i32,
    #[schema(example = 68)]
    pub score_percentage: i32,
    /// Results in test case order, hidden ones included.
    pub test_case_results: Vec<TestCaseResultResponse>,
    /// Sum of per-test-case times in milliseconds.
    #[schema(example = 120)]
    pub execution_time: u64,
    /// Peak memory in kilobytes; 0 when not measured.
    #[schema(example = 0)]
    pub memory_used: u64,
    #[schema(example = "2025-10-01T14:30:00Z")]
    pub submitted_at: DateTime<Utc>,
    pub judged_at: Option<DateTime<Utc>>,
    /// Reason the submission ended in `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<Submission> for SubmissionResponse {
    fn from(s: Submission) -> Self {
        Self {
            submission_id: s.id,
            contest_id: s.contest_id,
            question_id: s.question_id,
            language: s.language,
            status: s.status,
            marks_awarded: s.marks_awarded,
            max_marks: s.max_marks,
            score_percentage: s.score_percentage,
            test_case_results: s
                .test_case_results
                .into_iter()
                .map(TestCaseResultResponse::from)
                .collect(),
            execution_time: s.execution_time,
            memory_used: s.memory_used,
            submitted_at: s.submitted_at,
            judged_at: s.judged_at,
            error_message: s.error_message,
        }
    }
}

/// Submission summary for list views.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionListItem {
    #[schema(example = 1)]
    pub submission_id: i32,
    #[schema(example = 1)]
    pub question_id: i32,
    #[schema(example = "python")]
    pub language: String,
    pub status: SubmissionStatus,
    #[schema(example = 34)]
    pub marks_awarded: i32,
    #[schema(example = 50)]
    pub max_marks: i32,
    #[schema(example = 68)]
    pub score_percentage: i32,
    #[schema(example = "2025-10-01T14:30:00Z")]
    pub submitted_at: DateTime<Utc>,
}

impl From<Submission> for SubmissionListItem {
    fn from(s: Submission) -> Self {
        Self {
            submission_id: s.id,
            question_id: s.question_id,
            language: s.language,
            status: s.status,
            marks_awarded: s.marks_awarded,
            max_marks: s.max_marks,
            score_percentage: s.score_percentage,
            submitted_at: s.submitted_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionListResponse {
    pub data: Vec<SubmissionListItem>,
}

pub fn validate_create_submission(
    req: &CreateSubmissionRequest,
    max_size: usize,
) -> Result<(), AppError> {
    validate_source(&req.code, &req.language, max_size)
}
