use common::{ExecutionOutcome, ExecutionStatus, JudgeOutcome};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::{TestCaseResultResponse, validate_source};

/// Request body for a sample run. With `contest_id` and `question_id` the code
/// runs against the question's visible test cases; without them it runs once
/// on `input`.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RunRequest {
    #[schema(example = 1)]
    pub contest_id: Option<i32>,
    #[schema(example = 1)]
    pub question_id: Option<i32>,
    #[schema(example = "print(input())")]
    pub code: String,
    #[schema(example = "python")]
    pub language: String,
    /// Stdin for ad-hoc runs. Ignored when a question is given.
    #[schema(example = "hello")]
    pub input: Option<String>,
}

/// Which kind of run a request asked for.
pub enum RunTarget {
    Question { contest_id: i32, question_id: i32 },
    AdHoc,
}

pub fn validate_run(req: &RunRequest, max_size: usize) -> Result<RunTarget, AppError> {
    validate_source(&req.code, &req.language, max_size)?;
    match (req.contest_id, req.question_id) {
        (Some(contest_id), Some(question_id)) => Ok(RunTarget::Question {
            contest_id,
            question_id,
        }),
        (None, None) => Ok(RunTarget::AdHoc),
        _ => Err(AppError::Validation(
            "contest_id and question_id must be given together".into(),
        )),
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RunResponse {
    /// Scored against visible test cases.
    TestCases {
        results: Vec<TestCaseResultResponse>,
        marks_awarded: i32,
        max_marks: i32,
        score_percentage: i32,
    },
    /// Single execution on the given input.
    AdHoc {
        status: ExecutionStatus,
        output: String,
        error: Option<String>,
        execution_time: u64,
    },
}

impl From<JudgeOutcome> for RunResponse {
    fn from(o: JudgeOutcome) -> Self {
        RunResponse::TestCases {
            results: o
                .test_case_results
                .into_iter()
                .map(TestCaseResultResponse::from)
                .collect(),
            marks_awarded: o.marks_awarded,
            max_marks: o.max_marks,
            score_percentage: o.score_percentage,
        }
    }
}

impl From<ExecutionOutcome> for RunResponse {
    fn from(o: ExecutionOutcome) -> Self {
        RunResponse::AdHoc {
            status: o.status,
            output: o.output,
            error: o.error,
            execution_time: o.execution_time_ms,
        }
    }
}
