use common::TestCaseJudgeResult;
use serde::Serialize;

use crate::error::AppError;

/// Code and language checks shared by judge and sample-run requests.
pub fn validate_source(code: &str, language: &str, max_size: usize) -> Result<(), AppError> {
    if code.trim().is_empty() {
        return Err(AppError::Validation("Code cannot be empty".into()));
    }
    if code.len() > max_size {
        return Err(AppError::Validation(format!(
            "Code size ({} bytes) exceeds maximum ({} bytes)",
            code.len(),
            max_size
        )));
    }
    if language.trim().is_empty() {
        return Err(AppError::Validation("Language is required".into()));
    }
    Ok(())
}

/// Result for a single test case. Output and error of hidden cases are withheld.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TestCaseResultResponse {
    #[schema(example = 1)]
    pub test_case_id: i32,
    #[schema(example = 1)]
    pub position: i32,
    pub status: common::TestCaseStatus,
    /// Time used in milliseconds.
    #[schema(example = 12)]
    pub execution_time: u64,
    /// Memory used in kilobytes, when measured.
    pub memory_used: Option<u64>,
    /// Program output; null for hidden test cases.
    pub output: Option<String>,
    /// Compiler or runtime diagnostics; null for hidden test cases.
    pub error: Option<String>,
    #[schema(example = 17)]
    pub marks_awarded: i32,
    #[schema(example = 17)]
    pub max_marks: i32,
    pub is_hidden: bool,
}

impl From<TestCaseJudgeResult> for TestCaseResultResponse {
    fn from(r: TestCaseJudgeResult) -> Self {
        let (output, error) = if r.is_hidden {
            (None, None)
        } else {
            (Some(r.output), r.error)
        };
        Self {
            test_case_id: r.test_case_id,
            position: r.position,
            status: r.status,
            execution_time: r.execution_time,
            memory_used: r.memory_used,
            output,
            error,
            marks_awarded: r.marks_awarded,
            max_marks: r.max_marks,
            is_hidden: r.is_hidden,
        }
    }
}
