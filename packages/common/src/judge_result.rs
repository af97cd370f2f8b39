use serde::{Deserialize, Serialize};

use crate::TestCaseStatus;

/// Result for a single test case execution.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, utoipa::ToSchema)]
pub struct TestCaseJudgeResult {
    /// Test case ID that was executed.
    pub test_case_id: i32,
    /// Declaration order of the test case.
    pub position: i32,
    pub status: TestCaseStatus,
    /// Wall-clock time in milliseconds.
    pub execution_time: u64,
    /// Peak memory in kilobytes, when measured.
    pub memory_used: Option<u64>,
    /// Program stdout.
    pub output: String,
    /// Compiler or runtime diagnostics.
    pub error: Option<String>,
    /// Marks earned for this test case.
    pub marks_awarded: i32,
    /// Marks this test case was worth in this pass.
    pub max_marks: i32,
    pub is_hidden: bool,
}

/// Aggregated result of evaluating a job against all of its test cases.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, utoipa::ToSchema)]
pub struct JudgeOutcome {
    /// Individual test case results, in declaration order.
    pub test_case_results: Vec<TestCaseJudgeResult>,
    pub marks_awarded: i32,
    pub max_marks: i32,
    pub score_percentage: i32,
    /// Sum of per-test-case times (milliseconds).
    pub execution_time: u64,
    /// Maximum per-test-case memory (kilobytes), 0 when nothing was measured.
    pub memory_used: u64,
}

impl JudgeOutcome {
    /// Fold per-test-case results into totals.
    pub fn from_results(test_case_results: Vec<TestCaseJudgeResult>) -> Self {
        let marks_awarded = test_case_results.iter().map(|r| r.marks_awarded).sum();
        let max_marks = test_case_results.iter().map(|r| r.max_marks).sum();
        let execution_time = test_case_results.iter().map(|r| r.execution_time).sum();
        let memory_used = test_case_results
            .iter()
            .filter_map(|r| r.memory_used)
            .max()
            .unwrap_or(0);

        Self {
            score_percentage: score_percentage(marks_awarded, max_marks),
            test_case_results,
            marks_awarded,
            max_marks,
            execution_time,
            memory_used,
        }
    }

    /// Number of passed test cases.
    pub fn passed_count(&self) -> usize {
        self.test_case_results
            .iter()
            .filter(|r| r.status == TestCaseStatus::Passed)
            .count()
    }
}

/// `round(100 * obtained / max)`, or 0 when nothing was available to earn.
pub fn score_percentage(obtained: i32, max: i32) -> i32 {
    if max <= 0 {
        return 0;
    }
    (100.0 * f64::from(obtained) / f64::from(max)).round() as i32
}
