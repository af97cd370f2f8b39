use serde::{Deserialize, Serialize};

/// Test case data needed for judging.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestCaseData {
    /// Test case ID
    pub id: i32,
    /// Declaration order within the question
    pub position: i32,
    /// Input fed to the program on stdin
    pub input: String,
    /// Expected output for comparison
    pub expected_output: String,
    /// Authored marks; may be zero
    pub marks: i32,
    /// Hidden cases are skipped by sample runs
    pub is_hidden: bool,
}

/// Everything needed to evaluate one piece of code against a question's test cases.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JudgeJob {
    /// Submission being judged, absent for sample runs
    pub submission_id: Option<i32>,
    /// Source code
    pub code: String,
    /// Language tag (e.g., "cpp", "java", "python")
    pub language: String,
    /// Time limit in milliseconds
    pub time_limit_ms: u64,
    /// Test cases in declaration order
    pub test_cases: Vec<TestCaseData>,
}

impl JudgeJob {
    pub fn new(
        submission_id: Option<i32>,
        code: impl Into<String>,
        language: impl Into<String>,
        time_limit_ms: u64,
        test_cases: Vec<TestCaseData>,
    ) -> Self {
        Self {
            submission_id,
            code: code.into(),
            language: language.into(),
            time_limit_ms,
            test_cases,
        }
    }

    /// Drop hidden test cases, keeping declaration order.
    pub fn visible_only(mut self) -> Self {
        self.test_cases.retain(|tc| !tc.is_hidden);
        self
    }

    /// Get the test case IDs from this job.
    pub fn test_case_ids(&self) -> Vec<i32> {
        self.test_cases.iter().map(|tc| tc.id).collect()
    }
}
