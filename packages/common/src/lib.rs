pub mod execution;
pub mod judge_job;
pub mod judge_result;
pub mod submission_status;

pub use execution::ExecutionOutcome;
pub use judge_job::{JudgeJob, TestCaseData};
pub use judge_result::{JudgeOutcome, TestCaseJudgeResult, score_percentage};
pub use submission_status::{ExecutionStatus, SubmissionStatus, TestCaseStatus};
