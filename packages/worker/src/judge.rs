//! Evaluation of a judge job: one dispatch per test case, classification,
//! aggregation.

use common::{
    ExecutionOutcome, ExecutionStatus, JudgeJob, JudgeOutcome, TestCaseData, TestCaseJudgeResult,
    TestCaseStatus,
};
use futures::stream::{self, StreamExt};
use tracing::{debug, instrument, warn};

use crate::dispatcher::Dispatcher;
use crate::error::DispatchError;
use crate::marks::allocate_marks;

/// Run every test case of `job` through `dispatcher`.
///
/// At most `parallelism` test cases are in flight at once; results always come
/// back in declaration order. A failing test case never stops the others.
#[instrument(skip(dispatcher, job), fields(submission_id = ?job.submission_id, test_cases = job.test_cases.len()))]
pub async fn evaluate(dispatcher: &dyn Dispatcher, job: &JudgeJob, parallelism: usize) -> JudgeOutcome {
    let authored: Vec<i32> = job.test_cases.iter().map(|tc| tc.marks).collect();
    let allocation = allocate_marks(&authored);

    // Built up front so the stream holds futures, not a closure over borrowed cases.
    let pending: Vec<_> = job
        .test_cases
        .iter()
        .zip(allocation)
        .map(|(tc, allocated)| async move {
            let dispatched = dispatcher
                .execute(&job.code, &job.language, &tc.input, job.time_limit_ms)
                .await;
            classify(tc, allocated, job.time_limit_ms, dispatched)
        })
        .collect();

    let results: Vec<TestCaseJudgeResult> = stream::iter(pending)
        .buffered(parallelism.max(1))
        .collect()
        .await;

    JudgeOutcome::from_results(results)
}

/// Turn one dispatcher answer into a scored test case result.
pub fn classify(
    tc: &TestCaseData,
    allocated: i32,
    time_limit_ms: u64,
    dispatched: Result<ExecutionOutcome, DispatchError>,
) -> TestCaseJudgeResult {
    let outcome = match dispatched {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(test_case_id = tc.id, error = %e, "Dispatch failed");
            ExecutionOutcome::error(e.to_string(), 0)
        }
    };

    let status = if outcome.status == ExecutionStatus::Timeout
        || outcome.execution_time_ms > time_limit_ms
    {
        TestCaseStatus::TimeLimitExceeded
    } else if outcome.status == ExecutionStatus::Error {
        TestCaseStatus::RuntimeError
    } else if outputs_match(&outcome.output, &tc.expected_output) {
        TestCaseStatus::Passed
    } else {
        TestCaseStatus::Failed
    };
    debug!(test_case_id = tc.id, status = %status, time_ms = outcome.execution_time_ms, "Test case classified");

    TestCaseJudgeResult {
        test_case_id: tc.id,
        position: tc.position,
        status,
        execution_time: outcome.execution_time_ms,
        memory_used: outcome.memory_used_kb,
        output: outcome.output,
        error: outcome.error,
        marks_awarded: if status == TestCaseStatus::Passed {
            allocated
        } else {
            0
        },
        max_marks: allocated,
        is_hidden: tc.is_hidden,
    }
}

/// Outputs match when equal after trimming leading and trailing whitespace.
pub fn outputs_match(actual: &str, expected: &str) -> bool {
    actual.trim() == expected.trim()
}
