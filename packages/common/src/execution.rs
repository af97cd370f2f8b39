use serde::{Deserialize, Serialize};

use crate::ExecutionStatus;

/// What the dispatcher reports back for one "run this code with this input" call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ExecutionOutcome {
    pub status: ExecutionStatus,
    /// Captured stdout, possibly truncated.
    pub output: String,
    /// Compiler or runtime diagnostics.
    pub error: Option<String>,
    /// Wall-clock time from dispatch to completion.
    pub execution_time_ms: u64,
    /// Peak memory in kilobytes, when the runner can measure it.
    pub memory_used_kb: Option<u64>,
}

impl ExecutionOutcome {
    pub fn success(output: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            status: ExecutionStatus::Success,
            output: output.into(),
            error: None,
            execution_time_ms,
            memory_used_kb: None,
        }
    }

    pub fn error(message: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            status: ExecutionStatus::Error,
            output: String::new(),
            error: Some(message.into()),
            execution_time_ms,
            memory_used_kb: None,
        }
    }

    pub fn timeout(time_limit_ms: u64, execution_time_ms: u64) -> Self {
        Self {
            status: ExecutionStatus::Timeout,
            output: String::new(),
            error: Some(format!("Time limit exceeded ({time_limit_ms} ms)")),
            execution_time_ms,
            memory_used_kb: None,
        }
    }

    /// Keep whatever the program printed before it failed.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }
}
