#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a submission.
///
/// `Pending -> Running -> Completed` on the happy path, `Pending -> Running -> Error`
/// when judging could not be carried through. When the `sea-orm` feature is enabled,
/// this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Accepted by the attempt gate, not yet picked up.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "pending"))]
    Pending,
    /// Test cases are being executed.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "running"))]
    Running,
    /// Every test case was evaluated and the score recorded.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "completed"))]
    Completed,
    /// Judging aborted; see the submission's error message.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "error"))]
    Error,
}

impl SubmissionStatus {
    /// Returns true if no further transition is possible.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// All possible status values.
    pub const ALL: &'static [SubmissionStatus] =
        &[Self::Pending, Self::Running, Self::Completed, Self::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for SubmissionStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Classification of a single evaluated test case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum TestCaseStatus {
    /// Ran successfully and the trimmed output matched.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "passed"))]
    Passed,
    /// Ran successfully but produced the wrong output.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "failed"))]
    Failed,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "time_limit_exceeded"))]
    TimeLimitExceeded,
    /// Compile failure, crash, unsupported language or dispatcher fault.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "runtime_error"))]
    RuntimeError,
}

impl TestCaseStatus {
    pub const ALL: &'static [TestCaseStatus] = &[
        Self::Passed,
        Self::Failed,
        Self::TimeLimitExceeded,
        Self::RuntimeError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::TimeLimitExceeded => "time_limit_exceeded",
            Self::RuntimeError => "runtime_error",
        }
    }
}

impl fmt::Display for TestCaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw status reported by the execution dispatcher for one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    /// Compilation failed or the program exited abnormally.
    Error,
    Timeout,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status '{invalid}'. Valid values: {}", .expected.join(", "))]
pub struct ParseStatusError {
    invalid: String,
    expected: &'static [&'static str],
}

impl FromStr for SubmissionStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "error" => Ok(Self::Error),
            _ => Err(ParseStatusError {
                invalid: s.to_string(),
                expected: &["pending", "running", "completed", "error"],
            }),
        }
    }
}

impl FromStr for TestCaseStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passed" => Ok(Self::Passed),
            "failed" => Ok(Self::Failed),
            "time_limit_exceeded" => Ok(Self::TimeLimitExceeded),
            "runtime_error" => Ok(Self::RuntimeError),
            _ => Err(ParseStatusError {
                invalid: s.to_string(),
                expected: &["passed", "failed", "time_limit_exceeded", "runtime_error"],
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_roundtrip() {
        for status in SubmissionStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            let parsed: SubmissionStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(*status, parsed);
        }
        for status in TestCaseStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "completed".parse::<SubmissionStatus>().unwrap(),
            SubmissionStatus::Completed
        );
        assert_eq!(
            "time_limit_exceeded".parse::<TestCaseStatus>().unwrap(),
            TestCaseStatus::TimeLimitExceeded
        );
        let err = "Accepted".parse::<SubmissionStatus>().unwrap_err();
        assert!(err.to_string().contains("pending, running, completed, error"));
    }

    #[test]
    fn test_final_states() {
        assert!(!SubmissionStatus::Pending.is_final());
        assert!(!SubmissionStatus::Running.is_final());
        assert!(SubmissionStatus::Completed.is_final());
        assert!(SubmissionStatus::Error.is_final());
    }

    #[test]
    fn test_execution_status_wire_names() {
        assert_eq!(
            serde_json::to_value(ExecutionStatus::Timeout).unwrap(),
            serde_json::json!("timeout")
        );
    }
}
