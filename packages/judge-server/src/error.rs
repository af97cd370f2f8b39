use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::judge::{GateRejection, JudgeError};
use crate::store::StoreError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `NOT_FOUND`, `CONFLICT`, `CONTEST_INACTIVE`,
    /// `LANGUAGE_NOT_ALLOWED`, `CONTEST_FINALIZED`, `ATTEMPTS_EXHAUSTED`,
    /// `RATE_LIMITED`, `INTERNAL_ERROR`.
    #[schema(example = "ATTEMPTS_EXHAUSTED")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "All 3 attempts for this question have been used")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    NotFound(String),
    Conflict(String),
    /// Attempt gate refused the request.
    Rejected(GateRejection),
    /// Rate limit exceeded. Contains seconds until retry is allowed.
    RateLimited {
        retry_after: u64,
    },
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::Rejected(rejection) => {
                let status = match rejection {
                    GateRejection::QuestionNotFound { .. } => StatusCode::NOT_FOUND,
                    GateRejection::LanguageNotAllowed { .. } => StatusCode::BAD_REQUEST,
                    GateRejection::AttemptsExhausted { .. } => StatusCode::TOO_MANY_REQUESTS,
                    GateRejection::ContestInactive(_) | GateRejection::ContestFinalized => {
                        StatusCode::FORBIDDEN
                    }
                };
                (
                    status,
                    ErrorBody {
                        code: rejection.code(),
                        message: rejection.to_string(),
                    },
                )
            }
            AppError::RateLimited { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorBody {
                    code: "RATE_LIMITED",
                    message: format!("Rate limit exceeded. Try again in {} seconds", retry_after),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retry_after = if let AppError::RateLimited { retry_after } = &self {
            Some(*retry_after)
        } else {
            None
        };

        let (status, body) = self.status_and_body();

        if let Some(seconds) = retry_after {
            (status, [("Retry-After", seconds.to_string())], Json(body)).into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<JudgeError> for AppError {
    fn from(err: JudgeError) -> Self {
        match err {
            JudgeError::Rejected(rejection) => AppError::Rejected(rejection),
            JudgeError::NotPending(id) => {
                AppError::Conflict(format!("Submission {id} has already been judged"))
            }
            JudgeError::ContestNotFound(id) => {
                AppError::NotFound(format!("Contest {id} not found"))
            }
            // The submission could not even be moved to `error`.
            JudgeError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
