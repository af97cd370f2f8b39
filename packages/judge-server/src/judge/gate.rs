use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::store::{Contest, ContestStore, Question, StoreError, SubmissionStore};

/// Why a contest is not accepting submissions right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InactiveReason {
    #[error("Contest has been deactivated")]
    Deactivated,
    #[error("Contest has not started yet")]
    NotStarted,
    #[error("Contest has ended")]
    Ended,
}

/// A policy refusal. Produced before any submission is created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateRejection {
    #[error("Question {question_id} not found in contest {contest_id}")]
    QuestionNotFound { contest_id: i32, question_id: i32 },

    #[error("{0}")]
    ContestInactive(InactiveReason),

    #[error("Language '{language}' is not allowed in this contest")]
    LanguageNotAllowed { language: String },

    #[error("Contest has been finalized; no further submissions are accepted")]
    ContestFinalized,

    #[error("All {max} attempts for this question have been used")]
    AttemptsExhausted { used: u64, max: i32 },
}

impl GateRejection {
    pub fn code(&self) -> &'static str {
        match self {
            GateRejection::QuestionNotFound { .. } => "NOT_FOUND",
            GateRejection::ContestInactive(_) => "CONTEST_INACTIVE",
            GateRejection::LanguageNotAllowed { .. } => "LANGUAGE_NOT_ALLOWED",
            GateRejection::ContestFinalized => "CONTEST_FINALIZED",
            GateRejection::AttemptsExhausted { .. } => "ATTEMPTS_EXHAUSTED",
        }
    }
}

/// Gate failures are either policy rejections or store faults.
#[derive(Debug, Error)]
pub enum GateError {
    #[error(transparent)]
    Rejected(#[from] GateRejection),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Who wants to submit what, where.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub contest_id: i32,
    pub question_id: i32,
    pub student_id: i32,
    pub language: String,
}

fn inactive_reason(contest: &Contest, now: DateTime<Utc>) -> Option<InactiveReason> {
    if !contest.is_active {
        Some(InactiveReason::Deactivated)
    } else if now < contest.start_time {
        Some(InactiveReason::NotStarted)
    } else if now > contest.end_time {
        Some(InactiveReason::Ended)
    } else {
        None
    }
}

async fn load_question(
    contests: &dyn ContestStore,
    contest_id: i32,
    question_id: i32,
) -> Result<(Contest, Question), GateError> {
    let missing = || GateRejection::QuestionNotFound {
        contest_id,
        question_id,
    };
    let question = contests
        .find_question(contest_id, question_id)
        .await?
        .ok_or_else(missing)?;
    let contest = contests.find_contest(contest_id).await?.ok_or_else(missing)?;
    Ok((contest, question))
}

/// Run the full submission gate. Checks, in order: question exists under the
/// contest, contest window is open, language is allowed, student has not
/// finalized, attempt quota is not used up.
pub async fn check_attempt(
    contests: &dyn ContestStore,
    submissions: &dyn SubmissionStore,
    attempt: &Attempt,
    now: DateTime<Utc>,
) -> Result<(Contest, Question), GateError> {
    let (contest, question) =
        load_question(contests, attempt.contest_id, attempt.question_id).await?;

    if let Some(reason) = inactive_reason(&contest, now) {
        return Err(GateRejection::ContestInactive(reason).into());
    }

    if !contest.allows_language(&attempt.language) {
        return Err(GateRejection::LanguageNotAllowed {
            language: attempt.language.clone(),
        }
        .into());
    }

    if contests
        .finalized_at(contest.id, attempt.student_id)
        .await?
        .is_some()
    {
        return Err(GateRejection::ContestFinalized.into());
    }

    let used = submissions
        .count_attempts(contest.id, question.id, attempt.student_id)
        .await?;
    if used >= contest.max_attempts.max(0) as u64 {
        return Err(GateRejection::AttemptsExhausted {
            used,
            max: contest.max_attempts,
        }
        .into());
    }

    debug!(used, max = contest.max_attempts, "Attempt accepted by gate");
    Ok((contest, question))
}

/// Sample runs only need the question and an allowed language; they consume no
/// attempt and ignore the contest window.
pub async fn check_sample_run(
    contests: &dyn ContestStore,
    contest_id: i32,
    question_id: i32,
    language: &str,
) -> Result<Question, GateError> {
    let (contest, question) = load_question(contests, contest_id, question_id).await?;
    if !contest.allows_language(language) {
        return Err(GateRejection::LanguageNotAllowed {
            language: language.to_string(),
        }
        .into());
    }
    Ok(question)
}
