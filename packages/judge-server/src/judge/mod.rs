//! Submission lifecycle: gate, judge, persist, ledger.

pub mod gate;
pub mod ledger;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{ExecutionOutcome, JudgeJob, JudgeOutcome};
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use worker::Dispatcher;

pub use gate::{Attempt, GateError, GateRejection, InactiveReason};

use crate::store::{
    ContestStore, LedgerStore, NewSubmission, Question, StoreError, Submission, SubmissionStore,
};

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error(transparent)]
    Rejected(#[from] GateRejection),

    #[error("Submission {0} is not pending")]
    NotPending(i32),

    #[error("Contest {0} not found")]
    ContestNotFound(i32),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<GateError> for JudgeError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Rejected(r) => JudgeError::Rejected(r),
            GateError::Store(e) => JudgeError::Store(e),
        }
    }
}

/// Everything needed to turn a request into a judged, persisted submission.
#[derive(Clone)]
pub struct JudgeEngine {
    contests: Arc<dyn ContestStore>,
    submissions: Arc<dyn SubmissionStore>,
    ledger: Arc<dyn LedgerStore>,
    dispatcher: Arc<dyn Dispatcher>,
    parallelism: usize,
}

impl JudgeEngine {
    pub fn new(
        contests: Arc<dyn ContestStore>,
        submissions: Arc<dyn SubmissionStore>,
        ledger: Arc<dyn LedgerStore>,
        dispatcher: Arc<dyn Dispatcher>,
        parallelism: usize,
    ) -> Self {
        Self {
            contests,
            submissions,
            ledger,
            dispatcher,
            parallelism: parallelism.max(1),
        }
    }

    pub fn contests(&self) -> &dyn ContestStore {
        self.contests.as_ref()
    }

    pub fn submissions(&self) -> &dyn SubmissionStore {
        self.submissions.as_ref()
    }

    pub fn ledger(&self) -> &dyn LedgerStore {
        self.ledger.as_ref()
    }

    /// Gate the attempt, create the submission and judge it to a terminal state.
    #[instrument(skip(self, attempt, code), fields(contest_id = attempt.contest_id, question_id = attempt.question_id, student_id = attempt.student_id))]
    pub async fn submit(&self, attempt: Attempt, code: String) -> Result<Submission, JudgeError> {
        let now = Utc::now();
        let (_, question) = gate::check_attempt(
            self.contests.as_ref(),
            self.submissions.as_ref(),
            &attempt,
            now,
        )
        .await?;

        let submission = self
            .submissions
            .create(
                NewSubmission {
                    contest_id: attempt.contest_id,
                    question_id: attempt.question_id,
                    student_id: attempt.student_id,
                    code,
                    language: attempt.language,
                },
                now,
            )
            .await?;
        info!(submission_id = submission.id, "Submission created");

        self.judge(&submission, &question).await
    }

    /// Drive `pending -> running -> completed | error` for one submission.
    #[instrument(skip_all, fields(submission_id = submission.id))]
    pub async fn judge(
        &self,
        submission: &Submission,
        question: &Question,
    ) -> Result<Submission, JudgeError> {
        let id = submission.id;
        if !self.submissions.begin_judging(id).await? {
            return Err(JudgeError::NotPending(id));
        }

        let job = JudgeJob::new(
            Some(id),
            submission.code.clone(),
            submission.language.clone(),
            question.time_limit_ms,
            question.test_cases.clone(),
        );
        let dispatcher = Arc::clone(&self.dispatcher);
        let parallelism = self.parallelism;
        // Own task so a panicking evaluation cannot leave the submission running.
        let evaluation =
            tokio::spawn(async move { worker::evaluate(dispatcher.as_ref(), &job, parallelism).await });

        let outcome = match evaluation.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Evaluation task failed");
                return self.abort(id, format!("Judging aborted: {e}")).await;
            }
        };

        let judged = match self.submissions.complete(id, &outcome, Utc::now()).await {
            Ok(judged) => judged,
            Err(e) => {
                error!(error = %e, "Failed to store judge results");
                return self.abort(id, format!("Failed to store judge results: {e}")).await;
            }
        };
        info!(
            marks_awarded = judged.marks_awarded,
            max_marks = judged.max_marks,
            passed = outcome.passed_count(),
            "Submission judged"
        );

        if let Err(e) = ledger::record_submission(self.ledger.as_ref(), &judged).await {
            // The submission itself is durable; the ledger catches up on the next attempt.
            error!(error = %e, "Failed to update score ledger");
        }

        Ok(judged)
    }

    async fn abort(&self, id: i32, reason: String) -> Result<Submission, JudgeError> {
        let failed = self.submissions.fail(id, &reason, Utc::now()).await?;
        warn!(submission_id = id, %reason, "Submission moved to error");
        Ok(failed)
    }

    /// Judge against the question's visible test cases without persisting anything.
    #[instrument(skip(self, code))]
    pub async fn run_samples(
        &self,
        contest_id: i32,
        question_id: i32,
        code: String,
        language: String,
    ) -> Result<JudgeOutcome, JudgeError> {
        let question =
            gate::check_sample_run(self.contests.as_ref(), contest_id, question_id, &language)
                .await?;
        let job = JudgeJob::new(
            None,
            code,
            language,
            question.time_limit_ms,
            question.test_cases,
        )
        .visible_only();
        Ok(worker::evaluate(self.dispatcher.as_ref(), &job, self.parallelism).await)
    }

    /// Run code once against arbitrary input.
    #[instrument(skip(self, code, stdin))]
    pub async fn run_ad_hoc(
        &self,
        code: &str,
        language: &str,
        stdin: &str,
        time_limit_ms: u64,
    ) -> ExecutionOutcome {
        match self
            .dispatcher
            .execute(code, language, stdin, time_limit_ms)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Ad-hoc dispatch failed");
                ExecutionOutcome::error(e.to_string(), 0)
            }
        }
    }

    /// Lock the contest for a student. Idempotent.
    #[instrument(skip(self))]
    pub async fn finalize(
        &self,
        contest_id: i32,
        student_id: i32,
    ) -> Result<DateTime<Utc>, JudgeError> {
        if self.contests.find_contest(contest_id).await?.is_none() {
            return Err(JudgeError::ContestNotFound(contest_id));
        }
        let at = self.contests.finalize(contest_id, student_id, Utc::now()).await?;
        info!(%at, "Contest finalized");
        Ok(at)
    }
}
