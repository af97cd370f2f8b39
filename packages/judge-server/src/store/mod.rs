//! Persistence seams of the judging engine.
//!
//! Every store has a sea-orm implementation ([`sea::SeaStore`]) and an in-memory
//! one ([`memory::MemoryStore`]) used for tests and database-less runs.

pub mod memory;
pub mod sea;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{JudgeOutcome, SubmissionStatus, TestCaseData, TestCaseJudgeResult};
use serde::Deserialize;
use thiserror::Error;
use worker::Language;

pub use memory::MemoryStore;
pub use sea::SeaStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid stored data: {0}")]
    Corrupt(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Contest {
    pub id: i32,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_active: bool,
    pub allowed_languages: Vec<String>,
    pub max_attempts: i32,
}

impl Contest {
    /// Language tags are compared by canonical name, so `c++` matches `cpp`.
    pub fn allows_language(&self, language: &str) -> bool {
        let wanted = canonical_language(language);
        self.allowed_languages
            .iter()
            .any(|allowed| canonical_language(allowed) == wanted)
    }
}

pub fn canonical_language(tag: &str) -> String {
    tag.parse::<Language>()
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|_| tag.trim().to_ascii_lowercase())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    pub id: i32,
    pub contest_id: i32,
    pub title: String,
    pub time_limit_ms: u64,
    pub memory_limit_kb: u64,
    pub total_marks: i32,
    /// Ordered by position.
    #[serde(default)]
    pub test_cases: Vec<TestCaseData>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub contest_id: i32,
    pub question_id: i32,
    pub student_id: i32,
    pub code: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: i32,
    pub contest_id: i32,
    pub question_id: i32,
    pub student_id: i32,
    pub code: String,
    pub language: String,
    pub status: SubmissionStatus,
    pub marks_awarded: i32,
    pub max_marks: i32,
    pub score_percentage: i32,
    pub execution_time: u64,
    pub memory_used: u64,
    pub error_message: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub judged_at: Option<DateTime<Utc>>,
    /// In position order. Empty in listings.
    pub test_case_results: Vec<TestCaseJudgeResult>,
}

impl Submission {
    pub fn pending(id: i32, new: NewSubmission, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id,
            contest_id: new.contest_id,
            question_id: new.question_id,
            student_id: new.student_id,
            code: new.code,
            language: new.language,
            status: SubmissionStatus::Pending,
            marks_awarded: 0,
            max_marks: 0,
            score_percentage: 0,
            execution_time: 0,
            memory_used: 0,
            error_message: None,
            submitted_at,
            judged_at: None,
            test_case_results: Vec::new(),
        }
    }

    /// Apply a finished evaluation.
    pub fn record_outcome(&mut self, outcome: &JudgeOutcome, judged_at: DateTime<Utc>) {
        self.status = SubmissionStatus::Completed;
        self.marks_awarded = outcome.marks_awarded;
        self.max_marks = outcome.max_marks;
        self.score_percentage = outcome.score_percentage;
        self.execution_time = outcome.execution_time;
        self.memory_used = outcome.memory_used;
        self.test_case_results = outcome.test_case_results.clone();
        self.judged_at = Some(judged_at);
    }
}

/// One row of the best-attempt ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub student_id: i32,
    pub contest_id: i32,
    pub question_id: i32,
    pub score: i32,
    pub total_marks: i32,
    pub submission_id: i32,
    pub code: String,
    pub completed_at: DateTime<Utc>,
}

/// What a ledger upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerUpdate {
    /// First completed attempt for the key.
    Inserted,
    /// Strictly better than the stored best; replaced it.
    Improved,
    /// Not better; stored best left untouched.
    Unchanged,
}

/// Read-only contest and question lookup plus the per-student finalization lock.
#[async_trait]
pub trait ContestStore: Send + Sync {
    async fn find_contest(&self, contest_id: i32) -> Result<Option<Contest>, StoreError>;

    /// The question if it belongs to `contest_id`, with its test cases in order.
    async fn find_question(
        &self,
        contest_id: i32,
        question_id: i32,
    ) -> Result<Option<Question>, StoreError>;

    async fn finalized_at(
        &self,
        contest_id: i32,
        student_id: i32,
    ) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Idempotent; returns the first finalization time.
    async fn finalize(
        &self,
        contest_id: i32,
        student_id: i32,
        at: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, StoreError>;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Prior submissions of a student for one contest question, any status.
    async fn count_attempts(
        &self,
        contest_id: i32,
        question_id: i32,
        student_id: i32,
    ) -> Result<u64, StoreError>;

    /// Submissions of a student made after `since`, with the oldest timestamp among them.
    async fn recent_activity(
        &self,
        student_id: i32,
        since: DateTime<Utc>,
    ) -> Result<(u64, Option<DateTime<Utc>>), StoreError>;

    async fn create(
        &self,
        new: NewSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<Submission, StoreError>;

    async fn find(&self, id: i32) -> Result<Option<Submission>, StoreError>;

    /// Atomically move `pending -> running`. `false` when it was not pending.
    async fn begin_judging(&self, id: i32) -> Result<bool, StoreError>;

    /// `running -> completed`, storing totals and every test case result.
    async fn complete(
        &self,
        id: i32,
        outcome: &JudgeOutcome,
        judged_at: DateTime<Utc>,
    ) -> Result<Submission, StoreError>;

    /// Move a non-completed submission to `error` with a reason.
    async fn fail(
        &self,
        id: i32,
        reason: &str,
        judged_at: DateTime<Utc>,
    ) -> Result<Submission, StoreError>;

    /// Newest first, without test case results.
    async fn list_for_student(
        &self,
        contest_id: i32,
        student_id: i32,
        question_id: Option<i32>,
    ) -> Result<Vec<Submission>, StoreError>;
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Insert if absent, otherwise replace only when `entry.score` is strictly higher.
    async fn record_if_better(&self, entry: ScoreEntry) -> Result<LedgerUpdate, StoreError>;

    /// Ordered by contest, then question.
    async fn entries_for_student(&self, student_id: i32) -> Result<Vec<ScoreEntry>, StoreError>;
}
