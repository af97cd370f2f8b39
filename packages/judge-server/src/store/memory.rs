use std::path::Path;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{JudgeOutcome, SubmissionStatus};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Deserialize;
use tracing::info;

use super::{
    Contest, ContestStore, LedgerStore, LedgerUpdate, NewSubmission, Question, ScoreEntry,
    StoreError, Submission, SubmissionStore,
};

/// Contests and questions loaded into a [`MemoryStore`] at startup.
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub contests: Vec<Contest>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Process-local implementation of every store trait.
///
/// Each map shard lock doubles as the per-key lock that makes the state
/// transitions and the ledger upsert atomic.
#[derive(Default)]
pub struct MemoryStore {
    contests: DashMap<i32, Contest>,
    questions: DashMap<i32, Question>,
    finalized: DashMap<(i32, i32), DateTime<Utc>>,
    submissions: DashMap<i32, Submission>,
    next_submission_id: AtomicI32,
    scores: DashMap<(i32, i32, i32), ScoreEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_contest(&self, contest: Contest) {
        self.contests.insert(contest.id, contest);
    }

    /// Test cases are sorted by position on insert.
    pub fn insert_question(&self, mut question: Question) {
        question.test_cases.sort_by_key(|tc| (tc.position, tc.id));
        self.questions.insert(question.id, question);
    }

    pub fn apply_seed(&self, seed: Seed) {
        let (contests, questions) = (seed.contests.len(), seed.questions.len());
        for contest in seed.contests {
            self.insert_contest(contest);
        }
        for question in seed.questions {
            self.insert_question(question);
        }
        info!(contests, questions, "Loaded seed data");
    }

    /// Read a JSON [`Seed`] file.
    pub fn load_seed_file(&self, path: &Path) -> Result<(), StoreError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?;
        let seed: Seed = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?;
        self.apply_seed(seed);
        Ok(())
    }

    fn not_found(id: i32) -> StoreError {
        StoreError::NotFound(format!("Submission {id}"))
    }
}

#[async_trait]
impl ContestStore for MemoryStore {
    async fn find_contest(&self, contest_id: i32) -> Result<Option<Contest>, StoreError> {
        Ok(self.contests.get(&contest_id).map(|c| c.value().clone()))
    }

    async fn find_question(
        &self,
        contest_id: i32,
        question_id: i32,
    ) -> Result<Option<Question>, StoreError> {
        Ok(self
            .questions
            .get(&question_id)
            .filter(|q| q.contest_id == contest_id)
            .map(|q| q.value().clone()))
    }

    async fn finalized_at(
        &self,
        contest_id: i32,
        student_id: i32,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.finalized.get(&(contest_id, student_id)).map(|at| *at.value()))
    }

    async fn finalize(
        &self,
        contest_id: i32,
        student_id: i32,
        at: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, StoreError> {
        Ok(*self
            .finalized
            .entry((contest_id, student_id))
            .or_insert(at))
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn count_attempts(
        &self,
        contest_id: i32,
        question_id: i32,
        student_id: i32,
    ) -> Result<u64, StoreError> {
        Ok(self
            .submissions
            .iter()
            .filter(|s| {
                s.contest_id == contest_id
                    && s.question_id == question_id
                    && s.student_id == student_id
            })
            .count() as u64)
    }

    async fn recent_activity(
        &self,
        student_id: i32,
        since: DateTime<Utc>,
    ) -> Result<(u64, Option<DateTime<Utc>>), StoreError> {
        let recent: Vec<DateTime<Utc>> = self
            .submissions
            .iter()
            .filter(|s| s.student_id == student_id && s.submitted_at > since)
            .map(|s| s.submitted_at)
            .collect();
        Ok((recent.len() as u64, recent.into_iter().min()))
    }

    async fn create(
        &self,
        new: NewSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<Submission, StoreError> {
        let id = self.next_submission_id.fetch_add(1, Ordering::SeqCst) + 1;
        let submission = Submission::pending(id, new, submitted_at);
        self.submissions.insert(id, submission.clone());
        Ok(submission)
    }

    async fn find(&self, id: i32) -> Result<Option<Submission>, StoreError> {
        Ok(self.submissions.get(&id).map(|s| s.value().clone()))
    }

    async fn begin_judging(&self, id: i32) -> Result<bool, StoreError> {
        let mut submission = self.submissions.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        if submission.status != SubmissionStatus::Pending {
            return Ok(false);
        }
        submission.status = SubmissionStatus::Running;
        Ok(true)
    }

    async fn complete(
        &self,
        id: i32,
        outcome: &JudgeOutcome,
        judged_at: DateTime<Utc>,
    ) -> Result<Submission, StoreError> {
        let mut submission = self.submissions.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        if submission.status != SubmissionStatus::Running {
            return Err(StoreError::NotFound(format!("Running submission {id}")));
        }
        submission.record_outcome(outcome, judged_at);
        Ok(submission.clone())
    }

    async fn fail(
        &self,
        id: i32,
        reason: &str,
        judged_at: DateTime<Utc>,
    ) -> Result<Submission, StoreError> {
        let mut submission = self.submissions.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        if submission.status == SubmissionStatus::Completed {
            return Err(StoreError::NotFound(format!("Unfinished submission {id}")));
        }
        submission.status = SubmissionStatus::Error;
        submission.error_message = Some(reason.to_string());
        submission.judged_at = Some(judged_at);
        Ok(submission.clone())
    }

    async fn list_for_student(
        &self,
        contest_id: i32,
        student_id: i32,
        question_id: Option<i32>,
    ) -> Result<Vec<Submission>, StoreError> {
        let mut list: Vec<Submission> = self
            .submissions
            .iter()
            .filter(|s| {
                s.contest_id == contest_id
                    && s.student_id == student_id
                    && question_id.is_none_or(|q| s.question_id == q)
            })
            .map(|s| Submission {
                test_case_results: Vec::new(),
                ..s.value().clone()
            })
            .collect();
        list.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(b.id.cmp(&a.id)));
        Ok(list)
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn record_if_better(&self, entry: ScoreEntry) -> Result<LedgerUpdate, StoreError> {
        let key = (entry.student_id, entry.contest_id, entry.question_id);
        match self.scores.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(LedgerUpdate::Inserted)
            }
            Entry::Occupied(mut slot) => {
                if entry.score > slot.get().score {
                    slot.insert(entry);
                    Ok(LedgerUpdate::Improved)
                } else {
                    Ok(LedgerUpdate::Unchanged)
                }
            }
        }
    }

    async fn entries_for_student(&self, student_id: i32) -> Result<Vec<ScoreEntry>, StoreError> {
        let mut entries: Vec<ScoreEntry> = self
            .scores
            .iter()
            .filter(|e| e.student_id == student_id)
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by_key(|e| (e.contest_id, e.question_id));
        Ok(entries)
    }
}
