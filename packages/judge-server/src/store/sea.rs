use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{JudgeOutcome, SubmissionStatus, TestCaseData, TestCaseJudgeResult};
use sea_orm::sea_query::{Expr, LockType, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::instrument;

use super::{
    Contest, ContestStore, LedgerStore, LedgerUpdate, NewSubmission, Question, ScoreEntry,
    StoreError, Submission, SubmissionStore,
};
use crate::entity::{
    coding_score, contest, contest_participant, question, submission, test_case,
    test_case_result,
};

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Postgres-backed stores.
#[derive(Clone)]
pub struct SeaStore {
    db: DatabaseConnection,
}

impl SeaStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load_results(&self, submission_id: i32) -> Result<Vec<TestCaseJudgeResult>, StoreError> {
        let rows = test_case_result::Entity::find()
            .filter(test_case_result::Column::SubmissionId.eq(submission_id))
            .order_by_asc(test_case_result::Column::Position)
            .order_by_asc(test_case_result::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(result_from_model).collect())
    }

    async fn reload(&self, id: i32) -> Result<Submission, StoreError> {
        self.find(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Submission {id}")))
    }
}

fn contest_from_model(model: contest::Model) -> Result<Contest, StoreError> {
    let id = model.id;
    let allowed_languages: Vec<String> = serde_json::from_value(model.allowed_languages)
        .map_err(|e| StoreError::Corrupt(format!("contest {id} allowed_languages: {e}")))?;
    Ok(Contest {
        id,
        title: model.title,
        start_time: model.start_time,
        end_time: model.end_time,
        is_active: model.is_active,
        allowed_languages,
        max_attempts: model.max_attempts,
    })
}

fn test_case_from_model(model: test_case::Model) -> TestCaseData {
    TestCaseData {
        id: model.id,
        position: model.position,
        input: model.input,
        expected_output: model.expected_output,
        marks: model.marks,
        is_hidden: model.is_hidden,
    }
}

fn submission_from_model(model: submission::Model) -> Submission {
    Submission {
        id: model.id,
        contest_id: model.contest_id,
        question_id: model.question_id,
        student_id: model.student_id,
        code: model.code,
        language: model.language,
        status: model.status,
        marks_awarded: model.marks_awarded,
        max_marks: model.max_marks,
        score_percentage: model.score_percentage,
        execution_time: model.execution_time.max(0) as u64,
        memory_used: model.memory_used.max(0) as u64,
        error_message: model.error_message,
        submitted_at: model.submitted_at,
        judged_at: model.judged_at,
        test_case_results: Vec::new(),
    }
}

fn result_from_model(model: test_case_result::Model) -> TestCaseJudgeResult {
    TestCaseJudgeResult {
        test_case_id: model.test_case_id,
        position: model.position,
        status: model.status,
        execution_time: model.execution_time.max(0) as u64,
        memory_used: model.memory_used.map(|m| m.max(0) as u64),
        output: model.output,
        error: model.error,
        marks_awarded: model.marks_awarded,
        max_marks: model.max_marks,
        is_hidden: model.is_hidden,
    }
}

fn score_from_model(model: coding_score::Model) -> ScoreEntry {
    ScoreEntry {
        student_id: model.student_id,
        contest_id: model.contest_id,
        question_id: model.question_id,
        score: model.score,
        total_marks: model.total_marks,
        submission_id: model.submission_id,
        code: model.code,
        completed_at: model.completed_at,
    }
}

#[async_trait]
impl ContestStore for SeaStore {
    async fn find_contest(&self, contest_id: i32) -> Result<Option<Contest>, StoreError> {
        contest::Entity::find_by_id(contest_id)
            .one(&self.db)
            .await?
            .map(contest_from_model)
            .transpose()
    }

    async fn find_question(
        &self,
        contest_id: i32,
        question_id: i32,
    ) -> Result<Option<Question>, StoreError> {
        let Some(model) = question::Entity::find_by_id(question_id)
            .filter(question::Column::ContestId.eq(contest_id))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let test_cases = test_case::Entity::find()
            .filter(test_case::Column::QuestionId.eq(question_id))
            .order_by_asc(test_case::Column::Position)
            .order_by_asc(test_case::Column::Id)
            .all(&self.db)
            .await?;

        Ok(Some(Question {
            id: model.id,
            contest_id: model.contest_id,
            title: model.title,
            time_limit_ms: model.time_limit.max(0) as u64,
            memory_limit_kb: model.memory_limit.max(0) as u64,
            total_marks: model.total_marks,
            test_cases: test_cases.into_iter().map(test_case_from_model).collect(),
        }))
    }

    async fn finalized_at(
        &self,
        contest_id: i32,
        student_id: i32,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(
            contest_participant::Entity::find_by_id((contest_id, student_id))
                .one(&self.db)
                .await?
                .and_then(|p| p.finalized_at),
        )
    }

    #[instrument(skip(self))]
    async fn finalize(
        &self,
        contest_id: i32,
        student_id: i32,
        at: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, StoreError> {
        let row = contest_participant::ActiveModel {
            contest_id: Set(contest_id),
            student_id: Set(student_id),
            finalized_at: Set(None),
        };
        let inserted = contest_participant::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    contest_participant::Column::ContestId,
                    contest_participant::Column::StudentId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await;
        match inserted {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }

        // Only the first finalization sticks.
        contest_participant::Entity::update_many()
            .col_expr(contest_participant::Column::FinalizedAt, Expr::value(Some(at)))
            .filter(contest_participant::Column::ContestId.eq(contest_id))
            .filter(contest_participant::Column::StudentId.eq(student_id))
            .filter(contest_participant::Column::FinalizedAt.is_null())
            .exec(&self.db)
            .await?;

        self.finalized_at(contest_id, student_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Participant {student_id} of contest {contest_id}")))
    }
}

#[async_trait]
impl SubmissionStore for SeaStore {
    async fn count_attempts(
        &self,
        contest_id: i32,
        question_id: i32,
        student_id: i32,
    ) -> Result<u64, StoreError> {
        Ok(submission::Entity::find()
            .filter(submission::Column::ContestId.eq(contest_id))
            .filter(submission::Column::QuestionId.eq(question_id))
            .filter(submission::Column::StudentId.eq(student_id))
            .count(&self.db)
            .await?)
    }

    async fn recent_activity(
        &self,
        student_id: i32,
        since: DateTime<Utc>,
    ) -> Result<(u64, Option<DateTime<Utc>>), StoreError> {
        let recent = submission::Entity::find()
            .filter(submission::Column::StudentId.eq(student_id))
            .filter(submission::Column::SubmittedAt.gt(since));

        let count = recent.clone().count(&self.db).await?;
        if count == 0 {
            return Ok((0, None));
        }
        let oldest = recent
            .order_by_asc(submission::Column::SubmittedAt)
            .one(&self.db)
            .await?
            .map(|s| s.submitted_at);
        Ok((count, oldest))
    }

    async fn create(
        &self,
        new: NewSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<Submission, StoreError> {
        let model = submission::ActiveModel {
            contest_id: Set(new.contest_id),
            question_id: Set(new.question_id),
            student_id: Set(new.student_id),
            code: Set(new.code),
            language: Set(new.language),
            status: Set(SubmissionStatus::Pending),
            marks_awarded: Set(0),
            max_marks: Set(0),
            score_percentage: Set(0),
            execution_time: Set(0),
            memory_used: Set(0),
            error_message: Set(None),
            submitted_at: Set(submitted_at),
            judged_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(submission_from_model(model))
    }

    async fn find(&self, id: i32) -> Result<Option<Submission>, StoreError> {
        let Some(model) = submission::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut found = submission_from_model(model);
        found.test_case_results = self.load_results(id).await?;
        Ok(Some(found))
    }

    async fn begin_judging(&self, id: i32) -> Result<bool, StoreError> {
        let updated = submission::Entity::update_many()
            .col_expr(submission::Column::Status, Expr::value(SubmissionStatus::Running))
            .filter(submission::Column::Id.eq(id))
            .filter(submission::Column::Status.eq(SubmissionStatus::Pending))
            .exec(&self.db)
            .await?;

        if updated.rows_affected > 0 {
            return Ok(true);
        }

        let exists = submission::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .is_some();
        if exists {
            Ok(false)
        } else {
            Err(StoreError::NotFound(format!("Submission {id}")))
        }
    }

    #[instrument(skip(self, outcome), fields(results = outcome.test_case_results.len()))]
    async fn complete(
        &self,
        id: i32,
        outcome: &JudgeOutcome,
        judged_at: DateTime<Utc>,
    ) -> Result<Submission, StoreError> {
        let txn = self.db.begin().await?;

        // Lock the row so the status check and the result inserts are one step.
        let current = submission::Entity::find_by_id(id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Submission {id}")))?;
        if current.status != SubmissionStatus::Running {
            return Err(StoreError::NotFound(format!("Running submission {id}")));
        }

        submission::Entity::update_many()
            .col_expr(submission::Column::Status, Expr::value(SubmissionStatus::Completed))
            .col_expr(submission::Column::MarksAwarded, Expr::value(outcome.marks_awarded))
            .col_expr(submission::Column::MaxMarks, Expr::value(outcome.max_marks))
            .col_expr(
                submission::Column::ScorePercentage,
                Expr::value(outcome.score_percentage),
            )
            .col_expr(
                submission::Column::ExecutionTime,
                Expr::value(outcome.execution_time as i64),
            )
            .col_expr(
                submission::Column::MemoryUsed,
                Expr::value(outcome.memory_used as i64),
            )
            .col_expr(submission::Column::JudgedAt, Expr::value(Some(judged_at)))
            .filter(submission::Column::Id.eq(id))
            .exec(&txn)
            .await?;

        for result in &outcome.test_case_results {
            test_case_result::ActiveModel {
                submission_id: Set(id),
                test_case_id: Set(result.test_case_id),
                position: Set(result.position),
                status: Set(result.status),
                execution_time: Set(result.execution_time as i64),
                memory_used: Set(result.memory_used.map(|m| m as i64)),
                output: Set(result.output.clone()),
                error: Set(result.error.clone()),
                marks_awarded: Set(result.marks_awarded),
                max_marks: Set(result.max_marks),
                is_hidden: Set(result.is_hidden),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        self.reload(id).await
    }

    async fn fail(
        &self,
        id: i32,
        reason: &str,
        judged_at: DateTime<Utc>,
    ) -> Result<Submission, StoreError> {
        let updated = submission::Entity::update_many()
            .col_expr(submission::Column::Status, Expr::value(SubmissionStatus::Error))
            .col_expr(submission::Column::ErrorMessage, Expr::value(Some(reason.to_string())))
            .col_expr(submission::Column::JudgedAt, Expr::value(Some(judged_at)))
            .filter(submission::Column::Id.eq(id))
            .filter(submission::Column::Status.ne(SubmissionStatus::Completed))
            .exec(&self.db)
            .await?;

        if updated.rows_affected == 0 {
            return Err(StoreError::NotFound(format!("Unfinished submission {id}")));
        }
        self.reload(id).await
    }

    async fn list_for_student(
        &self,
        contest_id: i32,
        student_id: i32,
        question_id: Option<i32>,
    ) -> Result<Vec<Submission>, StoreError> {
        let mut query = submission::Entity::find()
            .filter(submission::Column::ContestId.eq(contest_id))
            .filter(submission::Column::StudentId.eq(student_id));
        if let Some(question_id) = question_id {
            query = query.filter(submission::Column::QuestionId.eq(question_id));
        }

        let rows = query
            .order_by_desc(submission::Column::SubmittedAt)
            .order_by_desc(submission::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(submission_from_model).collect())
    }
}

#[async_trait]
impl LedgerStore for SeaStore {
    #[instrument(skip(self, entry), fields(student_id = entry.student_id, contest_id = entry.contest_id, question_id = entry.question_id, score = entry.score))]
    async fn record_if_better(&self, entry: ScoreEntry) -> Result<LedgerUpdate, StoreError> {
        let row = coding_score::ActiveModel {
            student_id: Set(entry.student_id),
            contest_id: Set(entry.contest_id),
            question_id: Set(entry.question_id),
            score: Set(entry.score),
            total_marks: Set(entry.total_marks),
            submission_id: Set(entry.submission_id),
            code: Set(entry.code.clone()),
            completed_at: Set(entry.completed_at),
        };

        let inserted = coding_score::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    coding_score::Column::StudentId,
                    coding_score::Column::ContestId,
                    coding_score::Column::QuestionId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await;
        match inserted {
            Ok(rows) if rows > 0 => return Ok(LedgerUpdate::Inserted),
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }

        let updated = coding_score::Entity::update_many()
            .col_expr(coding_score::Column::Score, Expr::value(entry.score))
            .col_expr(coding_score::Column::TotalMarks, Expr::value(entry.total_marks))
            .col_expr(coding_score::Column::SubmissionId, Expr::value(entry.submission_id))
            .col_expr(coding_score::Column::Code, Expr::value(entry.code))
            .col_expr(coding_score::Column::CompletedAt, Expr::value(entry.completed_at))
            .filter(coding_score::Column::StudentId.eq(entry.student_id))
            .filter(coding_score::Column::ContestId.eq(entry.contest_id))
            .filter(coding_score::Column::QuestionId.eq(entry.question_id))
            .filter(coding_score::Column::Score.lt(entry.score))
            .exec(&self.db)
            .await?;

        if updated.rows_affected > 0 {
            Ok(LedgerUpdate::Improved)
        } else {
            Ok(LedgerUpdate::Unchanged)
        }
    }

    async fn entries_for_student(&self, student_id: i32) -> Result<Vec<ScoreEntry>, StoreError> {
        let rows = coding_score::Entity::find()
            .filter(coding_score::Column::StudentId.eq(student_id))
            .order_by_asc(coding_score::Column::ContestId)
            .order_by_asc(coding_score::Column::QuestionId)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(score_from_model).collect())
    }
}
