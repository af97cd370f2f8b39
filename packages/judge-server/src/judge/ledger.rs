use common::SubmissionStatus;
use tracing::info;

use crate::store::{LedgerStore, LedgerUpdate, ScoreEntry, StoreError, Submission};

/// Fold a completed submission into the student's best-attempt record.
///
/// Anything that is not `completed` leaves the ledger untouched.
pub async fn record_submission(
    ledger: &dyn LedgerStore,
    submission: &Submission,
) -> Result<LedgerUpdate, StoreError> {
    if submission.status != SubmissionStatus::Completed {
        return Ok(LedgerUpdate::Unchanged);
    }

    let entry = ScoreEntry {
        student_id: submission.student_id,
        contest_id: submission.contest_id,
        question_id: submission.question_id,
        score: submission.marks_awarded,
        total_marks: submission.max_marks,
        submission_id: submission.id,
        code: submission.code.clone(),
        completed_at: submission.judged_at.unwrap_or(submission.submitted_at),
    };

    let update = ledger.record_if_better(entry).await?;
    info!(
        submission_id = submission.id,
        score = submission.marks_awarded,
        ?update,
        "Score ledger synced"
    );
    Ok(update)
}
