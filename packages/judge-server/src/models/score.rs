use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::ScoreEntry;

/// Best attempt for one contest question.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ScoreEntryResponse {
    #[schema(example = 1)]
    pub contest_id: i32,
    #[schema(example = 1)]
    pub question_id: i32,
    #[schema(example = 50)]
    pub score: i32,
    #[schema(example = 50)]
    pub total_marks: i32,
    /// Submission that set the score.
    #[schema(example = 7)]
    pub submission_id: i32,
    #[schema(example = "2025-10-01T14:30:05Z")]
    pub completed_at: DateTime<Utc>,
}

impl From<ScoreEntry> for ScoreEntryResponse {
    fn from(e: ScoreEntry) -> Self {
        Self {
            contest_id: e.contest_id,
            question_id: e.question_id,
            score: e.score,
            total_marks: e.total_marks,
            submission_id: e.submission_id,
            completed_at: e.completed_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ScoreListResponse {
    pub data: Vec<ScoreEntryResponse>,
}
