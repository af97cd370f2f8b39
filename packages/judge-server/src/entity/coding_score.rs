use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Best-ever score of a student on one contest question.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coding_score")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub student_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub contest_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub question_id: i32,

    pub score: i32,
    pub total_marks: i32,
    /// Submission that produced `score`.
    pub submission_id: i32,
    #[sea_orm(column_type = "Text")]
    pub code: String,
    pub completed_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
