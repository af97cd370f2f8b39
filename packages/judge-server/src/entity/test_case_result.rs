use common::TestCaseStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "test_case_result")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "submission_test_case")]
    pub submission_id: i32,
    #[sea_orm(unique_key = "submission_test_case")]
    pub test_case_id: i32,
    pub position: i32,

    pub status: TestCaseStatus,
    pub execution_time: i64,      // in milliseconds
    pub memory_used: Option<i64>, // in kilobytes

    #[sea_orm(column_type = "Text")]
    pub output: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub error: Option<String>,

    pub marks_awarded: i32,
    pub max_marks: i32,
    pub is_hidden: bool,

    #[sea_orm(belongs_to, from = "submission_id", to = "id")]
    pub submission: HasOne<super::submission::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
