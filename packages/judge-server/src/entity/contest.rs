use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contest")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,
    /// Administrative switch, independent of the time window.
    pub is_active: bool,
    /// JSON array of language tags, e.g. `["cpp", "python"]`.
    #[sea_orm(column_type = "JsonBinary")]
    pub allowed_languages: serde_json::Value,
    /// Submissions allowed per student per question.
    pub max_attempts: i32,

    #[sea_orm(has_many)]
    pub questions: HasMany<super::question::Entity>,

    #[sea_orm(has_many)]
    pub participants: HasMany<super::contest_participant::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
