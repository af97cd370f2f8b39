use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct FinalizeResponse {
    #[schema(example = 1)]
    pub contest_id: i32,
    /// When the student first finalized; repeated calls return the same value.
    #[schema(example = "2025-10-01T16:00:00Z")]
    pub finalized_at: DateTime<Utc>,
}
