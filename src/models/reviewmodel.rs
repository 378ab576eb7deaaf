use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Either party of a completed order may review the other; one review per
/// (order, reviewer) pair.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Review {
    pub id: Uuid,
    pub order_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
