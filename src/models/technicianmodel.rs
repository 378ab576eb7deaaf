use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct TechnicianSkill {
    pub id: Uuid,
    pub technician_id: Uuid,
    pub skill_name: String,
    pub years_experience: i32,
    pub created_at: DateTime<Utc>,
}

/// A weekly recurring slot. `day_of_week` is 0 (Monday) through 6 (Sunday);
/// times are minutes since midnight so overlap checks stay integer math.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct TechnicianAvailability {
    pub id: Uuid,
    pub technician_id: Uuid,
    pub day_of_week: i16,
    pub start_minute: i32,
    pub end_minute: i32,
    pub created_at: DateTime<Utc>,
}

impl TechnicianAvailability {
    pub fn overlaps(&self, other: &TechnicianAvailability) -> bool {
        self.day_of_week == other.day_of_week
            && self.start_minute < other.end_minute
            && other.start_minute < self.end_minute
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "document_status", rename_all = "snake_case")]
pub enum DocumentStatus {
    Submitted,
    Approved,
    Rejected,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct VerificationDocument {
    pub id: Uuid,
    pub technician_id: Uuid,
    pub document_type: String,
    pub document_url: String,
    pub status: DocumentStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: i16, start: i32, end: i32) -> TechnicianAvailability {
        TechnicianAvailability {
            id: Uuid::new_v4(),
            technician_id: Uuid::new_v4(),
            day_of_week: day,
            start_minute: start,
            end_minute: end,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn overlapping_slots_on_same_day_detected() {
        assert!(slot(1, 540, 720).overlaps(&slot(1, 600, 660)));
        assert!(slot(1, 540, 720).overlaps(&slot(1, 700, 800)));
    }

    #[test]
    fn adjacent_or_other_day_slots_do_not_overlap() {
        assert!(!slot(1, 540, 600).overlaps(&slot(1, 600, 660)));
        assert!(!slot(1, 540, 720).overlaps(&slot(2, 540, 720)));
    }
}
