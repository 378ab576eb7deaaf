use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "dispute_status", rename_all = "snake_case")]
pub enum DisputeStatus {
    Open,
    InReview,
    Resolved,
}

impl DisputeStatus {
    pub fn to_str(&self) -> &str {
        match self {
            DisputeStatus::Open => "open",
            DisputeStatus::InReview => "in_review",
            DisputeStatus::Resolved => "resolved",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "dispute_resolution", rename_all = "snake_case")]
pub enum DisputeResolution {
    PayTechnician,
    RefundClient,
    SplitPayment,
}

impl DisputeResolution {
    pub fn to_str(&self) -> &str {
        match self {
            DisputeResolution::PayTechnician => "pay_technician",
            DisputeResolution::RefundClient => "refund_client",
            DisputeResolution::SplitPayment => "split_payment",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Dispute {
    pub id: Uuid,
    pub order_id: Uuid,
    pub initiator_id: Uuid,
    pub client_argument: Option<String>,
    pub technician_argument: Option<String>,
    pub admin_notes: Option<String>,
    pub status: DisputeStatus,
    pub resolution: Option<DisputeResolution>,
    pub resolution_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
