use bigdecimal::BigDecimal;
use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "order_type", rename_all = "snake_case")]
pub enum OrderType {
    DirectHire,
    ServiceRequest,
}

impl OrderType {
    pub fn to_str(&self) -> &str {
        match self {
            OrderType::DirectHire => "direct_hire",
            OrderType::ServiceRequest => "service_request",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    Accepted,
    InProgress,
    AwaitingRelease,
    Completed,
    Disputed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn to_str(&self) -> &str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Accepted => "accepted",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::AwaitingRelease => "awaiting_release",
            OrderStatus::Completed => "completed",
            OrderStatus::Disputed => "disputed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        matches!(
            (self, to),
            (OrderStatus::Open, OrderStatus::Accepted)
                | (OrderStatus::Open, OrderStatus::Cancelled)
                | (OrderStatus::Accepted, OrderStatus::InProgress)
                | (OrderStatus::Accepted, OrderStatus::Cancelled)
                | (OrderStatus::InProgress, OrderStatus::AwaitingRelease)
                | (OrderStatus::InProgress, OrderStatus::Disputed)
                | (OrderStatus::AwaitingRelease, OrderStatus::Completed)
                | (OrderStatus::AwaitingRelease, OrderStatus::Disputed)
                | (OrderStatus::Disputed, OrderStatus::Completed)
                | (OrderStatus::Disputed, OrderStatus::Refunded)
        )
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "offer_status", rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "offer_initiator", rename_all = "snake_case")]
pub enum OfferInitiator {
    Client,
    Technician,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Order {
    pub id: Uuid,
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub technician_id: Option<Uuid>,
    pub order_type: OrderType,
    pub order_status: OrderStatus,
    pub problem_description: String,
    pub requested_location: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time_start: String,
    pub scheduled_time_end: String,
    pub expected_price: Option<BigDecimal>,

    // Price breakdown. All NULL until the order leaves `open`.
    pub final_price: Option<BigDecimal>,
    pub commission_percentage: Option<BigDecimal>,
    pub platform_commission_amount: Option<BigDecimal>,
    pub amount_to_technician: Option<BigDecimal>,

    pub job_start_timestamp: Option<DateTime<Utc>>,
    pub job_done_timestamp: Option<DateTime<Utc>>,
    pub job_completion_timestamp: Option<DateTime<Utc>>,
    pub auto_release_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct ProjectOffer {
    pub id: Uuid,
    pub order_id: Uuid,
    pub technician_id: Uuid,
    pub offered_price: BigDecimal,
    pub offer_description: Option<String>,
    pub status: OfferStatus,
    pub initiator: OfferInitiator,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions_are_legal() {
        assert!(OrderStatus::Open.can_transition_to(OrderStatus::Accepted));
        assert!(OrderStatus::Accepted.can_transition_to(OrderStatus::InProgress));
        assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::AwaitingRelease));
        assert!(OrderStatus::AwaitingRelease.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn dispute_paths_are_legal() {
        assert!(OrderStatus::AwaitingRelease.can_transition_to(OrderStatus::Disputed));
        assert!(OrderStatus::Disputed.can_transition_to(OrderStatus::Refunded));
        assert!(OrderStatus::Disputed.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn terminal_and_backward_transitions_are_illegal() {
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Open));
        assert!(!OrderStatus::Open.can_transition_to(OrderStatus::AwaitingRelease));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Accepted));
        assert!(!OrderStatus::Open.can_transition_to(OrderStatus::Disputed));
    }
}
