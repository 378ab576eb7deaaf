use bigdecimal::BigDecimal;
use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tokenized card saved through the Paymob TOKEN webhook. Only the gateway
/// token and the masked PAN ever touch our storage.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub user_id: Uuid,
    pub card_type: String,
    pub last_four_digits: String,
    pub expiry_month: String,
    pub expiry_year: String,
    #[serde(skip_serializing)]
    pub card_token: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "transaction_type", rename_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    EscrowHold,
    CancelRefund,
    Payout,
    PlatformFee,
    DisputePayout,
    DisputeRefund,
}

impl TransactionType {
    pub fn to_str(&self) -> &str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::EscrowHold => "escrow_hold",
            TransactionType::CancelRefund => "cancel_refund",
            TransactionType::Payout => "payout",
            TransactionType::PlatformFee => "platform_fee",
            TransactionType::DisputePayout => "dispute_payout",
            TransactionType::DisputeRefund => "dispute_refund",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "transaction_status", rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn to_str(&self) -> &str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }
}

/// Ledger row. Rows are append-only; only `status` mutates, and only
/// pending rows ever transition.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub source_user_id: Option<Uuid>,
    pub destination_user_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub dispute_id: Option<Uuid>,
    pub transaction_type: TransactionType,
    pub amount: BigDecimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub reference: String,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // The escrow release writes a payout row for the technician's pending
    // balance plus a platform fee row. These labels are what the ledger
    // queries and the database enum agree on.
    #[test]
    fn ledger_type_labels_match_database_enum() {
        assert_eq!(TransactionType::Deposit.to_str(), "deposit");
        assert_eq!(TransactionType::EscrowHold.to_str(), "escrow_hold");
        assert_eq!(TransactionType::CancelRefund.to_str(), "cancel_refund");
        assert_eq!(TransactionType::Payout.to_str(), "payout");
        assert_eq!(TransactionType::PlatformFee.to_str(), "platform_fee");
        assert_eq!(TransactionType::DisputePayout.to_str(), "dispute_payout");
        assert_eq!(TransactionType::DisputeRefund.to_str(), "dispute_refund");
    }
}
