use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::error::ServiceError;
use crate::db::{DBClient, PaymentExt};
use crate::models::ordermodel::{Order, OrderStatus};
use crate::models::paymentmodel::{Transaction, TransactionType};
use crate::utils::reference::generate_transaction_reference;

/// Platform commission taken from every released escrow, in percent.
pub const PLATFORM_COMMISSION_PERCENT: u32 = 5;

/// Splits a gross amount into (commission, technician payout), both at two
/// decimal places. The payout is the remainder so the two always sum to the
/// gross amount exactly.
pub fn commission_breakdown(gross: &BigDecimal) -> (BigDecimal, BigDecimal) {
    let commission = (gross * BigDecimal::from(PLATFORM_COMMISSION_PERCENT)
        / BigDecimal::from(100u32))
    .with_scale(2);
    let payout = (gross - &commission).with_scale(2);
    (commission, payout)
}

pub fn commission_percentage() -> BigDecimal {
    BigDecimal::from(PLATFORM_COMMISSION_PERCENT).with_scale(2)
}

#[derive(Debug, Clone)]
pub struct EscrowService {
    db_client: Arc<DBClient>,
}

impl EscrowService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        EscrowService { db_client }
    }

    /// Moves the order's final price from the client's available balance
    /// into escrow.
    pub async fn hold(
        &self,
        client_id: Uuid,
        order_id: Uuid,
        amount: BigDecimal,
    ) -> Result<Transaction, ServiceError> {
        let reference = generate_transaction_reference();

        self.db_client
            .hold_escrow(client_id, order_id, amount, &reference)
            .await?
            .ok_or(ServiceError::InsufficientFunds)
    }

    /// Pays the technician out of escrow minus the platform commission and
    /// completes the order.
    pub async fn release(
        &self,
        order: &Order,
        from: OrderStatus,
        transaction_type: TransactionType,
        dispute_id: Option<Uuid>,
    ) -> Result<Order, ServiceError> {
        let total = order
            .final_price
            .clone()
            .ok_or_else(|| ServiceError::Conflict("Order has no final price".to_string()))?;
        let technician_id = order
            .technician_id
            .ok_or_else(|| ServiceError::Conflict("Order has no technician".to_string()))?;

        let (commission, payout) = commission_breakdown(&total);

        self.db_client
            .release_escrow_to_technician(
                order.id,
                from,
                order.client_id,
                technician_id,
                total,
                commission_percentage(),
                commission,
                payout,
                transaction_type,
                dispute_id,
                &generate_transaction_reference(),
                &generate_transaction_reference(),
            )
            .await?
            .ok_or_else(|| {
                ServiceError::Conflict("Order is no longer eligible for release".to_string())
            })
    }

    /// Returns the full escrow to the client and moves the order to `to`.
    pub async fn refund(
        &self,
        order: &Order,
        from: OrderStatus,
        to: OrderStatus,
        transaction_type: TransactionType,
        dispute_id: Option<Uuid>,
    ) -> Result<Order, ServiceError> {
        let total = order
            .final_price
            .clone()
            .ok_or_else(|| ServiceError::Conflict("Order has no final price".to_string()))?;

        self.db_client
            .refund_escrow_to_client(
                order.id,
                from,
                to,
                order.client_id,
                total,
                transaction_type,
                dispute_id,
                &generate_transaction_reference(),
            )
            .await?
            .ok_or_else(|| {
                ServiceError::Conflict("Order is no longer eligible for refund".to_string())
            })
    }

    /// Dispute split: the technician gets their share minus commission on
    /// that share, the client gets the rest back.
    pub async fn split(
        &self,
        order: &Order,
        technician_share: BigDecimal,
        dispute_id: Uuid,
    ) -> Result<Order, ServiceError> {
        let total = order
            .final_price
            .clone()
            .ok_or_else(|| ServiceError::Conflict("Order has no final price".to_string()))?;
        let technician_id = order
            .technician_id
            .ok_or_else(|| ServiceError::Conflict("Order has no technician".to_string()))?;

        if technician_share < BigDecimal::from(0u32) || technician_share > total {
            return Err(ServiceError::Validation(
                "Technician share must be between zero and the order total".to_string(),
            ));
        }

        let (commission, technician_net) = commission_breakdown(&technician_share);
        let client_refund = (&total - &technician_share).with_scale(2);

        self.db_client
            .split_escrow(
                order.id,
                order.client_id,
                technician_id,
                total,
                commission_percentage(),
                commission,
                technician_net,
                client_refund,
                dispute_id,
                &generate_transaction_reference(),
                &generate_transaction_reference(),
                &generate_transaction_reference(),
            )
            .await?
            .ok_or_else(|| {
                ServiceError::Conflict("Dispute is no longer eligible for settlement".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn five_percent_commission_on_round_amount() {
        let (commission, payout) = commission_breakdown(&dec("1000.00"));
        assert_eq!(commission, dec("50.00"));
        assert_eq!(payout, dec("950.00"));
    }

    #[test]
    fn breakdown_sums_back_to_gross() {
        for amount in ["0.01", "33.33", "199.99", "12345.67"] {
            let gross = dec(amount);
            let (commission, payout) = commission_breakdown(&gross);
            assert_eq!(commission + payout, gross.with_scale(2));
        }
    }

    #[test]
    fn zero_gross_yields_zero_everything() {
        let (commission, payout) = commission_breakdown(&dec("0"));
        assert_eq!(commission, dec("0.00"));
        assert_eq!(payout, dec("0.00"));
    }
}
