use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::error::ServiceError;
use super::escrow::EscrowService;
use super::notification::NotificationService;
use crate::db::{DBClient, DisputeExt, OrderExt};
use crate::models::disputemodel::{Dispute, DisputeResolution, DisputeStatus};
use crate::models::ordermodel::{Order, OrderStatus};
use crate::models::paymentmodel::TransactionType;
use crate::models::usermodel::{User, UserRole};

#[derive(Debug, Clone)]
pub struct DisputeService {
    db_client: Arc<DBClient>,
    escrow: EscrowService,
    notifications: NotificationService,
}

impl DisputeService {
    pub fn new(
        db_client: Arc<DBClient>,
        escrow: EscrowService,
        notifications: NotificationService,
    ) -> Self {
        DisputeService {
            db_client,
            escrow,
            notifications,
        }
    }

    /// Freezes the order and opens a dispute. Possible while the job runs or
    /// during the confirmation window; the escrow stays locked until an
    /// admin resolves it.
    pub async fn open_dispute(
        &self,
        user: &User,
        order_id: Uuid,
        argument: Option<String>,
    ) -> Result<Dispute, ServiceError> {
        let order = self
            .db_client
            .get_order_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        let is_party = order.client_id == user.id || order.technician_id == Some(user.id);
        if !is_party {
            return Err(ServiceError::Forbidden(
                "You are not a party to this order".to_string(),
            ));
        }

        let from = match order.order_status {
            OrderStatus::InProgress | OrderStatus::AwaitingRelease => order.order_status,
            _ => {
                return Err(ServiceError::Conflict(
                    "Order cannot be disputed in its current state".to_string(),
                ))
            }
        };

        if let Some(existing) = self.db_client.get_dispute_for_order(order_id).await? {
            if existing.status != DisputeStatus::Resolved {
                return Err(ServiceError::Conflict(
                    "Order already has an open dispute".to_string(),
                ));
            }
        }

        self.db_client
            .transition_order_status(order_id, from, OrderStatus::Disputed)
            .await?
            .ok_or_else(|| {
                ServiceError::Conflict("Order state changed, try again".to_string())
            })?;

        let (client_argument, technician_argument) = if user.id == order.client_id {
            (argument, None)
        } else {
            (None, argument)
        };

        let dispute = self
            .db_client
            .create_dispute(order_id, user.id, client_argument, technician_argument)
            .await?;

        let counterparty = if user.id == order.client_id {
            order.technician_id
        } else {
            Some(order.client_id)
        };
        if let Some(counterparty) = counterparty {
            self.notify_quietly(
                counterparty,
                "dispute_opened",
                "Dispute opened",
                "A dispute was opened on your order. You can submit your side of the story.",
                Some(order_id),
            )
            .await;
        }

        Ok(dispute)
    }

    /// The counterparty (or the initiator, amending) files their argument.
    pub async fn respond(
        &self,
        user: &User,
        dispute_id: Uuid,
        argument: String,
    ) -> Result<Dispute, ServiceError> {
        let dispute = self
            .db_client
            .get_dispute_by_id(dispute_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Dispute not found".to_string()))?;

        let order = self
            .db_client
            .get_order_by_id(dispute.order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        let (client_argument, technician_argument) = if user.id == order.client_id {
            (Some(argument), None)
        } else if order.technician_id == Some(user.id) {
            (None, Some(argument))
        } else {
            return Err(ServiceError::Forbidden(
                "You are not a party to this dispute".to_string(),
            ));
        };

        self.db_client
            .add_dispute_argument(dispute_id, client_argument, technician_argument)
            .await?
            .ok_or_else(|| {
                ServiceError::Conflict("Dispute is already resolved".to_string())
            })
    }

    pub async fn get_dispute(
        &self,
        user: &User,
        dispute_id: Uuid,
    ) -> Result<Dispute, ServiceError> {
        let dispute = self
            .db_client
            .get_dispute_by_id(dispute_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Dispute not found".to_string()))?;

        if user.role == UserRole::Admin {
            return Ok(dispute);
        }

        let order = self
            .db_client
            .get_order_by_id(dispute.order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        let is_party = order.client_id == user.id || order.technician_id == Some(user.id);
        if !is_party {
            return Err(ServiceError::Forbidden(
                "You are not a party to this dispute".to_string(),
            ));
        }
        Ok(dispute)
    }

    pub async fn list_disputes(
        &self,
        status: Option<DisputeStatus>,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Dispute>, ServiceError> {
        Ok(self.db_client.get_disputes(status, page, limit).await?)
    }

    /// Admin settlement. The money moves first under the disputed-order
    /// predicate, so a double submit settles exactly once.
    pub async fn resolve(
        &self,
        dispute_id: Uuid,
        resolution: DisputeResolution,
        admin_notes: Option<String>,
        technician_share: Option<BigDecimal>,
    ) -> Result<Dispute, ServiceError> {
        let dispute = self
            .db_client
            .get_dispute_by_id(dispute_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Dispute not found".to_string()))?;

        if dispute.status == DisputeStatus::Resolved {
            return Err(ServiceError::Conflict(
                "Dispute is already resolved".to_string(),
            ));
        }

        let order = self
            .db_client
            .get_order_by_id(dispute.order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        let settled: Order = match resolution {
            DisputeResolution::PayTechnician => {
                self.escrow
                    .release(
                        &order,
                        OrderStatus::Disputed,
                        TransactionType::DisputePayout,
                        Some(dispute_id),
                    )
                    .await?
            }
            DisputeResolution::RefundClient => {
                self.escrow
                    .refund(
                        &order,
                        OrderStatus::Disputed,
                        OrderStatus::Refunded,
                        TransactionType::DisputeRefund,
                        Some(dispute_id),
                    )
                    .await?
            }
            DisputeResolution::SplitPayment => {
                let share = technician_share.ok_or_else(|| {
                    ServiceError::Validation(
                        "Split resolution requires a technician share".to_string(),
                    )
                })?;
                self.escrow.split(&order, share, dispute_id).await?
            }
        };

        let resolved = self
            .db_client
            .resolve_dispute(dispute_id, resolution, admin_notes)
            .await?
            .unwrap_or(dispute);

        self.notify_quietly(
            settled.client_id,
            "dispute_resolved",
            "Dispute resolved",
            &format!("Your dispute was resolved: {}", resolution.to_str()),
            Some(settled.id),
        )
        .await;
        if let Some(technician_id) = settled.technician_id {
            self.notify_quietly(
                technician_id,
                "dispute_resolved",
                "Dispute resolved",
                &format!("Your dispute was resolved: {}", resolution.to_str()),
                Some(settled.id),
            )
            .await;
        }

        Ok(resolved)
    }

    async fn notify_quietly(
        &self,
        user_id: Uuid,
        notification_type: &str,
        title: &str,
        message: &str,
        order_id: Option<Uuid>,
    ) {
        if let Err(e) = self
            .notifications
            .notify(user_id, notification_type, title, message, order_id, None)
            .await
        {
            tracing::warn!("notification failed for {}: {}", user_id, e);
        }
    }
}
