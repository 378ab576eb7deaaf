use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use uuid::Uuid;

use super::error::ServiceError;
use super::escrow::EscrowService;
use super::notification::NotificationService;
use crate::db::{DBClient, OrderExt, PaymentExt, ServiceExt, UserExt};
use crate::models::ordermodel::{
    OfferInitiator, OfferStatus, Order, OrderStatus, OrderType, ProjectOffer,
};
use crate::models::paymentmodel::TransactionType;
use crate::models::usermodel::{User, UserRole, VerificationStatus};

/// Days a client has to confirm completion before escrow releases on its own.
pub const AUTO_RELEASE_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub service_id: Uuid,
    pub order_type: OrderType,
    pub technician_id: Option<Uuid>,
    pub problem_description: String,
    pub requested_location: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time_start: String,
    pub scheduled_time_end: String,
    pub expected_price: Option<BigDecimal>,
}

#[derive(Debug, Clone)]
pub struct OrderService {
    db_client: Arc<DBClient>,
    escrow: EscrowService,
    notifications: NotificationService,
}

impl OrderService {
    pub fn new(
        db_client: Arc<DBClient>,
        escrow: EscrowService,
        notifications: NotificationService,
    ) -> Self {
        OrderService {
            db_client,
            escrow,
            notifications,
        }
    }

    pub async fn create_order(
        &self,
        client: &User,
        input: NewOrder,
    ) -> Result<Order, ServiceError> {
        self.db_client
            .get_service_by_id(input.service_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Service not found".to_string()))?;

        if input.order_type == OrderType::DirectHire {
            let technician_id = input.technician_id.ok_or_else(|| {
                ServiceError::Validation(
                    "Direct hire orders require a technician".to_string(),
                )
            })?;
            let expected_price = input.expected_price.clone().ok_or_else(|| {
                ServiceError::Validation(
                    "Direct hire orders require an expected price".to_string(),
                )
            })?;

            let technician = self.require_approved_technician(technician_id).await?;

            let order = self
                .db_client
                .create_order(
                    client.id,
                    input.service_id,
                    input.order_type,
                    input.problem_description,
                    input.requested_location,
                    input.scheduled_date,
                    input.scheduled_time_start,
                    input.scheduled_time_end,
                    Some(expected_price.clone()),
                )
                .await?;

            let offer = self
                .db_client
                .create_offer(
                    order.id,
                    technician.id,
                    expected_price,
                    None,
                    OfferInitiator::Client,
                )
                .await?;

            self.notify_quietly(
                technician.id,
                "direct_hire_request",
                "New hire request",
                &format!("{} wants to hire you for a job", client.full_name()),
                Some(order.id),
                Some(offer.id),
            )
            .await;

            Ok(order)
        } else {
            let order = self
                .db_client
                .create_order(
                    client.id,
                    input.service_id,
                    input.order_type,
                    input.problem_description,
                    input.requested_location,
                    input.scheduled_date,
                    input.scheduled_time_start,
                    input.scheduled_time_end,
                    input.expected_price,
                )
                .await?;

            Ok(order)
        }
    }

    pub async fn get_order(&self, user: &User, order_id: Uuid) -> Result<Order, ServiceError> {
        let order = self
            .db_client
            .get_order_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        self.require_party(user, &order)?;
        Ok(order)
    }

    pub async fn list_orders(
        &self,
        user: &User,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Order>, ServiceError> {
        Ok(self
            .db_client
            .get_orders_for_user(user.id, user.role, page, limit)
            .await?)
    }

    pub async fn list_open_requests(
        &self,
        technician: &User,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Order>, ServiceError> {
        self.require_approved(technician)?;
        Ok(self.db_client.get_open_service_requests(page, limit).await?)
    }

    /// A technician bids on an open order. On direct hires only the invited
    /// technician may respond, with a counter-offer.
    pub async fn submit_offer(
        &self,
        technician: &User,
        order_id: Uuid,
        offered_price: BigDecimal,
        offer_description: Option<String>,
    ) -> Result<ProjectOffer, ServiceError> {
        self.require_approved(technician)?;

        let order = self
            .db_client
            .get_order_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        if order.order_status != OrderStatus::Open {
            return Err(ServiceError::Conflict(
                "Order is no longer accepting offers".to_string(),
            ));
        }
        if order.client_id == technician.id {
            return Err(ServiceError::Forbidden(
                "You cannot bid on your own order".to_string(),
            ));
        }

        if order.order_type == OrderType::DirectHire {
            let invited = self
                .db_client
                .get_offers_for_order(order_id)
                .await?
                .iter()
                .any(|o| o.technician_id == technician.id);
            if !invited {
                return Err(ServiceError::Forbidden(
                    "Only the invited technician can respond to a direct hire".to_string(),
                ));
            }
        }

        let offer = self
            .db_client
            .create_offer(
                order_id,
                technician.id,
                offered_price,
                offer_description,
                OfferInitiator::Technician,
            )
            .await?;

        self.notify_quietly(
            order.client_id,
            "new_offer",
            "New offer on your order",
            &format!("{} made an offer on your order", technician.full_name()),
            Some(order_id),
            Some(offer.id),
        )
        .await;

        Ok(offer)
    }

    pub async fn list_offers(
        &self,
        user: &User,
        order_id: Uuid,
    ) -> Result<Vec<ProjectOffer>, ServiceError> {
        let order = self
            .db_client
            .get_order_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        let offers = self.db_client.get_offers_for_order(order_id).await?;

        if user.role == UserRole::Admin || order.client_id == user.id {
            return Ok(offers);
        }
        // Technicians only see their own offers on someone else's order.
        Ok(offers
            .into_iter()
            .filter(|o| o.technician_id == user.id)
            .collect())
    }

    /// Accepting an offer locks in the price, assigns the technician and
    /// moves the full amount into escrow. Whoever did not initiate the offer
    /// is the one entitled to accept it.
    pub async fn accept_offer(
        &self,
        user: &User,
        offer_id: Uuid,
    ) -> Result<Order, ServiceError> {
        let offer = self
            .db_client
            .get_offer_by_id(offer_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Offer not found".to_string()))?;

        if offer.status != OfferStatus::Pending {
            return Err(ServiceError::Conflict(
                "Offer has already been responded to".to_string(),
            ));
        }

        let order = self
            .db_client
            .get_order_by_id(offer.order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        if order.order_status != OrderStatus::Open {
            return Err(ServiceError::Conflict(
                "Order is no longer open".to_string(),
            ));
        }

        let entitled = match offer.initiator {
            OfferInitiator::Technician => user.id == order.client_id,
            OfferInitiator::Client => user.id == offer.technician_id,
        };
        if !entitled {
            return Err(ServiceError::Forbidden(
                "You cannot accept this offer".to_string(),
            ));
        }

        let price = offer.offered_price.clone();

        // Funds always come from the client, no matter who accepts.
        let hold = self.escrow.hold(order.client_id, order.id, price.clone()).await?;

        let accepted = self
            .db_client
            .accept_offer(order.id, offer.id, offer.technician_id, price.clone())
            .await?;

        let Some(accepted) = accepted else {
            // Lost the race for the order. Give the money back.
            self.db_client
                .release_hold(order.client_id, order.id, price, &hold.reference)
                .await?;
            return Err(ServiceError::Conflict(
                "Order was accepted by someone else".to_string(),
            ));
        };

        self.notify_quietly(
            offer.technician_id,
            "offer_accepted",
            "Offer accepted",
            "Your offer was accepted. The funds are held in escrow.",
            Some(order.id),
            Some(offer.id),
        )
        .await;
        self.notify_quietly(
            order.client_id,
            "order_accepted",
            "Order confirmed",
            "A technician is assigned and your payment is held in escrow.",
            Some(order.id),
            Some(offer.id),
        )
        .await;

        Ok(accepted)
    }

    pub async fn start_job(
        &self,
        technician: &User,
        order_id: Uuid,
    ) -> Result<Order, ServiceError> {
        let order = self.require_assigned(technician, order_id).await?;

        if !order.order_status.can_transition_to(OrderStatus::InProgress) {
            return Err(ServiceError::Conflict(
                "Order is not ready to start".to_string(),
            ));
        }

        let started = self
            .db_client
            .mark_job_started(order.id)
            .await?
            .ok_or_else(|| {
                ServiceError::Conflict("Order is not ready to start".to_string())
            })?;

        self.notify_quietly(
            started.client_id,
            "job_started",
            "Work started",
            "Your technician has started the job.",
            Some(order_id),
            None,
        )
        .await;

        Ok(started)
    }

    /// The technician declares the work finished. The client now has
    /// AUTO_RELEASE_DAYS to confirm or dispute before escrow auto-releases.
    pub async fn mark_job_done(
        &self,
        technician: &User,
        order_id: Uuid,
    ) -> Result<Order, ServiceError> {
        let order = self.require_assigned(technician, order_id).await?;

        if !order.order_status.can_transition_to(OrderStatus::AwaitingRelease) {
            return Err(ServiceError::Conflict(
                "Order is not in progress".to_string(),
            ));
        }

        let done = self
            .db_client
            .mark_job_done(order.id, AUTO_RELEASE_DAYS)
            .await?
            .ok_or_else(|| {
                ServiceError::Conflict("Order is not in progress".to_string())
            })?;

        self.notify_quietly(
            done.client_id,
            "job_done",
            "Job marked as done",
            &format!(
                "Please confirm completion or raise a dispute within {} days.",
                AUTO_RELEASE_DAYS
            ),
            Some(order_id),
            None,
        )
        .await;

        Ok(done)
    }

    /// The client confirms completion; escrow pays out immediately.
    pub async fn release_funds(
        &self,
        client: &User,
        order_id: Uuid,
    ) -> Result<Order, ServiceError> {
        let order = self
            .db_client
            .get_order_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        if order.client_id != client.id {
            return Err(ServiceError::Forbidden(
                "Only the client can release funds".to_string(),
            ));
        }

        if !order.order_status.can_transition_to(OrderStatus::Completed) {
            return Err(ServiceError::Conflict(
                "Order is not awaiting release".to_string(),
            ));
        }

        let completed = self
            .escrow
            .release(
                &order,
                OrderStatus::AwaitingRelease,
                TransactionType::Payout,
                None,
            )
            .await?;

        if let Some(technician_id) = completed.technician_id {
            self.notify_quietly(
                technician_id,
                "funds_released",
                "Payment released",
                "The client confirmed completion. Your payout is available.",
                Some(order_id),
                None,
            )
            .await;
        }

        Ok(completed)
    }

    pub async fn cancel_order(
        &self,
        user: &User,
        order_id: Uuid,
    ) -> Result<Order, ServiceError> {
        let order = self
            .db_client
            .get_order_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        if !order.order_status.can_transition_to(OrderStatus::Cancelled) {
            return Err(ServiceError::Conflict(
                "Order can no longer be cancelled".to_string(),
            ));
        }

        match order.order_status {
            OrderStatus::Open => {
                if order.client_id != user.id {
                    return Err(ServiceError::Forbidden(
                        "Only the client can cancel an open order".to_string(),
                    ));
                }

                self.db_client
                    .transition_order_status(order.id, OrderStatus::Open, OrderStatus::Cancelled)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::Conflict("Order is no longer open".to_string())
                    })
            }
            OrderStatus::Accepted => {
                let is_party =
                    order.client_id == user.id || order.technician_id == Some(user.id);
                if !is_party {
                    return Err(ServiceError::Forbidden(
                        "Only a party to the order can cancel it".to_string(),
                    ));
                }

                let cancelled = self
                    .escrow
                    .refund(
                        &order,
                        OrderStatus::Accepted,
                        OrderStatus::Cancelled,
                        TransactionType::CancelRefund,
                        None,
                    )
                    .await?;

                let counterparty = if user.id == order.client_id {
                    order.technician_id
                } else {
                    Some(order.client_id)
                };
                if let Some(counterparty) = counterparty {
                    self.notify_quietly(
                        counterparty,
                        "order_cancelled",
                        "Order cancelled",
                        "The order was cancelled and the escrow refunded.",
                        Some(order_id),
                        None,
                    )
                    .await;
                }

                Ok(cancelled)
            }
            _ => Err(ServiceError::Conflict(
                "Order can no longer be cancelled".to_string(),
            )),
        }
    }

    /// Releases every overdue escrow. Runs from the background job; each
    /// release is individually atomic so a crash mid-batch loses nothing.
    pub async fn process_auto_release(&self) -> Result<usize, ServiceError> {
        let due = self.db_client.get_orders_due_for_auto_release().await?;
        let mut released = 0;

        for order_id in due {
            let Some(order) = self.db_client.get_order_by_id(order_id).await? else {
                continue;
            };

            match self
                .escrow
                .release(
                    &order,
                    OrderStatus::AwaitingRelease,
                    TransactionType::Payout,
                    None,
                )
                .await
            {
                Ok(completed) => {
                    released += 1;

                    if let Some(technician_id) = completed.technician_id {
                        self.notify_quietly(
                            technician_id,
                            "funds_released",
                            "Payment auto-released",
                            "The confirmation window passed. Your payout is available.",
                            Some(order_id),
                            None,
                        )
                        .await;
                    }
                    self.notify_quietly(
                        order.client_id,
                        "funds_released",
                        "Escrow auto-released",
                        "The escrow for your order was released to the technician.",
                        Some(order_id),
                        None,
                    )
                    .await;
                }
                Err(ServiceError::Conflict(_)) => {
                    // Disputed or already released since we read the id.
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(released)
    }

    async fn require_approved_technician(&self, user_id: Uuid) -> Result<User, ServiceError> {
        let user = self
            .db_client
            .get_user(Some(user_id), None, None)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Technician not found".to_string()))?;

        if user.role != UserRole::Technician
            || user.verification_status != VerificationStatus::Approved
        {
            return Err(ServiceError::Validation(
                "Selected user is not a verified technician".to_string(),
            ));
        }
        Ok(user)
    }

    fn require_approved(&self, technician: &User) -> Result<(), ServiceError> {
        if technician.role != UserRole::Technician
            || technician.verification_status != VerificationStatus::Approved
        {
            return Err(ServiceError::Forbidden(
                "Only verified technicians can do this".to_string(),
            ));
        }
        Ok(())
    }

    fn require_party(&self, user: &User, order: &Order) -> Result<(), ServiceError> {
        let allowed = user.role == UserRole::Admin
            || order.client_id == user.id
            || order.technician_id == Some(user.id);
        if !allowed {
            return Err(ServiceError::Forbidden(
                "You are not a party to this order".to_string(),
            ));
        }
        Ok(())
    }

    async fn require_assigned(
        &self,
        technician: &User,
        order_id: Uuid,
    ) -> Result<Order, ServiceError> {
        let order = self
            .db_client
            .get_order_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        if order.technician_id != Some(technician.id) {
            return Err(ServiceError::Forbidden(
                "You are not assigned to this order".to_string(),
            ));
        }
        Ok(order)
    }

    async fn notify_quietly(
        &self,
        user_id: Uuid,
        notification_type: &str,
        title: &str,
        message: &str,
        order_id: Option<Uuid>,
        offer_id: Option<Uuid>,
    ) {
        if let Err(e) = self
            .notifications
            .notify(user_id, notification_type, title, message, order_id, offer_id)
            .await
        {
            tracing::warn!("notification failed for {}: {}", user_id, e);
        }
    }
}
