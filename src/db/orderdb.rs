use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::ordermodel::{OfferInitiator, Order, OrderStatus, OrderType, ProjectOffer};
use crate::models::usermodel::UserRole;

const ORDER_COLUMNS: &str = r#"
    id, client_id, service_id, technician_id, order_type, order_status,
    problem_description, requested_location, scheduled_date,
    scheduled_time_start, scheduled_time_end, expected_price, final_price,
    commission_percentage, platform_commission_amount, amount_to_technician,
    job_start_timestamp, job_done_timestamp, job_completion_timestamp,
    auto_release_date, created_at, updated_at
"#;

const OFFER_COLUMNS: &str = r#"
    id, order_id, technician_id, offered_price, offer_description, status,
    initiator, created_at, responded_at
"#;

#[async_trait]
pub trait OrderExt {
    #[allow(clippy::too_many_arguments)]
    async fn create_order(
        &self,
        client_id: Uuid,
        service_id: Uuid,
        order_type: OrderType,
        problem_description: String,
        requested_location: String,
        scheduled_date: NaiveDate,
        scheduled_time_start: String,
        scheduled_time_end: String,
        expected_price: Option<BigDecimal>,
    ) -> Result<Order, sqlx::Error>;

    async fn get_order_by_id(&self, order_id: Uuid) -> Result<Option<Order>, sqlx::Error>;

    async fn get_orders_for_user(
        &self,
        user_id: Uuid,
        role: UserRole,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Order>, sqlx::Error>;

    /// Open service requests a verified technician can bid on.
    async fn get_open_service_requests(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Order>, sqlx::Error>;

    /// Status-predicated transition. Returns None when the order was not in
    /// `from`, which makes concurrent transitions harmless.
    async fn transition_order_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, sqlx::Error>;

    async fn mark_job_started(&self, order_id: Uuid) -> Result<Option<Order>, sqlx::Error>;

    async fn mark_job_done(
        &self,
        order_id: Uuid,
        auto_release_days: i64,
    ) -> Result<Option<Order>, sqlx::Error>;

    async fn get_orders_due_for_auto_release(&self) -> Result<Vec<Uuid>, sqlx::Error>;

    async fn create_offer(
        &self,
        order_id: Uuid,
        technician_id: Uuid,
        offered_price: BigDecimal,
        offer_description: Option<String>,
        initiator: OfferInitiator,
    ) -> Result<ProjectOffer, sqlx::Error>;

    async fn get_offer_by_id(&self, offer_id: Uuid) -> Result<Option<ProjectOffer>, sqlx::Error>;

    async fn get_offers_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<ProjectOffer>, sqlx::Error>;

    /// Accepts one offer, rejects its siblings and assigns the technician to
    /// the order, all in one transaction. Fails the predicate (returns None)
    /// if the order already left `open`.
    async fn accept_offer(
        &self,
        order_id: Uuid,
        offer_id: Uuid,
        technician_id: Uuid,
        final_price: BigDecimal,
    ) -> Result<Option<Order>, sqlx::Error>;
}

#[async_trait]
impl OrderExt for DBClient {
    async fn create_order(
        &self,
        client_id: Uuid,
        service_id: Uuid,
        order_type: OrderType,
        problem_description: String,
        requested_location: String,
        scheduled_date: NaiveDate,
        scheduled_time_start: String,
        scheduled_time_end: String,
        expected_price: Option<BigDecimal>,
    ) -> Result<Order, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO orders
                (client_id, service_id, order_type, problem_description,
                 requested_location, scheduled_date, scheduled_time_start,
                 scheduled_time_end, expected_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ORDER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Order>(&query)
            .bind(client_id)
            .bind(service_id)
            .bind(order_type)
            .bind(problem_description)
            .bind(requested_location)
            .bind(scheduled_date)
            .bind(scheduled_time_start)
            .bind(scheduled_time_end)
            .bind(expected_price)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_order_by_id(&self, order_id: Uuid) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");

        sqlx::query_as::<_, Order>(&query)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_orders_for_user(
        &self,
        user_id: Uuid,
        role: UserRole,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;

        let query = match role {
            UserRole::Admin => format!(
                "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT $2 OFFSET $3"
            ),
            UserRole::Client => format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE client_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
            ),
            UserRole::Technician => format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE technician_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
            ),
        };

        sqlx::query_as::<_, Order>(&query)
            .bind(user_id)
            .bind(limit as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_open_service_requests(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;
        let query = format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE order_status = 'open'::order_status
              AND order_type = 'service_request'::order_type
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        );

        sqlx::query_as::<_, Order>(&query)
            .bind(limit as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    async fn transition_order_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE orders
            SET order_status = $3, updated_at = NOW()
            WHERE id = $1 AND order_status = $2
            RETURNING {ORDER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Order>(&query)
            .bind(order_id)
            .bind(from)
            .bind(to)
            .fetch_optional(&self.pool)
            .await
    }

    async fn mark_job_started(&self, order_id: Uuid) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE orders
            SET order_status = 'in_progress'::order_status,
                job_start_timestamp = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND order_status = 'accepted'::order_status
            RETURNING {ORDER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Order>(&query)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn mark_job_done(
        &self,
        order_id: Uuid,
        auto_release_days: i64,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE orders
            SET order_status = 'awaiting_release'::order_status,
                job_done_timestamp = NOW(),
                auto_release_date = NOW() + make_interval(days => $2::int),
                updated_at = NOW()
            WHERE id = $1 AND order_status = 'in_progress'::order_status
            RETURNING {ORDER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Order>(&query)
            .bind(order_id)
            .bind(auto_release_days as i32)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_orders_due_for_auto_release(&self) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM orders
            WHERE order_status = 'awaiting_release'::order_status
              AND auto_release_date IS NOT NULL
              AND auto_release_date <= NOW()
            ORDER BY auto_release_date
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn create_offer(
        &self,
        order_id: Uuid,
        technician_id: Uuid,
        offered_price: BigDecimal,
        offer_description: Option<String>,
        initiator: OfferInitiator,
    ) -> Result<ProjectOffer, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO project_offers
                (order_id, technician_id, offered_price, offer_description, initiator)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {OFFER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, ProjectOffer>(&query)
            .bind(order_id)
            .bind(technician_id)
            .bind(offered_price)
            .bind(offer_description)
            .bind(initiator)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_offer_by_id(&self, offer_id: Uuid) -> Result<Option<ProjectOffer>, sqlx::Error> {
        let query = format!("SELECT {OFFER_COLUMNS} FROM project_offers WHERE id = $1");

        sqlx::query_as::<_, ProjectOffer>(&query)
            .bind(offer_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_offers_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<ProjectOffer>, sqlx::Error> {
        let query = format!(
            "SELECT {OFFER_COLUMNS} FROM project_offers WHERE order_id = $1 ORDER BY created_at"
        );

        sqlx::query_as::<_, ProjectOffer>(&query)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn accept_offer(
        &self,
        order_id: Uuid,
        offer_id: Uuid,
        technician_id: Uuid,
        final_price: BigDecimal,
    ) -> Result<Option<Order>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r#"
            UPDATE orders
            SET order_status = 'accepted'::order_status,
                technician_id = $2,
                final_price = $3,
                updated_at = NOW()
            WHERE id = $1 AND order_status = 'open'::order_status
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let order = sqlx::query_as::<_, Order>(&query)
            .bind(order_id)
            .bind(technician_id)
            .bind(final_price)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(order) = order else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE project_offers
            SET status = 'accepted'::offer_status, responded_at = NOW()
            WHERE id = $1 AND status = 'pending'::offer_status
            "#,
        )
        .bind(offer_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE project_offers
            SET status = 'rejected'::offer_status, responded_at = NOW()
            WHERE order_id = $1 AND id != $2 AND status = 'pending'::offer_status
            "#,
        )
        .bind(order_id)
        .bind(offer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(order))
    }
}
