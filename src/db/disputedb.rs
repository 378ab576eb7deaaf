use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::disputemodel::{Dispute, DisputeResolution, DisputeStatus};

const DISPUTE_COLUMNS: &str = r#"
    id, order_id, initiator_id, client_argument, technician_argument,
    admin_notes, status, resolution, resolution_date, created_at
"#;

#[async_trait]
pub trait DisputeExt {
    async fn create_dispute(
        &self,
        order_id: Uuid,
        initiator_id: Uuid,
        client_argument: Option<String>,
        technician_argument: Option<String>,
    ) -> Result<Dispute, sqlx::Error>;

    async fn get_dispute_by_id(&self, dispute_id: Uuid) -> Result<Option<Dispute>, sqlx::Error>;

    async fn get_dispute_for_order(&self, order_id: Uuid)
        -> Result<Option<Dispute>, sqlx::Error>;

    async fn get_disputes(
        &self,
        status: Option<DisputeStatus>,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Dispute>, sqlx::Error>;

    /// The counterparty files their side; an open dispute moves to review.
    async fn add_dispute_argument(
        &self,
        dispute_id: Uuid,
        client_argument: Option<String>,
        technician_argument: Option<String>,
    ) -> Result<Option<Dispute>, sqlx::Error>;

    /// Status-predicated: only an unresolved dispute can be resolved.
    async fn resolve_dispute(
        &self,
        dispute_id: Uuid,
        resolution: DisputeResolution,
        admin_notes: Option<String>,
    ) -> Result<Option<Dispute>, sqlx::Error>;
}

#[async_trait]
impl DisputeExt for DBClient {
    async fn create_dispute(
        &self,
        order_id: Uuid,
        initiator_id: Uuid,
        client_argument: Option<String>,
        technician_argument: Option<String>,
    ) -> Result<Dispute, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO disputes (order_id, initiator_id, client_argument, technician_argument)
            VALUES ($1, $2, $3, $4)
            RETURNING {DISPUTE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Dispute>(&query)
            .bind(order_id)
            .bind(initiator_id)
            .bind(client_argument)
            .bind(technician_argument)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_dispute_by_id(&self, dispute_id: Uuid) -> Result<Option<Dispute>, sqlx::Error> {
        let query = format!("SELECT {DISPUTE_COLUMNS} FROM disputes WHERE id = $1");

        sqlx::query_as::<_, Dispute>(&query)
            .bind(dispute_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_dispute_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Option<Dispute>, sqlx::Error> {
        let query = format!(
            "SELECT {DISPUTE_COLUMNS} FROM disputes WHERE order_id = $1 ORDER BY created_at DESC"
        );

        sqlx::query_as::<_, Dispute>(&query)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_disputes(
        &self,
        status: Option<DisputeStatus>,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Dispute>, sqlx::Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;
        let query = format!(
            r#"
            SELECT {DISPUTE_COLUMNS}
            FROM disputes
            WHERE ($1::dispute_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );

        sqlx::query_as::<_, Dispute>(&query)
            .bind(status)
            .bind(limit as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    async fn add_dispute_argument(
        &self,
        dispute_id: Uuid,
        client_argument: Option<String>,
        technician_argument: Option<String>,
    ) -> Result<Option<Dispute>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE disputes
            SET client_argument = COALESCE($2, client_argument),
                technician_argument = COALESCE($3, technician_argument),
                status = 'in_review'::dispute_status
            WHERE id = $1 AND status != 'resolved'::dispute_status
            RETURNING {DISPUTE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Dispute>(&query)
            .bind(dispute_id)
            .bind(client_argument)
            .bind(technician_argument)
            .fetch_optional(&self.pool)
            .await
    }

    async fn resolve_dispute(
        &self,
        dispute_id: Uuid,
        resolution: DisputeResolution,
        admin_notes: Option<String>,
    ) -> Result<Option<Dispute>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE disputes
            SET status = 'resolved'::dispute_status,
                resolution = $2,
                admin_notes = COALESCE($3, admin_notes),
                resolution_date = NOW()
            WHERE id = $1 AND status != 'resolved'::dispute_status
            RETURNING {DISPUTE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Dispute>(&query)
            .bind(dispute_id)
            .bind(resolution)
            .bind(admin_notes)
            .fetch_optional(&self.pool)
            .await
    }
}
