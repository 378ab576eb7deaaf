use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::technicianmodel::{
    DocumentStatus, TechnicianAvailability, TechnicianSkill, VerificationDocument,
};

const SKILL_COLUMNS: &str = "id, technician_id, skill_name, years_experience, created_at";

const AVAILABILITY_COLUMNS: &str =
    "id, technician_id, day_of_week, start_minute, end_minute, created_at";

const DOCUMENT_COLUMNS: &str = r#"
    id, technician_id, document_type, document_url, status, reviewed_by,
    reviewed_at, created_at
"#;

#[async_trait]
pub trait TechnicianExt {
    async fn add_skill(
        &self,
        technician_id: Uuid,
        skill_name: &str,
        years_experience: i32,
    ) -> Result<TechnicianSkill, sqlx::Error>;

    async fn get_skills(&self, technician_id: Uuid)
        -> Result<Vec<TechnicianSkill>, sqlx::Error>;

    async fn delete_skill(&self, technician_id: Uuid, skill_id: Uuid)
        -> Result<u64, sqlx::Error>;

    async fn add_availability(
        &self,
        technician_id: Uuid,
        day_of_week: i16,
        start_minute: i32,
        end_minute: i32,
    ) -> Result<TechnicianAvailability, sqlx::Error>;

    async fn get_availability(
        &self,
        technician_id: Uuid,
    ) -> Result<Vec<TechnicianAvailability>, sqlx::Error>;

    async fn delete_availability(
        &self,
        technician_id: Uuid,
        slot_id: Uuid,
    ) -> Result<u64, sqlx::Error>;

    async fn submit_document(
        &self,
        technician_id: Uuid,
        document_type: &str,
        document_url: &str,
    ) -> Result<VerificationDocument, sqlx::Error>;

    async fn get_documents(
        &self,
        technician_id: Uuid,
    ) -> Result<Vec<VerificationDocument>, sqlx::Error>;

    async fn get_pending_documents(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<VerificationDocument>, sqlx::Error>;

    async fn review_document(
        &self,
        document_id: Uuid,
        reviewer_id: Uuid,
        status: DocumentStatus,
    ) -> Result<Option<VerificationDocument>, sqlx::Error>;
}

#[async_trait]
impl TechnicianExt for DBClient {
    async fn add_skill(
        &self,
        technician_id: Uuid,
        skill_name: &str,
        years_experience: i32,
    ) -> Result<TechnicianSkill, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO technician_skills (technician_id, skill_name, years_experience)
            VALUES ($1, $2, $3)
            RETURNING {SKILL_COLUMNS}
            "#
        );

        sqlx::query_as::<_, TechnicianSkill>(&query)
            .bind(technician_id)
            .bind(skill_name)
            .bind(years_experience)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_skills(
        &self,
        technician_id: Uuid,
    ) -> Result<Vec<TechnicianSkill>, sqlx::Error> {
        let query = format!(
            "SELECT {SKILL_COLUMNS} FROM technician_skills WHERE technician_id = $1 ORDER BY skill_name"
        );

        sqlx::query_as::<_, TechnicianSkill>(&query)
            .bind(technician_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn delete_skill(
        &self,
        technician_id: Uuid,
        skill_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM technician_skills WHERE id = $1 AND technician_id = $2")
                .bind(skill_id)
                .bind(technician_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    async fn add_availability(
        &self,
        technician_id: Uuid,
        day_of_week: i16,
        start_minute: i32,
        end_minute: i32,
    ) -> Result<TechnicianAvailability, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO technician_availability
                (technician_id, day_of_week, start_minute, end_minute)
            VALUES ($1, $2, $3, $4)
            RETURNING {AVAILABILITY_COLUMNS}
            "#
        );

        sqlx::query_as::<_, TechnicianAvailability>(&query)
            .bind(technician_id)
            .bind(day_of_week)
            .bind(start_minute)
            .bind(end_minute)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_availability(
        &self,
        technician_id: Uuid,
    ) -> Result<Vec<TechnicianAvailability>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {AVAILABILITY_COLUMNS}
            FROM technician_availability
            WHERE technician_id = $1
            ORDER BY day_of_week, start_minute
            "#
        );

        sqlx::query_as::<_, TechnicianAvailability>(&query)
            .bind(technician_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn delete_availability(
        &self,
        technician_id: Uuid,
        slot_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM technician_availability WHERE id = $1 AND technician_id = $2",
        )
        .bind(slot_id)
        .bind(technician_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn submit_document(
        &self,
        technician_id: Uuid,
        document_type: &str,
        document_url: &str,
    ) -> Result<VerificationDocument, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO verification_documents (technician_id, document_type, document_url)
            VALUES ($1, $2, $3)
            RETURNING {DOCUMENT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, VerificationDocument>(&query)
            .bind(technician_id)
            .bind(document_type)
            .bind(document_url)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_documents(
        &self,
        technician_id: Uuid,
    ) -> Result<Vec<VerificationDocument>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {DOCUMENT_COLUMNS}
            FROM verification_documents
            WHERE technician_id = $1
            ORDER BY created_at DESC
            "#
        );

        sqlx::query_as::<_, VerificationDocument>(&query)
            .bind(technician_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_pending_documents(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<VerificationDocument>, sqlx::Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;
        let query = format!(
            r#"
            SELECT {DOCUMENT_COLUMNS}
            FROM verification_documents
            WHERE status = 'submitted'::document_status
            ORDER BY created_at
            LIMIT $1 OFFSET $2
            "#
        );

        sqlx::query_as::<_, VerificationDocument>(&query)
            .bind(limit as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    async fn review_document(
        &self,
        document_id: Uuid,
        reviewer_id: Uuid,
        status: DocumentStatus,
    ) -> Result<Option<VerificationDocument>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE verification_documents
            SET status = $3, reviewed_by = $2, reviewed_at = NOW()
            WHERE id = $1 AND status = 'submitted'::document_status
            RETURNING {DOCUMENT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, VerificationDocument>(&query)
            .bind(document_id)
            .bind(reviewer_id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await
    }
}
