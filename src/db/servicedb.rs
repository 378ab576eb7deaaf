use async_trait::async_trait;
use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::servicemodel::{Service, ServiceCategory};

#[async_trait]
pub trait ServiceExt {
    async fn create_category(
        &self,
        category_name: String,
        description: Option<String>,
        icon_url: Option<String>,
    ) -> Result<ServiceCategory, sqlx::Error>;

    async fn get_categories(&self) -> Result<Vec<ServiceCategory>, sqlx::Error>;

    async fn get_category_by_id(
        &self,
        category_id: Uuid,
    ) -> Result<Option<ServiceCategory>, sqlx::Error>;

    async fn delete_category(&self, category_id: Uuid) -> Result<u64, sqlx::Error>;

    #[allow(clippy::too_many_arguments)]
    async fn create_service(
        &self,
        category_id: Uuid,
        service_name: String,
        description: Option<String>,
        service_type: String,
        base_inspection_fee: BigDecimal,
        estimated_price_min: Option<BigDecimal>,
        estimated_price_max: Option<BigDecimal>,
        emergency_surcharge_percentage: Option<BigDecimal>,
    ) -> Result<Service, sqlx::Error>;

    async fn get_service_by_id(&self, service_id: Uuid) -> Result<Option<Service>, sqlx::Error>;

    async fn get_services(
        &self,
        category_id: Option<Uuid>,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Service>, sqlx::Error>;

    async fn delete_service(&self, service_id: Uuid) -> Result<u64, sqlx::Error>;
}

#[async_trait]
impl ServiceExt for DBClient {
    async fn create_category(
        &self,
        category_name: String,
        description: Option<String>,
        icon_url: Option<String>,
    ) -> Result<ServiceCategory, sqlx::Error> {
        sqlx::query_as::<_, ServiceCategory>(
            r#"
            INSERT INTO service_categories (category_name, description, icon_url)
            VALUES ($1, $2, $3)
            RETURNING id, category_name, description, icon_url, created_at
            "#,
        )
        .bind(category_name)
        .bind(description)
        .bind(icon_url)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_categories(&self) -> Result<Vec<ServiceCategory>, sqlx::Error> {
        sqlx::query_as::<_, ServiceCategory>(
            r#"
            SELECT id, category_name, description, icon_url, created_at
            FROM service_categories
            ORDER BY category_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_category_by_id(
        &self,
        category_id: Uuid,
    ) -> Result<Option<ServiceCategory>, sqlx::Error> {
        sqlx::query_as::<_, ServiceCategory>(
            r#"
            SELECT id, category_name, description, icon_url, created_at
            FROM service_categories
            WHERE id = $1
            "#,
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_category(&self, category_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM service_categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn create_service(
        &self,
        category_id: Uuid,
        service_name: String,
        description: Option<String>,
        service_type: String,
        base_inspection_fee: BigDecimal,
        estimated_price_min: Option<BigDecimal>,
        estimated_price_max: Option<BigDecimal>,
        emergency_surcharge_percentage: Option<BigDecimal>,
    ) -> Result<Service, sqlx::Error> {
        sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services
                (category_id, service_name, description, service_type,
                 base_inspection_fee, estimated_price_min, estimated_price_max,
                 emergency_surcharge_percentage)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, category_id, service_name, description, service_type,
                      base_inspection_fee, estimated_price_min, estimated_price_max,
                      emergency_surcharge_percentage, created_at
            "#,
        )
        .bind(category_id)
        .bind(service_name)
        .bind(description)
        .bind(service_type)
        .bind(base_inspection_fee)
        .bind(estimated_price_min)
        .bind(estimated_price_max)
        .bind(emergency_surcharge_percentage)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_service_by_id(&self, service_id: Uuid) -> Result<Option<Service>, sqlx::Error> {
        sqlx::query_as::<_, Service>(
            r#"
            SELECT id, category_id, service_name, description, service_type,
                   base_inspection_fee, estimated_price_min, estimated_price_max,
                   emergency_surcharge_percentage, created_at
            FROM services
            WHERE id = $1
            "#,
        )
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_services(
        &self,
        category_id: Option<Uuid>,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Service>, sqlx::Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;

        sqlx::query_as::<_, Service>(
            r#"
            SELECT id, category_id, service_name, description, service_type,
                   base_inspection_fee, estimated_price_min, estimated_price_max,
                   emergency_surcharge_percentage, created_at
            FROM services
            WHERE ($1::uuid IS NULL OR category_id = $1)
            ORDER BY service_name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(category_id)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn delete_service(&self, service_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(service_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
