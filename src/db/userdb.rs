use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usermodel::{User, UserRole, VerificationStatus};

pub const USER_COLUMNS: &str = r#"
    id, first_name, last_name, username, email, password, role, phone_number,
    address, bio, profile_photo_url, account_status, verification_status,
    overall_rating, num_jobs_completed, available_balance, pending_balance,
    in_escrow_balance, email_verified, verification_token, token_expires_at,
    created_at, updated_at
"#;

#[async_trait]
pub trait UserExt {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
        token: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn get_users(&self, page: u32, limit: usize) -> Result<Vec<User>, sqlx::Error>;

    async fn get_user_count(&self) -> Result<i64, sqlx::Error>;

    #[allow(clippy::too_many_arguments)]
    async fn save_user<T: Into<String> + Send>(
        &self,
        first_name: T,
        last_name: T,
        email: T,
        password: T,
        role: UserRole,
        phone_number: Option<String>,
        verification_token: T,
        token_expires_at: DateTime<Utc>,
    ) -> Result<User, sqlx::Error>;

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        phone_number: Option<String>,
        address: Option<String>,
        bio: Option<String>,
        profile_photo_url: Option<String>,
    ) -> Result<User, sqlx::Error>;

    async fn update_user_password(
        &self,
        user_id: Uuid,
        password: String,
    ) -> Result<User, sqlx::Error>;

    async fn mark_email_verified(&self, token: &str) -> Result<(), sqlx::Error>;

    async fn clear_verification_token(&self, user_id: Uuid) -> Result<(), sqlx::Error>;

    async fn set_verification_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error>;

    async fn set_verification_status(
        &self,
        user_id: Uuid,
        status: VerificationStatus,
    ) -> Result<User, sqlx::Error>;

    async fn get_verified_technicians(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<User>, sqlx::Error>;

    async fn update_rating_aggregates(
        &self,
        technician_id: Uuid,
        overall_rating: BigDecimal,
        num_jobs_completed: i32,
    ) -> Result<User, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
        token: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE ($1::uuid IS NULL OR id = $1)
              AND ($2::text IS NULL OR email = $2)
              AND ($3::text IS NULL OR verification_token = $3)
              AND ($1 IS NOT NULL OR $2 IS NOT NULL OR $3 IS NOT NULL)
            "#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(email)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_users(&self, page: u32, limit: usize) -> Result<Vec<User>, sqlx::Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;
        let query = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(limit as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_user_count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
    }

    async fn save_user<T: Into<String> + Send>(
        &self,
        first_name: T,
        last_name: T,
        email: T,
        password: T,
        role: UserRole,
        phone_number: Option<String>,
        verification_token: T,
        token_expires_at: DateTime<Utc>,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO users
                (first_name, last_name, email, password, role, phone_number,
                 verification_token, token_expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(first_name.into())
            .bind(last_name.into())
            .bind(email.into())
            .bind(password.into())
            .bind(role)
            .bind(phone_number)
            .bind(verification_token.into())
            .bind(token_expires_at)
            .fetch_one(&self.pool)
            .await
    }

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        phone_number: Option<String>,
        address: Option<String>,
        bio: Option<String>,
        profile_photo_url: Option<String>,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE users
            SET phone_number = COALESCE($2, phone_number),
                address = COALESCE($3, address),
                bio = COALESCE($4, bio),
                profile_photo_url = COALESCE($5, profile_photo_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(phone_number)
            .bind(address)
            .bind(bio)
            .bind(profile_photo_url)
            .fetch_one(&self.pool)
            .await
    }

    async fn update_user_password(
        &self,
        user_id: Uuid,
        password: String,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE users
            SET password = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(password)
            .fetch_one(&self.pool)
            .await
    }

    async fn mark_email_verified(&self, token: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET email_verified = true,
                verification_token = NULL,
                token_expires_at = NULL,
                updated_at = NOW()
            WHERE verification_token = $1
            "#,
        )
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear_verification_token(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET verification_token = NULL, token_expires_at = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_verification_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET verification_token = $2, token_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_verification_status(
        &self,
        user_id: Uuid,
        status: VerificationStatus,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE users
            SET verification_status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(status)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_verified_technicians(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<User>, sqlx::Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;
        let query = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE role = 'technician'::user_role
              AND verification_status = 'approved'::verification_status
              AND account_status = 'active'::account_status
            ORDER BY overall_rating DESC NULLS LAST, num_jobs_completed DESC
            LIMIT $1 OFFSET $2
            "#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(limit as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    async fn update_rating_aggregates(
        &self,
        technician_id: Uuid,
        overall_rating: BigDecimal,
        num_jobs_completed: i32,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE users
            SET overall_rating = $2, num_jobs_completed = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(technician_id)
            .bind(overall_rating)
            .bind(num_jobs_completed)
            .fetch_one(&self.pool)
            .await
    }
}
