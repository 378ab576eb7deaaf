use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::notificationmodel::{Notification, NotificationPreference};

const NOTIFICATION_COLUMNS: &str = r#"
    id, user_id, notification_type, title, message, related_order_id,
    related_offer_id, is_read, created_at
"#;

const PREFERENCE_COLUMNS: &str = r#"
    user_id, email_notifications, sms_notifications, push_notifications,
    promotional_notifications, updated_at
"#;

#[async_trait]
pub trait NotificationExt {
    async fn create_notification(
        &self,
        user_id: Uuid,
        notification_type: &str,
        title: &str,
        message: &str,
        related_order_id: Option<Uuid>,
        related_offer_id: Option<Uuid>,
    ) -> Result<Notification, sqlx::Error>;

    async fn get_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Notification>, sqlx::Error>;

    async fn mark_notification_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> Result<u64, sqlx::Error>;

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64, sqlx::Error>;

    async fn get_notification_preferences(
        &self,
        user_id: Uuid,
    ) -> Result<NotificationPreference, sqlx::Error>;

    async fn update_notification_preferences(
        &self,
        user_id: Uuid,
        email_notifications: Option<bool>,
        sms_notifications: Option<bool>,
        push_notifications: Option<bool>,
        promotional_notifications: Option<bool>,
    ) -> Result<NotificationPreference, sqlx::Error>;
}

#[async_trait]
impl NotificationExt for DBClient {
    async fn create_notification(
        &self,
        user_id: Uuid,
        notification_type: &str,
        title: &str,
        message: &str,
        related_order_id: Option<Uuid>,
        related_offer_id: Option<Uuid>,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO notifications
                (user_id, notification_type, title, message, related_order_id, related_offer_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(notification_type)
            .bind(title)
            .bind(message)
            .bind(related_order_id)
            .bind(related_offer_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;
        let query = format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR is_read = false)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        );

        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(unread_only)
            .bind(limit as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    async fn mark_notification_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true WHERE id = $1 AND user_id = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn get_notification_preferences(
        &self,
        user_id: Uuid,
    ) -> Result<NotificationPreference, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO notification_preferences (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING {PREFERENCE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn update_notification_preferences(
        &self,
        user_id: Uuid,
        email_notifications: Option<bool>,
        sms_notifications: Option<bool>,
        push_notifications: Option<bool>,
        promotional_notifications: Option<bool>,
    ) -> Result<NotificationPreference, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO notification_preferences
                (user_id, email_notifications, sms_notifications, push_notifications,
                 promotional_notifications)
            VALUES ($1, COALESCE($2, true), COALESCE($3, false), COALESCE($4, true),
                    COALESCE($5, true))
            ON CONFLICT (user_id) DO UPDATE
            SET email_notifications = COALESCE($2, notification_preferences.email_notifications),
                sms_notifications = COALESCE($3, notification_preferences.sms_notifications),
                push_notifications = COALESCE($4, notification_preferences.push_notifications),
                promotional_notifications =
                    COALESCE($5, notification_preferences.promotional_notifications),
                updated_at = NOW()
            RETURNING {PREFERENCE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(user_id)
            .bind(email_notifications)
            .bind(sms_notifications)
            .bind(push_notifications)
            .bind(promotional_notifications)
            .fetch_one(&self.pool)
            .await
    }
}
