use std::sync::Arc;

use uuid::Uuid;

use super::error::ServiceError;
use crate::db::{DBClient, NotificationExt, UserExt};
use crate::mail::mails::send_notification_email;
use crate::mail::sendmail::Mailer;
use crate::models::notificationmodel::{Notification, NotificationPreference};

#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
    mailer: Option<Arc<Mailer>>,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>, mailer: Option<Arc<Mailer>>) -> Self {
        NotificationService { db_client, mailer }
    }

    /// Records an in-app notification and mirrors it to email when the
    /// recipient has email notifications enabled. Email failures are logged
    /// and never bubble up to the triggering operation.
    pub async fn notify(
        &self,
        user_id: Uuid,
        notification_type: &str,
        title: &str,
        message: &str,
        related_order_id: Option<Uuid>,
        related_offer_id: Option<Uuid>,
    ) -> Result<Notification, ServiceError> {
        let notification = self
            .db_client
            .create_notification(
                user_id,
                notification_type,
                title,
                message,
                related_order_id,
                related_offer_id,
            )
            .await?;

        let preferences = self.db_client.get_notification_preferences(user_id).await?;

        if preferences.email_notifications {
            if let Some(mailer) = &self.mailer {
                if let Some(user) = self.db_client.get_user(Some(user_id), None, None).await? {
                    let mailer = mailer.clone();
                    let title = title.to_string();
                    let message = message.to_string();
                    tokio::spawn(async move {
                        if let Err(e) =
                            send_notification_email(&mailer, &user.email, &title, &message).await
                        {
                            tracing::warn!("notification email failed: {}", e);
                        }
                    });
                }
            }
        }

        Ok(notification)
    }

    pub async fn get_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Notification>, ServiceError> {
        Ok(self
            .db_client
            .get_notifications(user_id, unread_only, page, limit)
            .await?)
    }

    pub async fn mark_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> Result<(), ServiceError> {
        let updated = self
            .db_client
            .mark_notification_read(user_id, notification_id)
            .await?;

        if updated == 0 {
            return Err(ServiceError::NotFound("Notification not found".to_string()));
        }
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        Ok(self.db_client.mark_all_notifications_read(user_id).await?)
    }

    pub async fn get_preferences(
        &self,
        user_id: Uuid,
    ) -> Result<NotificationPreference, ServiceError> {
        Ok(self.db_client.get_notification_preferences(user_id).await?)
    }

    pub async fn update_preferences(
        &self,
        user_id: Uuid,
        email: Option<bool>,
        sms: Option<bool>,
        push: Option<bool>,
        promotional: Option<bool>,
    ) -> Result<NotificationPreference, ServiceError> {
        Ok(self
            .db_client
            .update_notification_preferences(user_id, email, sms, push, promotional)
            .await?)
    }
}
