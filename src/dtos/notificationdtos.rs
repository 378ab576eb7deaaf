use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::notificationmodel::{Notification, NotificationPreference};

#[derive(Serialize, Deserialize, Validate)]
pub struct NotificationQueryDto {
    pub unread_only: Option<bool>,
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePreferencesDto {
    pub email_notifications: Option<bool>,
    pub sms_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub promotional_notifications: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationListResponseDto {
    pub status: String,
    pub notifications: Vec<Notification>,
    pub results: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PreferencesResponseDto {
    pub status: String,
    pub preferences: NotificationPreference,
}
