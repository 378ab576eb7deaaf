use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{notificationdtos::*, userdtos::Response},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn notifications_handler() -> Router {
    Router::new()
        .route("/", get(list_notifications))
        .route("/:notification_id/read", post(mark_read))
        .route("/read-all", post(mark_all_read))
        .route("/preferences", get(get_preferences).put(update_preferences))
}

pub async fn list_notifications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Query(query): Query<NotificationQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let unread_only = query.unread_only.unwrap_or(false);
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);

    let notifications = app_state
        .notification_service
        .get_notifications(user.user.id, unread_only, page as u32, limit)
        .await?;

    Ok(Json(NotificationListResponseDto {
        status: "success".to_string(),
        results: notifications.len(),
        notifications,
    }))
}

pub async fn mark_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .notification_service
        .mark_read(user.user.id, notification_id)
        .await?;

    Ok(Json(Response {
        status: "success",
        message: "Notification marked as read".to_string(),
    }))
}

pub async fn mark_all_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let updated = app_state
        .notification_service
        .mark_all_read(user.user.id)
        .await?;

    Ok(Json(Response {
        status: "success",
        message: format!("{} notifications marked as read", updated),
    }))
}

pub async fn get_preferences(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let preferences = app_state
        .notification_service
        .get_preferences(user.user.id)
        .await?;

    Ok(Json(PreferencesResponseDto {
        status: "success".to_string(),
        preferences,
    }))
}

pub async fn update_preferences(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdatePreferencesDto>,
) -> Result<impl IntoResponse, HttpError> {
    let preferences = app_state
        .notification_service
        .update_preferences(
            user.user.id,
            body.email_notifications,
            body.sms_notifications,
            body.push_notifications,
            body.promotional_notifications,
        )
        .await?;

    Ok(Json(PreferencesResponseDto {
        status: "success".to_string(),
        preferences,
    }))
}
