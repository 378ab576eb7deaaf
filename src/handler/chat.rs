use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::chatdb::ChatExt,
    dtos::{chatdtos::*, userdtos::RequestQueryDto},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::chatmodel::Conversation,
    AppState,
};

pub fn chat_handler() -> Router {
    Router::new()
        .route("/conversations", post(start_conversation).get(list_conversations))
        .route(
            "/conversations/:conversation_id/messages",
            post(send_message).get(list_messages),
        )
        .route("/conversations/:conversation_id/read", post(mark_read))
        .route("/unread", get(unread_count))
}

async fn require_participant(
    app_state: &AppState,
    conversation_id: Uuid,
    user_id: Uuid,
) -> Result<Conversation, HttpError> {
    let conversation = app_state
        .db_client
        .get_conversation_by_id(conversation_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Conversation not found".to_string()))?;

    if !conversation.has_participant(user_id) {
        return Err(HttpError::forbidden(
            "You are not part of this conversation".to_string(),
        ));
    }

    Ok(conversation)
}

pub async fn start_conversation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<StartConversationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if body.participant_id == user.user.id {
        return Err(HttpError::bad_request(
            "You cannot start a conversation with yourself".to_string(),
        ));
    }

    let conversation = app_state
        .db_client
        .get_or_create_conversation(user.user.id, body.participant_id, body.order_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(ConversationResponseDto {
            status: "success".to_string(),
            conversation,
        }),
    ))
}

pub async fn list_conversations(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let conversations = app_state
        .db_client
        .get_conversations_for_user(user.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ConversationListResponseDto {
        status: "success".to_string(),
        conversations,
    }))
}

pub async fn send_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(conversation_id): Path<Uuid>,
    Json(body): Json<SendMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    require_participant(&app_state, conversation_id, user.user.id).await?;

    let message = app_state
        .db_client
        .send_message(
            conversation_id,
            user.user.id,
            body.content,
            body.attachment_url,
            body.attachment_type,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponseDto {
            status: "success".to_string(),
            message,
        }),
    ))
}

pub async fn list_messages(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(conversation_id): Path<Uuid>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    require_participant(&app_state, conversation_id, user.user.id).await?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);

    let messages = app_state
        .db_client
        .get_messages(conversation_id, page as u32, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(MessageListResponseDto {
        status: "success".to_string(),
        results: messages.len(),
        messages,
    }))
}

pub async fn mark_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(conversation_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    require_participant(&app_state, conversation_id, user.user.id).await?;

    app_state
        .db_client
        .mark_messages_read(conversation_id, user.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(crate::dtos::userdtos::Response {
        status: "success",
        message: "Messages marked as read".to_string(),
    }))
}

pub async fn unread_count(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let unread = app_state
        .db_client
        .get_unread_message_count(user.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(UnreadCountResponseDto {
        status: "success".to_string(),
        unread,
    }))
}
