use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::chatmodel::{Conversation, Message};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct StartConversationDto {
    pub participant_id: Uuid,
    pub order_id: Option<Uuid>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageDto {
    #[validate(length(min = 1, max = 5000, message = "Message must be between 1-5000 characters"))]
    pub content: String,

    #[validate(url(message = "Attachment must be a valid URL"))]
    pub attachment_url: Option<String>,

    pub attachment_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationResponseDto {
    pub status: String,
    pub conversation: Conversation,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationListResponseDto {
    pub status: String,
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponseDto {
    pub status: String,
    pub message: Message,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageListResponseDto {
    pub status: String,
    pub messages: Vec<Message>,
    pub results: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnreadCountResponseDto {
    pub status: String,
    pub unread: i64,
}
