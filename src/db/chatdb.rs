use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::chatmodel::{Conversation, Message};

const CONVERSATION_COLUMNS: &str = r#"
    id, participant_one_id, participant_two_id, order_id, last_message_at, created_at
"#;

const MESSAGE_COLUMNS: &str = r#"
    id, conversation_id, sender_id, content, attachment_url, attachment_type,
    is_read, read_at, created_at
"#;

#[async_trait]
pub trait ChatExt {
    /// Finds the conversation between two users for an order, or creates it.
    /// Participants are stored in a fixed order so the pair is unique.
    async fn get_or_create_conversation(
        &self,
        user_a: Uuid,
        user_b: Uuid,
        order_id: Option<Uuid>,
    ) -> Result<Conversation, sqlx::Error>;

    async fn get_conversation_by_id(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, sqlx::Error>;

    async fn get_conversations_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Conversation>, sqlx::Error>;

    async fn send_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: String,
        attachment_url: Option<String>,
        attachment_type: Option<String>,
    ) -> Result<Message, sqlx::Error>;

    async fn get_messages(
        &self,
        conversation_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Message>, sqlx::Error>;

    /// Marks every message the other party sent as read.
    async fn mark_messages_read(
        &self,
        conversation_id: Uuid,
        reader_id: Uuid,
    ) -> Result<u64, sqlx::Error>;

    async fn get_unread_message_count(&self, user_id: Uuid) -> Result<i64, sqlx::Error>;
}

#[async_trait]
impl ChatExt for DBClient {
    async fn get_or_create_conversation(
        &self,
        user_a: Uuid,
        user_b: Uuid,
        order_id: Option<Uuid>,
    ) -> Result<Conversation, sqlx::Error> {
        let (one, two) = if user_a <= user_b {
            (user_a, user_b)
        } else {
            (user_b, user_a)
        };

        let query = format!(
            r#"
            SELECT {CONVERSATION_COLUMNS}
            FROM conversations
            WHERE participant_one_id = $1
              AND participant_two_id = $2
              AND order_id IS NOT DISTINCT FROM $3
            "#
        );

        if let Some(existing) = sqlx::query_as::<_, Conversation>(&query)
            .bind(one)
            .bind(two)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(existing);
        }

        let query = format!(
            r#"
            INSERT INTO conversations (participant_one_id, participant_two_id, order_id)
            VALUES ($1, $2, $3)
            RETURNING {CONVERSATION_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Conversation>(&query)
            .bind(one)
            .bind(two)
            .bind(order_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_conversation_by_id(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        let query = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1");

        sqlx::query_as::<_, Conversation>(&query)
            .bind(conversation_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_conversations_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Conversation>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {CONVERSATION_COLUMNS}
            FROM conversations
            WHERE participant_one_id = $1 OR participant_two_id = $1
            ORDER BY last_message_at DESC NULLS LAST, created_at DESC
            "#
        );

        sqlx::query_as::<_, Conversation>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn send_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: String,
        attachment_url: Option<String>,
        attachment_type: Option<String>,
    ) -> Result<Message, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r#"
            INSERT INTO messages
                (conversation_id, sender_id, content, attachment_url, attachment_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MESSAGE_COLUMNS}
            "#
        );

        let message = sqlx::query_as::<_, Message>(&query)
            .bind(conversation_id)
            .bind(sender_id)
            .bind(content)
            .bind(attachment_url)
            .bind(attachment_type)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE conversations SET last_message_at = NOW() WHERE id = $1")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(message)
    }

    async fn get_messages(
        &self,
        conversation_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;
        let query = format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );

        sqlx::query_as::<_, Message>(&query)
            .bind(conversation_id)
            .bind(limit as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    async fn mark_messages_read(
        &self,
        conversation_id: Uuid,
        reader_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = true, read_at = NOW()
            WHERE conversation_id = $1 AND sender_id != $2 AND is_read = false
            "#,
        )
        .bind(conversation_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn get_unread_message_count(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM messages m
            JOIN conversations c ON c.id = m.conversation_id
            WHERE (c.participant_one_id = $1 OR c.participant_two_id = $1)
              AND m.sender_id != $1
              AND m.is_read = false
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }
}
