//! Postgres conversation store
//!
//! Conversations live in chat_conversations, messages in chat_messages and
//! lifecycle events in chat_events.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    Conversation, ConversationOwner, ConversationStore, NewMessage, StoredMessage, CHANNEL,
    SESSION_START_EVENT,
};
use assistant_types::MessageRole;

use crate::error::{AssistantError, Result};

pub struct PgConversationStore {
    pool: PgPool,
}

impl PgConversationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether `id` exists and belongs to `user_id`
    async fn owned_by(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let found: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM chat_conversations
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AssistantError::Session(format!("lookup conversation: {e}")))?;
        Ok(found.is_some())
    }

    async fn touch(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE chat_conversations SET updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AssistantError::Session(format!("touch conversation: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn get_or_create(
        &self,
        requested: Option<Uuid>,
        owner: &ConversationOwner,
    ) -> Result<Conversation> {
        if let Some(id) = requested {
            if self.owned_by(id, owner.user_id).await? {
                self.touch(id).await?;
                return Ok(Conversation { id, is_new: false });
            }
            tracing::debug!(conversation_id = %id, "Requested conversation not found, creating");
        }

        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO chat_conversations
                (id, user_id, store_id, org_id, channel, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, now(), now())
            "#,
        )
        .bind(id)
        .bind(owner.user_id)
        .bind(owner.store_id)
        .bind(owner.org_id)
        .bind(CHANNEL)
        .execute(&self.pool)
        .await
        .map_err(|e| AssistantError::Session(format!("create conversation: {e}")))?;

        self.log_event(
            id,
            SESSION_START_EVENT,
            json!({ "storeId": owner.store_id, "channel": CHANNEL }),
        )
        .await
        .map_err(|e| AssistantError::Session(e.to_string()))?;

        tracing::info!(conversation_id = %id, user_id = %owner.user_id, "Created conversation");
        Ok(Conversation { id, is_new: true })
    }

    async fn append_message(&self, message: NewMessage<'_>) -> Result<()> {
        let channel_data = message
            .channel_data
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;
        sqlx::query(
            r#"
            INSERT INTO chat_messages
                (id, conversation_id, role, content, channel_data, created_at)
            VALUES ($1, $2, $3, $4, $5, now())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(message.conversation_id)
        .bind(message.role.as_str())
        .bind(message.content)
        .bind(channel_data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
    ) -> Result<Vec<StoredMessage>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT role, content FROM (
                SELECT role, content, created_at FROM chat_messages
                WHERE conversation_id = $1
                ORDER BY created_at DESC
                LIMIT $2
            ) recent
            ORDER BY created_at ASC
            "#,
        )
        .bind(conversation_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(role, content)| StoredMessage {
                role: if role == "assistant" {
                    MessageRole::Assistant
                } else {
                    MessageRole::User
                },
                content,
            })
            .collect())
    }

    async fn log_event(
        &self,
        conversation_id: Uuid,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO chat_events (id, conversation_id, event_type, payload, created_at)
            VALUES ($1, $2, $3, $4, now())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(conversation_id)
        .bind(event_type)
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
