//! Conversation persistence and tenant lookups
//!
//! The orchestrator talks to storage through two traits so the pipeline can
//! run against in-memory fakes in tests:
//! - `ConversationStore`: `chat_conversations`, `chat_messages`, `chat_events`
//! - `TenantDirectory`: `organization_members`, `stores`
//!
//! Each write is an independent insert; nothing spans a transaction.

#[cfg(feature = "database")]
pub mod conversations;
#[cfg(feature = "database")]
pub mod tenancy;

#[cfg(feature = "database")]
pub use conversations::PgConversationStore;
#[cfg(feature = "database")]
pub use tenancy::PgTenantDirectory;

use assistant_types::{Intent, MessageRole, QueryType, UiAction};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Channel tag written on every conversation row
pub const CHANNEL: &str = "os_dashboard";

/// Event written once when a conversation is created
pub const SESSION_START_EVENT: &str = "session_start";

// ============================================================================
// TYPES
// ============================================================================

/// A conversation resolved for the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversation {
    pub id: Uuid,
    /// Created by this turn
    pub is_new: bool,
}

/// Who owns a new conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationOwner {
    pub user_id: Uuid,
    pub org_id: Uuid,
    pub store_id: Option<Uuid>,
}

/// Per-message metadata stored as `chat_messages.channel_data`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<UiAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disambiguation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_type: Option<QueryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

/// A message read back for context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub role: MessageRole,
    pub content: String,
}

/// A message about to be appended
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage<'a> {
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: &'a str,
    pub channel_data: Option<ChannelData>,
}

// ============================================================================
// TRAITS
// ============================================================================

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Reuse `requested` when it exists for this user, otherwise create a
    /// conversation. A created conversation gets its `session_start` event
    /// before this returns.
    async fn get_or_create(
        &self,
        requested: Option<Uuid>,
        owner: &ConversationOwner,
    ) -> Result<Conversation>;

    async fn append_message(&self, message: NewMessage<'_>) -> Result<()>;

    /// Last `limit` messages of the conversation, oldest first
    async fn recent_messages(&self, conversation_id: Uuid, limit: i64)
        -> Result<Vec<StoredMessage>>;

    async fn log_event(
        &self,
        conversation_id: Uuid,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<()>;
}

#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Organization the user belongs to
    async fn org_for_user(&self, user_id: Uuid) -> Result<Option<Uuid>>;

    /// Organization owning the store
    async fn org_for_store(&self, store_id: Uuid) -> Result<Option<Uuid>>;
}
