//! In-memory collaborators for driving the orchestrator end to end

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assistant_types::{DateRange, MessageRole};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use neuraltwin_assistant::auth::{AuthUser, AuthVerifier};
use neuraltwin_assistant::clock::FixedClock;
use neuraltwin_assistant::config::RateLimitConfig;
use neuraltwin_assistant::data::*;
use neuraltwin_assistant::database::{
    ChannelData, Conversation, ConversationOwner, ConversationStore, NewMessage, StoredMessage,
    TenantDirectory, SESSION_START_EVENT,
};
use neuraltwin_assistant::error::{AssistantError, Result};
use neuraltwin_assistant::rate_limit::SlidingWindowLimiter;
use neuraltwin_assistant::{AssistantOrchestrator, Dependencies};

pub const TOKEN: &str = "valid-token";
pub const AUTH_HEADER: &str = "Bearer valid-token";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 18).unwrap()
}

// ============================================================================
// AUTH AND TENANCY
// ============================================================================

pub struct FakeAuth {
    pub user_id: Uuid,
}

#[async_trait]
impl AuthVerifier for FakeAuth {
    async fn verify(&self, token: &str) -> Result<AuthUser> {
        if token == TOKEN {
            Ok(AuthUser {
                id: self.user_id,
                email: Some("manager@store.kr".into()),
            })
        } else {
            Err(AssistantError::Auth("unknown token".into()))
        }
    }
}

#[derive(Default)]
pub struct FakeTenants {
    pub users: HashMap<Uuid, Uuid>,
    pub stores: HashMap<Uuid, Uuid>,
}

#[async_trait]
impl TenantDirectory for FakeTenants {
    async fn org_for_user(&self, user_id: Uuid) -> Result<Option<Uuid>> {
        Ok(self.users.get(&user_id).copied())
    }

    async fn org_for_store(&self, store_id: Uuid) -> Result<Option<Uuid>> {
        Ok(self.stores.get(&store_id).copied())
    }
}

// ============================================================================
// CONVERSATIONS
// ============================================================================

#[derive(Debug, Clone)]
pub struct SavedMessage {
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub channel_data: Option<ChannelData>,
}

#[derive(Default)]
pub struct MemoryConversations {
    owners: Mutex<HashMap<Uuid, Uuid>>,
    messages: Mutex<Vec<SavedMessage>>,
    events: Mutex<Vec<(Uuid, String)>>,
}

impl MemoryConversations {
    pub fn messages(&self) -> Vec<SavedMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<(Uuid, String)> {
        self.events.lock().unwrap().clone()
    }

    pub fn conversation_count(&self) -> usize {
        self.owners.lock().unwrap().len()
    }
}

#[async_trait]
impl ConversationStore for MemoryConversations {
    async fn get_or_create(
        &self,
        requested: Option<Uuid>,
        owner: &ConversationOwner,
    ) -> Result<Conversation> {
        if let Some(id) = requested {
            if self.owners.lock().unwrap().get(&id) == Some(&owner.user_id) {
                return Ok(Conversation { id, is_new: false });
            }
        }
        let id = Uuid::new_v4();
        self.owners.lock().unwrap().insert(id, owner.user_id);
        self.log_event(id, SESSION_START_EVENT, json!({})).await?;
        Ok(Conversation { id, is_new: true })
    }

    async fn append_message(&self, message: NewMessage<'_>) -> Result<()> {
        self.messages.lock().unwrap().push(SavedMessage {
            conversation_id: message.conversation_id,
            role: message.role,
            content: message.content.to_string(),
            channel_data: message.channel_data,
        });
        Ok(())
    }

    async fn recent_messages(&self, conversation_id: Uuid, limit: i64) -> Result<Vec<StoredMessage>> {
        let messages = self.messages.lock().unwrap();
        let mine: Vec<_> = messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .collect();
        let skip = mine.len().saturating_sub(limit.max(0) as usize);
        Ok(mine[skip..]
            .iter()
            .map(|m| StoredMessage {
                role: m.role,
                content: m.content.clone(),
            })
            .collect())
    }

    async fn log_event(
        &self,
        conversation_id: Uuid,
        event_type: &str,
        _payload: serde_json::Value,
    ) -> Result<()> {
        self.events
            .lock()
            .unwrap()
            .push((conversation_id, event_type.to_string()));
        Ok(())
    }
}

// ============================================================================
// KPI DATA
// ============================================================================

/// Fixed KPI rows; counts every call so tests can assert nothing was read
#[derive(Default)]
pub struct FakeKpis {
    pub calls: AtomicUsize,
    pub catalog: Vec<CatalogItem>,
    pub catalog_fails: bool,
    pub goals: Vec<StoreGoal>,
    pub overview: OverviewKpis,
}

impl FakeKpis {
    pub fn with_catalog(items: &[(&str, &str)]) -> Self {
        Self {
            catalog: items
                .iter()
                .map(|(name, category)| CatalogItem {
                    product_name: Some(name.to_string()),
                    category: Some(category.to_string()),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl KpiSource for FakeKpis {
    async fn overview_kpis(&self, _scope: &KpiScope, _range: &DateRange) -> Result<OverviewKpis> {
        self.hit();
        Ok(self.overview.clone())
    }

    async fn daily_kpis(&self, _scope: &KpiScope, _range: &DateRange) -> Result<Vec<DailyKpi>> {
        self.hit();
        Ok(Vec::new())
    }

    async fn hourly_visits(&self, _scope: &KpiScope, _range: &DateRange) -> Result<Vec<HourlyVisit>> {
        self.hit();
        Ok(Vec::new())
    }

    async fn zone_metrics(&self, _scope: &KpiScope, _range: &DateRange) -> Result<Vec<ZoneMetric>> {
        self.hit();
        Ok(Vec::new())
    }

    async fn customer_segments(
        &self,
        _scope: &KpiScope,
        _range: &DateRange,
    ) -> Result<Vec<CustomerSegmentRow>> {
        self.hit();
        Ok(Vec::new())
    }

    async fn visitor_mix(&self, _scope: &KpiScope, _range: &DateRange) -> Result<VisitorMix> {
        self.hit();
        Ok(VisitorMix::default())
    }

    async fn product_performance(
        &self,
        _scope: &KpiScope,
        _range: &DateRange,
    ) -> Result<Vec<ProductPerformance>> {
        self.hit();
        Ok(Vec::new())
    }

    async fn inventory_levels(&self, _scope: &KpiScope) -> Result<Vec<InventoryLevel>> {
        self.hit();
        Ok(Vec::new())
    }

    async fn store_goals(&self, _scope: &KpiScope, _range: &DateRange) -> Result<Vec<StoreGoal>> {
        self.hit();
        Ok(self.goals.clone())
    }

    async fn applied_strategies(
        &self,
        _scope: &KpiScope,
        _range: &DateRange,
    ) -> Result<Vec<AppliedStrategy>> {
        self.hit();
        Ok(Vec::new())
    }

    async fn data_imports(&self, _scope: &KpiScope, _range: &DateRange) -> Result<Vec<DataImport>> {
        self.hit();
        Ok(Vec::new())
    }

    async fn data_sources(&self, _scope: &KpiScope) -> Result<Vec<DataSourceRow>> {
        self.hit();
        Ok(Vec::new())
    }

    async fn product_catalog(&self, _scope: &KpiScope) -> Result<Vec<CatalogItem>> {
        self.hit();
        if self.catalog_fails {
            return Err(AssistantError::Data("rpc get_product_catalog failed".into()));
        }
        Ok(self.catalog.clone())
    }
}

// ============================================================================
// HARNESS
// ============================================================================

/// One user in one org with one store, plus a store owned by another org
pub struct Harness {
    pub orchestrator: AssistantOrchestrator,
    pub conversations: Arc<MemoryConversations>,
    pub kpis: Arc<FakeKpis>,
    pub user_id: Uuid,
    pub org_id: Uuid,
    pub store_id: Uuid,
    pub foreign_store_id: Uuid,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(FakeKpis::default(), RateLimitConfig::default())
    }

    pub fn with_kpis(kpis: FakeKpis) -> Self {
        Self::build(kpis, RateLimitConfig::default())
    }

    pub fn with_rate_limit(max_requests: usize) -> Self {
        Self::build(
            FakeKpis::default(),
            RateLimitConfig {
                max_requests,
                window: Duration::from_secs(60),
            },
        )
    }

    fn build(kpis: FakeKpis, rate_limit: RateLimitConfig) -> Self {
        let user_id = Uuid::new_v4();
        let org_id = Uuid::new_v4();
        let store_id = Uuid::new_v4();
        let foreign_store_id = Uuid::new_v4();

        let mut tenants = FakeTenants::default();
        tenants.users.insert(user_id, org_id);
        tenants.stores.insert(store_id, org_id);
        tenants.stores.insert(foreign_store_id, Uuid::new_v4());

        let conversations = Arc::new(MemoryConversations::default());
        let kpis = Arc::new(kpis);

        let orchestrator = AssistantOrchestrator::new(Dependencies {
            auth: Arc::new(FakeAuth { user_id }),
            limiter: Arc::new(SlidingWindowLimiter::new(rate_limit)),
            tenants: Arc::new(tenants),
            conversations: conversations.clone(),
            kpis: kpis.clone(),
            llm: None,
            clock: Arc::new(FixedClock(today())),
        });

        Self {
            orchestrator,
            conversations,
            kpis,
            user_id,
            org_id,
            store_id,
            foreign_store_id,
        }
    }

    /// Body for `message` asked from `page` (and optional tab)
    pub fn body(&self, message: &str, page: &str, tab: Option<&str>) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "message": message,
            "context": {
                "page": { "current": page, "tab": tab },
                "store": { "id": self.store_id.to_string(), "name": "강남점" }
            }
        }))
        .unwrap()
    }
}
