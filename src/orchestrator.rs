//! Assistant orchestrator
//!
//! One chat turn, start to finish:
//!
//! ```text
//! auth → rate limit → parse → org/store check → session → save user turn
//!      → classify → disambiguate? → dispatch by intent → save reply → respond
//! ```
//!
//! Steps run strictly in that order. Nothing before the org/store check
//! touches KPI data, and the user turn is saved before classification and
//! never rolled back.

use std::sync::Arc;
use std::time::Instant;

use assistant_types::{
    ChatRequest, ChatResponse, ClassificationResult, ClientDateRange, DateRange, Entities, Intent,
    MessageRole, QueryActionResult, QueryType, ResponseMeta, StoreRef,
};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::auth::{bearer_token, AuthUser, AuthVerifier};
use crate::classifier::{self, ClassifierContext, SourceCatalogLoader};
use crate::clock::Clock;
use crate::data::{KpiScope, KpiSource};
use crate::database::{
    ChannelData, Conversation, ConversationOwner, ConversationStore, NewMessage, TenantDirectory,
};
use crate::disambiguation::disambiguate;
use crate::error::{AssistantError, Result};
use crate::extraction::{resolve_client_range, with_comparison, DatePreset};
use crate::handlers::commands::{self, CommandContext};
use crate::handlers::{handle_query, QueryContext};
use crate::llm_client::{ChatTurn, LlmClient};
use crate::rate_limit::SlidingWindowLimiter;

const CHAT_SYSTEM_PROMPT: &str = "당신은 NeuralTwin OS 대시보드의 매장 분석 어시스턴트입니다. \
한국어로 간결하고 친절하게 답하세요. 매장 데이터 수치를 지어내지 말고, \
구체적인 수치가 필요하면 사용자가 대시보드에서 확인하도록 안내하세요.";

const CHAT_FALLBACK_MESSAGE: &str = "안녕하세요! 매출, 방문객, 상품, 재고 같은 매장 데이터를 물어보시거나 \
원하는 화면으로 이동해 달라고 말씀해 주세요.";

const DEFAULT_SUGGESTIONS: &[&str] = &["오늘 매출 알려줘", "방문객 추이 보여줘", "인기 상품 순위는?"];

/// Prior messages passed to the LLM
const CHAT_HISTORY_LIMIT: i64 = 10;

/// Everything the orchestrator talks to. Built once at startup.
#[derive(Clone)]
pub struct Dependencies {
    pub auth: Arc<dyn AuthVerifier>,
    pub limiter: Arc<SlidingWindowLimiter>,
    pub tenants: Arc<dyn TenantDirectory>,
    pub conversations: Arc<dyn ConversationStore>,
    pub kpis: Arc<dyn KpiSource>,
    /// `None` answers general chat with a canned reply
    pub llm: Option<Arc<dyn LlmClient>>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Clone)]
pub struct AssistantOrchestrator {
    deps: Dependencies,
}

/// Caller identity after the tenancy check
struct Caller {
    user: AuthUser,
    scope: KpiScope,
}

/// Answer to one turn before it is saved
struct Reply {
    result: QueryActionResult,
    disambiguation: bool,
}

impl AssistantOrchestrator {
    pub fn new(deps: Dependencies) -> Self {
        Self { deps }
    }

    /// Build the production wiring from configuration and a pool
    #[cfg(feature = "database")]
    pub fn from_config(config: &crate::config::AssistantConfig, pool: sqlx::PgPool) -> Self {
        use crate::auth::SupabaseAuth;
        use crate::clock::OffsetClock;
        use crate::data::PgKpiSource;
        use crate::database::{PgConversationStore, PgTenantDirectory};
        use crate::llm_client::OpenAiCompatibleClient;

        let llm = config
            .llm
            .as_ref()
            .map(|llm| Arc::new(OpenAiCompatibleClient::new(llm)) as Arc<dyn LlmClient>);

        Self::new(Dependencies {
            auth: Arc::new(SupabaseAuth::new(&config.supabase)),
            limiter: Arc::new(SlidingWindowLimiter::new(config.rate_limit)),
            tenants: Arc::new(PgTenantDirectory::new(pool.clone())),
            conversations: Arc::new(PgConversationStore::new(pool.clone())),
            kpis: Arc::new(PgKpiSource::new(pool)),
            llm,
            clock: Arc::new(OffsetClock::new(config.utc_offset_hours)),
        })
    }

    /// Run one chat turn.
    ///
    /// `authorization` is the raw header value and `body` the raw request
    /// body; both are validated here so every rejection goes through the
    /// same error taxonomy.
    pub async fn handle_chat(&self, authorization: Option<&str>, body: &[u8]) -> Result<ChatResponse> {
        let started = Instant::now();

        let token = bearer_token(authorization)?;
        let user = self.deps.auth.verify(token).await?;

        let decision = self.deps.limiter.check_rate_limit(user.id);
        self.deps.limiter.maybe_spawn_cleanup();
        if !decision.allowed {
            tracing::info!(user_id = %user.id, "Rate limited");
            return Err(AssistantError::RateLimited {
                retry_after_secs: decision.retry_after.as_secs().max(1),
            });
        }

        let request = parse_request(body)?;
        let scope = self.authorize(&user, request.context.store.as_ref()).await?;
        self.run_turn(Caller { user, scope }, request, started).await
    }

    async fn run_turn(&self, caller: Caller, request: ChatRequest, started: Instant) -> Result<ChatResponse> {
        let conversation = self.open_conversation(&caller, request.conversation_id.as_deref()).await?;
        let message = request.message.trim();

        self.save(NewMessage {
            conversation_id: conversation.id,
            role: MessageRole::User,
            content: message,
            channel_data: None,
        })
        .await;

        let today = self.deps.clock.today();
        let page = &request.context.page;
        let loader = SourceCatalogLoader::new(Arc::clone(&self.deps.kpis), caller.scope);
        let classification = classifier::classify(
            message,
            &ClassifierContext { page, today },
            &loader,
        )
        .await;

        let reply = match disambiguate(&classification) {
            Some(result) => Reply {
                result,
                disambiguation: true,
            },
            None => Reply {
                result: self
                    .dispatch(&caller, &conversation, &request, &classification, today)
                    .await?,
                disambiguation: false,
            },
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let Reply {
            result,
            disambiguation,
        } = reply;

        self.save(NewMessage {
            conversation_id: conversation.id,
            role: MessageRole::Assistant,
            content: &result.message,
            channel_data: Some(ChannelData {
                intent: Some(classification.intent),
                confidence: Some(classification.confidence),
                actions: result.actions.clone(),
                suggestions: result.suggestions.clone(),
                disambiguation,
                query_type: classification.query_type(),
                execution_time_ms: Some(elapsed_ms),
            }),
        })
        .await;

        tracing::info!(
            user_id = %caller.user.id,
            conversation_id = %conversation.id,
            intent = %classification.intent,
            query_type = ?classification.query_type(),
            confidence = classification.confidence,
            disambiguation,
            actions = result.actions.len(),
            elapsed_ms,
            "Chat turn complete"
        );

        Ok(ChatResponse {
            message: result.message,
            actions: result.actions,
            suggestions: result.suggestions,
            data: result.data,
            meta: ResponseMeta {
                conversation_id: conversation.id.to_string(),
                intent: classification.intent.as_str().to_string(),
                confidence: classification.confidence,
                execution_time_ms: elapsed_ms,
            },
        })
    }

    // ========================================================================
    // TENANCY AND SESSION
    // ========================================================================

    /// Resolve the caller's org and check the requested store belongs to it
    async fn authorize(&self, user: &AuthUser, store: Option<&StoreRef>) -> Result<KpiScope> {
        let org_id = self
            .deps
            .tenants
            .org_for_user(user.id)
            .await?
            .ok_or_else(|| AssistantError::Forbidden(format!("user {} has no organization", user.id)))?;

        let requested = store.map(|s| s.id.trim()).filter(|id| !id.is_empty());
        let store_id = match requested {
            None => None,
            Some(raw) => {
                let id = Uuid::parse_str(raw)
                    .map_err(|_| AssistantError::Forbidden(format!("invalid store id {raw:?}")))?;
                match self.deps.tenants.org_for_store(id).await? {
                    Some(owner) if owner == org_id => Some(id),
                    _ => {
                        tracing::warn!(user_id = %user.id, store_id = %id, "Store outside caller's organization");
                        return Err(AssistantError::Forbidden(format!(
                            "store {id} does not belong to org {org_id}"
                        )));
                    }
                }
            }
        };
        Ok(KpiScope { org_id, store_id })
    }

    async fn open_conversation(&self, caller: &Caller, requested: Option<&str>) -> Result<Conversation> {
        let requested = requested.and_then(|raw| match Uuid::parse_str(raw.trim()) {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::debug!(conversation_id = raw, "Ignoring malformed conversation id");
                None
            }
        });
        let owner = ConversationOwner {
            user_id: caller.user.id,
            org_id: caller.scope.org_id,
            store_id: caller.scope.store_id,
        };
        self.deps
            .conversations
            .get_or_create(requested, &owner)
            .await
            .map_err(|e| match e {
                AssistantError::Session(_) => e,
                other => AssistantError::Session(other.to_string()),
            })
    }

    /// Message writes are independent inserts; a failed one is logged and
    /// the turn carries on.
    async fn save(&self, message: NewMessage<'_>) {
        let conversation_id = message.conversation_id;
        let role = message.role;
        if let Err(e) = self.deps.conversations.append_message(message).await {
            tracing::warn!(
                conversation_id = %conversation_id,
                role = role.as_str(),
                error = %e,
                "Failed to save message"
            );
        }
    }

    // ========================================================================
    // DISPATCH
    // ========================================================================

    async fn dispatch(
        &self,
        caller: &Caller,
        conversation: &Conversation,
        request: &ChatRequest,
        classification: &ClassificationResult,
        today: NaiveDate,
    ) -> Result<QueryActionResult> {
        let entities = &classification.entities;
        let page = &request.context.page;
        let (date_range, preset) = resolve_turn_range(entities, request.context.date_range.as_ref(), today);

        match classification.intent {
            Intent::QueryKpi => {
                let ctx = QueryContext {
                    source: self.deps.kpis.as_ref(),
                    scope: caller.scope,
                    query_type: classification.query_type().unwrap_or(QueryType::Summary),
                    date_range,
                    preset,
                    page,
                    item_filter: &entities.item_filter,
                    response_hint: entities.response_hint,
                    hour: entities.hour,
                };
                handle_query(&ctx).await.inspect_err(|e| {
                    tracing::error!(
                        conversation_id = %conversation.id,
                        query_type = %ctx.query_type,
                        error = %e,
                        "Query handler failed"
                    );
                })
            }
            Intent::GeneralChat => Ok(self.general_chat(conversation, request.message.trim()).await),
            _ => Ok(commands::handle(
                classification,
                &CommandContext {
                    page,
                    date_range,
                    preset,
                },
            )),
        }
    }

    async fn general_chat(&self, conversation: &Conversation, message: &str) -> QueryActionResult {
        let Some(llm) = &self.deps.llm else {
            return chat_fallback();
        };

        let mut history: Vec<ChatTurn> = match self
            .deps
            .conversations
            .recent_messages(conversation.id, CHAT_HISTORY_LIMIT + 1)
            .await
        {
            Ok(messages) => messages
                .into_iter()
                .map(|m| ChatTurn {
                    role: m.role.as_str(),
                    content: m.content,
                })
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Chat history unavailable");
                Vec::new()
            }
        };
        // the current turn was already saved
        if history
            .last()
            .is_some_and(|t| t.role == MessageRole::User.as_str() && t.content == message)
        {
            history.pop();
        }

        match llm.chat(CHAT_SYSTEM_PROMPT, &history, message).await {
            Ok(text) => QueryActionResult::new(Vec::new(), text)
                .with_suggestions(DEFAULT_SUGGESTIONS.iter().copied()),
            Err(e) => {
                tracing::warn!(model = llm.model_name(), error = %e, "LLM chat failed, using fallback");
                chat_fallback()
            }
        }
    }
}

fn chat_fallback() -> QueryActionResult {
    QueryActionResult::new(Vec::new(), CHAT_FALLBACK_MESSAGE)
        .with_suggestions(DEFAULT_SUGGESTIONS.iter().copied())
}

fn parse_request(body: &[u8]) -> Result<ChatRequest> {
    let request: ChatRequest = serde_json::from_slice(body)
        .map_err(|e| AssistantError::InvalidRequest(format!("malformed body: {e}")))?;
    if request.message.trim().is_empty() {
        return Err(AssistantError::InvalidRequest("empty message".into()));
    }
    Ok(request)
}

/// Date window for a turn: the message's own dates win, then the
/// dashboard's current filter, then today.
pub fn resolve_turn_range(
    entities: &Entities,
    client: Option<&ClientDateRange>,
    today: NaiveDate,
) -> (DateRange, Option<DatePreset>) {
    if let (Some(start), Some(end)) = (entities.date_start, entities.date_end) {
        let preset = entities.date_preset.as_deref().and_then(DatePreset::parse);
        return (with_comparison(start, end, preset), preset);
    }
    if let Some(client) = client {
        let preset = client.preset.as_deref().and_then(DatePreset::parse);
        return (resolve_client_range(client), preset);
    }
    let (start, end) = DatePreset::Today.resolve(today);
    (with_comparison(start, end, Some(DatePreset::Today)), Some(DatePreset::Today))
}
