//! Dashboard-side assistant client
//!
//! Sends one message at a time to the orchestrator, keeps the transcript,
//! and hands returned actions to the dispatcher. Any failure is rendered
//! as a fixed apology in the transcript; it never escapes to the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use assistant_types::{ChatRequest, ChatResponse, ErrorResponse, MessageRole, RequestContext};
use async_trait::async_trait;

use super::{ActionDispatcher, DispatchReport};
use crate::error::{AssistantError, Result};

pub const APOLOGY_MESSAGE: &str = "죄송합니다. 요청을 처리하는 중 문제가 발생했어요. 잠시 후 다시 시도해주세요.";

#[async_trait]
pub trait AssistantTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// Posts to the orchestrator endpoint with the user's access token
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            access_token: access_token.into(),
        }
    }
}

#[async_trait]
impl AssistantTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let code = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| "UNKNOWN".to_string());
            return Err(AssistantError::Upstream(format!("assistant returned {status}: {code}")));
        }
        Ok(response.json().await?)
    }
}

/// One line of the chat transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub role: MessageRole,
    pub content: String,
    pub suggestions: Vec<String>,
}

/// Result of `send_message`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank message, or another send was still in flight
    Skipped,
    /// The request failed; the apology was appended
    Failed,
    Answered(DispatchReport),
}

#[derive(Default)]
struct ClientState {
    conversation_id: Option<String>,
    transcript: Vec<TranscriptEntry>,
}

/// Resets the loading flag however `send_message` exits
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct AssistantClient {
    transport: Arc<dyn AssistantTransport>,
    dispatcher: Arc<ActionDispatcher>,
    is_loading: AtomicBool,
    state: Mutex<ClientState>,
}

impl AssistantClient {
    pub fn new(transport: Arc<dyn AssistantTransport>, dispatcher: Arc<ActionDispatcher>) -> Self {
        Self {
            transport,
            dispatcher,
            is_loading: AtomicBool::new(false),
            state: Mutex::new(ClientState::default()),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading.load(Ordering::SeqCst)
    }

    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.lock().transcript.clone()
    }

    pub fn conversation_id(&self) -> Option<String> {
        self.lock().conversation_id.clone()
    }

    pub async fn send_message(&self, message: &str, context: RequestContext) -> SendOutcome {
        let message = message.trim();
        if message.is_empty() {
            return SendOutcome::Skipped;
        }
        if self.is_loading.swap(true, Ordering::SeqCst) {
            tracing::debug!("Send ignored, previous message still loading");
            return SendOutcome::Skipped;
        }
        let _loading = LoadingGuard(&self.is_loading);

        let request = {
            let mut state = self.lock();
            state.transcript.push(TranscriptEntry {
                role: MessageRole::User,
                content: message.to_string(),
                suggestions: Vec::new(),
            });
            ChatRequest {
                message: message.to_string(),
                conversation_id: state.conversation_id.clone(),
                context,
            }
        };

        match self.transport.send(&request).await {
            Ok(response) => {
                {
                    let mut state = self.lock();
                    state.conversation_id = Some(response.meta.conversation_id.clone());
                    state.transcript.push(TranscriptEntry {
                        role: MessageRole::Assistant,
                        content: response.message,
                        suggestions: response.suggestions,
                    });
                }
                SendOutcome::Answered(self.dispatcher.dispatch_actions(&response.actions).await)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Assistant request failed");
                self.lock().transcript.push(TranscriptEntry {
                    role: MessageRole::Assistant,
                    content: APOLOGY_MESSAGE.to_string(),
                    suggestions: Vec::new(),
                });
                SendOutcome::Failed
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::RecordingHost;
    use super::super::{DateFilterStore, EventBus, Immediate};
    use super::*;
    use assistant_types::{ResponseMeta, UiAction};
    use tokio::sync::Notify;

    enum Reply {
        Ok(Vec<UiAction>),
        Fail,
    }

    struct FakeTransport {
        reply: Reply,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl AssistantTransport for FakeTransport {
        async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.reply {
                Reply::Ok(actions) => Ok(ChatResponse {
                    message: format!("re: {}", request.message),
                    actions: actions.clone(),
                    suggestions: vec!["다음 질문".into()],
                    data: None,
                    meta: ResponseMeta {
                        conversation_id: "c-1".into(),
                        intent: "navigate".into(),
                        confidence: 0.9,
                        execution_time_ms: 12,
                    },
                }),
                Reply::Fail => Err(AssistantError::Upstream("503".into())),
            }
        }
    }

    fn client(reply: Reply, gate: Option<Arc<Notify>>) -> (Arc<AssistantClient>, Arc<RecordingHost>) {
        let host = Arc::new(RecordingHost::default());
        let dispatcher = ActionDispatcher::new(host.clone(), DateFilterStore::new(), EventBus::new())
            .with_settle(Arc::new(Immediate));
        let client = AssistantClient::new(
            Arc::new(FakeTransport { reply, gate }),
            Arc::new(dispatcher),
        );
        (Arc::new(client), host)
    }

    #[tokio::test]
    async fn test_answer_dispatches_actions() {
        let (client, host) = client(Reply::Ok(vec![UiAction::navigate("/roi")]), None);

        let outcome = client.send_message("ROI 보여줘", RequestContext::default()).await;

        assert!(matches!(outcome, SendOutcome::Answered(ref r) if r.executed == vec!["navigate"]));
        assert_eq!(host.calls(), vec!["navigate:/roi"]);
        assert_eq!(client.conversation_id().as_deref(), Some("c-1"));
        assert_eq!(client.transcript().len(), 2);
        assert!(!client.is_loading());
    }

    #[tokio::test]
    async fn test_failure_appends_apology_and_resets_loading() {
        let (client, _) = client(Reply::Fail, None);

        let outcome = client.send_message("매출", RequestContext::default()).await;

        assert_eq!(outcome, SendOutcome::Failed);
        let transcript = client.transcript();
        assert_eq!(transcript.last().unwrap().content, APOLOGY_MESSAGE);
        assert!(!client.is_loading());
    }

    #[tokio::test]
    async fn test_second_send_while_loading_is_ignored() {
        let gate = Arc::new(Notify::new());
        let (client, _) = client(Reply::Ok(Vec::new()), Some(gate.clone()));

        let first = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.send_message("첫 질문", RequestContext::default()).await })
        };
        while !client.is_loading() {
            tokio::task::yield_now().await;
        }

        let second = client.send_message("두 번째", RequestContext::default()).await;
        assert_eq!(second, SendOutcome::Skipped);

        gate.notify_one();
        assert!(matches!(first.await.unwrap(), SendOutcome::Answered(_)));
        assert_eq!(client.transcript().len(), 2);
        assert!(!client.is_loading());
    }
}
