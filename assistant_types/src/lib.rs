//! Assistant Types - Level 1 Foundation Types
//!
//! This crate contains the data structures every part of the assistant
//! pipeline exchanges: the HTTP request/response bodies, the classifier's
//! output, the UI action vocabulary and the per-handler result unit.
//!
//! ## Architecture Level: LEVEL 1 (Foundation)
//!
//! Nothing in this crate depends on another workspace crate. The server
//! library, the HTTP binary and the client dispatcher all build on it.
//!
//! ## Critical Rules
//!
//! 1. **NO BUSINESS LOGIC** - Only data structures, constructors and accessors
//! 2. **CAMELCASE ON THE WIRE** - Field names match the dashboard's JSON
//! 3. **CLOSED VOCABULARIES** - Intents, query types and action types are enums

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod actions;
pub mod query_type;

pub use actions::{TableFilter, UiAction};
pub use query_type::QueryType;

// ============================================================================
// INTENTS
// ============================================================================

/// Top-level category of what the user wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    QueryKpi,
    Navigate,
    SetTab,
    SetDateRange,
    CompositeNavigate,
    ScrollToSection,
    OpenModal,
    RunSimulation,
    RunOptimization,
    SetFilter,
    TriggerExport,
    SetTablePage,
    // Studio control
    ToggleLayer,
    ToggleOverlay,
    SetSimulationSpeed,
    PauseSimulation,
    ResumeSimulation,
    StopSimulation,
    ResetCamera,
    ApplyOptimization,
    GeneralChat,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueryKpi => "query_kpi",
            Self::Navigate => "navigate",
            Self::SetTab => "set_tab",
            Self::SetDateRange => "set_date_range",
            Self::CompositeNavigate => "composite_navigate",
            Self::ScrollToSection => "scroll_to_section",
            Self::OpenModal => "open_modal",
            Self::RunSimulation => "run_simulation",
            Self::RunOptimization => "run_optimization",
            Self::SetFilter => "set_filter",
            Self::TriggerExport => "trigger_export",
            Self::SetTablePage => "set_table_page",
            Self::ToggleLayer => "toggle_layer",
            Self::ToggleOverlay => "toggle_overlay",
            Self::SetSimulationSpeed => "set_simulation_speed",
            Self::PauseSimulation => "pause_simulation",
            Self::ResumeSimulation => "resume_simulation",
            Self::StopSimulation => "stop_simulation",
            Self::ResetCamera => "reset_camera",
            Self::ApplyOptimization => "apply_optimization",
            Self::GeneralChat => "general_chat",
        }
    }

    /// Studio-control intents drive the 3D digital twin directly
    pub fn is_studio_control(&self) -> bool {
        matches!(
            self,
            Self::ToggleLayer
                | Self::ToggleOverlay
                | Self::SetSimulationSpeed
                | Self::PauseSimulation
                | Self::ResumeSimulation
                | Self::StopSimulation
                | Self::ResetCamera
                | Self::ApplyOptimization
        )
    }

    /// Intents answered purely by moving the UI
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::Navigate
                | Self::SetTab
                | Self::SetDateRange
                | Self::CompositeNavigate
                | Self::ScrollToSection
                | Self::OpenModal
        )
    }

    /// Intents that manipulate a data table on the current page
    pub fn is_table_control(&self) -> bool {
        matches!(
            self,
            Self::SetFilter | Self::TriggerExport | Self::SetTablePage
        )
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hint that changes how a handler phrases the same data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseHint {
    /// Percentage-of-total per category/segment/zone
    Distribution,
    /// Units sold instead of revenue
    Quantity,
    /// Per-SKU listing
    Sku,
    /// Current on-hand stock
    CurrentStock,
    /// Ordered top-N listing
    Ranking,
    /// Day-by-day trend
    Trend,
}

impl ResponseHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Distribution => "distribution",
            Self::Quantity => "quantity",
            Self::Sku => "sku",
            Self::CurrentStock => "currentStock",
            Self::Ranking => "ranking",
            Self::Trend => "trend",
        }
    }
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Structured values pulled out of a message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_type: Option<QueryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_end: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_preset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item_filter: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_hint: Option<ResponseHint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<TableFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    /// Show (`true`) or hide (`false`) for layer/overlay toggles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimization_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_format: Option<String>,
}

impl Entities {
    /// Whether the message named a date at all
    pub fn has_date(&self) -> bool {
        self.date_start.is_some() && self.date_end.is_some()
    }
}

/// Output of the intent classifier. Built fresh per message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub intent: Intent,
    pub entities: Entities,
    /// Confidence score (0.0 to 1.0)
    pub confidence: f32,
}

impl ClassificationResult {
    pub fn new(intent: Intent, entities: Entities, confidence: f32) -> Self {
        Self {
            intent,
            entities,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn query_type(&self) -> Option<QueryType> {
        self.entities.query_type
    }
}

// ============================================================================
// PAGE AND DATE CONTEXT
// ============================================================================

/// Where the user currently is in the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    /// Route path, e.g. "/insights"
    pub current: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab: Option<String>,
}

impl PageContext {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            current: current.into(),
            tab: None,
        }
    }

    pub fn with_tab(current: impl Into<String>, tab: impl Into<String>) -> Self {
        Self {
            current: current.into(),
            tab: Some(tab.into()),
        }
    }
}

/// A resolved date window with its optional comparison window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_end_date: Option<NaiveDate>,
}

impl DateRange {
    /// Builds a range, swapping the bounds if they arrive reversed
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        let (start_date, end_date) = if start_date <= end_date {
            (start_date, end_date)
        } else {
            (end_date, start_date)
        };
        Self {
            start_date,
            end_date,
            compare_start_date: None,
            compare_end_date: None,
        }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    pub fn with_comparison(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.compare_start_date = Some(start);
        self.compare_end_date = Some(end);
        self
    }

    /// Inclusive length in days
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn comparison(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.compare_start_date, self.compare_end_date) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

// ============================================================================
// HTTP REQUEST / RESPONSE
// ============================================================================

/// Date filter as the dashboard currently shows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDateRange {
    #[serde(default)]
    pub preset: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default)]
    pub page: PageContext,
    #[serde(default)]
    pub date_range: Option<ClientDateRange>,
    #[serde(default)]
    pub store: Option<StoreRef>,
}

/// Body of a chat turn sent by the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub context: RequestContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub conversation_id: String,
    pub intent: String,
    pub confidence: f32,
    pub execution_time_ms: u64,
}

/// Successful (200) response of a chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    #[serde(default)]
    pub actions: Vec<UiAction>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub meta: ResponseMeta,
}

/// Structured failure body. Every non-200 response carries one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Taxonomy code, e.g. "RATE_LIMITED"
    pub error: String,
    /// Canned user-facing message
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

// ============================================================================
// HANDLER RESULT
// ============================================================================

/// The unit of work returned by every tab-specific query handler
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryActionResult {
    pub actions: Vec<UiAction>,
    pub message: String,
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl QueryActionResult {
    pub fn new(actions: Vec<UiAction>, message: impl Into<String>) -> Self {
        Self {
            actions,
            message: message.into(),
            suggestions: Vec::new(),
            data: None,
        }
    }

    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions = suggestions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_orders_bounds() {
        let range = DateRange::new(date(2024, 12, 10), date(2024, 12, 1));
        assert_eq!(range.start_date, date(2024, 12, 1));
        assert_eq!(range.end_date, date(2024, 12, 10));
        assert_eq!(range.days(), 10);
    }

    #[test]
    fn test_date_range_wire_format() {
        let range = DateRange::new(date(2024, 12, 1), date(2024, 12, 10))
            .with_comparison(date(2024, 11, 21), date(2024, 11, 30));
        let json = serde_json::to_value(range).unwrap();
        assert_eq!(json["startDate"], "2024-12-01");
        assert_eq!(json["compareEndDate"], "2024-11-30");
    }

    #[test]
    fn test_chat_request_minimal_body() {
        let req: ChatRequest = serde_json::from_str(r#"{"message":"매출 알려줘"}"#).unwrap();
        assert_eq!(req.message, "매출 알려줘");
        assert!(req.conversation_id.is_none());
        assert!(req.context.store.is_none());
    }

    #[test]
    fn test_chat_request_full_body() {
        let body = r#"{
            "message": "오늘 방문객",
            "conversationId": "c1",
            "context": {
                "page": {"current": "/insights", "tab": "overview"},
                "dateRange": {"preset": "today", "startDate": "2024-12-01", "endDate": "2024-12-01"},
                "store": {"id": "s1", "name": "강남점"}
            }
        }"#;
        let req: ChatRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.context.page.tab.as_deref(), Some("overview"));
        assert_eq!(req.context.store.unwrap().name, "강남점");
        assert_eq!(
            req.context.date_range.unwrap().preset.as_deref(),
            Some("today")
        );
    }

    #[test]
    fn test_intent_wire_names() {
        assert_eq!(
            serde_json::to_value(Intent::QueryKpi).unwrap(),
            serde_json::json!("query_kpi")
        );
        assert!(Intent::ResetCamera.is_studio_control());
        assert!(!Intent::GeneralChat.is_navigation());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let result = ClassificationResult::new(Intent::GeneralChat, Entities::default(), 1.4);
        assert_eq!(result.confidence, 1.0);
    }
}
