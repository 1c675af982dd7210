//! Classification rule tables
//!
//! Rules are evaluated top to bottom within a tier and the first hit wins.
//! Tiers, in order:
//! 1. `COMMAND_RULES`: things the user wants done (studio control,
//!    simulations, table commands, modals, navigation, date changes)
//! 2. `ENTITY_RULES`: questions anchored on a named entity (an hour, a
//!    zone, a segment, a category)
//! 3. `KEYWORD_RULES`: plain keyword to query type, most specific first
//! 4. `summary_rule`: generic "how are we doing" phrasing
//!
//! The catalog-dependent product/category step runs between tiers 2 and 3
//! and lives in the classifier itself because it is async.
//!
//! All keywords are written compacted (lowercase, no whitespace) and are
//! matched against the compacted message.

use std::sync::LazyLock;

use assistant_types::{Entities, Intent, PageContext, QueryType, TableFilter};
use regex::Regex;

use crate::dictionary::{self, KNOWN_CATEGORIES, KNOWN_SEGMENTS, KNOWN_ZONES, STUDIO};
use crate::extraction::{compact, extract_page, TabRef};

pub const CONFIDENCE_ENTITY: f32 = 0.85;
pub const CONFIDENCE_HOUR: f32 = 0.9;
pub const CONFIDENCE_KEYWORD: f32 = 0.7;
pub const CONFIDENCE_COMMAND: f32 = 0.9;

// ============================================================================
// SIGNALS
// ============================================================================

/// Everything the rules look at, computed once per message
#[derive(Debug)]
pub struct Signals<'a> {
    pub text: &'a str,
    pub compact: String,
    pub page: &'a PageContext,
    pub hour: Option<u8>,
    pub tab: Option<TabRef>,
    pub named_page: Option<&'static str>,
    pub has_date: bool,
    pub categories: Vec<&'static str>,
    pub zones: Vec<&'static str>,
    pub segments: Vec<&'static str>,
}

impl<'a> Signals<'a> {
    pub fn new(
        text: &'a str,
        page: &'a PageContext,
        hour: Option<u8>,
        tab: Option<TabRef>,
        has_date: bool,
    ) -> Self {
        Self {
            text,
            compact: compact(text),
            page,
            hour,
            tab,
            named_page: extract_page(text),
            has_date,
            categories: dictionary::mentioned(text, KNOWN_CATEGORIES),
            zones: dictionary::mentioned(text, KNOWN_ZONES),
            segments: dictionary::mentioned(text, KNOWN_SEGMENTS),
        }
    }

    pub fn has(&self, keyword: &str) -> bool {
        self.compact.contains(keyword)
    }

    pub fn has_any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|kw| self.compact.contains(kw))
    }

    fn on_studio(&self) -> bool {
        self.page.current == STUDIO
    }
}

// ============================================================================
// RULE TYPES
// ============================================================================

/// What a rule decided
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    pub intent: Intent,
    pub query_type: Option<QueryType>,
    pub confidence: f32,
    /// Entities the rule fills in on top of the extracted ones
    pub entities: Entities,
}

impl RuleMatch {
    pub fn query(query_type: QueryType, confidence: f32) -> Self {
        Self {
            intent: Intent::QueryKpi,
            query_type: Some(query_type),
            confidence,
            entities: Entities::default(),
        }
    }

    pub fn command(intent: Intent) -> Self {
        Self {
            intent,
            query_type: None,
            confidence: CONFIDENCE_COMMAND,
            entities: Entities::default(),
        }
    }

    fn with(mut self, fill: impl FnOnce(&mut Entities)) -> Self {
        fill(&mut self.entities);
        self
    }
}

/// A named pure predicate
pub struct Rule {
    pub name: &'static str,
    pub check: fn(&Signals<'_>) -> Option<RuleMatch>,
}

/// Keyword rule: any of `any`, and (when non-empty) any of `also`
pub struct KeywordRule {
    pub name: &'static str,
    pub any: &'static [&'static str],
    pub also: &'static [&'static str],
    pub query_type: QueryType,
}

impl KeywordRule {
    pub fn matches(&self, signals: &Signals<'_>) -> bool {
        signals.has_any(self.any) && (self.also.is_empty() || signals.has_any(self.also))
    }
}

/// First hit in a predicate table, with the rule's name
pub fn first_match(rules: &[Rule], signals: &Signals<'_>) -> Option<(&'static str, RuleMatch)> {
    rules
        .iter()
        .find_map(|rule| (rule.check)(signals).map(|m| (rule.name, m)))
}

/// First keyword rule that matches
pub fn first_keyword(signals: &Signals<'_>) -> Option<&'static KeywordRule> {
    KEYWORD_RULES.iter().find(|rule| rule.matches(signals))
}

/// Keyword tier as a match; a named date raises confidence
pub fn keyword_match(signals: &Signals<'_>) -> Option<(&'static str, RuleMatch)> {
    first_keyword(signals).map(|rule| {
        let confidence = if signals.has_date {
            CONFIDENCE_ENTITY
        } else {
            CONFIDENCE_KEYWORD
        };
        (rule.name, RuleMatch::query(rule.query_type, confidence))
    })
}

// ============================================================================
// TIER 1: COMMANDS
// ============================================================================

pub static COMMAND_RULES: &[Rule] = &[
    Rule { name: "set_simulation_speed", check: set_simulation_speed },
    Rule { name: "pause_simulation", check: pause_simulation },
    Rule { name: "resume_simulation", check: resume_simulation },
    Rule { name: "stop_simulation", check: stop_simulation },
    Rule { name: "reset_camera", check: reset_camera },
    Rule { name: "toggle_overlay", check: toggle_overlay },
    Rule { name: "toggle_layer", check: toggle_layer },
    Rule { name: "apply_optimization", check: apply_optimization },
    Rule { name: "run_optimization", check: run_optimization },
    Rule { name: "run_simulation", check: run_simulation },
    Rule { name: "open_goal_settings", check: open_goal_settings },
    Rule { name: "open_data_import", check: open_data_import },
    Rule { name: "trigger_export", check: trigger_export },
    Rule { name: "set_table_page", check: set_table_page },
    Rule { name: "set_filter", check: set_filter },
    Rule { name: "scroll_to_section", check: scroll_to_section },
    Rule { name: "composite_navigate", check: composite_navigate },
    Rule { name: "navigate", check: navigate },
    Rule { name: "set_tab", check: set_tab },
    Rule { name: "set_date_range", check: set_date_range },
];

const SIMULATION: &str = "시뮬레이션";
const RUN_VERBS: &[&str] = &["실행", "돌려", "돌리", "시작", "해줘", "해봐", "진행"];
const SHOW_VERBS: &[&str] = &["켜", "보여", "표시", "활성화"];
const HIDE_VERBS: &[&str] = &["꺼", "끄", "숨겨", "숨기", "비활성"];
/// Verbs that clearly ask to go somewhere
const NAV_VERBS: &[&str] = &[
    "이동", "가줘", "가자", "가기", "가볼래", "열어", "넘어가", "들어가", "보러가", "전환해",
];
/// Weaker navigation words, only honored when no metric is named
const NAV_NOUNS: &[&str] = &["탭", "페이지", "화면"];
const DATE_VERBS: &[&str] = &[
    "기간", "날짜", "변경", "바꿔", "바꾸", "설정해", "맞춰", "으로봐", "로봐", "기준으로",
];
const SCROLL_VERBS: &[&str] = &["스크롤", "어디있", "어디에있", "어딨", "위치", "찾아줘"];

static SPEED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*배").unwrap());
static TABLE_PAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,4})\s*(?:페이지|쪽)").unwrap());
static CUSTOMER_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,5})\s*명").unwrap());
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,4})\s*분").unwrap());

fn simulation_context(s: &Signals<'_>) -> bool {
    s.has(SIMULATION) || s.on_studio()
}

fn set_simulation_speed(s: &Signals<'_>) -> Option<RuleMatch> {
    if !s.has_any(&["배속", "속도"]) {
        return None;
    }
    let speed: f32 = SPEED_RE.captures(s.text)?[1].parse().ok()?;
    (speed > 0.0).then(|| {
        RuleMatch::command(Intent::SetSimulationSpeed).with(|e| e.speed = Some(speed))
    })
}

fn pause_simulation(s: &Signals<'_>) -> Option<RuleMatch> {
    (simulation_context(s) && s.has_any(&["일시정지", "일시중지", "멈춰", "잠깐멈"]))
        .then(|| RuleMatch::command(Intent::PauseSimulation))
}

fn resume_simulation(s: &Signals<'_>) -> Option<RuleMatch> {
    (simulation_context(s) && s.has_any(&["재개", "다시시작", "이어서", "계속진행", "다시재생"]))
        .then(|| RuleMatch::command(Intent::ResumeSimulation))
}

fn stop_simulation(s: &Signals<'_>) -> Option<RuleMatch> {
    (s.has(SIMULATION) && s.has_any(&["중지", "종료", "그만", "중단", "멈춰"]))
        .then(|| RuleMatch::command(Intent::StopSimulation))
}

fn reset_camera(s: &Signals<'_>) -> Option<RuleMatch> {
    let camera = s.has_any(&["카메라", "시점", "뷰"]);
    (camera && s.has_any(&["초기화", "리셋", "원래대로", "처음으로"]))
        .then(|| RuleMatch::command(Intent::ResetCamera))
}

/// `Some(true)` for show, `Some(false)` for hide
fn visibility(s: &Signals<'_>) -> Option<bool> {
    if s.has_any(HIDE_VERBS) {
        Some(false)
    } else if s.has_any(SHOW_VERBS) {
        Some(true)
    } else {
        None
    }
}

const LAYERS: &[(&str, &str)] = &[
    ("히트맵", "heatmap"),
    ("동선", "flow"),
    ("존", "zones"),
    ("구역", "zones"),
    ("고객", "customers"),
    ("가구", "furniture"),
    ("집기", "furniture"),
    ("직원", "staff"),
    ("센서", "sensors"),
];

fn named_layer(s: &Signals<'_>) -> Option<&'static str> {
    LAYERS
        .iter()
        .find(|(kw, _)| s.has(kw))
        .map(|(_, layer)| *layer)
}

/// An hour plus traffic wording is a question, never a studio command
fn traffic_question_with_hour(s: &Signals<'_>) -> bool {
    s.hour.is_some() && s.has_any(TRAFFIC_WORDS)
}

fn toggle_overlay(s: &Signals<'_>) -> Option<RuleMatch> {
    if !s.has("오버레이") || traffic_question_with_hour(s) {
        return None;
    }
    let visible = visibility(s)?;
    let overlay = named_layer(s).unwrap_or("default");
    Some(RuleMatch::command(Intent::ToggleOverlay).with(|e| {
        e.layer = Some(overlay.to_string());
        e.visible = Some(visible);
    }))
}

fn toggle_layer(s: &Signals<'_>) -> Option<RuleMatch> {
    if !(s.has("레이어") || s.on_studio()) || traffic_question_with_hour(s) {
        return None;
    }
    let layer = named_layer(s)?;
    let visible = visibility(s)?;
    Some(RuleMatch::command(Intent::ToggleLayer).with(|e| {
        e.layer = Some(layer.to_string());
        e.visible = Some(visible);
    }))
}

fn apply_optimization(s: &Signals<'_>) -> Option<RuleMatch> {
    (s.has("최적화") && s.has_any(&["적용", "반영"]))
        .then(|| RuleMatch::command(Intent::ApplyOptimization))
}

fn run_optimization(s: &Signals<'_>) -> Option<RuleMatch> {
    if !(s.has("최적화") && s.has_any(RUN_VERBS)) || s.has("결과") {
        return None;
    }
    // price optimization is a recommendation lookup, not a studio run
    if s.has("가격") || s.has_any(&["추천", "제안"]) {
        return None;
    }
    let kind = if s.has_any(&["인력", "직원", "스태프"]) {
        "staffing"
    } else if s.has_any(&["진열", "상품배치", "머천다이징"]) {
        "merchandising"
    } else {
        "layout"
    };
    Some(
        RuleMatch::command(Intent::RunOptimization)
            .with(|e| e.optimization_type = Some(kind.to_string())),
    )
}

fn run_simulation(s: &Signals<'_>) -> Option<RuleMatch> {
    if !(s.has(SIMULATION) && s.has_any(RUN_VERBS)) || s.has("결과") {
        return None;
    }
    let scenario = if s.has("주말") {
        "weekend"
    } else if s.has_any(&["세일", "할인", "프로모션"]) {
        "sale"
    } else if s.has_any(&["혼잡", "피크", "붐비"]) {
        "peak"
    } else {
        "default"
    };
    let customers = CUSTOMER_COUNT_RE
        .captures(s.text)
        .and_then(|c| c[1].parse().ok());
    let minutes = DURATION_RE.captures(s.text).and_then(|c| c[1].parse().ok());
    Some(RuleMatch::command(Intent::RunSimulation).with(|e| {
        e.scenario = Some(scenario.to_string());
        e.customer_count = customers;
        e.duration_minutes = minutes;
    }))
}

fn open_goal_settings(s: &Signals<'_>) -> Option<RuleMatch> {
    (s.has("목표") && s.has_any(&["설정", "등록", "수정", "바꾸", "변경", "입력"])).then(|| {
        RuleMatch::command(Intent::OpenModal)
            .with(|e| e.modal_id = Some(GOAL_SETTINGS_MODAL.to_string()))
    })
}

pub const GOAL_SETTINGS_MODAL: &str = "goal-settings";
pub const DATA_IMPORT_MODAL: &str = "data-import";

fn open_data_import(s: &Signals<'_>) -> Option<RuleMatch> {
    s.has_any(&["업로드하", "업로드할", "임포트하", "임포트할", "파일올리", "데이터올리", "가져오기창"])
        .then(|| {
            RuleMatch::command(Intent::OpenModal)
                .with(|e| e.modal_id = Some(DATA_IMPORT_MODAL.to_string()))
        })
}

fn trigger_export(s: &Signals<'_>) -> Option<RuleMatch> {
    if !s.has_any(&["내보내", "다운로드", "다운받", "엑셀로", "csv로", "export", "추출해"]) {
        return None;
    }
    let format = if s.has_any(&["엑셀", "xlsx"]) { "xlsx" } else { "csv" };
    Some(
        RuleMatch::command(Intent::TriggerExport)
            .with(|e| e.export_format = Some(format.to_string())),
    )
}

fn set_table_page(s: &Signals<'_>) -> Option<RuleMatch> {
    let page: u32 = TABLE_PAGE_RE.captures(s.text)?[1].parse().ok()?;
    (page > 0).then(|| RuleMatch::command(Intent::SetTablePage).with(|e| e.table_page = Some(page)))
}

const STATUS_FILTERS: &[(&str, &str)] = &[
    ("실패", "failed"),
    ("오류", "error"),
    ("에러", "error"),
    ("완료", "completed"),
    ("성공", "completed"),
    ("진행중", "processing"),
    ("대기", "pending"),
];

const SOURCE_FILTERS: &[(&str, &str)] = &[
    ("csv", "csv"),
    ("엑셀", "excel"),
    ("api", "api"),
    ("pos", "pos"),
    ("수동", "manual"),
];

fn set_filter(s: &Signals<'_>) -> Option<RuleMatch> {
    if !s.has_any(&["필터", "만보여", "만봐", "만표시", "만골라"]) {
        return None;
    }
    let filter = STATUS_FILTERS
        .iter()
        .find(|(kw, _)| s.has(kw))
        .map(|(_, v)| ("status", *v))
        .or_else(|| {
            SOURCE_FILTERS
                .iter()
                .find(|(kw, _)| s.has(kw))
                .map(|(_, v)| ("source", *v))
        })?;
    Some(RuleMatch::command(Intent::SetFilter).with(|e| {
        e.filter = Some(TableFilter {
            field: filter.0.to_string(),
            value: filter.1.to_string(),
        })
    }))
}

fn scroll_to_section(s: &Signals<'_>) -> Option<RuleMatch> {
    if !s.has_any(SCROLL_VERBS) {
        return None;
    }
    let rule = first_keyword(s)?;
    let section = dictionary::target_for(rule.query_type).section?;
    Some(RuleMatch::command(Intent::ScrollToSection).with(|e| {
        e.query_type = Some(rule.query_type);
        e.section = Some(section.to_string());
    }))
}

/// Page and tab a navigation request points at
fn nav_target(s: &Signals<'_>) -> Option<(&'static str, Option<&'static str>)> {
    match (s.named_page, s.tab) {
        (Some(page), Some(tab)) if tab.page == page => Some((page, Some(tab.tab))),
        (Some(page), _) => Some((page, None)),
        (None, Some(tab)) => Some((tab.page, Some(tab.tab))),
        (None, None) => None,
    }
}

fn wants_navigation(s: &Signals<'_>) -> bool {
    s.has_any(NAV_VERBS) || (s.has_any(NAV_NOUNS) && first_keyword(s).is_none())
}

fn nav_match(intent: Intent, page: &str, tab: Option<&str>) -> RuleMatch {
    RuleMatch::command(intent).with(|e| {
        e.page = Some(page.to_string());
        e.tab = tab.map(str::to_string);
    })
}

fn composite_navigate(s: &Signals<'_>) -> Option<RuleMatch> {
    if !(s.has_date && wants_navigation(s)) {
        return None;
    }
    let (page, tab) = nav_target(s)?;
    Some(nav_match(Intent::CompositeNavigate, page, tab))
}

fn navigate(s: &Signals<'_>) -> Option<RuleMatch> {
    if !wants_navigation(s) {
        return None;
    }
    let page = s.named_page?;
    let (page, tab) = nav_target(s).unwrap_or((page, None));
    if page == s.page.current && tab.is_some() {
        return Some(nav_match(Intent::SetTab, page, tab));
    }
    Some(nav_match(Intent::Navigate, page, tab))
}

fn set_tab(s: &Signals<'_>) -> Option<RuleMatch> {
    if !wants_navigation(s) {
        return None;
    }
    let tab = s.tab?;
    let intent = if tab.page == s.page.current {
        Intent::SetTab
    } else {
        Intent::Navigate
    };
    Some(nav_match(intent, tab.page, Some(tab.tab)))
}

fn set_date_range(s: &Signals<'_>) -> Option<RuleMatch> {
    (s.has_date && s.has_any(DATE_VERBS) && first_keyword(s).is_none())
        .then(|| RuleMatch::command(Intent::SetDateRange))
}

// ============================================================================
// TIER 2: NAMED ENTITIES
// ============================================================================

pub static ENTITY_RULES: &[Rule] = &[
    Rule { name: "hour_in_traffic_question", check: hour_in_traffic_question },
    Rule { name: "new_vs_returning", check: new_vs_returning },
    Rule { name: "named_zone", check: named_zone },
    Rule { name: "named_segment", check: named_segment },
    Rule { name: "named_category", check: named_category },
];

const TRAFFIC_WORDS: &[&str] = &[
    "방문", "몇명", "손님", "고객수", "입장", "트래픽", "유입", "사람", "왔어", "왔나", "붐비",
];
const CUSTOMER_WORDS: &[&str] = &["고객", "세그먼트", "회원", "손님", "등급"];

/// A time-of-day token in a traffic question is always the hourly pattern
fn hour_in_traffic_question(s: &Signals<'_>) -> Option<RuleMatch> {
    let hour = s.hour?;
    s.has_any(TRAFFIC_WORDS).then(|| {
        RuleMatch::query(QueryType::HourlyPattern, CONFIDENCE_HOUR).with(|e| e.hour = Some(hour))
    })
}

fn new_vs_returning(s: &Signals<'_>) -> Option<RuleMatch> {
    (s.has("신규") && s.has("재방문"))
        .then(|| RuleMatch::query(QueryType::NewVsReturning, CONFIDENCE_ENTITY))
}

fn named_zone(s: &Signals<'_>) -> Option<RuleMatch> {
    if s.zones.is_empty() {
        return None;
    }
    let query_type = if s.has("체류") {
        QueryType::DwellTime
    } else if s.has("전환") {
        QueryType::ZoneConversion
    } else {
        QueryType::ZoneAnalysis
    };
    Some(RuleMatch::query(query_type, CONFIDENCE_ENTITY))
}

fn named_segment(s: &Signals<'_>) -> Option<RuleMatch> {
    if s.segments.is_empty() || !s.has_any(CUSTOMER_WORDS) {
        return None;
    }
    let query_type = if s.has("객단가") {
        QueryType::SegmentAvgBasket
    } else if s.segments == ["충성"] {
        QueryType::LoyalCustomers
    } else {
        QueryType::CustomerSegment
    };
    Some(RuleMatch::query(query_type, CONFIDENCE_ENTITY))
}

fn named_category(s: &Signals<'_>) -> Option<RuleMatch> {
    if s.categories.is_empty() {
        return None;
    }
    let query_type = if s.has("재고") {
        QueryType::StockLevel
    } else {
        QueryType::CategoryAnalysis
    };
    Some(RuleMatch::query(query_type, CONFIDENCE_ENTITY))
}

// ============================================================================
// TIER 3: KEYWORDS
// ============================================================================

const FORECAST: &[&str] = &["예측", "전망", "예상"];
const RECOMMEND: &[&str] = &["추천", "제안"];
const ROI_WORDS: &[&str] = &["roi", "투자수익", "투자대비"];

macro_rules! kw {
    ($name:literal, [$($any:literal),+], $qt:ident) => {
        KeywordRule { name: $name, any: &[$($any),+], also: &[], query_type: QueryType::$qt }
    };
    ($name:literal, $any:expr, [$($also:literal),+], $qt:ident) => {
        KeywordRule { name: $name, any: $any, also: &[$($also),+], query_type: QueryType::$qt }
    };
}

pub static KEYWORD_RULES: &[KeywordRule] = &[
    // Overview specials
    kw!("goal", ["목표", "달성률"], Goal),
    kw!("funnel", ["퍼널", "깔때기", "구매단계"], Funnel),
    // Prediction
    kw!("revenue_forecast", FORECAST, ["매출", "수익"], RevenueForecast),
    kw!("visitor_forecast", FORECAST, ["방문", "손님", "고객수"], VisitorForecast),
    kw!("demand_forecast", FORECAST, ["수요", "판매량"], DemandForecast),
    kw!("conversion_forecast", FORECAST, ["전환"], ConversionForecast),
    kw!("prediction_summary", ["예측", "전망"], PredictionSummary),
    // AI recommendation
    kw!("layout_recommendation", RECOMMEND, ["레이아웃", "배치", "동선"], LayoutRecommendation),
    kw!("staffing_recommendation", RECOMMEND, ["인력", "직원", "근무"], StaffingRecommendation),
    kw!("promotion_recommendation", RECOMMEND, ["프로모션", "할인", "이벤트", "행사"], PromotionRecommendation),
    kw!("inventory_recommendation", RECOMMEND, ["재고"], InventoryRecommendation),
    kw!("price_optimization", ["가격최적화", "가격추천", "가격제안", "적정가격"], PriceOptimization),
    kw!("reorder", ["발주", "재주문"], ReorderSuggestion),
    kw!("ai_recommendation", ["ai추천", "추천", "ai제안"], AiRecommendation),
    // ROI
    kw!("applied_strategies", ["적용된전략", "적용전략", "적용한전략", "실행중인전략"], AppliedStrategies),
    kw!("strategy_detail", ["전략상세", "전략세부"], StrategyDetail),
    kw!("roi_by_strategy", ROI_WORDS, ["전략별"], RoiByStrategy),
    kw!("roi_trend", ROI_WORDS, ["추이", "트렌드", "변화"], RoiTrend),
    kw!("roi_summary", ["roi", "투자수익", "투자대비"], RoiSummary),
    // Inventory
    kw!("stockout", ["품절", "재고없", "재고소진"], Stockout),
    kw!("low_stock", ["재고부족", "부족한재고", "재고가부족", "재고적은"], LowStock),
    kw!("overstock", ["과잉재고", "재고과잉", "재고과다", "재고가많"], Overstock),
    kw!("inventory_turnover", ["회전율", "재고회전"], InventoryTurnover),
    kw!("stock_movement", ["입출고", "입고", "출고"], StockMovement),
    kw!("stock_level", ["재고수준", "재고량", "현재재고", "남은재고"], StockLevel),
    kw!("inventory", ["재고"], Inventory),
    // Data control tower
    kw!("data_quality", ["데이터품질", "품질점수", "품질"], DataQuality),
    kw!("pipeline_status", ["파이프라인"], PipelineStatus),
    kw!("data_lineage", ["리니지", "계보"], DataLineage),
    kw!("recent_imports", ["최근임포트", "최근업로드", "최근가져온"], RecentImports),
    kw!("source_status", ["소스상태", "연결상태", "동기화상태"], DataSourceStatus),
    // Settings
    kw!("import_history", ["임포트이력", "업로드이력", "가져오기이력", "import"], ImportHistory),
    kw!("api_connections", ["api연동", "api연결", "api"], ApiConnections),
    kw!("data_sources", ["데이터소스", "데이터연동", "연동된데이터"], DataSources),
    kw!("user_management", ["사용자관리", "멤버", "팀원", "권한", "사용자"], UserManagement),
    kw!("license", ["라이선스", "플랜", "구독", "요금제"], LicenseInfo),
    kw!("system_settings", ["시스템설정", "알림설정", "시스템"], SystemSettings),
    kw!("store_settings", ["매장설정", "매장정보", "영업시간"], StoreSettings),
    // Studio
    kw!("simulation_result", ["시뮬레이션결과"], SimulationResult),
    kw!("optimization_result", ["최적화결과"], OptimizationResult),
    kw!("overlay_view", ["오버레이"], OverlayView),
    kw!("studio_layout", ["3d", "디지털트윈", "매장레이아웃"], StudioLayout),
    // Store
    kw!("heatmap", ["히트맵"], Heatmap),
    kw!("weekday_pattern", ["요일"], WeekdayPattern),
    kw!("peak_time", ["피크", "붐비", "혼잡한시간", "가장많은시간"], PeakTime),
    kw!("hourly_pattern", ["시간대", "시간별"], HourlyPattern),
    kw!("dwell_time", ["체류"], DwellTime),
    kw!("zone_conversion", ["존별전환", "구역별전환", "존전환"], ZoneConversion),
    kw!("zone_analysis", ["존별", "존분석", "존현황", "구역", "zone"], ZoneAnalysis),
    // Customer
    kw!("revisit_rate", ["재방문율", "재방문률"], RevisitRate),
    kw!("return_rate", ["재방문고객", "재방문비율", "재구매"], ReturnRate),
    kw!("visit_frequency", ["방문빈도", "방문횟수", "자주방문", "자주오"], VisitFrequency),
    kw!("loyal_customers", ["충성고객", "단골"], LoyalCustomers),
    kw!("customer_trend", ["고객추이", "고객트렌드", "고객변화"], CustomerTrend),
    kw!("customer_segment", ["세그먼트", "고객분포", "고객유형", "고객층", "고객군"], CustomerSegment),
    // Product
    kw!("top_products", ["인기상품", "베스트", "잘팔리", "잘나가", "많이팔린", "top"], TopProducts),
    kw!("bottom_products", ["안팔리", "부진", "적게팔린", "워스트"], BottomProducts),
    kw!("product_trend", ["상품추이", "상품트렌드", "제품추이"], ProductTrend),
    kw!("category_analysis", ["카테고리"], CategoryAnalysis),
    kw!("units_sold", ["판매량", "판매수량", "몇개", "팔린"], UnitsSold),
    kw!("product", ["상품", "제품"], Product),
    // Overview KPIs
    kw!("sales_per_area", ["평당", "면적당", "단위면적"], SalesPerArea),
    kw!("avg_basket", ["객단가", "평균구매", "평균결제", "평균거래"], AvgBasket),
    kw!("conversion", ["전환율", "구매율", "전환"], Conversion),
    kw!("transactions", ["거래", "결제건", "구매건", "주문"], Transactions),
    kw!("unique_visitors", ["순방문", "유니크"], UniqueVisitors),
    kw!("visitors", ["방문", "몇명", "손님", "트래픽", "입장"], Visitors),
    kw!("revenue", ["매출", "수익", "판매액", "벌었"], Revenue),
    kw!("daily_trend", ["일별", "추이", "트렌드", "흐름"], DailyTrend),
];

// ============================================================================
// TIER 4: SUMMARY
// ============================================================================

const SUMMARY_WORDS: &[&str] = &["요약", "현황", "개요", "전반", "한눈에", "브리핑", "어때", "어땠"];

/// "개요" means the overview summary, "매장" the store tab's, else overview
pub fn summary_rule(s: &Signals<'_>) -> Option<(&'static str, RuleMatch)> {
    if !s.has_any(SUMMARY_WORDS) {
        return None;
    }
    let query_type = if s.has("개요") {
        QueryType::Summary
    } else if s.has("매장") {
        QueryType::StoreSummary
    } else {
        QueryType::Summary
    };
    Some(("summary", RuleMatch::query(query_type, CONFIDENCE_KEYWORD)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals<'a>(text: &'a str, page: &'a PageContext) -> Signals<'a> {
        Signals::new(
            text,
            page,
            crate::extraction::extract_hour(text),
            crate::extraction::extract_tab(text, Some(&page.current)),
            false,
        )
    }

    fn keyword_for(text: &str) -> Option<QueryType> {
        let page = PageContext::new("/insights");
        first_keyword(&signals(text, &page)).map(|r| r.query_type)
    }

    #[test]
    fn test_keywords_are_compacted() {
        for rule in KEYWORD_RULES {
            for kw in rule.any.iter().chain(rule.also) {
                assert_eq!(*kw, compact(kw), "rule {} has uncompacted {kw}", rule.name);
            }
        }
    }

    #[test]
    fn test_rule_names_unique() {
        let mut names: Vec<_> = KEYWORD_RULES.iter().map(|r| r.name).collect();
        names.extend(COMMAND_RULES.iter().map(|r| r.name));
        names.extend(ENTITY_RULES.iter().map(|r| r.name));
        let count = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[test]
    fn test_specific_keywords_win() {
        assert_eq!(keyword_for("매출 예측"), Some(QueryType::RevenueForecast));
        assert_eq!(keyword_for("재고 부족한 상품"), Some(QueryType::LowStock));
        assert_eq!(keyword_for("재방문율"), Some(QueryType::RevisitRate));
        assert_eq!(keyword_for("평균 결제 금액"), Some(QueryType::AvgBasket));
        assert_eq!(keyword_for("전략별 ROI"), Some(QueryType::RoiByStrategy));
        assert_eq!(keyword_for("매출"), Some(QueryType::Revenue));
        assert_eq!(keyword_for("안녕"), None);
    }

    #[test]
    fn test_hour_rule_requires_traffic_words() {
        let page = PageContext::new("/insights");
        let s = signals("오후 3시에 몇명 왔어?", &page);
        let (_, m) = first_match(ENTITY_RULES, &s).unwrap();
        assert_eq!(m.query_type, Some(QueryType::HourlyPattern));
        assert_eq!(m.entities.hour, Some(15));

        let s = signals("오후 3시 매출", &page);
        assert!(hour_in_traffic_question(&s).is_none());
    }

    #[test]
    fn test_pause_is_not_stop() {
        let page = PageContext::new("/studio");
        let s = signals("시뮬레이션 일시중지", &page);
        let (name, _) = first_match(COMMAND_RULES, &s).unwrap();
        assert_eq!(name, "pause_simulation");
    }

    #[test]
    fn test_speed_and_run() {
        let page = PageContext::new("/studio");
        let s = signals("시뮬레이션 2배속으로 속도 올려", &page);
        let (_, m) = first_match(COMMAND_RULES, &s).unwrap();
        assert_eq!(m.intent, Intent::SetSimulationSpeed);
        assert_eq!(m.entities.speed, Some(2.0));

        let s = signals("주말 시나리오로 시뮬레이션 돌려줘 200명 30분", &page);
        let (_, m) = first_match(COMMAND_RULES, &s).unwrap();
        assert_eq!(m.intent, Intent::RunSimulation);
        assert_eq!(m.entities.scenario.as_deref(), Some("weekend"));
        assert_eq!(m.entities.customer_count, Some(200));
        assert_eq!(m.entities.duration_minutes, Some(30));
    }

    #[test]
    fn test_price_optimization_is_not_a_studio_run() {
        let page = PageContext::new("/studio");
        for text in ["가격 최적화 추천해줘", "가격최적화 해줘", "최적화 제안 해줘"] {
            let s = signals(text, &page);
            assert!(
                !matches!(first_match(COMMAND_RULES, &s), Some((_, m)) if m.intent == Intent::RunOptimization),
                "{text}"
            );
        }

        let s = signals("레이아웃 최적화 실행해줘", &page);
        let (_, m) = first_match(COMMAND_RULES, &s).unwrap();
        assert_eq!(m.intent, Intent::RunOptimization);
        assert_eq!(m.entities.optimization_type.as_deref(), Some("layout"));
    }

    #[test]
    fn test_hour_traffic_question_skips_studio_toggles() {
        let page = PageContext::new("/studio");
        let s = signals("오후 3시 고객 몇명 보여줘", &page);
        assert!(first_match(COMMAND_RULES, &s).is_none());
        let (name, m) = first_match(ENTITY_RULES, &s).unwrap();
        assert_eq!(name, "hour_in_traffic_question");
        assert_eq!(m.entities.hour, Some(15));
    }

    #[test]
    fn test_layer_toggle_on_studio() {
        let page = PageContext::new("/studio");
        let s = signals("동선 레이어 꺼줘", &page);
        let (_, m) = first_match(COMMAND_RULES, &s).unwrap();
        assert_eq!(m.intent, Intent::ToggleLayer);
        assert_eq!(m.entities.layer.as_deref(), Some("flow"));
        assert_eq!(m.entities.visible, Some(false));
    }

    #[test]
    fn test_table_commands() {
        let page = PageContext::with_tab("/data-control", "sources");
        let s = signals("실패한 것만 보여줘", &page);
        let (_, m) = first_match(COMMAND_RULES, &s).unwrap();
        assert_eq!(m.intent, Intent::SetFilter);
        assert_eq!(m.entities.filter.unwrap().value, "failed");

        let s = signals("3페이지", &page);
        let (_, m) = first_match(COMMAND_RULES, &s).unwrap();
        assert_eq!(m.entities.table_page, Some(3));

        let s = signals("엑셀로 내보내줘", &page);
        let (_, m) = first_match(COMMAND_RULES, &s).unwrap();
        assert_eq!(m.entities.export_format.as_deref(), Some("xlsx"));
    }

    #[test]
    fn test_navigation_rules() {
        let page = PageContext::with_tab("/insights", "overview");
        let s = signals("고객 탭으로 이동", &page);
        let (_, m) = first_match(COMMAND_RULES, &s).unwrap();
        assert_eq!(m.intent, Intent::SetTab);
        assert_eq!(m.entities.tab.as_deref(), Some("customer"));

        let s = signals("설정 페이지로 가줘", &page);
        let (_, m) = first_match(COMMAND_RULES, &s).unwrap();
        assert_eq!(m.intent, Intent::Navigate);
        assert_eq!(m.entities.page.as_deref(), Some("/settings"));
    }

    #[test]
    fn test_summary_precedence() {
        let page = PageContext::new("/insights");
        let q = |t: &str| summary_rule(&signals(t, &page)).map(|(_, m)| m.query_type);
        assert_eq!(q("매장 개요 보여줘"), Some(Some(QueryType::Summary)));
        assert_eq!(q("매장 현황"), Some(Some(QueryType::StoreSummary)));
        assert_eq!(q("요약해줘"), Some(Some(QueryType::Summary)));
    }
}
