//! Intent classification
//!
//! Turns a raw message into a `ClassificationResult`:
//! 1. Seed entities from the extractors (date, hour, tab)
//! 2. Walk the rule tiers in `rules`, first hit wins
//! 3. For data questions, attach the response hint and item filter
//!
//! Classification never fails. Anything unmatched is `general_chat`.

pub mod catalog;
pub mod rules;

pub use catalog::{CatalogLoader, EmptyCatalog, LazyCatalog, ProductCatalog, SourceCatalogLoader};
pub use rules::{Signals, DATA_IMPORT_MODAL, GOAL_SETTINGS_MODAL};

use assistant_types::{
    ClassificationResult, Entities, Intent, PageContext, QueryType, ResponseHint,
};
use chrono::NaiveDate;

use crate::dictionary::{self, DATE_WORDS, KNOWN_CATEGORIES, KNOWN_SEGMENTS, KNOWN_ZONES, STOP_WORDS};
use crate::extraction::{extract_date_range, extract_hour, extract_tab, normalize_for_match};
use rules::{RuleMatch, CONFIDENCE_ENTITY};

pub const CONFIDENCE_AMBIGUOUS: f32 = 0.55;
pub const CONFIDENCE_UNKNOWN_ITEM: f32 = 0.5;
pub const CONFIDENCE_FALLBACK: f32 = 0.3;

/// Per-message inputs besides the text
#[derive(Debug, Clone, Copy)]
pub struct ClassifierContext<'a> {
    pub page: &'a PageContext,
    /// Store-local date used to resolve relative dates
    pub today: NaiveDate,
}

/// Classify one message.
///
/// `catalog` is consulted only when the message names an item that is not
/// a known category, zone or segment, and then at most once.
pub async fn classify(
    message: &str,
    ctx: &ClassifierContext<'_>,
    catalog: &dyn CatalogLoader,
) -> ClassificationResult {
    let text = message.trim();
    if text.is_empty() {
        return fallback(Entities::default());
    }

    let date = extract_date_range(text, ctx.today);
    let hour = extract_hour(text);
    let tab = extract_tab(text, Some(&ctx.page.current));

    let mut entities = Entities {
        tab: tab.map(|t| t.tab.to_string()),
        hour,
        ..Entities::default()
    };
    if let Some(date) = &date {
        entities.date_start = Some(date.start);
        entities.date_end = Some(date.end);
        entities.date_preset = date.preset.map(|p| p.as_str().to_string());
    }

    let signals = Signals::new(text, ctx.page, hour, tab, date.is_some());
    let lazy = LazyCatalog::new(catalog);

    let mut catalog_terms = Vec::new();
    let matched = match rules::first_match(rules::COMMAND_RULES, &signals) {
        Some(hit) => Some(hit),
        None => match rules::first_match(rules::ENTITY_RULES, &signals) {
            Some(hit) => Some(hit),
            None => match catalog_stage(&signals, &lazy).await {
                Some((hit, terms)) => {
                    catalog_terms = terms;
                    Some(hit)
                }
                None => rules::keyword_match(&signals).or_else(|| rules::summary_rule(&signals)),
            },
        },
    };

    let Some((rule, matched)) = matched else {
        tracing::debug!(catalog_loaded = lazy.is_loaded(), "No rule matched");
        return fallback(entities);
    };

    merge(&mut entities, matched.entities);
    if matched.intent == Intent::QueryKpi {
        entities.query_type = matched.query_type;
        if let Some(query_type) = matched.query_type {
            entities.response_hint = response_hint(&signals, query_type);
        }
        entities.item_filter = item_filter(text, &catalog_terms);
    }

    tracing::debug!(
        rule,
        intent = %matched.intent,
        query_type = ?entities.query_type,
        confidence = matched.confidence,
        catalog_loaded = lazy.is_loaded(),
        "Classified message"
    );
    ClassificationResult::new(matched.intent, entities, matched.confidence)
}

fn fallback(entities: Entities) -> ClassificationResult {
    ClassificationResult::new(Intent::GeneralChat, entities, CONFIDENCE_FALLBACK)
}

/// Overlay the rule's entities on the extracted ones
fn merge(base: &mut Entities, patch: Entities) {
    macro_rules! take {
        ($($field:ident),+) => {
            $(if patch.$field.is_some() { base.$field = patch.$field; })+
        };
    }
    take!(
        query_type,
        page,
        tab,
        section,
        modal_id,
        hour,
        filter,
        table_page,
        speed,
        layer,
        visible,
        scenario,
        customer_count,
        duration_minutes,
        optimization_type,
        export_format
    );
}

// ============================================================================
// CATALOG STAGE
// ============================================================================

const PRODUCT_INDICATORS: &[&str] = &[
    "판매량", "판매", "팔린", "팔렸", "팔려", "몇개", "상품", "제품", "카테고리", "실적", "수량",
];

/// Query types a catalog reading may replace
const CATALOG_OVERRIDABLE: &[QueryType] = &[
    QueryType::Product,
    QueryType::UnitsSold,
    QueryType::CategoryAnalysis,
];

/// Particles peeled off the end of a token, longest first
const PARTICLES: &[&str] = &[
    "에서는", "으로", "이랑", "에서", "하고", "까지", "부터", "은", "는", "가", "을", "를",
    "의", "에", "도", "만", "랑", "과", "와", "로", "별",
];

const VERB_ENDINGS: &[&str] = &["줘", "어", "요", "야", "니", "까"];

/// Tokens that may name a product or category
fn candidate_terms(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .map(strip_particle)
        .filter(|token| token.chars().count() > 1)
        .filter(|token| !token.chars().any(|c| c.is_ascii_digit()))
        .filter(|token| !VERB_ENDINGS.iter().any(|e| token.ends_with(e)))
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

fn strip_particle(token: &str) -> &str {
    for particle in PARTICLES {
        if let Some(stem) = token.strip_suffix(particle) {
            if stem.chars().count() >= 2 {
                return stem;
            }
        }
    }
    token
}

fn is_stop_word(token: &str) -> bool {
    let lowered = token.to_lowercase();
    let hits = |words: &[&str]| {
        words.iter().any(|w| {
            lowered == *w || (w.chars().count() >= 2 && lowered.starts_with(w))
        })
    };
    hits(STOP_WORDS) || hits(DATE_WORDS)
}

/// Decide product vs category for an unrecognized item name
async fn catalog_stage(
    signals: &Signals<'_>,
    catalog: &LazyCatalog<'_>,
) -> Option<((&'static str, RuleMatch), Vec<String>)> {
    if !signals.has_any(PRODUCT_INDICATORS) {
        return None;
    }
    if let Some(rule) = rules::first_keyword(signals) {
        if !CATALOG_OVERRIDABLE.contains(&rule.query_type) {
            return None;
        }
    }
    let terms = candidate_terms(signals.text);
    if terms.is_empty() {
        return None;
    }

    if signals.has("카테고리") {
        let hit = RuleMatch::query(QueryType::CategoryAnalysis, CONFIDENCE_ENTITY);
        return Some((("explicit_category", hit), terms));
    }
    if signals.has_any(&["상품", "제품"]) {
        let hit = RuleMatch::query(QueryType::Product, CONFIDENCE_ENTITY);
        return Some((("explicit_product", hit), terms));
    }

    let Some(loaded) = catalog.get().await else {
        let hit = RuleMatch::query(QueryType::Product, CONFIDENCE_UNKNOWN_ITEM);
        return Some((("catalog_unavailable", hit), terms));
    };

    let categories: Vec<&String> = terms.iter().filter(|t| loaded.is_category(t)).collect();
    let products: Vec<&String> = terms.iter().filter(|t| loaded.is_product(t)).collect();

    let (name, query_type, confidence) = match (categories.is_empty(), products.is_empty()) {
        (false, false) => ("catalog_ambiguous", QueryType::CategoryAnalysis, CONFIDENCE_AMBIGUOUS),
        (false, true) => ("catalog_category", QueryType::CategoryAnalysis, CONFIDENCE_ENTITY),
        (true, false) => ("catalog_product", QueryType::Product, CONFIDENCE_ENTITY),
        (true, true) => ("catalog_unknown", QueryType::Product, CONFIDENCE_UNKNOWN_ITEM),
    };

    let known: Vec<String> = terms
        .iter()
        .filter(|t| categories.contains(t) || products.contains(t))
        .cloned()
        .collect();
    let terms = if known.is_empty() { terms } else { known };

    Some(((name, RuleMatch::query(query_type, confidence)), terms))
}

// ============================================================================
// MODIFIERS
// ============================================================================

const DISTRIBUTION_WORDS: &[&str] = &["분포", "비중", "점유율", "구성비"];
const QUANTITY_WORDS: &[&str] = &["판매량", "몇개", "팔린", "팔렸", "수량"];
const TREND_WORDS: &[&str] = &["추이", "트렌드", "일별", "흐름"];

fn response_hint(signals: &Signals<'_>, query_type: QueryType) -> Option<ResponseHint> {
    use QueryType::*;

    let categorical = matches!(
        query_type,
        ZoneAnalysis | CustomerSegment | CategoryAnalysis | SegmentAvgBasket
    );
    let product = matches!(
        query_type,
        CategoryAnalysis | Product | TopProducts | BottomProducts | UnitsSold | ProductTrend
    );
    let stock = matches!(query_type, Inventory | StockLevel | LowStock | Overstock);

    if categorical && signals.has_any(DISTRIBUTION_WORDS) {
        Some(ResponseHint::Distribution)
    } else if product && signals.has_any(QUANTITY_WORDS) {
        Some(ResponseHint::Quantity)
    } else if product && signals.has_any(&["sku", "품번"]) {
        Some(ResponseHint::Sku)
    } else if stock && signals.has_any(&["현재", "지금", "남은", "남아"]) {
        Some(ResponseHint::CurrentStock)
    } else if matches!(query_type, TopProducts | BottomProducts)
        || (product && signals.has_any(&["순위", "랭킹", "top"]))
    {
        Some(ResponseHint::Ranking)
    } else if !matches!(query_type, DailyTrend | CustomerTrend | ProductTrend | RoiTrend)
        && signals.has_any(TREND_WORDS)
    {
        Some(ResponseHint::Trend)
    } else {
        None
    }
}

/// Named zones, segments, categories and catalog items, in mention order
fn item_filter(text: &str, catalog_terms: &[String]) -> Vec<String> {
    let known: Vec<&str> = KNOWN_ZONES
        .iter()
        .chain(KNOWN_SEGMENTS)
        .chain(KNOWN_CATEGORIES)
        .copied()
        .collect();

    let mut filter: Vec<String> = dictionary::mentioned(text, &known)
        .into_iter()
        .map(normalize_for_match)
        .collect();
    for term in catalog_terms {
        let term = normalize_for_match(term);
        if !term.is_empty() && !filter.contains(&term) {
            filter.push(term);
        }
    }
    filter
}
