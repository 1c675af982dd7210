//! Disambiguation gate
//!
//! A low-confidence category/product reading with a named item is answered
//! with a clarifying question instead of data. The message names both
//! readings using only the classified item terms and carries no actions.

use assistant_types::{ClassificationResult, Intent, QueryActionResult, QueryType};

/// Readings at or below this confidence are asked about
pub const DISAMBIGUATION_THRESHOLD: f32 = 0.6;

/// Query types whose item may be either a category or a product
const AMBIGUOUS_TYPES: &[QueryType] = &[QueryType::CategoryAnalysis, QueryType::Product];

const MAX_SUGGESTIONS: usize = 3;

/// Whether the classification should be clarified before answering
pub fn needs_disambiguation(result: &ClassificationResult) -> bool {
    result.intent == Intent::QueryKpi
        && result
            .query_type()
            .is_some_and(|qt| AMBIGUOUS_TYPES.contains(&qt))
        && result.confidence <= DISAMBIGUATION_THRESHOLD
        && !result.entities.item_filter.is_empty()
}

/// Clarifying response, or `None` when the gate does not fire
pub fn disambiguate(result: &ClassificationResult) -> Option<QueryActionResult> {
    if !needs_disambiguation(result) {
        return None;
    }
    let items = &result.entities.item_filter;
    let subject = items.join(", ");

    let mut lines = Vec::new();
    lines.push(format!("'{}'을(를) 어떤 기준으로 볼까요?", subject));
    lines.push(format!("• 카테고리: {} 카테고리 전체 실적", subject));
    lines.push(format!("• 상품: {} 상품 개별 판매 실적", subject));

    let first = &items[0];
    let mut suggestions = vec![
        format!("{} 카테고리 분석해줘", first),
        format!("{} 상품 판매 실적 알려줘", first),
    ];
    if let Some(second) = items.get(1) {
        suggestions.push(format!("{} 카테고리 분석해줘", second));
    } else {
        suggestions.push("카테고리별 매출 보여줘".to_string());
    }
    suggestions.truncate(MAX_SUGGESTIONS);

    tracing::debug!(items = %subject, "Asking category vs product");
    Some(QueryActionResult::new(Vec::new(), lines.join("\n")).with_suggestions(suggestions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_types::Entities;

    fn classified(query_type: QueryType, confidence: f32, items: &[&str]) -> ClassificationResult {
        let entities = Entities {
            query_type: Some(query_type),
            item_filter: items.iter().map(|s| s.to_string()).collect(),
            ..Entities::default()
        };
        ClassificationResult::new(Intent::QueryKpi, entities, confidence)
    }

    #[test]
    fn test_gate_fires_on_low_confidence_item() {
        let result = classified(QueryType::CategoryAnalysis, 0.55, &["데님"]);
        let response = disambiguate(&result).unwrap();

        assert!(response.actions.is_empty());
        let lines: Vec<_> = response.message.lines().collect();
        assert!(lines.iter().any(|l| l.starts_with("• 카테고리") && l.contains("데님")));
        assert!(lines.iter().any(|l| l.starts_with("• 상품") && l.contains("데님")));
        assert!((2..=3).contains(&response.suggestions.len()));
    }

    #[test]
    fn test_gate_boundary_is_inclusive() {
        assert!(needs_disambiguation(&classified(QueryType::Product, 0.6, &["코듀로이"])));
        assert!(!needs_disambiguation(&classified(QueryType::Product, 0.61, &["코듀로이"])));
    }

    #[test]
    fn test_gate_ignores_other_shapes() {
        assert!(!needs_disambiguation(&classified(QueryType::Product, 0.5, &[])));
        assert!(!needs_disambiguation(&classified(QueryType::Revenue, 0.5, &["데님"])));

        let mut chat = classified(QueryType::Product, 0.3, &["데님"]);
        chat.intent = Intent::GeneralChat;
        assert!(!needs_disambiguation(&chat));
    }
}
