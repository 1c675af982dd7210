//! Follow-up suggestion chips for the marketing-site chatbot

use assistant_types::{Intent, QueryType};

use super::search_context::{question_key, ConversationSearchContext, SearchDepth};
use crate::handlers::{handler_tab, HandlerTab};

pub const MIN_SUGGESTIONS: usize = 2;
pub const MAX_SUGGESTIONS: usize = 4;

const GENERAL: &[&str] = &[
    "NeuralTwin은 어떤 서비스인가요?",
    "어떤 데이터를 연동할 수 있나요?",
    "도입 사례가 궁금해요",
    "요금제는 어떻게 되나요?",
    "무료 체험이 가능한가요?",
    "디지털 트윈은 무엇인가요?",
];

const GO_DEEPER: &[&str] = &["더 자세히 알려줘", "예시를 보여줘"];

fn for_tab(tab: HandlerTab) -> &'static [&'static str] {
    match tab {
        HandlerTab::Overview => &["매출과 방문객을 한눈에 볼 수 있나요?", "목표 관리 기능이 있나요?"],
        HandlerTab::Store => &["시간대별 방문 패턴을 볼 수 있나요?", "존별 체류 시간은 어떻게 측정하나요?"],
        HandlerTab::Customer => &["고객 세그먼트는 어떻게 나누나요?", "재방문율도 분석하나요?"],
        HandlerTab::Product => &["상품별 판매 순위를 볼 수 있나요?", "카테고리 분석은 어떻게 하나요?"],
        HandlerTab::Inventory => &["재고 부족 알림을 받을 수 있나요?", "발주 추천은 어떻게 동작하나요?"],
        HandlerTab::Prediction => &["매출 예측은 얼마나 정확한가요?", "수요 예측도 되나요?"],
        HandlerTab::AiRecommendation => &["AI 추천은 어떤 근거로 만들어지나요?", "추천 전략을 바로 적용할 수 있나요?"],
        HandlerTab::Roi => &["ROI는 어떻게 측정하나요?", "전략별 성과를 비교할 수 있나요?"],
        HandlerTab::Settings | HandlerTab::DataControl => {
            &["어떤 데이터를 연동할 수 있나요?", "데이터 품질은 어떻게 관리하나요?"]
        }
        HandlerTab::Studio => &["시뮬레이션은 어떻게 실행하나요?", "레이아웃 최적화가 가능한가요?"],
    }
}

fn for_topic(topic: &str) -> &'static [&'static str] {
    match topic {
        "매장" => for_tab(HandlerTab::Store),
        "고객" => for_tab(HandlerTab::Customer),
        "상품" => for_tab(HandlerTab::Product),
        "재고" => for_tab(HandlerTab::Inventory),
        "예측" => for_tab(HandlerTab::Prediction),
        "AI 추천" => for_tab(HandlerTab::AiRecommendation),
        "시뮬레이션" | "최적화" | "디지털 트윈" => for_tab(HandlerTab::Studio),
        _ => &[],
    }
}

fn for_intent(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::RunSimulation | Intent::RunOptimization => for_tab(HandlerTab::Studio),
        i if i.is_studio_control() => for_tab(HandlerTab::Studio),
        _ => &[],
    }
}

/// Builds follow-up chips from the last answer and the conversation so far
#[derive(Debug, Clone, Copy, Default)]
pub struct SuggestionGenerator;

impl SuggestionGenerator {
    /// 2 to 4 chips, de-duplicated, never repeating an asked question.
    ///
    /// Candidates come from the last query type, then the intent, then the
    /// last topic, then a go-deeper prompt while depth allows, then general
    /// questions.
    pub fn generate(
        &self,
        ctx: &ConversationSearchContext,
        intent: Option<Intent>,
        query_type: Option<QueryType>,
    ) -> Vec<String> {
        let mut pool: Vec<&str> = Vec::new();
        if let Some(query_type) = query_type {
            pool.extend(for_tab(handler_tab(query_type)));
        }
        if let Some(intent) = intent {
            pool.extend(for_intent(intent));
        }
        if let Some(topic) = ctx.last_topic() {
            pool.extend(for_topic(topic));
        }
        if ctx.depth() < SearchDepth::Deep {
            pool.extend(GO_DEEPER.iter().take(1));
        }

        let mut chips = Self::pick(ctx, pool, MAX_SUGGESTIONS);
        if chips.len() < MIN_SUGGESTIONS {
            let seen: Vec<String> = chips.iter().map(|c| question_key(c)).collect();
            let extra = GENERAL
                .iter()
                .copied()
                .filter(|q| !seen.contains(&question_key(q)));
            chips.extend(Self::pick(ctx, extra, MAX_SUGGESTIONS - chips.len()));
        }
        chips
    }

    fn pick<'a>(
        ctx: &ConversationSearchContext,
        candidates: impl IntoIterator<Item = &'a str>,
        limit: usize,
    ) -> Vec<String> {
        let mut seen = Vec::new();
        let mut chips = Vec::new();
        for candidate in candidates {
            if chips.len() >= limit {
                break;
            }
            let key = question_key(candidate);
            if seen.contains(&key) || ctx.has_asked(candidate) {
                continue;
            }
            seen.push(key);
            chips.push(candidate.to_string());
        }
        chips
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_type_chips_first() {
        let ctx = ConversationSearchContext::new();
        let chips = SuggestionGenerator.generate(&ctx, Some(Intent::QueryKpi), Some(QueryType::LowStock));
        assert_eq!(chips[0], "재고 부족 알림을 받을 수 있나요?");
        assert!((MIN_SUGGESTIONS..=MAX_SUGGESTIONS).contains(&chips.len()));
    }

    #[test]
    fn test_never_repeats_asked_question() {
        let mut ctx = ConversationSearchContext::new();
        ctx.observe("고객 세그먼트는 어떻게 나누나요?");
        let chips = SuggestionGenerator.generate(&ctx, None, None);
        assert!(!chips.iter().any(|c| c == "고객 세그먼트는 어떻게 나누나요?"));
        assert!(chips.iter().any(|c| c == "재방문율도 분석하나요?"));
    }

    #[test]
    fn test_asked_question_suppressed_despite_punctuation() {
        let mut ctx = ConversationSearchContext::new();
        ctx.observe("재고 부족 알림을 받을 수 있나요");
        ctx.observe("발주 추천은 어떻게 동작하나요??");
        let chips = SuggestionGenerator.generate(&ctx, Some(Intent::QueryKpi), Some(QueryType::LowStock));
        assert!(!chips.iter().any(|c| c.starts_with("재고 부족 알림")));
        assert!(!chips.iter().any(|c| c.starts_with("발주 추천")));
        assert!(chips.len() >= MIN_SUGGESTIONS);
    }

    #[test]
    fn test_general_fill_when_nothing_known() {
        let ctx = ConversationSearchContext::new();
        let chips = SuggestionGenerator.generate(&ctx, None, None);
        assert!(chips.len() >= MIN_SUGGESTIONS);
        let unique: std::collections::HashSet<_> = chips.iter().collect();
        assert_eq!(unique.len(), chips.len());
    }
}
