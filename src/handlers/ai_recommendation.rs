//! AI recommendation tab

use assistant_types::{QueryActionResult, QueryType};

use super::common::navigation_only;
use super::QueryContext;

const RECOMMENDATION_SUGGESTIONS: &[&str] = &["레이아웃 추천해줘", "인력 배치 추천은?", "프로모션 추천해줘"];

pub fn handle(ctx: &QueryContext<'_>) -> QueryActionResult {
    let subject = match ctx.query_type {
        QueryType::LayoutRecommendation => "레이아웃 추천",
        QueryType::StaffingRecommendation => "인력 배치 추천",
        QueryType::PromotionRecommendation => "프로모션 추천",
        QueryType::InventoryRecommendation => "재고 추천",
        QueryType::PriceOptimization => "가격 최적화",
        _ => "AI 추천",
    };
    navigation_only(ctx, subject, RECOMMENDATION_SUGGESTIONS)
}
