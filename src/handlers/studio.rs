//! Studio page questions
//!
//! Simulation and optimization output live in the 3D studio panels.

use assistant_types::{QueryActionResult, QueryType};

use super::common::navigation_only;
use super::QueryContext;

const STUDIO_SUGGESTIONS: &[&str] = &["시뮬레이션 실행해줘", "레이아웃 최적화 해줘", "히트맵 오버레이 켜줘"];

pub fn handle(ctx: &QueryContext<'_>) -> QueryActionResult {
    let subject = match ctx.query_type {
        QueryType::SimulationResult => "시뮬레이션 결과",
        QueryType::OptimizationResult => "최적화 결과",
        QueryType::OverlayView => "오버레이",
        _ => "매장 레이아웃",
    };
    navigation_only(ctx, subject, STUDIO_SUGGESTIONS)
}
