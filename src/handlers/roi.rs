//! ROI page: applied strategies and their returns

use assistant_types::{QueryActionResult, QueryType};
use serde_json::json;

use super::common::{filter_rows, format_percent, respond};
use super::QueryContext;
use crate::data::{float, text, AppliedStrategy};
use crate::error::Result;

const ROI_SUGGESTIONS: &[&str] = &["전략별 ROI 비교해줘", "적용 중인 전략 보여줘", "ROI 추이는?"];

fn roi(s: &AppliedStrategy) -> f64 {
    s.actual_roi.or(s.expected_roi).filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn is_active(s: &AppliedStrategy) -> bool {
    matches!(text(&s.status), "active" | "running" | "applied")
}

fn average_roi(rows: &[&AppliedStrategy]) -> f64 {
    if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|s| roi(s)).sum::<f64>() / rows.len() as f64
    }
}

pub async fn handle(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    let strategies = ctx
        .source
        .applied_strategies(&ctx.scope, &ctx.date_range)
        .await?;
    if strategies.is_empty() {
        return Ok(respond(
            ctx,
            format!("{} 적용된 전략이 없어요. AI 추천에서 전략을 적용해 보세요.", ctx.period()),
            &["AI 추천 보여줘", "레이아웃 추천해줘"],
            None,
        ));
    }

    let filtered = filter_rows(&strategies, ctx.item_filter, |s| text(&s.strategy_name));
    let rows = filtered.rows.clone();
    let mut lines = Vec::new();
    if let Some(note) = filtered.fallback_note(ctx.item_filter) {
        lines.push(note);
    }

    match ctx.query_type {
        QueryType::RoiByStrategy | QueryType::StrategyDetail => {
            let mut ranked = rows.clone();
            ranked.sort_by(|a, b| roi(b).total_cmp(&roi(a)));
            lines.push(format!("{} 전략별 ROI입니다.", ctx.period()));
            for s in &ranked {
                let mut line = format!("• {}: {}", text(&s.strategy_name), format_percent(roi(s)));
                if ctx.query_type == QueryType::StrategyDetail {
                    if let Some(expected) = s.expected_roi {
                        line.push_str(&format!(" (예상 {})", format_percent(expected)));
                    }
                    if let Some(date) = s.applied_at {
                        line.push_str(&format!(", {} 적용", date.format("%m/%d")));
                    }
                }
                lines.push(line);
            }
        }
        QueryType::AppliedStrategies => {
            let active: Vec<&&AppliedStrategy> = rows.iter().filter(|s| is_active(s)).collect();
            lines.push(format!(
                "{} 적용된 전략은 {}개이고, 그중 {}개가 진행 중이에요.",
                ctx.period(),
                rows.len(),
                active.len()
            ));
            lines.extend(
                rows.iter()
                    .map(|s| format!("• {} ({})", text(&s.strategy_name), text(&s.status))),
            );
        }
        QueryType::RoiTrend => {
            let mut dated: Vec<&AppliedStrategy> =
                rows.iter().copied().filter(|s| s.applied_at.is_some()).collect();
            dated.sort_by_key(|s| s.applied_at);
            lines.push(format!("{} 적용 순서별 ROI 추이입니다.", ctx.period()));
            for s in &dated {
                if let Some(date) = s.applied_at {
                    lines.push(format!(
                        "• {} {}: {}",
                        date.format("%m/%d"),
                        text(&s.strategy_name),
                        format_percent(roi(s))
                    ));
                }
            }
        }
        _ => {
            let best = rows.iter().max_by(|a, b| roi(a).total_cmp(&roi(b)));
            lines.push(format!(
                "{} 적용된 전략 {}개의 평균 ROI는 {}입니다.",
                ctx.period(),
                rows.len(),
                format_percent(average_roi(&rows))
            ));
            if let Some(best) = best {
                lines.push(format!(
                    "가장 성과가 좋은 전략은 '{}'({})예요.",
                    text(&best.strategy_name),
                    format_percent(roi(best))
                ));
            }
        }
    }

    let data = json!({
        "averageRoi": average_roi(&rows),
        "strategies": rows
            .iter()
            .map(|s| json!({
                "name": text(&s.strategy_name),
                "type": text(&s.strategy_type),
                "status": text(&s.status),
                "roi": roi(s),
                "appliedAt": s.applied_at,
            }))
            .collect::<Vec<_>>(),
    });
    Ok(respond(ctx, lines.join("\n"), ROI_SUGGESTIONS, Some(data)))
}
