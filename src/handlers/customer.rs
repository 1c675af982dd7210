//! Customer tab: segments, new vs returning, loyalty

use assistant_types::{QueryActionResult, QueryType, ResponseHint};
use serde_json::json;

use super::common::{
    change_phrase, filter_rows, format_number, format_percent, format_won, percent_change,
    respond, share,
};
use super::QueryContext;
use crate::data::{float, int, text, CustomerSegmentRow};
use crate::error::Result;

const CUSTOMER_SUGGESTIONS: &[&str] = &["신규 고객 비율은?", "VIP 고객 객단가 알려줘", "재방문율 추이는?"];

pub async fn handle(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    match ctx.query_type {
        QueryType::NewVsReturning | QueryType::ReturnRate | QueryType::VisitFrequency => {
            visitor_mix(ctx).await
        }
        QueryType::CustomerTrend => trend(ctx).await,
        _ => segments(ctx).await,
    }
}

// ============================================================================
// SEGMENTS
// ============================================================================

async fn segments(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    let rows = ctx
        .source
        .customer_segments(&ctx.scope, &ctx.date_range)
        .await?;
    if rows.is_empty() {
        return Ok(respond(
            ctx,
            format!("{} 고객 세그먼트 데이터가 아직 없어요.", ctx.period()),
            CUSTOMER_SUGGESTIONS,
            None,
        ));
    }

    let total: i64 = rows.iter().map(|r| int(r.customer_count)).sum();
    let filtered = filter_rows(&rows, ctx.item_filter, |r| text(&r.segment_name));
    let mut shown = filtered.rows.clone();

    let mut lines = Vec::new();
    if let Some(note) = filtered.fallback_note(ctx.item_filter) {
        lines.push(note);
    }

    let distribution = ctx.hint(ResponseHint::Distribution);
    let heading = match ctx.query_type {
        QueryType::SegmentAvgBasket => {
            shown.sort_by(|a, b| {
                float(b.avg_transaction_value).total_cmp(&float(a.avg_transaction_value))
            });
            "세그먼트별 객단가"
        }
        QueryType::LoyalCustomers => {
            shown.sort_by(|a, b| float(b.visit_frequency).total_cmp(&float(a.visit_frequency)));
            shown.truncate(3);
            "방문 빈도가 높은 충성 고객층"
        }
        _ => {
            shown.sort_by_key(|r| std::cmp::Reverse(int(r.customer_count)));
            if distribution {
                "고객 세그먼트 분포"
            } else {
                "고객 세그먼트 현황"
            }
        }
    };
    lines.push(format!("{} {heading}입니다.", ctx.period()));

    let line = |r: &CustomerSegmentRow| -> String {
        let name = text(&r.segment_name);
        match ctx.query_type {
            QueryType::SegmentAvgBasket => {
                format!("• {name}: {}", format_won(float(r.avg_transaction_value)))
            }
            QueryType::LoyalCustomers => format!(
                "• {name}: {}명, 평균 {:.1}회 방문",
                format_number(int(r.customer_count)),
                float(r.visit_frequency)
            ),
            _ if distribution => format!(
                "• {name}: {}",
                format_percent(share(int(r.customer_count) as f64, total as f64))
            ),
            _ => format!("• {name}: {}명", format_number(int(r.customer_count))),
        }
    };
    lines.extend(shown.iter().map(|r| line(r)));

    let data = json!({
        "totalCustomers": total,
        "segments": shown
            .iter()
            .map(|r| json!({
                "segment": text(&r.segment_name),
                "customers": int(r.customer_count),
                "share": share(int(r.customer_count) as f64, total as f64),
                "avgTransactionValue": float(r.avg_transaction_value),
                "visitFrequency": float(r.visit_frequency),
            }))
            .collect::<Vec<_>>(),
        "filterFallback": filtered.fell_back,
    });
    Ok(respond(ctx, lines.join("\n"), CUSTOMER_SUGGESTIONS, Some(data)))
}

// ============================================================================
// VISITOR MIX
// ============================================================================

async fn visitor_mix(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    let mix = ctx.source.visitor_mix(&ctx.scope, &ctx.date_range).await?;
    let new = int(mix.new_visitors);
    let returning = int(mix.returning_visitors);
    let total = (new + returning) as f64;
    let return_rate = share(returning as f64, total);

    let message = match ctx.query_type {
        QueryType::ReturnRate => format!(
            "{} 재방문 고객 비율은 {}입니다 (재방문 {}명 / 전체 {}명).",
            ctx.period(),
            format_percent(return_rate),
            format_number(returning),
            format_number(new + returning)
        ),
        QueryType::VisitFrequency => format!(
            "{} 고객 1인당 평균 방문 횟수는 {:.1}회입니다.",
            ctx.period(),
            float(mix.avg_visit_frequency)
        ),
        _ => format!(
            "{} 신규 고객 {}명({}), 재방문 고객 {}명({})입니다.",
            ctx.period(),
            format_number(new),
            format_percent(share(new as f64, total)),
            format_number(returning),
            format_percent(return_rate)
        ),
    };
    let data = json!({
        "newVisitors": new,
        "returningVisitors": returning,
        "returnRate": return_rate,
        "avgVisitFrequency": float(mix.avg_visit_frequency),
    });
    Ok(respond(ctx, message, CUSTOMER_SUGGESTIONS, Some(data)))
}

// ============================================================================
// TREND
// ============================================================================

async fn trend(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    let current = ctx.source.visitor_mix(&ctx.scope, &ctx.date_range).await?;
    let previous = match ctx.comparison_range() {
        Some(range) => Some(ctx.source.visitor_mix(&ctx.scope, &range).await?),
        None => None,
    };

    let total = |m: &crate::data::VisitorMix| int(m.new_visitors) + int(m.returning_visitors);
    let now = total(&current);
    let change = percent_change(now as f64, previous.as_ref().map(|p| total(p) as f64));

    let message = format!(
        "{} 방문 고객은 {}명입니다{}. 이 중 재방문 고객은 {}명이에요.",
        ctx.period(),
        format_number(now),
        change_phrase(change),
        format_number(int(current.returning_visitors))
    );
    let data = json!({ "customers": now, "change": change });
    Ok(respond(ctx, message, CUSTOMER_SUGGESTIONS, Some(data)))
}
