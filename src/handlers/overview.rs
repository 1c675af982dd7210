//! Overview tab: headline KPIs, funnel, goals and the daily trend

use assistant_types::{QueryActionResult, QueryType, UiAction};
use serde_json::json;

use super::common::{
    change_phrase, format_number, format_percent, format_won, percent_change, respond, share,
};
use super::QueryContext;
use crate::classifier::GOAL_SETTINGS_MODAL;
use crate::data::{float, int, text, KpiComparison, OverviewKpis};
use crate::error::Result;

const KPI_SUGGESTIONS: &[&str] = &["전환율은 어때?", "시간대별 방문 패턴 보여줘", "지난주랑 비교해줘"];

pub async fn handle(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    match ctx.query_type {
        QueryType::Funnel => funnel(ctx).await,
        QueryType::Goal => goal(ctx).await,
        QueryType::DailyTrend => daily_trend(ctx).await,
        QueryType::Summary => summary(ctx).await,
        _ => kpi(ctx).await,
    }
}

// ============================================================================
// SINGLE KPI
// ============================================================================

/// One headline metric: label, current value, value in the comparison window
struct Metric {
    label: &'static str,
    current: f64,
    previous: Option<f64>,
}

impl Metric {
    fn formatted(&self, query_type: QueryType) -> String {
        match query_type {
            QueryType::Visitors | QueryType::UniqueVisitors => {
                format!("{}명", format_number(self.current as i64))
            }
            QueryType::Transactions => format!("{}건", format_number(self.current as i64)),
            QueryType::Conversion | QueryType::RevisitRate => format_percent(self.current),
            _ => format_won(self.current),
        }
    }
}

fn metric(query_type: QueryType, kpis: &KpiComparison) -> Metric {
    let cur = &kpis.current;
    let prev = kpis.previous.as_ref();
    let pick = |f: fn(&OverviewKpis) -> f64| (f(cur), prev.map(f));

    let (label, (current, previous)) = match query_type {
        QueryType::Visitors => ("방문객", pick(|k| int(k.total_visitors) as f64)),
        QueryType::UniqueVisitors => ("순 방문객", pick(|k| int(k.unique_visitors) as f64)),
        QueryType::Transactions => ("거래 건수", pick(|k| int(k.total_transactions) as f64)),
        QueryType::Conversion => ("전환율", pick(|k| float(k.conversion_rate))),
        QueryType::RevisitRate => ("재방문율", pick(|k| float(k.revisit_rate))),
        QueryType::AvgBasket => ("객단가", pick(|k| float(k.avg_transaction_value))),
        QueryType::SalesPerArea => ("평당 매출", pick(|k| float(k.sales_per_sqm))),
        _ => ("매출", pick(|k| float(k.total_revenue))),
    };
    Metric {
        label,
        current,
        previous,
    }
}

async fn kpi(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    let kpis = ctx
        .source
        .overview_kpis_with_comparison(&ctx.scope, &ctx.date_range)
        .await?;
    let m = metric(ctx.query_type, &kpis);
    let change = percent_change(m.current, m.previous);

    let message = format!(
        "{} {}은(는) {}입니다{}.",
        ctx.period(),
        m.label,
        m.formatted(ctx.query_type),
        change_phrase(change)
    );
    let data = json!({
        "metric": ctx.query_type.as_str(),
        "value": m.current,
        "previous": m.previous,
        "change": change,
    });
    Ok(respond(ctx, message, KPI_SUGGESTIONS, Some(data)))
}

async fn summary(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    let kpis = ctx
        .source
        .overview_kpis_with_comparison(&ctx.scope, &ctx.date_range)
        .await?;
    let cur = &kpis.current;
    let prev = kpis.previous.as_ref();
    let revenue_change = percent_change(
        float(cur.total_revenue),
        prev.map(|p| float(p.total_revenue)),
    );
    let visitor_change = percent_change(
        int(cur.total_visitors) as f64,
        prev.map(|p| int(p.total_visitors) as f64),
    );

    let lines = [
        format!("{} 매장 현황입니다.", ctx.period()),
        format!(
            "• 매출: {}{}",
            format_won(float(cur.total_revenue)),
            change_phrase(revenue_change)
        ),
        format!(
            "• 방문객: {}명{}",
            format_number(int(cur.total_visitors)),
            change_phrase(visitor_change)
        ),
        format!("• 전환율: {}", format_percent(float(cur.conversion_rate))),
        format!("• 객단가: {}", format_won(float(cur.avg_transaction_value))),
    ];
    let data = json!({
        "totalRevenue": float(cur.total_revenue),
        "totalVisitors": int(cur.total_visitors),
        "conversionRate": float(cur.conversion_rate),
        "avgTransactionValue": float(cur.avg_transaction_value),
        "revenueChange": revenue_change,
        "visitorChange": visitor_change,
    });
    Ok(respond(
        ctx,
        lines.join("\n"),
        &["매출 추이 보여줘", "목표 달성률은?", "인기 상품 알려줘"],
        Some(data),
    ))
}

// ============================================================================
// FUNNEL
// ============================================================================

async fn funnel(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    let kpis = ctx.source.overview_kpis(&ctx.scope, &ctx.date_range).await?;
    let stages = [
        ("입장", int(kpis.funnel_entry)),
        ("탐색", int(kpis.funnel_browse)),
        ("관심", int(kpis.funnel_engage)),
        ("피팅", int(kpis.funnel_fitting)),
        ("구매", int(kpis.funnel_purchase)),
    ];
    let entry = stages[0].1 as f64;

    let mut lines = vec![format!("{} 구매 퍼널입니다.", ctx.period())];
    for (label, value) in &stages {
        lines.push(format!(
            "• {}: {}명 ({})",
            label,
            format_number(*value),
            format_percent(share(*value as f64, entry))
        ));
    }
    let data = json!({
        "stages": stages
            .iter()
            .map(|(label, value)| json!({"stage": label, "count": value}))
            .collect::<Vec<_>>(),
    });
    Ok(respond(
        ctx,
        lines.join("\n"),
        &["피팅룸 전환율은?", "존별 방문 현황 보여줘"],
        Some(data),
    ))
}

// ============================================================================
// GOALS
// ============================================================================

/// Progress toward one goal, capped at 100
pub fn goal_progress(current: f64, target: f64) -> Option<i64> {
    (target > 0.0).then(|| ((current / target * 100.0).round() as i64).min(100))
}

/// Encouragement for an overall achievement rate
pub fn goal_encouragement(rate: i64) -> &'static str {
    match rate {
        r if r >= 100 => "목표를 달성했어요! 훌륭한 성과입니다.",
        r if r >= 80 => "목표 달성이 얼마 남지 않았어요. 조금만 더 힘내세요!",
        r if r >= 50 => "절반 이상 달성했어요. 꾸준히 진행 중입니다.",
        _ => "아직 목표까지 거리가 있어요. 개선 포인트를 함께 찾아볼까요?",
    }
}

fn goal_label(goal_type: &str) -> Option<&'static str> {
    match goal_type {
        "revenue" => Some("매출"),
        "visitors" => Some("방문객"),
        "conversion" => Some("전환율"),
        "avg_basket" => Some("객단가"),
        _ => None,
    }
}

async fn goal(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    let goals = ctx.source.store_goals(&ctx.scope, &ctx.date_range).await?;
    if goals.is_empty() {
        let result = respond(
            ctx,
            "아직 설정된 목표가 없어요. 목표 설정 화면을 열어드릴게요.",
            &["매출 목표 설정하기", "이번달 매출 알려줘"],
            Some(json!({ "hasGoal": false })),
        );
        let mut actions = result.actions;
        actions.push(UiAction::open_modal(GOAL_SETTINGS_MODAL));
        return Ok(QueryActionResult { actions, ..result });
    }

    let kpis = ctx.source.overview_kpis(&ctx.scope, &ctx.date_range).await?;
    let mut lines = vec![format!("{} 목표 달성 현황입니다.", ctx.period())];
    let mut progress = Vec::new();
    for goal in &goals {
        let goal_type = text(&goal.goal_type);
        let Some(label) = goal_label(goal_type) else {
            continue;
        };
        let current = match goal_type {
            "revenue" => float(kpis.total_revenue),
            "visitors" => int(kpis.total_visitors) as f64,
            "conversion" => float(kpis.conversion_rate),
            _ => float(kpis.avg_transaction_value),
        };
        let target = float(goal.target_value);
        if let Some(rate) = goal_progress(current, target) {
            lines.push(format!("• {label}: {rate}%"));
            progress.push(json!({
                "goalType": goal_type,
                "current": current,
                "target": target,
                "progress": rate,
            }));
        }
    }

    let rates: Vec<i64> = progress
        .iter()
        .filter_map(|p| p["progress"].as_i64())
        .collect();
    if rates.is_empty() {
        // every goal has an unknown type or no positive target
        return Ok(respond(
            ctx,
            format!(
                "{} 목표가 설정되어 있지만 달성률을 계산할 수 있는 목표가 없어요. \
                 매출, 방문객, 전환율, 객단가 목표를 설정해 보세요.",
                ctx.period()
            ),
            &["목표 수정하기", "매출 추이 보여줘"],
            Some(json!({ "hasGoal": true, "overall": null, "goals": [] })),
        ));
    }
    let overall = (rates.iter().sum::<i64>() as f64 / rates.len() as f64).round() as i64;
    lines.push(format!("전체 달성률은 {overall}%입니다. {}", goal_encouragement(overall)));

    let data = json!({ "hasGoal": true, "overall": overall, "goals": progress });
    Ok(respond(
        ctx,
        lines.join("\n"),
        &["목표 수정하기", "매출 추이 보여줘"],
        Some(data),
    ))
}

// ============================================================================
// DAILY TREND
// ============================================================================

async fn daily_trend(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    let days = ctx.source.daily_kpis(&ctx.scope, &ctx.date_range).await?;
    if days.is_empty() {
        return Ok(respond(
            ctx,
            format!("{} 일별 데이터가 아직 없어요.", ctx.period()),
            KPI_SUGGESTIONS,
            None,
        ));
    }

    let total: f64 = days.iter().map(|d| float(d.total_revenue)).sum();
    let best = days
        .iter()
        .max_by(|a, b| float(a.total_revenue).total_cmp(&float(b.total_revenue)));
    let worst = days
        .iter()
        .min_by(|a, b| float(a.total_revenue).total_cmp(&float(b.total_revenue)));

    let mut lines = vec![format!(
        "{} 일평균 매출은 {}입니다.",
        ctx.period(),
        format_won(total / days.len() as f64)
    )];
    if let (Some(best), Some(worst)) = (best, worst) {
        if let (Some(best_day), Some(worst_day)) = (best.date, worst.date) {
            lines.push(format!(
                "• 최고: {} ({})",
                best_day.format("%m/%d"),
                format_won(float(best.total_revenue))
            ));
            lines.push(format!(
                "• 최저: {} ({})",
                worst_day.format("%m/%d"),
                format_won(float(worst.total_revenue))
            ));
        }
    }
    let data = json!({
        "days": days.len(),
        "totalRevenue": total,
        "series": days
            .iter()
            .map(|d| json!({"date": d.date, "revenue": float(d.total_revenue)}))
            .collect::<Vec<_>>(),
    });
    Ok(respond(ctx, lines.join("\n"), KPI_SUGGESTIONS, Some(data)))
}
