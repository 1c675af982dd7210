//! Store tab: hourly traffic, zones and weekday patterns

use assistant_types::{QueryActionResult, QueryType, ResponseHint};
use chrono::{Datelike, Weekday};
use serde_json::json;

use super::common::{filter_rows, format_number, format_percent, format_seconds, respond, share};
use super::QueryContext;
use crate::data::{float, int, text, HourlyVisit, ZoneMetric};
use crate::error::Result;

const STORE_SUGGESTIONS: &[&str] = &["피크 시간대는 언제야?", "존별 체류시간 알려줘", "요일별 방문 패턴은?"];

pub async fn handle(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    match ctx.query_type {
        QueryType::HourlyPattern | QueryType::PeakTime => hourly(ctx).await,
        QueryType::ZoneAnalysis
        | QueryType::DwellTime
        | QueryType::ZoneConversion
        | QueryType::Heatmap => zones(ctx).await,
        QueryType::WeekdayPattern => weekday(ctx).await,
        _ => summary(ctx).await,
    }
}

fn hour_of(row: &HourlyVisit) -> i32 {
    row.hour.unwrap_or(-1)
}

fn busiest(rows: &[HourlyVisit]) -> Option<&HourlyVisit> {
    rows.iter().max_by_key(|r| int(r.visitor_count))
}

// ============================================================================
// HOURLY
// ============================================================================

async fn hourly(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    let rows = ctx.source.hourly_visits(&ctx.scope, &ctx.date_range).await?;
    let total: i64 = rows.iter().map(|r| int(r.visitor_count)).sum();
    let period = ctx.period();

    if let (Some(hour), QueryType::HourlyPattern) = (ctx.hour, ctx.query_type) {
        let count = rows
            .iter()
            .filter(|r| hour_of(r) == hour as i32)
            .map(|r| int(r.visitor_count))
            .sum::<i64>();
        let message = format!(
            "{period} {hour}시에는 {}명이 방문했어요 (전체의 {}).",
            format_number(count),
            format_percent(share(count as f64, total as f64))
        );
        let data = json!({ "hour": hour, "visitors": count, "totalVisitors": total });
        return Ok(respond(ctx, message, STORE_SUGGESTIONS, Some(data)));
    }

    let Some(peak) = busiest(&rows) else {
        return Ok(respond(
            ctx,
            format!("{period} 시간대별 방문 데이터가 아직 없어요."),
            STORE_SUGGESTIONS,
            None,
        ));
    };

    let mut ranked: Vec<&HourlyVisit> = rows.iter().collect();
    ranked.sort_by_key(|r| std::cmp::Reverse(int(r.visitor_count)));
    let top: Vec<String> = ranked
        .iter()
        .take(3)
        .map(|r| format!("{}시({}명)", hour_of(r), format_number(int(r.visitor_count))))
        .collect();

    let message = format!(
        "{period} 가장 붐빈 시간은 {}시로 {}명이 방문했어요. 상위 시간대: {}",
        hour_of(peak),
        format_number(int(peak.visitor_count)),
        top.join(", ")
    );
    let data = json!({
        "peakHour": hour_of(peak),
        "totalVisitors": total,
        "hours": rows
            .iter()
            .map(|r| json!({"hour": hour_of(r), "visitors": int(r.visitor_count)}))
            .collect::<Vec<_>>(),
    });
    Ok(respond(ctx, message, STORE_SUGGESTIONS, Some(data)))
}

// ============================================================================
// ZONES
// ============================================================================

async fn zones(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    let rows = ctx.source.zone_metrics(&ctx.scope, &ctx.date_range).await?;
    let period = ctx.period();
    if rows.is_empty() {
        return Ok(respond(
            ctx,
            format!("{period} 존 데이터가 아직 없어요."),
            STORE_SUGGESTIONS,
            None,
        ));
    }

    let filtered = filter_rows(&rows, ctx.item_filter, |z| text(&z.zone_name));
    let total_visitors: i64 = rows.iter().map(|z| int(z.visitors)).sum();

    let mut lines = Vec::new();
    if let Some(note) = filtered.fallback_note(ctx.item_filter) {
        lines.push(note);
    }

    let line = |z: &ZoneMetric| -> String {
        let name = text(&z.zone_name);
        match ctx.query_type {
            QueryType::DwellTime => {
                format!("• {name}: 평균 {}", format_seconds(float(z.avg_dwell_seconds)))
            }
            QueryType::ZoneConversion => {
                format!("• {name}: 전환율 {}", format_percent(float(z.conversion_rate)))
            }
            _ if ctx.hint(ResponseHint::Distribution) => format!(
                "• {name}: {}",
                format_percent(share(int(z.visitors) as f64, total_visitors as f64))
            ),
            _ => format!("• {name}: {}명", format_number(int(z.visitors))),
        }
    };

    let heading = match ctx.query_type {
        QueryType::DwellTime => "존별 평균 체류시간",
        QueryType::ZoneConversion => "존별 전환율",
        QueryType::Heatmap => "방문이 많은 존",
        _ if ctx.hint(ResponseHint::Distribution) => "존별 방문 분포",
        _ => "존별 방문객",
    };
    lines.push(format!("{period} {heading}입니다."));

    let mut shown = filtered.rows.clone();
    match ctx.query_type {
        QueryType::DwellTime => {
            shown.sort_by(|a, b| float(b.avg_dwell_seconds).total_cmp(&float(a.avg_dwell_seconds)))
        }
        QueryType::ZoneConversion => {
            shown.sort_by(|a, b| float(b.conversion_rate).total_cmp(&float(a.conversion_rate)))
        }
        _ => shown.sort_by_key(|z| std::cmp::Reverse(int(z.visitors))),
    }
    if ctx.query_type == QueryType::Heatmap {
        shown.truncate(3);
    }
    lines.extend(shown.iter().map(|z| line(z)));

    let data = json!({
        "zones": shown
            .iter()
            .map(|z| json!({
                "zone": text(&z.zone_name),
                "visitors": int(z.visitors),
                "share": share(int(z.visitors) as f64, total_visitors as f64),
                "avgDwellSeconds": float(z.avg_dwell_seconds),
                "conversionRate": float(z.conversion_rate),
            }))
            .collect::<Vec<_>>(),
        "filterFallback": filtered.fell_back,
    });
    Ok(respond(ctx, lines.join("\n"), STORE_SUGGESTIONS, Some(data)))
}

// ============================================================================
// WEEKDAY
// ============================================================================

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "월",
        Weekday::Tue => "화",
        Weekday::Wed => "수",
        Weekday::Thu => "목",
        Weekday::Fri => "금",
        Weekday::Sat => "토",
        Weekday::Sun => "일",
    }
}

async fn weekday(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    let days = ctx.source.daily_kpis(&ctx.scope, &ctx.date_range).await?;

    // (visitors, days seen) per weekday, Monday first
    let mut buckets = [(0i64, 0i64); 7];
    for day in &days {
        if let Some(date) = day.date {
            let slot = &mut buckets[date.weekday().num_days_from_monday() as usize];
            slot.0 += int(day.total_visitors);
            slot.1 += 1;
        }
    }
    let averages: Vec<(Weekday, i64)> = buckets
        .iter()
        .enumerate()
        .filter(|(_, (_, n))| *n > 0)
        .map(|(i, (sum, n))| (WEEK[i], sum / n))
        .collect();

    let Some(best) = averages.iter().max_by_key(|(_, avg)| *avg) else {
        return Ok(respond(
            ctx,
            format!("{} 요일별 데이터가 아직 없어요.", ctx.period()),
            STORE_SUGGESTIONS,
            None,
        ));
    };

    let mut lines = vec![format!(
        "{} 기준 방문이 가장 많은 요일은 {}요일(평균 {}명)이에요.",
        ctx.period(),
        weekday_label(best.0),
        format_number(best.1)
    )];
    lines.extend(
        averages
            .iter()
            .map(|(day, avg)| format!("• {}: {}명", weekday_label(*day), format_number(*avg))),
    );
    let data = json!({
        "weekdays": averages
            .iter()
            .map(|(day, avg)| json!({"weekday": weekday_label(*day), "avgVisitors": avg}))
            .collect::<Vec<_>>(),
    });
    Ok(respond(ctx, lines.join("\n"), STORE_SUGGESTIONS, Some(data)))
}

// ============================================================================
// SUMMARY
// ============================================================================

async fn summary(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    let hours = ctx.source.hourly_visits(&ctx.scope, &ctx.date_range).await?;
    let zones = ctx.source.zone_metrics(&ctx.scope, &ctx.date_range).await?;

    let mut lines = vec![format!("{} 매장 운영 현황입니다.", ctx.period())];
    if let Some(peak) = busiest(&hours) {
        lines.push(format!(
            "• 피크 시간: {}시 ({}명)",
            hour_of(peak),
            format_number(int(peak.visitor_count))
        ));
    }
    if let Some(zone) = zones.iter().max_by_key(|z| int(z.visitors)) {
        lines.push(format!(
            "• 최다 방문 존: {} ({}명)",
            text(&zone.zone_name),
            format_number(int(zone.visitors))
        ));
    }
    if let Some(zone) = zones
        .iter()
        .max_by(|a, b| float(a.avg_dwell_seconds).total_cmp(&float(b.avg_dwell_seconds)))
    {
        lines.push(format!(
            "• 체류시간이 가장 긴 존: {} ({})",
            text(&zone.zone_name),
            format_seconds(float(zone.avg_dwell_seconds))
        ));
    }
    if lines.len() == 1 {
        lines.push("아직 집계된 매장 데이터가 없어요.".to_string());
    }
    Ok(respond(ctx, lines.join("\n"), STORE_SUGGESTIONS, None))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{context, day, MemorySource};
    use super::*;
    use crate::data::DailyKpi;
    use assistant_types::PageContext;

    fn zone(name: &str, visitors: i64) -> ZoneMetric {
        ZoneMetric {
            zone_name: Some(name.into()),
            visitors: Some(visitors),
            ..ZoneMetric::default()
        }
    }

    #[tokio::test]
    async fn test_specific_hour() {
        let source = MemorySource {
            hourly: vec![
                HourlyVisit { hour: Some(14), visitor_count: Some(30) },
                HourlyVisit { hour: Some(15), visitor_count: Some(70) },
            ],
            ..MemorySource::default()
        };
        let page = PageContext::with_tab("/insights", "store");
        let mut ctx = context(&source, &page, QueryType::HourlyPattern, &[]);
        ctx.hour = Some(15);

        let result = handle(&ctx).await.unwrap();
        assert!(result.message.contains("15시에는 70명"));
        assert!(result.message.contains("70.0%"));
    }

    #[tokio::test]
    async fn test_zone_distribution() {
        let source = MemorySource {
            zones: vec![zone("입구", 300), zone("피팅룸", 100)],
            ..MemorySource::default()
        };
        let page = PageContext::with_tab("/insights", "store");
        let mut ctx = context(&source, &page, QueryType::ZoneAnalysis, &[]);
        ctx.response_hint = Some(ResponseHint::Distribution);

        let result = handle(&ctx).await.unwrap();
        assert!(result.message.contains("입구: 75.0%"));
        assert!(result.message.contains("피팅룸: 25.0%"));
    }

    #[tokio::test]
    async fn test_zone_filter_falls_back_to_all() {
        let source = MemorySource {
            zones: vec![zone("입구", 300), zone("피팅룸", 100)],
            ..MemorySource::default()
        };
        let page = PageContext::with_tab("/insights", "store");
        let filter = vec!["창가".to_string()];
        let ctx = context(&source, &page, QueryType::ZoneAnalysis, &filter);

        let result = handle(&ctx).await.unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["zones"].as_array().unwrap().len(), 2);
        assert_eq!(data["filterFallback"], true);
        assert!(result.message.contains("창가"));
    }

    #[tokio::test]
    async fn test_weekday_averages() {
        // Dec 2 and Dec 9 2024 are Mondays
        let source = MemorySource {
            daily: vec![
                DailyKpi { date: Some(day(2)), total_visitors: Some(100), ..DailyKpi::default() },
                DailyKpi { date: Some(day(9)), total_visitors: Some(300), ..DailyKpi::default() },
                DailyKpi { date: Some(day(3)), total_visitors: Some(50), ..DailyKpi::default() },
            ],
            ..MemorySource::default()
        };
        let page = PageContext::with_tab("/insights", "store");
        let ctx = context(&source, &page, QueryType::WeekdayPattern, &[]);

        let result = handle(&ctx).await.unwrap();
        assert!(result.message.contains("월요일(평균 200명)"));
    }
}
