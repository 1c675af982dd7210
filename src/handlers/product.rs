//! Product tab: product and category performance

use std::collections::BTreeMap;

use assistant_types::{QueryActionResult, QueryType, ResponseHint};
use serde_json::json;

use super::common::{
    change_phrase, filter_rows, format_number, format_percent, format_won, percent_change,
    respond, share,
};
use super::QueryContext;
use crate::data::{float, int, text, ProductPerformance};
use crate::error::Result;

const PRODUCT_SUGGESTIONS: &[&str] = &["카테고리별 매출 보여줘", "가장 많이 팔린 상품은?", "재고 부족 상품 알려줘"];

const RANKING_SIZE: usize = 5;

pub async fn handle(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    let rows = ctx
        .source
        .product_performance(&ctx.scope, &ctx.date_range)
        .await?;
    if rows.is_empty() && ctx.query_type != QueryType::ProductTrend {
        return Ok(respond(
            ctx,
            format!("{} 상품 판매 데이터가 아직 없어요.", ctx.period()),
            PRODUCT_SUGGESTIONS,
            None,
        ));
    }
    match ctx.query_type {
        QueryType::CategoryAnalysis => Ok(categories(ctx, &rows)),
        QueryType::TopProducts | QueryType::BottomProducts => Ok(ranking(ctx, &rows)),
        QueryType::ProductTrend => trend(ctx, &rows).await,
        _ => Ok(products(ctx, &rows)),
    }
}

fn units(row: &ProductPerformance) -> i64 {
    int(row.units_sold)
}

fn revenue(row: &ProductPerformance) -> f64 {
    float(row.revenue)
}

// ============================================================================
// CATEGORIES
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
struct CategoryTotals {
    units: i64,
    revenue: f64,
    stock: i64,
    skus: usize,
}

fn by_category<'a>(
    rows: impl IntoIterator<Item = &'a ProductPerformance>,
) -> BTreeMap<String, CategoryTotals> {
    let mut totals: BTreeMap<String, CategoryTotals> = BTreeMap::new();
    for row in rows {
        let name = match text(&row.category) {
            "" => "기타",
            name => name,
        };
        let entry = totals.entry(name.to_string()).or_default();
        entry.units += units(row);
        entry.revenue += revenue(row);
        entry.stock += int(row.stock_level);
        entry.skus += 1;
    }
    totals
}

fn categories(ctx: &QueryContext<'_>, rows: &[ProductPerformance]) -> QueryActionResult {
    let all = by_category(rows);
    let total_revenue: f64 = all.values().map(|c| c.revenue).sum();
    let total_units: i64 = all.values().map(|c| c.units).sum();

    let filtered = filter_rows(rows, ctx.item_filter, |r| text(&r.category));
    let selected = by_category(filtered.rows.iter().copied());

    let mut ordered: Vec<(&String, &CategoryTotals)> = selected.iter().collect();
    if ctx.hint(ResponseHint::Quantity) {
        ordered.sort_by_key(|(_, c)| std::cmp::Reverse(c.units));
    } else {
        ordered.sort_by(|a, b| b.1.revenue.total_cmp(&a.1.revenue));
    }

    let mut lines = Vec::new();
    if let Some(note) = filtered.fallback_note(ctx.item_filter) {
        lines.push(note);
    }
    let heading = match ctx.response_hint {
        Some(ResponseHint::Distribution) => "카테고리별 매출 비중",
        Some(ResponseHint::Quantity) => "카테고리별 판매량",
        Some(ResponseHint::Sku) => "카테고리별 상품 수",
        Some(ResponseHint::CurrentStock) => "카테고리별 현재 재고",
        _ => "카테고리별 실적",
    };
    let render = |name: &str, c: &CategoryTotals| -> String {
        match ctx.response_hint {
            Some(ResponseHint::Distribution) => {
                format!("• {name}: {}", format_percent(share(c.revenue, total_revenue)))
            }
            Some(ResponseHint::Quantity) => format!(
                "• {name}: {}개 (전체의 {})",
                format_number(c.units),
                format_percent(share(c.units as f64, total_units as f64))
            ),
            Some(ResponseHint::Sku) => format!("• {name}: {}개 SKU", c.skus),
            Some(ResponseHint::CurrentStock) => {
                format!("• {name}: {}개", format_number(c.stock))
            }
            _ => format!(
                "• {name}: 매출 {}, 판매량 {}개",
                format_won(c.revenue),
                format_number(c.units)
            ),
        }
    };
    lines.push(format!("{} {heading}입니다.", ctx.period()));
    lines.extend(ordered.iter().map(|(name, c)| render(name, c)));

    let data = json!({
        "categories": ordered
            .iter()
            .map(|(name, c)| json!({
                "category": name,
                "revenue": c.revenue,
                "unitsSold": c.units,
                "stock": c.stock,
                "skuCount": c.skus,
                "revenueShare": share(c.revenue, total_revenue),
            }))
            .collect::<Vec<_>>(),
        "filterFallback": filtered.fell_back,
    });
    respond(ctx, lines.join("\n"), PRODUCT_SUGGESTIONS, Some(data))
}

// ============================================================================
// PRODUCTS
// ============================================================================

fn product_json(row: &ProductPerformance) -> serde_json::Value {
    json!({
        "product": text(&row.product_name),
        "category": text(&row.category),
        "sku": text(&row.sku),
        "unitsSold": units(row),
        "revenue": revenue(row),
        "stock": int(row.stock_level),
    })
}

fn products(ctx: &QueryContext<'_>, rows: &[ProductPerformance]) -> QueryActionResult {
    let filtered = filter_rows(rows, ctx.item_filter, |r| text(&r.product_name));
    let mut shown = filtered.rows.clone();
    shown.sort_by(|a, b| revenue(b).total_cmp(&revenue(a)));

    let mut lines = Vec::new();
    if let Some(note) = filtered.fallback_note(ctx.item_filter) {
        lines.push(note);
    }

    let total_units: i64 = shown.iter().map(|r| units(r)).sum();
    let total_revenue: f64 = shown.iter().map(|r| revenue(r)).sum();
    if ctx.query_type == QueryType::UnitsSold || ctx.hint(ResponseHint::Quantity) {
        lines.push(format!(
            "{} 판매량은 총 {}개입니다.",
            ctx.period(),
            format_number(total_units)
        ));
    } else {
        lines.push(format!(
            "{} 상품 매출은 {}, 판매량은 {}개입니다.",
            ctx.period(),
            format_won(total_revenue),
            format_number(total_units)
        ));
    }

    shown.truncate(RANKING_SIZE);
    for row in &shown {
        let detail = match ctx.response_hint {
            Some(ResponseHint::CurrentStock) => {
                format!("재고 {}개", format_number(int(row.stock_level)))
            }
            Some(ResponseHint::Sku) => format!("SKU {}", text(&row.sku)),
            _ => format!("{}개 / {}", format_number(units(row)), format_won(revenue(row))),
        };
        lines.push(format!("• {}: {detail}", text(&row.product_name)));
    }

    let data = json!({
        "totalUnits": total_units,
        "totalRevenue": total_revenue,
        "products": shown.iter().map(|r| product_json(r)).collect::<Vec<_>>(),
        "filterFallback": filtered.fell_back,
    });
    respond(ctx, lines.join("\n"), PRODUCT_SUGGESTIONS, Some(data))
}

fn ranking(ctx: &QueryContext<'_>, rows: &[ProductPerformance]) -> QueryActionResult {
    let filtered = filter_rows(rows, ctx.item_filter, |r| text(&r.category));
    let mut ranked = filtered.rows.clone();
    let by_units = ctx.hint(ResponseHint::Quantity);
    if by_units {
        ranked.sort_by_key(|r| std::cmp::Reverse(units(r)));
    } else {
        ranked.sort_by(|a, b| revenue(b).total_cmp(&revenue(a)));
    }
    let bottom = ctx.query_type == QueryType::BottomProducts;
    if bottom {
        ranked.reverse();
    }
    ranked.truncate(RANKING_SIZE);

    let mut lines = Vec::new();
    if let Some(note) = filtered.fallback_note(ctx.item_filter) {
        lines.push(note);
    }
    lines.push(format!(
        "{} {} {} 상품입니다.",
        ctx.period(),
        if by_units { "판매량" } else { "매출" },
        if bottom { "하위" } else { "상위" }
    ));
    for (i, row) in ranked.iter().enumerate() {
        let value = if by_units {
            format!("{}개", format_number(units(row)))
        } else {
            format_won(revenue(row))
        };
        lines.push(format!("{}. {} ({value})", i + 1, text(&row.product_name)));
    }

    let data = json!({
        "order": if bottom { "bottom" } else { "top" },
        "products": ranked.iter().map(|r| product_json(r)).collect::<Vec<_>>(),
    });
    respond(ctx, lines.join("\n"), PRODUCT_SUGGESTIONS, Some(data))
}

// ============================================================================
// TREND
// ============================================================================

async fn trend(ctx: &QueryContext<'_>, rows: &[ProductPerformance]) -> Result<QueryActionResult> {
    let previous = match ctx.comparison_range() {
        Some(range) => Some(ctx.source.product_performance(&ctx.scope, &range).await?),
        None => None,
    };

    let current = filter_rows(rows, ctx.item_filter, |r| text(&r.product_name));
    let current_units: i64 = current.rows.iter().map(|r| units(r)).sum();
    let previous_units = previous.as_ref().map(|prev| {
        filter_rows(prev, ctx.item_filter, |r| text(&r.product_name))
            .rows
            .iter()
            .map(|r| units(r))
            .sum::<i64>() as f64
    });
    let change = percent_change(current_units as f64, previous_units);

    let subject = if ctx.item_filter.is_empty() || current.fell_back {
        "전체 상품".to_string()
    } else {
        ctx.item_filter.join(", ")
    };
    let message = format!(
        "{} {subject} 판매량은 {}개입니다{}.",
        ctx.period(),
        format_number(current_units),
        change_phrase(change)
    );
    let data = json!({ "unitsSold": current_units, "change": change });
    Ok(respond(ctx, message, PRODUCT_SUGGESTIONS, Some(data)))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{context, MemorySource};
    use super::*;
    use assistant_types::PageContext;

    fn item(name: &str, category: &str, units: i64, revenue: f64) -> ProductPerformance {
        ProductPerformance {
            product_name: Some(name.into()),
            category: Some(category.into()),
            sku: Some(format!("SKU-{name}")),
            units_sold: Some(units),
            revenue: Some(revenue),
            stock_level: Some(10),
        }
    }

    fn source() -> MemorySource {
        MemorySource {
            products: vec![
                item("울 코트", "아우터", 12, 2_400_000.0),
                item("패딩 점퍼", "아우터", 8, 1_600_000.0),
                item("데님 팬츠", "하의", 30, 1_500_000.0),
                item("스니커즈", "신발", 10, 900_000.0),
            ],
            ..MemorySource::default()
        }
    }

    #[tokio::test]
    async fn test_category_quantity() {
        let source = source();
        let page = PageContext::with_tab("/insights", "product");
        let filter = vec!["아우터".to_string()];
        let mut ctx = context(&source, &page, QueryType::CategoryAnalysis, &filter);
        ctx.response_hint = Some(ResponseHint::Quantity);

        let result = handle(&ctx).await.unwrap();
        assert!(result.message.contains("아우터: 20개"));
        assert!(!result.message.contains("하의"));
        let data = result.data.unwrap();
        assert_eq!(data["categories"][0]["unitsSold"], 20);
    }

    #[tokio::test]
    async fn test_category_distribution_uses_all_revenue() {
        let source = source();
        let page = PageContext::with_tab("/insights", "product");
        let mut ctx = context(&source, &page, QueryType::CategoryAnalysis, &[]);
        ctx.response_hint = Some(ResponseHint::Distribution);

        let result = handle(&ctx).await.unwrap();
        // 4,000,000 of 6,400,000
        assert!(result.message.contains("아우터: 62.5%"));
    }

    #[tokio::test]
    async fn test_unknown_product_falls_back() {
        let source = source();
        let page = PageContext::with_tab("/insights", "product");
        let filter = vec!["코듀로이".to_string()];
        let ctx = context(&source, &page, QueryType::Product, &filter);

        let result = handle(&ctx).await.unwrap();
        assert!(result.message.starts_with("'코듀로이'"));
        assert_eq!(result.data.unwrap()["filterFallback"], true);
    }

    #[tokio::test]
    async fn test_bottom_products_order() {
        let source = source();
        let page = PageContext::with_tab("/insights", "product");
        let ctx = context(&source, &page, QueryType::BottomProducts, &[]);

        let result = handle(&ctx).await.unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["order"], "bottom");
        assert_eq!(data["products"][0]["product"], "스니커즈");
    }

    #[tokio::test]
    async fn test_units_sold_for_product() {
        let source = source();
        let page = PageContext::with_tab("/insights", "product");
        let filter = vec!["데님".to_string()];
        let ctx = context(&source, &page, QueryType::UnitsSold, &filter);

        let result = handle(&ctx).await.unwrap();
        assert!(result.message.contains("총 30개"));
    }

    #[tokio::test]
    async fn test_empty_rows() {
        let source = MemorySource::default();
        let page = PageContext::with_tab("/insights", "product");
        let ctx = context(&source, &page, QueryType::TopProducts, &[]);

        let result = handle(&ctx).await.unwrap();
        assert!(result.message.contains("아직 없어요"));
        assert!(result.data.is_none());
    }
}
