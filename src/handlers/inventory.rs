//! Inventory tab: stock levels, alerts and reorder hints

use assistant_types::{QueryActionResult, QueryType};
use serde_json::json;

use super::common::{filter_rows, format_number, respond};
use super::QueryContext;
use crate::data::{float, int, text, InventoryLevel};
use crate::error::Result;

const INVENTORY_SUGGESTIONS: &[&str] = &["재고 부족 상품 알려줘", "과잉 재고는?", "발주 추천해줘"];

const LIST_SIZE: usize = 5;

/// Stock state of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    Stockout,
    Low,
    Normal,
    Over,
}

impl StockStatus {
    pub fn of(level: &InventoryLevel) -> Self {
        let current = int(level.current_stock);
        let minimum = int(level.minimum_stock);
        let optimal = int(level.optimal_stock);
        if current <= 0 {
            StockStatus::Stockout
        } else if current < minimum {
            StockStatus::Low
        } else if optimal > 0 && current > optimal * 3 / 2 {
            StockStatus::Over
        } else {
            StockStatus::Normal
        }
    }

    fn label(self) -> &'static str {
        match self {
            StockStatus::Stockout => "품절",
            StockStatus::Low => "부족",
            StockStatus::Normal => "정상",
            StockStatus::Over => "과잉",
        }
    }
}

/// Units to order to get back to the optimal level
fn reorder_quantity(level: &InventoryLevel) -> i64 {
    (int(level.optimal_stock) - int(level.current_stock)).max(0)
}

fn item_line(level: &InventoryLevel) -> String {
    format!(
        "• {}: {}개 ({})",
        text(&level.product_name),
        format_number(int(level.current_stock)),
        StockStatus::of(level).label()
    )
}

fn item_json(level: &InventoryLevel) -> serde_json::Value {
    json!({
        "product": text(&level.product_name),
        "category": text(&level.category),
        "currentStock": int(level.current_stock),
        "minimumStock": int(level.minimum_stock),
        "optimalStock": int(level.optimal_stock),
        "status": StockStatus::of(level).label(),
    })
}

pub async fn handle(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    let levels = ctx.source.inventory_levels(&ctx.scope).await?;
    if levels.is_empty() {
        return Ok(respond(
            ctx,
            "재고 데이터가 아직 없어요. 데이터를 연동하면 재고 현황을 알려드릴게요.",
            INVENTORY_SUGGESTIONS,
            None,
        ));
    }

    // Item filter matches product or category
    let filtered = filter_rows(&levels, ctx.item_filter, |l| text(&l.product_name));
    let filtered = if filtered.fell_back {
        filter_rows(&levels, ctx.item_filter, |l| text(&l.category))
    } else {
        filtered
    };

    let mut lines = Vec::new();
    if let Some(note) = filtered.fallback_note(ctx.item_filter) {
        lines.push(note);
    }
    let rows = &filtered.rows;

    let data = match ctx.query_type {
        QueryType::LowStock | QueryType::Stockout | QueryType::Overstock => {
            let wanted = match ctx.query_type {
                QueryType::LowStock => StockStatus::Low,
                QueryType::Stockout => StockStatus::Stockout,
                _ => StockStatus::Over,
            };
            let hits: Vec<&InventoryLevel> = rows
                .iter()
                .copied()
                .filter(|l| match wanted {
                    // low stock alerts include items already out
                    StockStatus::Low => {
                        matches!(StockStatus::of(l), StockStatus::Low | StockStatus::Stockout)
                    }
                    _ => StockStatus::of(l) == wanted,
                })
                .collect();
            if hits.is_empty() {
                lines.push(format!("현재 {} 상태인 상품은 없어요.", wanted.label()));
            } else {
                lines.push(format!(
                    "{} 상태인 상품이 {}개 있어요.",
                    wanted.label(),
                    hits.len()
                ));
                lines.extend(hits.iter().take(LIST_SIZE).map(|l| item_line(l)));
            }
            json!({ "count": hits.len(), "items": hits.iter().map(|l| item_json(l)).collect::<Vec<_>>() })
        }
        QueryType::InventoryTurnover => {
            let mut sorted = rows.clone();
            sorted.sort_by(|a, b| float(b.turnover_rate).total_cmp(&float(a.turnover_rate)));
            let avg = if sorted.is_empty() {
                0.0
            } else {
                sorted.iter().map(|l| float(l.turnover_rate)).sum::<f64>() / sorted.len() as f64
            };
            lines.push(format!("평균 재고 회전율은 {avg:.1}회입니다."));
            lines.extend(sorted.iter().take(LIST_SIZE).map(|l| {
                format!("• {}: {:.1}회", text(&l.product_name), float(l.turnover_rate))
            }));
            json!({ "avgTurnover": avg })
        }
        QueryType::StockMovement => {
            let demand: i64 = rows.iter().map(|l| int(l.weekly_demand)).sum();
            let stock: i64 = rows.iter().map(|l| int(l.current_stock)).sum();
            let weeks = if demand > 0 {
                Some(stock as f64 / demand as f64)
            } else {
                None
            };
            lines.push(format!(
                "주간 예상 출고량은 {}개, 현재 재고는 {}개입니다.",
                format_number(demand),
                format_number(stock)
            ));
            if let Some(weeks) = weeks {
                lines.push(format!("현재 재고로 약 {weeks:.1}주를 버틸 수 있어요."));
            }
            json!({ "weeklyDemand": demand, "currentStock": stock, "weeksOfCover": weeks })
        }
        QueryType::ReorderSuggestion => {
            let mut needs: Vec<(&InventoryLevel, i64)> = rows
                .iter()
                .map(|l| (*l, reorder_quantity(l)))
                .filter(|(l, qty)| {
                    *qty > 0 && int(l.current_stock) < int(l.minimum_stock).max(1)
                })
                .collect();
            needs.sort_by_key(|(_, qty)| std::cmp::Reverse(*qty));
            if needs.is_empty() {
                lines.push("지금 발주가 필요한 상품은 없어요.".to_string());
            } else {
                lines.push(format!("발주가 필요한 상품 {}개를 추천드려요.", needs.len()));
                lines.extend(needs.iter().take(LIST_SIZE).map(|(l, qty)| {
                    format!("• {}: {}개 발주", text(&l.product_name), format_number(*qty))
                }));
            }
            json!({
                "reorders": needs
                    .iter()
                    .map(|(l, qty)| json!({"product": text(&l.product_name), "quantity": qty}))
                    .collect::<Vec<_>>(),
            })
        }
        _ => {
            let count = |s: StockStatus| rows.iter().filter(|l| StockStatus::of(l) == s).count();
            let total: i64 = rows.iter().map(|l| int(l.current_stock)).sum();
            lines.push(format!(
                "총 {}개 상품, 재고 {}개입니다. 품절 {}개, 부족 {}개, 과잉 {}개예요.",
                rows.len(),
                format_number(total),
                count(StockStatus::Stockout),
                count(StockStatus::Low),
                count(StockStatus::Over)
            ));
            if ctx.query_type == QueryType::StockLevel || !ctx.item_filter.is_empty() {
                lines.extend(rows.iter().take(LIST_SIZE).map(|l| item_line(l)));
            }
            json!({
                "totalItems": rows.len(),
                "totalStock": total,
                "items": rows.iter().take(LIST_SIZE).map(|l| item_json(l)).collect::<Vec<_>>(),
            })
        }
    };

    Ok(respond(ctx, lines.join("\n"), INVENTORY_SUGGESTIONS, Some(data)))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{context, MemorySource};
    use super::*;
    use assistant_types::PageContext;

    fn level(name: &str, current: i64, minimum: i64, optimal: i64) -> InventoryLevel {
        InventoryLevel {
            product_name: Some(name.into()),
            category: Some("아우터".into()),
            current_stock: Some(current),
            minimum_stock: Some(minimum),
            optimal_stock: Some(optimal),
            weekly_demand: Some(5),
            turnover_rate: Some(2.0),
        }
    }

    fn source() -> MemorySource {
        MemorySource {
            inventory: vec![
                level("울 코트", 3, 10, 30),
                level("패딩 점퍼", 0, 5, 20),
                level("니트", 100, 10, 40),
                level("셔츠", 20, 10, 25),
            ],
            ..MemorySource::default()
        }
    }

    #[test]
    fn test_stock_status() {
        assert_eq!(StockStatus::of(&level("a", 0, 5, 10)), StockStatus::Stockout);
        assert_eq!(StockStatus::of(&level("a", 4, 5, 10)), StockStatus::Low);
        assert_eq!(StockStatus::of(&level("a", 16, 5, 10)), StockStatus::Over);
        assert_eq!(StockStatus::of(&level("a", 15, 5, 10)), StockStatus::Normal);
    }

    #[tokio::test]
    async fn test_low_stock_includes_stockouts() {
        let source = source();
        let page = PageContext::with_tab("/insights", "inventory");
        let ctx = context(&source, &page, QueryType::LowStock, &[]);

        let result = handle(&ctx).await.unwrap();
        assert_eq!(result.data.unwrap()["count"], 2);
        assert!(result.message.contains("울 코트"));
        assert!(result.message.contains("패딩 점퍼"));
    }

    #[tokio::test]
    async fn test_reorder_quantities() {
        let source = source();
        let page = PageContext::with_tab("/insights", "inventory");
        let ctx = context(&source, &page, QueryType::ReorderSuggestion, &[]);

        let result = handle(&ctx).await.unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["reorders"][0]["product"], "울 코트");
        assert_eq!(data["reorders"][0]["quantity"], 27);
        assert_eq!(data["reorders"][1]["quantity"], 20);
    }

    #[tokio::test]
    async fn test_category_filter() {
        let source = source();
        let page = PageContext::with_tab("/insights", "inventory");
        let filter = vec!["아우터".to_string()];
        let ctx = context(&source, &page, QueryType::Inventory, &filter);

        let result = handle(&ctx).await.unwrap();
        assert!(!result.message.contains("찾지 못해"));
        assert_eq!(result.data.unwrap()["totalItems"], 4);
    }
}
