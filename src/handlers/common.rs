//! Formatting and filtering shared by the tab handlers

use assistant_types::QueryActionResult;
use serde_json::Value;

use super::QueryContext;
use crate::dictionary;
use crate::extraction::matches_filter;
use crate::navigation::{create_navigation_actions, framing_text};

// ============================================================================
// NUMBER FORMATTING
// ============================================================================

/// Thousands separators: 1234567 -> "1,234,567"
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Currency in won, rounded to the unit: "1,234,567원"
pub fn format_won(amount: f64) -> String {
    format!("{}원", format_number(amount.round() as i64))
}

/// One decimal place: "3.2%"
pub fn format_percent(rate: f64) -> String {
    format!("{:.1}%", rate)
}

/// Duration in seconds as "N분 M초" / "M초"
pub fn format_seconds(secs: f64) -> String {
    let total = secs.round().max(0.0) as i64;
    match (total / 60, total % 60) {
        (0, s) => format!("{s}초"),
        (m, 0) => format!("{m}분"),
        (m, s) => format!("{m}분 {s}초"),
    }
}

// ============================================================================
// RATIOS
// ============================================================================

/// Whole-percent change from `previous` to `current`; `None` without a
/// usable previous value
pub fn percent_change(current: f64, previous: Option<f64>) -> Option<i64> {
    let previous = previous.filter(|p| *p != 0.0 && p.is_finite())?;
    Some(((current - previous) / previous * 100.0).round() as i64)
}

/// " (이전 기간 대비 +5%)", or empty when there is no change to report
pub fn change_phrase(change: Option<i64>) -> String {
    match change {
        Some(c) if c > 0 => format!(" (이전 기간 대비 +{c}%)"),
        Some(c) => format!(" (이전 기간 대비 {c}%)"),
        None => String::new(),
    }
}

/// Share of `total` in percent, zero for an empty total
pub fn share(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

// ============================================================================
// ITEM FILTER
// ============================================================================

/// Rows kept by an item filter
#[derive(Debug)]
pub struct Filtered<'a, T> {
    pub rows: Vec<&'a T>,
    /// A filter was given but matched nothing, so every row is kept
    pub fell_back: bool,
}

impl<T> Filtered<'_, T> {
    /// Sentence telling the user the filter matched nothing
    pub fn fallback_note(&self, filter: &[String]) -> Option<String> {
        self.fell_back.then(|| {
            format!(
                "'{}'에 해당하는 항목을 찾지 못해 전체 결과를 보여드릴게요.",
                filter.join(", ")
            )
        })
    }
}

/// Keep rows whose name contains any filter term; an empty result falls
/// back to every row
pub fn filter_rows<'a, T, F>(rows: &'a [T], filter: &[String], name: F) -> Filtered<'a, T>
where
    F: Fn(&T) -> &str,
{
    if filter.is_empty() {
        return Filtered {
            rows: rows.iter().collect(),
            fell_back: false,
        };
    }
    let matched: Vec<&T> = rows
        .iter()
        .filter(|row| filter.iter().any(|term| matches_filter(name(*row), term)))
        .collect();
    if matched.is_empty() {
        Filtered {
            rows: rows.iter().collect(),
            fell_back: !rows.is_empty(),
        }
    } else {
        Filtered {
            rows: matched,
            fell_back: false,
        }
    }
}

// ============================================================================
// RESULT ASSEMBLY
// ============================================================================

/// Navigation actions for the query plus the message, with the framing
/// sentence when the view moves
pub fn respond(
    ctx: &QueryContext<'_>,
    message: impl Into<String>,
    suggestions: &[&str],
    data: Option<Value>,
) -> QueryActionResult {
    let plan = create_navigation_actions(ctx.query_type, &ctx.date_range, ctx.page);
    let mut message = message.into();
    if let Some(framing) = framing_text(&plan) {
        message.push(' ');
        message.push_str(&framing);
    }
    let result = QueryActionResult::new(plan.into_actions(), message)
        .with_suggestions(suggestions.iter().copied());
    match data {
        Some(data) => result.with_data(data),
        None => result,
    }
}

/// Answer for data that lives only in the destination view
pub fn navigation_only(
    ctx: &QueryContext<'_>,
    subject: &str,
    suggestions: &[&str],
) -> QueryActionResult {
    let plan = create_navigation_actions(ctx.query_type, &ctx.date_range, ctx.page);
    let message = if plan.tab_changed {
        let destination = dictionary::target_label(&dictionary::target_for(ctx.query_type));
        format!("{subject} 정보는 {destination} 화면에서 확인할 수 있어요. 해당 화면으로 이동할게요.")
    } else {
        format!("{subject} 정보는 현재 화면에서 확인할 수 있어요.")
    };
    QueryActionResult::new(plan.into_actions(), message)
        .with_suggestions(suggestions.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(-45000), "-45,000");
    }

    #[test]
    fn test_format_won_rounds() {
        assert_eq!(format_won(15300.6), "15,301원");
    }

    #[test]
    fn test_percent_change_guards_zero() {
        assert_eq!(percent_change(120.0, Some(100.0)), Some(20));
        assert_eq!(percent_change(80.0, Some(100.0)), Some(-20));
        assert_eq!(percent_change(80.0, Some(0.0)), None);
        assert_eq!(percent_change(80.0, None), None);
        assert_eq!(change_phrase(None), "");
        assert_eq!(change_phrase(Some(5)), " (이전 기간 대비 +5%)");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(45.0), "45초");
        assert_eq!(format_seconds(120.0), "2분");
        assert_eq!(format_seconds(135.4), "2분 15초");
    }

    #[test]
    fn test_filter_rows_falls_back() {
        let rows = vec!["아우터", "신발", "가방"];
        let hit = filter_rows(&rows, &["신발".to_string()], |r| *r);
        assert_eq!(hit.rows, vec![&"신발"]);
        assert!(!hit.fell_back);

        let miss = filter_rows(&rows, &["모자".to_string()], |r| *r);
        assert_eq!(miss.rows.len(), 3);
        assert!(miss.fell_back);
        assert!(miss.fallback_note(&["모자".to_string()]).unwrap().contains("모자"));
    }
}
