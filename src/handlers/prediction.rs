//! Prediction tab
//!
//! Forecasts are rendered by the dashboard's own model output, so the
//! assistant only brings the right card on screen.

use assistant_types::{QueryActionResult, QueryType};

use super::common::navigation_only;
use super::QueryContext;

const PREDICTION_SUGGESTIONS: &[&str] = &["다음주 매출 예측은?", "방문객 예측 보여줘", "수요 예측 알려줘"];

pub fn handle(ctx: &QueryContext<'_>) -> QueryActionResult {
    let subject = match ctx.query_type {
        QueryType::RevenueForecast => "매출 예측",
        QueryType::VisitorForecast => "방문객 예측",
        QueryType::DemandForecast => "수요 예측",
        QueryType::ConversionForecast => "전환율 예측",
        _ => "예측 요약",
    };
    navigation_only(ctx, subject, PREDICTION_SUGGESTIONS)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{context, MemorySource};
    use super::*;
    use assistant_types::{PageContext, UiAction};

    #[test]
    fn test_forecast_navigates_without_data() {
        let source = MemorySource::default();
        let page = PageContext::with_tab("/insights", "overview");
        let ctx = context(&source, &page, QueryType::RevenueForecast, &[]);

        let result = handle(&ctx);
        assert_eq!(result.actions[0], UiAction::set_tab("prediction"));
        assert!(result.message.contains("매출 예측"));
        assert!(result.data.is_none());
        assert_eq!(source.calls(), 0);
    }
}
