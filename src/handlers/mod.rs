//! Query handlers
//!
//! One module per dashboard tab. Every handler receives a `QueryContext`,
//! reads what it needs through `KpiSource`, and returns a
//! `QueryActionResult` whose actions start with the navigation plan for
//! the query type.
//!
//! Routing is by destination: the query type's entry in the canonical
//! query-type table decides which tab module answers it.

pub mod ai_recommendation;
pub mod commands;
pub mod common;
pub mod customer;
pub mod data_control;
pub mod inventory;
pub mod overview;
pub mod prediction;
pub mod product;
pub mod roi;
pub mod settings;
pub mod store;
pub mod studio;

use assistant_types::{DateRange, PageContext, QueryActionResult, QueryType, ResponseHint};

use crate::data::{KpiScope, KpiSource};
use crate::dictionary::{self, DATA_CONTROL, INSIGHTS, ROI, SETTINGS, STUDIO};
use crate::error::Result;
use crate::extraction::{describe_range, DatePreset};

/// Everything a handler needs for one query
pub struct QueryContext<'a> {
    pub source: &'a dyn KpiSource,
    pub scope: KpiScope,
    pub query_type: QueryType,
    pub date_range: DateRange,
    /// Preset the range came from, for wording
    pub preset: Option<DatePreset>,
    pub page: &'a PageContext,
    pub item_filter: &'a [String],
    pub response_hint: Option<ResponseHint>,
    pub hour: Option<u8>,
}

impl QueryContext<'_> {
    /// "오늘", "최근 7일" or the explicit range
    pub fn period(&self) -> String {
        describe_range(&self.date_range, self.preset)
    }

    pub fn hint(&self, hint: ResponseHint) -> bool {
        self.response_hint == Some(hint)
    }

    /// Comparison window as its own range
    pub fn comparison_range(&self) -> Option<DateRange> {
        self.date_range
            .comparison()
            .map(|(start, end)| DateRange::new(start, end))
    }
}

/// Tab modules a query can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerTab {
    Overview,
    Store,
    Customer,
    Product,
    Inventory,
    Prediction,
    AiRecommendation,
    Roi,
    Settings,
    DataControl,
    Studio,
}

/// Module that answers `query_type`
pub fn handler_tab(query_type: QueryType) -> HandlerTab {
    let target = dictionary::target_for(query_type);
    match (target.page, target.tab) {
        (INSIGHTS, Some("store")) => HandlerTab::Store,
        (INSIGHTS, Some("customer")) => HandlerTab::Customer,
        (INSIGHTS, Some("product")) => HandlerTab::Product,
        (INSIGHTS, Some("inventory")) => HandlerTab::Inventory,
        (INSIGHTS, Some("prediction")) => HandlerTab::Prediction,
        (INSIGHTS, Some("ai")) => HandlerTab::AiRecommendation,
        (ROI, _) => HandlerTab::Roi,
        (SETTINGS, _) => HandlerTab::Settings,
        (DATA_CONTROL, _) => HandlerTab::DataControl,
        (STUDIO, _) => HandlerTab::Studio,
        _ => HandlerTab::Overview,
    }
}

/// Answer a `query_kpi` classification
pub async fn handle_query(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    let tab = handler_tab(ctx.query_type);
    tracing::debug!(
        query_type = %ctx.query_type,
        ?tab,
        start = %ctx.date_range.start_date,
        end = %ctx.date_range.end_date,
        "Handling query"
    );
    match tab {
        HandlerTab::Overview => overview::handle(ctx).await,
        HandlerTab::Store => store::handle(ctx).await,
        HandlerTab::Customer => customer::handle(ctx).await,
        HandlerTab::Product => product::handle(ctx).await,
        HandlerTab::Inventory => inventory::handle(ctx).await,
        HandlerTab::Prediction => Ok(prediction::handle(ctx)),
        HandlerTab::AiRecommendation => Ok(ai_recommendation::handle(ctx)),
        HandlerTab::Roi => roi::handle(ctx).await,
        HandlerTab::Settings => settings::handle(ctx).await,
        HandlerTab::DataControl => data_control::handle(ctx).await,
        HandlerTab::Studio => Ok(studio::handle(ctx)),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory `KpiSource` for handler tests

    use super::*;
    use crate::data::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    pub(crate) struct MemorySource {
        pub overview: OverviewKpis,
        pub previous: Option<OverviewKpis>,
        pub daily: Vec<DailyKpi>,
        pub hourly: Vec<HourlyVisit>,
        pub zones: Vec<ZoneMetric>,
        pub segments: Vec<CustomerSegmentRow>,
        pub mix: VisitorMix,
        pub products: Vec<ProductPerformance>,
        pub inventory: Vec<InventoryLevel>,
        pub goals: Vec<StoreGoal>,
        pub strategies: Vec<AppliedStrategy>,
        pub imports: Vec<DataImport>,
        pub sources: Vec<DataSourceRow>,
        pub calls: AtomicUsize,
    }

    impl MemorySource {
        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl KpiSource for MemorySource {
        async fn overview_kpis(&self, _: &KpiScope, range: &DateRange) -> Result<OverviewKpis> {
            self.hit();
            // Anything ending before December is the comparison window
            if range.end_date < day(1) {
                Ok(self.previous.clone().unwrap_or_default())
            } else {
                Ok(self.overview.clone())
            }
        }
        async fn daily_kpis(&self, _: &KpiScope, _: &DateRange) -> Result<Vec<DailyKpi>> {
            self.hit();
            Ok(self.daily.clone())
        }
        async fn hourly_visits(&self, _: &KpiScope, _: &DateRange) -> Result<Vec<HourlyVisit>> {
            self.hit();
            Ok(self.hourly.clone())
        }
        async fn zone_metrics(&self, _: &KpiScope, _: &DateRange) -> Result<Vec<ZoneMetric>> {
            self.hit();
            Ok(self.zones.clone())
        }
        async fn customer_segments(
            &self,
            _: &KpiScope,
            _: &DateRange,
        ) -> Result<Vec<CustomerSegmentRow>> {
            self.hit();
            Ok(self.segments.clone())
        }
        async fn visitor_mix(&self, _: &KpiScope, _: &DateRange) -> Result<VisitorMix> {
            self.hit();
            Ok(self.mix.clone())
        }
        async fn product_performance(
            &self,
            _: &KpiScope,
            _: &DateRange,
        ) -> Result<Vec<ProductPerformance>> {
            self.hit();
            Ok(self.products.clone())
        }
        async fn inventory_levels(&self, _: &KpiScope) -> Result<Vec<InventoryLevel>> {
            self.hit();
            Ok(self.inventory.clone())
        }
        async fn store_goals(&self, _: &KpiScope, _: &DateRange) -> Result<Vec<StoreGoal>> {
            self.hit();
            Ok(self.goals.clone())
        }
        async fn applied_strategies(
            &self,
            _: &KpiScope,
            _: &DateRange,
        ) -> Result<Vec<AppliedStrategy>> {
            self.hit();
            Ok(self.strategies.clone())
        }
        async fn data_imports(&self, _: &KpiScope, _: &DateRange) -> Result<Vec<DataImport>> {
            self.hit();
            Ok(self.imports.clone())
        }
        async fn data_sources(&self, _: &KpiScope) -> Result<Vec<DataSourceRow>> {
            self.hit();
            Ok(self.sources.clone())
        }
        async fn product_catalog(&self, _: &KpiScope) -> Result<Vec<CatalogItem>> {
            self.hit();
            Ok(Vec::new())
        }
    }

    pub(crate) fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, d).unwrap()
    }

    /// December 1-10 2024, compared with November 21-30
    pub(crate) fn december_range() -> DateRange {
        crate::extraction::with_comparison(day(1), day(10), None)
    }

    pub(crate) fn context<'a>(
        source: &'a MemorySource,
        page: &'a PageContext,
        query_type: QueryType,
        item_filter: &'a [String],
    ) -> QueryContext<'a> {
        QueryContext {
            source,
            scope: KpiScope {
                org_id: uuid::Uuid::nil(),
                store_id: None,
            },
            query_type,
            date_range: december_range(),
            preset: None,
            page,
            item_filter,
            response_hint: None,
            hour: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_follows_destination() {
        assert_eq!(handler_tab(QueryType::Revenue), HandlerTab::Overview);
        assert_eq!(handler_tab(QueryType::HourlyPattern), HandlerTab::Store);
        assert_eq!(handler_tab(QueryType::CustomerSegment), HandlerTab::Customer);
        assert_eq!(handler_tab(QueryType::CategoryAnalysis), HandlerTab::Product);
        assert_eq!(handler_tab(QueryType::LowStock), HandlerTab::Inventory);
        assert_eq!(handler_tab(QueryType::RevenueForecast), HandlerTab::Prediction);
        assert_eq!(handler_tab(QueryType::PriceOptimization), HandlerTab::AiRecommendation);
        assert_eq!(handler_tab(QueryType::RoiTrend), HandlerTab::Roi);
        assert_eq!(handler_tab(QueryType::ImportHistory), HandlerTab::Settings);
        assert_eq!(handler_tab(QueryType::DataLineage), HandlerTab::DataControl);
        assert_eq!(handler_tab(QueryType::OverlayView), HandlerTab::Studio);
    }
}
