//! KPI data access
//!
//! Query handlers read store data through `KpiSource`, one method per
//! Postgres RPC. Every RPC takes the org and store scope plus (for
//! time-bound data) a date window, and returns flat rows.
//!
//! Row fields are all `Option`: an RPC may omit a column or return NULL and
//! neither is fatal. Handlers read them through `int`/`float`/`text`, which
//! default to zero or empty.

#[cfg(feature = "database")]
pub mod postgres;

#[cfg(feature = "database")]
pub use postgres::PgKpiSource;

use assistant_types::DateRange;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Tenant scope of a lookup. `store_id = None` means every store of the org.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KpiScope {
    pub org_id: Uuid,
    pub store_id: Option<Uuid>,
}

// ============================================================================
// ROW TYPES
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow), sqlx(default))]
pub struct OverviewKpis {
    pub total_revenue: Option<f64>,
    pub total_visitors: Option<i64>,
    pub unique_visitors: Option<i64>,
    pub total_transactions: Option<i64>,
    pub conversion_rate: Option<f64>,
    pub avg_transaction_value: Option<f64>,
    pub revisit_rate: Option<f64>,
    pub sales_per_sqm: Option<f64>,
    pub funnel_entry: Option<i64>,
    pub funnel_browse: Option<i64>,
    pub funnel_engage: Option<i64>,
    pub funnel_fitting: Option<i64>,
    pub funnel_purchase: Option<i64>,
}

/// Current and comparison-window KPIs side by side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiComparison {
    pub current: OverviewKpis,
    pub previous: Option<OverviewKpis>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow), sqlx(default))]
pub struct DailyKpi {
    pub date: Option<NaiveDate>,
    pub total_revenue: Option<f64>,
    pub total_visitors: Option<i64>,
    pub total_transactions: Option<i64>,
    pub conversion_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow), sqlx(default))]
pub struct HourlyVisit {
    pub hour: Option<i32>,
    pub visitor_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow), sqlx(default))]
pub struct ZoneMetric {
    pub zone_name: Option<String>,
    pub visitors: Option<i64>,
    pub avg_dwell_seconds: Option<f64>,
    pub conversion_rate: Option<f64>,
    pub revenue: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow), sqlx(default))]
pub struct CustomerSegmentRow {
    pub segment_name: Option<String>,
    pub customer_count: Option<i64>,
    pub avg_transaction_value: Option<f64>,
    pub visit_frequency: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow), sqlx(default))]
pub struct VisitorMix {
    pub new_visitors: Option<i64>,
    pub returning_visitors: Option<i64>,
    pub avg_visit_frequency: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow), sqlx(default))]
pub struct ProductPerformance {
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub sku: Option<String>,
    pub units_sold: Option<i64>,
    pub revenue: Option<f64>,
    pub stock_level: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow), sqlx(default))]
pub struct InventoryLevel {
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub current_stock: Option<i64>,
    pub minimum_stock: Option<i64>,
    pub optimal_stock: Option<i64>,
    pub weekly_demand: Option<i64>,
    pub turnover_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow), sqlx(default))]
pub struct StoreGoal {
    /// `revenue`, `visitors`, `conversion` or `avg_basket`
    pub goal_type: Option<String>,
    pub target_value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow), sqlx(default))]
pub struct AppliedStrategy {
    pub strategy_name: Option<String>,
    pub strategy_type: Option<String>,
    pub status: Option<String>,
    pub expected_roi: Option<f64>,
    pub actual_roi: Option<f64>,
    pub applied_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow), sqlx(default))]
pub struct DataImport {
    pub file_name: Option<String>,
    pub import_type: Option<String>,
    pub status: Option<String>,
    pub row_count: Option<i64>,
    pub imported_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow), sqlx(default))]
pub struct DataSourceRow {
    pub source_name: Option<String>,
    pub source_type: Option<String>,
    pub status: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow), sqlx(default))]
pub struct CatalogItem {
    pub product_name: Option<String>,
    pub category: Option<String>,
}

// ============================================================================
// NULL HANDLING
// ============================================================================

pub fn int(v: Option<i64>) -> i64 {
    v.unwrap_or(0)
}

pub fn float(v: Option<f64>) -> f64 {
    v.filter(|x| x.is_finite()).unwrap_or(0.0)
}

pub fn text(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or("")
}

// ============================================================================
// SOURCE TRAIT
// ============================================================================

#[async_trait]
pub trait KpiSource: Send + Sync {
    async fn overview_kpis(&self, scope: &KpiScope, range: &DateRange) -> Result<OverviewKpis>;

    /// KPIs for the range and, when the range has one, its comparison window
    async fn overview_kpis_with_comparison(
        &self,
        scope: &KpiScope,
        range: &DateRange,
    ) -> Result<KpiComparison> {
        let current = self.overview_kpis(scope, range).await?;
        let previous = match range.comparison() {
            Some((start, end)) => Some(self.overview_kpis(scope, &DateRange::new(start, end)).await?),
            None => None,
        };
        Ok(KpiComparison { current, previous })
    }

    async fn daily_kpis(&self, scope: &KpiScope, range: &DateRange) -> Result<Vec<DailyKpi>>;

    async fn hourly_visits(&self, scope: &KpiScope, range: &DateRange)
        -> Result<Vec<HourlyVisit>>;

    async fn zone_metrics(&self, scope: &KpiScope, range: &DateRange) -> Result<Vec<ZoneMetric>>;

    async fn customer_segments(
        &self,
        scope: &KpiScope,
        range: &DateRange,
    ) -> Result<Vec<CustomerSegmentRow>>;

    async fn visitor_mix(&self, scope: &KpiScope, range: &DateRange) -> Result<VisitorMix>;

    async fn product_performance(
        &self,
        scope: &KpiScope,
        range: &DateRange,
    ) -> Result<Vec<ProductPerformance>>;

    /// Current stock; not date-bound
    async fn inventory_levels(&self, scope: &KpiScope) -> Result<Vec<InventoryLevel>>;

    async fn store_goals(&self, scope: &KpiScope, range: &DateRange) -> Result<Vec<StoreGoal>>;

    async fn applied_strategies(
        &self,
        scope: &KpiScope,
        range: &DateRange,
    ) -> Result<Vec<AppliedStrategy>>;

    async fn data_imports(&self, scope: &KpiScope, range: &DateRange) -> Result<Vec<DataImport>>;

    async fn data_sources(&self, scope: &KpiScope) -> Result<Vec<DataSourceRow>>;

    /// Product and category names, for telling the two apart in questions
    async fn product_catalog(&self, scope: &KpiScope) -> Result<Vec<CatalogItem>>;
}
