//! Postgres-backed KPI source
//!
//! Each method calls one stored function as
//! `SELECT * FROM <fn>($org, $store, $start, $end)`. The functions return
//! `float8`/`int8` columns; any column may be NULL.

use assistant_types::DateRange;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

use super::{
    AppliedStrategy, CatalogItem, CustomerSegmentRow, DailyKpi, DataImport, DataSourceRow,
    HourlyVisit, InventoryLevel, KpiScope, KpiSource, OverviewKpis, ProductPerformance, StoreGoal,
    VisitorMix, ZoneMetric,
};
use crate::error::{AssistantError, Result};

const RPC_OVERVIEW_KPIS: &str = "rpc_overview_kpis";
const RPC_DAILY_KPIS: &str = "rpc_daily_kpis";
const RPC_HOURLY_VISITS: &str = "rpc_hourly_visits";
const RPC_ZONE_METRICS: &str = "rpc_zone_metrics";
const RPC_CUSTOMER_SEGMENTS: &str = "rpc_customer_segments";
const RPC_VISITOR_MIX: &str = "rpc_visitor_mix";
const RPC_PRODUCT_PERFORMANCE: &str = "rpc_product_performance";
const RPC_INVENTORY_LEVELS: &str = "rpc_inventory_levels";
const RPC_STORE_GOALS: &str = "rpc_store_goals";
const RPC_APPLIED_STRATEGIES: &str = "rpc_applied_strategies";
const RPC_DATA_IMPORTS: &str = "rpc_data_imports";
const RPC_DATA_SOURCES: &str = "rpc_data_sources";
const RPC_PRODUCT_CATALOG: &str = "rpc_product_catalog";

pub struct PgKpiSource {
    pool: PgPool,
}

impl PgKpiSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ranged<T>(&self, function: &str, scope: &KpiScope, range: &DateRange) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {function}($1, $2, $3, $4)");
        tracing::debug!(function, org_id = %scope.org_id, "Calling KPI function");
        sqlx::query_as::<_, T>(&sql)
            .bind(scope.org_id)
            .bind(scope.store_id)
            .bind(range.start_date)
            .bind(range.end_date)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AssistantError::Data(format!("{function}: {e}")))
    }

    async fn unranged<T>(&self, function: &str, scope: &KpiScope) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {function}($1, $2)");
        tracing::debug!(function, org_id = %scope.org_id, "Calling KPI function");
        sqlx::query_as::<_, T>(&sql)
            .bind(scope.org_id)
            .bind(scope.store_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AssistantError::Data(format!("{function}: {e}")))
    }
}

#[async_trait]
impl KpiSource for PgKpiSource {
    async fn overview_kpis(&self, scope: &KpiScope, range: &DateRange) -> Result<OverviewKpis> {
        let rows: Vec<OverviewKpis> = self.ranged(RPC_OVERVIEW_KPIS, scope, range).await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    async fn daily_kpis(&self, scope: &KpiScope, range: &DateRange) -> Result<Vec<DailyKpi>> {
        self.ranged(RPC_DAILY_KPIS, scope, range).await
    }

    async fn hourly_visits(
        &self,
        scope: &KpiScope,
        range: &DateRange,
    ) -> Result<Vec<HourlyVisit>> {
        self.ranged(RPC_HOURLY_VISITS, scope, range).await
    }

    async fn zone_metrics(&self, scope: &KpiScope, range: &DateRange) -> Result<Vec<ZoneMetric>> {
        self.ranged(RPC_ZONE_METRICS, scope, range).await
    }

    async fn customer_segments(
        &self,
        scope: &KpiScope,
        range: &DateRange,
    ) -> Result<Vec<CustomerSegmentRow>> {
        self.ranged(RPC_CUSTOMER_SEGMENTS, scope, range).await
    }

    async fn visitor_mix(&self, scope: &KpiScope, range: &DateRange) -> Result<VisitorMix> {
        let rows: Vec<VisitorMix> = self.ranged(RPC_VISITOR_MIX, scope, range).await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    async fn product_performance(
        &self,
        scope: &KpiScope,
        range: &DateRange,
    ) -> Result<Vec<ProductPerformance>> {
        self.ranged(RPC_PRODUCT_PERFORMANCE, scope, range).await
    }

    async fn inventory_levels(&self, scope: &KpiScope) -> Result<Vec<InventoryLevel>> {
        self.unranged(RPC_INVENTORY_LEVELS, scope).await
    }

    async fn store_goals(&self, scope: &KpiScope, range: &DateRange) -> Result<Vec<StoreGoal>> {
        self.ranged(RPC_STORE_GOALS, scope, range).await
    }

    async fn applied_strategies(
        &self,
        scope: &KpiScope,
        range: &DateRange,
    ) -> Result<Vec<AppliedStrategy>> {
        self.ranged(RPC_APPLIED_STRATEGIES, scope, range).await
    }

    async fn data_imports(&self, scope: &KpiScope, range: &DateRange) -> Result<Vec<DataImport>> {
        self.ranged(RPC_DATA_IMPORTS, scope, range).await
    }

    async fn data_sources(&self, scope: &KpiScope) -> Result<Vec<DataSourceRow>> {
        self.unranged(RPC_DATA_SOURCES, scope).await
    }

    async fn product_catalog(&self, scope: &KpiScope) -> Result<Vec<CatalogItem>> {
        self.unranged(RPC_PRODUCT_CATALOG, scope).await
    }
}
