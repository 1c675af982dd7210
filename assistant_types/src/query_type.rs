//! Query type vocabulary
//!
//! Fine-grained sub-classification within `query_kpi`. The wire name is the
//! camelCase variant name (`HourlyPattern` -> `"hourlyPattern"`).

use serde::{Deserialize, Serialize};

macro_rules! query_types {
    ($($variant:ident => $wire:literal),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum QueryType {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl QueryType {
            /// Every query type, in dashboard order
            pub const ALL: &'static [QueryType] = &[$(QueryType::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(QueryType::$variant => $wire,)+
                }
            }

            pub fn parse(s: &str) -> Option<QueryType> {
                match s {
                    $($wire => Some(QueryType::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

query_types! {
    // Overview tab
    Summary => "summary",
    Revenue => "revenue",
    Visitors => "visitors",
    Conversion => "conversion",
    AvgBasket => "avgBasket",
    Transactions => "transactions",
    UniqueVisitors => "uniqueVisitors",
    RevisitRate => "revisitRate",
    SalesPerArea => "salesPerArea",
    Funnel => "funnel",
    Goal => "goal",
    DailyTrend => "dailyTrend",
    // Store tab
    StoreSummary => "storeSummary",
    HourlyPattern => "hourlyPattern",
    PeakTime => "peakTime",
    ZoneAnalysis => "zoneAnalysis",
    DwellTime => "dwellTime",
    ZoneConversion => "zoneConversion",
    WeekdayPattern => "weekdayPattern",
    Heatmap => "heatmap",
    // Customer tab
    CustomerSegment => "customerSegment",
    NewVsReturning => "newVsReturning",
    ReturnRate => "returnRate",
    VisitFrequency => "visitFrequency",
    LoyalCustomers => "loyalCustomers",
    SegmentAvgBasket => "segmentAvgBasket",
    CustomerTrend => "customerTrend",
    // Product tab
    Product => "product",
    CategoryAnalysis => "categoryAnalysis",
    TopProducts => "topProducts",
    BottomProducts => "bottomProducts",
    UnitsSold => "unitsSold",
    ProductTrend => "productTrend",
    // Inventory tab
    Inventory => "inventory",
    StockLevel => "stockLevel",
    LowStock => "lowStock",
    Overstock => "overstock",
    Stockout => "stockout",
    InventoryTurnover => "inventoryTurnover",
    StockMovement => "stockMovement",
    ReorderSuggestion => "reorderSuggestion",
    // Prediction tab
    PredictionSummary => "predictionSummary",
    RevenueForecast => "revenueForecast",
    VisitorForecast => "visitorForecast",
    DemandForecast => "demandForecast",
    ConversionForecast => "conversionForecast",
    // AI recommendation tab
    AiRecommendation => "aiRecommendation",
    LayoutRecommendation => "layoutRecommendation",
    StaffingRecommendation => "staffingRecommendation",
    PromotionRecommendation => "promotionRecommendation",
    InventoryRecommendation => "inventoryRecommendation",
    PriceOptimization => "priceOptimization",
    // ROI page
    RoiSummary => "roiSummary",
    RoiByStrategy => "roiByStrategy",
    AppliedStrategies => "appliedStrategies",
    RoiTrend => "roiTrend",
    StrategyDetail => "strategyDetail",
    // Settings page
    StoreSettings => "storeSettings",
    DataSources => "dataSources",
    ImportHistory => "importHistory",
    ApiConnections => "apiConnections",
    UserManagement => "userManagement",
    SystemSettings => "systemSettings",
    LicenseInfo => "licenseInfo",
    // Studio page
    StudioLayout => "studioLayout",
    SimulationResult => "simulationResult",
    OptimizationResult => "optimizationResult",
    OverlayView => "overlayView",
    // Data control tower
    DataQuality => "dataQuality",
    DataSourceStatus => "dataSourceStatus",
    RecentImports => "recentImports",
    PipelineStatus => "pipelineStatus",
    DataLineage => "dataLineage",
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_wire_names_are_unique() {
        let names: HashSet<&str> = QueryType::ALL.iter().map(|q| q.as_str()).collect();
        assert_eq!(names.len(), QueryType::ALL.len());
    }

    #[test]
    fn test_parse_matches_serde() {
        for qt in QueryType::ALL {
            let json = serde_json::to_value(qt).unwrap();
            assert_eq!(json, serde_json::Value::String(qt.as_str().to_string()));
            assert_eq!(QueryType::parse(qt.as_str()), Some(*qt));
        }
    }

    #[test]
    fn test_vocabulary_size() {
        assert!(QueryType::ALL.len() >= 70);
    }
}
