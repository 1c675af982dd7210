//! Dashboard structure
//!
//! Two canonical tables, nothing else may duplicate them:
//! - `PAGES`: page path -> ordered keyword -> tab table (plus page keywords)
//! - `QUERY_TYPE_TO_TAB`: query type -> (page, tab, section)
//!
//! Keywords are stored compacted (lowercase, no whitespace) and ordered so
//! that longer, more specific keywords come first within a page.

use assistant_types::QueryType;

pub const INSIGHTS: &str = "/insights";
pub const STUDIO: &str = "/studio";
pub const ROI: &str = "/roi";
pub const SETTINGS: &str = "/settings";
pub const DATA_CONTROL: &str = "/data-control";

/// A dashboard page and its tab vocabulary
#[derive(Debug)]
pub struct PageDef {
    pub path: &'static str,
    pub label: &'static str,
    /// Words that name the page itself
    pub keywords: &'static [&'static str],
    /// (keyword, tab id) in match priority order
    pub tab_keywords: &'static [(&'static str, &'static str)],
    /// (tab id, display label)
    pub tab_labels: &'static [(&'static str, &'static str)],
}

/// Canonical page order, also the fallback scan order for tab lookup
pub static PAGES: &[PageDef] = &[
    PageDef {
        path: INSIGHTS,
        label: "인사이트 허브",
        keywords: &["인사이트허브", "인사이트", "대시보드"],
        tab_keywords: &[
            ("ai추천", "ai"),
            ("추천", "ai"),
            ("개요", "overview"),
            ("매장", "store"),
            ("고객", "customer"),
            ("상품", "product"),
            ("재고", "inventory"),
            ("예측", "prediction"),
        ],
        tab_labels: &[
            ("overview", "개요"),
            ("store", "매장"),
            ("customer", "고객"),
            ("product", "상품"),
            ("inventory", "재고"),
            ("prediction", "예측"),
            ("ai", "AI 추천"),
        ],
    },
    PageDef {
        path: SETTINGS,
        label: "설정",
        keywords: &["설정", "세팅"],
        tab_keywords: &[
            ("매장관리", "stores"),
            ("데이터연동", "data"),
            ("라이선스", "license"),
            ("매장", "stores"),
            ("데이터", "data"),
            ("연동", "data"),
            ("사용자", "users"),
            ("멤버", "users"),
            ("시스템", "system"),
            ("플랜", "license"),
        ],
        tab_labels: &[
            ("stores", "매장 관리"),
            ("data", "데이터 연동"),
            ("users", "사용자"),
            ("system", "시스템"),
            ("license", "플랜/라이선스"),
        ],
    },
    PageDef {
        path: DATA_CONTROL,
        label: "데이터 컨트롤타워",
        keywords: &["데이터컨트롤타워", "컨트롤타워"],
        tab_keywords: &[
            ("데이터소스", "sources"),
            ("데이터품질", "quality"),
            ("파이프라인", "pipeline"),
            ("리니지", "lineage"),
            ("데이터", "sources"),
            ("품질", "quality"),
            ("계보", "lineage"),
        ],
        tab_labels: &[
            ("sources", "데이터 소스"),
            ("quality", "데이터 품질"),
            ("pipeline", "파이프라인"),
            ("lineage", "데이터 리니지"),
        ],
    },
    PageDef {
        path: STUDIO,
        label: "디지털트윈 스튜디오",
        keywords: &["디지털트윈", "스튜디오", "3d"],
        tab_keywords: &[
            ("시뮬레이션", "simulation"),
            ("오버레이", "overlay"),
            ("레이어", "layer"),
            ("최적화", "optimization"),
            ("데이터", "overlay"),
        ],
        tab_labels: &[
            ("layer", "레이어"),
            ("simulation", "시뮬레이션"),
            ("optimization", "최적화"),
            ("overlay", "데이터 오버레이"),
        ],
    },
    PageDef {
        path: ROI,
        label: "ROI 측정",
        keywords: &["roi측정", "roi", "투자수익"],
        tab_keywords: &[],
        tab_labels: &[],
    },
];

/// Where a query type's answer lives in the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavTarget {
    pub page: &'static str,
    pub tab: Option<&'static str>,
    pub section: Option<&'static str>,
}

const fn at(
    page: &'static str,
    tab: Option<&'static str>,
    section: Option<&'static str>,
) -> NavTarget {
    NavTarget { page, tab, section }
}

const fn insights(tab: &'static str, section: Option<&'static str>) -> NavTarget {
    at(INSIGHTS, Some(tab), section)
}

/// Single source of truth: query type -> (page, tab, section)
pub static QUERY_TYPE_TO_TAB: &[(QueryType, NavTarget)] = &[
    // Overview
    (QueryType::Summary, insights("overview", None)),
    (QueryType::Revenue, insights("overview", Some("kpi-cards"))),
    (QueryType::Visitors, insights("overview", Some("kpi-cards"))),
    (QueryType::Conversion, insights("overview", Some("kpi-cards"))),
    (QueryType::AvgBasket, insights("overview", Some("kpi-cards"))),
    (QueryType::Transactions, insights("overview", Some("kpi-cards"))),
    (QueryType::UniqueVisitors, insights("overview", Some("kpi-cards"))),
    (QueryType::RevisitRate, insights("overview", Some("kpi-cards"))),
    (QueryType::SalesPerArea, insights("overview", Some("kpi-cards"))),
    (QueryType::Funnel, insights("overview", Some("conversion-funnel"))),
    (QueryType::Goal, insights("overview", Some("goal-progress"))),
    (QueryType::DailyTrend, insights("overview", Some("daily-trend"))),
    // Store
    (QueryType::StoreSummary, insights("store", None)),
    (QueryType::HourlyPattern, insights("store", Some("hourly-visitors"))),
    (QueryType::PeakTime, insights("store", Some("hourly-visitors"))),
    (QueryType::ZoneAnalysis, insights("store", Some("zone-performance"))),
    (QueryType::DwellTime, insights("store", Some("dwell-time"))),
    (QueryType::ZoneConversion, insights("store", Some("zone-performance"))),
    (QueryType::WeekdayPattern, insights("store", Some("weekday-pattern"))),
    (QueryType::Heatmap, insights("store", Some("store-heatmap"))),
    // Customer
    (QueryType::CustomerSegment, insights("customer", Some("customer-segments"))),
    (QueryType::NewVsReturning, insights("customer", Some("visitor-mix"))),
    (QueryType::ReturnRate, insights("customer", Some("visitor-mix"))),
    (QueryType::VisitFrequency, insights("customer", Some("visit-frequency"))),
    (QueryType::LoyalCustomers, insights("customer", Some("customer-segments"))),
    (QueryType::SegmentAvgBasket, insights("customer", Some("customer-segments"))),
    (QueryType::CustomerTrend, insights("customer", Some("customer-trend"))),
    // Product
    (QueryType::Product, insights("product", Some("product-performance"))),
    (QueryType::CategoryAnalysis, insights("product", Some("category-performance"))),
    (QueryType::TopProducts, insights("product", Some("product-ranking"))),
    (QueryType::BottomProducts, insights("product", Some("product-ranking"))),
    (QueryType::UnitsSold, insights("product", Some("product-performance"))),
    (QueryType::ProductTrend, insights("product", Some("product-trend"))),
    // Inventory
    (QueryType::Inventory, insights("inventory", None)),
    (QueryType::StockLevel, insights("inventory", Some("stock-levels"))),
    (QueryType::LowStock, insights("inventory", Some("stock-alerts"))),
    (QueryType::Overstock, insights("inventory", Some("stock-alerts"))),
    (QueryType::Stockout, insights("inventory", Some("stock-alerts"))),
    (QueryType::InventoryTurnover, insights("inventory", Some("inventory-turnover"))),
    (QueryType::StockMovement, insights("inventory", Some("stock-movement"))),
    (QueryType::ReorderSuggestion, insights("inventory", Some("reorder"))),
    // Prediction
    (QueryType::PredictionSummary, insights("prediction", None)),
    (QueryType::RevenueForecast, insights("prediction", Some("revenue-forecast"))),
    (QueryType::VisitorForecast, insights("prediction", Some("visitor-forecast"))),
    (QueryType::DemandForecast, insights("prediction", Some("demand-forecast"))),
    (QueryType::ConversionForecast, insights("prediction", Some("conversion-forecast"))),
    // AI recommendation
    (QueryType::AiRecommendation, insights("ai", None)),
    (QueryType::LayoutRecommendation, insights("ai", Some("layout-recommendation"))),
    (QueryType::StaffingRecommendation, insights("ai", Some("staffing-recommendation"))),
    (QueryType::PromotionRecommendation, insights("ai", Some("promotion-recommendation"))),
    (QueryType::InventoryRecommendation, insights("ai", Some("inventory-recommendation"))),
    (QueryType::PriceOptimization, insights("ai", Some("price-optimization"))),
    // ROI
    (QueryType::RoiSummary, at(ROI, None, Some("roi-summary"))),
    (QueryType::RoiByStrategy, at(ROI, None, Some("strategy-performance"))),
    (QueryType::AppliedStrategies, at(ROI, None, Some("applied-strategies"))),
    (QueryType::RoiTrend, at(ROI, None, Some("roi-trend"))),
    (QueryType::StrategyDetail, at(ROI, None, Some("strategy-detail"))),
    // Settings
    (QueryType::StoreSettings, at(SETTINGS, Some("stores"), None)),
    (QueryType::DataSources, at(SETTINGS, Some("data"), Some("data-sources"))),
    (QueryType::ImportHistory, at(SETTINGS, Some("data"), Some("import-history"))),
    (QueryType::ApiConnections, at(SETTINGS, Some("data"), Some("api-connections"))),
    (QueryType::UserManagement, at(SETTINGS, Some("users"), None)),
    (QueryType::SystemSettings, at(SETTINGS, Some("system"), None)),
    (QueryType::LicenseInfo, at(SETTINGS, Some("license"), None)),
    // Studio
    (QueryType::StudioLayout, at(STUDIO, Some("layer"), None)),
    (QueryType::SimulationResult, at(STUDIO, Some("simulation"), Some("simulation-results"))),
    (QueryType::OptimizationResult, at(STUDIO, Some("optimization"), Some("optimization-results"))),
    (QueryType::OverlayView, at(STUDIO, Some("overlay"), None)),
    // Data control tower
    (QueryType::DataQuality, at(DATA_CONTROL, Some("quality"), Some("quality-score"))),
    (QueryType::DataSourceStatus, at(DATA_CONTROL, Some("sources"), Some("source-status"))),
    (QueryType::RecentImports, at(DATA_CONTROL, Some("sources"), Some("recent-imports"))),
    (QueryType::PipelineStatus, at(DATA_CONTROL, Some("pipeline"), Some("pipeline-status"))),
    (QueryType::DataLineage, at(DATA_CONTROL, Some("lineage"), Some("lineage-graph"))),
];

const SUMMARY_TARGET: NavTarget = insights("overview", None);

/// Look up a query type's destination; unknown types land on the summary entry
pub fn target_for(query_type: QueryType) -> NavTarget {
    QUERY_TYPE_TO_TAB
        .iter()
        .find(|(qt, _)| *qt == query_type)
        .map(|(_, target)| *target)
        .unwrap_or(SUMMARY_TARGET)
}

/// Look up by wire name, falling back to the summary entry
pub fn target_for_name(name: &str) -> NavTarget {
    QueryType::parse(name)
        .map(target_for)
        .unwrap_or(SUMMARY_TARGET)
}

pub fn page(path: &str) -> Option<&'static PageDef> {
    PAGES.iter().find(|p| p.path == path)
}

pub fn page_label(path: &str) -> &str {
    page(path).map(|p| p.label).unwrap_or(path)
}

pub fn tab_label<'a>(path: &str, tab: &'a str) -> &'a str {
    page(path)
        .and_then(|p| p.tab_labels.iter().find(|(id, _)| *id == tab))
        .map(|(_, label)| *label)
        .unwrap_or(tab)
}

/// Human label of where a target lives, e.g. "인사이트 허브 > 고객"
pub fn target_label(target: &NavTarget) -> String {
    match target.tab {
        Some(tab) => format!("{} > {}", page_label(target.page), tab_label(target.page, tab)),
        None => page_label(target.page).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_query_type_has_exactly_one_entry() {
        for qt in QueryType::ALL {
            let count = QUERY_TYPE_TO_TAB.iter().filter(|(q, _)| q == qt).count();
            assert_eq!(count, 1, "{} mapped {} times", qt, count);
        }
        assert_eq!(QUERY_TYPE_TO_TAB.len(), QueryType::ALL.len());
    }

    #[test]
    fn test_targets_reference_known_pages_and_tabs() {
        for (qt, target) in QUERY_TYPE_TO_TAB {
            let page = page(target.page).unwrap_or_else(|| panic!("{qt}: unknown page"));
            if let Some(tab) = target.tab {
                assert!(
                    page.tab_labels.iter().any(|(id, _)| *id == tab),
                    "{qt}: unknown tab {tab}"
                );
            }
        }
    }

    #[test]
    fn test_tab_keywords_point_at_labelled_tabs() {
        for page in PAGES {
            let labelled: HashSet<_> = page.tab_labels.iter().map(|(id, _)| *id).collect();
            for (kw, tab) in page.tab_keywords {
                assert!(labelled.contains(tab), "{}: {kw} -> {tab}", page.path);
                assert_eq!(*kw, crate::extraction::compact(kw), "keyword not compacted");
            }
        }
    }

    #[test]
    fn test_unknown_name_defaults_to_summary() {
        assert_eq!(target_for_name("nonsense"), target_for(QueryType::Summary));
    }

    #[test]
    fn test_target_label() {
        let target = target_for(QueryType::CustomerSegment);
        assert_eq!(target_label(&target), "인사이트 허브 > 고객");
        assert_eq!(target_label(&target_for(QueryType::RoiSummary)), "ROI 측정");
    }
}
