//! Static term lists shared by the classifier, handlers and the chatbot

use assistant_types::QueryType;

/// Product categories known without a catalog lookup
pub static KNOWN_CATEGORIES: &[&str] = &[
    "아우터",
    "상의",
    "하의",
    "신발",
    "액세서리",
    "가방",
    "니트",
    "셔츠",
    "바지",
    "원피스",
    "스커트",
    "티셔츠",
];

/// Store zone names
pub static KNOWN_ZONES: &[&str] = &[
    "입구",
    "계산대",
    "피팅룸",
    "메인홀",
    "창가",
    "진열대",
    "매대",
    "휴게공간",
    "카운터",
];

/// Customer segment names
pub static KNOWN_SEGMENTS: &[&str] = &["VIP", "신규", "충성", "일반", "휴면", "이탈 위험"];

/// Words that never name a product or category
pub static STOP_WORDS: &[&str] = &[
    "매장", "전체", "총", "우리", "가게", "알려줘", "알려", "보여줘", "보여", "얼마", "어때",
    "어떻게", "어떤", "뭐야", "뭐", "좀", "데이터", "현황", "분석", "정보", "확인", "판매량",
    "판매", "매출", "몇개", "몇", "개", "팔린", "실적", "성과", "분포", "비중", "상품", "제품",
    "카테고리", "해줘", "줘", "지금", "요즘", "기간", "동안", "중", "중에", "가장", "제일",
];

/// Date words dropped from catalog candidate terms
pub static DATE_WORDS: &[&str] = &[
    "오늘", "어제", "그제", "그저께", "이번주", "지난주", "이번달", "지난달", "이번", "지난",
    "최근", "올해", "작년", "연말", "연초", "주간", "월간", "부터", "까지", "초", "중순", "말",
];

/// Korean label of a query type, used in messages and suggestions
pub fn query_label(query_type: QueryType) -> &'static str {
    use QueryType::*;
    match query_type {
        Summary => "전체 현황",
        Revenue => "매출",
        Visitors => "방문객",
        Conversion => "전환율",
        AvgBasket => "객단가",
        Transactions => "거래 건수",
        UniqueVisitors => "순 방문객",
        RevisitRate => "재방문율",
        SalesPerArea => "평당 매출",
        Funnel => "전환 퍼널",
        Goal => "목표 달성률",
        DailyTrend => "일별 추이",
        StoreSummary => "매장 현황",
        HourlyPattern => "시간대별 방문",
        PeakTime => "피크 시간",
        ZoneAnalysis => "존 분석",
        DwellTime => "체류 시간",
        ZoneConversion => "존별 전환율",
        WeekdayPattern => "요일별 패턴",
        Heatmap => "히트맵",
        CustomerSegment => "고객 세그먼트",
        NewVsReturning => "신규/재방문 고객",
        ReturnRate => "재방문 고객 비율",
        VisitFrequency => "방문 빈도",
        LoyalCustomers => "충성 고객",
        SegmentAvgBasket => "세그먼트별 객단가",
        CustomerTrend => "고객 추이",
        Product => "상품 실적",
        CategoryAnalysis => "카테고리 분석",
        TopProducts => "인기 상품",
        BottomProducts => "부진 상품",
        UnitsSold => "판매 수량",
        ProductTrend => "상품 추이",
        Inventory => "재고 현황",
        StockLevel => "재고 수준",
        LowStock => "재고 부족",
        Overstock => "과잉 재고",
        Stockout => "품절",
        InventoryTurnover => "재고 회전율",
        StockMovement => "입출고 내역",
        ReorderSuggestion => "발주 제안",
        PredictionSummary => "예측 요약",
        RevenueForecast => "매출 예측",
        VisitorForecast => "방문객 예측",
        DemandForecast => "수요 예측",
        ConversionForecast => "전환율 예측",
        AiRecommendation => "AI 추천",
        LayoutRecommendation => "레이아웃 추천",
        StaffingRecommendation => "인력 배치 추천",
        PromotionRecommendation => "프로모션 추천",
        InventoryRecommendation => "재고 추천",
        PriceOptimization => "가격 최적화",
        RoiSummary => "ROI 요약",
        RoiByStrategy => "전략별 ROI",
        AppliedStrategies => "적용 전략",
        RoiTrend => "ROI 추이",
        StrategyDetail => "전략 상세",
        StoreSettings => "매장 설정",
        DataSources => "데이터 소스",
        ImportHistory => "임포트 이력",
        ApiConnections => "API 연동",
        UserManagement => "사용자 관리",
        SystemSettings => "시스템 설정",
        LicenseInfo => "플랜 정보",
        StudioLayout => "레이아웃",
        SimulationResult => "시뮬레이션 결과",
        OptimizationResult => "최적화 결과",
        OverlayView => "데이터 오버레이",
        DataQuality => "데이터 품질",
        DataSourceStatus => "데이터 소스 상태",
        RecentImports => "최근 임포트",
        PipelineStatus => "파이프라인 상태",
        DataLineage => "데이터 리니지",
    }
}

/// Known terms found in `text`, in mention order. A term nested inside a
/// longer hit ("셔츠" in "티셔츠") is not reported separately.
pub fn mentioned<'a>(text: &str, terms: &'a [&'a str]) -> Vec<&'a str> {
    let compact_text = crate::extraction::compact(text);
    let mut hits: Vec<(usize, usize, &str)> = terms
        .iter()
        .filter_map(|term| {
            let needle = crate::extraction::compact(term);
            compact_text
                .find(&needle)
                .map(|pos| (pos, pos + needle.len(), *term))
        })
        .collect();
    hits.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut covered_until = 0;
    let mut result = Vec::with_capacity(hits.len());
    for (start, end, term) in hits {
        if start < covered_until && end <= covered_until {
            continue;
        }
        covered_until = covered_until.max(end);
        result.push(term);
    }
    result
}
