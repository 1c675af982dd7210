//! Property tests over extraction, navigation and the disambiguation gate

use assistant_types::{
    ClassificationResult, DateRange, Entities, Intent, PageContext, QueryType, UiAction,
};
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use neuraltwin_assistant::classifier::{classify, ClassifierContext, EmptyCatalog};
use neuraltwin_assistant::create_navigation_actions;
use neuraltwin_assistant::dictionary::PAGES;
use neuraltwin_assistant::disambiguation::{disambiguate, DISAMBIGUATION_THRESHOLD};
use neuraltwin_assistant::extraction::{extract_date_range, extract_hour, extract_tab, DatePreset};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 18).unwrap()
}

fn page_after(actions: &[UiAction], mut page: PageContext) -> PageContext {
    for action in actions {
        match action {
            UiAction::Navigate { target } => {
                page = match target.split_once("?tab=") {
                    Some((path, tab)) => PageContext::with_tab(path, tab),
                    None => PageContext::new(target.as_str()),
                };
            }
            UiAction::SetTab { target } => page.tab = Some(target.clone()),
            _ => {}
        }
    }
    page
}

fn any_query_type() -> impl Strategy<Value = QueryType> {
    proptest::sample::select(QueryType::ALL.to_vec())
}

fn any_page() -> impl Strategy<Value = PageContext> {
    let pages: Vec<PageContext> = PAGES
        .iter()
        .flat_map(|p| {
            std::iter::once(PageContext::new(p.path))
                .chain(p.tab_labels.iter().map(|(tab, _)| PageContext::with_tab(p.path, *tab)))
        })
        .collect();
    proptest::sample::select(pages)
}

fn tab_keyword() -> impl Strategy<Value = (&'static str, &'static str)> {
    let pairs: Vec<(&'static str, &'static str)> = PAGES
        .iter()
        .flat_map(|p| p.tab_keywords.iter().map(move |(kw, _)| (p.path, *kw)))
        .collect();
    proptest::sample::select(pairs)
}

proptest! {
    #[test]
    fn explicit_korean_range_round_trips(offset in 0i64..330, len in 0i64..60) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset);
        let end = start + Duration::days(len);
        let text = format!(
            "{}월 {}일부터 {}월 {}일까지 매출",
            start.format("%-m"),
            start.format("%-d"),
            end.format("%-m"),
            end.format("%-d"),
        );

        let found = extract_date_range(&text, today()).unwrap();
        prop_assert_eq!(found.start, start);
        prop_assert_eq!(found.end, end);
        prop_assert!(found.preset.is_none());
    }

    #[test]
    fn presets_end_by_today_and_parse_back(preset in proptest::sample::select(DatePreset::ALL.to_vec()), back in 0i64..800) {
        let today = today() - Duration::days(back);
        let (start, end) = preset.resolve(today);
        prop_assert!(start <= end);
        prop_assert!(end <= today);
        prop_assert_eq!(DatePreset::parse(preset.as_str()), Some(preset));
    }

    #[test]
    fn tab_keyword_stays_on_current_page((path, keyword) in tab_keyword()) {
        let found = extract_tab(&format!("{keyword} 탭 보여줘"), Some(path)).unwrap();
        prop_assert_eq!(found.page, path);
    }

    #[test]
    fn meridiem_hour_wins_over_date(month in 1u32..=12, day in 1u32..=28, h in 1u8..=11) {
        let text = format!("{month}월 {day}일 오후 {h}시 방문객");
        prop_assert_eq!(extract_hour(&text), Some(h + 12));

        let bare = format!("{month}월 {day}일 {h}시 방문객");
        prop_assert_eq!(extract_hour(&bare), Some(h));
    }

    #[test]
    fn hour_traffic_question_is_hourly_on_every_page(h in 1u8..=11, page in any_page()) {
        let text = format!("오후 {h}시 고객 몇명 보여줘");
        let ctx = ClassifierContext { page: &page, today: today() };
        let result = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(classify(&text, &ctx, &EmptyCatalog));

        prop_assert_eq!(result.intent, Intent::QueryKpi);
        prop_assert_eq!(result.query_type(), Some(QueryType::HourlyPattern));
        prop_assert_eq!(result.entities.hour, Some(h + 12));
    }

    #[test]
    fn navigation_is_idempotent(query_type in any_query_type(), page in any_page()) {
        let range = DateRange::single_day(today());
        let first = create_navigation_actions(query_type, &range, &page);
        let arrived = page_after(&first.actions, page);

        let second = create_navigation_actions(query_type, &range, &arrived);
        prop_assert!(!second.tab_changed);
        prop_assert!(second
            .actions
            .iter()
            .all(|a| !matches!(a, UiAction::Navigate { .. } | UiAction::SetTab { .. })),
            "second navigation must not navigate or switch tabs");
        prop_assert_eq!(second.actions[0].kind(), "set_date_range");
    }

    #[test]
    fn disambiguation_fires_only_on_low_confidence_items(
        confidence in 0.0f32..=1.0,
        item in "[가-힣]{2,5}",
        product in any::<bool>(),
    ) {
        let query_type = if product { QueryType::Product } else { QueryType::CategoryAnalysis };
        let entities = Entities {
            query_type: Some(query_type),
            item_filter: vec![item.clone()],
            ..Entities::default()
        };
        let result = ClassificationResult::new(Intent::QueryKpi, entities, confidence);

        match disambiguate(&result) {
            Some(answer) => {
                prop_assert!(confidence <= DISAMBIGUATION_THRESHOLD);
                prop_assert!(answer.actions.is_empty());
                prop_assert!(answer.message.contains(&item));
            }
            None => prop_assert!(confidence > DISAMBIGUATION_THRESHOLD),
        }
    }

    #[test]
    fn confident_or_itemless_readings_pass_through(query_type in any_query_type(), confidence in 0.0f32..=1.0) {
        let entities = Entities {
            query_type: Some(query_type),
            ..Entities::default()
        };
        let result = ClassificationResult::new(Intent::QueryKpi, entities, confidence);
        prop_assert!(disambiguate(&result).is_none());
    }
}
