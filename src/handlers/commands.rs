//! Non-query intents
//!
//! Navigation, date changes, modals, table commands and studio controls are
//! answered without touching KPI data. Each turns the classified entities
//! into UI actions, moving the user first when the command only makes
//! sense on another page.

use assistant_types::{
    ClassificationResult, DateRange, Entities, Intent, PageContext, QueryActionResult, UiAction,
};

use crate::classifier::{DATA_IMPORT_MODAL, GOAL_SETTINGS_MODAL};
use crate::dictionary::{self, NavTarget, DATA_CONTROL, SETTINGS, STUDIO};
use crate::extraction::{describe_range, DatePreset};
use crate::navigation::navigate_to;

const NAVIGATION_SUGGESTIONS: &[&str] = &["오늘 매출 알려줘", "방문객 현황 보여줘", "인기 상품은?"];
const STUDIO_SUGGESTIONS: &[&str] = &["시뮬레이션 일시정지", "히트맵 오버레이 켜줘", "카메라 초기화"];
const TABLE_SUGGESTIONS: &[&str] = &["실패한 항목만 보여줘", "엑셀로 내보내줘", "다음 페이지 보여줘"];

/// Inputs for a command turn
pub struct CommandContext<'a> {
    pub page: &'a PageContext,
    /// Range resolved for the turn
    pub date_range: DateRange,
    /// Preset the range came from, when it came from one
    pub preset: Option<DatePreset>,
}

pub fn handle(
    classification: &ClassificationResult,
    ctx: &CommandContext<'_>,
) -> QueryActionResult {
    let entities = &classification.entities;
    match classification.intent {
        Intent::Navigate | Intent::SetTab => {
            let Some(target) = entity_target(entities, ctx.page) else {
                return unresolved();
            };
            let plan = navigate_to(&target, ctx.page);
            let label = dictionary::target_label(&target);
            let message = if plan.tab_changed {
                format!("{label} 화면으로 이동할게요.")
            } else {
                format!("이미 {label} 화면에 있어요.")
            };
            QueryActionResult::new(plan.into_actions(), message)
                .with_suggestions(NAVIGATION_SUGGESTIONS.iter().copied())
        }
        Intent::CompositeNavigate => {
            let Some(target) = entity_target(entities, ctx.page) else {
                return unresolved();
            };
            let mut actions = navigate_to(&target, ctx.page).into_actions();
            actions.push(date_action(ctx));
            let message = format!(
                "{} 화면으로 이동해서 기간을 {}(으)로 설정할게요.",
                dictionary::target_label(&target),
                describe_range(&ctx.date_range, ctx.preset)
            );
            QueryActionResult::new(actions, message)
                .with_suggestions(NAVIGATION_SUGGESTIONS.iter().copied())
        }
        Intent::SetDateRange => QueryActionResult::new(
            vec![date_action(ctx)],
            format!(
                "기간을 {}(으)로 변경했어요.",
                describe_range(&ctx.date_range, ctx.preset)
            ),
        )
        .with_suggestions(["이 기간 매출 알려줘", "이 기간 방문객은?"]),
        Intent::ScrollToSection => {
            let Some(query_type) = entities.query_type else {
                return unresolved();
            };
            let target = dictionary::target_for(query_type);
            let mut actions = navigate_to(&target, ctx.page).into_actions();
            if let Some(section) = entities.section.as_deref().or(target.section) {
                actions.push(UiAction::scroll_to(section));
            }
            let message = format!(
                "{} 영역으로 이동할게요.",
                dictionary::query_label(query_type)
            );
            QueryActionResult::new(actions, message)
                .with_suggestions(NAVIGATION_SUGGESTIONS.iter().copied())
        }
        Intent::OpenModal => open_modal(entities.modal_id.as_deref(), ctx.page),
        Intent::RunSimulation => {
            let mut actions = studio_tab(ctx.page, "simulation");
            actions.push(UiAction::RunSimulation {
                scenario: entities.scenario.clone(),
                duration_minutes: entities.duration_minutes,
                customer_count: entities.customer_count,
            });
            let mut message = "시뮬레이션을 시작할게요.".to_string();
            if let Some(count) = entities.customer_count {
                message.push_str(&format!(" 고객 {count}명"));
                if let Some(minutes) = entities.duration_minutes {
                    message.push_str(&format!(", {minutes}분"));
                }
                message.push_str(" 조건으로 실행합니다.");
            }
            QueryActionResult::new(actions, message)
                .with_suggestions(STUDIO_SUGGESTIONS.iter().copied())
        }
        Intent::RunOptimization => {
            let optimization_type = entities
                .optimization_type
                .clone()
                .unwrap_or_else(|| "layout".to_string());
            let label = optimization_label(&optimization_type);
            let mut actions = studio_tab(ctx.page, "optimization");
            actions.push(UiAction::RunOptimization { optimization_type });
            QueryActionResult::new(actions, format!("{label} 최적화를 실행할게요."))
                .with_suggestions(["최적화 결과 보여줘", "최적화 적용해줘"])
        }
        Intent::SetFilter => {
            let Some(filter) = entities.filter.clone() else {
                return unresolved();
            };
            let message = format!("'{}' 항목만 보이도록 필터를 적용했어요.", filter.value);
            let action = UiAction::SetFilter {
                target: table_target(ctx.page),
                filter,
            };
            QueryActionResult::new(vec![action], message)
                .with_suggestions(TABLE_SUGGESTIONS.iter().copied())
        }
        Intent::TriggerExport => {
            let format = entities
                .export_format
                .clone()
                .unwrap_or_else(|| "csv".to_string());
            let message = format!("{} 파일로 내보낼게요.", format.to_uppercase());
            let action = UiAction::TriggerExport {
                target: table_target(ctx.page),
                format,
            };
            QueryActionResult::new(vec![action], message)
                .with_suggestions(TABLE_SUGGESTIONS.iter().copied())
        }
        Intent::SetTablePage => {
            let page = entities.table_page.unwrap_or(1).max(1);
            let action = UiAction::SetTablePage {
                target: table_target(ctx.page),
                page,
            };
            QueryActionResult::new(vec![action], format!("{page}페이지로 이동할게요."))
                .with_suggestions(TABLE_SUGGESTIONS.iter().copied())
        }
        Intent::ToggleLayer
        | Intent::ToggleOverlay
        | Intent::SetSimulationSpeed
        | Intent::PauseSimulation
        | Intent::ResumeSimulation
        | Intent::StopSimulation
        | Intent::ResetCamera
        | Intent::ApplyOptimization => studio_control(classification, ctx.page),
        Intent::QueryKpi | Intent::GeneralChat => unresolved(),
    }
}

fn date_action(ctx: &CommandContext<'_>) -> UiAction {
    UiAction::set_date_range(ctx.date_range, ctx.preset.map(|p| p.as_str().to_string()))
}

/// Navigation target named by the entities; a bare tab stays on the
/// current page when that page has it
fn entity_target(entities: &Entities, current: &PageContext) -> Option<NavTarget> {
    let path = entities.page.as_deref().unwrap_or(current.current.as_str());
    let def = dictionary::page(path)?;
    let tab = match entities.tab.as_deref() {
        Some(tab) => def
            .tab_labels
            .iter()
            .find(|(id, _)| *id == tab)
            .map(|(id, _)| *id),
        None => None,
    };
    Some(NavTarget {
        page: def.path,
        tab,
        section: None,
    })
}

fn unresolved() -> QueryActionResult {
    QueryActionResult::new(
        Vec::new(),
        "요청하신 화면을 찾지 못했어요. 이동할 페이지나 탭 이름을 알려주세요.",
    )
    .with_suggestions(["인사이트 고객 탭으로 이동", "ROI 페이지 열어줘", "설정 화면 보여줘"])
}

fn open_modal(modal_id: Option<&str>, page: &PageContext) -> QueryActionResult {
    match modal_id {
        Some(GOAL_SETTINGS_MODAL) => QueryActionResult::new(
            vec![UiAction::open_modal(GOAL_SETTINGS_MODAL)],
            "목표 설정 창을 열게요.",
        )
        .with_suggestions(["이번달 목표 달성률은?", "매출 현황 보여줘"]),
        Some(DATA_IMPORT_MODAL) => {
            let target = NavTarget {
                page: SETTINGS,
                tab: Some("data"),
                section: None,
            };
            let mut actions = if page.current == SETTINGS || page.current == DATA_CONTROL {
                Vec::new()
            } else {
                navigate_to(&target, page).into_actions()
            };
            actions.push(UiAction::open_modal(DATA_IMPORT_MODAL));
            QueryActionResult::new(actions, "데이터 가져오기 창을 열게요.")
                .with_suggestions(["최근 import 내역 보여줘", "연결된 데이터 소스는?"])
        }
        Some(other) => {
            QueryActionResult::new(vec![UiAction::open_modal(other)], "요청하신 창을 열게요.")
                .with_suggestions(NAVIGATION_SUGGESTIONS.iter().copied())
        }
        None => unresolved(),
    }
}

/// Move to a studio tab unless already there
fn studio_tab(page: &PageContext, tab: &'static str) -> Vec<UiAction> {
    let target = NavTarget {
        page: STUDIO,
        tab: Some(tab),
        section: None,
    };
    navigate_to(&target, page).into_actions()
}

fn optimization_label(kind: &str) -> &'static str {
    match kind {
        "staffing" => "인력 배치",
        "merchandising" => "상품 진열",
        _ => "레이아웃",
    }
}

/// Table a filter/export/page command applies to on the current view
fn table_target(page: &PageContext) -> String {
    match (page.current.as_str(), page.tab.as_deref()) {
        (SETTINGS, Some("data")) => "import-history".to_string(),
        (DATA_CONTROL, _) => "recent-imports".to_string(),
        (path, Some(tab)) => format!("{}-{}", path.trim_start_matches('/'), tab),
        (path, None) => path.trim_start_matches('/').to_string(),
    }
}

// ============================================================================
// STUDIO CONTROLS
// ============================================================================

fn studio_control(classification: &ClassificationResult, page: &PageContext) -> QueryActionResult {
    let entities = &classification.entities;
    let shown = |visible: Option<bool>| {
        if visible == Some(false) {
            "껐어요"
        } else {
            "켰어요"
        }
    };

    let (action, message) = match classification.intent {
        Intent::ToggleLayer => {
            let layer = entities.layer.clone().unwrap_or_default();
            let message = format!("{layer} 레이어를 {}.", shown(entities.visible));
            (
                UiAction::ToggleLayer {
                    layer,
                    visible: entities.visible,
                },
                message,
            )
        }
        Intent::ToggleOverlay => {
            let overlay = entities.layer.clone().unwrap_or_else(|| "default".to_string());
            let message = format!("{overlay} 오버레이를 {}.", shown(entities.visible));
            (
                UiAction::ToggleOverlay {
                    overlay,
                    visible: entities.visible,
                },
                message,
            )
        }
        Intent::SetSimulationSpeed => {
            let speed = entities.speed.unwrap_or(1.0);
            (
                UiAction::SetSimulationSpeed { speed },
                format!("시뮬레이션 속도를 {speed}배로 설정했어요."),
            )
        }
        Intent::PauseSimulation => (
            UiAction::PauseSimulation,
            "시뮬레이션을 일시정지했어요.".to_string(),
        ),
        Intent::ResumeSimulation => (
            UiAction::ResumeSimulation,
            "시뮬레이션을 재개했어요.".to_string(),
        ),
        Intent::StopSimulation => (UiAction::StopSimulation, "시뮬레이션을 중지했어요.".to_string()),
        Intent::ResetCamera => (UiAction::ResetCamera, "카메라 시점을 초기화했어요.".to_string()),
        _ => (
            UiAction::ApplyOptimization {
                optimization_id: None,
            },
            "최적화 결과를 매장에 적용할게요.".to_string(),
        ),
    };

    let mut actions = if page.current == STUDIO {
        Vec::new()
    } else {
        vec![UiAction::navigate(STUDIO)]
    };
    actions.push(action);
    QueryActionResult::new(actions, message).with_suggestions(STUDIO_SUGGESTIONS.iter().copied())
}
