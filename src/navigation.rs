//! Navigation action builder
//!
//! Turns a resolved query type into the UI actions that bring its answer on
//! screen. Order is fixed: navigation, then the date range, then the
//! scroll, because the client executes them one by one and a section can
//! only be scrolled to once its page has rendered.

use assistant_types::{DateRange, PageContext, QueryType, UiAction};

use crate::dictionary::{self, NavTarget};

/// Actions plus whether they move the user
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationPlan {
    pub actions: Vec<UiAction>,
    /// Page or tab differs from where the user is
    pub tab_changed: bool,
    pub target_tab: Option<&'static str>,
    pub target_page: &'static str,
}

impl NavigationPlan {
    pub fn into_actions(self) -> Vec<UiAction> {
        self.actions
    }
}

/// Actions for answering `query_type` over `date_range`, given where the
/// user is now. Pure: same inputs, same actions.
pub fn create_navigation_actions(
    query_type: QueryType,
    date_range: &DateRange,
    page: &PageContext,
) -> NavigationPlan {
    let target = dictionary::target_for(query_type);
    let mut plan = navigate_to(&target, page);

    plan.actions.push(UiAction::set_date_range(*date_range, None));
    if let Some(section) = target.section {
        plan.actions.push(UiAction::scroll_to(section));
    }
    plan
}

/// At most one navigation action: `navigate` (with `?tab=` when the
/// target has a tab), `set_tab` when only the tab differs, or nothing.
pub fn navigate_to(target: &NavTarget, page: &PageContext) -> NavigationPlan {
    let page_needs_change = page.current != target.page;
    let tab_needs_change = match target.tab {
        Some(tab) => page.tab.as_deref() != Some(tab),
        None => false,
    };

    let mut actions = Vec::with_capacity(3);
    if page_needs_change {
        let destination = match target.tab {
            Some(tab) => format!("{}?tab={}", target.page, tab),
            None => target.page.to_string(),
        };
        actions.push(UiAction::navigate(destination));
    } else if tab_needs_change {
        if let Some(tab) = target.tab {
            actions.push(UiAction::set_tab(tab));
        }
    }

    NavigationPlan {
        actions,
        tab_changed: page_needs_change || tab_needs_change,
        target_tab: target.tab,
        target_page: target.page,
    }
}

/// Framing sentence appended to a handler message when the view moved
pub fn framing_text(plan: &NavigationPlan) -> Option<String> {
    if !plan.tab_changed {
        return None;
    }
    let target = NavTarget {
        page: plan.target_page,
        tab: plan.target_tab,
        section: None,
    };
    Some(format!(
        "{} 화면으로 이동해서 자세한 내용을 보여드릴게요.",
        dictionary::target_label(&target)
    ))
}
