//! UI action vocabulary
//!
//! Actions are transient command objects: the orchestrator produces them
//! once, the client dispatcher consumes them once, in order.

use serde::{Deserialize, Serialize};

use crate::DateRange;

/// Default highlight duration for scroll targets, in milliseconds
pub const DEFAULT_HIGHLIGHT_MS: u64 = 2000;

/// Status/source filter applied to a data table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFilter {
    pub field: String,
    pub value: String,
}

/// A structured command telling the client what to do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum UiAction {
    /// Route change; `target` may carry `?tab=`
    Navigate { target: String },
    /// Query-param tab change on the current page
    SetTab { target: String },
    SetDateRange {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        preset: Option<String>,
        #[serde(flatten)]
        range: DateRange,
    },
    ScrollToSection {
        section_id: String,
        highlight: bool,
        highlight_duration: u64,
    },
    OpenModal { modal_id: String },
    OpenDialog { dialog_id: String },
    HighlightElement { element_id: String, duration: u64 },
    ShowTooltip {
        element_id: String,
        message: String,
        duration: u64,
    },
    RunSimulation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scenario: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_minutes: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        customer_count: Option<u32>,
    },
    RunOptimization { optimization_type: String },
    SetFilter {
        target: String,
        #[serde(flatten)]
        filter: TableFilter,
    },
    TriggerExport { target: String, format: String },
    SetTablePage { target: String, page: u32 },
    // Studio control
    ToggleLayer {
        layer: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        visible: Option<bool>,
    },
    ToggleOverlay {
        overlay: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        visible: Option<bool>,
    },
    SetSimulationSpeed { speed: f32 },
    PauseSimulation,
    ResumeSimulation,
    StopSimulation,
    ResetCamera,
    ApplyOptimization {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        optimization_id: Option<String>,
    },
}

impl UiAction {
    /// Wire name of the action type
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Navigate { .. } => "navigate",
            Self::SetTab { .. } => "set_tab",
            Self::SetDateRange { .. } => "set_date_range",
            Self::ScrollToSection { .. } => "scroll_to_section",
            Self::OpenModal { .. } => "open_modal",
            Self::OpenDialog { .. } => "open_dialog",
            Self::HighlightElement { .. } => "highlight_element",
            Self::ShowTooltip { .. } => "show_tooltip",
            Self::RunSimulation { .. } => "run_simulation",
            Self::RunOptimization { .. } => "run_optimization",
            Self::SetFilter { .. } => "set_filter",
            Self::TriggerExport { .. } => "trigger_export",
            Self::SetTablePage { .. } => "set_table_page",
            Self::ToggleLayer { .. } => "toggle_layer",
            Self::ToggleOverlay { .. } => "toggle_overlay",
            Self::SetSimulationSpeed { .. } => "set_simulation_speed",
            Self::PauseSimulation => "pause_simulation",
            Self::ResumeSimulation => "resume_simulation",
            Self::StopSimulation => "stop_simulation",
            Self::ResetCamera => "reset_camera",
            Self::ApplyOptimization { .. } => "apply_optimization",
        }
    }

    pub fn navigate(target: impl Into<String>) -> Self {
        Self::Navigate {
            target: target.into(),
        }
    }

    pub fn set_tab(target: impl Into<String>) -> Self {
        Self::SetTab {
            target: target.into(),
        }
    }

    pub fn set_date_range(range: DateRange, preset: Option<String>) -> Self {
        Self::SetDateRange { preset, range }
    }

    /// Scroll with the standard highlight
    pub fn scroll_to(section_id: impl Into<String>) -> Self {
        Self::ScrollToSection {
            section_id: section_id.into(),
            highlight: true,
            highlight_duration: DEFAULT_HIGHLIGHT_MS,
        }
    }

    pub fn open_modal(modal_id: impl Into<String>) -> Self {
        Self::OpenModal {
            modal_id: modal_id.into(),
        }
    }

    /// Whether this action moves the user to another page or tab
    pub fn is_navigation(&self) -> bool {
        matches!(self, Self::Navigate { .. } | Self::SetTab { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_scroll_wire_shape() {
        let value = serde_json::to_value(UiAction::scroll_to("hourly-visitors")).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "scroll_to_section",
                "sectionId": "hourly-visitors",
                "highlight": true,
                "highlightDuration": 2000
            })
        );
    }

    #[test]
    fn test_set_date_range_flattens_range() {
        let day = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let action = UiAction::set_date_range(DateRange::single_day(day), Some("today".into()));
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["type"], "set_date_range");
        assert_eq!(value["preset"], "today");
        assert_eq!(value["startDate"], "2024-12-01");
        assert_eq!(value["endDate"], "2024-12-01");

        let back: UiAction = serde_json::from_value(value).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn test_unit_variants_carry_only_type() {
        let value = serde_json::to_value(UiAction::ResetCamera).unwrap();
        assert_eq!(value, json!({"type": "reset_camera"}));
    }

    #[test]
    fn test_set_filter_shape() {
        let action = UiAction::SetFilter {
            target: "import-history".into(),
            filter: TableFilter {
                field: "status".into(),
                value: "failed".into(),
            },
        };
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["field"], "status");
        assert_eq!(value["value"], "failed");
        assert_eq!(action.kind(), "set_filter");
    }
}
