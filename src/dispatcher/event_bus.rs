//! Typed event bus
//!
//! Actions the dispatcher does not execute itself are published here under
//! a closed set of event names. Components that own a concern (simulation,
//! layers, tables) subscribe independently.

use assistant_types::{DateRange, UiAction};
use tokio::sync::broadcast;

const BUS_CAPACITY: usize = 64;

pub const DATE_RANGE_CHANGED: &str = "date-range-changed";

/// Something the assistant asked the UI to do
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantEvent {
    /// The global date filter moved; page-local filters resync on this
    DateRangeChanged {
        range: DateRange,
        preset: Option<String>,
    },
    /// Forwarded action payload
    Action(UiAction),
}

impl AssistantEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DateRangeChanged { .. } => DATE_RANGE_CHANGED,
            Self::Action(action) => event_name(action),
        }
    }
}

/// Event name an action is published under
pub fn event_name(action: &UiAction) -> &'static str {
    match action {
        UiAction::Navigate { .. } => "assistant:navigate",
        UiAction::SetTab { .. } => "assistant:set-tab",
        UiAction::SetDateRange { .. } => DATE_RANGE_CHANGED,
        UiAction::ScrollToSection { .. } => "assistant:scroll-to-section",
        UiAction::OpenModal { .. } => "assistant:open-modal",
        UiAction::OpenDialog { .. } => "assistant:open-dialog",
        UiAction::HighlightElement { .. } => "assistant:highlight-element",
        UiAction::ShowTooltip { .. } => "assistant:show-tooltip",
        UiAction::RunSimulation { .. } => "assistant:run-simulation",
        UiAction::RunOptimization { .. } => "assistant:run-optimization",
        UiAction::SetFilter { .. } => "assistant:set-filter",
        UiAction::TriggerExport { .. } => "assistant:trigger-export",
        UiAction::SetTablePage { .. } => "assistant:set-table-page",
        UiAction::ToggleLayer { .. } => "studio:toggle-layer",
        UiAction::ToggleOverlay { .. } => "studio:toggle-overlay",
        UiAction::SetSimulationSpeed { .. } => "studio:set-simulation-speed",
        UiAction::PauseSimulation => "studio:pause-simulation",
        UiAction::ResumeSimulation => "studio:resume-simulation",
        UiAction::StopSimulation => "studio:stop-simulation",
        UiAction::ResetCamera => "studio:reset-camera",
        UiAction::ApplyOptimization { .. } => "studio:apply-optimization",
    }
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AssistantEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AssistantEvent> {
        self.sender.subscribe()
    }

    /// Publish to current subscribers. Returns how many received it; zero
    /// listeners is not an error.
    pub fn publish(&self, event: AssistantEvent) -> usize {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::debug!(event = name, "No subscribers for event");
                0
            }
        }
    }
}
