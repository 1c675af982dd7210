//! Client-side action dispatcher
//!
//! Executes the actions of one assistant reply in order. Each action is
//! awaited and followed by the settle pause before the next starts, since
//! later actions (scrolling, highlighting) need the view an earlier one
//! (navigation) produced.
//!
//! - `navigate` / `set_tab`: `UiHost`
//! - `set_date_range`: `DateFilterStore` plus a `date-range-changed` event
//! - `scroll_to_section` / `highlight_element`: element lookup and a timed
//!   highlight class; a missing element is skipped with a warning
//! - everything else: published on the `EventBus`

pub mod client;
pub mod date_filter;
pub mod event_bus;
pub mod host;
pub mod settle;

pub use client::{
    AssistantClient, AssistantTransport, HttpTransport, SendOutcome, TranscriptEntry, APOLOGY_MESSAGE,
};
pub use date_filter::{DateFilter, DateFilterStore};
pub use event_bus::{event_name, AssistantEvent, EventBus, DATE_RANGE_CHANGED};
pub use host::{ElementKind, ScrollBlock, UiElement, UiHost, HIGHLIGHT_CLASS};
pub use settle::{FixedDelay, Immediate, SettleStrategy, DEFAULT_SETTLE_DELAY};

use std::sync::Arc;
use std::time::Duration;

use assistant_types::UiAction;

/// What a dispatch run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Actions handled, in order
    pub executed: Vec<&'static str>,
    /// Actions forwarded to the event bus
    pub published: usize,
    /// Scroll/highlight targets that were not found
    pub missing_elements: Vec<String>,
}

pub struct ActionDispatcher {
    host: Arc<dyn UiHost>,
    dates: DateFilterStore,
    bus: EventBus,
    settle: Arc<dyn SettleStrategy>,
}

impl ActionDispatcher {
    pub fn new(host: Arc<dyn UiHost>, dates: DateFilterStore, bus: EventBus) -> Self {
        Self {
            host,
            dates,
            bus,
            settle: Arc::new(FixedDelay::default()),
        }
    }

    pub fn with_settle(mut self, settle: Arc<dyn SettleStrategy>) -> Self {
        self.settle = settle;
        self
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn dates(&self) -> &DateFilterStore {
        &self.dates
    }

    /// Run `actions` strictly one after another
    pub async fn dispatch_actions(&self, actions: &[UiAction]) -> DispatchReport {
        let mut report = DispatchReport::default();
        for (i, action) in actions.iter().enumerate() {
            self.execute(action, &mut report).await;
            report.executed.push(action.kind());
            if i + 1 < actions.len() {
                self.settle.settle(action).await;
            }
        }
        report
    }

    async fn execute(&self, action: &UiAction, report: &mut DispatchReport) {
        tracing::debug!(action = action.kind(), "Dispatching action");
        match action {
            UiAction::Navigate { target } => self.host.navigate(target).await,
            UiAction::SetTab { target } => self.host.set_query_param("tab", target).await,
            UiAction::SetDateRange { preset, range } => {
                self.dates.set(*range, preset.clone());
                self.bus.publish(AssistantEvent::DateRangeChanged {
                    range: *range,
                    preset: preset.clone(),
                });
            }
            UiAction::ScrollToSection {
                section_id,
                highlight,
                highlight_duration,
            } => {
                let duration = highlight.then(|| Duration::from_millis(*highlight_duration));
                self.focus(section_id, ElementKind::Section, duration, report);
            }
            UiAction::HighlightElement {
                element_id,
                duration,
            } => {
                self.focus(
                    element_id,
                    ElementKind::Element,
                    Some(Duration::from_millis(*duration)),
                    report,
                );
            }
            other => {
                self.bus.publish(AssistantEvent::Action(other.clone()));
                report.published += 1;
            }
        }
    }

    /// Scroll to an element and, with a duration, highlight it for that long
    fn focus(
        &self,
        id: &str,
        kind: ElementKind,
        highlight: Option<Duration>,
        report: &mut DispatchReport,
    ) {
        let Some(element) = self.host.find_element(id, kind) else {
            tracing::warn!(id, attribute = kind.data_attribute(), "Element not found, skipping");
            report.missing_elements.push(id.to_string());
            return;
        };

        element.scroll_into_view(ScrollBlock::Center);
        if let Some(duration) = highlight {
            element.add_class(HIGHLIGHT_CLASS);
            tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                element.remove_class(HIGHLIGHT_CLASS);
            });
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording host for dispatcher tests

    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::time::Instant;

    #[derive(Default)]
    pub(crate) struct RecordingElement {
        pub log: Mutex<Vec<String>>,
    }

    impl UiElement for RecordingElement {
        fn scroll_into_view(&self, block: ScrollBlock) {
            self.log.lock().unwrap().push(format!("scroll:{block:?}"));
        }
        fn add_class(&self, class: &str) {
            self.log.lock().unwrap().push(format!("add:{class}"));
        }
        fn remove_class(&self, class: &str) {
            self.log.lock().unwrap().push(format!("remove:{class}"));
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingHost {
        pub calls: Mutex<Vec<(String, Instant)>>,
        pub elements: HashMap<String, Arc<RecordingElement>>,
    }

    impl RecordingHost {
        pub(crate) fn with_element(mut self, id: &str) -> Self {
            self.elements.insert(id.to_string(), Arc::default());
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push((call, Instant::now()));
        }
    }

    #[async_trait]
    impl UiHost for RecordingHost {
        async fn navigate(&self, target: &str) {
            self.record(format!("navigate:{target}"));
        }

        async fn set_query_param(&self, key: &str, value: &str) {
            self.record(format!("param:{key}={value}"));
        }

        fn find_element(&self, id: &str, _kind: ElementKind) -> Option<Arc<dyn UiElement>> {
            self.record(format!("find:{id}"));
            self.elements
                .get(id)
                .map(|e| Arc::clone(e) as Arc<dyn UiElement>)
        }
    }
}
