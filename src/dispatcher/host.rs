//! Seam between the dispatcher and whatever renders the dashboard

use std::sync::Arc;

use async_trait::async_trait;

/// CSS class applied while an element is highlighted
pub const HIGHLIGHT_CLASS: &str = "assistant-highlight";

/// How an element id is looked up: by `id`, then by the matching data attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `data-section`
    Section,
    /// `data-element`
    Element,
}

impl ElementKind {
    pub fn data_attribute(&self) -> &'static str {
        match self {
            Self::Section => "data-section",
            Self::Element => "data-element",
        }
    }
}

/// Vertical alignment for scrolling an element into view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Start,
    Center,
    End,
}

pub trait UiElement: Send + Sync {
    fn scroll_into_view(&self, block: ScrollBlock);
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
}

#[async_trait]
pub trait UiHost: Send + Sync {
    /// Route change; resolves once the new view is mounted
    async fn navigate(&self, target: &str);

    /// Replace one query parameter of the current route
    async fn set_query_param(&self, key: &str, value: &str);

    fn find_element(&self, id: &str, kind: ElementKind) -> Option<Arc<dyn UiElement>>;
}
