//! Page-scoped tab lookup

use crate::dictionary::{PageDef, PAGES};

use super::compact;

/// A tab on a specific page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabRef {
    pub page: &'static str,
    pub tab: &'static str,
}

/// Find the tab a message names.
///
/// The current page's keyword table is consulted first, so a word that
/// means different tabs on different pages resolves locally. Without a
/// match there, every page is scanned in canonical order.
pub fn extract_tab(text: &str, page: Option<&str>) -> Option<TabRef> {
    let text = compact(text);

    if let Some(current) = page.and_then(crate::dictionary::page) {
        if let Some(found) = match_in_page(current, &text) {
            return Some(found);
        }
    }

    PAGES.iter().find_map(|p| match_in_page(p, &text))
}

fn match_in_page(page: &'static PageDef, compact_text: &str) -> Option<TabRef> {
    page.tab_keywords
        .iter()
        .find(|(keyword, _)| compact_text.contains(keyword))
        .map(|(_, tab)| TabRef {
            page: page.path,
            tab: *tab,
        })
}

/// Find a page named in the message
pub fn extract_page(text: &str) -> Option<&'static str> {
    let text = compact(text);
    PAGES
        .iter()
        .flat_map(|p| p.keywords.iter().map(move |kw| (p.path, *kw)))
        .filter(|(_, kw)| text.contains(kw))
        .max_by_key(|(_, kw)| kw.len())
        .map(|(path, _)| path)
}
