//! Dashboard dictionary
//!
//! Static knowledge about the dashboard: which pages and tabs exist, which
//! words name them, where each query type is answered, and the term lists
//! used to recognize zones, segments and categories in free text.

pub mod structure;
pub mod vocabulary;

pub use structure::{
    page, page_label, tab_label, target_for, target_for_name, target_label, NavTarget, PageDef,
    PAGES, QUERY_TYPE_TO_TAB, DATA_CONTROL, INSIGHTS, ROI, SETTINGS, STUDIO,
};
pub use vocabulary::{
    mentioned, query_label, DATE_WORDS, KNOWN_CATEGORIES, KNOWN_SEGMENTS, KNOWN_ZONES, STOP_WORDS,
};
