//! Entity extraction
//!
//! Best-effort, order-sensitive pattern rules over raw Korean text. Every
//! extractor is a pure function: a miss is `None`, never an error.

pub mod date_range;
pub mod hour;
pub mod normalize;
pub mod tab;

pub use date_range::{
    describe_range, extract_date_range, format_date_range_ko, resolve_client_range,
    with_comparison, DatePreset, ExtractedDate,
};
pub use hour::extract_hour;
pub use normalize::{compact, is_hangul_syllable, matches_filter, normalize_for_match};
pub use tab::{extract_page, extract_tab, TabRef};
