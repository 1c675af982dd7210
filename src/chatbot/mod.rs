//! Marketing-site chatbot heuristics
//!
//! Answer depth escalation and follow-up chips. The chatbot shares the
//! dashboard dictionary for recognizing what a visitor is asking about.

pub mod search_context;
pub mod suggestions;

pub use search_context::{detect_topics, ConversationSearchContext, SearchDepth};
pub use suggestions::{SuggestionGenerator, MAX_SUGGESTIONS, MIN_SUGGESTIONS};
