//! Conversation state for the marketing-site chatbot
//!
//! Tracks what a visitor has asked so far and how deep answers should go.
//! Depth only ever increases within a conversation: a repeated topic or an
//! explicit follow-up ("더 자세히", "왜", ...) moves it one step.

use std::collections::HashMap;

use crate::dictionary::PAGES;
use crate::extraction::{compact, normalize_for_match};

/// Markers of a visitor asking to go further on the same subject
const FOLLOW_UP_MARKERS: &[&str] = &["더자세히", "자세히", "구체적으로", "왜", "예시", "예를들어"];

/// How much material an answer should draw on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SearchDepth {
    Quick,
    Standard,
    Deep,
}

impl SearchDepth {
    fn next(self) -> Self {
        match self {
            Self::Quick => Self::Standard,
            Self::Standard | Self::Deep => Self::Deep,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Standard => "standard",
            Self::Deep => "deep",
        }
    }
}

/// Dashboard areas mentioned in `text`, using the page and tab vocabulary
pub fn detect_topics(text: &str) -> Vec<&'static str> {
    let text = compact(text);
    let mut topics = Vec::new();
    for page in PAGES {
        for (keyword, tab) in page.tab_keywords {
            if text.contains(&compact(keyword)) {
                let label = page
                    .tab_labels
                    .iter()
                    .find(|(id, _)| id == tab)
                    .map(|(_, label)| *label)
                    .unwrap_or(page.label);
                if !topics.contains(&label) {
                    topics.push(label);
                }
            }
        }
        if page.keywords.iter().any(|k| text.contains(&compact(k))) && !topics.contains(&page.label) {
            topics.push(page.label);
        }
    }
    topics
}

#[derive(Debug, Clone)]
pub struct ConversationSearchContext {
    turns: usize,
    depth: SearchDepth,
    topic_counts: HashMap<&'static str, usize>,
    last_topic: Option<&'static str>,
    /// `question_key` of every question already asked
    asked: Vec<String>,
}

impl Default for ConversationSearchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationSearchContext {
    pub fn new() -> Self {
        Self {
            turns: 0,
            depth: SearchDepth::Quick,
            topic_counts: HashMap::new(),
            last_topic: None,
            asked: Vec::new(),
        }
    }

    /// Record a visitor message and return the depth to answer it at
    pub fn observe(&mut self, message: &str) -> SearchDepth {
        self.turns += 1;
        let topics = detect_topics(message);
        let repeated = topics
            .iter()
            .any(|t| self.topic_counts.get(t).is_some_and(|n| *n > 0));
        let follow_up = is_follow_up(message);

        for topic in &topics {
            *self.topic_counts.entry(topic).or_insert(0) += 1;
        }
        if let Some(topic) = topics.first() {
            self.last_topic = Some(topic);
        }

        let key = question_key(message);
        if !key.is_empty() && !self.asked.contains(&key) {
            self.asked.push(key);
        }

        if repeated || follow_up {
            let before = self.depth;
            self.depth = self.depth.next();
            if self.depth != before {
                tracing::debug!(
                    turn = self.turns,
                    depth = self.depth.as_str(),
                    repeated,
                    follow_up,
                    "Search depth escalated"
                );
            }
        }
        self.depth
    }

    pub fn depth(&self) -> SearchDepth {
        self.depth
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    pub fn last_topic(&self) -> Option<&'static str> {
        self.last_topic
    }

    pub fn topic_count(&self, topic: &str) -> usize {
        self.topic_counts.get(topic).copied().unwrap_or(0)
    }

    /// Whether an equivalent question was already asked
    pub fn has_asked(&self, question: &str) -> bool {
        let key = question_key(question);
        !key.is_empty() && self.asked.contains(&key)
    }
}

/// Comparison key for a question: normalized, punctuation dropped
pub fn question_key(question: &str) -> String {
    normalize_for_match(question)
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

fn is_follow_up(message: &str) -> bool {
    let text = compact(message);
    FOLLOW_UP_MARKERS.iter().any(|m| text.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_topics() {
        assert_eq!(detect_topics("재고 관리는 어떻게 해요?"), vec!["재고"]);
        assert!(detect_topics("안녕하세요").is_empty());
    }

    #[test]
    fn test_repeated_topic_escalates() {
        let mut ctx = ConversationSearchContext::new();
        assert_eq!(ctx.observe("고객 분석 기능이 있나요?"), SearchDepth::Quick);
        assert_eq!(ctx.observe("고객 세그먼트는 어떻게 나눠요?"), SearchDepth::Standard);
        assert_eq!(ctx.topic_count("고객"), 2);
    }

    #[test]
    fn test_follow_up_escalates_to_deep() {
        let mut ctx = ConversationSearchContext::new();
        ctx.observe("예측 기능 소개해줘");
        assert_eq!(ctx.observe("더 자세히 알려줘"), SearchDepth::Standard);
        assert_eq!(ctx.observe("예시도 있어요?"), SearchDepth::Deep);
        assert_eq!(ctx.observe("예시 하나 더"), SearchDepth::Deep);
    }

    #[test]
    fn test_depth_never_decreases() {
        let mut ctx = ConversationSearchContext::new();
        ctx.observe("매장 분석");
        ctx.observe("매장 동선은?");
        let reached = ctx.depth();
        ctx.observe("가격이 궁금해요");
        ctx.observe("안녕하세요");
        assert!(ctx.depth() >= reached);
    }

    #[test]
    fn test_has_asked_normalizes() {
        let mut ctx = ConversationSearchContext::new();
        ctx.observe("ROI 는 어떻게 계산해요?");
        assert!(ctx.has_asked("roi는 어떻게 계산해요"));
        assert!(ctx.has_asked("ROI는 어떻게 계산해요!!"));
        assert!(!ctx.has_asked("ROI는 어떻게 보여줘요?"));
    }

    #[test]
    fn test_question_key_drops_punctuation() {
        assert_eq!(question_key("무료 체험이 가능한가요?"), "무료체험이가능한가요");
        assert_eq!(question_key("  ... ?"), "");
    }
}
