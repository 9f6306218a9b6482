//! Keyword topic detection.

use crate::domain::persona::OrderedMap;

/// Maps free text to a configured topic by keyword containment.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopicMatcher;

impl TopicMatcher {
    /// Returns the first topic, in configuration order, that has a keyword
    /// contained in `text`. Matching is case-insensitive substring search.
    pub fn detect_topic<'a>(&self, text: &str, topics: &'a OrderedMap<Vec<String>>) -> Option<&'a str> {
        let lower_input = text.to_lowercase();

        topics
            .iter()
            .find(|(_, keywords)| {
                keywords
                    .iter()
                    .any(|keyword| lower_input.contains(&keyword.to_lowercase()))
            })
            .map(|(topic, _)| topic)
    }
}
