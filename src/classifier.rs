//! Stateless line classifier

use crate::patterns::{Category, PatternRegistry};
use std::borrow::Cow;

/// Applies a pattern registry to single lines
///
/// Classification is multi-label: a line can match any number of categories.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    registry: &'a PatternRegistry,
}

impl<'a> Classifier<'a> {
    pub fn new(registry: &'a PatternRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a PatternRegistry {
        self.registry
    }

    /// Return every category whose pattern matches the line, in registry order
    pub fn classify(&self, line: &str) -> Vec<Category> {
        self.registry
            .rules()
            .iter()
            .filter(|rule| rule.matches(line))
            .map(|rule| rule.category())
            .collect()
    }

    /// Classify raw bytes, decoding invalid UTF-8 lossily
    pub fn classify_bytes(&self, line: &[u8]) -> Vec<Category> {
        let text: Cow<'_, str> = String::from_utf8_lossy(line);
        self.classify(&text)
    }
}
