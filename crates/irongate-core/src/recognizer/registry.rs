//! Recognizer registry: runs the regex recognizer plus any
//! registered plugin recognizers and merges their candidates.

use std::sync::Arc;

use irongate_types::DetectedEntity;

use super::overlap::{c2_priority, dedupe_exact, resolve_overlaps};
use super::plugin::{run_with_deadline, Recognizer};
use super::regex_recognizer::RegexRecognizer;

/// Owns the always-on regex recognizer and a set of plugin recognizers
/// registered at startup (the "priority order: regex > plugin >
/// client_matter" applies at the tie-break stage, via `c2_priority`).
pub struct RecognizerRegistry {
    regex: RegexRecognizer,
    plugins: Vec<Arc<dyn Recognizer>>,
}

impl RecognizerRegistry {
    pub fn new() -> Self {
        Self {
            regex: RegexRecognizer::new(),
            plugins: Vec::new(),
        }
    }

    pub fn register(&mut self, recognizer: Arc<dyn Recognizer>) {
        self.plugins.push(recognizer);
    }

    /// Run every recognizer against `text` and merge the results into a
    /// single sorted, non-overlapping sequence.
    pub async fn recognize(&self, text: &str) -> Vec<DetectedEntity> {
        let mut candidates = self.regex.recognize(text);

        for plugin in &self.plugins {
            let entities = run_with_deadline(Arc::clone(plugin), text.to_string()).await;
            candidates.extend(entities);
        }

        let candidates = dedupe_exact(candidates);
        resolve_overlaps(candidates, c2_priority)
    }
}

impl Default for RecognizerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::plugin::ClientMatterRecognizer;
    use std::collections::HashMap;
    use uuid::Uuid;

    #[tokio::test]
    async fn merges_regex_and_plugin_output() {
        let mut registry = RecognizerRegistry::new();
        let mut matters = HashMap::new();
        matters.insert("2024-00187".to_string(), Uuid::new_v4());
        registry.register(Arc::new(ClientMatterRecognizer::new(matters)));

        let text = "Contact alice@example.com re matter 2024-00187";
        let entities = registry.recognize(text).await;

        assert!(entities.iter().any(|e| e.text == "alice@example.com"));
        assert!(entities.iter().any(|e| e.text == "2024-00187"));
    }

    #[tokio::test]
    async fn output_stays_sorted_and_non_overlapping() {
        let registry = RecognizerRegistry::new();
        let text = "SSN 123-45-6789, email bob@corp.com, card 4111111111111111";
        let entities = registry.recognize(text).await;
        for w in entities.windows(2) {
            assert!(w[0].end <= w[1].start);
        }
    }
}
