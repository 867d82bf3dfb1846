//! Plugin recognizer trait and the built-in client-matter recognizer.
//! Plugin recognizers are opaque, user-provided code run behind a
//! wall-clock deadline; `ClientMatterRecognizer` is the one built in.

use std::collections::HashMap;
use std::time::Duration;

use irongate_types::{DetectedEntity, EntitySource, EntityType};
use uuid::Uuid;

/// A synchronous, CPU-bound entity recognizer. Implementations must not
/// block on I/O — the registry runs them on a blocking pool under a
/// wall-clock deadline and discards results that miss it.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Vec<DetectedEntity>;

    /// Name used in logs when a recognizer times out or panics.
    fn name(&self) -> &str;
}

/// Deadline enforced around every plugin recognizer invocation.
pub const RECOGNIZER_DEADLINE: Duration = Duration::from_millis(100);

/// Run `recognizer` on a blocking task under `RECOGNIZER_DEADLINE`. On
/// timeout or panic, logs and returns an empty vec rather than erroring
/// the whole `analyze` call — recognizer failure is never fatal.
pub async fn run_with_deadline(
    recognizer: std::sync::Arc<dyn Recognizer>,
    text: String,
) -> Vec<DetectedEntity> {
    let name = recognizer.name().to_string();
    let task = tokio::task::spawn_blocking(move || recognizer.recognize(&text));

    match tokio::time::timeout(RECOGNIZER_DEADLINE, task).await {
        Ok(Ok(entities)) => entities,
        Ok(Err(join_err)) => {
            tracing::warn!(recognizer = %name, error = %join_err, "recognizer panicked");
            Vec::new()
        }
        Err(_) => {
            tracing::warn!(recognizer = %name, deadline_ms = RECOGNIZER_DEADLINE.as_millis(), "recognizer timed out");
            Vec::new()
        }
    }
}

/// Exact-lookup recognizer over a firm-supplied table of known matter
/// numbers, tagging hits `CLIENT_MATTER_PAIR` with `EntitySource::ClientMatter`.
pub struct ClientMatterRecognizer {
    matters: HashMap<String, Uuid>,
}

impl ClientMatterRecognizer {
    pub fn new(matters: HashMap<String, Uuid>) -> Self {
        Self { matters }
    }
}

impl Recognizer for ClientMatterRecognizer {
    fn recognize(&self, text: &str) -> Vec<DetectedEntity> {
        let mut out = Vec::new();
        for key in self.matters.keys() {
            let mut search_from = 0;
            while let Some(byte_pos) = text[search_from..].find(key.as_str()) {
                let abs_byte_start = search_from + byte_pos;
                let abs_byte_end = abs_byte_start + key.len();
                let start = text[..abs_byte_start].chars().count();
                let end = text[..abs_byte_end].chars().count();
                out.push(DetectedEntity {
                    entity_type: EntityType::ClientMatterPair,
                    text: key.clone(),
                    start,
                    end,
                    confidence: 1.0,
                    source: EntitySource::ClientMatter,
                });
                search_from = abs_byte_end;
            }
        }
        out
    }

    fn name(&self) -> &str {
        "client_matter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_known_matter_number() {
        let mut matters = HashMap::new();
        matters.insert("2024-00187".to_string(), Uuid::new_v4());
        let recognizer = ClientMatterRecognizer::new(matters);
        let entities = recognizer.recognize("please reference matter 2024-00187 in the reply");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].entity_type, EntityType::ClientMatterPair);
        assert_eq!(entities[0].source, EntitySource::ClientMatter);
    }

    #[test]
    fn no_match_returns_empty() {
        let matters = HashMap::new();
        let recognizer = ClientMatterRecognizer::new(matters);
        assert!(recognizer.recognize("nothing here").is_empty());
    }

    #[tokio::test]
    async fn deadline_wrapper_returns_results_when_fast() {
        let mut matters = HashMap::new();
        matters.insert("ABC-123".to_string(), Uuid::new_v4());
        let recognizer: std::sync::Arc<dyn Recognizer> =
            std::sync::Arc::new(ClientMatterRecognizer::new(matters));
        let out = run_with_deadline(recognizer, "see ABC-123 please".to_string()).await;
        assert_eq!(out.len(), 1);
    }
}
