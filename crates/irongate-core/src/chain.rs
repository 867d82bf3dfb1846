//! Audit chain: a per-firm, strictly ordered, SHA-256-linked
//! append-only log. Storage is treated as an opaque key/value and
//! append-only log interface, so the port is a trait; this crate ships
//! the in-memory implementation, `irongate-postgres` ships a durable one.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use irongate_types::{ChainEntry, ChainVerification, EventRecord};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::error::{IronGateError, Result};

const GENESIS: &str = "GENESIS";

/// Storage seam for the chain.
#[async_trait]
pub trait ChainStore: Send + Sync {
    async fn append(&self, firm_id: &str, event: &EventRecord) -> Result<ChainEntry>;
    async fn verify(&self, firm_id: &str) -> Result<ChainVerification>;
    async fn entries(&self, firm_id: &str) -> Result<Vec<ChainEntry>>;
}

/// Canonicalize an event record as JSON with lexicographically sorted
/// keys and no insignificant whitespace.
pub fn canonicalize(event: &EventRecord) -> Result<String> {
    let value = serde_json::to_value(event)
        .map_err(|e| IronGateError::Internal(anyhow::anyhow!(e)))?;
    let sorted = sort_keys(value);
    serde_json::to_string(&sorted).map_err(|e| IronGateError::Internal(anyhow::anyhow!(e)))
}

fn sort_keys(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut sorted = serde_json::Map::new();
            let mut keys: Vec<String> = map.keys().cloned().collect();
            keys.sort();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(map[&key].clone()));
            }
            serde_json::Value::Object(sorted)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(sort_keys).collect())
        }
        other => other,
    }
}

pub fn hash_event(canonical: &str, previous_hash: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hasher.update(previous_hash.unwrap_or(GENESIS).as_bytes());
    hex::encode(hasher.finalize())
}

/// One stored link: the entry's wire shape plus the canonical JSON its
/// hash was computed over, kept so `verify` can recompute independently
/// of the claimed link rather than trusting `previous_hash` at face value.
struct StoredEntry {
    entry: ChainEntry,
    canonical: String,
}

/// Per-firm chains guarded by one mutex each, so writers for a given firm
/// serialize while different firms proceed independently.
#[derive(Default)]
pub struct InMemoryChainStore {
    firms: Mutex<HashMap<String, Arc<Mutex<Vec<StoredEntry>>>>>,
}

impl InMemoryChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn firm_chain(&self, firm_id: &str) -> Arc<Mutex<Vec<StoredEntry>>> {
        let mut firms = self.firms.lock().await;
        Arc::clone(
            firms
                .entry(firm_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Vec::new()))),
        )
    }
}

#[async_trait]
impl ChainStore for InMemoryChainStore {
    async fn append(&self, firm_id: &str, event: &EventRecord) -> Result<ChainEntry> {
        let chain = self.firm_chain(firm_id).await;
        let mut entries = chain.lock().await;

        let canonical = canonicalize(event)?;
        let previous_hash = entries.last().map(|e| e.entry.event_hash.clone());
        let event_hash = hash_event(&canonical, previous_hash.as_deref());
        let chain_position = entries.len() as u64;

        let entry = ChainEntry {
            event_id: event.event_id,
            event_hash,
            previous_hash,
            chain_position,
            firm_id: firm_id.to_string(),
            timestamp: event.timestamp,
        };
        entries.push(StoredEntry { entry: entry.clone(), canonical });
        Ok(entry)
    }

    /// Recompute each entry's hash from its own canonical data and
    /// claimed `previous_hash`, comparing against the stored hash — a
    /// tampered `event_hash` is caught at its own position, not its
    /// successor's.
    async fn verify(&self, firm_id: &str) -> Result<ChainVerification> {
        let chain = self.firm_chain(firm_id).await;
        let entries = chain.lock().await;

        for (i, stored) in entries.iter().enumerate() {
            let expected = hash_event(&stored.canonical, stored.entry.previous_hash.as_deref());
            if expected != stored.entry.event_hash {
                return Ok(ChainVerification {
                    valid: false,
                    total_events: entries.len() as u64,
                    broken_at: Some(i as u64),
                });
            }
        }

        Ok(ChainVerification { valid: true, total_events: entries.len() as u64, broken_at: None })
    }

    async fn entries(&self, firm_id: &str) -> Result<Vec<ChainEntry>> {
        let chain = self.firm_chain(firm_id).await;
        Ok(chain.lock().await.iter().map(|s| s.entry.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use irongate_types::{EventAction, SensitivityLevel};
    use std::collections::HashMap as StdHashMap;
    use uuid::Uuid;

    fn event() -> EventRecord {
        EventRecord {
            event_id: Uuid::new_v4(),
            firm_id: "firm1".into(),
            user_id: None,
            ai_tool_id: "chatgpt".into(),
            prompt_hash: "abc123".into(),
            prompt_length: 42,
            sensitivity_score: 10,
            sensitivity_level: SensitivityLevel::Low,
            entity_type_counts: StdHashMap::new(),
            action: EventAction::Pass,
            capture_method: "browser".into(),
            session_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            metadata: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn three_events_verify_then_tamper_detected() {
        let store = InMemoryChainStore::new();
        store.append("firm1", &event()).await.unwrap();
        store.append("firm1", &event()).await.unwrap();
        store.append("firm1", &event()).await.unwrap();

        let result = store.verify("firm1").await.unwrap();
        assert!(result.valid);
        assert_eq!(result.total_events, 3);

        {
            let chain = store.firm_chain("firm1").await;
            let mut entries = chain.lock().await;
            entries[1].entry.event_hash = "tampered".to_string();
        }

        let result = store.verify("firm1").await.unwrap();
        assert!(!result.valid);
        assert_eq!(result.broken_at, Some(1));
    }

    #[tokio::test]
    async fn first_entry_has_no_previous_hash() {
        let store = InMemoryChainStore::new();
        let entry = store.append("firm1", &event()).await.unwrap();
        assert_eq!(entry.previous_hash, None);
        assert_eq!(entry.chain_position, 0);
    }

    #[tokio::test]
    async fn chain_position_strictly_increases() {
        let store = InMemoryChainStore::new();
        let e1 = store.append("firm1", &event()).await.unwrap();
        let e2 = store.append("firm1", &event()).await.unwrap();
        assert_eq!(e2.chain_position, e1.chain_position + 1);
        assert_eq!(e2.previous_hash, Some(e1.event_hash));
    }

    #[test]
    fn canonical_json_has_sorted_keys() {
        let canonical = canonicalize(&event()).unwrap();
        let zebra_pos = canonical.find("\"user_id\"");
        let alpha_pos = canonical.find("\"action\"");
        assert!(alpha_pos < zebra_pos);
    }
}
