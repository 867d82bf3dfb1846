//! Pseudonymizer: deterministic, session-stable, bijective
//! replacement of entity spans with `<TYPE>_<N>` pseudonyms, and their
//! reversal on the response path.

use std::collections::HashMap;
use std::sync::Arc;

use irongate_types::{DetectedEntity, EntityType, PseudonymEntry, PseudonymMap};
use tokio::sync::RwLock;
use uuid::Uuid;

/// `(sessionId, firmId) -> PseudonymMap`. Concurrent access to a single
/// session's map is serialized through its own lock.
pub struct PseudonymStore {
    maps: RwLock<HashMap<(Uuid, String), Arc<RwLock<PseudonymMap>>>>,
}

impl PseudonymStore {
    pub fn new() -> Self {
        Self { maps: RwLock::new(HashMap::new()) }
    }

    async fn handle(&self, session_id: Uuid, firm_id: &str) -> Arc<RwLock<PseudonymMap>> {
        let key = (session_id, firm_id.to_string());
        if let Some(existing) = self.maps.read().await.get(&key) {
            return Arc::clone(existing);
        }
        let mut maps = self.maps.write().await;
        Arc::clone(
            maps.entry(key)
                .or_insert_with(|| Arc::new(RwLock::new(PseudonymMap::new()))),
        )
    }

    /// Mask `text`, assigning new pseudonyms for entities not already
    /// known in this session and reusing existing ones otherwise.
    pub async fn pseudonymize(
        &self,
        session_id: Uuid,
        firm_id: &str,
        text: &str,
        entities: &[DetectedEntity],
    ) -> (String, PseudonymMap) {
        let handle = self.handle(session_id, firm_id).await;
        let mut map = handle.write().await;

        let mut ordered: Vec<&DetectedEntity> = entities.iter().collect();
        ordered.sort_by(|a, b| b.start.cmp(&a.start));

        let mut chars: Vec<char> = text.chars().collect();
        for entity in ordered {
            let pseudonym = assign_or_reuse(&mut map, text, entity);
            let replacement: Vec<char> = pseudonym.chars().collect();
            chars.splice(entity.start..entity.end, replacement);
        }

        (chars.into_iter().collect(), map.clone())
    }

    /// Substitute every pseudonym present in `response_text` back to its
    /// original, longest-match-first to avoid `PERSON_1`/`PERSON_10`
    /// prefix collisions.
    pub async fn depseudonymize(&self, session_id: Uuid, firm_id: &str, response_text: &str) -> String {
        let handle = self.handle(session_id, firm_id).await;
        let map = handle.read().await;
        depseudonymize_with(&map, response_text)
    }

    pub async fn snapshot(&self, session_id: Uuid, firm_id: &str) -> PseudonymMap {
        self.handle(session_id, firm_id).await.read().await.clone()
    }
}

impl Default for PseudonymStore {
    fn default() -> Self {
        Self::new()
    }
}

fn assign_or_reuse(map: &mut PseudonymMap, text: &str, entity: &DetectedEntity) -> String {
    let original = entity.text.clone();
    if let Some(existing) = map.lookup_original(&original) {
        return existing.to_string();
    }

    let prefix = map_prefix(&entity.entity_type);
    loop {
        let next = *map.next_index.get(&entity.entity_type).unwrap_or(&0) + 1;
        let candidate = format!("{prefix}_{next}");
        map.next_index.insert(entity.entity_type.clone(), next);
        // Collision-free: never hand out a pseudonym that already
        // occurs verbatim in the input text.
        if !text.contains(candidate.as_str()) {
            map.entries.insert(
                candidate.clone(),
                PseudonymEntry {
                    original: original.clone(),
                    entity_type: entity.entity_type.clone(),
                    first_offset: entity.start,
                },
            );
            map.original_to_pseudonym.insert(original, candidate.clone());
            return candidate;
        }
    }
}

fn map_prefix(ty: &EntityType) -> String {
    ty.as_wire_str().to_string()
}

fn depseudonymize_with(map: &PseudonymMap, response_text: &str) -> String {
    let mut keys: Vec<&String> = map.entries.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut result = response_text.to_string();
    for key in keys {
        let entry = &map.entries[key];
        result = result.replace(key.as_str(), &entry.original);
    }
    result
}
