//! Pseudonym map data model.

use crate::entity::EntityType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry in a session's pseudonym map: what a pseudonym stands for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PseudonymEntry {
    pub original: String,
    pub entity_type: EntityType,
    pub first_offset: usize,
}

/// A session-scoped bijection between original entity text and stable
/// `<TYPE>_<N>` pseudonyms. Keyed by (sessionId, firmId) at the store
/// level; this struct is the per-session value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PseudonymMap {
    /// pseudonym -> entry
    pub entries: HashMap<String, PseudonymEntry>,
    /// original text -> pseudonym, the inverse index used to keep lookups
    /// stable within a session: identical original text always maps to
    /// the same pseudonym for the life of the session.
    pub original_to_pseudonym: HashMap<String, String>,
    /// Next numeric suffix to allocate, per entity type.
    pub next_index: HashMap<EntityType, u64>,
}

impl PseudonymMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pseudonym already assigned to this exact original text, if any.
    pub fn lookup_original(&self, original: &str) -> Option<&str> {
        self.original_to_pseudonym.get(original).map(|s| s.as_str())
    }

    /// Snapshot as a plain `original -> pseudonym` map, for the
    /// `pseudonymMap:{original→pseudonym}` response shape.
    pub fn to_original_pseudonym_map(&self) -> HashMap<String, String> {
        self.original_to_pseudonym.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
