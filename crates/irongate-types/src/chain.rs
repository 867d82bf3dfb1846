//! Audit chain entry data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One link in a per-firm hash chain.
///
/// Invariant: `event_hash = SHA256(canonicalJSON(eventData) ||
/// (previousHash ?? "GENESIS"))`; `chain_position` strictly increases by
/// 1 within a firm, starting at 0 with `previous_hash = None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainEntry {
    pub event_id: Uuid,
    pub event_hash: String,
    pub previous_hash: Option<String>,
    pub chain_position: u64,
    pub firm_id: String,
    #[serde(serialize_with = "crate::timestamp::serialize_millis")]
    pub timestamp: DateTime<Utc>,
}

/// Result of walking a firm's chain end to end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainVerification {
    pub valid: bool,
    pub total_events: u64,
    /// Position of the first mismatch, if any.
    pub broken_at: Option<u64>,
}
