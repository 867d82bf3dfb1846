//! Event record data model — the shape appended to the audit
//! chain and mirrored to the durable event queue. Never carries raw
//! prompt text, only its hash.

use crate::entity::EntityType;
use crate::score::SensitivityLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// What the proxy ultimately did with a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    Pass,
    Warn,
    Block,
    Proxy,
    Override,
}

/// How the prompt reached the proxy. Left open-ended since capture
/// mechanisms (browser extension, IDE plugin, CLI wrapper) are outside
/// this crate's concern.
pub type CaptureMethod = String;

/// A single decision, normalized into the canonical shape that gets
/// hashed into the chain. Raw prompt text must never appear in the
/// event, only its hash and length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: Uuid,
    pub firm_id: String,
    pub user_id: Option<String>,
    pub ai_tool_id: String,
    /// SHA-256 hex of the prompt text. Never the prompt itself.
    pub prompt_hash: String,
    pub prompt_length: usize,
    pub sensitivity_score: u8,
    pub sensitivity_level: SensitivityLevel,
    pub entity_type_counts: HashMap<EntityType, u32>,
    pub action: EventAction,
    pub capture_method: CaptureMethod,
    pub session_id: Uuid,
    #[serde(serialize_with = "crate::timestamp::serialize_millis")]
    pub timestamp: DateTime<Utc>,
    pub metadata: serde_json::Value,
}
