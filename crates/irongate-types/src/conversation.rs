//! Conversation turn data model.

use crate::entity::DetectedEntity;
use serde::{Deserialize, Serialize};

/// One prompt submission within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub text: String,
    pub entities: Vec<DetectedEntity>,
    pub score: u8,
    pub timestamp_ms: i64,
}

/// Maximum turns retained per session ring buffer.
pub const MAX_TURNS: usize = 20;

/// Session idle timeout, in minutes, after which the session resets.
pub const SESSION_TTL_MINUTES: i64 = 30;
