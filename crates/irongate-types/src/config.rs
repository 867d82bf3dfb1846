//! Firm configuration data model.

use crate::entity::EntityType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Router thresholds. `score <= passthrough_max` passes through,
/// `score <= cloud_masked_max` goes to `cloud_masked`, else `private_llm`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteThresholds {
    pub passthrough_max: u8,
    pub cloud_masked_max: u8,
}

impl Default for RouteThresholds {
    fn default() -> Self {
        Self {
            passthrough_max: 25,
            cloud_masked_max: 75,
        }
    }
}

/// Per-firm configuration: routing thresholds, entity-weight overrides,
/// and session TTL. Immutable snapshot consumed by a single `analyze`
/// call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmConfig {
    pub firm_id: String,
    #[serde(default)]
    pub thresholds: RouteThresholds,
    /// Overrides layered on top of the scorer's default entity weights.
    #[serde(default)]
    pub entity_weight_overrides: HashMap<EntityType, f64>,
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: i64,
}

fn default_session_ttl_minutes() -> i64 {
    15
}

impl FirmConfig {
    pub fn new(firm_id: impl Into<String>) -> Self {
        Self {
            firm_id: firm_id.into(),
            thresholds: RouteThresholds::default(),
            entity_weight_overrides: HashMap::new(),
            session_ttl_minutes: default_session_ttl_minutes(),
        }
    }
}
