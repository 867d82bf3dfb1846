//! Firm configuration store: in-memory by default,
//! with a trait seam so a persistent-store implementation can be
//! swapped in without touching the scorer or router.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use irongate_types::FirmConfig;
use tokio::sync::RwLock;

use crate::error::{IronGateError, Result};

/// Storage seam for firm configuration. Readers get an immutable
/// snapshot for the duration of a single analyze call.
#[async_trait]
pub trait FirmConfigRepository: Send + Sync {
    async fn get(&self, firm_id: &str) -> Result<Arc<FirmConfig>>;
    async fn put(&self, config: FirmConfig) -> Result<()>;
}

pub struct FirmConfigStore {
    configs: RwLock<HashMap<String, Arc<FirmConfig>>>,
}

impl FirmConfigStore {
    pub fn new() -> Self {
        Self { configs: RwLock::new(HashMap::new()) }
    }
}

impl Default for FirmConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FirmConfigRepository for FirmConfigStore {
    /// Snapshot lookup: returns the firm's config, or its defaults if
    /// none was ever stored, as an `Arc` so the caller's `analyze` call
    /// holds an immutable view for its whole duration.
    async fn get(&self, firm_id: &str) -> Result<Arc<FirmConfig>> {
        if let Some(config) = self.configs.read().await.get(firm_id) {
            return Ok(Arc::clone(config));
        }
        Ok(Arc::new(FirmConfig::new(firm_id)))
    }

    async fn put(&self, config: FirmConfig) -> Result<()> {
        if config.firm_id.is_empty() {
            return Err(IronGateError::InvalidInput("firm_id must not be empty".into()));
        }
        self.configs.write().await.insert(config.firm_id.clone(), Arc::new(config));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_firm_returns_defaults() {
        let store = FirmConfigStore::new();
        let config = store.get("unknown-firm").await.unwrap();
        assert_eq!(config.thresholds.passthrough_max, 25);
        assert_eq!(config.thresholds.cloud_masked_max, 75);
    }

    #[tokio::test]
    async fn stored_config_is_returned() {
        let store = FirmConfigStore::new();
        let mut config = FirmConfig::new("firm1");
        config.thresholds.passthrough_max = 10;
        store.put(config).await.unwrap();

        let fetched = store.get("firm1").await.unwrap();
        assert_eq!(fetched.thresholds.passthrough_max, 10);
    }
}
