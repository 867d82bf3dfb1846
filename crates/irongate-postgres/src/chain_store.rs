//! Postgres-backed `ChainStore`. Newtype over `PgPool`, using
//! runtime-checked SQL, a transaction around the read-then-insert that
//! determines the next `chain_position`/`previous_hash`, and
//! `anyhow!(e)` mapped into the crate's error type at every fallible
//! call.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use irongate_core::chain::{canonicalize, hash_event, ChainStore};
use irongate_core::error::{IronGateError, Result};
use irongate_types::{ChainEntry, ChainVerification, EventRecord};

/// One row of `iron_gate.chain_entries`. `canonical` is kept alongside
/// the wire columns so `verify` can recompute a hash independently of
/// the stored `event_hash`, same as the in-memory store.
struct ChainRow {
    event_id: Uuid,
    event_hash: String,
    previous_hash: Option<String>,
    chain_position: i64,
    firm_id: String,
    timestamp: DateTime<Utc>,
    canonical: String,
}

pub struct PgChainStore {
    pool: PgPool,
}

impl PgChainStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChainStore for PgChainStore {
    async fn append(&self, firm_id: &str, event: &EventRecord) -> Result<ChainEntry> {
        let canonical = canonicalize(event)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| IronGateError::from(anyhow!(e)))?;

        let last = sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT chain_position, event_hash
            FROM iron_gate.chain_entries
            WHERE firm_id = $1
            ORDER BY chain_position DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(firm_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| IronGateError::from(anyhow!(e)))?;

        let (chain_position, previous_hash) = match last {
            Some((pos, hash)) => (pos + 1, Some(hash)),
            None => (0, None),
        };
        let event_hash = hash_event(&canonical, previous_hash.as_deref());

        sqlx::query(
            r#"
            INSERT INTO iron_gate.chain_entries
                (firm_id, chain_position, event_id, event_hash, previous_hash, timestamp, canonical)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(firm_id)
        .bind(chain_position)
        .bind(event.event_id)
        .bind(&event_hash)
        .bind(&previous_hash)
        .bind(event.timestamp)
        .bind(&canonical)
        .execute(&mut *tx)
        .await
        .map_err(|e| IronGateError::from(anyhow!(e)))?;

        tx.commit()
            .await
            .map_err(|e| IronGateError::from(anyhow!(e)))?;

        Ok(ChainEntry {
            event_id: event.event_id,
            event_hash,
            previous_hash,
            chain_position: chain_position as u64,
            firm_id: firm_id.to_string(),
            timestamp: event.timestamp,
        })
    }

    async fn verify(&self, firm_id: &str) -> Result<ChainVerification> {
        let rows = self.load_rows(firm_id).await?;

        for row in &rows {
            let expected = hash_event(&row.canonical, row.previous_hash.as_deref());
            if expected != row.event_hash {
                return Ok(ChainVerification {
                    valid: false,
                    total_events: rows.len() as u64,
                    broken_at: Some(row.chain_position as u64),
                });
            }
        }

        Ok(ChainVerification {
            valid: true,
            total_events: rows.len() as u64,
            broken_at: None,
        })
    }

    async fn entries(&self, firm_id: &str) -> Result<Vec<ChainEntry>> {
        let rows = self.load_rows(firm_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| ChainEntry {
                event_id: row.event_id,
                event_hash: row.event_hash,
                previous_hash: row.previous_hash,
                chain_position: row.chain_position as u64,
                firm_id: row.firm_id,
                timestamp: row.timestamp,
            })
            .collect())
    }
}

impl PgChainStore {
    async fn load_rows(&self, firm_id: &str) -> Result<Vec<ChainRow>> {
        let rows = sqlx::query_as::<
            _,
            (Uuid, String, Option<String>, i64, String, DateTime<Utc>, String),
        >(
            r#"
            SELECT event_id, event_hash, previous_hash, chain_position, firm_id, timestamp, canonical
            FROM iron_gate.chain_entries
            WHERE firm_id = $1
            ORDER BY chain_position ASC
            "#,
        )
        .bind(firm_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| IronGateError::from(anyhow!(e)))?;

        Ok(rows
            .into_iter()
            .map(
                |(event_id, event_hash, previous_hash, chain_position, firm_id, timestamp, canonical)| {
                    ChainRow {
                        event_id,
                        event_hash,
                        previous_hash,
                        chain_position,
                        firm_id,
                        timestamp,
                        canonical,
                    }
                },
            )
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_rows_is_private_to_the_crate() {
        // Compile-time check only: PgChainStore exposes the ChainStore
        // trait surface and nothing else, so callers can't bypass the
        // recompute-on-verify behavior by reaching into row storage.
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgChainStore>();
    }
}
