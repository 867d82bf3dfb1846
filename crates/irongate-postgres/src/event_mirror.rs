//! Postgres-backed `EventMirror`: the durable side-channel
//! the in-memory `EventQueue` persists itself to on every mutation and
//! rehydrates from at startup.

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::PgPool;

use irongate_core::error::{IronGateError, Result};
use irongate_core::EventMirror;
use irongate_types::EventRecord;

pub struct PgEventMirror {
    pool: PgPool,
}

impl PgEventMirror {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventMirror for PgEventMirror {
    /// Overwrites the mirror with the queue's current snapshot in one
    /// transaction, matching the in-memory queue's "serialize on every
    /// mutation" contract without accumulating history.
    async fn persist(&self, events: &[EventRecord]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| IronGateError::from(anyhow!(e)))?;

        sqlx::query("DELETE FROM iron_gate.queue_mirror")
            .execute(&mut *tx)
            .await
            .map_err(|e| IronGateError::from(anyhow!(e)))?;

        for (position, event) in events.iter().enumerate() {
            let payload = serde_json::to_value(event).map_err(|e| IronGateError::from(anyhow!(e)))?;
            sqlx::query(
                r#"
                INSERT INTO iron_gate.queue_mirror (position, payload)
                VALUES ($1, $2)
                "#,
            )
            .bind(position as i64)
            .bind(&payload)
            .execute(&mut *tx)
            .await
            .map_err(|e| IronGateError::from(anyhow!(e)))?;
        }

        tx.commit().await.map_err(|e| IronGateError::from(anyhow!(e)))?;
        Ok(())
    }

    async fn reload(&self) -> Result<Vec<EventRecord>> {
        let rows = sqlx::query_as::<_, (serde_json::Value,)>(
            r#"
            SELECT payload
            FROM iron_gate.queue_mirror
            ORDER BY position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| IronGateError::from(anyhow!(e)))?;

        rows.into_iter()
            .map(|(payload,)| {
                serde_json::from_value(payload).map_err(|e| IronGateError::from(anyhow!(e)))
            })
            .collect()
    }
}
