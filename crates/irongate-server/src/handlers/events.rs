//! `POST /events/batch` (the wire contract): external capture mechanisms
//! that bypass `/analyze` submit pre-built `EventRecord`s here for chain
//! recording. 2xx acknowledges the whole batch (caller may drop it);
//! any append failure returns 500 so the caller retains and retries the
//! batch; a structurally invalid body is rejected by the JSON extractor
//! as 400 before this handler runs.

use std::sync::Arc;

use axum::{extract::State, Json};
use irongate_core::IronGateError;
use irongate_types::EventRecord;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsBatchBody {
    batch_id: String,
    events: Vec<EventRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsBatchResponse {
    batch_id: String,
    accepted: usize,
}

pub async fn batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EventsBatchBody>,
) -> Result<Json<EventsBatchResponse>, AppError> {
    if body.batch_id.is_empty() {
        return Err(AppError(IronGateError::InvalidInput(
            "batchId must not be empty".to_string(),
        )));
    }

    for event in &body.events {
        state
            .chain
            .append(&event.firm_id, event)
            .await
            .map_err(|e| IronGateError::ChainAppendFailed(e.to_string()))?;
    }

    Ok(Json(EventsBatchResponse {
        batch_id: body.batch_id,
        accepted: body.events.len(),
    }))
}
