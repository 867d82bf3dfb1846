//! `POST /analyze` (the wire contract). Accepts either `text` or `promptText`
//! for the prompt body field since the source calls it both; responds
//! with the envelope shape even on internal failure (the orchestrator
//! degrades to passthrough rather than erroring, except for a chain
//! append failure which this handler's `?` surfaces as 500 via `AppError`).

use std::sync::Arc;

use axum::{extract::State, Json};
use irongate_core::{AnalyzeRequest as CoreAnalyzeRequest, Route};
use irongate_types::{DetectedEntity, PseudonymMap, SensitivityScore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBody {
    #[serde(alias = "promptText")]
    text: String,
    ai_tool_id: String,
    session_id: Uuid,
    user_id: Option<String>,
    #[serde(default = "default_firm_id")]
    firm_id: String,
    #[serde(default = "default_capture_method")]
    capture_method: String,
}

fn default_firm_id() -> String {
    "default".to_string()
}

fn default_capture_method() -> String {
    "unknown".to_string()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponseBody {
    original_score: SensitivityScore,
    masked_prompt: String,
    pseudonym_map: HashMap<String, String>,
    recommended_route: Route,
    entities_found: Vec<DetectedEntity>,
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnalyzeBody>,
) -> Result<Json<AnalyzeResponseBody>, AppError> {
    let request = CoreAnalyzeRequest {
        prompt: body.text,
        firm_id: body.firm_id,
        session_id: body.session_id,
        user_id: body.user_id,
        ai_tool_id: body.ai_tool_id,
        capture_method: body.capture_method,
    };

    let response = state.orchestrator.analyze(request).await?;
    Ok(Json(into_wire(response)))
}

fn into_wire(response: irongate_core::AnalyzeResponse) -> AnalyzeResponseBody {
    AnalyzeResponseBody {
        original_score: response.score,
        masked_prompt: response.masked_prompt,
        pseudonym_map: to_pseudonym_map(&response.pseudonym_map),
        recommended_route: response.route,
        entities_found: response.entities_found,
    }
}

fn to_pseudonym_map(map: &PseudonymMap) -> HashMap<String, String> {
    map.to_original_pseudonym_map()
}
