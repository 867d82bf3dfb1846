//! `POST /send` (the wire contract). `systemPrompt`/`maxTokens`/`temperature`
//! are accepted and schema-validated  but not threaded through to
//! `LlmClient::complete` — the trait deliberately treats the provider as
//! opaque, so only the masked prompt and model cross
//! that boundary.

use std::sync::Arc;

use axum::{extract::State, Json};
use irongate_core::{IronGateError, Route, SendRequest as CoreSendRequest};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendBody {
    masked_prompt: String,
    route: Route,
    session_id: Uuid,
    #[serde(default = "default_firm_id")]
    firm_id: String,
    model: Option<String>,
    #[allow(dead_code)]
    system_prompt: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

fn default_firm_id() -> String {
    "default".to_string()
}

#[derive(Serialize)]
struct TokensUsed {
    prompt: u32,
    completion: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponseBody {
    response: String,
    model: String,
    provider: String,
    tokens_used: TokensUsed,
    latency_ms: u64,
}

pub async fn send(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SendBody>,
) -> Result<Json<SendResponseBody>, AppError> {
    if let Some(max_tokens) = body.max_tokens {
        if max_tokens == 0 {
            return Err(AppError(IronGateError::InvalidInput(
                "maxTokens must be > 0".to_string(),
            )));
        }
    }
    if let Some(temperature) = body.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(AppError(IronGateError::InvalidInput(
                "temperature must be within 0..2".to_string(),
            )));
        }
    }

    let request = CoreSendRequest {
        masked_prompt: body.masked_prompt,
        route: body.route,
        session_id: body.session_id,
        firm_id: body.firm_id,
        model: body.model,
    };

    let response = state.orchestrator.send(request).await?;
    Ok(Json(SendResponseBody {
        response: response.response,
        model: response.model,
        provider: response.provider,
        tokens_used: TokensUsed {
            prompt: response.prompt_tokens,
            completion: response.completion_tokens,
        },
        latency_ms: response.latency_ms,
    }))
}
