//! Default `LlmClient` (the design "a single pluggable `LlmClient`
//! trait with an HTTP-backed default that treats the provider as
//! opaque"). Posts the masked prompt to a configured endpoint and
//! expects back a minimal, provider-agnostic JSON shape; no vendor wire
//! format is modeled.

use std::time::Duration;

use async_trait::async_trait;
use irongate_core::error::{IronGateError, Result};
use irongate_core::{LlmClient, LlmCompletion};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const LLM_SEND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    model: Option<&'a str>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    text: String,
    model: String,
    provider: String,
    prompt_tokens: u32,
    completion_tokens: u32,
}

pub struct HttpLlmClient {
    client: Client,
    endpoint: String,
}

impl HttpLlmClient {
    pub fn new(client: Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, masked_prompt: &str, model: Option<&str>) -> Result<LlmCompletion> {
        let request = CompletionRequest { prompt: masked_prompt, model };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .timeout(LLM_SEND_TIMEOUT)
            .send()
            .await
            .map_err(|e| IronGateError::SendFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IronGateError::SendFailed(format!(
                "llm endpoint returned {}",
                response.status()
            )));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| IronGateError::SendFailed(e.to_string()))?;

        Ok(LlmCompletion {
            text: body.text,
            model: body.model,
            provider: body.provider,
            prompt_tokens: body.prompt_tokens,
            completion_tokens: body.completion_tokens,
        })
    }
}
