//! Proxy orchestrator: analyze -> route -> (send) ->
//! respond, driving recognition, classification, scoring,
//! pseudonymization, routing, and chain recording in sequence with the
//! documented failure fallbacks.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use irongate_types::{
    DetectedEntity, EntityType, EventAction, EventRecord, PseudonymMap, SensitivityLevel,
    SensitivityScore,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::chain::ChainStore;
use crate::classifier::DocumentClassifier;
use crate::config_store::FirmConfigRepository;
use crate::conversation_tracker::ConversationTracker;
use crate::error::{IronGateError, Result};
use crate::pseudonymizer::PseudonymStore;
use crate::queue::EventQueue;
use crate::recognizer::RecognizerRegistry;
use crate::relationships;
use crate::router::{self, Route};
use crate::scorer::SensitivityScorer;

/// Opaque LLM collaborator. Vendor HTTP wire formats are out of scope;
/// the orchestrator only needs a masked-prompt-in, response-out contract.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, masked_prompt: &str, model: Option<&str>) -> Result<LlmCompletion>;
}

pub struct LlmCompletion {
    pub text: String,
    pub model: String,
    pub provider: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

pub struct AnalyzeRequest {
    pub prompt: String,
    pub firm_id: String,
    pub session_id: Uuid,
    pub user_id: Option<String>,
    pub ai_tool_id: String,
    pub capture_method: String,
}

pub struct AnalyzeResponse {
    pub score: SensitivityScore,
    pub masked_prompt: String,
    pub pseudonym_map: PseudonymMap,
    pub route: Route,
    pub entities_found: Vec<DetectedEntity>,
}

pub struct SendRequest {
    pub masked_prompt: String,
    pub route: Route,
    pub session_id: Uuid,
    pub firm_id: String,
    pub model: Option<String>,
}

pub struct SendResponse {
    pub response: String,
    pub model: String,
    pub provider: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub latency_ms: u64,
}

pub struct ProxyOrchestrator {
    recognizers: RecognizerRegistry,
    classifier: DocumentClassifier,
    scorer: SensitivityScorer,
    conversation: ConversationTracker,
    pseudonyms: PseudonymStore,
    config: Arc<dyn FirmConfigRepository>,
    chain: Arc<dyn ChainStore>,
    queue: Arc<EventQueue>,
    llm: Arc<dyn LlmClient>,
}

impl ProxyOrchestrator {
    pub fn new(
        config: Arc<dyn FirmConfigRepository>,
        chain: Arc<dyn ChainStore>,
        queue: Arc<EventQueue>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            recognizers: RecognizerRegistry::new(),
            classifier: DocumentClassifier::new(),
            scorer: SensitivityScorer::new(),
            conversation: ConversationTracker::new(),
            pseudonyms: PseudonymStore::new(),
            config,
            chain,
            queue,
            llm,
        }
    }

    /// Internal pipeline failures (outside chain append) degrade to the
    /// passthrough fallback. A failure to append the decision event itself
    /// propagates as `Err` so the server layer can surface a 500: analyze
    /// must not return success without a recorded event, except on the
    /// explicit passthrough-fallback path.
    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse> {
        let (response, event) = match self.run_pipeline(&request).await {
            Ok(pair) => pair,
            Err(error) => {
                tracing::error!(firm_id = %request.firm_id, %error, "analyze failed internally, falling back to passthrough");
                self.record_best_effort_fallback(&request).await;
                return Ok(passthrough_fallback(&request));
            }
        };

        if let Err(error) = self.chain.append(&request.firm_id, &event).await {
            tracing::error!(firm_id = %request.firm_id, %error, "chain append failed for analyze decision");
            return Err(IronGateError::ChainAppendFailed(error.to_string()));
        }
        if let Err(error) = self.queue.enqueue(event).await {
            tracing::warn!(firm_id = %request.firm_id, %error, "event enqueue failed, will not block request");
        }

        Ok(response)
    }

    /// Runs recognition through pseudonymization and builds the event
    /// record, without touching the chain (the caller decides how a
    /// chain failure should surface).
    async fn run_pipeline(&self, request: &AnalyzeRequest) -> Result<(AnalyzeResponse, EventRecord)> {
        let now_ms = Utc::now().timestamp_millis();
        let firm_config = self.config.get(&request.firm_id).await?;

        // 1. Recognizer registry: regex recognizer plus plugins.
        let entities = self.recognizers.recognize(&request.prompt).await;

        // 2. Document classification.
        let classification = self.classifier.classify(&request.prompt);

        // 3. Conversation boosts from history so far (this turn isn't recorded yet).
        let conversation_boosts = self
            .conversation
            .current_boosts(request.session_id, &request.prompt, now_ms)
            .await;

        // 4. Relationship boost, folded into entityScore by the scorer.
        let (_relationships, relationship_boost) = relationships::analyze(&entities, &request.prompt);

        // 5. Sensitivity score.
        let score = self.scorer.score(
            &request.prompt,
            &entities,
            classification,
            relationship_boost,
            conversation_boosts,
            &firm_config.entity_weight_overrides,
        );

        // 6. Record this turn in the conversation tracker.
        self.conversation
            .add_turn(request.session_id, request.prompt.clone(), entities.clone(), score.score, now_ms)
            .await;

        // 7. Route.
        let route = router::route(score.score, firm_config.thresholds);

        // 8. Pseudonymize if not passthrough and entities exist.
        let (masked_prompt, pseudonym_map) = if route != Route::Passthrough && !entities.is_empty() {
            self.pseudonyms
                .pseudonymize(request.session_id, &request.firm_id, &request.prompt, &entities)
                .await
        } else {
            (request.prompt.clone(), PseudonymMap::new())
        };

        let event = build_event_record(request, &score, &entities, action_for_route(route));
        let response = AnalyzeResponse {
            score,
            masked_prompt,
            pseudonym_map,
            route,
            entities_found: entities,
        };
        Ok((response, event))
    }

    /// Sends a masked prompt to the LLM client and depseudonymizes the
    /// reply. On failure, propagates the error rather than silently
    /// falling back to the original prompt.
    pub async fn send(&self, request: SendRequest) -> Result<SendResponse> {
        let started = std::time::Instant::now();
        let completion = self
            .llm
            .complete(&request.masked_prompt, request.model.as_deref())
            .await
            .map_err(|e| IronGateError::SendFailed(e.to_string()))?;

        let response_text = self
            .pseudonyms
            .depseudonymize(request.session_id, &request.firm_id, &completion.text)
            .await;

        let latency_ms = started.elapsed().as_millis() as u64;
        let event = EventRecord {
            event_id: Uuid::new_v4(),
            firm_id: request.firm_id.clone(),
            user_id: None,
            ai_tool_id: completion.provider.clone(),
            prompt_hash: sha256_hex(&request.masked_prompt),
            prompt_length: request.masked_prompt.chars().count(),
            sensitivity_score: 0,
            sensitivity_level: SensitivityLevel::Low,
            entity_type_counts: HashMap::new(),
            action: EventAction::Proxy,
            capture_method: "proxy".to_string(),
            session_id: request.session_id,
            timestamp: Utc::now(),
            metadata: serde_json::json!({
                "route": format!("{:?}", request.route),
                "prompt_tokens": completion.prompt_tokens,
                "completion_tokens": completion.completion_tokens,
                "latency_ms": latency_ms,
            }),
        };
        if let Err(error) = self.chain.append(&request.firm_id, &event).await {
            tracing::error!(firm_id = %request.firm_id, %error, "chain append failed for send event");
        }

        Ok(SendResponse {
            response: response_text,
            model: completion.model,
            provider: completion.provider,
            prompt_tokens: completion.prompt_tokens,
            completion_tokens: completion.completion_tokens,
            latency_ms,
        })
    }

    /// Best-effort event for the passthrough fallback path; only logs
    /// on failure rather than propagating it.
    async fn record_best_effort_fallback(&self, request: &AnalyzeRequest) {
        let event = EventRecord {
            event_id: Uuid::new_v4(),
            firm_id: request.firm_id.clone(),
            user_id: request.user_id.clone(),
            ai_tool_id: request.ai_tool_id.clone(),
            prompt_hash: sha256_hex(&request.prompt),
            prompt_length: request.prompt.chars().count(),
            sensitivity_score: 0,
            sensitivity_level: SensitivityLevel::Low,
            entity_type_counts: HashMap::new(),
            action: EventAction::Pass,
            capture_method: request.capture_method.clone(),
            session_id: request.session_id,
            timestamp: Utc::now(),
            metadata: serde_json::json!({ "fallback": true }),
        };
        if let Err(error) = self.chain.append(&request.firm_id, &event).await {
            tracing::error!(firm_id = %request.firm_id, %error, "best-effort fallback event failed to append");
        }
    }
}

fn passthrough_fallback(request: &AnalyzeRequest) -> AnalyzeResponse {
    AnalyzeResponse {
        score: SensitivityScore {
            score: 0,
            level: SensitivityLevel::Low,
            explanation: "Internal error; defaulted to passthrough.".to_string(),
            breakdown: irongate_types::ScoreBreakdown {
                entity_score: 0.0,
                volume_score: 0.0,
                context_score: 0.0,
                legal_boost: 0.0,
                document_type_multiplier: 1.0,
                conversation_escalation: 0.0,
                firm_knowledge_boost: 0.0,
            },
        },
        masked_prompt: request.prompt.clone(),
        pseudonym_map: PseudonymMap::new(),
        route: Route::Passthrough,
        entities_found: Vec::new(),
    }
}

fn build_event_record(
    request: &AnalyzeRequest,
    score: &SensitivityScore,
    entities: &[DetectedEntity],
    action: EventAction,
) -> EventRecord {
    let mut entity_type_counts: HashMap<EntityType, u32> = HashMap::new();
    for entity in entities {
        *entity_type_counts.entry(entity.entity_type.clone()).or_insert(0) += 1;
    }

    EventRecord {
        event_id: Uuid::new_v4(),
        firm_id: request.firm_id.clone(),
        user_id: request.user_id.clone(),
        ai_tool_id: request.ai_tool_id.clone(),
        prompt_hash: sha256_hex(&request.prompt),
        prompt_length: request.prompt.chars().count(),
        sensitivity_score: score.score,
        sensitivity_level: score.level,
        entity_type_counts,
        action,
        capture_method: request.capture_method.clone(),
        session_id: request.session_id,
        timestamp: Utc::now(),
        metadata: serde_json::json!({}),
    }
}

fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

fn action_for_route(route: Route) -> EventAction {
    match route {
        Route::Passthrough => EventAction::Pass,
        Route::CloudMasked => EventAction::Proxy,
        Route::PrivateLlm => EventAction::Proxy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::InMemoryChainStore;
    use crate::config_store::FirmConfigStore;
    use crate::queue::NoopEventMirror;

    struct EchoLlm;

    #[async_trait::async_trait]
    impl LlmClient for EchoLlm {
        async fn complete(&self, masked_prompt: &str, _model: Option<&str>) -> Result<LlmCompletion> {
            Ok(LlmCompletion {
                text: format!("echo: {masked_prompt}"),
                model: "test-model".to_string(),
                provider: "test-provider".to_string(),
                prompt_tokens: 10,
                completion_tokens: 5,
            })
        }
    }

    fn orchestrator() -> ProxyOrchestrator {
        ProxyOrchestrator::new(
            Arc::new(FirmConfigStore::new()),
            Arc::new(InMemoryChainStore::new()),
            Arc::new(EventQueue::new(Arc::new(NoopEventMirror))),
            Arc::new(EchoLlm),
        )
    }

    #[tokio::test]
    async fn analyze_email_passthrough() {
        let orchestrator = orchestrator();
        let request = AnalyzeRequest {
            prompt: "Email me at alice@example.com".to_string(),
            firm_id: "firm1".to_string(),
            session_id: Uuid::new_v4(),
            user_id: None,
            ai_tool_id: "chatgpt".to_string(),
            capture_method: "browser".to_string(),
        };
        let response = orchestrator.analyze(request).await.unwrap();
        assert_eq!(response.route, Route::Passthrough);
        assert_eq!(response.score.score, 6);
        assert_eq!(response.masked_prompt, "Email me at alice@example.com");
    }

    #[tokio::test]
    async fn analyze_then_send_round_trips_through_llm() {
        let orchestrator = orchestrator();
        let session_id = Uuid::new_v4();
        let analyze_request = AnalyzeRequest {
            prompt: "SSN 123-45-6789 needs review".to_string(),
            firm_id: "firm1".to_string(),
            session_id,
            user_id: None,
            ai_tool_id: "chatgpt".to_string(),
            capture_method: "browser".to_string(),
        };
        let analyzed = orchestrator.analyze(analyze_request).await.unwrap();
        assert_ne!(analyzed.route, Route::Passthrough);

        let send_request = SendRequest {
            masked_prompt: analyzed.masked_prompt,
            route: analyzed.route,
            session_id,
            firm_id: "firm1".to_string(),
            model: None,
        };
        let sent = orchestrator.send(send_request).await.unwrap();
        assert!(sent.response.starts_with("echo: "));
    }
}
