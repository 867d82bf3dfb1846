//! Sensitivity pipeline and proxy flow: entity detection, scoring,
//! pseudonymization, routing, and the tamper-evident audit chain.

pub mod chain;
pub mod classifier;
pub mod config_store;
pub mod conversation_tracker;
pub mod error;
pub mod health_probe;
pub mod orchestrator;
pub mod pseudonymizer;
pub mod queue;
pub mod recognizer;
pub mod relationships;
pub mod router;
pub mod scorer;

pub use chain::{ChainStore, InMemoryChainStore};
pub use classifier::{Classification, DocumentClassifier, DocumentType};
pub use config_store::{FirmConfigRepository, FirmConfigStore};
pub use conversation_tracker::{ConversationBoosts, ConversationTracker};
pub use error::{IronGateError, Result};
pub use orchestrator::{
    AnalyzeRequest, AnalyzeResponse, LlmClient, LlmCompletion, ProxyOrchestrator, SendRequest,
    SendResponse,
};
pub use pseudonymizer::PseudonymStore;
pub use queue::{EventMirror, EventQueue, NoopEventMirror};
pub use recognizer::{ClientMatterRecognizer, Recognizer, RecognizerRegistry, RegexRecognizer};
pub use relationships::{EntityRelationship, RelationshipKind};
pub use router::{route, Route};
pub use scorer::SensitivityScorer;
