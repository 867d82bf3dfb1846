//! Conversation tracker: per-session turn history with
//! escalation, cumulative-entity, and context-carryover boosts.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use irongate_types::{ConversationTurn, DetectedEntity, MAX_TURNS, SESSION_TTL_MINUTES};
use tokio::sync::RwLock;
use uuid::Uuid;

const ESCALATION_CAP: f64 = 15.0;
const CUMULATIVE_CAP: f64 = 10.0;
const CONTEXT_CARRYOVER_CAP: f64 = 15.0;

const CONTINUATION_VERBS: &[&str] = &[
    "summarize",
    "explain",
    "expand",
    "elaborate",
    "continue",
    "rewrite",
    "rephrase",
];
const CONTINUATION_REFERENTS: &[&str] = &[
    "section", "paragraph", "part", "above", "previous", "that", "this",
];
const CONTINUATION_DOC_NOUNS: &[&str] = &["document", "contract", "memo", "email", "agreement"];

/// A single session's ring buffer of turns, reset wholesale on TTL expiry.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: Uuid,
    pub turns: Vec<ConversationTurn>,
    pub last_activity_ms: i64,
}

impl Session {
    fn new(session_id: Uuid, now_ms: i64) -> Self {
        Self {
            session_id,
            turns: Vec::new(),
            last_activity_ms: now_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConversationBoosts {
    pub escalation: f64,
    pub cumulative_entity: f64,
    pub context_carryover: f64,
}

impl ConversationBoosts {
    pub fn sum(&self) -> f64 {
        self.escalation + self.cumulative_entity + self.context_carryover
    }
}

/// Per-firm store of sessions, partitioned by session id, mirroring the
/// pseudonym store's shape: one lock per session entry via the outer map.
pub struct ConversationTracker {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl ConversationTracker {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Boosts for `current_text` against the session's history as it
    /// stands before this turn is recorded; the turn itself is added
    /// separately via `add_turn`.
    pub async fn current_boosts(
        &self,
        session_id: Uuid,
        current_text: &str,
        now_ms: i64,
    ) -> ConversationBoosts {
        let sessions = self.sessions.read().await;
        let Some(session) = sessions.get(&session_id) else {
            return ConversationBoosts::default();
        };
        if is_expired(session.last_activity_ms, now_ms) {
            return ConversationBoosts::default();
        }
        compute_boosts(&session.turns, current_text)
    }

    /// Record this turn, resetting the session first if the TTL elapsed.
    /// Reset only happens here, at the start of a write, never mid-read.
    pub async fn add_turn(
        &self,
        session_id: Uuid,
        text: String,
        entities: Vec<DetectedEntity>,
        score: u8,
        now_ms: i64,
    ) -> Uuid {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(session_id).or_insert_with(|| Session::new(session_id, now_ms));

        if is_expired(session.last_activity_ms, now_ms) {
            *session = Session::new(Uuid::new_v4(), now_ms);
        }
        let active_id = session.session_id;

        session.turns.push(ConversationTurn {
            text,
            entities,
            score,
            timestamp_ms: now_ms,
        });
        if session.turns.len() > MAX_TURNS {
            let overflow = session.turns.len() - MAX_TURNS;
            session.turns.drain(0..overflow);
        }
        session.last_activity_ms = now_ms;

        if active_id != session_id {
            let moved = sessions.remove(&session_id).expect("just inserted");
            sessions.insert(active_id, moved);
        }
        active_id
    }
}

impl Default for ConversationTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn is_expired(last_activity_ms: i64, now_ms: i64) -> bool {
    let idle_minutes = (now_ms - last_activity_ms).max(0) / 60_000;
    idle_minutes > SESSION_TTL_MINUTES
}

fn compute_boosts(turns: &[ConversationTurn], current_text: &str) -> ConversationBoosts {
    ConversationBoosts {
        escalation: escalation_boost(turns),
        cumulative_entity: cumulative_entity_boost(turns),
        context_carryover: context_carryover_boost(turns, current_text),
    }
}

/// Escalation boost: over the last 5 turns, inspect each consecutive pair.
fn escalation_boost(turns: &[ConversationTurn]) -> f64 {
    let window = last_n(turns, 5);
    if window.len() < 2 {
        return 0.0;
    }

    let mut boost = 0.0;
    for pair in window.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.score as i32 - prev.score as i32 > 10 {
            boost += 5.0;
        }
        if cur.text.chars().count() > prev.text.chars().count() * 3 && cur.text.chars().count() > 500
        {
            boost += 10.0;
        }
        let prev_types: HashSet<_> = prev.entities.iter().map(|e| e.entity_type.clone()).collect();
        let new_types = cur
            .entities
            .iter()
            .map(|e| e.entity_type.clone())
            .filter(|t| !prev_types.contains(t))
            .collect::<HashSet<_>>()
            .len();
        boost += 2.0 * new_types as f64;
    }
    boost.min(ESCALATION_CAP)
}

/// Cumulative-entity boost: count distinct (type, lowercase text) keys
/// across the whole retained history.
fn cumulative_entity_boost(turns: &[ConversationTurn]) -> f64 {
    let mut counts: HashMap<(String, String), u32> = HashMap::new();
    for turn in turns {
        for entity in &turn.entities {
            let key = (entity.entity_type.as_wire_str().to_string(), entity.text.to_lowercase());
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    let mut boost = 0.0;
    for count in counts.values() {
        if *count >= 3 {
            boost += 5.0;
        } else if *count == 2 {
            boost += 2.0;
        }
    }
    boost.min(CUMULATIVE_CAP)
}

/// Context carryover boost: the current turn (being analyzed, not yet
/// recorded) references "the document above" etc. and a recent prior
/// turn scored high.
fn context_carryover_boost(turns: &[ConversationTurn], current_text: &str) -> f64 {
    if current_text.chars().count() >= 200 {
        return 0.0;
    }
    let lower = current_text.to_lowercase();
    if !looks_like_continuation(&lower) {
        return 0.0;
    }

    let window = last_n(turns, 5);
    let max_score = window.iter().map(|t| t.score).max().unwrap_or(0);
    if max_score <= 40 {
        return 0.0;
    }
    (max_score as f64 * 0.3).min(CONTEXT_CARRYOVER_CAP)
}

fn looks_like_continuation(lower: &str) -> bool {
    let has_verb = CONTINUATION_VERBS.iter().any(|w| lower.contains(w));
    let has_referent = CONTINUATION_REFERENTS.iter().any(|w| lower.contains(w));
    let has_doc_phrase = CONTINUATION_DOC_NOUNS
        .iter()
        .any(|noun| lower.contains(&format!("the {noun}")));
    has_verb || has_referent || has_doc_phrase
}

fn last_n<T>(items: &[T], n: usize) -> &[T] {
    let start = items.len().saturating_sub(n);
    &items[start..]
}

/// Shared tracker handle, one per process, partitioned internally by
/// session id.
pub type SharedConversationTracker = Arc<ConversationTracker>;

#[cfg(test)]
mod tests {
    use super::*;
    use irongate_types::EntitySource;
    use irongate_types::EntityType;

    fn entity(ty: EntityType, text: &str) -> DetectedEntity {
        DetectedEntity {
            entity_type: ty,
            text: text.to_string(),
            start: 0,
            end: text.chars().count(),
            confidence: 0.9,
            source: EntitySource::Regex,
        }
    }

    #[tokio::test]
    async fn retains_at_most_max_turns() {
        let tracker = ConversationTracker::new();
        let session_id = Uuid::new_v4();
        let mut now = 0i64;
        for i in 0..25 {
            tracker
                .add_turn(session_id, format!("turn {i}"), vec![], 10, now)
                .await;
            now += 1_000;
        }
        let sessions = tracker.sessions.read().await;
        assert_eq!(sessions.get(&session_id).unwrap().turns.len(), MAX_TURNS);
    }

    #[tokio::test]
    async fn ttl_expiry_resets_session_id() {
        let tracker = ConversationTracker::new();
        let session_id = Uuid::new_v4();
        tracker.add_turn(session_id, "hello".into(), vec![], 10, 0).await;
        let far_future = 40 * 60_000;
        let new_id = tracker
            .add_turn(session_id, "still there?".into(), vec![], 10, far_future)
            .await;
        assert_ne!(new_id, session_id);
    }

    #[tokio::test]
    async fn context_carryover_boost_applies() {
        let tracker = ConversationTracker::new();
        let session_id = Uuid::new_v4();
        tracker.add_turn(session_id, "a".repeat(50), vec![], 80, 0).await;

        // "Please summarize the contract above." should read as a
        // continuation once a prior turn scored 80, even though it is
        // only queried here and not yet recorded via `add_turn`.
        let boosts = tracker
            .current_boosts(session_id, "Please summarize the contract above.", 1_000)
            .await;
        assert_eq!(boosts.context_carryover, 15.0);
    }

    #[test]
    fn cumulative_entity_boost_counts_repeats() {
        let turns = vec![
            ConversationTurn { text: "t1".into(), entities: vec![entity(EntityType::Person, "Bob")], score: 10, timestamp_ms: 0 },
            ConversationTurn { text: "t2".into(), entities: vec![entity(EntityType::Person, "bob")], score: 10, timestamp_ms: 1 },
            ConversationTurn { text: "t3".into(), entities: vec![entity(EntityType::Person, "BOB")], score: 10, timestamp_ms: 2 },
        ];
        assert_eq!(cumulative_entity_boost(&turns), 5.0);
    }
}
