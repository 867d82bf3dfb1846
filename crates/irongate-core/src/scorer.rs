//! Sensitivity scorer: combines entity, volume, context,
//! legal, document-type, relationship, and conversation components into
//! a single 0-100 score and level.

use std::collections::HashMap;

use irongate_types::{DetectedEntity, EntityType, ScoreBreakdown, SensitivityLevel, SensitivityScore};
use regex::Regex;

use crate::classifier::Classification;
use crate::conversation_tracker::ConversationBoosts;

const LEGAL_CONTEXT_WINDOW: usize = 200;
const LEGAL_KEYWORDS: &[&str] = &[
    "privileged",
    "attorney-client",
    "work product",
    "without prejudice",
    "confidential",
    "under seal",
    "protective order",
    "settlement",
    "mediation",
    "arbitration",
    "deposition",
    "subpoena",
    "motion to compel",
    "discovery",
    "litigation hold",
    "retainer",
    "engagement letter",
];

const PRIVILEGE_PHRASES: &[&str] = &[
    "attorney-client privilege",
    "work product doctrine",
    "privileged and confidential",
    "attorney work product",
    "protected communication",
    "legal professional privilege",
];

fn default_weight(ty: &EntityType) -> f64 {
    match ty {
        EntityType::Person => 10.0,
        EntityType::Organization => 8.0,
        EntityType::Location => 3.0,
        EntityType::Date => 2.0,
        EntityType::PhoneNumber => 15.0,
        EntityType::Email => 12.0,
        EntityType::CreditCard => 30.0,
        EntityType::Ssn => 40.0,
        EntityType::MonetaryAmount => 12.0,
        EntityType::AccountNumber => 25.0,
        EntityType::IpAddress => 8.0,
        EntityType::MedicalRecord => 35.0,
        EntityType::PassportNumber => 35.0,
        EntityType::DriversLicense => 30.0,
        EntityType::MatterNumber => 20.0,
        EntityType::ClientMatterPair => 25.0,
        EntityType::PrivilegeMarker => 30.0,
        EntityType::DealCodename => 20.0,
        EntityType::OpposingCounsel => 15.0,
        EntityType::ApiKey => 50.0,
        EntityType::DatabaseUri => 50.0,
        EntityType::AuthToken => 45.0,
        EntityType::PrivateKey => 50.0,
        EntityType::AwsCredential => 50.0,
        EntityType::GcpCredential => 45.0,
        EntityType::AzureCredential => 45.0,
        EntityType::Plugin(_) => 5.0,
    }
}

fn weight(ty: &EntityType, overrides: &HashMap<EntityType, f64>) -> f64 {
    overrides.get(ty).copied().unwrap_or_else(|| default_weight(ty))
}

pub struct SensitivityScorer {
    matter_pattern: Regex,
    case_citation_pattern: Regex,
}

impl SensitivityScorer {
    pub fn new() -> Self {
        Self {
            matter_pattern: Regex::new(
                r"(?i)\b(?:matter|case|docket)\s*(?:#|no\.?|number)?\s*\d{2,4}[-./]\d{3,6}\b",
            )
            .expect("matter pattern must compile"),
            case_citation_pattern: Regex::new(r"\b[A-Z][a-z]+\s+v\.?\s+[A-Z][a-z]+\b")
                .expect("citation pattern must compile"),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn score(
        &self,
        text: &str,
        entities: &[DetectedEntity],
        classification: Classification,
        relationship_boost: f64,
        conversation: ConversationBoosts,
        weight_overrides: &HashMap<EntityType, f64>,
    ) -> SensitivityScore {
        let entity_score = entity_score(entities, weight_overrides, relationship_boost);
        let volume_score = volume_score(text.chars().count());
        let context_score = self.context_score(text, entities);
        let legal_boost = self.legal_boost(text);
        let conversation_escalation = conversation.sum();
        let document_type_multiplier = classification.document_type.multiplier();

        let raw = (entity_score + volume_score + context_score + legal_boost + conversation_escalation)
            * document_type_multiplier;
        let score = raw.round().clamp(0.0, 100.0) as u8;
        let level = SensitivityLevel::from_score(score);

        let breakdown = ScoreBreakdown {
            entity_score,
            volume_score,
            context_score,
            legal_boost,
            document_type_multiplier,
            conversation_escalation,
            firm_knowledge_boost: 0.0,
        };

        let explanation = self.explanation(entities, legal_boost > 0.0, text.chars().count());

        SensitivityScore { score, level, explanation, breakdown }
    }

    fn context_score(&self, text: &str, entities: &[DetectedEntity]) -> f64 {
        let chars: Vec<char> = text.chars().collect();
        let mut boost = 0.0;
        for entity in entities {
            let window_start = entity.start.saturating_sub(LEGAL_CONTEXT_WINDOW);
            let window_end = (entity.end + LEGAL_CONTEXT_WINDOW).min(chars.len());
            let window: String = chars[window_start..window_end].iter().collect();
            let window_lower = window.to_lowercase();
            if LEGAL_KEYWORDS.iter().any(|kw| window_lower.contains(kw)) {
                boost += 5.0;
            }
        }
        boost.min(25.0)
    }

    fn legal_boost(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let mut boost = 0.0;
        for phrase in PRIVILEGE_PHRASES {
            boost += 15.0 * lower.matches(phrase).count() as f64;
        }
        boost += 5.0 * self.case_citation_pattern.find_iter(text).count() as f64;
        if self.matter_pattern.is_match(text) {
            boost += 10.0;
        }
        boost.min(25.0)
    }

    fn explanation(&self, entities: &[DetectedEntity], has_privilege: bool, len: usize) -> String {
        let mut tallies: HashMap<String, u32> = HashMap::new();
        for entity in entities {
            *tallies.entry(entity.entity_type.as_wire_str().to_string()).or_insert(0) += 1;
        }
        let mut ranked: Vec<(String, u32)> = tallies.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(3);

        let mut parts: Vec<String> = ranked
            .iter()
            .map(|(ty, count)| format!("{count} {ty}"))
            .collect();
        if parts.is_empty() {
            parts.push("No sensitive entities detected.".to_string());
        }
        let mut explanation = parts.join(", ");
        if has_privilege {
            explanation.push_str(" Contains privilege markers.");
        }
        if len > 2000 {
            explanation.push_str(" Large text volume suggests pasted document.");
        }
        explanation
    }
}

impl Default for SensitivityScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw entity score from detected spans and type/count multipliers, with
/// the relationship boost folded in before the combined cap (90) applies.
fn entity_score(
    entities: &[DetectedEntity],
    overrides: &HashMap<EntityType, f64>,
    relationship_boost: f64,
) -> f64 {
    let raw: f64 = entities
        .iter()
        .map(|e| weight(&e.entity_type, overrides) * e.confidence as f64)
        .sum();

    let distinct_types = entities
        .iter()
        .map(|e| e.entity_type.as_wire_str())
        .collect::<std::collections::HashSet<_>>()
        .len();
    let type_multiplier = if distinct_types >= 3 {
        1.3
    } else if distinct_types >= 2 {
        1.15
    } else {
        1.0
    };

    let count_multiplier = if entities.len() >= 10 {
        1.4
    } else if entities.len() >= 5 {
        1.2
    } else {
        1.0
    };

    let clamped = (raw * type_multiplier * count_multiplier).min(70.0);
    (clamped + relationship_boost).min(90.0)
}

fn volume_score(len: usize) -> f64 {
    if len < 100 {
        0.0
    } else if len < 500 {
        5.0
    } else if len < 2000 {
        10.0
    } else if len < 5000 {
        10.0
    } else {
        20.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::DocumentType;
    use irongate_types::EntitySource;

    fn entity(ty: EntityType, confidence: f32) -> DetectedEntity {
        DetectedEntity {
            entity_type: ty,
            text: "x".into(),
            start: 0,
            end: 1,
            confidence,
            source: EntitySource::Regex,
        }
    }

    #[test]
    fn email_only_scores_low_passthrough() {
        let scorer = SensitivityScorer::new();
        let text = "Email me at alice@example.com";
        let entities = vec![DetectedEntity {
            entity_type: EntityType::Email,
            text: "alice@example.com".into(),
            start: 12,
            end: 29,
            confidence: 0.95,
            source: EntitySource::Regex,
        }];
        let classification = Classification {
            document_type: DocumentType::CasualQuestion,
            confidence: 1.0,
        };
        let result = scorer.score(
            text,
            &entities,
            classification,
            0.0,
            ConversationBoosts::default(),
            &HashMap::new(),
        );
        assert_eq!(result.score, 6);
        assert_eq!(result.level, SensitivityLevel::Low);
    }

    #[test]
    fn score_is_always_in_range() {
        let scorer = SensitivityScorer::new();
        let entities: Vec<DetectedEntity> = (0..20).map(|_| entity(EntityType::Ssn, 1.0)).collect();
        let classification = Classification {
            document_type: DocumentType::LitigationDoc,
            confidence: 1.0,
        };
        let result = scorer.score(
            &"x".repeat(6000),
            &entities,
            classification,
            20.0,
            ConversationBoosts { escalation: 15.0, cumulative_entity: 10.0, context_carryover: 15.0 },
            &HashMap::new(),
        );
        assert!(result.score <= 100);
    }

    #[test]
    fn entity_weight_override_changes_score() {
        let mut overrides = HashMap::new();
        overrides.insert(EntityType::Email, 100.0);
        let with_override = entity_score(
            &[entity(EntityType::Email, 1.0)],
            &overrides,
            0.0,
        );
        let without_override = entity_score(&[entity(EntityType::Email, 1.0)], &HashMap::new(), 0.0);
        assert!(with_override > without_override);
    }
}
