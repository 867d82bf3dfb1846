//! Relationship analyzer: pairwise proximity/semantic links
//! between detected entities, folded into `entityScore` as `relBoost`.

use irongate_types::{DetectedEntity, EntityType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    PersonOrg,
    OrgOrg,
    Possessive,
    Proximity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRelationship {
    pub first: usize,
    pub second: usize,
    pub kind: RelationshipKind,
    pub strength: f64,
}

const MAX_DISTANCE: usize = 200;

/// Find relationships among `entities` (assumed sorted by start, as the
/// registry guarantees) and fold them into a single capped boost.
pub fn analyze(entities: &[DetectedEntity], text: &str) -> (Vec<EntityRelationship>, f64) {
    let mut relationships = Vec::new();

    for i in 0..entities.len() {
        for j in (i + 1)..entities.len() {
            let e1 = &entities[i];
            let e2 = &entities[j];
            // Distance is |e1.start - e2.end|, not the gap between the
            // spans, even though it reads like one.
            let distance = e1.start.abs_diff(e2.end);
            if distance > MAX_DISTANCE {
                continue;
            }

            let between = char_slice(text, e1.end.min(e2.start), e1.end.max(e2.start));
            let between_lower = between.to_lowercase();

            if let Some(rel) = classify_pair(e1, e2, distance, &between_lower) {
                relationships.push(EntityRelationship {
                    first: i,
                    second: j,
                    kind: rel.0,
                    strength: rel.1,
                });
            }
        }
    }

    let boost = relationships
        .iter()
        .map(|r| contribution(r.kind, r.strength))
        .sum::<f64>()
        .min(20.0);

    (relationships, boost)
}

fn classify_pair(
    e1: &DetectedEntity,
    e2: &DetectedEntity,
    distance: usize,
    between_lower: &str,
) -> Option<(RelationshipKind, f64)> {
    let types = (&e1.entity_type, &e2.entity_type);

    let is_person_org = matches!(
        types,
        (EntityType::Person, EntityType::Organization) | (EntityType::Organization, EntityType::Person)
    );
    if is_person_org
        && (contains_connector(between_lower, &[" at ", " of ", " from ", " with "]) || distance < 50)
    {
        let strength = if distance < 30 { 0.9 } else { 0.7 };
        return Some((RelationshipKind::PersonOrg, strength));
    }

    let is_org_org = matches!(types, (EntityType::Organization, EntityType::Organization));
    if is_org_org
        && contains_connector(
            between_lower,
            &["merger", "acquisition", "deal", "transaction", "agreement", "between", "and"],
        )
    {
        return Some((RelationshipKind::OrgOrg, 0.85));
    }

    if between_lower.contains("'s ") || between_lower.contains("' ") {
        return Some((RelationshipKind::Possessive, 0.75));
    }

    if distance < 100 {
        return Some((RelationshipKind::Proximity, 1.0 - (distance as f64 / 100.0)));
    }

    None
}

fn contains_connector(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn contribution(kind: RelationshipKind, strength: f64) -> f64 {
    match kind {
        RelationshipKind::PersonOrg => 10.0 * strength,
        RelationshipKind::OrgOrg => 15.0 * strength,
        RelationshipKind::Possessive => 8.0 * strength,
        RelationshipKind::Proximity => 3.0 * strength,
    }
}

fn char_slice(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end - start).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use irongate_types::EntitySource;

    fn ent(ty: EntityType, start: usize, end: usize, text: &str) -> DetectedEntity {
        DetectedEntity {
            entity_type: ty,
            text: text.to_string(),
            start,
            end,
            confidence: 0.9,
            source: EntitySource::Regex,
        }
    }

    #[test]
    fn person_org_with_connector() {
        let text = "John Smith works at Acme Corp today";
        let entities = vec![
            ent(EntityType::Person, 0, 10, "John Smith"),
            ent(EntityType::Organization, 20, 29, "Acme Corp"),
        ];
        let (rels, boost) = analyze(&entities, text);
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].kind, RelationshipKind::PersonOrg);
        assert!(boost > 0.0);
    }

    #[test]
    fn distant_entities_produce_no_relationship() {
        let text = "a".repeat(300);
        let entities = vec![
            ent(EntityType::Person, 0, 1, "a"),
            ent(EntityType::Organization, 290, 291, "a"),
        ];
        let (rels, boost) = analyze(&entities, &text);
        assert!(rels.is_empty());
        assert_eq!(boost, 0.0);
    }

    #[test]
    fn boost_is_capped_at_20() {
        let text = "Acme Corp and Beta Corp and Gamma Corp and Delta Corp merger acquisition deal";
        let entities = vec![
            ent(EntityType::Organization, 0, 9, "Acme Corp"),
            ent(EntityType::Organization, 14, 23, "Beta Corp"),
            ent(EntityType::Organization, 28, 38, "Gamma Corp"),
            ent(EntityType::Organization, 43, 53, "Delta Corp"),
        ];
        let (_, boost) = analyze(&entities, text);
        assert!(boost <= 20.0);
    }
}
