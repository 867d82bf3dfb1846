//! Shared overlap-resolution walk used by both the regex recognizer and
//! the recognizer registry. Both follow the same "sort by start, walk
//! once, keep the higher-priority span" algorithm; only the priority
//! comparator differs.

use irongate_types::DetectedEntity;
use std::cmp::Ordering;

/// Resolve a list of candidate spans into a sorted, non-overlapping
/// sequence. `keeps_cand` decides, for two overlapping spans, whether
/// `cand` should replace `incumbent`.
pub fn resolve_overlaps(
    mut candidates: Vec<DetectedEntity>,
    keeps_cand: impl Fn(&DetectedEntity, &DetectedEntity) -> bool,
) -> Vec<DetectedEntity> {
    candidates.sort_by(|a, b| a.start.cmp(&b.start));

    let mut accepted: Vec<DetectedEntity> = Vec::with_capacity(candidates.len());
    for cand in candidates {
        let mut discarded = false;
        while let Some(incumbent) = accepted.last() {
            if cand.start < incumbent.end {
                if keeps_cand(&cand, incumbent) {
                    accepted.pop();
                } else {
                    discarded = true;
                    break;
                }
            } else {
                break;
            }
        }
        if !discarded {
            accepted.push(cand);
        }
    }
    accepted
}

/// Regex-recognizer comparator: higher confidence wins; ties keep the
/// incumbent (the one already accepted, which — since we walk in start
/// order — is the earlier span).
pub fn c1_priority(cand: &DetectedEntity, incumbent: &DetectedEntity) -> bool {
    cand.confidence > incumbent.confidence
}

/// Registry-wide comparator: higher confidence wins; ties break by
/// source priority (regex > plugin > client_matter > model).
pub fn c2_priority(cand: &DetectedEntity, incumbent: &DetectedEntity) -> bool {
    match cand
        .confidence
        .partial_cmp(&incumbent.confidence)
        .unwrap_or(Ordering::Equal)
    {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => cand.source.priority() > incumbent.source.priority(),
    }
}

/// Remove exact (start, end, type) duplicates, keeping the first
/// occurrence.
pub fn dedupe_exact(candidates: Vec<DetectedEntity>) -> Vec<DetectedEntity> {
    let mut seen = std::collections::HashSet::new();
    candidates
        .into_iter()
        .filter(|e| seen.insert((e.start, e.end, e.entity_type.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use irongate_types::{EntitySource, EntityType};

    fn ent(start: usize, end: usize, confidence: f32, source: EntitySource) -> DetectedEntity {
        DetectedEntity {
            entity_type: EntityType::Email,
            text: "x".repeat(end - start),
            start,
            end,
            confidence,
            source,
        }
    }

    #[test]
    fn non_overlapping_all_kept() {
        let candidates = vec![
            ent(0, 5, 0.9, EntitySource::Regex),
            ent(5, 10, 0.9, EntitySource::Regex),
        ];
        let out = resolve_overlaps(candidates, c1_priority);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn higher_confidence_wins_overlap() {
        let candidates = vec![
            ent(0, 10, 0.5, EntitySource::Regex),
            ent(5, 15, 0.9, EntitySource::Regex),
        ];
        let out = resolve_overlaps(candidates, c1_priority);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start, 5);
    }

    #[test]
    fn tie_keeps_earlier() {
        let candidates = vec![
            ent(0, 10, 0.8, EntitySource::Regex),
            ent(5, 15, 0.8, EntitySource::Regex),
        ];
        let out = resolve_overlaps(candidates, c1_priority);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start, 0);
    }

    #[test]
    fn source_priority_breaks_ties() {
        let candidates = vec![
            ent(0, 10, 0.8, EntitySource::ClientMatter),
            ent(5, 15, 0.8, EntitySource::Regex),
        ];
        let out = resolve_overlaps(candidates, c2_priority);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source, EntitySource::Regex);
    }

    #[test]
    fn output_is_sorted_and_non_overlapping() {
        let candidates = vec![
            ent(20, 25, 0.9, EntitySource::Regex),
            ent(0, 10, 0.9, EntitySource::Regex),
            ent(8, 12, 0.95, EntitySource::Regex),
        ];
        let out = resolve_overlaps(candidates, c1_priority);
        for w in out.windows(2) {
            assert!(w[0].end <= w[1].start);
            assert!(w[0].start <= w[1].start);
        }
    }
}
