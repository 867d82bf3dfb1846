//! Sensitivity score, level, and breakdown.

use serde::{Deserialize, Serialize};

/// Coarse sensitivity band. Boundaries: 0-25 low, 26-60 medium,
/// 61-85 high, 86-100 critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensitivityLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl SensitivityLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=25 => SensitivityLevel::Low,
            26..=60 => SensitivityLevel::Medium,
            61..=85 => SensitivityLevel::High,
            _ => SensitivityLevel::Critical,
        }
    }
}

/// The individual components that were summed and multiplied to produce
/// the final score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub entity_score: f64,
    pub volume_score: f64,
    pub context_score: f64,
    pub legal_boost: f64,
    pub document_type_multiplier: f64,
    pub conversation_escalation: f64,
    /// Reserved for firm-specific knowledge-base matches. No scoring
    /// source currently populates it; always 0.
    pub firm_knowledge_boost: f64,
}

/// The final sensitivity verdict for one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityScore {
    pub score: u8,
    pub level: SensitivityLevel,
    pub explanation: String,
    pub breakdown: ScoreBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_boundaries() {
        assert_eq!(SensitivityLevel::from_score(0), SensitivityLevel::Low);
        assert_eq!(SensitivityLevel::from_score(25), SensitivityLevel::Low);
        assert_eq!(SensitivityLevel::from_score(26), SensitivityLevel::Medium);
        assert_eq!(SensitivityLevel::from_score(60), SensitivityLevel::Medium);
        assert_eq!(SensitivityLevel::from_score(61), SensitivityLevel::High);
        assert_eq!(SensitivityLevel::from_score(85), SensitivityLevel::High);
        assert_eq!(SensitivityLevel::from_score(86), SensitivityLevel::Critical);
        assert_eq!(SensitivityLevel::from_score(100), SensitivityLevel::Critical);
    }
}
