//! Weighted aggregation of the sixteen compatibility scores into one
//! percentage.

pub mod types;

pub use types::{CompatibilityResult, CompatibilityScores, RelationshipType, SCORE_KEYS};

use crate::error::{EngineError, EngineResult};
use std::collections::{BTreeMap, HashMap};

lazy_static::lazy_static! {
    /// Signed weight per score key. Hostility counts against the total.
    static ref WEIGHTS: HashMap<&'static str, f64> = {
        let mut weights = HashMap::new();
        weights.insert("interest", 1.0);
        weights.insert("communication", 1.3);
        weights.insert("resonation", 1.2);
        weights.insert("loyalty", 1.5);
        weights.insert("attraction", 1.1);
        weights.insert("empathy", 1.3);
        weights.insert("reasoning", 0.9);
        weights.insert("persuasion", 0.8);
        weights.insert("stubbornness", 0.8);
        weights.insert("ego", 0.8);
        weights.insert("sacrifice", 1.0);
        weights.insert("desire", 1.1);
        weights.insert("adaptability", 1.0);
        weights.insert("responsibility", 1.2);
        weights.insert("accountability", 1.2);
        weights.insert("hostility", -1.0);
        weights
    };
}

/// Weight applied to `key`, if it is a score key.
pub fn weight_of(key: &str) -> Option<f64> {
    WEIGHTS.get(key).copied()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompatibilityScorer;

impl CompatibilityScorer {
    pub fn new() -> Self {
        Self
    }

    /// Weighted mean of the scores, shifted by the relationship adjustment,
    /// clamped to [0, 100] and rounded.
    ///
    /// The mean divides by the signed weight sum, so sixteen equal scores
    /// give back that score before adjustment.
    pub fn score(
        &self,
        scores: &CompatibilityScores,
        relationship: RelationshipType,
    ) -> EngineResult<CompatibilityResult> {
        scores.validate()?;

        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        for (key, value) in scores.entries() {
            let weight = weight_of(key)
                .ok_or_else(|| EngineError::invariant(format!("no weight for score key {}", key)))?;
            weighted_sum += value * weight;
            total_weight += weight;
        }
        if total_weight.abs() < f64::EPSILON {
            return Err(EngineError::invariant("compatibility weights sum to zero"));
        }

        let base = weighted_sum / total_weight;
        let adjustment = relationship.adjustment();
        let overall = (base + adjustment).clamp(0.0, 100.0).round() as u8;

        log::debug!(
            "compatibility: base {:.2}, {} adjustment {:+}, overall {}",
            base,
            relationship,
            adjustment,
            overall
        );
        Ok(CompatibilityResult {
            overall,
            base,
            adjustment,
            relationship_type: relationship,
        })
    }

    /// Score a keyed map with a textual relationship type.
    pub fn score_map(
        &self,
        scores: &BTreeMap<String, f64>,
        relationship: &str,
    ) -> EngineResult<CompatibilityResult> {
        let scores = CompatibilityScores::from_map(scores)?;
        let relationship: RelationshipType = relationship.parse()?;
        self.score(&scores, relationship)
    }
}
