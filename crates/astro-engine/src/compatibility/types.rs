use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The sixteen score keys, in field order.
pub const SCORE_KEYS: [&str; 16] = [
    "interest",
    "communication",
    "resonation",
    "loyalty",
    "attraction",
    "empathy",
    "reasoning",
    "persuasion",
    "stubbornness",
    "ego",
    "sacrifice",
    "desire",
    "adaptability",
    "responsibility",
    "accountability",
    "hostility",
];

/// Sixteen named scores, each expected in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompatibilityScores {
    pub interest: f64,
    pub communication: f64,
    pub resonation: f64,
    pub loyalty: f64,
    pub attraction: f64,
    pub empathy: f64,
    pub reasoning: f64,
    pub persuasion: f64,
    pub stubbornness: f64,
    pub ego: f64,
    pub sacrifice: f64,
    pub desire: f64,
    pub adaptability: f64,
    pub responsibility: f64,
    pub accountability: f64,
    pub hostility: f64,
}

impl CompatibilityScores {
    /// Every key set to the same score.
    pub fn uniform(score: f64) -> Self {
        Self {
            interest: score,
            communication: score,
            resonation: score,
            loyalty: score,
            attraction: score,
            empathy: score,
            reasoning: score,
            persuasion: score,
            stubbornness: score,
            ego: score,
            sacrifice: score,
            desire: score,
            adaptability: score,
            responsibility: score,
            accountability: score,
            hostility: score,
        }
    }

    /// Build from a keyed map. All sixteen keys are required; missing keys
    /// are reported together, unknown keys are rejected.
    pub fn from_map(map: &BTreeMap<String, f64>) -> EngineResult<Self> {
        let missing: Vec<String> = SCORE_KEYS
            .iter()
            .filter(|key| !map.contains_key(**key))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::MissingScoreKey { missing });
        }
        if let Some(unknown) = map.keys().find(|k| !SCORE_KEYS.contains(&k.as_str())) {
            return Err(EngineError::invalid_input(
                unknown.as_str(),
                "not a compatibility score key",
            ));
        }

        let mut scores = Self::uniform(0.0);
        for (key, value) in map {
            if let Some(slot) = scores.slot_mut(key) {
                *slot = *value;
            }
        }
        Ok(scores)
    }

    /// Score by key name.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// `(key, score)` pairs in [`SCORE_KEYS`] order.
    pub fn entries(&self) -> [(&'static str, f64); 16] {
        [
            ("interest", self.interest),
            ("communication", self.communication),
            ("resonation", self.resonation),
            ("loyalty", self.loyalty),
            ("attraction", self.attraction),
            ("empathy", self.empathy),
            ("reasoning", self.reasoning),
            ("persuasion", self.persuasion),
            ("stubbornness", self.stubbornness),
            ("ego", self.ego),
            ("sacrifice", self.sacrifice),
            ("desire", self.desire),
            ("adaptability", self.adaptability),
            ("responsibility", self.responsibility),
            ("accountability", self.accountability),
            ("hostility", self.hostility),
        ]
    }

    /// Reject any score that is not finite or falls outside [0, 100].
    pub fn validate(&self) -> EngineResult<()> {
        for (key, value) in self.entries() {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(EngineError::invalid_input(
                    key,
                    format!("score {} is outside [0, 100]", value),
                ));
            }
        }
        Ok(())
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut f64> {
        let slot = match key {
            "interest" => &mut self.interest,
            "communication" => &mut self.communication,
            "resonation" => &mut self.resonation,
            "loyalty" => &mut self.loyalty,
            "attraction" => &mut self.attraction,
            "empathy" => &mut self.empathy,
            "reasoning" => &mut self.reasoning,
            "persuasion" => &mut self.persuasion,
            "stubbornness" => &mut self.stubbornness,
            "ego" => &mut self.ego,
            "sacrifice" => &mut self.sacrifice,
            "desire" => &mut self.desire,
            "adaptability" => &mut self.adaptability,
            "responsibility" => &mut self.responsibility,
            "accountability" => &mut self.accountability,
            "hostility" => &mut self.hostility,
            _ => return None,
        };
        Some(slot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipType {
    Consistent,
    Complicated,
    Toxic,
}

impl RelationshipType {
    /// Flat adjustment applied after weighting.
    pub fn adjustment(self) -> f64 {
        match self {
            RelationshipType::Consistent => 5.0,
            RelationshipType::Complicated => -5.0,
            RelationshipType::Toxic => -15.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RelationshipType::Consistent => "consistent",
            RelationshipType::Complicated => "complicated",
            RelationshipType::Toxic => "toxic",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RelationshipType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "consistent" => Ok(RelationshipType::Consistent),
            "complicated" => Ok(RelationshipType::Complicated),
            "toxic" => Ok(RelationshipType::Toxic),
            other => Err(EngineError::invalid_input(
                "relationshipType",
                format!("unknown relationship type '{}' (expected consistent, complicated or toxic)", other),
            )),
        }
    }
}

/// Aggregated score with the intermediate values that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityResult {
    /// Clamped and rounded percentage
    pub overall: u8,
    pub base: f64,
    pub adjustment: f64,
    pub relationship_type: RelationshipType,
}
