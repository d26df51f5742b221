use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::FieldValue;

/// Points contributed by one field, bonus group or decision step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub source: String,
    pub points: i64,
}

impl Contribution {
    pub fn new(source: impl Into<String>, points: i64) -> Self {
        Self {
            source: source.into(),
            points,
        }
    }
}

/// Outcome of a tabular (stage grouping) scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutcome {
    pub stage: String,
    /// Zero-based index of the matching row in declared order.
    pub row: usize,
    /// Answers of the fields the matching row constrained.
    pub components: BTreeMap<String, FieldValue>,
}

/// Outcome of an additive or threshold scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub score: i64,
    pub contributions: Vec<Contribution>,
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modifiers: BTreeMap<String, FieldValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Stage(StageOutcome),
    Score(ScoreOutcome),
}

/// Immutable result of evaluating one answer set against one scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub scheme_id: String,
    pub scheme_version: String,
    pub outcome: Outcome,
}

impl ScoreResult {
    pub fn stage(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Stage(stage) => Some(&stage.stage),
            Outcome::Score(_) => None,
        }
    }

    pub fn score(&self) -> Option<i64> {
        match &self.outcome {
            Outcome::Score(score) => Some(score.score),
            Outcome::Stage(_) => None,
        }
    }

    pub fn bucket(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Score(score) => score.bucket.as_deref(),
            Outcome::Stage(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_round_trips_through_json() {
        let result = ScoreResult {
            scheme_id: "renal".to_string(),
            scheme_version: "2009".to_string(),
            outcome: Outcome::Score(ScoreOutcome {
                score: 7,
                contributions: vec![Contribution::new("radius", 3)],
                bucket: Some("moderate complexity".to_string()),
                modifiers: BTreeMap::new(),
                findings: Vec::new(),
            }),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""kind":"score""#));
        assert!(!json.contains("modifiers"));
        let back: ScoreResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
        assert_eq!(back.score(), Some(7));
        assert_eq!(back.stage(), None);
    }
}
