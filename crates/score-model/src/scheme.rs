//! Schemes and their strategy-specific rule data.
//!
//! A scheme never carries code: its [`RuleSet`] is one of three declarative
//! shapes interpreted by a generic evaluator.
//!
//! - [`TabularRules`]: ordered stage rows, first full match wins
//! - [`AdditiveRules`]: per-field point tables summed within declared bounds
//! - [`ThresholdRules`]: ordered decision steps with point deltas and
//!   terminal steps

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::answers::AnswerSet;
use crate::field::Field;
use crate::predicate::{NumericTest, Predicate};

/// Evaluation strategy tag of a scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Tabular,
    Additive,
    Threshold,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Tabular => "tabular",
            Strategy::Additive => "additive",
            Strategy::Threshold => "threshold",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tabular" => Ok(Strategy::Tabular),
            "additive" => Ok(Strategy::Additive),
            "threshold" => Ok(Strategy::Threshold),
            other => Err(format!("unknown strategy: {other}")),
        }
    }
}

/// One constraint of a stage row: the field's answer must be one of `allowed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageConstraint {
    pub field: String,
    pub allowed: Vec<String>,
}

/// A conjunction of constraints mapped to a stage label. Fields without a
/// constraint match any answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRow {
    pub stage: String,
    pub constraints: Vec<StageConstraint>,
}

impl StageRow {
    pub fn matches(&self, answers: &AnswerSet) -> bool {
        self.constraints.iter().all(|c| {
            answers
                .choice(&c.field)
                .is_some_and(|value| c.allowed.iter().any(|a| a == value))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabularRules {
    /// Declared order is significant.
    pub rows: Vec<StageRow>,
}

/// Points for a numeric answer. A band without a test is the catch-all and
/// must come last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericBand {
    pub test: Option<NumericTest>,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Points {
    Options(BTreeMap<String, i64>),
    Bands(Vec<NumericBand>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointTable {
    pub field: String,
    pub points: Points,
}

/// Points awarded once when every predicate holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BonusGroup {
    pub id: String,
    pub all_of: Vec<Predicate>,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdditiveRules {
    pub min: i64,
    pub max: i64,
    pub tables: Vec<PointTable>,
    pub groups: Vec<BonusGroup>,
    /// Fields that annotate the result without contributing points.
    pub modifiers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionStep {
    pub id: String,
    pub when: Vec<Predicate>,
    pub points: i64,
    pub terminal: bool,
    pub bucket: Option<String>,
    pub finding: Option<String>,
}

impl DecisionStep {
    pub fn applies(&self, answers: &AnswerSet) -> bool {
        self.when.iter().all(|p| p.matches(answers))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdRules {
    pub steps: Vec<DecisionStep>,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum RuleSet {
    Tabular(TabularRules),
    Additive(AdditiveRules),
    Threshold(ThresholdRules),
}

impl RuleSet {
    pub fn strategy(&self) -> Strategy {
        match self {
            RuleSet::Tabular(_) => Strategy::Tabular,
            RuleSet::Additive(_) => Strategy::Additive,
            RuleSet::Threshold(_) => Strategy::Threshold,
        }
    }
}

/// Inclusive score band mapped to a qualitative label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub min: i64,
    pub max: i64,
    pub label: String,
}

impl Bucket {
    pub fn contains(&self, score: i64) -> bool {
        score >= self.min && score <= self.max
    }
}

/// A named, versioned staging or scoring system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scheme {
    pub id: String,
    pub name: String,
    pub version: String,
    pub category: String,
    pub source: Option<String>,
    pub fields: Vec<Field>,
    pub rules: RuleSet,
    pub buckets: Vec<Bucket>,
}

impl Scheme {
    pub fn strategy(&self) -> Strategy {
        self.rules.strategy()
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Fields declared `required`, regardless of conditional requirements.
    pub fn required_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.required)
    }

    /// First bucket containing `score`.
    pub fn bucket_for(&self, score: i64) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.contains(score))
    }

    pub fn summary(&self) -> SchemeSummary {
        SchemeSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            category: self.category.clone(),
            strategy: self.strategy(),
            required_fields: self.required_fields().count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemeSummary {
    pub id: String,
    pub name: String,
    pub version: String,
    pub category: String,
    pub strategy: Strategy,
    pub required_fields: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldValue;

    #[test]
    fn strategy_round_trips_through_str() {
        for strategy in [Strategy::Tabular, Strategy::Additive, Strategy::Threshold] {
            assert_eq!(strategy.as_str().parse::<Strategy>().unwrap(), strategy);
        }
        assert_eq!("ADDITIVE".parse::<Strategy>().unwrap(), Strategy::Additive);
        assert!("lookup".parse::<Strategy>().is_err());
    }

    #[test]
    fn stage_row_without_constraint_matches_any_value() {
        let row = StageRow {
            stage: "IV".to_string(),
            constraints: vec![StageConstraint {
                field: "m".to_string(),
                allowed: vec!["M1".to_string()],
            }],
        };
        let answers: AnswerSet = [
            ("t", FieldValue::choice("T1")),
            ("n", FieldValue::choice("N0")),
            ("m", FieldValue::choice("M1")),
        ]
        .into_iter()
        .collect();
        assert!(row.matches(&answers));
    }

    #[test]
    fn bucket_bounds_are_inclusive() {
        let bucket = Bucket {
            min: 4,
            max: 6,
            label: "low complexity".to_string(),
        };
        assert!(bucket.contains(4));
        assert!(bucket.contains(6));
        assert!(!bucket.contains(7));
    }
}
