//! Predicates over answer sets.
//!
//! Used by conditional requirements, additive bonus groups, numeric point
//! bands and threshold decision steps. A predicate on an unanswered field is
//! always false.

use std::fmt;

use serde::Serialize;

use crate::answers::AnswerSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl Comparison {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Eq => "=",
        }
    }

    pub fn holds(&self, left: f64, right: f64) -> bool {
        match self {
            Comparison::Lt => left < right,
            Comparison::Le => left <= right,
            Comparison::Gt => left > right,
            Comparison::Ge => left >= right,
            Comparison::Eq => left == right,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numeric threshold such as `> 1.5`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericTest {
    pub op: Comparison,
    pub value: f64,
}

impl NumericTest {
    pub fn new(op: Comparison, value: f64) -> Self {
        Self { op, value }
    }

    pub fn holds(&self, number: f64) -> bool {
        self.op.holds(number, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Test {
    /// Choice answer is one of the listed option values.
    OneOf(Vec<String>),
    /// Numeric answer satisfies the comparison.
    Compare(NumericTest),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predicate {
    pub field: String,
    pub test: Test,
}

impl Predicate {
    pub fn one_of(field: impl Into<String>, values: &[&str]) -> Self {
        Self {
            field: field.into(),
            test: Test::OneOf(values.iter().map(|v| v.to_string()).collect()),
        }
    }

    pub fn compare(field: impl Into<String>, op: Comparison, value: f64) -> Self {
        Self {
            field: field.into(),
            test: Test::Compare(NumericTest::new(op, value)),
        }
    }

    pub fn matches(&self, answers: &AnswerSet) -> bool {
        let Some(answer) = answers.get(&self.field) else {
            return false;
        };
        match &self.test {
            Test::OneOf(values) => answer
                .as_choice()
                .is_some_and(|choice| values.iter().any(|v| v == choice)),
            Test::Compare(test) => answer.as_number().is_some_and(|n| test.holds(n)),
        }
    }
}

/// Conjunction of predicates. An empty condition always holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Condition {
    pub all_of: Vec<Predicate>,
}

impl Condition {
    pub fn new(all_of: Vec<Predicate>) -> Self {
        Self { all_of }
    }

    pub fn holds(&self, answers: &AnswerSet) -> bool {
        self.all_of.iter().all(|p| p.matches(answers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldValue;

    #[test]
    fn absent_field_never_matches() {
        let answers = AnswerSet::new();
        assert!(!Predicate::one_of("t2_signal", &["low"]).matches(&answers));
        assert!(!Predicate::compare("ader", Comparison::Le, 1.5).matches(&answers));
    }

    #[test]
    fn numeric_comparisons_respect_strictness() {
        let mut answers = AnswerSet::new();
        answers.insert("ader", FieldValue::Number(1.5));
        assert!(!Predicate::compare("ader", Comparison::Gt, 1.5).matches(&answers));
        assert!(Predicate::compare("ader", Comparison::Ge, 1.5).matches(&answers));
        assert!(Predicate::compare("ader", Comparison::Eq, 1.5).matches(&answers));
    }

    #[test]
    fn kind_mismatch_does_not_match() {
        let mut answers = AnswerSet::new();
        answers.insert("macro_fat", FieldValue::Number(1.0));
        assert!(!Predicate::one_of("macro_fat", &["yes"]).matches(&answers));
    }

    #[test]
    fn condition_is_a_conjunction() {
        let mut answers = AnswerSet::new();
        answers.insert("macro_fat", FieldValue::choice("no"));
        answers.insert("micro_fat", FieldValue::choice("yes"));
        let condition = Condition::new(vec![
            Predicate::one_of("macro_fat", &["no"]),
            Predicate::one_of("micro_fat", &["no"]),
        ]);
        assert!(!condition.holds(&answers));
        assert!(Condition::default().holds(&answers));
    }
}
