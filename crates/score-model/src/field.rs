//! Field definitions and the field-level domain check.
//!
//! A field is one clinical question. Its [`FieldKind`] declares the closed
//! domain of acceptable values:
//!
//! - **Choice**: one of a closed set of options. Options carry synonyms used
//!   only when parsing free-form input; [`validate`] accepts canonical values.
//! - **Bounded number**: finite number inside an inclusive range.
//! - **Number**: any finite number.
//! - **Date**: calendar date, parsed from `YYYY-MM-DD`.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::answers::AnswerSet;
use crate::error::{Result, ScoreError};
use crate::predicate::Condition;

/// A declared option of a choice field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceOption {
    /// Canonical value stored in answer sets and referenced by rules.
    pub value: String,
    /// Display label; also recognized when parsing input.
    pub label: Option<String>,
    /// Alternative spellings that normalize to `value`.
    pub synonyms: Vec<String>,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: None,
            synonyms: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_synonyms(mut self, synonyms: &[&str]) -> Self {
        self.synonyms = synonyms.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Every spelling that identifies this option: value, label, synonyms.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.value.as_str())
            .chain(self.label.as_deref())
            .chain(self.synonyms.iter().map(String::as_str))
    }

    /// Case-insensitive match of `raw` against any spelling of this option.
    pub fn is_spelled(&self, raw: &str) -> bool {
        let needle = raw.trim().to_lowercase();
        self.terms().any(|term| term.to_lowercase() == needle)
    }
}

/// Semantic data type and domain of a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Choice { options: Vec<ChoiceOption> },
    BoundedNumber { min: f64, max: f64 },
    Number,
    Date,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Choice { .. } => "choice",
            FieldKind::BoundedNumber { .. } => "bounded_number",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::BoundedNumber { .. } | FieldKind::Number)
    }
}

/// Free-text recognition hints used by the report-text extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractSpec {
    /// Literal labels that precede the value in report text.
    pub anchors: Vec<String>,
    /// Regular expression whose first capture group is the raw value.
    pub pattern: Option<String>,
}

impl ExtractSpec {
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty() && self.pattern.is_none()
    }
}

/// One clinical question of a scheme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub id: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Alternative conditions under which a `required` field applies.
    /// Empty means the field is always required.
    pub required_when: Vec<Condition>,
    pub unit: Option<String>,
    pub extract: Option<ExtractSpec>,
}

impl Field {
    pub fn new(id: impl Into<String>, kind: FieldKind) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            kind,
            required: true,
            required_when: Vec::new(),
            unit: None,
            extract: None,
        }
    }

    pub fn choice(id: impl Into<String>, values: &[&str]) -> Self {
        let options = values.iter().map(|v| ChoiceOption::new(*v)).collect();
        Self::new(id, FieldKind::Choice { options })
    }

    pub fn bounded(id: impl Into<String>, min: f64, max: f64) -> Self {
        Self::new(id, FieldKind::BoundedNumber { min, max })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn required_when(mut self, condition: Condition) -> Self {
        self.required_when.push(condition);
        self
    }

    pub fn with_extract(mut self, extract: ExtractSpec) -> Self {
        self.extract = Some(extract);
        self
    }

    /// Declared options, empty for non-choice fields.
    pub fn options(&self) -> &[ChoiceOption] {
        match &self.kind {
            FieldKind::Choice { options } => options,
            _ => &[],
        }
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options().iter().any(|o| o.value == value)
    }

    /// Whether this field must be answered given the current answers.
    pub fn is_required(&self, answers: &AnswerSet) -> bool {
        self.required
            && (self.required_when.is_empty()
                || self.required_when.iter().any(|c| c.holds(answers)))
    }

    /// True iff `value` belongs to the declared domain. Never coerces.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        match (&self.kind, value) {
            (FieldKind::Choice { options }, FieldValue::Choice(choice)) => {
                options.iter().any(|o| o.value == *choice)
            }
            (FieldKind::BoundedNumber { min, max }, FieldValue::Number(n)) => {
                n.is_finite() && *n >= *min && *n <= *max
            }
            (FieldKind::Number, FieldValue::Number(n)) => n.is_finite(),
            (FieldKind::Date, FieldValue::Date(_)) => true,
            _ => false,
        }
    }

    /// Parse raw user or report text into a domain-valid value.
    ///
    /// Choice input is matched case-insensitively against option values,
    /// labels and synonyms and normalized to the canonical value.
    pub fn parse(&self, raw: &str) -> Result<FieldValue> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ScoreError::invalid_value(&self.id, raw, "empty value"));
        }
        let value = match &self.kind {
            FieldKind::Choice { options } => {
                let option = options
                    .iter()
                    .find(|o| o.value == trimmed)
                    .or_else(|| options.iter().find(|o| o.is_spelled(trimmed)))
                    .ok_or_else(|| {
                        ScoreError::invalid_value(&self.id, raw, "not a declared option")
                    })?;
                FieldValue::Choice(option.value.clone())
            }
            FieldKind::BoundedNumber { .. } | FieldKind::Number => {
                let number: f64 = trimmed
                    .parse()
                    .map_err(|_| ScoreError::invalid_value(&self.id, raw, "not a number"))?;
                FieldValue::Number(number)
            }
            FieldKind::Date => {
                let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
                    ScoreError::invalid_value(&self.id, raw, "expected a YYYY-MM-DD date")
                })?;
                FieldValue::Date(date)
            }
        };
        self.check(&value)?;
        Ok(value)
    }

    /// Like [`Field::accepts`], reporting why a value was rejected.
    pub fn check(&self, value: &FieldValue) -> Result<()> {
        if self.accepts(value) {
            return Ok(());
        }
        let reason = match (&self.kind, value) {
            (FieldKind::Choice { .. }, FieldValue::Choice(_)) => "not a declared option".into(),
            (FieldKind::BoundedNumber { min, max }, FieldValue::Number(_)) => {
                format!("outside the range [{min}, {max}]")
            }
            (FieldKind::Number, FieldValue::Number(_)) => "not a finite number".into(),
            (kind, _) => format!("expected a {} value", kind.as_str()),
        };
        Err(ScoreError::invalid_value(&self.id, value.to_string(), reason))
    }
}

/// Domain check for one field (`validate(field, value) -> bool`).
pub fn validate(field: &Field, value: &FieldValue) -> bool {
    field.accepts(value)
}

/// A concrete answer value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Choice(String),
    Number(f64),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn choice(value: impl Into<String>) -> Self {
        FieldValue::Choice(value.into())
    }

    pub fn as_choice(&self) -> Option<&str> {
        match self {
            FieldValue::Choice(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Choice(value.to_string())
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Choice(value) => f.write_str(value),
            FieldValue::Number(value) => write!(f, "{value}"),
            FieldValue::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exophytic() -> Field {
        Field::new(
            "exophytic",
            FieldKind::Choice {
                options: vec![
                    ChoiceOption::new("ge50").with_label(">=50% exophytic"),
                    ChoiceOption::new("lt50").with_synonyms(&["mostly endophytic"]),
                    ChoiceOption::new("endophytic"),
                ],
            },
        )
    }

    #[test]
    fn choice_accepts_only_canonical_values() {
        let field = exophytic();
        assert!(validate(&field, &FieldValue::choice("lt50")));
        assert!(!validate(&field, &FieldValue::choice("LT50")));
        assert!(!validate(&field, &FieldValue::choice("partial")));
        assert!(!validate(&field, &FieldValue::Number(1.0)));
    }

    #[test]
    fn choice_parse_normalizes_synonyms() {
        let field = exophytic();
        assert_eq!(
            field.parse("Mostly Endophytic").unwrap(),
            FieldValue::choice("lt50")
        );
        assert_eq!(
            field.parse(">=50% EXOPHYTIC").unwrap(),
            FieldValue::choice("ge50")
        );
        assert!(matches!(
            field.parse("half"),
            Err(ScoreError::InvalidFieldValue { .. })
        ));
    }

    #[test]
    fn bounded_number_rejects_out_of_range_and_nan() {
        let field = Field::bounded("radius", 0.1, 30.0);
        assert!(field.accepts(&FieldValue::Number(4.2)));
        assert!(field.accepts(&FieldValue::Number(30.0)));
        assert!(!field.accepts(&FieldValue::Number(30.5)));
        assert!(!field.accepts(&FieldValue::Number(f64::NAN)));
        assert!(field.parse("31").is_err());
        assert_eq!(field.parse(" 4.2 ").unwrap(), FieldValue::Number(4.2));
    }

    #[test]
    fn free_number_rejects_infinity() {
        let field = Field::new("psa", FieldKind::Number);
        assert!(field.accepts(&FieldValue::Number(-3.0)));
        assert!(!field.accepts(&FieldValue::Number(f64::INFINITY)));
        assert!(field.parse("inf").is_err());
    }

    #[test]
    fn date_parses_iso_only() {
        let field = Field::new("exam_date", FieldKind::Date);
        let parsed = field.parse("2024-03-29").unwrap();
        assert_eq!(parsed.to_string(), "2024-03-29");
        assert!(field.parse("29/03/2024").is_err());
    }

    #[test]
    fn value_serializes_with_kind_tag() {
        let json = serde_json::to_string(&FieldValue::choice("T2")).unwrap();
        assert_eq!(json, r#"{"choice":"T2"}"#);
        let back: FieldValue = serde_json::from_str(r#"{"number":4.2}"#).unwrap();
        assert_eq!(back, FieldValue::Number(4.2));
    }
}
