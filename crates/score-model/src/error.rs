use std::collections::BTreeSet;

use thiserror::Error;

/// Errors raised while answering, validating or evaluating a scheme.
///
/// `InvalidFieldValue`, `UnknownField` and `MissingRequiredFields` are
/// recoverable input states. `NoStageMatch` and `ScoreOutOfBounds` mean the
/// scheme's rule data is defective and the scheme should not be used again
/// with the same input.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("unknown scheme: {id}")]
    UnknownScheme { id: String },

    #[error("scheme {scheme} has no field '{field}'")]
    UnknownField { scheme: String, field: String },

    #[error("invalid value '{value}' for field {field}: {reason}")]
    InvalidFieldValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("missing required fields: {}", join_ids(.fields))]
    MissingRequiredFields { fields: BTreeSet<String> },

    #[error("no stage row of scheme {scheme} matches the answers")]
    NoStageMatch { scheme: String },

    #[error("score {score} of scheme {scheme} is outside the declared range [{min}, {max}]")]
    ScoreOutOfBounds {
        scheme: String,
        score: i64,
        min: i64,
        max: i64,
    },

    #[error("session is closed")]
    SessionClosed,

    #[error("cannot {action} while the session is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}

impl ScoreError {
    pub(crate) fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidFieldValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// True for user-input states that further answering can resolve.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidFieldValue { .. }
                | Self::UnknownField { .. }
                | Self::MissingRequiredFields { .. }
        )
    }

    /// True when the scheme's rule data cannot produce a result for valid input.
    pub fn is_rule_defect(&self) -> bool {
        matches!(
            self,
            Self::NoStageMatch { .. } | Self::ScoreOutOfBounds { .. }
        )
    }
}

fn join_ids(fields: &BTreeSet<String>) -> String {
    fields
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, ScoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_message_lists_ids_in_order() {
        let error = ScoreError::MissingRequiredFields {
            fields: ["t", "m", "n"].iter().map(|s| s.to_string()).collect(),
        };
        assert_eq!(error.to_string(), "missing required fields: m, n, t");
        assert!(error.is_recoverable());
        assert!(!error.is_rule_defect());
    }

    #[test]
    fn rule_defects_are_not_recoverable() {
        let error = ScoreError::NoStageMatch {
            scheme: "tnm-kidney".to_string(),
        };
        assert!(error.is_rule_defect());
        assert!(!error.is_recoverable());
    }
}
