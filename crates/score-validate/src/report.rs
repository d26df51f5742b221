use std::collections::BTreeSet;

use serde::Serialize;

use score_model::FieldValue;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompletenessIssue {
    /// A currently required field has no answer.
    Missing { field: String },
    /// An answer is outside the field's declared domain.
    InvalidValue {
        field: String,
        value: FieldValue,
        reason: String,
        required: bool,
    },
    /// An answer names a field the scheme does not declare.
    UnknownField { field: String },
}

impl CompletenessIssue {
    pub fn field(&self) -> &str {
        match self {
            CompletenessIssue::Missing { field }
            | CompletenessIssue::InvalidValue { field, .. }
            | CompletenessIssue::UnknownField { field } => field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletenessReport {
    pub scheme_id: String,
    pub issues: Vec<CompletenessIssue>,
}

impl CompletenessReport {
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }

    /// Fields that are required and lack a valid answer.
    pub fn missing(&self) -> BTreeSet<String> {
        self.issues
            .iter()
            .filter(|issue| {
                matches!(
                    issue,
                    CompletenessIssue::Missing { .. }
                        | CompletenessIssue::InvalidValue { required: true, .. }
                )
            })
            .map(|issue| issue.field().to_string())
            .collect()
    }

    pub fn has_unknown_fields(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| matches!(issue, CompletenessIssue::UnknownField { .. }))
    }
}
