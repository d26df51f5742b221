//! Answer-set completeness checks.
//!
//! A field is currently required when it is declared `required` and, if it
//! has `required_when` conditions, at least one of them holds over the
//! answers. A required field is satisfied only by a value in its declared
//! domain, so an invalid answer counts as missing.

#![deny(unsafe_code)]

mod report;

pub use report::{CompletenessIssue, CompletenessReport};

use std::collections::BTreeSet;

use tracing::debug;

use score_model::{AnswerSet, Result, Scheme, ScoreError, validate};

/// Ids of currently required fields without a valid answer.
///
/// Empty iff every currently required field has a value that passes
/// [`validate`].
pub fn missing_required(scheme: &Scheme, answers: &AnswerSet) -> BTreeSet<String> {
    scheme
        .fields
        .iter()
        .filter(|field| field.is_required(answers))
        .filter(|field| {
            !answers
                .get(&field.id)
                .is_some_and(|value| validate(field, value))
        })
        .map(|field| field.id.clone())
        .collect()
}

/// Every completeness problem of `answers`, in field declaration order
/// followed by unknown fields.
pub fn check_answers(scheme: &Scheme, answers: &AnswerSet) -> CompletenessReport {
    let mut issues = Vec::new();
    for field in &scheme.fields {
        match answers.get(&field.id) {
            Some(value) => {
                if let Err(ScoreError::InvalidFieldValue { reason, .. }) = field.check(value) {
                    issues.push(CompletenessIssue::InvalidValue {
                        field: field.id.clone(),
                        value: value.clone(),
                        reason,
                        required: field.is_required(answers),
                    });
                }
            }
            None if field.is_required(answers) => {
                issues.push(CompletenessIssue::Missing {
                    field: field.id.clone(),
                });
            }
            None => {}
        }
    }
    for id in answers.field_ids() {
        if scheme.field(id).is_none() {
            issues.push(CompletenessIssue::UnknownField {
                field: id.to_string(),
            });
        }
    }
    CompletenessReport {
        scheme_id: scheme.id.clone(),
        issues,
    }
}

/// Fail closed unless `answers` can be evaluated.
///
/// Unknown fields are reported first, then missing required fields, then
/// invalid values on fields that are not currently required.
pub fn ensure_complete(scheme: &Scheme, answers: &AnswerSet) -> Result<()> {
    if let Some(id) = answers.field_ids().find(|id| scheme.field(id).is_none()) {
        return Err(ScoreError::UnknownField {
            scheme: scheme.id.clone(),
            field: id.to_string(),
        });
    }

    let missing = missing_required(scheme, answers);
    if !missing.is_empty() {
        debug!(scheme = %scheme.id, missing = missing.len(), "answer set incomplete");
        return Err(ScoreError::MissingRequiredFields { fields: missing });
    }

    for (id, value) in answers.iter() {
        if let Some(field) = scheme.field(id) {
            field.check(value)?;
        }
    }
    Ok(())
}
