//! Scheme evaluation.
//!
//! Each strategy's rule data implements [`Evaluate`]; [`evaluate`] dispatches
//! on the scheme's [`RuleSet`] and wraps the outcome in a [`ScoreResult`].
//! Evaluation is pure: the same scheme and answers always give the same
//! result.

#![deny(unsafe_code)]

mod additive;
mod tabular;
mod threshold;

use tracing::debug;

use score_model::{
    AnswerSet, Contribution, Outcome, Result, RuleSet, Scheme, ScoreError, ScoreResult,
};

/// Strategy-specific evaluation over an answer set assumed to be validated.
pub trait Evaluate {
    fn evaluate(&self, scheme: &Scheme, answers: &AnswerSet) -> Result<Outcome>;
}

/// Evaluate `answers` with the scheme's strategy.
///
/// Absent optional fields are skipped. Use [`score`] to validate first.
pub fn evaluate(scheme: &Scheme, answers: &AnswerSet) -> Result<ScoreResult> {
    let outcome = match &scheme.rules {
        RuleSet::Tabular(rules) => rules.evaluate(scheme, answers)?,
        RuleSet::Additive(rules) => rules.evaluate(scheme, answers)?,
        RuleSet::Threshold(rules) => rules.evaluate(scheme, answers)?,
    };
    debug!(
        scheme = %scheme.id,
        strategy = %scheme.strategy(),
        "evaluated scheme"
    );
    Ok(ScoreResult {
        scheme_id: scheme.id.clone(),
        scheme_version: scheme.version.clone(),
        outcome,
    })
}

/// Validate completeness, then evaluate.
pub fn score(scheme: &Scheme, answers: &AnswerSet) -> Result<ScoreResult> {
    score_validate::ensure_complete(scheme, answers)?;
    evaluate(scheme, answers)
}

/// Sum of the contributed points, checked against `[min, max]`. A sum that
/// leaves the `i64` range is reported as out of bounds with the saturated
/// total.
pub(crate) fn bounded_total(
    scheme: &Scheme,
    contributions: &[Contribution],
    min: i64,
    max: i64,
) -> Result<i64> {
    let mut total = Some(0i64);
    let mut saturated = 0i64;
    for contribution in contributions {
        saturated = saturated.saturating_add(contribution.points);
        total = total.and_then(|t| t.checked_add(contribution.points));
    }
    match total {
        Some(score) if (min..=max).contains(&score) => Ok(score),
        _ => Err(ScoreError::ScoreOutOfBounds {
            scheme: scheme.id.clone(),
            score: total.unwrap_or(saturated),
            min,
            max,
        }),
    }
}
