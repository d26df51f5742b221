//! "Paste and score": pre-fill an answer set from report text.
//!
//! Only fields with an `extract` configuration are considered. Candidates
//! come from the field's regex pattern (capture group 1) and from the text
//! following each anchor on the same line. Every candidate is parsed and
//! validated against the field; a field whose candidates disagree, whose
//! anchor window names more than one option, or whose only candidates are
//! invalid is left unanswered. Extraction never fails and never guesses.

#![deny(unsafe_code)]

mod matcher;
mod report;

pub use matcher::Extractor;
pub use report::{DropReason, DroppedField, ExtractionReport};

use score_model::{AnswerSet, Scheme};

/// Partial answer set recognized in `raw_text`.
pub fn extract(scheme: &Scheme, raw_text: &str) -> AnswerSet {
    Extractor::new(scheme).extract(raw_text)
}

/// Like [`extract`], also listing the fields that were dropped and why.
pub fn extract_with_report(scheme: &Scheme, raw_text: &str) -> ExtractionReport {
    Extractor::new(scheme).extract_with_report(raw_text)
}
