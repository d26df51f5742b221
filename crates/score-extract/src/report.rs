use serde::Serialize;

use score_model::AnswerSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Candidates with different values were found.
    Conflicting,
    /// An anchor window names more than one option.
    Ambiguous,
    /// Text was recognized but is outside the field's domain.
    Invalid,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::Conflicting => "conflicting",
            DropReason::Ambiguous => "ambiguous",
            DropReason::Invalid => "invalid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedField {
    pub field: String,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionReport {
    pub answers: AnswerSet,
    pub dropped: Vec<DroppedField>,
}
