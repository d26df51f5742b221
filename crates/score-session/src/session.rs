use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use score_model::{AnswerSet, Field, FieldValue, Result, Scheme, ScoreError, ScoreResult};
use score_schemes::SchemeStore;

use crate::clock::{Clock, SystemClock};
use crate::history::{HistoryEntry, HistorySink};
use crate::state::SessionState;

/// One scoring attempt: a scheme, its evolving answers and at most one
/// result.
pub struct Session {
    state: SessionState,
    scheme: Option<Arc<Scheme>>,
    answers: AnswerSet,
    result: Option<ScoreResult>,
    /// Answers changed since the current result was computed.
    stale: bool,
    last_entry: Option<HistoryEntry>,
    history: Option<Box<dyn HistorySink>>,
    clock: Box<dyn Clock>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("scheme", &self.scheme.as_ref().map(|s| s.id.as_str()))
            .field("answers", &self.answers.len())
            .field("has_result", &self.result.is_some())
            .finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::SelectingScheme,
            scheme: None,
            answers: AnswerSet::new(),
            result: None,
            stale: false,
            last_entry: None,
            history: None,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_history(mut self, sink: impl HistorySink + 'static) -> Self {
        self.history = Some(Box::new(sink));
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn scheme(&self) -> Option<&Arc<Scheme>> {
        self.scheme.as_ref()
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn result(&self) -> Option<&ScoreResult> {
        self.result.as_ref()
    }

    /// False once answers were edited after the last computation.
    pub fn result_is_current(&self) -> bool {
        self.result.is_some() && !self.stale
    }

    /// Most recent history entry, available even without a sink.
    pub fn last_entry(&self) -> Option<&HistoryEntry> {
        self.last_entry.as_ref()
    }

    /// Currently required fields without a valid answer.
    pub fn missing(&self) -> Result<BTreeSet<String>> {
        let scheme = self.editable_scheme("check completeness")?;
        Ok(score_validate::missing_required(&scheme, &self.answers))
    }

    pub fn select_scheme(&mut self, store: &SchemeStore, id: &str) -> Result<()> {
        self.guard("select a scheme", &[SessionState::SelectingScheme])?;
        let scheme = store.get_scheme(id)?;
        self.start(scheme);
        Ok(())
    }

    /// Select a scheme already obtained from a store.
    pub fn select(&mut self, scheme: Arc<Scheme>) -> Result<()> {
        self.guard("select a scheme", &[SessionState::SelectingScheme])?;
        self.start(scheme);
        Ok(())
    }

    fn start(&mut self, scheme: Arc<Scheme>) {
        debug!(scheme = %scheme.id, version = %scheme.version, "scheme selected");
        self.scheme = Some(scheme);
        self.answers.clear();
        self.result = None;
        self.stale = false;
        self.transition(SessionState::Answering);
    }

    /// Set one answer. The value must be in the field's declared domain.
    pub fn answer(&mut self, field: &str, value: FieldValue) -> Result<()> {
        let scheme = self.editable_scheme("answer")?;
        scheme_field(&scheme, field)?.check(&value)?;
        self.answers.insert(field, value);
        self.mark_edited();
        Ok(())
    }

    /// Parse raw text (option synonyms, numbers, ISO dates) and set it.
    pub fn answer_raw(&mut self, field: &str, raw: &str) -> Result<()> {
        let scheme = self.editable_scheme("answer")?;
        let value = scheme_field(&scheme, field)?.parse(raw)?;
        self.answers.insert(field, value);
        self.mark_edited();
        Ok(())
    }

    pub fn clear_answer(&mut self, field: &str) -> Result<()> {
        let scheme = self.editable_scheme("clear an answer")?;
        scheme_field(&scheme, field)?;
        if self.answers.remove(field).is_some() {
            self.mark_edited();
        }
        Ok(())
    }

    /// Overwrite the supplied answers, leaving the others untouched. Nothing
    /// is applied unless every supplied answer is valid.
    pub fn merge_answers(&mut self, partial: AnswerSet) -> Result<()> {
        let scheme = self.editable_scheme("merge answers")?;
        for (id, value) in partial.iter() {
            scheme_field(&scheme, id)?.check(value)?;
        }
        if !partial.is_empty() {
            self.answers.merge(partial);
            self.mark_edited();
        }
        Ok(())
    }

    /// Validate and evaluate the current answers.
    pub fn submit(&mut self) -> Result<&ScoreResult> {
        let scheme = self.require_scheme("submit", &[SessionState::Answering])?;
        let result = score_engine::score(&scheme, &self.answers)?;
        self.record(&scheme, result);
        self.transition(SessionState::Computed);
        self.current_result()
    }

    /// Recompute after editing. On failure the previous result is kept.
    pub fn rescore(&mut self) -> Result<&ScoreResult> {
        let scheme = self.require_scheme("rescore", &[SessionState::Computed])?;
        let result = score_engine::score(&scheme, &self.answers)?;
        self.record(&scheme, result);
        self.current_result()
    }

    /// Start over with the same scheme.
    pub fn reset(&mut self) -> Result<()> {
        self.guard("reset", &[SessionState::Answering, SessionState::Computed])?;
        self.answers.clear();
        self.result = None;
        self.stale = false;
        self.transition(SessionState::Answering);
        Ok(())
    }

    /// Discard the scheme and all session data.
    pub fn reselect(&mut self) -> Result<()> {
        self.guard("reselect", &[SessionState::Answering, SessionState::Computed])?;
        self.scheme = None;
        self.answers.clear();
        self.result = None;
        self.stale = false;
        self.last_entry = None;
        self.transition(SessionState::SelectingScheme);
        Ok(())
    }

    pub fn terminate(&mut self) -> Result<()> {
        self.guard(
            "terminate",
            &[
                SessionState::SelectingScheme,
                SessionState::Answering,
                SessionState::Computed,
            ],
        )?;
        self.transition(SessionState::Terminated);
        Ok(())
    }

    fn guard(&self, action: &'static str, allowed: &[SessionState]) -> Result<()> {
        if self.state == SessionState::Terminated {
            return Err(ScoreError::SessionClosed);
        }
        if !allowed.contains(&self.state) {
            return Err(ScoreError::InvalidTransition {
                action,
                state: self.state.as_str(),
            });
        }
        Ok(())
    }

    fn require_scheme(
        &self,
        action: &'static str,
        allowed: &[SessionState],
    ) -> Result<Arc<Scheme>> {
        self.guard(action, allowed)?;
        self.scheme.clone().ok_or(ScoreError::InvalidTransition {
            action,
            state: self.state.as_str(),
        })
    }

    fn editable_scheme(&self, action: &'static str) -> Result<Arc<Scheme>> {
        self.require_scheme(action, &[SessionState::Answering, SessionState::Computed])
    }

    fn mark_edited(&mut self) {
        if self.result.is_some() {
            self.stale = true;
        }
    }

    fn current_result(&self) -> Result<&ScoreResult> {
        self.result.as_ref().ok_or(ScoreError::InvalidTransition {
            action: "read the result",
            state: self.state.as_str(),
        })
    }

    fn record(&mut self, scheme: &Scheme, result: ScoreResult) {
        let entry = HistoryEntry {
            scheme_id: scheme.id.clone(),
            scheme_version: scheme.version.clone(),
            answers: self.answers.clone(),
            result: result.clone(),
            timestamp: self.clock.now(),
        };
        if let Some(sink) = self.history.as_mut()
            && let Err(e) = sink.record(&entry)
        {
            warn!(scheme = %scheme.id, error = %e, "failed to record history entry");
        }
        self.last_entry = Some(entry);
        self.result = Some(result);
        self.stale = false;
    }

    fn transition(&mut self, to: SessionState) {
        debug!(from = %self.state, to = %to, "session transition");
        self.state = to;
    }
}

fn scheme_field<'s>(scheme: &'s Scheme, id: &str) -> Result<&'s Field> {
    scheme.field(id).ok_or_else(|| ScoreError::UnknownField {
        scheme: scheme.id.clone(),
        field: id.to_string(),
    })
}
