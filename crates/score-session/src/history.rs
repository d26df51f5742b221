use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use score_model::{AnswerSet, ScoreResult};

/// Snapshot handed to the history collaborator each time a result is
/// computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub scheme_id: String,
    pub scheme_version: String,
    pub answers: AnswerSet,
    pub result: ScoreResult,
    pub timestamp: DateTime<Utc>,
}

pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Receives history entries. A failing sink is logged and never blocks
/// scoring.
pub trait HistorySink: Send {
    fn record(&mut self, entry: &HistoryEntry) -> Result<(), SinkError>;
}

/// In-memory sink; clones share the same entry list.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistorySink for MemoryHistory {
    fn record(&mut self, entry: &HistoryEntry) -> Result<(), SinkError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
        Ok(())
    }
}
