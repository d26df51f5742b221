use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use score_session::{HistoryEntry, HistorySink, SinkError};

/// Appends one JSON object per computed result to a file.
#[derive(Debug)]
pub struct JsonLinesHistory {
    path: PathBuf,
    file: File,
}

impl JsonLinesHistory {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistorySink for JsonLinesHistory {
    fn record(&mut self, entry: &HistoryEntry) -> Result<(), SinkError> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }
}
