//! In-memory history of analyses for one interactive session.

use chrono::{DateTime, Utc};
use stresslens_core::PredictionSet;

/// Characters of input kept in a history preview.
const PREVIEW_CHARS: usize = 50;

/// Number of analyses shown by [`SessionHistory::recent`].
pub const RECENT_LIMIT: usize = 10;

/// One past analysis.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// 1-based position in the session.
    pub number: usize,
    pub preview: String,
    pub results: PredictionSet,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, text: &str, results: PredictionSet) {
        let number = self.entries.len() + 1;
        self.entries.push(HistoryEntry {
            number,
            preview: preview(text),
            results,
            at: Utc::now(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The last [`RECENT_LIMIT`] analyses, newest first.
    pub fn recent(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().rev().take(RECENT_LIMIT)
    }
}

/// First 50 characters of `text`, with `...` appended when it was longer.
fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
