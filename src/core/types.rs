//! Core data records shared across parsers, the changeset processor and the
//! report writers.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One file's line deltas within a single changeset.
///
/// The filename is the name the file carried *in this commit*; alias
/// resolution to the current name happens later, in the processor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub filename: String,
    pub added: u64,
    pub deleted: u64,
}

impl FileChange {
    pub fn new(filename: impl Into<String>, added: u64, deleted: u64) -> Self {
        Self {
            filename: filename.into(),
            added,
            deleted,
        }
    }
}

/// A single commit as emitted by a VCS log command.
///
/// `hash` is empty for backends without content hashes (Perforce). Dates keep
/// their original UTC offset so they round-trip through formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Changeset {
    pub hash: String,
    pub author: String,
    pub author_date: Option<DateTime<FixedOffset>>,
    pub committer: String,
    pub committer_date: Option<DateTime<FixedOffset>>,
    pub message: String,
    pub file_changes: Vec<FileChange>,
    /// Renames detected in this commit, fully expanded (old path, new path).
    pub renames: Vec<(String, String)>,
}

impl Changeset {
    pub fn new() -> Self {
        Self {
            hash: String::new(),
            author: String::new(),
            author_date: None,
            committer: String::new(),
            committer_date: None,
            message: String::new(),
            file_changes: Vec::new(),
            renames: Vec::new(),
        }
    }

    /// Append one line to the free-text commit message.
    pub fn append_message(&mut self, line: &str) {
        if !self.message.is_empty() {
            self.message.push('\n');
        }
        self.message.push_str(line);
    }
}

impl Default for Changeset {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulated churn for one (calendar date, resolved filename) key.
///
/// Created on first touch, mutated additively by every later commit that
/// resolves to the same key, never deleted during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCodeChurn {
    pub added: u64,
    pub deleted: u64,
    pub changes: u64,
    /// Distinct authors for this date, deduplicated case-insensitively.
    pub authors: BTreeSet<String>,
    pub changes_with_fixes: u64,
    pub lines_changed_with_fixes: u64,
}

impl DailyCodeChurn {
    pub fn total_changed(&self) -> u64 {
        self.added + self.deleted
    }

    /// Fold one file change into this entry.
    pub fn add_change(&mut self, change: &FileChange, author: &str, is_fix: bool) {
        self.added += change.added;
        self.deleted += change.deleted;
        self.changes += 1;
        if !author.is_empty() {
            self.authors.insert(author.to_lowercase());
        }
        if is_fix {
            self.changes_with_fixes += 1;
            self.lines_changed_with_fixes += change.added + change.deleted;
        }
    }
}

/// The churn table: date -> resolved filename -> accumulated churn.
pub type ChurnTable = BTreeMap<NaiveDate, BTreeMap<String, DailyCodeChurn>>;

/// One row of the final report, flattened for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnRecord {
    pub date: NaiveDate,
    pub file: String,
    pub added: u64,
    pub deleted: u64,
    pub total_changed: u64,
    pub changes: u64,
    pub authors: Vec<String>,
    pub changes_with_fixes: u64,
    pub lines_changed_with_fixes: u64,
    /// Cumulative distinct-author count from the measure aggregator.
    pub author_count: u64,
}

/// Full report handed to the output writers. Writers must not mutate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnReport {
    pub generated_at: DateTime<Utc>,
    pub records: Vec<ChurnRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_message_joins_lines_with_newline() {
        let mut c = Changeset::new();
        c.append_message("first line");
        c.append_message("second line");
        assert_eq!(c.message, "first line\nsecond line");
    }

    #[test]
    fn add_change_accumulates_and_dedups_authors() {
        let mut churn = DailyCodeChurn::default();
        churn.add_change(&FileChange::new("a.rs", 10, 5), "Alice", false);
        churn.add_change(&FileChange::new("a.rs", 2, 1), "alice", false);
        assert_eq!(churn.added, 12);
        assert_eq!(churn.deleted, 6);
        assert_eq!(churn.changes, 2);
        assert_eq!(churn.authors.len(), 1);
        assert_eq!(churn.total_changed(), 18);
    }

    #[test]
    fn fix_change_updates_fix_counters() {
        let mut churn = DailyCodeChurn::default();
        churn.add_change(&FileChange::new("a.rs", 10, 5), "bob", true);
        assert_eq!(churn.changes_with_fixes, 1);
        assert_eq!(churn.lines_changed_with_fixes, 15);
    }
}
