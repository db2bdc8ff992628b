//! The changeset processor: folds commits, one at a time and in the order
//! supplied (reverse chronological, as VCS tools emit them), into the
//! per-(date, file) churn table.
//!
//! Processing order is load-bearing. Going backward in time, a rename
//! `old -> new` means every *older* occurrence of `old` belongs to whatever
//! name `new` currently resolves to, so the alias map is updated before the
//! commit's file changes are folded in. Re-assigning an already-aliased old
//! name overwrites the previous entry: the most recently processed
//! (newest-in-time) rename wins, which keeps independent rename chains that
//! reuse a historical name apart.

use crate::core::{Changeset, ChurnError, ChurnTable, Result};
use regex::Regex;
use std::collections::{HashMap, HashSet};

pub struct ChangesetProcessor {
    bug_regexes: Vec<Regex>,
    /// historical filename -> name its churn is currently attributed to
    aliases: HashMap<String, String>,
    output: ChurnTable,
    commits_processed: usize,
}

impl ChangesetProcessor {
    /// `bug_patterns` is a `;`-delimited list of regular expressions matched
    /// against commit messages; empty disables fix classification. Invalid
    /// patterns fail here, never mid-run.
    pub fn new(bug_patterns: &str) -> Result<Self> {
        let mut bug_regexes = Vec::new();
        for pattern in bug_patterns.split(';') {
            let pattern = pattern.trim();
            if pattern.is_empty() {
                continue;
            }
            let regex = Regex::new(pattern).map_err(|e| {
                ChurnError::Configuration(format!("invalid bug pattern {pattern:?}: {e}"))
            })?;
            bug_regexes.push(regex);
        }
        Ok(Self {
            bug_regexes,
            aliases: HashMap::new(),
            output: ChurnTable::new(),
            commits_processed: 0,
        })
    }

    /// Fold one changeset into the churn table.
    pub fn process_changeset(&mut self, changeset: &Changeset) -> Result<()> {
        self.commits_processed += 1;

        for (old, new) in &changeset.renames {
            let root = self.resolve(new)?;
            self.aliases.insert(old.clone(), root);
        }

        if changeset.file_changes.is_empty() {
            return Ok(());
        }

        let date = changeset
            .committer_date
            .ok_or_else(|| self.invalid(changeset, "missing committer date"))?
            .date_naive();
        let is_fix = self.is_bug_fix(&changeset.message);

        for change in &changeset.file_changes {
            if change.filename.is_empty() {
                return Err(self.invalid(changeset, "file change without a filename"));
            }
            let target = self.resolve(&change.filename)?;
            self.output
                .entry(date)
                .or_default()
                .entry(target)
                .or_default()
                .add_change(change, &changeset.author, is_fix);
        }

        log::debug!(
            "processed changeset {} ({} file changes)",
            display_identity(changeset, self.commits_processed),
            changeset.file_changes.len()
        );
        Ok(())
    }

    /// Fold an already-materialized sequence, newest commit first.
    pub fn process_all(&mut self, changesets: &[Changeset]) -> Result<()> {
        for changeset in changesets {
            self.process_changeset(changeset)?;
        }
        Ok(())
    }

    /// Read-only view of the churn table: date -> resolved filename -> churn.
    pub fn output(&self) -> &ChurnTable {
        &self.output
    }

    pub fn commits_processed(&self) -> usize {
        self.commits_processed
    }

    /// Follow alias chain entries to a fixed point. A name with no entry (or
    /// a self-entry, which a chain collapse can produce) resolves to itself.
    /// Revisiting a name is a corrupt rename history and fatal.
    fn resolve(&self, name: &str) -> Result<String> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = name;
        while let Some(next) = self.aliases.get(current) {
            if next == current {
                break;
            }
            if !visited.insert(current) {
                return Err(ChurnError::RenameCycle {
                    file: name.to_string(),
                });
            }
            current = next;
        }
        Ok(current.to_string())
    }

    fn is_bug_fix(&self, message: &str) -> bool {
        self.bug_regexes.iter().any(|r| r.is_match(message))
    }

    fn invalid(&self, changeset: &Changeset, message: &str) -> ChurnError {
        ChurnError::InvalidChangeset {
            changeset: display_identity(changeset, self.commits_processed),
            message: message.to_string(),
        }
    }
}

fn display_identity(changeset: &Changeset, index: usize) -> String {
    if changeset.hash.is_empty() {
        format!("#{index}")
    } else {
        changeset.hash.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DailyCodeChurn, FileChange};
    use chrono::{DateTime, NaiveDate};
    use pretty_assertions::assert_eq;

    fn commit_date(time: &str) -> DateTime<chrono::FixedOffset> {
        DateTime::parse_from_rfc3339(time).unwrap()
    }

    fn commit_with_added(filename: &str, added: u64) -> Changeset {
        Changeset {
            committer_date: Some(commit_date("2018-10-02T12:00:00+00:00")),
            file_changes: vec![FileChange::new(filename, added, 0)],
            ..Changeset::new()
        }
    }

    fn commit_with_rename(old: &str, new: &str) -> Changeset {
        Changeset {
            committer_date: Some(commit_date("2018-10-02T12:00:00+00:00")),
            file_changes: vec![FileChange::new(new, 0, 0)],
            renames: vec![(old.to_string(), new.to_string())],
            ..Changeset::new()
        }
    }

    fn output_for<'a>(processor: &'a ChangesetProcessor, filename: &str) -> &'a DailyCodeChurn {
        let date = NaiveDate::from_ymd_opt(2018, 10, 2).unwrap();
        &processor.output()[&date][filename]
    }

    // Changesets are fed newest first throughout, as git emits them.

    #[test]
    fn simple_rename_folds_history_into_new_name() {
        let mut p = ChangesetProcessor::new("").unwrap();
        p.process_changeset(&commit_with_added("file2", 10)).unwrap();
        p.process_changeset(&commit_with_rename("file1", "file2")).unwrap();
        p.process_changeset(&commit_with_added("file1", 10)).unwrap();

        assert_eq!(output_for(&p, "file2").added, 20);
    }

    #[test]
    fn rename_back_and_forth_folds_into_final_name() {
        let mut p = ChangesetProcessor::new("").unwrap();
        p.process_changeset(&commit_with_added("file1", 10)).unwrap();
        p.process_changeset(&commit_with_rename("file2", "file1")).unwrap();
        p.process_changeset(&commit_with_added("file2", 10)).unwrap();
        p.process_changeset(&commit_with_rename("file1", "file2")).unwrap();
        p.process_changeset(&commit_with_added("file1", 10)).unwrap();

        assert_eq!(output_for(&p, "file1").added, 30);
    }

    #[test]
    fn multi_level_chain_folds_all_history() {
        let mut p = ChangesetProcessor::new("").unwrap();
        p.process_changeset(&commit_with_added("file1", 10)).unwrap();
        p.process_changeset(&commit_with_rename("file3", "file1")).unwrap();
        p.process_changeset(&commit_with_added("file3", 10)).unwrap();
        p.process_changeset(&commit_with_rename("file2", "file3")).unwrap();
        p.process_changeset(&commit_with_added("file2", 10)).unwrap();
        p.process_changeset(&commit_with_rename("file1", "file2")).unwrap();
        p.process_changeset(&commit_with_added("file1", 10)).unwrap();

        assert_eq!(output_for(&p, "file1").added, 40);
    }

    #[test]
    fn reused_old_name_keeps_independent_chains_apart() {
        let mut p = ChangesetProcessor::new("").unwrap();
        p.process_changeset(&commit_with_added("file3", 10)).unwrap();
        p.process_changeset(&commit_with_rename("file1", "file3")).unwrap();
        // New, unrelated history for file1 starts here.
        p.process_changeset(&commit_with_added("file1", 10)).unwrap();
        p.process_changeset(&commit_with_added("file2", 10)).unwrap();
        p.process_changeset(&commit_with_rename("file1", "file2")).unwrap();
        p.process_changeset(&commit_with_added("file1", 10)).unwrap();

        assert_eq!(output_for(&p, "file2").added, 20);
        assert_eq!(output_for(&p, "file3").added, 20);
    }

    #[test]
    fn same_name_renamed_twice_folds_into_newest_target() {
        let mut p = ChangesetProcessor::new("").unwrap();
        p.process_changeset(&commit_with_added("file2", 10)).unwrap();
        p.process_changeset(&commit_with_rename("file1", "file2")).unwrap();
        p.process_changeset(&commit_with_added("file1", 10)).unwrap();
        p.process_changeset(&commit_with_rename("file2", "file1")).unwrap();
        p.process_changeset(&commit_with_added("file2", 10)).unwrap();
        p.process_changeset(&commit_with_rename("file1", "file2")).unwrap();
        p.process_changeset(&commit_with_added("file1", 10)).unwrap();

        assert_eq!(output_for(&p, "file2").added, 40);
    }

    #[test]
    fn matching_bug_pattern_counts_fix_per_file_change() {
        let mut p = ChangesetProcessor::new("gramolias+;bug+").unwrap();
        let mut c = commit_with_added("file2", 10);
        c.file_changes[0].deleted = 5;
        c.message = "This is a comment a newline \n\r and a bug".to_string();
        p.process_changeset(&c).unwrap();

        assert_eq!(output_for(&p, "file2").changes_with_fixes, 1);
        assert_eq!(output_for(&p, "file2").lines_changed_with_fixes, 15);
    }

    #[test]
    fn non_matching_message_leaves_fix_counters_at_zero() {
        let mut p = ChangesetProcessor::new("gramolias+;bug+").unwrap();
        let mut c = commit_with_added("file2", 10);
        c.file_changes[0].deleted = 5;
        c.message = "This is a comment a newline new feature".to_string();
        p.process_changeset(&c).unwrap();

        assert_eq!(output_for(&p, "file2").changes_with_fixes, 0);
        assert_eq!(output_for(&p, "file2").lines_changed_with_fixes, 0);
    }

    #[test]
    fn fix_applies_to_every_file_change_in_the_commit() {
        let mut p = ChangesetProcessor::new("bug").unwrap();
        let c = Changeset {
            committer_date: Some(commit_date("2018-10-02T12:00:00+00:00")),
            message: "fix a bug".to_string(),
            file_changes: vec![
                FileChange::new("a.rs", 3, 1),
                FileChange::new("b.rs", 2, 2),
            ],
            ..Changeset::new()
        };
        p.process_changeset(&c).unwrap();

        assert_eq!(output_for(&p, "a.rs").changes_with_fixes, 1);
        assert_eq!(output_for(&p, "a.rs").lines_changed_with_fixes, 4);
        assert_eq!(output_for(&p, "b.rs").changes_with_fixes, 1);
        assert_eq!(output_for(&p, "b.rs").lines_changed_with_fixes, 4);
    }

    #[test]
    fn invalid_bug_pattern_fails_at_construction() {
        assert!(matches!(
            ChangesetProcessor::new("valid;([unclosed"),
            Err(ChurnError::Configuration(_))
        ));
    }

    #[test]
    fn same_day_different_times_share_one_bucket() {
        let mut p = ChangesetProcessor::new("").unwrap();
        let mut morning = commit_with_added("file1", 5);
        morning.committer_date = Some(commit_date("2018-10-02T08:00:00+00:00"));
        let mut evening = commit_with_added("file1", 7);
        evening.committer_date = Some(commit_date("2018-10-02T21:30:00+00:00"));
        p.process_all(&[evening, morning]).unwrap();

        assert_eq!(p.output().len(), 1);
        assert_eq!(output_for(&p, "file1").added, 12);
        assert_eq!(output_for(&p, "file1").changes, 2);
    }

    #[test]
    fn authors_dedup_case_insensitively_per_day() {
        let mut p = ChangesetProcessor::new("").unwrap();
        for author in ["Alice", "alice", "BOB"] {
            let mut c = commit_with_added("file1", 1);
            c.author = author.to_string();
            p.process_changeset(&c).unwrap();
        }
        assert_eq!(output_for(&p, "file1").authors.len(), 2);
    }

    #[test]
    fn corrupt_alias_cycle_is_fatal() {
        // A true cycle cannot arise from the insert discipline (old names are
        // always mapped to an already-resolved root), so seed one directly.
        let mut p = ChangesetProcessor::new("").unwrap();
        p.aliases.insert("file1".to_string(), "file2".to_string());
        p.aliases.insert("file2".to_string(), "file1".to_string());

        let err = p.process_changeset(&commit_with_added("file1", 1)).unwrap_err();
        assert!(matches!(err, ChurnError::RenameCycle { file } if file == "file1"));
    }

    #[test]
    fn empty_filename_is_fatal() {
        let mut p = ChangesetProcessor::new("").unwrap();
        let c = commit_with_added("", 1);
        assert!(p.process_changeset(&c).is_err());
    }

    #[test]
    fn missing_committer_date_is_fatal() {
        let mut p = ChangesetProcessor::new("").unwrap();
        let mut c = commit_with_added("file1", 1);
        c.committer_date = None;
        assert!(p.process_changeset(&c).is_err());
    }
}
