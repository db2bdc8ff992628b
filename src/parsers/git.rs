//! Parser for `git log --pretty=fuller --date=iso-strict --numstat` output.
//!
//! The log is a three-phase grammar per commit: header lines, a blank-line
//! delimited message block, then a blank-line delimited numstat block ending
//! at the next commit header or end of input. A blank line is the only
//! transition trigger between phases.

use crate::core::{Changeset, ChurnError, FileChange, Result};
use crate::parsers::LogParser;
use chrono::DateTime;

const COMMIT_PREFIX: &str = "commit ";
const AUTHOR_PREFIX: &str = "Author:";
const AUTHOR_DATE_PREFIX: &str = "AuthorDate:";
const COMMITTER_PREFIX: &str = "Commit:";
const COMMIT_DATE_PREFIX: &str = "CommitDate:";
const MERGE_PREFIX: &str = "Merge:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NewCommit,
    ParsingDescription,
    ParsingStats,
}

/// Per-run parser state. The commit being built is the last one pushed.
struct ParserContext {
    commits: Vec<Changeset>,
    state: State,
}

impl ParserContext {
    fn new() -> Self {
        Self {
            commits: Vec::new(),
            state: State::NewCommit,
        }
    }

    fn current(&mut self, line_number: usize, line: &str) -> Result<&mut Changeset> {
        self.commits
            .last_mut()
            .ok_or_else(|| ChurnError::parse(line_number, line, "line precedes any commit header"))
    }
}

#[derive(Debug, Default)]
pub struct GitLogParser;

impl GitLogParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_line(&self, ctx: &mut ParserContext, line_number: usize, line: &str) -> Result<()> {
        if let Some(hash) = line.strip_prefix(COMMIT_PREFIX) {
            // A commit header ends whatever block came before it.
            let mut commit = Changeset::new();
            commit.hash = hash.trim().to_string();
            ctx.commits.push(commit);
            ctx.state = State::NewCommit;
            return Ok(());
        }

        if line.is_empty() {
            // Leading blank lines carry no state to advance.
            if !ctx.commits.is_empty() {
                ctx.state = next_state(ctx.state);
            }
            return Ok(());
        }

        match ctx.state {
            State::NewCommit => self.parse_header_line(ctx, line_number, line),
            State::ParsingDescription => {
                ctx.current(line_number, line)?.append_message(line.trim());
                Ok(())
            }
            State::ParsingStats => self.parse_stats_line(ctx, line_number, line),
        }
    }

    fn parse_header_line(
        &self,
        ctx: &mut ParserContext,
        line_number: usize,
        line: &str,
    ) -> Result<()> {
        if let Some(value) = line.strip_prefix(AUTHOR_DATE_PREFIX) {
            ctx.current(line_number, line)?.author_date = Some(parse_iso_date(
                value.trim(),
                line_number,
                line,
            )?);
        } else if let Some(value) = line.strip_prefix(AUTHOR_PREFIX) {
            ctx.current(line_number, line)?.author = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix(COMMIT_DATE_PREFIX) {
            ctx.current(line_number, line)?.committer_date = Some(parse_iso_date(
                value.trim(),
                line_number,
                line,
            )?);
        } else if let Some(value) = line.strip_prefix(COMMITTER_PREFIX) {
            ctx.current(line_number, line)?.committer = value.trim().to_string();
        } else if line.starts_with(MERGE_PREFIX) {
            // Merge markers are recognized and ignored.
        } else {
            return Err(ChurnError::parse(
                line_number,
                line,
                "unrecognized line in commit header",
            ));
        }
        Ok(())
    }

    fn parse_stats_line(
        &self,
        ctx: &mut ParserContext,
        line_number: usize,
        line: &str,
    ) -> Result<()> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            return Err(ChurnError::parse(
                line_number,
                line,
                "expected three tab-separated numstat fields",
            ));
        }

        let added = parse_count(fields[0], line_number, line)?;
        let deleted = parse_count(fields[1], line_number, line)?;

        let commit = ctx.current(line_number, line)?;
        let filename = process_renames(commit, fields[2], line_number, line)?;
        commit.file_changes.push(FileChange {
            filename,
            added,
            deleted,
        });
        Ok(())
    }
}

impl LogParser for GitLogParser {
    fn parse(&self, lines: &mut dyn Iterator<Item = &str>) -> Result<Vec<Changeset>> {
        let mut ctx = ParserContext::new();
        for (index, line) in lines.enumerate() {
            self.parse_line(&mut ctx, index + 1, line)?;
        }
        Ok(ctx.commits)
    }
}

fn next_state(state: State) -> State {
    match state {
        State::NewCommit => State::ParsingDescription,
        State::ParsingDescription => State::ParsingStats,
        State::ParsingStats => State::NewCommit,
    }
}

fn parse_iso_date(
    value: &str,
    line_number: usize,
    line: &str,
) -> Result<chrono::DateTime<chrono::FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| ChurnError::parse(line_number, line, format!("unparseable date: {e}")))
}

/// Numstat counts use `-` for binary files; normalized to 0.
fn parse_count(field: &str, line_number: usize, line: &str) -> Result<u64> {
    if field == "-" {
        return Ok(0);
    }
    field
        .parse::<u64>()
        .map_err(|e| ChurnError::parse(line_number, line, format!("unparseable count: {e}")))
}

/// Expand git's rename shorthand in a numstat path field.
///
/// Two forms exist: whole-path (`old/path => new/path`) and braced
/// common-prefix (`common/{old => new}/suffix`). The expanded (old, new) pair
/// is recorded on the commit and the new path is returned as this file
/// change's filename.
fn process_renames(
    commit: &mut Changeset,
    path: &str,
    line_number: usize,
    line: &str,
) -> Result<String> {
    if !path.contains("=>") {
        return Ok(path.to_string());
    }

    let (span, inner) = match path.find('{') {
        Some(open) => {
            let close = path[open..].find('}').map(|i| open + i).ok_or_else(|| {
                ChurnError::parse(line_number, line, "unterminated { in rename path")
            })?;
            (&path[open..=close], &path[open + 1..close])
        }
        None => (path, path),
    };

    let marker = inner.find("=>").ok_or_else(|| {
        ChurnError::parse(line_number, line, "rename marker outside braced span")
    })?;
    let old_part = inner[..marker].trim();
    let new_part = inner[marker + 2..].trim();

    let old_path = path.replacen(span, old_part, 1).replace("//", "/");
    let new_path = path.replacen(span, new_part, 1).replace("//", "/");

    commit.renames.push((old_path, new_path.clone()));
    Ok(new_path)
}
