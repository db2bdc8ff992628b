//! Parsers for Perforce `p4 changes -s submitted` and `p4 describe -ds`
//! output.
//!
//! `p4 changes` yields the submitted changelist numbers (newest first, which
//! is the order the changeset processor requires); each number is then
//! described with `p4 describe -ds` and parsed here into a [`Changeset`].
//! Perforce reports no renames (`p4 move` surfaces as add + delete) and its
//! timestamps carry no UTC offset, so they are given +00:00.

use crate::core::{Changeset, ChurnError, FileChange, Result};
use crate::parsers::LogParser;
use chrono::NaiveDateTime;

const CHANGE_PREFIX: &str = "Change ";
const AFFECTED_FILES_PREFIX: &str = "Affected files";
const DIFFERENCES_PREFIX: &str = "Differences";
const FILE_SECTION_PREFIX: &str = "==== ";

/// Parser for `p4 changes -s submitted` output.
///
/// Each line looks like
/// `Change 1234 on 2018/10/02 by user@client 'description'`.
#[derive(Debug, Default)]
pub struct P4ChangesParser;

impl P4ChangesParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract the changelist numbers, in the order listed.
    pub fn parse_change_numbers(
        &self,
        lines: &mut dyn Iterator<Item = &str>,
    ) -> Result<Vec<u64>> {
        let mut numbers = Vec::new();
        for (index, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let rest = line.strip_prefix(CHANGE_PREFIX).ok_or_else(|| {
                ChurnError::parse(index + 1, line, "expected a Change line")
            })?;
            let number = rest.split_whitespace().next().unwrap_or("");
            numbers.push(number.parse::<u64>().map_err(|e| {
                ChurnError::parse(index + 1, line, format!("unparseable change number: {e}"))
            })?);
        }
        Ok(numbers)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Header,
    Description,
    FileSections,
}

struct ParserContext {
    commits: Vec<Changeset>,
    state: State,
}

/// Parser for `p4 describe -ds` output. Several described changes may be
/// concatenated in one stream.
#[derive(Debug, Default)]
pub struct P4DescribeParser;

impl P4DescribeParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_line(&self, ctx: &mut ParserContext, line_number: usize, line: &str) -> Result<()> {
        if let Some(rest) = line.strip_prefix(CHANGE_PREFIX) {
            ctx.commits
                .push(parse_change_header(rest, line_number, line)?);
            ctx.state = State::Description;
            return Ok(());
        }

        let commit = match ctx.commits.last_mut() {
            Some(commit) => commit,
            None if line.trim().is_empty() => return Ok(()),
            None => {
                return Err(ChurnError::parse(
                    line_number,
                    line,
                    "line precedes any Change header",
                ))
            }
        };

        if line.starts_with(AFFECTED_FILES_PREFIX) || line.starts_with(DIFFERENCES_PREFIX) {
            ctx.state = State::FileSections;
            return Ok(());
        }

        match ctx.state {
            State::Header => Ok(()),
            State::Description => {
                // Message lines are tab-indented; everything else is noise.
                if let Some(text) = line.strip_prefix('\t') {
                    commit.append_message(text.trim());
                }
                Ok(())
            }
            State::FileSections => parse_file_section_line(commit, line_number, line),
        }
    }
}

impl LogParser for P4DescribeParser {
    fn parse(&self, lines: &mut dyn Iterator<Item = &str>) -> Result<Vec<Changeset>> {
        let mut ctx = ParserContext {
            commits: Vec::new(),
            state: State::Header,
        };
        for (index, line) in lines.enumerate() {
            self.parse_line(&mut ctx, index + 1, line)?;
        }
        Ok(ctx.commits)
    }
}

/// Parse `<id> by user@client on YYYY/MM/DD HH:MM:SS` into a changeset shell.
fn parse_change_header(rest: &str, line_number: usize, line: &str) -> Result<Changeset> {
    let fields: Vec<&str> = rest.split_whitespace().collect();
    // Change 1234 by user@client on 2018/10/02 12:13:14
    if fields.len() < 6 || fields[1] != "by" || fields[3] != "on" {
        return Err(ChurnError::parse(
            line_number,
            line,
            "malformed Change header",
        ));
    }

    let mut commit = Changeset::new();
    commit.hash = fields[0].to_string();
    let user = fields[2].split('@').next().unwrap_or(fields[2]);
    commit.author = user.to_string();
    commit.committer = user.to_string();

    let stamp = format!("{} {}", fields[4], fields[5]);
    let naive = NaiveDateTime::parse_from_str(&stamp, "%Y/%m/%d %H:%M:%S")
        .map_err(|e| ChurnError::parse(line_number, line, format!("unparseable date: {e}")))?;
    let date = naive.and_utc().fixed_offset();
    commit.author_date = Some(date);
    commit.committer_date = Some(date);
    Ok(commit)
}

/// Handle `==== //depot/path#rev (type) ====` section markers and the
/// `add/deleted/changed N chunks M lines` summaries below them.
fn parse_file_section_line(commit: &mut Changeset, line_number: usize, line: &str) -> Result<()> {
    if let Some(rest) = line.strip_prefix(FILE_SECTION_PREFIX) {
        let path = rest.split('#').next().unwrap_or("").trim();
        if path.is_empty() {
            return Err(ChurnError::parse(
                line_number,
                line,
                "file section marker without a depot path",
            ));
        }
        commit
            .file_changes
            .push(FileChange::new(path.to_string(), 0, 0));
        return Ok(());
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    let kind = match fields.first().copied() {
        Some(k @ ("add" | "deleted" | "changed")) => k,
        _ => return Ok(()), // affected-file listing, diff context, blank lines
    };

    let change = match commit.file_changes.last_mut() {
        Some(change) => change,
        None => return Ok(()), // summary outside a file section, tolerated
    };

    let parse = |field: Option<&&str>| -> Result<u64> {
        field
            .copied()
            .unwrap_or("")
            .parse::<u64>()
            .map_err(|e| ChurnError::parse(line_number, line, format!("unparseable count: {e}")))
    };

    match kind {
        // add N chunks M lines
        "add" => change.added += parse(fields.get(3))?,
        // deleted N chunks M lines
        "deleted" => change.deleted += parse(fields.get(3))?,
        // changed N chunks B / A lines: B lines before, A lines after
        "changed" => {
            change.deleted += parse(fields.get(3))?;
            change.added += parse(fields.get(5))?;
        }
        _ => unreachable!(),
    }
    Ok(())
}
