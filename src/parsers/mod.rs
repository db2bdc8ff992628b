//! Line-oriented parsers turning raw VCS log text into [`Changeset`] records.
//!
//! One implementation per backend; git is the reference backend. Parsers hold
//! no state between calls: all per-run state lives in a context struct that
//! is threaded through each line-processing step.

pub mod git;
pub mod perforce;

use crate::core::{Changeset, Result};

pub use git::GitLogParser;
pub use perforce::{P4ChangesParser, P4DescribeParser};

/// A backend-specific log parser.
///
/// Input is the raw textual output of a VCS log command as a forward-only
/// sequence of lines; output is the commit sequence in the order the tool
/// emitted it (reverse chronological).
pub trait LogParser {
    fn parse(&self, lines: &mut dyn Iterator<Item = &str>) -> Result<Vec<Changeset>>;
}
