//! CLI command implementations.
//!
//! Each extract command is the imperative shell around the core: invoke the
//! VCS command, parse its output, fold the changesets through a processor,
//! run the measure aggregators and hand the finished report to a writer.

pub mod extract;

pub use extract::{extract_git, extract_perforce, GitExtractConfig, PerforceExtractConfig};
