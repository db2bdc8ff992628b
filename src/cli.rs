use crate::io::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_GIT_LOG_COMMAND: &str =
    "git log --pretty=fuller --date=iso-strict --numstat";

#[derive(Parser, Debug)]
#[command(name = "churnmap")]
#[command(about = "Per-file, per-day code churn extraction from VCS history", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to .churnmap.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract churn from git history
    Git {
        /// git log command to run; its output must use --pretty=fuller,
        /// --date=iso-strict and --numstat
        #[arg(long = "log-command", default_value = DEFAULT_GIT_LOG_COMMAND)]
        log_command: String,

        /// Repository working directory (defaults to the current directory)
        #[arg(long = "work-dir")]
        work_dir: Option<PathBuf>,

        /// Semicolon-delimited regexes classifying bug-fix commit messages
        #[arg(long = "bug-matches")]
        bug_matches: Option<String>,

        /// Output format (overrides the config file; defaults to csv)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract churn from Perforce history
    Perforce {
        /// p4 changes command listing the changelists to process, e.g.
        /// "p4 changes -s submitted //depot/path/...@2018/01/01,2018/12/31"
        #[arg(long = "changes-command")]
        changes_command: String,

        /// p4 describe command; {} is replaced by each change number
        #[arg(long = "describe-command", default_value = "p4 describe -ds {}")]
        describe_command: String,

        /// Working directory for the p4 commands
        #[arg(long = "work-dir")]
        work_dir: Option<PathBuf>,

        /// Semicolon-delimited regexes classifying bug-fix commit messages
        #[arg(long = "bug-matches")]
        bug_matches: Option<String>,

        /// Output format (overrides the config file; defaults to csv)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
