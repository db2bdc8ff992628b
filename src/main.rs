use anyhow::Result;
use churnmap::cli::{Cli, Commands};
use churnmap::commands::{extract_git, extract_perforce, GitExtractConfig, PerforceExtractConfig};
use clap::Parser;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Git {
            log_command,
            work_dir,
            bug_matches,
            format,
            output,
        } => extract_git(GitExtractConfig {
            log_command,
            work_dir,
            bug_matches,
            format,
            output,
            config: cli.config,
        }),
        Commands::Perforce {
            changes_command,
            describe_command,
            work_dir,
            bug_matches,
            format,
            output,
        } => extract_perforce(PerforceExtractConfig {
            changes_command,
            describe_command,
            work_dir,
            bug_matches,
            format,
            output,
            config: cli.config,
        }),
    }
}
