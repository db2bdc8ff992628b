use crate::config::ChurnmapConfig;
use crate::core::{ChurnRecord, ChurnReport, ChurnTable};
use crate::io::output::{create_writer, OutputFormat};
use crate::io::process::run_command_line;
use crate::measures::{MeasureCollector, NumberOfAuthorsAggregator};
use crate::parsers::{GitLogParser, LogParser, P4ChangesParser, P4DescribeParser};
use crate::processor::ChangesetProcessor;
use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct GitExtractConfig {
    pub log_command: String,
    pub work_dir: Option<PathBuf>,
    pub bug_matches: Option<String>,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub fn extract_git(config: GitExtractConfig) -> Result<()> {
    let file_config = ChurnmapConfig::load(config.config.as_deref())?;
    let bug_patterns = resolve_bug_patterns(&config.bug_matches, &file_config);

    let text = run_command_line(&config.log_command, config.work_dir.as_deref())?;
    let changesets = GitLogParser::new().parse(&mut text.lines())?;
    log::info!("parsed {} changesets from git log", changesets.len());

    let mut processor = ChangesetProcessor::new(&bug_patterns)?;
    processor.process_all(&changesets)?;

    let report = build_report(processor.output());
    let format = resolve_format(config.format, &file_config);
    write_report(&report, format, config.output.as_deref())
}

pub struct PerforceExtractConfig {
    pub changes_command: String,
    pub describe_command: String,
    pub work_dir: Option<PathBuf>,
    pub bug_matches: Option<String>,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub fn extract_perforce(config: PerforceExtractConfig) -> Result<()> {
    let file_config = ChurnmapConfig::load(config.config.as_deref())?;
    let bug_patterns = resolve_bug_patterns(&config.bug_matches, &file_config);

    let listing = run_command_line(&config.changes_command, config.work_dir.as_deref())?;
    let numbers = P4ChangesParser::new().parse_change_numbers(&mut listing.lines())?;
    log::info!("describing {} submitted changes", numbers.len());

    // p4 changes lists newest first, the order the processor requires.
    let describe_parser = P4DescribeParser::new();
    let mut processor = ChangesetProcessor::new(&bug_patterns)?;
    for number in numbers {
        let command = substitute_change_number(&config.describe_command, number);
        let text = run_command_line(&command, config.work_dir.as_deref())?;
        let changesets = describe_parser.parse(&mut text.lines())?;
        processor.process_all(&changesets)?;
    }

    let report = build_report(processor.output());
    let format = resolve_format(config.format, &file_config);
    write_report(&report, format, config.output.as_deref())
}

fn resolve_format(cli_value: Option<OutputFormat>, file_config: &ChurnmapConfig) -> OutputFormat {
    cli_value
        .or(file_config.output.default_format)
        .unwrap_or(OutputFormat::Csv)
}

fn resolve_bug_patterns(cli_value: &Option<String>, file_config: &ChurnmapConfig) -> String {
    match cli_value {
        Some(patterns) => patterns.clone(),
        None => file_config.bug_pattern_string(),
    }
}

fn substitute_change_number(describe_command: &str, number: u64) -> String {
    if describe_command.contains("{}") {
        describe_command.replace("{}", &number.to_string())
    } else {
        format!("{describe_command} {number}")
    }
}

/// Flatten the finished churn table into report rows, enriched with the
/// distinct-author measure.
pub fn build_report(table: &ChurnTable) -> ChurnReport {
    let authors = MeasureCollector::collect(NumberOfAuthorsAggregator::new(), table);

    let mut records = Vec::new();
    for (date, files) in table {
        for (file, churn) in files {
            records.push(ChurnRecord {
                date: *date,
                file: file.clone(),
                added: churn.added,
                deleted: churn.deleted,
                total_changed: churn.total_changed(),
                changes: churn.changes,
                authors: churn.authors.iter().cloned().collect(),
                changes_with_fixes: churn.changes_with_fixes,
                lines_changed_with_fixes: churn.lines_changed_with_fixes,
                author_count: authors.value_for(*date, file).unwrap_or(0),
            });
        }
    }

    ChurnReport {
        generated_at: Utc::now(),
        records,
    }
}

fn write_report(report: &ChurnReport, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let out: Box<dyn Write> = match output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    };
    let mut writer = create_writer(format, out);
    writer.write_report(report)?;
    log::info!("wrote {} churn records", report.records.len());
    Ok(())
}
