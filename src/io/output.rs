//! Report output selection and writer construction.

use crate::core::ChurnReport;
use crate::io::writers::{CsvWriter, JsonWriter};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Json,
}

/// Consumes a finished report; writers never mutate the underlying table.
pub trait ChurnWriter {
    fn write_report(&mut self, report: &ChurnReport) -> anyhow::Result<()>;
}

pub fn create_writer<'a>(
    format: OutputFormat,
    out: Box<dyn Write + 'a>,
) -> Box<dyn ChurnWriter + 'a> {
    match format {
        OutputFormat::Csv => Box::new(CsvWriter::new(out)),
        OutputFormat::Json => Box::new(JsonWriter::new(out)),
    }
}
