// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod io;
pub mod measures;
pub mod parsers;
pub mod processor;

// Re-export commonly used types
pub use crate::core::{
    Changeset, ChurnError, ChurnRecord, ChurnReport, ChurnTable, DailyCodeChurn, FileChange,
};

pub use crate::io::output::{create_writer, ChurnWriter, OutputFormat};

pub use crate::measures::{
    ChurnEntry, Measure, MeasureAggregator, MeasureCollector, NumberOfAuthorsAggregator,
};

pub use crate::parsers::{GitLogParser, LogParser, P4ChangesParser, P4DescribeParser};

pub use crate::processor::ChangesetProcessor;
