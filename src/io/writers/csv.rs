use crate::core::ChurnReport;
use crate::io::output::ChurnWriter;
use std::io::Write;

const HEADER: &str = "date,file,added,deleted,total_changed,changes,authors,\
changes_with_fixes,lines_changed_with_fixes,author_count";

pub struct CsvWriter<W: Write> {
    writer: W,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ChurnWriter for CsvWriter<W> {
    fn write_report(&mut self, report: &ChurnReport) -> anyhow::Result<()> {
        writeln!(self.writer, "{HEADER}")?;
        for record in &report.records {
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{},{},{},{}",
                record.date.format("%Y-%m-%d"),
                csv_field(&record.file),
                record.added,
                record.deleted,
                record.total_changed,
                record.changes,
                csv_field(&record.authors.join("|")),
                record.changes_with_fixes,
                record.lines_changed_with_fixes,
                record.author_count,
            )?;
        }
        Ok(())
    }
}

/// Quote a field only when it needs it.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
