//! Batch results produced by the matcher: the parsed-log table and the
//! duplicate / completeness audits.

use serde::Serialize;
use std::fmt;
use std::io;

/// One classified log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedLogRow {
    pub log: String,
    /// Matched template text, `None` when no template accepts the line.
    #[serde(rename = "event type")]
    pub event_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedLogTable {
    pub rows: Vec<ParsedLogRow>,
}

impl ParsedLogTable {
    pub const COLUMNS: [&'static str; 2] = ["log", "event type"];

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &ParsedLogRow> {
        self.rows.iter().filter(|row| row.event_type.is_none())
    }

    /// Write the table as CSV with a `log,event type` header. Unmatched
    /// rows get an empty `event type` cell.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        wtr.write_record(Self::COLUMNS)?;
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// A line accepted by more than one template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateEntry {
    pub log: String,
    pub templates: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateReport {
    pub lines_checked: usize,
    pub entries: Vec<DuplicateEntry>,
}

impl DuplicateReport {
    pub fn has_duplicates(&self) -> bool {
        !self.entries.is_empty()
    }
}

impl fmt::Display for DuplicateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_duplicates() {
            return writeln!(f, "[INFO] No duplicate found.");
        }
        for entry in &self.entries {
            writeln!(f, "[WARN] Duplicate found!")?;
            writeln!(f, "log: `{}`", entry.log)?;
            for template in &entry.templates {
                writeln!(f, "template: `{}`", template)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompletenessReport {
    pub is_complete: bool,
    pub matched_count: usize,
    pub unmatched_count: usize,
    pub unmatched_lines: Vec<String>,
}

impl CompletenessReport {
    pub(crate) fn new(matched_count: usize, unmatched_lines: Vec<String>) -> Self {
        Self {
            is_complete: unmatched_lines.is_empty(),
            matched_count,
            unmatched_count: unmatched_lines.len(),
            unmatched_lines,
        }
    }

    pub fn total(&self) -> usize {
        self.matched_count + self.unmatched_count
    }

    /// Share of non-blank lines matched, 0-100. An empty input counts as 100.
    pub fn matched_percentage(&self) -> f64 {
        if self.total() == 0 {
            return 100.0;
        }
        self.matched_count as f64 / self.total() as f64 * 100.0
    }
}

impl fmt::Display for CompletenessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_complete {
            return writeln!(f, "[INFO] All logs are matched. {} logs matched.", self.matched_count);
        }
        writeln!(f, "[INFO] {:.2}% logs matched.", self.matched_percentage())?;
        writeln!(f, "[WARN] {} logs not matched.", self.unmatched_count)?;
        writeln!(f, "[INFO] Not matched logs:")?;
        for line in &self.unmatched_lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
