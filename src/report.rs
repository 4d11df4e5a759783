//! Output formatting for import results and parsed reports.

use std::fmt::Write;

use serde::Serialize;

use crate::import::LineMeasures;
use crate::model::{rate, Coverage};

/// Measures published by one language's import pass.
#[derive(Debug, Serialize)]
pub struct LanguageReport {
    pub language: String,
    pub files: LineMeasures,
}

/// Everything an `import` run published.
#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub languages: Vec<LanguageReport>,
    /// Languages skipped because no report kind was configured for them.
    pub skipped: Vec<String>,
}

/// Trait for formatting import reports.
pub trait ReportFormatter {
    fn format(&self, report: &ImportReport) -> Result<String, std::fmt::Error>;
}

/// Plain text formatter.
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &ImportReport) -> Result<String, std::fmt::Error> {
        let mut out = String::new();

        for skipped in &report.skipped {
            writeln!(out, "{skipped}: no coverage reports configured")?;
        }

        for pass in &report.languages {
            if pass.files.is_empty() {
                writeln!(out, "{}: no coverage imported", pass.language)?;
                continue;
            }

            writeln!(out, "Language: {}", pass.language)?;
            writeln!(out, "{:<60} {:>8} {:>8} {:>8}", "FILE", "LINES", "COVERED", "RATE")?;
            writeln!(out, "{}", "-".repeat(88))?;

            let mut total = 0;
            let mut uncovered = 0;
            for (path, m) in pass.files.iter() {
                total += m.lines_to_cover;
                uncovered += m.uncovered_lines;
                writeln!(
                    out,
                    "{:<60} {:>8} {:>8} {:>7.1}%",
                    path,
                    m.lines_to_cover,
                    m.lines_to_cover - m.uncovered_lines,
                    m.line_rate() * 100.0
                )?;
            }
            let covered = total - uncovered;
            writeln!(
                out,
                "Total: {}/{} lines ({:.1}%)",
                covered,
                total,
                rate(covered, total) * 100.0
            )?;
        }

        Ok(out)
    }
}

/// Render the line hits of a parsed report, one block per file.
pub fn format_coverage(coverage: &Coverage) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    if coverage.is_empty() {
        out.push_str("No line hits found.\n");
        return Ok(out);
    }

    for summary in coverage.summary() {
        writeln!(
            out,
            "{}  {}/{} ({:.1}%)",
            summary.path,
            summary.covered_lines,
            summary.lines_to_cover,
            summary.line_rate() * 100.0
        )?;
        writeln!(out, "{:>6}  {:>10}", "LINE", "HITS")?;
        for (line, hits) in coverage.hits(&summary.path) {
            let marker = if hits > 0 { "✓" } else { "✗" };
            writeln!(out, "{:>6}  {:>10}  {}", line, hits, marker)?;
        }
    }
    Ok(out)
}
