//! Uniform in-memory representation of line coverage, independent of the
//! report format it came from. Parsers add hits into a `Coverage`, which
//! is then merged and handed to the measurement step.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{NetcovError, Result};

/// Compute a coverage rate, returning 0.0 when the total is zero.
#[must_use]
pub fn rate(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64
    }
}

/// Line hit counts keyed by file path, then by line number.
///
/// Adding hits to a line that is already known sums the counts. A line
/// present with 0 hits is instrumentable but uncovered, which is not the
/// same thing as a line that is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Coverage {
    hits_by_file: BTreeMap<String, BTreeMap<u32, u64>>,
}

impl Coverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `hits` to `(file, line)`. Negative counts are rejected.
    pub fn add_hits(&mut self, file: &str, line: u32, hits: i64) -> Result<()> {
        let hits = u64::try_from(hits).map_err(|_| {
            NetcovError::InvalidArgument(format!(
                "hits must be non-negative, got {hits} for {file}:{line}"
            ))
        })?;
        self.accumulate(file, line, hits);
        Ok(())
    }

    fn accumulate(&mut self, file: &str, line: u32, hits: u64) {
        let count = self
            .hits_by_file
            .entry(file.to_string())
            .or_default()
            .entry(line)
            .or_insert(0);
        *count = count.saturating_add(hits);
    }

    /// Known file paths, sorted.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.hits_by_file.keys().map(String::as_str)
    }

    /// Line → hit count for `file`; empty when the file is unknown.
    pub fn hits(&self, file: &str) -> BTreeMap<u32, u64> {
        self.hits_by_file.get(file).cloned().unwrap_or_default()
    }

    /// Sum every hit of `other` into `self`.
    pub fn merge_from(&mut self, other: &Coverage) {
        for (file, lines) in &other.hits_by_file {
            for (&line, &hits) in lines {
                self.accumulate(file, line, hits);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits_by_file.is_empty()
    }

    /// Per-file line totals, sorted by path.
    pub fn summary(&self) -> Vec<FileSummary> {
        self.hits_by_file
            .iter()
            .map(|(path, lines)| FileSummary {
                path: path.clone(),
                lines_to_cover: lines.len() as u64,
                covered_lines: lines.values().filter(|&&h| h > 0).count() as u64,
            })
            .collect()
    }
}

/// Per-file summary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub path: String,
    pub lines_to_cover: u64,
    pub covered_lines: u64,
}

impl FileSummary {
    #[must_use]
    pub fn line_rate(&self) -> f64 {
        rate(self.covered_lines, self.lines_to_cover)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_hits_sums_existing_line() {
        let mut coverage = Coverage::new();
        coverage.add_hits("A", 2, 2).unwrap();
        coverage.add_hits("A", 2, 1).unwrap();
        coverage.add_hits("A", 1, 1).unwrap();
        coverage.add_hits("B", 1, 4).unwrap();

        assert_eq!(coverage.hits("A").get(&1), Some(&1));
        assert_eq!(coverage.hits("A").get(&2), Some(&3));
        assert_eq!(coverage.hits("B").get(&1), Some(&4));
    }

    #[test]
    fn test_zero_hits_is_recorded() {
        let mut coverage = Coverage::new();
        coverage.add_hits("A", 7, 0).unwrap();

        assert_eq!(coverage.hits("A").get(&7), Some(&0));
        assert_eq!(coverage.hits("A").get(&8), None);
    }

    #[test]
    fn test_negative_hits_rejected() {
        let mut coverage = Coverage::new();
        let err = coverage.add_hits("A", 1, -1).unwrap_err();
        assert!(matches!(err, NetcovError::InvalidArgument(_)));
        assert!(coverage.is_empty());
    }

    #[test]
    fn test_unknown_file_has_no_hits() {
        let coverage = Coverage::new();
        assert!(coverage.hits("missing.cs").is_empty());
        assert_eq!(coverage.files().count(), 0);
    }

    #[test]
    fn test_merge_from_is_order_independent() {
        let mut a = Coverage::new();
        a.add_hits("A", 1, 1).unwrap();
        a.add_hits("A", 2, 2).unwrap();
        let mut b = Coverage::new();
        b.add_hits("A", 2, 1).unwrap();
        b.add_hits("B", 1, 4).unwrap();

        let mut ab = a.clone();
        ab.merge_from(&b);
        let mut ba = b.clone();
        ba.merge_from(&a);

        assert_eq!(ab, ba);
        assert_eq!(ab.hits("A").get(&2), Some(&3));
    }

    #[test]
    fn test_summary() {
        let mut coverage = Coverage::new();
        coverage.add_hits("b.cs", 1, 0).unwrap();
        coverage.add_hits("a.cs", 1, 3).unwrap();
        coverage.add_hits("a.cs", 2, 0).unwrap();

        let summary = coverage.summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].path, "a.cs");
        assert_eq!(summary[0].lines_to_cover, 2);
        assert_eq!(summary[0].covered_lines, 1);
        assert!((summary[0].line_rate() - 0.5).abs() < f64::EPSILON);
        assert_eq!(summary[1].line_rate(), 0.0);
    }
}
