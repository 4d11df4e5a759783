//! Expands configured report path expressions into existing files.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use glob::{MatchOptions, Pattern};
use log::warn;

use crate::error::{NetcovError, Result};

/// Turns one path expression into the set of existing files it names.
pub trait FileResolver {
    fn list_files(&self, pattern: &str) -> Result<BTreeSet<PathBuf>>;
}

/// Resolves `*`, `?` and `**` wildcard patterns relative to a base
/// directory.
///
/// `separator` is the path separator used in the configured patterns; it
/// is normalised before matching, so Windows-style `reports\*.xml` works
/// when `separator` is `\`.
#[derive(Debug, Clone)]
pub struct WildcardPatternFileProvider {
    base_dir: PathBuf,
    separator: char,
}

impl WildcardPatternFileProvider {
    pub fn new(base_dir: impl Into<PathBuf>, separator: char) -> Self {
        Self {
            base_dir: base_dir.into(),
            separator,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn normalise(&self, pattern: &str) -> String {
        if self.separator == '/' {
            pattern.to_string()
        } else {
            pattern.replace(self.separator, "/")
        }
    }
}

impl Default for WildcardPatternFileProvider {
    fn default() -> Self {
        Self::new(".", MAIN_SEPARATOR)
    }
}

impl FileResolver for WildcardPatternFileProvider {
    fn list_files(&self, pattern: &str) -> Result<BTreeSet<PathBuf>> {
        let normalised = self.normalise(pattern);
        let relative = Path::new(&normalised);

        let files: BTreeSet<PathBuf> = if !has_wildcard(&normalised) {
            let candidate = if relative.is_absolute() {
                relative.to_path_buf()
            } else {
                self.base_dir.join(relative)
            };
            if candidate.is_file() {
                BTreeSet::from([candidate])
            } else {
                BTreeSet::new()
            }
        } else {
            let full = if relative.is_absolute() {
                escape_brackets(&normalised)
            } else {
                let base = Pattern::escape(&self.base_dir.to_string_lossy());
                format!("{}/{}", base.trim_end_matches('/'), escape_brackets(&normalised))
            };
            let options = MatchOptions {
                case_sensitive: true,
                require_literal_separator: true,
                require_literal_leading_dot: false,
            };
            glob::glob_with(&full, options)
                .map_err(|source| NetcovError::Pattern {
                    pattern: pattern.to_string(),
                    source,
                })?
                // Entries that cannot be read are not matches.
                .filter_map(|entry| entry.ok())
                .filter(|path| path.is_file())
                .collect()
        };

        if files.is_empty() {
            warn!(
                "No coverage report matches '{}' (relative to {})",
                pattern,
                self.base_dir.display()
            );
        }
        Ok(files)
    }
}

/// Only `*` and `?` are wildcards; brackets are part of file names.
fn has_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

fn escape_brackets(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '[' => out.push_str("[[]"),
            ']' => out.push_str("[]]"),
            c => out.push(c),
        }
    }
    out
}

/// Split a comma-separated settings value into trimmed, non-empty patterns.
pub fn split_patterns(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|p| !p.is_empty())
}
