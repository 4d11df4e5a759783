//! Command handler functions for the netcov CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::aggregate::CoverageAggregator;
use crate::cache::{GlobalCoverageCache, ParseCache};
use crate::config::CoverageConfiguration;
use crate::detect::ReportKind;
use crate::import::{CoverageReportImporter, ExtensionProjectFiles, LineMeasures};
use crate::model::Coverage;
use crate::report::{format_coverage, ImportReport, LanguageReport, ReportFormatter, TextFormatter};
use crate::resolve::WildcardPatternFileProvider;
use crate::settings::PropertySettings;

/// Inputs of the `import` command.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// TOML settings file.
    pub settings_file: Option<PathBuf>,
    /// `key=value` settings applied after the file.
    pub overrides: Vec<String>,
    /// Directory report patterns and source paths are relative to.
    pub base_dir: PathBuf,
    /// Path separator used in report patterns.
    pub separator: char,
    /// One import pass per language, in order.
    pub languages: Vec<String>,
    pub json: bool,
}

pub fn load_settings(settings_file: Option<&Path>, overrides: &[String]) -> Result<PropertySettings> {
    let mut settings = match settings_file {
        Some(path) => PropertySettings::from_file(path)?,
        None => PropertySettings::new(),
    };
    for spec in overrides {
        settings.apply_override(spec)?;
    }
    Ok(settings)
}

/// Run the import for every language, sharing both caches between passes.
pub fn run_import(options: &ImportOptions) -> Result<ImportReport> {
    let settings = load_settings(options.settings_file.as_deref(), &options.overrides)?;
    let resolver = WildcardPatternFileProvider::new(&options.base_dir, options.separator);
    let project = ExtensionProjectFiles::new(&options.base_dir);
    let parse_cache = ParseCache::new();
    let mut global = GlobalCoverageCache::new();

    let mut report = ImportReport::default();
    for language in &options.languages {
        let conf = CoverageConfiguration::for_language(language);
        let aggregator = CoverageAggregator::new(&conf, &settings, &parse_cache);
        let importer = CoverageReportImporter::new(&conf, &settings, aggregator, &resolver);
        if !importer.should_execute() {
            info!("No coverage report configured for language '{}'", language);
            report.skipped.push(language.clone());
            continue;
        }

        let mut files = LineMeasures::new();
        importer
            .analyze(&mut global, &project, &mut files, Coverage::new())
            .with_context(|| format!("Coverage import failed for language '{language}'"))?;
        report.languages.push(LanguageReport {
            language: language.clone(),
            files,
        });
    }
    Ok(report)
}

pub fn cmd_import(options: &ImportOptions) -> Result<String> {
    let report = run_import(options)?;
    if options.json {
        let mut out = serde_json::to_string_pretty(&report)?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(TextFormatter.format(&report)?)
    }
}

pub fn cmd_parse(file: &Path, kind: Option<&str>, json: bool) -> Result<String> {
    let kind = kind.map(str::parse::<ReportKind>).transpose()?;
    let (kind, coverage) = crate::ingest::parse_report(file, kind)
        .with_context(|| format!("Failed to parse {}", file.display()))?;
    info!("Parsed {} as {}", file.display(), kind);

    if json {
        let mut out = serde_json::to_string_pretty(&coverage)?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(format_coverage(&coverage)?)
    }
}
