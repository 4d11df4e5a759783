//! Runs one coverage import pass for a language: aggregate the configured
//! reports (or reuse a globally cached result), then publish the line hits
//! of every project file of that language.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, info};
use serde::Serialize;

use crate::aggregate::CoverageAggregator;
use crate::cache::GlobalCoverageCache;
use crate::config::CoverageConfiguration;
use crate::error::Result;
use crate::model::{rate, Coverage};
use crate::resolve::FileResolver;
use crate::settings::Settings;

/// The host project's view of source files.
pub trait ProjectFiles {
    /// Language of the project file at `path`, or `None` when the file does
    /// not belong to the project.
    fn language_of(&self, path: &str) -> Option<String>;
}

/// Receives the line hits of each imported file.
pub trait CoverageSink {
    fn save_line_hits(&mut self, path: &str, hits: &BTreeMap<u32, u64>);
}

/// Project files are the files that exist on disk (relative paths are taken
/// from `base_dir`), with the language given by their extension.
#[derive(Debug, Clone)]
pub struct ExtensionProjectFiles {
    base_dir: PathBuf,
    languages: HashMap<String, String>,
}

impl ExtensionProjectFiles {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let languages = [("cs", "cs"), ("vb", "vbnet")]
            .into_iter()
            .map(|(ext, lang)| (ext.to_string(), lang.to_string()))
            .collect();
        Self {
            base_dir: base_dir.into(),
            languages,
        }
    }

    #[must_use]
    pub fn with_language(mut self, extension: &str, language: &str) -> Self {
        self.languages
            .insert(extension.to_lowercase(), language.to_string());
        self
    }
}

impl ProjectFiles for ExtensionProjectFiles {
    fn language_of(&self, path: &str) -> Option<String> {
        let file = self.base_dir.join(Path::new(path));
        if !file.is_file() {
            return None;
        }
        let ext = file.extension()?.to_str()?.to_lowercase();
        self.languages.get(&ext).cloned()
    }
}

/// Line measures of one file, as saved by [`LineMeasures`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMeasures {
    pub lines_to_cover: u64,
    pub uncovered_lines: u64,
    pub hits: BTreeMap<u32, u64>,
}

impl FileMeasures {
    #[must_use]
    pub fn line_rate(&self) -> f64 {
        rate(self.lines_to_cover - self.uncovered_lines, self.lines_to_cover)
    }
}

/// A sink that keeps the measures of every saved file.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct LineMeasures {
    files: BTreeMap<String, FileMeasures>,
}

impl LineMeasures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&FileMeasures> {
        self.files.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileMeasures)> {
        self.files.iter().map(|(path, m)| (path.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl CoverageSink for LineMeasures {
    fn save_line_hits(&mut self, path: &str, hits: &BTreeMap<u32, u64>) {
        let measures = FileMeasures {
            lines_to_cover: hits.len() as u64,
            uncovered_lines: hits.values().filter(|&&h| h == 0).count() as u64,
            hits: hits.clone(),
        };
        self.files.insert(path.to_string(), measures);
    }
}

/// The coverage import for one language.
pub struct CoverageReportImporter<'a> {
    conf: &'a CoverageConfiguration,
    settings: &'a dyn Settings,
    aggregator: CoverageAggregator<'a>,
    resolver: &'a dyn FileResolver,
}

impl<'a> CoverageReportImporter<'a> {
    pub fn new(
        conf: &'a CoverageConfiguration,
        settings: &'a dyn Settings,
        aggregator: CoverageAggregator<'a>,
        resolver: &'a dyn FileResolver,
    ) -> Self {
        Self {
            conf,
            settings,
            aggregator,
            resolver,
        }
    }

    pub fn should_execute(&self) -> bool {
        self.aggregator.has_coverage_property()
    }

    /// Aggregate into `coverage` and publish the result to `sink`.
    ///
    /// With the global cache toggle on, the first successful pass for the
    /// configuration's cache key is stored in `global`; later passes skip
    /// aggregation, drop `coverage` and publish the stored result instead.
    /// The entry is written only after aggregation succeeds, not before it,
    /// so a failed pass leaves no half-filled result behind.
    /// Returns the coverage that was published.
    pub fn analyze(
        &self,
        global: &mut GlobalCoverageCache,
        project: &dyn ProjectFiles,
        sink: &mut dyn CoverageSink,
        coverage: Coverage,
    ) -> Result<Rc<Coverage>> {
        let used = if self.settings.get_bool(self.conf.global_cache_key()) {
            let key = self.conf.global_cache_key();
            match global.get(key) {
                Some(cached) => {
                    info!("Reusing global cached coverage");
                    cached
                }
                None => global.insert(key, self.aggregate(coverage)?),
            }
        } else {
            Rc::new(self.aggregate(coverage)?)
        };

        self.publish(&used, project, sink);
        Ok(used)
    }

    fn aggregate(&self, mut coverage: Coverage) -> Result<Coverage> {
        self.aggregator.aggregate(self.resolver, &mut coverage)?;
        Ok(coverage)
    }

    fn publish(&self, coverage: &Coverage, project: &dyn ProjectFiles, sink: &mut dyn CoverageSink) {
        for path in coverage.files() {
            match project.language_of(path) {
                Some(language) if language == self.conf.language_key() => {
                    sink.save_line_hits(path, &coverage.hits(path));
                }
                Some(_) => {}
                None => debug!(
                    "Code coverage will not be imported for the following file outside of the project: {}",
                    path
                ),
            }
        }
    }
}
