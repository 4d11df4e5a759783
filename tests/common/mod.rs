#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use netcov::aggregate::ReportParsers;
use netcov::config::CoverageConfiguration;
use netcov::error::{NetcovError, Result};
use netcov::import::{CoverageSink, ProjectFiles};
use netcov::model::Coverage;
use netcov::parsers::CoverageParser;
use netcov::resolve::FileResolver;

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// The configuration used throughout: each report kind keyed by its name.
pub fn test_conf() -> CoverageConfiguration {
    CoverageConfiguration::new("cs", "ncover", "opencover", "dotcover", "visualstudio")
}

type ScriptedHits = Vec<(String, u32, i64)>;

/// A parser double: records every file it is asked to parse, adds the hits
/// scripted for that file, and fails on files marked as corrupt. Clones
/// share their state, so a clone can be handed to the code under test.
#[derive(Clone, Default)]
pub struct RecordingParser {
    calls: Rc<RefCell<Vec<PathBuf>>>,
    hits: Rc<RefCell<HashMap<PathBuf, ScriptedHits>>>,
    corrupt: Rc<RefCell<BTreeSet<PathBuf>>>,
}

impl RecordingParser {
    pub fn with_hits(self, file: &str, hits: &[(&str, u32, i64)]) -> Self {
        let scripted = hits
            .iter()
            .map(|&(source, line, count)| (source.to_string(), line, count))
            .collect();
        self.hits.borrow_mut().insert(PathBuf::from(file), scripted);
        self
    }

    pub fn with_corrupt(self, file: &str) -> Self {
        self.corrupt.borrow_mut().insert(PathBuf::from(file));
        self
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn boxed(&self) -> Box<dyn CoverageParser> {
        Box::new(self.clone())
    }
}

impl CoverageParser for RecordingParser {
    fn parse(&self, path: &Path, coverage: &mut Coverage) -> Result<()> {
        self.calls.borrow_mut().push(path.to_path_buf());
        if self.corrupt.borrow().contains(path) {
            return Err(NetcovError::parse(path, "corrupt report"));
        }
        if let Some(hits) = self.hits.borrow().get(path) {
            for (source, line, count) in hits {
                coverage.add_hits(source, *line, *count)?;
            }
        }
        Ok(())
    }
}

/// One recording parser per report kind.
#[derive(Clone, Default)]
pub struct Parsers {
    pub ncover: RecordingParser,
    pub opencover: RecordingParser,
    pub dotcover: RecordingParser,
    pub visualstudio: RecordingParser,
}

impl Parsers {
    pub fn report_parsers(&self) -> ReportParsers {
        ReportParsers {
            ncover3: self.ncover.boxed(),
            opencover: self.opencover.boxed(),
            dotcover: self.dotcover.boxed(),
            visualstudio: self.visualstudio.boxed(),
        }
    }
}

/// Resolves scripted patterns and records every lookup.
#[derive(Default)]
pub struct FakeResolver {
    files: HashMap<String, BTreeSet<PathBuf>>,
    lookups: RefCell<Vec<String>>,
}

impl FakeResolver {
    pub fn with(mut self, pattern: &str, files: &[&str]) -> Self {
        self.files.insert(
            pattern.to_string(),
            files.iter().map(PathBuf::from).collect(),
        );
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }
}

impl FileResolver for FakeResolver {
    fn list_files(&self, pattern: &str) -> Result<BTreeSet<PathBuf>> {
        self.lookups.borrow_mut().push(pattern.to_string());
        Ok(self.files.get(pattern).cloned().unwrap_or_default())
    }
}

/// Project files by exact path.
#[derive(Default)]
pub struct FakeProject {
    languages: HashMap<String, String>,
}

impl FakeProject {
    pub fn with(mut self, path: &str, language: &str) -> Self {
        self.languages.insert(path.to_string(), language.to_string());
        self
    }
}

impl ProjectFiles for FakeProject {
    fn language_of(&self, path: &str) -> Option<String> {
        self.languages.get(path).cloned()
    }
}

/// Keeps every saved file's hits.
#[derive(Default)]
pub struct RecordingSink {
    pub saved: BTreeMap<String, BTreeMap<u32, u64>>,
}

impl CoverageSink for RecordingSink {
    fn save_line_hits(&mut self, path: &str, hits: &BTreeMap<u32, u64>) {
        self.saved.insert(path.to_string(), hits.clone());
    }
}
