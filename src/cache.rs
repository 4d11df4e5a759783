//! Caches that let several analysis passes in one process share work.
//!
//! - [`ParseCache`] remembers the parsed content of each report file, so a
//!   report consumed by several languages is read only once.
//! - [`GlobalCoverageCache`] remembers a whole merged result per
//!   configuration key, so the aggregation runs at most once.
//!
//! Both are owned by the caller driving the passes and live as long as it
//! keeps them; nothing is evicted and on-disk changes are not noticed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::info;

use crate::error::Result;
use crate::model::Coverage;
use crate::parsers::CoverageParser;

/// Parsed coverage per absolute report path.
#[derive(Debug, Default)]
pub struct ParseCache {
    entries: RefCell<HashMap<PathBuf, Coverage>>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.borrow().contains_key(&cache_key(path))
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

fn cache_key(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Wraps a parser so each report path is parsed at most once per
/// [`ParseCache`]. Every call still merges the file's hits into the
/// caller's target.
pub struct CachedParser<'a> {
    parser: &'a dyn CoverageParser,
    cache: &'a ParseCache,
}

impl<'a> CachedParser<'a> {
    pub fn new(parser: &'a dyn CoverageParser, cache: &'a ParseCache) -> Self {
        Self { parser, cache }
    }
}

impl CoverageParser for CachedParser<'_> {
    fn parse(&self, path: &Path, coverage: &mut Coverage) -> Result<()> {
        let key = cache_key(path);
        let cached = self.cache.entries.borrow().contains_key(&key);
        if cached {
            info!("Reusing cached coverage parsing for {}", key.display());
        } else {
            let mut parsed = Coverage::new();
            self.parser.parse(path, &mut parsed)?;
            self.cache.entries.borrow_mut().insert(key.clone(), parsed);
            info!("Caching coverage parsing for {}", key.display());
        }

        if let Some(parsed) = self.cache.entries.borrow().get(&key) {
            coverage.merge_from(parsed);
        }
        Ok(())
    }
}

/// Merged coverage per configuration key.
///
/// A stored result is frozen: every later request for the same key shares
/// the same `Rc`, and nobody can add hits to it any more.
#[derive(Debug, Default)]
pub struct GlobalCoverageCache {
    entries: HashMap<String, Rc<Coverage>>,
}

impl GlobalCoverageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Rc<Coverage>> {
        self.entries.get(key).cloned()
    }

    /// Store `coverage` under `key` unless a result is already there, and
    /// return whichever result is now cached.
    pub fn insert(&mut self, key: &str, coverage: Coverage) -> Rc<Coverage> {
        Rc::clone(
            self.entries
                .entry(key.to_string())
                .or_insert_with(|| Rc::new(coverage)),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
