use crate::cache::{CachedParser, ParseCache};
use crate::config::CoverageConfiguration;
use crate::detect::ReportKind;
use crate::error::Result;
use crate::model::Coverage;
use crate::parsers::{parser_for, CoverageParser};
use crate::resolve::{split_patterns, FileResolver};
use crate::settings::Settings;

/// One parser per report kind.
pub struct ReportParsers {
    pub ncover3: Box<dyn CoverageParser>,
    pub opencover: Box<dyn CoverageParser>,
    pub dotcover: Box<dyn CoverageParser>,
    pub visualstudio: Box<dyn CoverageParser>,
}

impl ReportParsers {
    pub fn get(&self, kind: ReportKind) -> &dyn CoverageParser {
        match kind {
            ReportKind::NCover3 => self.ncover3.as_ref(),
            ReportKind::OpenCover => self.opencover.as_ref(),
            ReportKind::DotCover => self.dotcover.as_ref(),
            ReportKind::VisualStudio => self.visualstudio.as_ref(),
        }
    }
}

impl Default for ReportParsers {
    fn default() -> Self {
        Self {
            ncover3: parser_for(ReportKind::NCover3),
            opencover: parser_for(ReportKind::OpenCover),
            dotcover: parser_for(ReportKind::DotCover),
            visualstudio: parser_for(ReportKind::VisualStudio),
        }
    }
}

/// Parses every configured report and merges the hits into one `Coverage`.
pub struct CoverageAggregator<'a> {
    conf: &'a CoverageConfiguration,
    settings: &'a dyn Settings,
    parsers: ReportParsers,
    cache: &'a ParseCache,
}

impl<'a> CoverageAggregator<'a> {
    pub fn new(
        conf: &'a CoverageConfiguration,
        settings: &'a dyn Settings,
        cache: &'a ParseCache,
    ) -> Self {
        Self::with_parsers(conf, settings, cache, ReportParsers::default())
    }

    pub fn with_parsers(
        conf: &'a CoverageConfiguration,
        settings: &'a dyn Settings,
        cache: &'a ParseCache,
        parsers: ReportParsers,
    ) -> Self {
        Self {
            conf,
            settings,
            parsers,
            cache,
        }
    }

    /// Whether any report kind is configured at all.
    pub fn has_coverage_property(&self) -> bool {
        ReportKind::ALL
            .iter()
            .any(|&kind| self.settings.has_key(self.conf.property_key(kind)))
    }

    /// Parse the reports of every configured kind into `coverage`.
    ///
    /// Stops at the first report that fails to parse. Hits merged before the
    /// failure stay in `coverage`, and reports already in the parse cache
    /// stay cached.
    pub fn aggregate(&self, resolver: &dyn FileResolver, coverage: &mut Coverage) -> Result<()> {
        for kind in ReportKind::ALL {
            let key = self.conf.property_key(kind);
            if !self.settings.has_key(key) {
                continue;
            }
            let Some(value) = self.settings.get_string(key) else {
                continue;
            };

            let raw = self.parsers.get(kind);
            let cached;
            let use_cache = self.settings.get_bool(&self.conf.use_cache_key(kind));
            let parser: &dyn CoverageParser = if use_cache {
                cached = CachedParser::new(raw, self.cache);
                &cached
            } else {
                raw
            };

            for pattern in split_patterns(&value) {
                for file in resolver.list_files(pattern)? {
                    parser.parse(&file, coverage)?;
                }
            }
        }
        Ok(())
    }
}
