//! Which settings keys configure the coverage import.

use crate::detect::ReportKind;

/// Global toggle: reuse one merged result across every analysis pass.
pub const DEFAULT_GLOBAL_CACHE_KEY: &str = "sonar.dotnet.coverage.useGlobalCache";

/// Suffix of the per-kind "use the parse cache" toggle.
const USE_CACHE_SUFFIX: &str = ".useCache";

/// Settings keys for one language's coverage import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageConfiguration {
    language_key: String,
    ncover3_key: String,
    opencover_key: String,
    dotcover_key: String,
    visualstudio_key: String,
    global_cache_key: String,
}

impl CoverageConfiguration {
    pub fn new(
        language_key: &str,
        ncover3_key: &str,
        opencover_key: &str,
        dotcover_key: &str,
        visualstudio_key: &str,
    ) -> Self {
        Self {
            language_key: language_key.to_string(),
            ncover3_key: ncover3_key.to_string(),
            opencover_key: opencover_key.to_string(),
            dotcover_key: dotcover_key.to_string(),
            visualstudio_key: visualstudio_key.to_string(),
            global_cache_key: DEFAULT_GLOBAL_CACHE_KEY.to_string(),
        }
    }

    /// The conventional keys for `language`, e.g.
    /// `sonar.cs.opencover.reportsPaths`.
    pub fn for_language(language: &str) -> Self {
        let key = |tool: &str| format!("sonar.{language}.{tool}.reportsPaths");
        Self::new(
            language,
            &key("ncover3"),
            &key("opencover"),
            &key("dotcover"),
            &key("vscoveragexml"),
        )
    }

    #[must_use]
    pub fn with_global_cache_key(mut self, key: &str) -> Self {
        self.global_cache_key = key.to_string();
        self
    }

    pub fn language_key(&self) -> &str {
        &self.language_key
    }

    /// The settings key holding the report paths for `kind`.
    pub fn property_key(&self, kind: ReportKind) -> &str {
        match kind {
            ReportKind::NCover3 => &self.ncover3_key,
            ReportKind::OpenCover => &self.opencover_key,
            ReportKind::DotCover => &self.dotcover_key,
            ReportKind::VisualStudio => &self.visualstudio_key,
        }
    }

    /// The settings key enabling the parse cache for `kind`.
    pub fn use_cache_key(&self, kind: ReportKind) -> String {
        format!("{}{}", self.property_key(kind), USE_CACHE_SUFFIX)
    }

    pub fn global_cache_key(&self) -> &str {
        &self.global_cache_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_language() {
        let conf = CoverageConfiguration::for_language("cs");
        assert_eq!(conf.language_key(), "cs");
        assert_eq!(
            conf.property_key(ReportKind::OpenCover),
            "sonar.cs.opencover.reportsPaths"
        );
        assert_eq!(
            conf.property_key(ReportKind::VisualStudio),
            "sonar.cs.vscoveragexml.reportsPaths"
        );
        assert_eq!(
            conf.use_cache_key(ReportKind::DotCover),
            "sonar.cs.dotcover.reportsPaths.useCache"
        );
        assert_eq!(conf.global_cache_key(), DEFAULT_GLOBAL_CACHE_KEY);
    }

    #[test]
    fn test_custom_keys() {
        let conf = CoverageConfiguration::new("", "ncover", "opencover", "dotcover", "visualstudio")
            .with_global_cache_key("reuse");
        assert_eq!(conf.use_cache_key(ReportKind::NCover3), "ncover.useCache");
        assert_eq!(conf.global_cache_key(), "reuse");
    }
}
