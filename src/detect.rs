/// Report kinds and auto-detection of the kind of a report file.
///
/// Strategy:
///   1. Check file extension for strong hints
///   2. Peek at the first bytes of the file content
///   3. Fall back to the CLI --kind override (handled by caller)
use std::path::Path;

use crate::error::NetcovError;

/// Supported coverage report kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportKind {
    NCover3,
    OpenCover,
    DotCover,
    VisualStudio,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::NCover3,
        ReportKind::OpenCover,
        ReportKind::DotCover,
        ReportKind::VisualStudio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::NCover3 => "ncover3",
            ReportKind::OpenCover => "opencover",
            ReportKind::DotCover => "dotcover",
            ReportKind::VisualStudio => "visualstudio",
        }
    }
}

impl std::str::FromStr for ReportKind {
    type Err = NetcovError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ncover3" | "ncover" => Ok(ReportKind::NCover3),
            "opencover" => Ok(ReportKind::OpenCover),
            "dotcover" => Ok(ReportKind::DotCover),
            "visualstudio" | "vscoveragexml" => Ok(ReportKind::VisualStudio),
            _ => Err(NetcovError::UnknownKind(format!(
                "'{}'. Supported: ncover3, opencover, dotcover, visualstudio",
                s
            ))),
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the report kind from filename and file content.
pub fn detect_kind(path: &Path, content: &[u8]) -> Option<ReportKind> {
    if let Some(kind) = detect_by_extension(path) {
        return Some(kind);
    }

    detect_by_content(content)
}

fn detect_by_extension(path: &Path) -> Option<ReportKind> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "nccov" => Some(ReportKind::NCover3),
        "coveragexml" => Some(ReportKind::VisualStudio),
        "html" | "htm" => Some(ReportKind::DotCover),
        // OpenCover and NCover3 both use plain .xml
        _ => None,
    }
}

fn detect_by_content(content: &[u8]) -> Option<ReportKind> {
    let head_len = content.len().min(4096);
    let head = String::from_utf8_lossy(&content[..head_len]);

    if head.contains("<CoverageSession") {
        return Some(ReportKind::OpenCover);
    }
    if head.contains("<coverage") && head.contains("exportversion") {
        return Some(ReportKind::NCover3);
    }
    if head.contains("<results") && head.contains("<modules") {
        return Some(ReportKind::VisualStudio);
    }
    if head.to_lowercase().contains("<html") {
        return Some(ReportKind::DotCover);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(
            detect_kind(Path::new("run.nccov"), b""),
            Some(ReportKind::NCover3)
        );
        assert_eq!(
            detect_kind(Path::new("run.coveragexml"), b""),
            Some(ReportKind::VisualStudio)
        );
        assert_eq!(
            detect_kind(Path::new("dotCover.HTML"), b""),
            Some(ReportKind::DotCover)
        );
    }

    #[test]
    fn test_detect_opencover_by_content() {
        let content = b"<?xml version=\"1.0\"?>\n<CoverageSession xmlns:xsd=\"x\">";
        assert_eq!(
            detect_kind(Path::new("coverage.xml"), content),
            Some(ReportKind::OpenCover)
        );
    }

    #[test]
    fn test_detect_ncover3_by_content() {
        let content = b"<?xml version=\"1.0\"?>\n<coverage exportversion=\"3\">";
        assert_eq!(
            detect_kind(Path::new("coverage.xml"), content),
            Some(ReportKind::NCover3)
        );
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(detect_kind(Path::new("random.dat"), b"hello world"), None);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("OpenCover".parse::<ReportKind>().unwrap(), ReportKind::OpenCover);
        assert_eq!("vscoveragexml".parse::<ReportKind>().unwrap(), ReportKind::VisualStudio);
        assert!("cobertura".parse::<ReportKind>().is_err());
    }
}
