use std::path::Path;

use crate::detect::{detect_kind, ReportKind};
use crate::error::{NetcovError, Result};
use crate::model::Coverage;
use crate::parsers::parser_for;

/// Parse a single report file, auto-detecting its kind unless `kind` is
/// given. Returns the kind used and the parsed coverage.
pub fn parse_report(path: &Path, kind: Option<ReportKind>) -> Result<(ReportKind, Coverage)> {
    let kind = match kind {
        Some(kind) => kind,
        None => {
            let content = std::fs::read(path).map_err(|e| NetcovError::parse(path, e))?;
            detect_kind(path, &content).ok_or_else(|| {
                NetcovError::UnknownKind(format!(
                    "cannot detect the report kind of {}; pass --kind",
                    path.display()
                ))
            })?
        }
    };

    let mut coverage = Coverage::new();
    parser_for(kind).parse(path, &mut coverage)?;
    Ok((kind, coverage))
}
