/// Parsers for dotCover HTML reports.
///
/// A dotCover HTML export is a main page `<name>.html` plus a companion
/// folder `<name>/src/` holding one page per source file:
///
///   <html>
///     <head><title>C:\src\Foo.cs</title></head>
///     <body>
///       <script>highlightRanges([[12,9,12,30,1],[13,9,13,20,0]]);</script>
///     </body>
///   </html>
///
/// Each `[start line, start col, end line, end col, hits]` tuple
/// contributes its hits to the start line.
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{NetcovError, Result};
use crate::model::Coverage;
use crate::parsers::{add_hits, read_report, CoverageParser};

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title>\s*(.*?)\s*</title>").unwrap());

static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+),\s*\d+,\s*\d+,\s*\d+,\s*(-?\d+)\]").unwrap());

/// The page dotCover writes for code without a source file.
const NO_SOURCE_PAGE: &str = "nosource.html";

/// Parses a single per-source-file dotCover page.
#[derive(Default)]
pub struct DotCoverReportParser;

impl CoverageParser for DotCoverReportParser {
    fn parse(&self, path: &Path, coverage: &mut Coverage) -> Result<()> {
        let input = read_report(path)?;
        let content = String::from_utf8_lossy(&input);
        parse_source_page(path, &content, coverage)
    }
}

fn parse_source_page(path: &Path, content: &str, coverage: &mut Coverage) -> Result<()> {
    let file = TITLE_RE
        .captures(content)
        .map(|caps| decode_title(path, &caps[1]))
        .transpose()?
        .filter(|title| !title.is_empty())
        .ok_or_else(|| NetcovError::parse(path, "no <title> naming the source file"))?;

    for caps in RANGE_RE.captures_iter(content) {
        let line: u32 = caps[1]
            .parse()
            .map_err(|_| NetcovError::parse(path, format!("line number out of range: {}", &caps[1])))?;
        let hits: i64 = caps[2]
            .parse()
            .map_err(|_| NetcovError::parse(path, format!("hit count out of range: {}", &caps[2])))?;
        add_hits(path, coverage, &file, line, hits)?;
    }
    Ok(())
}

/// Resolve character references such as `&amp;` in a page title.
fn decode_title(path: &Path, raw: &str) -> Result<String> {
    quick_xml::escape::unescape(raw)
        .map(|title| title.into_owned())
        .map_err(|e| NetcovError::parse(path, format!("bad entity in <title>: {e}")))
}

/// Parses a main dotCover HTML report by parsing every source page in
/// its companion folder.
#[derive(Default)]
pub struct DotCoverReportsAggregator {
    parser: DotCoverReportParser,
}

impl CoverageParser for DotCoverReportsAggregator {
    fn parse(&self, path: &Path, coverage: &mut Coverage) -> Result<()> {
        let input = read_report(path)?;
        let content = String::from_utf8_lossy(&input);
        if !content.to_lowercase().contains("<html") {
            return Err(NetcovError::parse(path, "not a dotCover HTML report"));
        }

        for page in source_pages(path)? {
            self.parser.parse(&page, coverage)?;
        }
        Ok(())
    }
}

/// The per-source pages belonging to the main report at `path`, sorted.
fn source_pages(path: &Path) -> Result<Vec<PathBuf>> {
    let stem = path
        .file_stem()
        .ok_or_else(|| NetcovError::parse(path, "report has no file name"))?;
    let folder = path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(stem)
        .join("src");
    if !folder.is_dir() {
        return Err(NetcovError::parse(
            path,
            format!("dotCover sources folder not found: {}", folder.display()),
        ));
    }

    let mut pages = Vec::new();
    for entry in std::fs::read_dir(&folder).map_err(|e| NetcovError::parse(path, e))? {
        let page = entry.map_err(|e| NetcovError::parse(path, e))?.path();
        let is_html = page
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("html"));
        let is_excluded = page
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.eq_ignore_ascii_case(NO_SOURCE_PAGE));
        if page.is_file() && is_html && !is_excluded {
            pages.push(page);
        }
    }
    pages.sort();
    Ok(pages)
}
