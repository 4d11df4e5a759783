pub mod dotcover;
pub mod ncover3;
pub mod opencover;
pub mod visualstudio;

use std::collections::HashMap;
use std::path::Path;
use std::str;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::detect::ReportKind;
use crate::error::{NetcovError, Result};
use crate::model::Coverage;

/// Every report kind has a parser implementing this trait.
pub trait CoverageParser {
    /// Read the report at `path` and add every line hit it records to
    /// `coverage`. Hits already present in `coverage` are summed with.
    fn parse(&self, path: &Path, coverage: &mut Coverage) -> Result<()>;
}

/// The production parser for `kind`.
pub fn parser_for(kind: ReportKind) -> Box<dyn CoverageParser> {
    match kind {
        ReportKind::NCover3 => Box::new(ncover3::NCover3Parser),
        ReportKind::OpenCover => Box::new(opencover::OpenCoverParser),
        ReportKind::DotCover => Box::new(dotcover::DotCoverReportsAggregator::default()),
        ReportKind::VisualStudio => Box::new(visualstudio::VisualStudioParser),
    }
}

/// Read a whole report file, reporting failures against that file.
fn read_report(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| NetcovError::parse(path, e))
}

/// Call `visit` with the name and attributes of every start or empty
/// element in document order.
fn visit_elements<F>(path: &Path, input: &[u8], mut visit: F) -> Result<()>
where
    F: FnMut(&[u8], &HashMap<String, String>) -> Result<()>,
{
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Err(source) => {
                let err = NetcovError::Xml {
                    source,
                    position: reader.buffer_position(),
                };
                return Err(NetcovError::parse(path, err));
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let attrs = attr_map(e);
                visit(e.local_name().as_ref(), &attrs)?;
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Extract attributes from an XML element into a HashMap.
fn attr_map(e: &BytesStart) -> HashMap<String, String> {
    e.attributes()
        .filter_map(|a| {
            let attr = a.ok()?;
            let key = str::from_utf8(attr.key.local_name().into_inner())
                .ok()?
                .to_string();
            let value = attr.unescape_value().ok()?.to_string();
            Some((key, value))
        })
        .collect()
}

/// Look up a mandatory attribute.
fn required<'a>(
    path: &Path,
    element: &str,
    attrs: &'a HashMap<String, String>,
    name: &str,
) -> Result<&'a str> {
    attrs.get(name).map(String::as_str).ok_or_else(|| {
        NetcovError::parse(path, format!("missing attribute '{name}' on <{element}>"))
    })
}

/// Look up a mandatory integer attribute.
fn required_number<T: str::FromStr>(
    path: &Path,
    element: &str,
    attrs: &HashMap<String, String>,
    name: &str,
) -> Result<T> {
    let raw = required(path, element, attrs, name)?;
    raw.trim().parse().map_err(|_| {
        NetcovError::parse(
            path,
            format!("expected an integer in '{name}' on <{element}>, got '{raw}'"),
        )
    })
}

/// Add hits, turning a rejected count into a parse error for `path`.
fn add_hits(path: &Path, coverage: &mut Coverage, file: &str, line: u32, hits: i64) -> Result<()> {
    coverage
        .add_hits(file, line, hits)
        .map_err(|e| NetcovError::parse(path, e))
}
