/// Parser for NCover 3 coverage exports (`.nccov`).
///
/// Structure:
///   <coverage exportversion="3">
///     <documents>
///       <doc id="1" url="C:\src\Foo.cs" />
///     </documents>
///     <module>
///       <method>
///         <seqpnt vc="2" l="12" c="5" el="12" ec="30" doc="1" />
///       </method>
///     </module>
///   </coverage>
use std::collections::HashMap;
use std::path::Path;

use crate::error::{NetcovError, Result};
use crate::model::Coverage;
use crate::parsers::{add_hits, read_report, required, required_number, visit_elements, CoverageParser};

pub struct NCover3Parser;

impl CoverageParser for NCover3Parser {
    fn parse(&self, path: &Path, coverage: &mut Coverage) -> Result<()> {
        let input = read_report(path)?;
        parse_ncover3(path, &input, coverage)
    }
}

fn parse_ncover3(path: &Path, input: &[u8], coverage: &mut Coverage) -> Result<()> {
    let mut documents: HashMap<String, String> = HashMap::new();
    let mut saw_root = false;

    visit_elements(path, input, |name, attrs| {
        match name {
            b"coverage" => {
                let version = required(path, "coverage", attrs, "exportversion")?;
                if version != "3" {
                    return Err(NetcovError::parse(
                        path,
                        format!("exportversion '{version}' is not supported, expected '3'"),
                    ));
                }
                saw_root = true;
            }
            b"doc" => {
                let id = required(path, "doc", attrs, "id")?;
                // Document 0 is NCover's placeholder for code without source.
                if id != "0" {
                    let url = required(path, "doc", attrs, "url")?;
                    documents.insert(id.to_string(), url.to_string());
                }
            }
            b"seqpnt" => {
                let doc = required(path, "seqpnt", attrs, "doc")?;
                if let Some(file) = documents.get(doc) {
                    let line: u32 = required_number(path, "seqpnt", attrs, "l")?;
                    let hits: i64 = required_number(path, "seqpnt", attrs, "vc")?;
                    add_hits(path, coverage, file, line, hits)?;
                }
            }
            _ => {}
        }
        Ok(())
    })?;

    if !saw_root {
        return Err(NetcovError::parse(path, "missing <coverage> root element"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ncover3() {
        let input = br#"<?xml version="1.0" encoding="utf-8"?>
<coverage exportversion="3">
  <documents>
    <doc id="0" url="" />
    <doc id="1" url="C:\src\Foo.cs" />
    <doc id="2" url="C:\src\Bar.cs" />
  </documents>
  <module name="Lib.dll">
    <method name="Run">
      <seqpnt vc="2" l="12" c="5" el="12" ec="30" doc="1" />
      <seqpnt vc="1" l="12" c="31" el="12" ec="40" doc="1" />
      <seqpnt vc="0" l="13" c="5" el="13" ec="10" doc="1" />
      <seqpnt vc="3" l="4" c="1" el="4" ec="2" doc="2" />
      <seqpnt vc="9" l="1" c="1" el="1" ec="2" doc="0" />
    </method>
  </module>
</coverage>"#;
        let mut coverage = Coverage::new();
        parse_ncover3(Path::new("run.nccov"), input, &mut coverage).unwrap();

        assert_eq!(coverage.files().count(), 2);
        let foo = coverage.hits(r"C:\src\Foo.cs");
        assert_eq!(foo.get(&12), Some(&3));
        assert_eq!(foo.get(&13), Some(&0));
        assert_eq!(coverage.hits(r"C:\src\Bar.cs").get(&4), Some(&3));
    }

    #[test]
    fn test_wrong_export_version() {
        let input = br#"<coverage exportversion="2"></coverage>"#;
        let err = parse_ncover3(Path::new("old.nccov"), input, &mut Coverage::new()).unwrap_err();
        assert!(err.to_string().contains("old.nccov"), "{err}");
        assert!(err.to_string().contains("exportversion"), "{err}");
    }

    #[test]
    fn test_negative_visit_count() {
        let input = br#"<coverage exportversion="3">
  <documents><doc id="1" url="a.cs" /></documents>
  <seqpnt vc="-1" l="1" doc="1" />
</coverage>"#;
        let err = parse_ncover3(Path::new("bad.nccov"), input, &mut Coverage::new()).unwrap_err();
        assert!(matches!(err, NetcovError::Parse { .. }));
    }
}
