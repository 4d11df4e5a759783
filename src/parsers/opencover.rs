/// Parser for OpenCover XML reports.
///
/// Structure:
///   <CoverageSession>
///     <Modules>
///       <Module>
///         <Files>
///           <File uid="1" fullPath="C:\src\Foo.cs" />
///         </Files>
///         <Classes><Class><Methods>
///           <Method>
///             <SequencePoints>
///               <SequencePoint vc="1" sl="12" fileid="1" />
///             </SequencePoints>
///             <FileRef uid="1" />
///           </Method>
///         </Methods></Class></Classes>
///       </Module>
///     </Modules>
///   </CoverageSession>
///
/// Older OpenCover versions omit `fileid` on sequence points; the file
/// then comes from the method's `<FileRef>`.
use std::collections::HashMap;
use std::path::Path;

use crate::error::{NetcovError, Result};
use crate::model::Coverage;
use crate::parsers::{add_hits, read_report, required, required_number, visit_elements, CoverageParser};

pub struct OpenCoverParser;

impl CoverageParser for OpenCoverParser {
    fn parse(&self, path: &Path, coverage: &mut Coverage) -> Result<()> {
        let input = read_report(path)?;
        parse_opencover(path, &input, coverage)
    }
}

/// A sequence point waiting for its file to be known.
struct PendingPoint {
    file_id: Option<String>,
    line: u32,
    hits: i64,
}

fn parse_opencover(path: &Path, input: &[u8], coverage: &mut Coverage) -> Result<()> {
    let mut files: HashMap<String, String> = HashMap::new();
    let mut points: Vec<PendingPoint> = Vec::new();
    let mut method_start = 0;
    let mut method_file: Option<String> = None;
    let mut saw_root = false;

    visit_elements(path, input, |name, attrs| {
        match name {
            b"CoverageSession" => saw_root = true,
            b"File" => {
                let uid = required(path, "File", attrs, "uid")?;
                let full_path = required(path, "File", attrs, "fullPath")?;
                files.insert(uid.to_string(), full_path.to_string());
            }
            b"Method" => {
                method_start = points.len();
                method_file = None;
            }
            b"FileRef" => {
                // Applies to every point of the enclosing method that lacks a
                // fileid, whether it comes before or after the FileRef.
                let uid = required(path, "FileRef", attrs, "uid")?;
                for point in &mut points[method_start..] {
                    if point.file_id.is_none() {
                        point.file_id = Some(uid.to_string());
                    }
                }
                method_file = Some(uid.to_string());
            }
            b"SequencePoint" => {
                points.push(PendingPoint {
                    file_id: attrs.get("fileid").cloned().or_else(|| method_file.clone()),
                    line: required_number(path, "SequencePoint", attrs, "sl")?,
                    hits: required_number(path, "SequencePoint", attrs, "vc")?,
                });
            }
            _ => {}
        }
        Ok(())
    })?;

    if !saw_root {
        return Err(NetcovError::parse(path, "missing <CoverageSession> root element"));
    }

    for point in points {
        let file = point.file_id.as_ref().and_then(|id| files.get(id));
        if let Some(file) = file {
            add_hits(path, coverage, file, point.line, point.hits)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_opencover() {
        let input = br#"<?xml version="1.0" encoding="utf-8"?>
<CoverageSession>
  <Modules>
    <Module>
      <Files>
        <File uid="1" fullPath="C:\src\Foo.cs" />
        <File uid="2" fullPath="C:\src\Bar.cs" />
      </Files>
      <Classes><Class><Methods>
        <Method>
          <SequencePoints>
            <SequencePoint vc="1" sl="10" fileid="1" />
            <SequencePoint vc="2" sl="10" fileid="1" />
            <SequencePoint vc="0" sl="11" fileid="1" />
          </SequencePoints>
          <FileRef uid="1" />
        </Method>
        <Method>
          <SequencePoints>
            <SequencePoint vc="4" sl="3" />
          </SequencePoints>
          <FileRef uid="2" />
        </Method>
      </Methods></Class></Classes>
    </Module>
  </Modules>
</CoverageSession>"#;
        let mut coverage = Coverage::new();
        parse_opencover(Path::new("opencover.xml"), input, &mut coverage).unwrap();

        let foo = coverage.hits(r"C:\src\Foo.cs");
        assert_eq!(foo.get(&10), Some(&3));
        assert_eq!(foo.get(&11), Some(&0));
        assert_eq!(coverage.hits(r"C:\src\Bar.cs").get(&3), Some(&4));
    }

    #[test]
    fn test_point_without_file_is_skipped() {
        let input = br#"<CoverageSession><Modules><Module>
  <Method><SequencePoints><SequencePoint vc="1" sl="1" /></SequencePoints></Method>
</Module></Modules></CoverageSession>"#;
        let mut coverage = Coverage::new();
        parse_opencover(Path::new("opencover.xml"), input, &mut coverage).unwrap();
        assert!(coverage.is_empty());
    }

    #[test]
    fn test_not_opencover() {
        let input = br#"<coverage exportversion="3"></coverage>"#;
        let err = parse_opencover(Path::new("x.xml"), input, &mut Coverage::new()).unwrap_err();
        assert!(matches!(err, NetcovError::Parse { .. }));
    }

    #[test]
    fn test_malformed_xml() {
        let input = b"<CoverageSession><Modules></CoverageSession>";
        let err = parse_opencover(Path::new("broken.xml"), input, &mut Coverage::new()).unwrap_err();
        assert!(err.to_string().contains("broken.xml"), "{err}");
    }
}
