/// Parser for Visual Studio coverage XML (`.coveragexml`, as produced by
/// `CodeCoverage.exe analyze`).
///
/// Structure:
///   <results>
///     <modules>
///       <module>
///         <functions>
///           <function>
///             <ranges>
///               <range source_id="1" covered="yes|no|partial"
///                      start_line="12" end_line="14" />
///             </ranges>
///           </function>
///         </functions>
///         <source_files>
///           <source_file id="1" path="C:\src\Foo.cs" />
///         </source_files>
///       </module>
///     </modules>
///   </results>
///
/// The format only says whether a line ran, so covered lines get one hit
/// and uncovered lines get zero. Source ids are scoped to their module.
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::error::{NetcovError, Result};
use crate::model::Coverage;
use crate::parsers::{add_hits, read_report, required, required_number, visit_elements, CoverageParser};

pub struct VisualStudioParser;

/// Longest `<range>` accepted, in lines.
const MAX_RANGE_LINES: u32 = 1_000_000;

impl CoverageParser for VisualStudioParser {
    fn parse(&self, path: &Path, coverage: &mut Coverage) -> Result<()> {
        let input = read_report(path)?;
        parse_visualstudio(path, &input, coverage)
    }
}

#[derive(Default)]
struct SourceLines {
    covered: BTreeSet<u32>,
    uncovered: BTreeSet<u32>,
}

#[derive(Default)]
struct ModuleState {
    sources: HashMap<String, String>,
    lines: HashMap<String, SourceLines>,
}

impl ModuleState {
    fn flush(&mut self, path: &Path, coverage: &mut Coverage) -> Result<()> {
        for (id, lines) in self.lines.drain() {
            let Some(file) = self.sources.get(&id) else {
                continue;
            };
            for &line in lines.uncovered.difference(&lines.covered) {
                add_hits(path, coverage, file, line, 0)?;
            }
            for &line in &lines.covered {
                add_hits(path, coverage, file, line, 1)?;
            }
        }
        self.sources.clear();
        Ok(())
    }
}

fn parse_visualstudio(path: &Path, input: &[u8], coverage: &mut Coverage) -> Result<()> {
    let mut module = ModuleState::default();
    let mut saw_root = false;

    visit_elements(path, input, |name, attrs| {
        match name {
            b"results" => saw_root = true,
            b"module" => module.flush(path, coverage)?,
            b"range" => {
                let source_id = required(path, "range", attrs, "source_id")?;
                let covered = required(path, "range", attrs, "covered")?;
                let start: u32 = required_number(path, "range", attrs, "start_line")?;
                let end: u32 = required_number(path, "range", attrs, "end_line")?;
                if end < start {
                    return Err(NetcovError::parse(
                        path,
                        format!("<range> ends before it starts: lines {start}..{end}"),
                    ));
                }
                if end - start >= MAX_RANGE_LINES {
                    return Err(NetcovError::parse(
                        path,
                        format!("<range> spans more than {MAX_RANGE_LINES} lines: {start}..{end}"),
                    ));
                }
                let lines = module.lines.entry(source_id.to_string()).or_default();
                let target = match covered {
                    "yes" | "partial" => &mut lines.covered,
                    "no" => &mut lines.uncovered,
                    other => {
                        return Err(NetcovError::parse(
                            path,
                            format!("unexpected covered value '{other}' on <range>"),
                        ))
                    }
                };
                target.extend(start..=end);
            }
            b"source_file" => {
                let id = required(path, "source_file", attrs, "id")?;
                let file = required(path, "source_file", attrs, "path")?;
                module.sources.insert(id.to_string(), file.to_string());
            }
            _ => {}
        }
        Ok(())
    })?;

    if !saw_root {
        return Err(NetcovError::parse(path, "missing <results> root element"));
    }
    module.flush(path, coverage)
}
