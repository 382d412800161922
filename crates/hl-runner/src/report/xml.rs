use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use hl_core::ProblemLevel;

use crate::problems::PinnedProblem;

use super::ReportGenerator;

struct XmlProblem {
    file: String,
    line: u32,
    row: u32,
    java_class: String,
    severity: &'static str,
    display_name: String,
    description: String,
}

/// XML report: `<report>` with `<errors>`, `<warnings>`, `<infos>` buckets of
/// `<problem>` elements; line and row render 1-based.
pub struct XmlReport {
    target: PathBuf,
    errors: Vec<XmlProblem>,
    warnings: Vec<XmlProblem>,
    infos: Vec<XmlProblem>,
}

impl XmlReport {
    pub fn new(target: PathBuf) -> Self {
        Self { target, errors: Vec::new(), warnings: Vec::new(), infos: Vec::new() }
    }
}

impl ReportGenerator for XmlReport {
    fn report(&mut self, problem: &PinnedProblem, inspection_class: &str) {
        let entry = XmlProblem {
            file: problem.file_name.clone(),
            line: problem.line + 1,
            row: problem.row + 1,
            java_class: inspection_class.to_string(),
            severity: problem.level.as_str(),
            display_name: problem.display_name.clone(),
            description: problem.render(),
        };
        match problem.level {
            ProblemLevel::Error => self.errors.push(entry),
            ProblemLevel::Warning | ProblemLevel::WeakWarning => self.warnings.push(entry),
            ProblemLevel::Info => self.infos.push(entry),
        }
    }

    fn generate(&mut self) -> anyhow::Result<()> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Start(BytesStart::new("report")))?;
        for (bucket, problems) in [
            ("errors", &self.errors),
            ("warnings", &self.warnings),
            ("infos", &self.infos),
        ] {
            writer.write_event(Event::Start(BytesStart::new(bucket)))?;
            for problem in problems.iter() {
                writer.write_event(Event::Start(BytesStart::new("problem")))?;

                simple_element(&mut writer, "file", &problem.file)?;
                simple_element(&mut writer, "line", &problem.line.to_string())?;
                simple_element(&mut writer, "row", &problem.row.to_string())?;
                simple_element(&mut writer, "java_class", &problem.java_class)?;

                let mut problem_class = BytesStart::new("problem_class");
                problem_class.push_attribute(("severity", problem.severity));
                writer.write_event(Event::Start(problem_class))?;
                writer.write_event(Event::Text(BytesText::new(&problem.display_name)))?;
                writer.write_event(Event::End(BytesEnd::new("problem_class")))?;

                simple_element(&mut writer, "description", &problem.description)?;

                writer.write_event(Event::End(BytesEnd::new("problem")))?;
            }
            writer.write_event(Event::End(BytesEnd::new(bucket)))?;
        }
        writer.write_event(Event::End(BytesEnd::new("report")))?;

        let bytes = writer.into_inner();
        fs::write(&self.target, bytes)
            .with_context(|| format!("cannot write XML report to {}", self.target.display()))?;
        Ok(())
    }
}

fn simple_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> anyhow::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
