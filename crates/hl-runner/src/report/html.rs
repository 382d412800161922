use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use hl_core::{HighlightKind, ProblemLevel};

use crate::problems::PinnedProblem;

use super::{escape, ReportGenerator};

const STYLE: &str = "\
error { background-color: red; }\n\
warning { background-color: yellow; }\n\
info { text-decoration-style: wavy; text-decoration: underline; }\n\
unused { background-color: lightgray; }\n";

/// Human-readable report: per problem, its location, a code excerpt with the
/// finding highlighted, and the rendered description.
pub struct HtmlReport {
    target: PathBuf,
    body: String,
}

impl HtmlReport {
    pub fn new(target: PathBuf) -> Self {
        Self { target, body: String::new() }
    }

    fn problem_tag(problem: &PinnedProblem) -> &'static str {
        match problem.highlight {
            HighlightKind::LikeUnusedSymbol => "unused",
            _ => match problem.level {
                ProblemLevel::Error => "error",
                ProblemLevel::Warning => "warning",
                ProblemLevel::WeakWarning | ProblemLevel::Info => "info",
            },
        }
    }

    fn excerpt(problem: &PinnedProblem) -> String {
        let tag = Self::problem_tag(problem);
        let mut out = String::from("<pre>\n");
        for (line_no, text) in &problem.context {
            if *line_no == problem.line {
                let row = (problem.row as usize).min(text.len());
                let end = (row + problem.span_len.max(1)).min(text.len());
                out.push_str(&escape(&text[..row]));
                out.push_str(&format!("<{tag}>{}</{tag}>", escape(&text[row..end])));
                out.push_str(&escape(&text[end..]));
            } else {
                out.push_str(&escape(text));
            }
            out.push('\n');
        }
        out.push_str("</pre>\n");
        out
    }
}

impl ReportGenerator for HtmlReport {
    fn report(&mut self, problem: &PinnedProblem, _inspection_class: &str) {
        self.body.push_str(&format!(
            "<p>In file <b>{}</b>:</p>\n",
            escape(&problem.render_location())
        ));
        self.body.push_str(&Self::excerpt(problem));
        self.body.push_str(&format!(
            "<p><i>{}</i></p>\n",
            escape(problem.render_description())
        ));
    }

    fn generate(&mut self) -> anyhow::Result<()> {
        let document = format!(
            "<html>\n<head>\n<style>\n{STYLE}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
            self.body
        );
        fs::write(&self.target, document)
            .with_context(|| format!("cannot write HTML report to {}", self.target.display()))?;
        Ok(())
    }
}
