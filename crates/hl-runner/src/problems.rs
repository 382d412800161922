use std::path::PathBuf;

use hl_core::{effective_level, HighlightKind, ProblemLevel};
use hl_host::{QuickFix, RawProblem, SourceFile};

/// Lines of context kept around a problem for the HTML report.
const CONTEXT_LINES: u32 = 2;

/// A located, classified problem. Created once per surviving finding and
/// immutable afterwards; consumed by reporting and quick-fix application.
#[derive(Debug, Clone)]
pub struct PinnedProblem {
    /// Absolute path, used when applying fixes.
    pub file_path: PathBuf,
    /// Project-relative path, used in every rendered surface.
    pub file_name: String,
    /// 0-based; rendered 1-based.
    pub line: u32,
    /// 0-based column; rendered 1-based.
    pub row: u32,
    pub display_name: String,
    pub level: ProblemLevel,
    pub highlight: HighlightKind,
    description: String,
    pub fixes: Vec<QuickFix>,
    /// `(line number, text)` pairs around the problem line.
    pub context: Vec<(u32, String)>,
    /// Length of the highlighted span inside the problem line.
    pub span_len: usize,
}

impl PinnedProblem {
    /// Classify and pin one raw finding. Returns `None` when the effective
    /// severity resolves to "drop" — such findings are never counted nor
    /// reported.
    pub fn create_if_problem(
        raw: &RawProblem,
        file: &SourceFile,
        display_name: &str,
        configured: Option<ProblemLevel>,
    ) -> Option<PinnedProblem> {
        let level = effective_level(raw.highlight, configured)?;
        let (line, row) = file.index.line_col(raw.range.start);
        let highlighted = file.text.get(raw.range.start..raw.range.end).unwrap_or("");
        let description = raw
            .message
            .replace("#ref", highlighted)
            .replace(" #loc", "");

        let first = line.saturating_sub(CONTEXT_LINES);
        let context = file
            .text
            .lines()
            .enumerate()
            .skip(first as usize)
            .take((CONTEXT_LINES * 2 + 1) as usize)
            .map(|(n, text)| (n as u32, text.to_string()))
            .collect();

        Some(PinnedProblem {
            file_path: file.path.clone(),
            file_name: file.rel_path.clone(),
            line,
            row,
            display_name: display_name.to_string(),
            level,
            highlight: raw.highlight,
            description,
            fixes: raw.fixes.clone(),
            context,
            span_len: highlighted.len(),
        })
    }

    pub fn render_location(&self) -> String {
        format!("{}:{}:{}", self.file_name, self.line + 1, self.row + 1)
    }

    pub fn render_description(&self) -> &str {
        &self.description
    }

    pub fn render(&self) -> String {
        format!("{}: {}", self.render_location(), self.render_description())
    }

    /// Report ordering key: problems sort by line, then column.
    pub fn sort_key(&self) -> u64 {
        ((self.line as u64) << 16) + self.row as u64
    }
}
