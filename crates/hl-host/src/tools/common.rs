use hl_core::{HighlightKind, ProblemLevel, Result};

use crate::inspect::{InspectionTool, ProblemsHolder, TextRange};
use crate::lexer;
use crate::source::SourceFile;

/// Reports `TODO` markers left in comments. The tool itself downgrades its
/// findings to weak warnings, whatever the configured level asks for.
pub struct TodoCommentInspection;

impl InspectionTool for TodoCommentInspection {
    fn class_name(&self) -> &'static str {
        "io.headlamp.common.TodoCommentInspection"
    }

    fn display_name(&self) -> &'static str {
        "TODO comment"
    }

    fn default_level(&self) -> ProblemLevel {
        ProblemLevel::WeakWarning
    }

    fn check_file(&self, file: &SourceFile, holder: &mut ProblemsHolder) -> Result<()> {
        for (start, end) in lexer::comment_spans(&file.text) {
            let comment = &file.text[start..end];
            let mut from = 0;
            while let Some(pos) = comment[from..].find("TODO") {
                let at = from + pos;
                let before_ok = at == 0
                    || !comment.as_bytes()[at - 1].is_ascii_alphanumeric();
                let after = at + 4;
                let after_ok = after >= comment.len()
                    || !comment.as_bytes()[after].is_ascii_alphanumeric();
                if before_ok && after_ok {
                    holder.register(
                        TextRange::new(start + at, start + after),
                        "TODO comment left in code #loc",
                        HighlightKind::WeakWarning,
                    );
                }
                from = after;
            }
        }
        Ok(())
    }
}

pub const MAX_LINE_LENGTH: usize = 120;

/// Reports lines longer than [`MAX_LINE_LENGTH`] characters.
pub struct LineLengthInspection;

impl InspectionTool for LineLengthInspection {
    fn class_name(&self) -> &'static str {
        "io.headlamp.common.LineLengthInspection"
    }

    fn display_name(&self) -> &'static str {
        "Line longer than allowed"
    }

    fn check_file(&self, file: &SourceFile, holder: &mut ProblemsHolder) -> Result<()> {
        let mut offset = 0;
        for line in file.text.split_inclusive('\n') {
            let content = line.trim_end_matches(['\r', '\n']);
            let length = content.chars().count();
            if length > MAX_LINE_LENGTH {
                let excess_start = content
                    .char_indices()
                    .nth(MAX_LINE_LENGTH)
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                holder.register(
                    TextRange::new(offset + excess_start, offset + content.len()),
                    format!("Line is longer than {MAX_LINE_LENGTH} characters ({length})"),
                    HighlightKind::GenericErrorOrWarning,
                );
            }
            offset += line.len();
        }
        Ok(())
    }
}

/// Whole-project duplicate analysis needs cross-file state the runner does
/// not provide; registered as an unsupported global tool so configuring it
/// produces a warning, not findings.
pub struct DuplicateCodeInspection;

impl InspectionTool for DuplicateCodeInspection {
    fn class_name(&self) -> &'static str {
        "io.headlamp.common.DuplicateCodeInspection"
    }

    fn display_name(&self) -> &'static str {
        "Duplicated code fragment"
    }

    fn check_file(&self, _file: &SourceFile, _holder: &mut ProblemsHolder) -> Result<()> {
        Ok(())
    }
}
