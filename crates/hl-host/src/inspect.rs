use std::sync::Arc;

use hl_core::{HighlightKind, ProblemLevel, Result};

use crate::source::SourceFile;

/// Byte range of a finding inside its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// An automated code transformation attached to one finding.
///
/// `target` is the text the range covered when the fix was produced; applying
/// the fix first verifies the document still matches, so a fix invalidated by
/// an earlier edit is skipped instead of corrupting the file.
#[derive(Debug, Clone)]
pub struct QuickFix {
    pub name: String,
    pub range: TextRange,
    pub target: String,
    pub replacement: String,
    /// Whether the fix must run inside a write action.
    pub write_action: bool,
}

/// One raw finding as emitted by a tool visitor, before severity resolution.
#[derive(Debug, Clone)]
pub struct RawProblem {
    pub range: TextRange,
    /// May contain `#ref` (replaced by the highlighted text) and a trailing
    /// `" #loc"` marker (stripped) when rendered.
    pub message: String,
    pub highlight: HighlightKind,
    pub fixes: Vec<QuickFix>,
}

/// Collects the findings of one tool over one file.
pub struct ProblemsHolder<'a> {
    file: &'a SourceFile,
    results: Vec<RawProblem>,
}

impl<'a> ProblemsHolder<'a> {
    pub fn new(file: &'a SourceFile) -> Self {
        Self { file, results: Vec::new() }
    }

    pub fn file(&self) -> &SourceFile {
        self.file
    }

    pub fn register(&mut self, range: TextRange, message: impl Into<String>, highlight: HighlightKind) {
        self.results.push(RawProblem {
            range,
            message: message.into(),
            highlight,
            fixes: Vec::new(),
        });
    }

    pub fn register_with_fix(
        &mut self,
        range: TextRange,
        message: impl Into<String>,
        highlight: HighlightKind,
        fix: QuickFix,
    ) {
        self.results.push(RawProblem {
            range,
            message: message.into(),
            highlight,
            fixes: vec![fix],
        });
    }

    pub fn into_results(self) -> Vec<RawProblem> {
        self.results
    }
}

/// A pluggable analysis rule visiting one file at a time.
///
/// Tools are supplied by the host platform and its plugins; the analysis
/// engine only schedules them.
pub trait InspectionTool: Send + Sync {
    /// Fully-qualified class name, e.g. `io.headlamp.kotlin.VarCouldBeValInspection`.
    fn class_name(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    /// Language this tool applies to; `None` means language-agnostic.
    fn language(&self) -> Option<&'static str> {
        None
    }

    /// Level the host's own default profile assigns to this tool.
    fn default_level(&self) -> ProblemLevel {
        ProblemLevel::Warning
    }

    fn check_file(&self, file: &SourceFile, holder: &mut ProblemsHolder) -> Result<()>;
}

/// How a tool executes, decided once at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolScope {
    /// Per-file tool; the normal case.
    Local,
    /// Whole-project tool that still analyzes file by file.
    GlobalSimple,
    /// Genuinely global tool; skipped with a warning, never executed.
    UnsupportedGlobal,
}

#[derive(Clone)]
pub struct RegisteredTool {
    pub scope: ToolScope,
    pub tool: Arc<dyn InspectionTool>,
}

impl RegisteredTool {
    pub fn class_name(&self) -> &'static str {
        self.tool.class_name()
    }

    /// Trailing segment of the fully-qualified class name.
    pub fn short_class_name(&self) -> &'static str {
        self.tool
            .class_name()
            .rsplit('.')
            .next()
            .unwrap_or_else(|| self.tool.class_name())
    }
}

/// The host's registrar of inspection tools.
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn empty() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registry with the platform's bundled tool set, the way the host ships
    /// its own inspections.
    pub fn create_tools() -> Self {
        let mut registry = Self::empty();
        crate::tools::register_bundled(&mut registry);
        registry
    }

    pub fn register(&mut self, scope: ToolScope, tool: Arc<dyn InspectionTool>) {
        self.tools.push(RegisteredTool { scope, tool });
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredTool> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Find a tool by configured name. Tries, in order: the fully-qualified
    /// class name, the short name with an `Inspection` suffix appended, the
    /// bare trailing class-name segment, and the display name.
    pub fn find(&self, name: &str) -> Option<&RegisteredTool> {
        let with_suffix = format!("{name}Inspection");
        self.tools
            .iter()
            .find(|t| t.class_name() == name)
            .or_else(|| self.tools.iter().find(|t| t.short_class_name() == with_suffix))
            .or_else(|| self.tools.iter().find(|t| t.short_class_name() == name))
            .or_else(|| self.tools.iter().find(|t| t.tool.display_name() == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_registry_resolves_all_name_forms() {
        let registry = ToolRegistry::create_tools();
        assert!(!registry.is_empty());

        let by_short = registry.find("VarCouldBeVal").unwrap();
        let by_class = registry.find("VarCouldBeValInspection").unwrap();
        let by_fq = registry.find(by_short.class_name()).unwrap();
        let by_display = registry.find(by_short.tool.display_name()).unwrap();

        for tool in [&by_class, &by_fq, &by_display] {
            assert_eq!(tool.class_name(), by_short.class_name());
        }
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        let registry = ToolRegistry::create_tools();
        assert!(registry.find("NoSuchInspection").is_none());
    }
}
