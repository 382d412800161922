use hl_core::{HighlightKind, Result};
use tree_sitter::Node;

use crate::inspect::{InspectionTool, ProblemsHolder, TextRange};
use crate::source::SourceFile;

/// Reports `catch` clauses whose body contains no statements.
pub struct EmptyCatchBlockInspection;

impl EmptyCatchBlockInspection {
    fn visit(node: Node, holder: &mut ProblemsHolder) {
        if node.kind() == "catch_clause" {
            if let Some(body) = node.child_by_field_name("body") {
                if body.named_child_count() == 0 {
                    holder.register(
                        TextRange::new(body.start_byte(), body.end_byte()),
                        "Empty 'catch' block #loc",
                        HighlightKind::GenericErrorOrWarning,
                    );
                }
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            Self::visit(child, holder);
        }
    }
}

impl InspectionTool for EmptyCatchBlockInspection {
    fn class_name(&self) -> &'static str {
        "io.headlamp.java.EmptyCatchBlockInspection"
    }

    fn display_name(&self) -> &'static str {
        "Empty 'catch' block"
    }

    fn language(&self) -> Option<&'static str> {
        Some("java")
    }

    fn check_file(&self, file: &SourceFile, holder: &mut ProblemsHolder) -> Result<()> {
        if let Some(tree) = &file.tree {
            Self::visit(tree.root_node(), holder);
        }
        Ok(())
    }
}
