use std::collections::HashSet;

use hl_core::{HighlightKind, Result};

use crate::inspect::{InspectionTool, ProblemsHolder, QuickFix, TextRange};
use crate::lexer::TokenKind;
use crate::source::SourceFile;

const REASSIGNMENT_OPS: &[&str] = &["=", "+=", "-=", "*=", "/=", "%="];

/// Reports `var` declarations whose binding is never reassigned.
pub struct VarCouldBeValInspection;

impl VarCouldBeValInspection {
    /// Names that appear as assignment or increment targets anywhere in the
    /// file, excluding declaration sites and member accesses.
    fn reassigned_names<'a>(file: &'a SourceFile) -> HashSet<&'a str> {
        let tokens = &file.tokens;
        let mut reassigned = HashSet::new();
        for (i, token) in tokens.iter().enumerate() {
            if token.kind != TokenKind::Op {
                continue;
            }
            let op = file.token_text(token);
            if REASSIGNMENT_OPS.contains(&op) {
                if i == 0 || tokens[i - 1].kind != TokenKind::Word {
                    continue;
                }
                let name = file.token_text(&tokens[i - 1]);
                if Self::is_declaration_or_member(file, i - 1) {
                    continue;
                }
                reassigned.insert(name);
            } else if op == "++" || op == "--" {
                // Postfix target sits before the operator, prefix after it.
                if i > 0 && tokens[i - 1].kind == TokenKind::Word
                    && !Self::is_declaration_or_member(file, i - 1)
                {
                    reassigned.insert(file.token_text(&tokens[i - 1]));
                }
                if let Some(next) = tokens.get(i + 1) {
                    if next.kind == TokenKind::Word {
                        reassigned.insert(file.token_text(next));
                    }
                }
            }
        }
        reassigned
    }

    /// True when the word at `index` is itself being declared (`var x =`,
    /// `val x =`) or is a member access target (`receiver.x =`).
    fn is_declaration_or_member(file: &SourceFile, index: usize) -> bool {
        if index == 0 {
            return false;
        }
        let prev = &file.tokens[index - 1];
        let prev_text = file.token_text(prev);
        prev_text == "var" || prev_text == "val" || prev_text == "."
    }
}

impl InspectionTool for VarCouldBeValInspection {
    fn class_name(&self) -> &'static str {
        "io.headlamp.kotlin.VarCouldBeValInspection"
    }

    fn display_name(&self) -> &'static str {
        "Variable could be immutable"
    }

    fn language(&self) -> Option<&'static str> {
        Some("kotlin")
    }

    fn check_file(&self, file: &SourceFile, holder: &mut ProblemsHolder) -> Result<()> {
        let reassigned = Self::reassigned_names(file);
        let tokens = &file.tokens;
        for (i, token) in tokens.iter().enumerate() {
            if token.kind != TokenKind::Word || file.token_text(token) != "var" {
                continue;
            }
            // `obj.var` is not a declaration keyword
            if i > 0 && file.token_text(&tokens[i - 1]) == "." {
                continue;
            }
            let Some(name_token) = tokens.get(i + 1) else { continue };
            if name_token.kind != TokenKind::Word {
                continue;
            }
            let name = file.token_text(name_token);
            if reassigned.contains(name) {
                continue;
            }
            let fix = QuickFix {
                name: "Replace 'var' with 'val'".to_string(),
                range: TextRange::new(token.start, token.end),
                target: "var".to_string(),
                replacement: "val".to_string(),
                write_action: true,
            };
            holder.register_with_fix(
                TextRange::new(name_token.start, name_token.end),
                "Variable '#ref' is never modified and can be declared with 'val' #loc",
                HighlightKind::GenericErrorOrWarning,
                fix,
            );
        }
        Ok(())
    }
}

/// Reports explicit `public` modifiers, which are the Kotlin default.
pub struct RedundantVisibilityModifierInspection;

impl InspectionTool for RedundantVisibilityModifierInspection {
    fn class_name(&self) -> &'static str {
        "io.headlamp.kotlin.RedundantVisibilityModifierInspection"
    }

    fn display_name(&self) -> &'static str {
        "Redundant visibility modifier"
    }

    fn language(&self) -> Option<&'static str> {
        Some("kotlin")
    }

    fn check_file(&self, file: &SourceFile, holder: &mut ProblemsHolder) -> Result<()> {
        for (i, token) in file.tokens.iter().enumerate() {
            if token.kind != TokenKind::Word || file.token_text(token) != "public" {
                continue;
            }
            if i > 0 && file.token_text(&file.tokens[i - 1]) == "." {
                continue;
            }
            // Strip the modifier together with the whitespace that follows it
            let mut end = token.end;
            let bytes = file.text.as_bytes();
            while end < bytes.len() && bytes[end] == b' ' {
                end += 1;
            }
            let fix = QuickFix {
                name: "Remove redundant visibility modifier".to_string(),
                range: TextRange::new(token.start, end),
                target: file.text[token.start..end].to_string(),
                replacement: String::new(),
                write_action: true,
            };
            holder.register_with_fix(
                TextRange::new(token.start, token.end),
                "Redundant visibility modifier #loc",
                HighlightKind::LikeUnusedSymbol,
                fix,
            );
        }
        Ok(())
    }
}
