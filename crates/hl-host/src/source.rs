use std::path::{Path, PathBuf};
use tree_sitter::Parser;

use hl_core::{Error, Result};

use crate::document::LineIndex;
use crate::lexer::{self, Token};

/// Language of a file under analysis, decided once from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Kotlin,
    Java,
    Plain,
}

impl Language {
    pub fn of_path(path: &Path) -> Language {
        match path.extension().and_then(|e| e.to_str()) {
            Some("kt") | Some("kts") => Language::Kotlin,
            Some("java") => Language::Java,
            _ => Language::Plain,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Kotlin => "Kotlin",
            Self::Java => "Java",
            Self::Plain => "Plain text",
        }
    }
}

/// A tool declaring `language` runs on a file only when the file's language
/// accepts it. Language-agnostic tools (`None`) run everywhere; `"UAST"`
/// tools run on both Kotlin and Java.
pub fn language_applicable(tool_language: Option<&str>, file_language: Language) -> bool {
    match file_language {
        Language::Kotlin => matches!(tool_language, None | Some("kotlin") | Some("UAST")),
        Language::Java => matches!(tool_language, None | Some("java") | Some("UAST")),
        Language::Plain => true,
    }
}

/// Read-only view of one file, handed to inspection visitors.
pub struct SourceFile {
    pub path: PathBuf,
    pub rel_path: String,
    pub language: Language,
    pub text: String,
    pub index: LineIndex,
    pub tokens: Vec<Token>,
    /// Syntax tree, present for languages with a grammar (currently Java).
    pub tree: Option<tree_sitter::Tree>,
}

impl SourceFile {
    pub fn parse(path: &Path, rel_path: String, text: String) -> Result<SourceFile> {
        let language = Language::of_path(path);
        let tree = match language {
            Language::Java => Some(parse_java(&text)?),
            _ => None,
        };
        let index = LineIndex::new(&text);
        let tokens = lexer::tokenize(&text);
        Ok(SourceFile {
            path: path.to_path_buf(),
            rel_path,
            language,
            text,
            index,
            tokens,
            tree,
        })
    }

    pub fn token_text(&self, token: &Token) -> &str {
        token.text(&self.text)
    }
}

fn parse_java(text: &str) -> Result<tree_sitter::Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| Error::Internal(format!("failed to load Java grammar: {e}")))?;
    parser
        .parse(text, None)
        .ok_or_else(|| Error::Internal("tree-sitter parse returned None".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_detection() {
        assert_eq!(Language::of_path(Path::new("Main.kt")), Language::Kotlin);
        assert_eq!(Language::of_path(Path::new("build.kts")), Language::Kotlin);
        assert_eq!(Language::of_path(Path::new("Main.java")), Language::Java);
        assert_eq!(Language::of_path(Path::new("notes.txt")), Language::Plain);
        assert_eq!(Language::of_path(Path::new("README")), Language::Plain);
    }

    #[test]
    fn applicability_sets() {
        assert!(language_applicable(None, Language::Kotlin));
        assert!(language_applicable(Some("kotlin"), Language::Kotlin));
        assert!(language_applicable(Some("UAST"), Language::Kotlin));
        assert!(!language_applicable(Some("java"), Language::Kotlin));

        assert!(language_applicable(None, Language::Java));
        assert!(language_applicable(Some("java"), Language::Java));
        assert!(language_applicable(Some("UAST"), Language::Java));
        assert!(!language_applicable(Some("kotlin"), Language::Java));

        assert!(language_applicable(Some("kotlin"), Language::Plain));
        assert!(language_applicable(Some("java"), Language::Plain));
    }

    #[test]
    fn java_files_get_a_tree() {
        let text = "class A { void f() {} }".to_string();
        let file = SourceFile::parse(Path::new("A.java"), "A.java".into(), text).unwrap();
        let tree = file.tree.as_ref().unwrap();
        assert_eq!(tree.root_node().kind(), "program");
    }

    #[test]
    fn kotlin_files_get_tokens_only() {
        let text = "var x = 1\n".to_string();
        let file = SourceFile::parse(Path::new("a.kt"), "a.kt".into(), text).unwrap();
        assert!(file.tree.is_none());
        assert_eq!(file.tokens.len(), 4);
        assert_eq!(file.token_text(&file.tokens[0]), "var");
    }
}
