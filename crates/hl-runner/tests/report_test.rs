use std::fs;
use std::path::Path;

use hl_core::{HighlightKind, ProblemLevel};
use hl_host::{RawProblem, SourceFile, TextRange};
use hl_runner::problems::PinnedProblem;
use hl_runner::report::{sorted_for_report, HtmlReport, ReportGenerator, XmlReport};

fn file(name: &str, text: &str) -> SourceFile {
    SourceFile::parse(Path::new(name), name.to_string(), text.to_string()).unwrap()
}

fn pin(
    source: &SourceFile,
    offset: usize,
    len: usize,
    message: &str,
    highlight: HighlightKind,
    configured: ProblemLevel,
) -> PinnedProblem {
    let raw = RawProblem {
        range: TextRange::new(offset, offset + len),
        message: message.to_string(),
        highlight,
        fixes: Vec::new(),
    };
    PinnedProblem::create_if_problem(&raw, source, "Sample tool", Some(configured)).unwrap()
}

#[test]
fn problems_sort_by_line_and_group_by_file() {
    let alpha = file("alpha.kt", "one\ntwo\nthree\nfour\n");
    let beta = file("beta.kt", "one\ntwo\nthree\nfour\n");

    // alpha gets problems on lines 4 and 2; beta on lines 3 and 1.
    let results = vec![
        (
            "ToolA".to_string(),
            vec![
                pin(&alpha, 14, 4, "alpha late", HighlightKind::GenericErrorOrWarning, ProblemLevel::Warning),
                pin(&alpha, 4, 3, "alpha early", HighlightKind::GenericErrorOrWarning, ProblemLevel::Warning),
            ],
        ),
        (
            "ToolB".to_string(),
            vec![
                pin(&beta, 8, 5, "beta late", HighlightKind::GenericErrorOrWarning, ProblemLevel::Warning),
                pin(&beta, 0, 3, "beta early", HighlightKind::GenericErrorOrWarning, ProblemLevel::Warning),
            ],
        ),
    ];

    let sorted = sorted_for_report(&results);
    let rendered: Vec<String> = sorted
        .iter()
        .map(|(_, p)| p.render_description().to_string())
        .collect();

    // beta's first problem is on line 1, so the beta group comes first, each
    // group ordered by line.
    assert_eq!(rendered, ["beta early", "beta late", "alpha early", "alpha late"]);
}

#[test]
fn same_line_problems_sort_by_row() {
    let source = file("same.kt", "aaa bbb ccc\n");
    let results = vec![(
        "Tool".to_string(),
        vec![
            pin(&source, 8, 3, "third", HighlightKind::GenericErrorOrWarning, ProblemLevel::Info),
            pin(&source, 0, 3, "first", HighlightKind::GenericErrorOrWarning, ProblemLevel::Info),
            pin(&source, 4, 3, "second", HighlightKind::GenericErrorOrWarning, ProblemLevel::Info),
        ],
    )];
    let sorted = sorted_for_report(&results);
    let rendered: Vec<&str> = sorted.iter().map(|(_, p)| p.render_description()).collect();
    assert_eq!(rendered, ["first", "second", "third"]);
}

#[test]
fn xml_report_buckets_by_severity() {
    let source = file("src/app.kt", "var x = 1\nval y = 2\nval z = 3\n");
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("report.xml");

    let mut xml = XmlReport::new(target.clone());
    xml.report(
        &pin(&source, 0, 3, "an error #loc", HighlightKind::GenericErrorOrWarning, ProblemLevel::Error),
        "io.example.ErrorInspection",
    );
    xml.report(
        &pin(&source, 10, 3, "a warning", HighlightKind::GenericErrorOrWarning, ProblemLevel::Warning),
        "io.example.WarnInspection",
    );
    xml.report(
        &pin(&source, 10, 3, "a weak one", HighlightKind::WeakWarning, ProblemLevel::Error),
        "io.example.WeakInspection",
    );
    xml.report(
        &pin(&source, 20, 3, "a note", HighlightKind::GenericErrorOrWarning, ProblemLevel::Info),
        "io.example.InfoInspection",
    );
    xml.generate().unwrap();

    let report = fs::read_to_string(&target).unwrap();

    let errors = section(&report, "errors");
    let warnings = section(&report, "warnings");
    let infos = section(&report, "infos");

    assert_eq!(errors.matches("<problem>").count(), 1);
    assert!(errors.contains("severity=\"ERROR\""));
    assert!(errors.contains("io.example.ErrorInspection"));
    // The #loc marker never reaches the report.
    assert!(!errors.contains("#loc"));

    // Weak warnings live in the warnings bucket under their own name.
    assert_eq!(warnings.matches("<problem>").count(), 2);
    assert!(warnings.contains("severity=\"WEAK_WARNING\""));

    assert_eq!(infos.matches("<problem>").count(), 1);
    assert!(infos.contains("src/app.kt:3:1: a note"));
}

#[test]
fn xml_escapes_special_characters() {
    let source = file("weird.kt", "val x = 1 // a < b && c > d\n");
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("report.xml");

    let mut xml = XmlReport::new(target.clone());
    xml.report(
        &pin(&source, 0, 3, "comparison a < b && \"quoted\"", HighlightKind::GenericErrorOrWarning, ProblemLevel::Warning),
        "io.example.Tool",
    );
    xml.generate().unwrap();

    let report = fs::read_to_string(&target).unwrap();
    assert!(report.contains("&lt;"));
    assert!(report.contains("&amp;"));
    assert!(!report.contains("a < b &&"));
}

#[test]
fn html_report_highlights_the_problem_span() {
    let source = file(
        "src/app.kt",
        "fun main() {\n    var count = 1\n    println(count)\n}\n",
    );
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("report.html");

    let offset = source.text.find("count").unwrap();
    let mut html = HtmlReport::new(target.clone());
    html.report(
        &pin(&source, offset, 5, "could be immutable", HighlightKind::GenericErrorOrWarning, ProblemLevel::Warning),
        "io.example.Tool",
    );
    html.report(
        &pin(&source, offset, 5, "unused looking", HighlightKind::LikeUnusedSymbol, ProblemLevel::Warning),
        "io.example.Tool",
    );
    html.generate().unwrap();

    let report = fs::read_to_string(&target).unwrap();
    assert!(report.contains("In file <b>src/app.kt:2:9</b>"));
    assert!(report.contains("<warning>count</warning>"));
    // Unused-symbol highlighting gets its own style, not the severity one.
    assert!(report.contains("<unused>count</unused>"));
    assert!(report.contains("<i>could be immutable</i>"));
    assert!(report.contains("<style>"));
}

fn section<'a>(report: &'a str, tag: &str) -> &'a str {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = report.find(&open).unwrap() + open.len();
    let end = report.find(&close).unwrap();
    &report[start..end]
}
