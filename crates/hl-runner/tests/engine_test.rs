mod common;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serial_test::serial;

use hl_core::{HighlightKind, ProblemLevel, Result};
use hl_host::{
    app, HostConfig, HostHandle, InspectionTool, ProblemsHolder, RegisteredTool, SourceFile,
    TextRange, ToolScope,
};
use hl_runner::engine::{self, InspectionChecker};
use hl_runner::ResolvedTool;

use common::{set_of, shared_home, shared_system_dir, RequestBuilder, WireCapture};

/// Emits one warning per line of the file and records which files it saw.
struct CountingTool {
    visited: Arc<Mutex<Vec<String>>>,
}

impl InspectionTool for CountingTool {
    fn class_name(&self) -> &'static str {
        "test.CountingInspection"
    }

    fn display_name(&self) -> &'static str {
        "Counting"
    }

    fn check_file(&self, file: &SourceFile, holder: &mut ProblemsHolder) -> Result<()> {
        self.visited.lock().unwrap().push(file.rel_path.clone());
        let mut offset = 0;
        for line in file.text.split_inclusive('\n') {
            holder.register(
                TextRange::new(offset, offset + 1),
                "counted #loc",
                HighlightKind::GenericErrorOrWarning,
            );
            offset += line.len();
        }
        Ok(())
    }
}

/// Always fails on files whose name contains "bad".
struct FaultyTool;

impl InspectionTool for FaultyTool {
    fn class_name(&self) -> &'static str {
        "test.FaultyInspection"
    }

    fn display_name(&self) -> &'static str {
        "Faulty"
    }

    fn check_file(&self, file: &SourceFile, holder: &mut ProblemsHolder) -> Result<()> {
        if file.rel_path.contains("bad") {
            panic!("tool blew up");
        }
        holder.register(
            TextRange::new(0, 1),
            "fine #loc",
            HighlightKind::GenericErrorOrWarning,
        );
        Ok(())
    }
}

fn test_handle() -> HostHandle {
    app::boot(&HostConfig {
        version: "243.1".to_string(),
        home_dir: shared_home(),
        system_dir: shared_system_dir(),
        plugin_dirs: Vec::new(),
        test_mode: true,
    })
    .unwrap()
}

fn resolved(
    scope: ToolScope,
    tool: Arc<dyn InspectionTool>,
    level: ProblemLevel,
) -> ResolvedTool {
    let name = tool.display_name().to_string();
    ResolvedTool {
        registered: RegisteredTool { scope, tool },
        name,
        level: Some(level),
        quick_fix: false,
    }
}

fn parse_files(texts: &[(&str, &str)]) -> Vec<SourceFile> {
    texts
        .iter()
        .map(|(name, text)| {
            SourceFile::parse(Path::new(name), (*name).to_string(), (*text).to_string()).unwrap()
        })
        .collect()
}

#[test]
#[serial]
fn threshold_breach_aborts_remaining_files() {
    let handle = test_handle();
    let capture = WireCapture::default();
    let logger = capture.logger();

    let visited = Arc::new(Mutex::new(Vec::new()));
    let tools = vec![resolved(
        ToolScope::Local,
        Arc::new(CountingTool { visited: visited.clone() }),
        ProblemLevel::Warning,
    )];
    // Three findings in the first file, threshold of two warnings.
    let files = parse_files(&[("first.txt", "a\nb\nc\n"), ("second.txt", "d\ne\n")]);

    let request = {
        let mut builder = RequestBuilder::new(std::env::temp_dir());
        builder.warnings = set_of(&[("Counting", false)], Some(2));
        builder.build()
    };
    let mut checker = InspectionChecker::new(request.plan().clone());
    let results = engine::analyze(&handle, &files, &tools, &mut checker, &logger);

    assert!(checker.is_fail());
    assert!(capture.contains("Too many warnings found: 3. Analysis stopped"));
    // The second file was never analyzed.
    assert_eq!(visited.lock().unwrap().as_slice(), ["first.txt"]);
    // The breaching problem is still collected for reporting.
    assert_eq!(results[0].1.len(), 3);

    handle.shutdown();
}

#[test]
#[serial]
fn exact_threshold_is_not_a_breach() {
    let handle = test_handle();
    let capture = WireCapture::default();
    let logger = capture.logger();

    let visited = Arc::new(Mutex::new(Vec::new()));
    let tools = vec![resolved(
        ToolScope::Local,
        Arc::new(CountingTool { visited: visited.clone() }),
        ProblemLevel::Warning,
    )];
    let files = parse_files(&[("first.txt", "a\nb\n"), ("second.txt", "c\n")]);

    let request = {
        let mut builder = RequestBuilder::new(std::env::temp_dir());
        builder.warnings = set_of(&[("Counting", false)], Some(3));
        builder.build()
    };
    let mut checker = InspectionChecker::new(request.plan().clone());
    engine::analyze(&handle, &files, &tools, &mut checker, &logger);

    assert!(checker.is_success());
    assert_eq!(checker.counts().1, 3);
    assert_eq!(visited.lock().unwrap().len(), 2);

    handle.shutdown();
}

#[test]
#[serial]
fn tool_failure_on_one_file_skips_only_that_pair() {
    let handle = test_handle();
    let capture = WireCapture::default();
    let logger = capture.logger();

    let tools = vec![resolved(
        ToolScope::Local,
        Arc::new(FaultyTool),
        ProblemLevel::Warning,
    )];
    let files = parse_files(&[
        ("good_one.txt", "x\n"),
        ("bad_one.txt", "x\n"),
        ("good_two.txt", "x\n"),
    ]);

    let request = RequestBuilder::new(std::env::temp_dir()).build();
    let mut checker = InspectionChecker::new(request.plan().clone());
    let results = engine::analyze(&handle, &files, &tools, &mut checker, &logger);

    // Both good files produced findings; the bad pair was logged and skipped.
    assert_eq!(results[0].1.len(), 2);
    assert!(checker.is_success());
    assert!(capture.contains("Exception during test.FaultyInspection analysis of bad_one.txt"));

    handle.shutdown();
}

#[test]
#[serial]
fn unsupported_global_tools_warn_and_produce_nothing() {
    let handle = test_handle();
    let capture = WireCapture::default();
    let logger = capture.logger();

    let visited = Arc::new(Mutex::new(Vec::new()));
    let tools = vec![resolved(
        ToolScope::UnsupportedGlobal,
        Arc::new(CountingTool { visited: visited.clone() }),
        ProblemLevel::Warning,
    )];
    let files = parse_files(&[("first.txt", "a\n")]);

    let request = RequestBuilder::new(std::env::temp_dir()).build();
    let mut checker = InspectionChecker::new(request.plan().clone());
    let results = engine::analyze(&handle, &files, &tools, &mut checker, &logger);

    assert!(results.is_empty());
    assert!(checker.is_success());
    assert!(visited.lock().unwrap().is_empty());
    assert!(capture.contains("Global inspection tool 'test.CountingInspection' is unsupported"));

    handle.shutdown();
}

#[test]
#[serial]
fn language_gating_skips_foreign_tools() {
    let handle = test_handle();
    let capture = WireCapture::default();
    let logger = capture.logger();

    struct JavaOnlyTool(Arc<AtomicUsize>);
    impl InspectionTool for JavaOnlyTool {
        fn class_name(&self) -> &'static str {
            "test.JavaOnlyInspection"
        }
        fn display_name(&self) -> &'static str {
            "JavaOnly"
        }
        fn language(&self) -> Option<&'static str> {
            Some("java")
        }
        fn check_file(&self, _file: &SourceFile, _holder: &mut ProblemsHolder) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let tools = vec![resolved(
        ToolScope::Local,
        Arc::new(JavaOnlyTool(calls.clone())),
        ProblemLevel::Warning,
    )];
    // A Kotlin file must never reach a java-only tool; a plain file does.
    let files = parse_files(&[("main.kt", "val a = 1\n"), ("notes.txt", "x\n")]);

    let request = RequestBuilder::new(std::env::temp_dir()).build();
    let mut checker = InspectionChecker::new(request.plan().clone());
    engine::analyze(&handle, &files, &tools, &mut checker, &logger);

    assert_eq!(calls.load(Ordering::SeqCst), 1);

    handle.shutdown();
}
