use std::path::PathBuf;
use std::sync::Arc;

use hl_core::InspectionPlan;
use hl_host::{HeadlessApplication, HostHandle, QuickFix};

use crate::logger::ProxyLogger;
use crate::problems::PinnedProblem;
use crate::resolver::ResolvedTool;

/// One fix scheduled for application.
#[derive(Clone)]
struct PlannedFix {
    path: PathBuf,
    fix: QuickFix,
    rendered: String,
}

/// Replay the selected quick-fixes and flush the touched documents once.
///
/// A problem must carry exactly one fix, otherwise it is logged and skipped —
/// the applicator never guesses between alternatives. Fixes declaring a write
/// action run inside one shared write action; the rest go through
/// invoke-and-wait on the dispatch thread. Returns `false` when any fix could
/// not be applied.
pub fn apply_quick_fixes(
    handle: &HostHandle,
    plan: &InspectionPlan,
    results: &[(String, Vec<PinnedProblem>)],
    tools: &[ResolvedTool],
    logger: &ProxyLogger,
) -> bool {
    if !plan.quick_fix_requested() {
        return true;
    }

    let mut write_fixes = Vec::new();
    let mut other_fixes = Vec::new();
    let mut success = true;

    for (class_name, problems) in results {
        let Some(tool) = tools.iter().find(|t| t.class_name() == class_name.as_str()) else {
            continue;
        };
        if !tool.quick_fix {
            continue;
        }
        for problem in problems {
            if problem.fixes.len() != 1 {
                logger.error(&format!(
                    "Can not apply problem fixes for '{}'",
                    problem.render()
                ));
                success = false;
                continue;
            }
            let fix = problem.fixes[0].clone();
            let planned = PlannedFix {
                path: problem.file_path.clone(),
                rendered: format!("fix '{}' for '{}'", fix.name, problem.render()),
                fix,
            };
            if planned.fix.write_action {
                write_fixes.push(planned);
            } else {
                other_fixes.push(planned);
            }
        }
    }

    if write_fixes.is_empty() && other_fixes.is_empty() {
        return success;
    }

    // Within one file, later edits first, so earlier fixes cannot shift the
    // ranges of fixes still waiting.
    sort_for_application(&mut write_fixes);
    sort_for_application(&mut other_fixes);

    let app = handle.app().clone();
    if !write_fixes.is_empty() {
        let batch = write_fixes;
        let batch_logger = logger.clone();
        let batch_app = app.clone();
        let applied = handle.write_action(move || apply_batch(&batch_app, batch, &batch_logger));
        success &= applied;
    }
    if !other_fixes.is_empty() {
        let batch = other_fixes;
        let batch_logger = logger.clone();
        let batch_app = app.clone();
        let applied = handle.invoke_and_wait(move || apply_batch(&batch_app, batch, &batch_logger));
        success &= applied;
    }

    // Single flush point for the whole run.
    let flush_logger = logger.clone();
    let flush_ok = handle.invoke_and_wait(move || {
        flush_logger.info("Flush project documents");
        match app.documents().save_all() {
            Ok(saved) => {
                for path in saved {
                    flush_logger.info(&format!("File '{}' is flushed", path.display()));
                }
                true
            }
            Err(e) => {
                flush_logger.error(&format!("Failed to save documents: {e}"));
                false
            }
        }
    });

    success && flush_ok
}

fn sort_for_application(fixes: &mut [PlannedFix]) {
    fixes.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then(b.fix.range.start.cmp(&a.fix.range.start))
    });
}

fn apply_batch(app: &Arc<HeadlessApplication>, batch: Vec<PlannedFix>, logger: &ProxyLogger) -> bool {
    let mut ok = true;
    for planned in batch {
        ok &= apply_one(app, &planned, logger);
    }
    ok
}

fn apply_one(app: &Arc<HeadlessApplication>, planned: &PlannedFix, logger: &ProxyLogger) -> bool {
    let fix = &planned.fix;
    let current = app
        .documents()
        .text_of(&planned.path)
        .and_then(|text| text.get(fix.range.start..fix.range.end).map(str::to_string));
    match current {
        Some(target) if target == fix.target => {}
        _ => {
            // The range no longer holds the original text; an earlier fix
            // got here first.
            logger.info(&format!("Already applied {}", planned.rendered));
            return true;
        }
    }
    match app
        .documents()
        .replace(&planned.path, fix.range.start, fix.range.end, &fix.replacement)
    {
        Ok(()) => {
            logger.info(&format!("Applied {}", planned.rendered));
            true
        }
        Err(e) => {
            logger.error(&format!("Exception during applying quick {}: {e}", planned.rendered));
            false
        }
    }
}
