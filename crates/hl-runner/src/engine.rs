use std::panic::{self, AssertUnwindSafe};

use hl_core::{InspectionPlan, ProblemLevel};
use hl_host::progress;
use hl_host::source::language_applicable;
use hl_host::{HostHandle, ProblemsHolder, SourceFile, ToolScope};

use crate::logger::ProxyLogger;
use crate::problems::PinnedProblem;
use crate::resolver::ResolvedTool;

/// Running severity tally with threshold enforcement.
///
/// The first breach flips the run to failed; the engine stops scheduling any
/// further work as soon as that happens.
pub struct InspectionChecker {
    plan: InspectionPlan,
    errors: u32,
    warnings: u32,
    info: u32,
    success: bool,
}

impl InspectionChecker {
    pub fn new(plan: InspectionPlan) -> Self {
        Self { plan, errors: 0, warnings: 0, info: 0, success: true }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_fail(&self) -> bool {
        !self.success
    }

    pub fn counts(&self) -> (u32, u32, u32) {
        (self.errors, self.warnings, self.info)
    }

    pub fn apply(&mut self, level: ProblemLevel, logger: &ProxyLogger) {
        match level {
            ProblemLevel::Error => self.errors += 1,
            ProblemLevel::Warning | ProblemLevel::WeakWarning => self.warnings += 1,
            ProblemLevel::Info => self.info += 1,
        }
        let breach = if self.plan.errors.is_too_many(self.errors) {
            Some(("errors", self.errors))
        } else if self.plan.warnings.is_too_many(self.warnings) {
            Some(("warnings", self.warnings))
        } else if self.plan.info.is_too_many(self.info) {
            Some(("info", self.info))
        } else {
            None
        };
        if let Some((name, count)) = breach {
            logger.error(&format!("Too many {name} found: {count}. Analysis stopped"));
            self.success = false;
        }
    }
}

/// Execute the resolved inspections over the file set.
///
/// Outer loop inspections, inner loop files; a threshold breach aborts both
/// loops immediately, so a pathological file short-circuits the remaining
/// work. Visitors run inside a read action under a progress scope. One tool
/// failing (or panicking) on one file is logged and skipped; it aborts
/// nothing else.
pub fn analyze(
    handle: &HostHandle,
    files: &[SourceFile],
    tools: &[ResolvedTool],
    checker: &mut InspectionChecker,
    logger: &ProxyLogger,
) -> Vec<(String, Vec<PinnedProblem>)> {
    logger.info(&format!(
        "Before inspections launched: total of {} files to analyze",
        files.len()
    ));
    let mut results = Vec::new();

    for tool in tools {
        let class_name = tool.class_name();
        match tool.scope() {
            ToolScope::UnsupportedGlobal => {
                logger.warn(&format!("Global inspection tool '{class_name}' is unsupported"));
                continue;
            }
            ToolScope::Local | ToolScope::GlobalSimple => {}
        }

        let problems = handle.read_action(|| {
            progress::run_process(|indicator| {
                let mut collected = Vec::new();
                for file in files {
                    if indicator.check_cancelled().is_err() {
                        break;
                    }
                    if !language_applicable(tool.tool().language(), file.language) {
                        continue;
                    }
                    let level = tool
                        .level
                        .map(|l| l.to_string())
                        .unwrap_or_else(|| "default".to_string());
                    logger.info(&format!(
                        "({level}) Inspection '{}' analyzing started for {}",
                        tool.tool().display_name(),
                        file.rel_path
                    ));

                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                        let mut holder = ProblemsHolder::new(file);
                        tool.tool().check_file(file, &mut holder).map(|_| holder.into_results())
                    }));
                    let raw_problems = match outcome {
                        Ok(Ok(problems)) => problems,
                        Ok(Err(e)) => {
                            logger.error(&format!(
                                "Exception during {class_name} analysis of {}: {e}",
                                file.rel_path
                            ));
                            continue;
                        }
                        Err(payload) => {
                            let message = panic_text(&payload);
                            logger.error(&format!(
                                "Exception during {class_name} analysis of {}: {message}",
                                file.rel_path
                            ));
                            continue;
                        }
                    };

                    for raw in &raw_problems {
                        let Some(pinned) = PinnedProblem::create_if_problem(
                            raw,
                            file,
                            tool.tool().display_name(),
                            tool.level,
                        ) else {
                            continue;
                        };
                        let level = pinned.level;
                        collected.push(pinned);
                        checker.apply(level, logger);
                        if checker.is_fail() {
                            return collected;
                        }
                    }
                }
                collected
            })
        });

        results.push((class_name.to_string(), problems));
        if checker.is_fail() {
            break;
        }
    }

    results
}

fn panic_text(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
