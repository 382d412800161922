use std::path::Path;
use std::thread;

use hl_core::{CheckRequest, Error, Result};
use hl_host::{app, progress, HostConfig, HostHandle, Project, SourceFile};

use crate::engine::{self, InspectionChecker};
use crate::logger::ProxyLogger;
use crate::quickfix;
use crate::report;
use crate::resolver;

const KOTLIN_PLUGIN_ID: &str = "io.headlamp.kotlin";

/// The runner-process side of one `RUN` command: boots the headless host,
/// opens the project, and drives analysis, reporting, and quick-fixes.
pub struct CheckRunner {
    logger: ProxyLogger,
    test_mode: bool,
    handle: Option<HostHandle>,
}

impl CheckRunner {
    pub fn new(logger: ProxyLogger, test_mode: bool) -> Self {
        Self { logger, test_mode, handle: None }
    }

    /// Returns `true` when analysis completed within every threshold and all
    /// requested fixes applied.
    pub fn run(&mut self, request: &CheckRequest) -> Result<bool> {
        let config = HostConfig {
            version: request.idea_version.clone(),
            home_dir: request.idea_home_directory.path.clone(),
            system_dir: request.idea_system_directory.path.clone(),
            plugin_dirs: request.plugins.iter().map(|p| p.path.clone()).collect(),
            test_mode: self.test_mode,
        };
        let handle = app::boot(&config)?;
        self.check_plugin_versions(&handle, request)?;

        let project = handle.open_project(&request.project_dir.path, &request.project_name)?;
        if project.has_module(&request.module_name) {
            self.logger.info(&format!("Under analysis: module {}", request.module_name));
        } else {
            self.logger.warn(&format!(
                "Module '{}' not found in project '{}'",
                request.module_name, request.project_name
            ));
        }

        let files = self.load_files(&handle, &project, request);
        let plan = request.plan();
        let tools = resolver::resolve_tools(handle.registry(), plan, &project, &self.logger)?;

        let mut checker = InspectionChecker::new(plan.clone());
        // Analysis runs on a dedicated worker thread so the host's dispatch
        // thread stays responsive for invoke-and-wait round trips. The worker
        // is joined before this call returns.
        let results = thread::scope(|scope| {
            let handle_ref = &handle;
            let tools_ref = &tools;
            let logger_ref = &self.logger;
            let checker_ref = &mut checker;
            let worker = thread::Builder::new()
                .name("hl-analysis".to_string())
                .spawn_scoped(scope, move || {
                    engine::analyze(handle_ref, &files, tools_ref, checker_ref, logger_ref)
                })
                .map_err(|e| Error::Internal(format!("cannot spawn analysis worker: {e}")))?;
            worker
                .join()
                .map_err(|_| Error::Internal("analysis worker panicked".to_string()))
        })?;

        handle.read_action(|| report::report_problems(plan, &results, &self.logger))
            .map_err(|e| Error::Internal(format!("report generation failed: {e}")))?;

        let fixes_ok =
            quickfix::apply_quick_fixes(&handle, plan, &results, &tools, &self.logger);

        let success = checker.is_success() && fixes_ok;
        self.handle = Some(handle);
        Ok(success)
    }

    /// Release the host. Only the creating handle exits the application; in
    /// test mode only projects are closed.
    pub fn finalize(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.logger.info("Headless host shutting down");
            handle.shutdown();
        }
    }

    fn check_plugin_versions(&self, handle: &HostHandle, request: &CheckRequest) -> Result<()> {
        let Some(expected) = &request.plan().kotlin_plugin_version else {
            return Ok(());
        };
        let Some(descriptor) = handle.plugins.iter().find(|p| p.id == KOTLIN_PLUGIN_ID) else {
            return Ok(());
        };
        if &descriptor.version != expected {
            return Err(Error::PluginNotLoaded(
                descriptor.name.clone(),
                format!("version {} requested but {} is installed", expected, descriptor.version),
            ));
        }
        Ok(())
    }

    /// Build read-only views of the requested files. An unreadable or
    /// unparsable file is warned about and skipped; it never fails the run.
    fn load_files(
        &self,
        handle: &HostHandle,
        project: &Project,
        request: &CheckRequest,
    ) -> Vec<SourceFile> {
        handle.read_action(|| {
            progress::run_process(|_indicator| {
                let mut files = Vec::new();
                for entry in request.files() {
                    let path: &Path = &entry.path;
                    let text = match handle.documents().load(path) {
                        Ok(text) => text,
                        Err(e) => {
                            self.logger.warn(&format!(
                                "Cannot get document for file {}: {e}",
                                path.display()
                            ));
                            continue;
                        }
                    };
                    let rel_path = project.relative_path(path);
                    match SourceFile::parse(path, rel_path, text) {
                        Ok(file) => files.push(file),
                        Err(e) => {
                            self.logger.warn(&format!(
                                "Cannot parse file {}: {e}",
                                path.display()
                            ));
                        }
                    }
                }
                files
            })
        })
    }
}
