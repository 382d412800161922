use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

use hl_core::{
    CheckRequest, FileEntry, FileSet, InspectionPlan, InspectionSet, InspectionSpec,
    ReportTargets,
};

use crate::settings::{InspectionsSettings, Settings};

const SOURCE_EXTENSIONS: &[&str] = &["kt", "kts", "java"];

/// Everything the `check` subcommand collected from flags.
#[derive(Debug, Default)]
pub struct CheckOptions {
    pub project: Option<PathBuf>,
    pub module: Option<String>,
    pub xml: Option<PathBuf>,
    pub html: Option<PathBuf>,
    pub quiet: bool,
    pub inherit_from_idea: bool,
    pub profile_name: Option<String>,
    pub max_errors: Option<u32>,
    pub max_warnings: Option<u32>,
    pub max_infos: Option<u32>,
    pub idea_home: Option<PathBuf>,
    pub system_dir: Option<PathBuf>,
    pub plugins: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

/// Merge flags over settings into the wire request the runner understands.
pub fn build_check_request(options: &CheckOptions, settings: &Settings) -> Result<CheckRequest> {
    let project_dir = match &options.project {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("cannot resolve current directory")?,
    };
    let project_dir = project_dir
        .canonicalize()
        .with_context(|| format!("invalid project directory {}", project_dir.display()))?;
    let project_name = project_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    let module_name = options.module.clone().unwrap_or_else(|| project_name.clone());

    let files = collect_files(&project_dir, &options.files)?;
    if files.is_empty() {
        bail!("no source files to analyze under {}", project_dir.display());
    }

    let idea_home = options
        .idea_home
        .clone()
        .or_else(|| settings.idea.clone())
        .unwrap_or_else(|| default_state_dir().join("home"));
    let system_dir = options
        .system_dir
        .clone()
        .unwrap_or_else(|| default_state_dir().join("system"));
    std::fs::create_dir_all(&idea_home)
        .with_context(|| format!("cannot create host home {}", idea_home.display()))?;
    std::fs::create_dir_all(&system_dir)
        .with_context(|| format!("cannot create system directory {}", system_dir.display()))?;

    let report_settings = settings.report.clone().unwrap_or_default();
    let report = ReportTargets {
        is_quiet: options.quiet || report_settings.is_quiet.unwrap_or(false),
        xml: options
            .xml
            .clone()
            .or(report_settings.xml)
            .map(|p| FileEntry::new(absolute_in(&project_dir, &p))),
        html: options
            .html
            .clone()
            .or(report_settings.html)
            .map(|p| FileEntry::new(absolute_in(&project_dir, &p))),
    };

    let plan = InspectionPlan {
        idea_version: env!("CARGO_PKG_VERSION").to_string(),
        kotlin_plugin_version: None,
        is_available_code_changing: has_quick_fixes(settings),
        report_parameters: report,
        inherit_from_idea: options.inherit_from_idea
            || settings.inherit_from_idea.unwrap_or(false),
        profile_name: options.profile_name.clone().or_else(|| settings.profile_name.clone()),
        errors: bucket(settings.errors.as_ref(), options.max_errors),
        warnings: bucket(settings.warnings.as_ref(), options.max_warnings),
        info: bucket(settings.info.as_ref(), options.max_infos),
    };

    Ok(CheckRequest {
        project_dir: FileEntry::new(project_dir.clone()),
        project_name,
        module_name,
        idea_version: plan.idea_version.clone(),
        idea_home_directory: FileEntry::new(idea_home),
        idea_system_directory: FileEntry::new(system_dir),
        plugins: options.plugins.iter().map(|p| FileEntry::new(p.clone())).collect(),
        child_parameters: FileSet {
            files: files.into_iter().map(FileEntry::new).collect(),
            child_parameters: plan,
        },
    })
}

fn default_state_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("headlamp")
}

fn absolute_in(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn bucket(settings: Option<&InspectionsSettings>, max_override: Option<u32>) -> InspectionSet {
    let mut set = InspectionSet::default();
    if let Some(settings) = settings {
        set.max = settings.max;
        for (name, inspection) in &settings.inspections {
            set.inspections.insert(
                name.clone(),
                InspectionSpec {
                    name: name.clone(),
                    quick_fix: inspection.quick_fix.unwrap_or(false),
                },
            );
        }
    }
    if max_override.is_some() {
        set.max = max_override;
    }
    set
}

fn has_quick_fixes(settings: &Settings) -> bool {
    [&settings.errors, &settings.warnings, &settings.info]
        .into_iter()
        .flatten()
        .flat_map(|s| s.inspections.values())
        .any(|i| i.quick_fix == Some(true))
}

/// Explicit paths (resolved against the project) or a walk of the project
/// tree for known source extensions, sorted for determinism.
fn collect_files(project_dir: &Path, explicit: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if !explicit.is_empty() {
        let mut files = Vec::new();
        for path in explicit {
            let absolute = absolute_in(project_dir, path);
            if !absolute.is_file() {
                bail!("source file not found: {}", absolute.display());
            }
            files.push(absolute);
        }
        return Ok(files);
    }

    let mut files: Vec<PathBuf> = WalkDir::new(project_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|ext| SOURCE_EXTENSIONS.contains(&ext))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}
