use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::severity::ProblemLevel;

/// Wire representation of a filesystem path: `{"path": "<absolute>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileEntry {
    pub path: PathBuf,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl From<&Path> for FileEntry {
    fn from(path: &Path) -> Self {
        Self { path: path.to_path_buf() }
    }
}

/// One configured inspection inside a severity bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InspectionSpec {
    pub name: String,
    pub quick_fix: bool,
}

/// A severity bucket: the inspections assigned to it and the count ceiling.
///
/// `max` is an inclusive ceiling: `count > max` is a breach, `count == max`
/// is not. `BTreeMap` keeps serialization order deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InspectionSet {
    pub inspections: BTreeMap<String, InspectionSpec>,
    pub max: Option<u32>,
}

impl InspectionSet {
    pub fn is_too_many(&self, count: u32) -> bool {
        self.max.map_or(false, |max| count > max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReportTargets {
    pub is_quiet: bool,
    pub xml: Option<FileEntry>,
    pub html: Option<FileEntry>,
}

/// Inspection-level parameters: which tools run, at which severity, and what
/// is done with the findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InspectionPlan {
    pub idea_version: String,
    pub kotlin_plugin_version: Option<String>,
    pub is_available_code_changing: bool,
    pub report_parameters: ReportTargets,
    pub inherit_from_idea: bool,
    pub profile_name: Option<String>,
    pub errors: InspectionSet,
    pub warnings: InspectionSet,
    pub info: InspectionSet,
}

impl InspectionPlan {
    /// All configured inspections across the three buckets, keyed by name.
    pub fn all_inspections(&self) -> BTreeMap<&str, &InspectionSpec> {
        self.errors
            .inspections
            .iter()
            .chain(self.warnings.inspections.iter())
            .chain(self.info.inspections.iter())
            .map(|(name, spec)| (name.as_str(), spec))
            .collect()
    }

    /// Configured bucket level for each inspection name.
    pub fn configured_levels(&self) -> BTreeMap<&str, ProblemLevel> {
        let mut levels = BTreeMap::new();
        for name in self.errors.inspections.keys() {
            levels.insert(name.as_str(), ProblemLevel::Error);
        }
        for name in self.warnings.inspections.keys() {
            levels.insert(name.as_str(), ProblemLevel::Warning);
        }
        for name in self.info.inspections.keys() {
            levels.insert(name.as_str(), ProblemLevel::Info);
        }
        levels
    }

    pub fn quick_fix_requested(&self) -> bool {
        self.is_available_code_changing
            && self.all_inspections().values().any(|spec| spec.quick_fix)
    }
}

/// The file set under analysis together with the inspection plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileSet {
    pub files: Vec<FileEntry>,
    pub child_parameters: InspectionPlan,
}

/// The complete `RUN` request the master sends to the forked runner.
///
/// The wire shape keeps its legacy nesting (`childParameters` twice); the
/// accessors below are the API, so call sites never walk the nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CheckRequest {
    pub project_dir: FileEntry,
    pub project_name: String,
    pub module_name: String,
    pub idea_version: String,
    pub idea_home_directory: FileEntry,
    pub idea_system_directory: FileEntry,
    pub plugins: Vec<FileEntry>,
    pub child_parameters: FileSet,
}

impl CheckRequest {
    pub fn files(&self) -> &[FileEntry] {
        &self.child_parameters.files
    }

    pub fn plan(&self) -> &InspectionPlan {
        &self.child_parameters.child_parameters
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &str) -> crate::Result<CheckRequest> {
        Ok(serde_json::from_str(data)?)
    }
}
