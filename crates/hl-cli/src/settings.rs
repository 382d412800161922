use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// JSON settings file (`--config`). Every field is optional; command-line
/// flags override whatever is present.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Settings {
    pub idea: Option<PathBuf>,
    pub runner: Option<PathBuf>,
    pub inherit_from_idea: Option<bool>,
    pub profile_name: Option<String>,
    pub report: Option<ReportSettings>,
    pub errors: Option<InspectionsSettings>,
    pub warnings: Option<InspectionsSettings>,
    pub info: Option<InspectionsSettings>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReportSettings {
    pub is_quiet: Option<bool>,
    pub xml: Option<PathBuf>,
    pub html: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InspectionsSettings {
    #[serde(default)]
    pub inspections: BTreeMap<String, InspectionSettings>,
    pub max: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InspectionSettings {
    pub quick_fix: Option<bool>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Settings> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read configuration file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid configuration file {}", path.display()))
    }
}
