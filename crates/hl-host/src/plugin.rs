use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use hl_core::{Error, Result};

use crate::syspath::BuildInfo;

/// Plugins the headless host is allowed to load; everything else found in a
/// plugin directory is disabled with a log line, the way the full product
/// trims its plugin set down for analysis runs.
pub const PLATFORM_PLUGINS: &[&str] = &[
    "io.headlamp.platform",
    "io.headlamp.kotlin",
    "io.headlamp.java",
    "io.headlamp.profiles",
];

const DESCRIPTOR_FILE: &str = "plugin.json";

/// Descriptor carried by every plugin directory as `plugin.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PluginDescriptor {
    pub id: String,
    pub name: String,
    pub version: String,
    pub since_build: Option<String>,
    pub until_build: Option<String>,
}

impl PluginDescriptor {
    pub fn load(plugin_dir: &Path) -> Result<PluginDescriptor> {
        let descriptor_path = plugin_dir.join(DESCRIPTOR_FILE);
        let dir_name = plugin_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| plugin_dir.display().to_string());
        let text = fs::read_to_string(&descriptor_path).map_err(|_| {
            Error::PluginNotLoaded(dir_name.clone(), format!("missing {DESCRIPTOR_FILE}"))
        })?;
        serde_json::from_str(&text)
            .map_err(|e| Error::PluginNotLoaded(dir_name, format!("invalid descriptor: {e}")))
    }

    pub fn is_platform_plugin(&self) -> bool {
        PLATFORM_PLUGINS.contains(&self.id.as_str())
    }

    /// Verify the declared `[sinceBuild, untilBuild]` range contains the host
    /// build number. Incompatibility is fatal before analysis starts.
    pub fn check_compatibility(&self, build: &BuildInfo) -> Result<()> {
        if let Some(since) = &self.since_build {
            if compare_builds(&build.number, since) == Ordering::Less {
                return Err(Error::PluginNotLoaded(
                    self.name.clone(),
                    format!("requires build {since} or newer, host is {}", build.number),
                ));
            }
        }
        if let Some(until) = &self.until_build {
            if compare_builds(&build.number, until) == Ordering::Greater {
                return Err(Error::PluginNotLoaded(
                    self.name.clone(),
                    format!("supports builds up to {until}, host is {}", build.number),
                ));
            }
        }
        Ok(())
    }
}

/// Compare dotted build numbers segment by segment, numerically. A missing
/// segment counts as zero, so `243` equals `243.0`.
pub fn compare_builds(a: &str, b: &str) -> Ordering {
    let parse = |s: &str| -> Vec<u64> {
        s.split('.').map(|seg| seg.parse().unwrap_or(0)).collect()
    };
    let (a, b) = (parse(a), parse(b));
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}
