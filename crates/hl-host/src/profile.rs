use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::path::Path;

use hl_core::{Error, ProblemLevel, Result};

use crate::inspect::ToolRegistry;

/// Profile files live under this path inside the project directory.
pub const INSPECTION_PROFILES_PATH: &str = ".idea/inspectionProfiles";

/// One `<inspection_tool>` entry of a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEntry {
    pub class: String,
    pub enabled: bool,
    /// `None` means the profile marked the tool "do not show".
    pub level: Option<ProblemLevel>,
}

/// A named, persisted configuration of enabled tools and their severities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionProfile {
    pub name: String,
    pub entries: Vec<ProfileEntry>,
}

impl InspectionProfile {
    /// Parse the host's profile XML format:
    ///
    /// ```xml
    /// <profile version="1.0">
    ///   <option name="myName" value="Strict" />
    ///   <inspection_tool class="VarCouldBeVal" enabled="true" level="WARNING" />
    /// </profile>
    /// ```
    pub fn parse(xml: &str) -> Result<InspectionProfile> {
        let mut reader = Reader::from_str(xml);
        let mut name = String::from("unnamed");
        let mut entries = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"option" => {
                        let mut is_name = false;
                        let mut value = None;
                        for attr in e.attributes() {
                            let attr = attr.map_err(|e| {
                                Error::InvalidConfiguration(format!("invalid profile attribute: {e}"))
                            })?;
                            match attr.key.as_ref() {
                                b"name" => is_name = attr.value.as_ref() == b"myName",
                                b"value" => {
                                    value =
                                        Some(String::from_utf8_lossy(&attr.value).into_owned())
                                }
                                _ => {}
                            }
                        }
                        if is_name {
                            if let Some(value) = value {
                                name = value;
                            }
                        }
                    }
                    b"inspection_tool" => {
                        let mut class = None;
                        let mut enabled = true;
                        let mut level = None;
                        for attr in e.attributes() {
                            let attr = attr.map_err(|e| {
                                Error::InvalidConfiguration(format!("invalid profile attribute: {e}"))
                            })?;
                            let value = String::from_utf8_lossy(&attr.value).into_owned();
                            match attr.key.as_ref() {
                                b"class" => class = Some(value),
                                b"enabled" => enabled = value == "true",
                                b"level" => level = ProblemLevel::from_profile_level(&value),
                                _ => {}
                            }
                        }
                        if let Some(class) = class {
                            entries.push(ProfileEntry { class, enabled, level });
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::InvalidConfiguration(format!("invalid profile XML: {e}")));
                }
                _ => {}
            }
        }

        Ok(InspectionProfile { name, entries })
    }

    pub fn load(path: &Path) -> Result<InspectionProfile> {
        let xml = fs::read_to_string(path).map_err(|_| {
            Error::InvalidConfiguration(format!("profile not found: {}", path.display()))
        })?;
        Self::parse(&xml)
    }

    /// The host's currently active profile: every registered tool enabled at
    /// its own default level. Used when no profile file resolves.
    pub fn from_registry(registry: &ToolRegistry) -> InspectionProfile {
        InspectionProfile {
            name: "Default".to_string(),
            entries: registry
                .iter()
                .map(|t| ProfileEntry {
                    class: t.class_name().to_string(),
                    enabled: true,
                    level: Some(t.tool.default_level()),
                })
                .collect(),
        }
    }

    pub fn enabled_entries(&self) -> impl Iterator<Item = &ProfileEntry> {
        self.entries.iter().filter(|e| e.enabled)
    }
}
