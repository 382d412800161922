#![allow(dead_code)]

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use hl_core::{
    CheckRequest, FileEntry, FileSet, InspectionPlan, InspectionSet, InspectionSpec,
    ReportTargets,
};
use hl_protocol::codec::{self, SlaveFrame};
use hl_protocol::SlaveSender;
use hl_runner::ProxyLogger;

/// Shared sink capturing everything the runner logger sends over the wire.
#[derive(Clone, Default)]
pub struct WireCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

struct CaptureSink(Arc<Mutex<Vec<u8>>>);

impl Write for CaptureSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl WireCapture {
    pub fn logger(&self) -> ProxyLogger {
        ProxyLogger::new(self.sender())
    }

    pub fn sender(&self) -> SlaveSender {
        SlaveSender::new(Box::new(CaptureSink(self.buffer.clone())))
    }

    /// Decode every captured frame back into readable text.
    pub fn frames(&self) -> Vec<SlaveFrame> {
        let raw = self.buffer.lock().unwrap().clone();
        String::from_utf8(raw)
            .unwrap()
            .lines()
            .map(|line| codec::decode_slave_line(line).unwrap())
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.frames()
            .into_iter()
            .map(|frame| match frame {
                SlaveFrame::Log(_, text) => text,
                SlaveFrame::Value(text) => text,
                SlaveFrame::Plain(text) => text,
            })
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }
}

/// Home directory shared by every boot inside one test process: the headless
/// application is process-wide, and a second home would be rejected.
pub fn shared_home() -> PathBuf {
    static HOME: OnceLock<PathBuf> = OnceLock::new();
    HOME.get_or_init(|| {
        let dir = std::env::temp_dir().join(format!("hl-test-home-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("build.txt"), "IC-243.1").unwrap();
        dir
    })
    .clone()
}

pub fn shared_system_dir() -> PathBuf {
    static SYSTEM: OnceLock<PathBuf> = OnceLock::new();
    SYSTEM
        .get_or_init(|| {
            let dir = std::env::temp_dir().join(format!("hl-test-system-{}", std::process::id()));
            std::fs::create_dir_all(&dir).unwrap();
            dir
        })
        .clone()
}

pub fn empty_set() -> InspectionSet {
    InspectionSet::default()
}

pub fn set_of(entries: &[(&str, bool)], max: Option<u32>) -> InspectionSet {
    let mut set = InspectionSet { max, ..InspectionSet::default() };
    for (name, quick_fix) in entries {
        set.inspections.insert(
            (*name).to_string(),
            InspectionSpec { name: (*name).to_string(), quick_fix: *quick_fix },
        );
    }
    set
}

pub struct RequestBuilder {
    pub project_dir: PathBuf,
    pub files: Vec<PathBuf>,
    pub errors: InspectionSet,
    pub warnings: InspectionSet,
    pub info: InspectionSet,
    pub inherit_from_idea: bool,
    pub profile_name: Option<String>,
    pub quick_fix: bool,
    pub quiet: bool,
    pub xml: Option<PathBuf>,
    pub html: Option<PathBuf>,
}

impl RequestBuilder {
    pub fn new(project_dir: PathBuf) -> Self {
        Self {
            project_dir,
            files: Vec::new(),
            errors: empty_set(),
            warnings: empty_set(),
            info: empty_set(),
            inherit_from_idea: false,
            profile_name: None,
            quick_fix: false,
            quiet: false,
            xml: None,
            html: None,
        }
    }

    pub fn build(self) -> CheckRequest {
        let project_name = self
            .project_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        CheckRequest {
            project_dir: FileEntry::new(self.project_dir.clone()),
            project_name: project_name.clone(),
            module_name: project_name,
            idea_version: "243.1".to_string(),
            idea_home_directory: FileEntry::new(shared_home()),
            idea_system_directory: FileEntry::new(shared_system_dir()),
            plugins: Vec::new(),
            child_parameters: FileSet {
                files: self.files.iter().map(|f| FileEntry::new(f.clone())).collect(),
                child_parameters: InspectionPlan {
                    idea_version: "243.1".to_string(),
                    kotlin_plugin_version: None,
                    is_available_code_changing: self.quick_fix,
                    report_parameters: ReportTargets {
                        is_quiet: self.quiet,
                        xml: self.xml.map(FileEntry::new),
                        html: self.html.map(FileEntry::new),
                    },
                    inherit_from_idea: self.inherit_from_idea,
                    profile_name: self.profile_name,
                    errors: self.errors,
                    warnings: self.warnings,
                    info: self.info,
                },
            },
        }
    }
}
