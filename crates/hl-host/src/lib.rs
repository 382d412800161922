pub mod app;
pub mod dispatch;
pub mod document;
pub mod inspect;
pub mod lexer;
pub mod plugin;
pub mod profile;
pub mod progress;
pub mod project;
pub mod source;
pub mod syspath;
pub mod tools;

pub use app::{boot, HeadlessApplication, HostConfig, HostHandle};
pub use document::{Document, DocumentStore, LineIndex};
pub use inspect::{
    InspectionTool, ProblemsHolder, QuickFix, RawProblem, RegisteredTool, TextRange, ToolRegistry,
    ToolScope,
};
pub use profile::{InspectionProfile, ProfileEntry, INSPECTION_PROFILES_PATH};
pub use project::Project;
pub use source::{Language, SourceFile};
