use std::path::{Path, PathBuf};

use hl_core::{Error, Result};

/// An opened project: the directory under analysis plus its module layout as
/// far as the headless host models it.
#[derive(Debug, Clone)]
pub struct Project {
    pub base_path: PathBuf,
    pub name: String,
}

impl Project {
    pub fn open(project_dir: &Path, name: &str) -> Result<Project> {
        if !project_dir.is_dir() {
            return Err(Error::ProjectNotFound(project_dir.display().to_string()));
        }
        tracing::info!(project = name, path = %project_dir.display(), "project opened");
        Ok(Project {
            base_path: project_dir.to_path_buf(),
            name: name.to_string(),
        })
    }

    /// True when the module is the project itself or a directory inside it.
    pub fn has_module(&self, module_name: &str) -> bool {
        module_name == self.name || self.base_path.join(module_name).is_dir()
    }

    /// Path rendered relative to the project root, for stable report output.
    pub fn relative_path(&self, file: &Path) -> String {
        file.strip_prefix(&self.base_path)
            .unwrap_or(file)
            .display()
            .to_string()
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.base_path.join(crate::profile::INSPECTION_PROFILES_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_requires_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::open(dir.path(), "sample").unwrap();
        assert_eq!(project.name, "sample");
        assert!(Project::open(&dir.path().join("nope"), "sample").is_err());
    }

    #[test]
    fn module_lookup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("app")).unwrap();
        let project = Project::open(dir.path(), "sample").unwrap();
        assert!(project.has_module("sample"));
        assert!(project.has_module("app"));
        assert!(!project.has_module("missing"));
    }

    #[test]
    fn relative_paths_strip_the_base() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::open(dir.path(), "sample").unwrap();
        let inside = dir.path().join("src/main.kt");
        assert_eq!(project.relative_path(&inside), "src/main.kt");
        let outside = Path::new("/elsewhere/main.kt");
        assert_eq!(project.relative_path(outside), "/elsewhere/main.kt");
    }
}
