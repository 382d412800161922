use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use hl_core::{Error, Result};

pub const DEFAULT_BUILD_NUMBER: &str = "172.1";
const SYSTEM_MARKER_FILE: &str = "marker.ipl";
const MAX_SYSTEM_SLOTS: u32 = 256;

/// Build identity of the host distribution, read from `build.txt` in the
/// home directory (`IC-243.1` style).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub number: String,
    pub ultimate: bool,
}

impl BuildInfo {
    pub fn from_home(home_dir: &Path) -> BuildInfo {
        let build_file = home_dir.join("build.txt");
        let Ok(text) = fs::read_to_string(&build_file) else {
            return BuildInfo { number: DEFAULT_BUILD_NUMBER.to_string(), ultimate: false };
        };
        let text = text.trim();
        let ultimate = text.starts_with("IU");
        let number: String = text.chars().skip_while(|c| !c.is_ascii_digit()).collect();
        let number = if number.is_empty() { DEFAULT_BUILD_NUMBER.to_string() } else { number };
        BuildInfo { number, ultimate }
    }
}

/// Exclusive claim on one numbered system directory slot.
///
/// The advisory lock on the marker file dies with the process, so a slot held
/// by a crashed run becomes reusable; a slot with a stale marker but no live
/// lock is claimed normally.
#[derive(Debug)]
pub struct SystemLock {
    pub system_path: PathBuf,
    file: File,
}

impl SystemLock {
    /// Probe `<system>/<build>_code<N>/system` for N in 1..=256 and lock the
    /// first free slot. All slots locked is fatal.
    pub fn allocate(system_dir: &Path, build: &BuildInfo) -> Result<SystemLock> {
        let prefix = format!(
            "{}{}",
            if build.ultimate { "U_" } else { "" },
            build.number.replace('.', "_")
        );
        for code in 1..=MAX_SYSTEM_SLOTS {
            let dir = system_dir.join(format!("{prefix}_code{code}")).join("system");
            fs::create_dir_all(&dir)?;
            let marker = dir.join(SYSTEM_MARKER_FILE);
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(false)
                .open(&marker)?;
            match file.try_lock_exclusive() {
                Ok(()) => {
                    tracing::debug!(slot = code, path = %dir.display(), "system directory allocated");
                    return Ok(SystemLock { system_path: dir, file });
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => continue,
                Err(e) => {
                    return Err(Error::Internal(format!(
                        "system lock {} failed: {e}",
                        marker.display()
                    )))
                }
            }
        }
        Err(Error::SystemDirectoryExhausted)
    }
}

impl Drop for SystemLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_info_parses_prefix_and_number() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("build.txt"), "IC-243.12.3").unwrap();
        let build = BuildInfo::from_home(dir.path());
        assert_eq!(build.number, "243.12.3");
        assert!(!build.ultimate);

        fs::write(dir.path().join("build.txt"), "IU-243.1").unwrap();
        let build = BuildInfo::from_home(dir.path());
        assert_eq!(build.number, "243.1");
        assert!(build.ultimate);
    }

    #[test]
    fn build_info_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let build = BuildInfo::from_home(dir.path());
        assert_eq!(build.number, DEFAULT_BUILD_NUMBER);
        assert!(!build.ultimate);
    }

    #[test]
    fn locked_slot_moves_to_next() {
        let dir = tempfile::tempdir().unwrap();
        let build = BuildInfo { number: "243.1".to_string(), ultimate: false };

        let first = SystemLock::allocate(dir.path(), &build).unwrap();
        assert!(first.system_path.ends_with("243_1_code1/system"));

        let second = SystemLock::allocate(dir.path(), &build).unwrap();
        assert!(second.system_path.ends_with("243_1_code2/system"));

        drop(first);
        let third = SystemLock::allocate(dir.path(), &build).unwrap();
        assert!(third.system_path.ends_with("243_1_code1/system"));
    }

    #[test]
    fn exhausted_slots_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let build = BuildInfo { number: "243.1".to_string(), ultimate: false };

        let mut held = Vec::new();
        for _ in 0..MAX_SYSTEM_SLOTS {
            held.push(SystemLock::allocate(dir.path(), &build).unwrap());
        }
        let err = SystemLock::allocate(dir.path(), &build).unwrap_err();
        assert!(matches!(err, Error::SystemDirectoryExhausted));
        drop(held);
    }

    #[test]
    fn stale_marker_without_lock_is_reclaimed() {
        let dir = tempfile::tempdir().unwrap();
        let build = BuildInfo { number: "243.1".to_string(), ultimate: false };
        let slot = dir.path().join("243_1_code1/system");
        fs::create_dir_all(&slot).unwrap();
        fs::write(slot.join(SYSTEM_MARKER_FILE), "").unwrap();

        let lock = SystemLock::allocate(dir.path(), &build).unwrap();
        assert_eq!(lock.system_path, slot);
    }
}
