use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use hl_core::{Error, Result};

/// Files above this size are skipped with a warning rather than analyzed.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Byte-offset to line/column mapping for one text snapshot.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// 0-based (line, row) of a byte offset.
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let row = offset - self.line_starts[line];
        (line as u32, row as u32)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// One open file: its current text and line index. Mutations go through
/// [`DocumentStore`] so modified state is tracked for the final flush.
#[derive(Debug)]
pub struct Document {
    text: String,
    index: LineIndex,
    modified: bool,
}

impl Document {
    pub fn new(text: String) -> Self {
        let index = LineIndex::new(&text);
        Self { text, index, modified: false }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn index(&self) -> &LineIndex {
        &self.index
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Replace `start..end` with `replacement`, reindexing lines.
    pub fn replace(&mut self, start: usize, end: usize, replacement: &str) -> Result<()> {
        if start > end
            || end > self.text.len()
            || !self.text.is_char_boundary(start)
            || !self.text.is_char_boundary(end)
        {
            return Err(Error::Internal(format!(
                "invalid edit range {start}..{end} for document of length {}",
                self.text.len()
            )));
        }
        self.text.replace_range(start..end, replacement);
        self.index = LineIndex::new(&self.text);
        self.modified = true;
        Ok(())
    }
}

/// Process-wide store of open documents, keyed by absolute path.
///
/// Mirrors the host platform's document manager: reads load a snapshot,
/// quick-fixes edit in place, and one `save_all` at the end of the run writes
/// every modified document back to disk.
pub struct DocumentStore {
    documents: Mutex<HashMap<PathBuf, Document>>,
    flushes: AtomicUsize,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self { documents: Mutex::new(HashMap::new()), flushes: AtomicUsize::new(0) }
    }

    /// Load a file into the store, returning its text. Unreadable files fail
    /// with a message describing why (missing, directory, binary, too large).
    pub fn load(&self, path: &Path) -> Result<String> {
        if let Some(doc) = self.documents.lock().get(path) {
            return Ok(doc.text().to_string());
        }
        let metadata = fs::metadata(path)
            .map_err(|_| Error::Internal(format!("cannot find file {}", path.display())))?;
        if metadata.is_dir() {
            return Err(Error::Internal(format!("{} is directory", path.display())));
        }
        if metadata.len() > MAX_FILE_SIZE {
            return Err(Error::Internal(format!("{} is too large", path.display())));
        }
        let bytes = fs::read(path)?;
        let text = String::from_utf8(bytes)
            .map_err(|_| Error::Internal(format!("{} is binary", path.display())))?;
        self.documents
            .lock()
            .insert(path.to_path_buf(), Document::new(text.clone()));
        Ok(text)
    }

    pub fn text_of(&self, path: &Path) -> Option<String> {
        self.documents.lock().get(path).map(|d| d.text().to_string())
    }

    /// Apply one edit to a loaded document.
    pub fn replace(&self, path: &Path, start: usize, end: usize, replacement: &str) -> Result<()> {
        let mut documents = self.documents.lock();
        let doc = documents
            .get_mut(path)
            .ok_or_else(|| Error::Internal(format!("document not loaded: {}", path.display())))?;
        doc.replace(start, end, replacement)
    }

    /// Write every modified document back to disk. Returns the saved paths.
    /// This is the single flush point at the end of a run.
    pub fn save_all(&self) -> Result<Vec<PathBuf>> {
        let mut saved = Vec::new();
        let mut documents = self.documents.lock();
        for (path, doc) in documents.iter_mut() {
            if doc.modified {
                fs::write(path, doc.text())?;
                doc.modified = false;
                saved.push(path.clone());
            }
        }
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(saved)
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    /// Drop all loaded documents (used between runs in test mode).
    pub fn clear(&self) {
        self.documents.lock().clear();
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_maps_offsets() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_col(0), (0, 0));
        assert_eq!(index.line_col(1), (0, 1));
        assert_eq!(index.line_col(3), (1, 0));
        assert_eq!(index.line_col(4), (1, 1));
        assert_eq!(index.line_col(6), (2, 0));
        assert_eq!(index.line_col(7), (3, 0));
        assert_eq!(index.line_count(), 4);
    }

    #[test]
    fn replace_tracks_modification_and_reindexes() {
        let mut doc = Document::new("var x = 1\nvar y = 2\n".to_string());
        assert!(!doc.is_modified());
        doc.replace(0, 3, "val").unwrap();
        assert_eq!(doc.text(), "val x = 1\nvar y = 2\n");
        assert!(doc.is_modified());
        assert_eq!(doc.index().line_col(10), (1, 0));
    }

    #[test]
    fn replace_rejects_bad_ranges() {
        let mut doc = Document::new("short".to_string());
        assert!(doc.replace(3, 2, "x").is_err());
        assert!(doc.replace(0, 100, "x").is_err());
    }

    #[test]
    fn store_load_edit_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.kt");
        fs::write(&path, "var x = 1\n").unwrap();

        let store = DocumentStore::new();
        let text = store.load(&path).unwrap();
        assert_eq!(text, "var x = 1\n");

        store.replace(&path, 0, 3, "val").unwrap();
        let saved = store.save_all().unwrap();
        assert_eq!(saved, vec![path.clone()]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "val x = 1\n");
        assert_eq!(store.flush_count(), 1);

        // Nothing left to save, but the flush still counts as a sync point.
        let saved = store.save_all().unwrap();
        assert!(saved.is_empty());
        assert_eq!(store.flush_count(), 2);
    }

    #[test]
    fn store_reports_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new();

        let err = store.load(&dir.path().join("missing.kt")).unwrap_err();
        assert!(err.to_string().contains("cannot find file"));

        let err = store.load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("is directory"));

        let binary = dir.path().join("blob.bin");
        fs::write(&binary, [0u8, 159, 146, 150]).unwrap();
        let err = store.load(&binary).unwrap_err();
        assert!(err.to_string().contains("is binary"));
    }
}
