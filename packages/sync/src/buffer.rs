//! External editor buffer: pollable snapshots, wholesale file writes

use crate::error::BufferError;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use walkdir::WalkDir;

/// Buffer path → file content
pub type BufferSnapshot = BTreeMap<String, String>;

/// Files to write and files to delete in one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiff {
    pub create: BTreeMap<String, String>,
    pub destroy: Vec<String>,
}

impl FileDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.create.insert(path.into(), content.into());
        self
    }

    pub fn destroy(mut self, path: impl Into<String>) -> Self {
        self.destroy.push(path.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.destroy.is_empty()
    }
}

/// The collaborator that hosts the editable source.
///
/// It offers no change notifications; callers poll [`read_snapshot`].
/// `Ok(None)` means the buffer is not initialized yet.
///
/// [`read_snapshot`]: ExternalBuffer::read_snapshot
pub trait ExternalBuffer: Send {
    fn read_snapshot(&self) -> Result<Option<BufferSnapshot>, BufferError>;

    fn write_diff(&mut self, diff: &FileDiff) -> Result<(), BufferError>;

    fn read_file(&self, path: &str) -> Result<Option<String>, BufferError> {
        Ok(self
            .read_snapshot()?
            .and_then(|mut files| files.remove(path)))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: Option<BufferSnapshot>,
    writes: usize,
}

/// In-process buffer. Clones share the same files, so a test or an
/// embedding host can type into a buffer the session owns.
#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBuffer {
    /// Uninitialized buffer: snapshots are `None` until [`initialize`](Self::initialize)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialized() -> Self {
        let buffer = Self::new();
        buffer.initialize();
        buffer
    }

    pub fn initialize(&self) {
        self.lock().files.get_or_insert_with(BufferSnapshot::new);
    }

    /// Simulate an edit made in the editor
    pub fn set_file(&self, path: impl Into<String>, content: impl Into<String>) {
        self.lock()
            .files
            .get_or_insert_with(BufferSnapshot::new)
            .insert(path.into(), content.into());
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.lock().files.as_ref().and_then(|f| f.get(path).cloned())
    }

    /// Number of `write_diff` batches applied so far
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ExternalBuffer for MemoryBuffer {
    fn read_snapshot(&self) -> Result<Option<BufferSnapshot>, BufferError> {
        let state = self.state.lock().map_err(|_| BufferError::Poisoned)?;
        Ok(state.files.clone())
    }

    fn write_diff(&mut self, diff: &FileDiff) -> Result<(), BufferError> {
        let mut state = self.state.lock().map_err(|_| BufferError::Poisoned)?;
        let files = state.files.get_or_insert_with(BufferSnapshot::new);
        for path in &diff.destroy {
            files.remove(path);
        }
        for (path, content) in &diff.create {
            files.insert(path.clone(), content.clone());
        }
        state.writes += 1;
        Ok(())
    }
}

/// Buffer backed by files under a directory. A missing directory reads as
/// uninitialized.
#[derive(Debug, Clone)]
pub struct DirectoryBuffer {
    root: PathBuf,
}

impl DirectoryBuffer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, BufferError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(BufferError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl ExternalBuffer for DirectoryBuffer {
    fn read_snapshot(&self) -> Result<Option<BufferSnapshot>, BufferError> {
        if !self.root.is_dir() {
            return Ok(None);
        }

        let mut files = BufferSnapshot::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry.map_err(|e| BufferError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            match std::fs::read_to_string(entry.path()) {
                Ok(content) => {
                    files.insert(key, content);
                }
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    debug!("skipping non-text buffer file {}", key);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(Some(files))
    }

    fn write_diff(&mut self, diff: &FileDiff) -> Result<(), BufferError> {
        for path in &diff.destroy {
            match std::fs::remove_file(self.resolve(path)?) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        for (path, content) in &diff.create {
            let target = self.resolve(path)?;
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(target, content)?;
        }
        Ok(())
    }

    fn read_file(&self, path: &str) -> Result<Option<String>, BufferError> {
        if !self.root.is_dir() {
            return Ok(None);
        }
        match std::fs::read_to_string(self.resolve(path)?) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
