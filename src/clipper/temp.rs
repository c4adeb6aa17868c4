//! Scoped temporary WAV files for clip extraction.
//!
//! A [`TempWav`] lives beside the file it will eventually replace, so that
//! moving it into place is a same-filesystem rename. The file is removed
//! when the guard drops unless it has been persisted, and every live guard
//! is registered so an interrupt handler can remove leftovers.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};

use tempfile::{Builder, TempPath};

use crate::constants::clipper::TEMP_MARKER;
use crate::error::{Error, Result};

/// RAII guard for a temporary WAV file.
#[derive(Debug)]
pub struct TempWav {
    location: PathBuf,
    path: Option<TempPath>,
}

impl TempWav {
    /// Create an empty, uniquely named temporary file next to `target`.
    ///
    /// Names look like `.{stem}.{pid}.{random}.tmp.wav`.
    pub fn beside(target: &Path) -> Result<Self> {
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let stem = target
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("clip");

        let file = Builder::new()
            .prefix(&format!(".{stem}.{}.", std::process::id()))
            .suffix(&format!("{TEMP_MARKER}.wav"))
            .tempfile_in(&dir)
            .map_err(|e| Error::TempFile { dir, source: e })?;

        let path = file.into_temp_path();
        let location = path.to_path_buf();
        register_temp(&location);
        Ok(Self {
            location,
            path: Some(path),
        })
    }

    /// Path of the temporary file.
    pub fn path(&self) -> &Path {
        &self.location
    }

    /// Atomically move the file over `dest`, replacing it if present.
    pub fn persist(mut self, dest: &Path) -> Result<()> {
        let Some(path) = self.path.take() else {
            return Ok(());
        };
        // On failure the returned TempPath is dropped with the error, removing the file
        path.persist(dest).map_err(|e| Error::Persist {
            path: dest.to_path_buf(),
            source: e.error,
        })
    }
}

impl Drop for TempWav {
    fn drop(&mut self) {
        // A remaining TempPath deletes the file when this guard's fields drop
        unregister_temp(&self.location);
    }
}

/// Global registry of live temporary files for cleanup on signal.
static ACTIVE_TEMP_FILES: LazyLock<Mutex<Vec<PathBuf>>> = LazyLock::new(|| Mutex::new(Vec::new()));

/// Register a temporary file for cleanup on signal.
pub fn register_temp(path: &Path) {
    if let Ok(mut files) = ACTIVE_TEMP_FILES.lock() {
        files.push(path.to_path_buf());
    }
}

/// Unregister a temporary file after normal cleanup.
pub fn unregister_temp(path: &Path) {
    if let Ok(mut files) = ACTIVE_TEMP_FILES.lock() {
        files.retain(|p| p != path);
    }
}

/// Remove every registered temporary file. Called on signal.
pub fn cleanup_all_temp_files() {
    if let Ok(mut files) = ACTIVE_TEMP_FILES.lock() {
        for path in files.drain(..) {
            let _ = fs::remove_file(path);
        }
    }
}

/// Whether `path` looks like a temporary file left by this module.
pub fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.') && n.ends_with(&format!("{TEMP_MARKER}.wav")))
}
