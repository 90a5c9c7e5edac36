//! Scratch storage for uploads.
//!
//! The media engine reads from disk, so every in-memory upload is written to
//! one scratch file for the duration of a render. [`ScratchSpace`] owns those
//! files and deletes them when released or dropped, whichever comes first.

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use clipmix_common::error::ClipmixResult;

/// Scratch files belonging to one render invocation.
#[derive(Debug, Default)]
pub struct ScratchSpace {
    dir: Option<PathBuf>,
    files: Vec<NamedTempFile>,
}

impl ScratchSpace {
    /// Scratch space under `dir`, or the system temp dir when `None`.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir,
            files: Vec::new(),
        }
    }

    /// Write `bytes` to a fresh scratch file and return its path.
    pub fn stage_bytes(&mut self, bytes: &[u8]) -> ClipmixResult<PathBuf> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("clipmix-").suffix(".mp4");

        let mut file = match &self.dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempfile_in(dir)?
            }
            None => builder.tempfile()?,
        };
        file.write_all(bytes)?;
        file.flush()?;

        let path = file.path().to_path_buf();
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Staged upload");
        self.files.push(file);
        Ok(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Delete every scratch file. Files that are already gone are skipped
    /// silently; other failures are logged and otherwise ignored.
    pub fn release(&mut self) -> usize {
        let mut removed = 0;
        for file in self.files.drain(..) {
            let path = file.path().to_path_buf();
            match file.close() {
                Ok(()) => removed += 1,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    tracing::warn!(error = %err, path = %path.display(), "Failed to remove scratch file");
                }
            }
        }
        removed
    }
}

impl Drop for ScratchSpace {
    fn drop(&mut self) {
        self.release();
    }
}
