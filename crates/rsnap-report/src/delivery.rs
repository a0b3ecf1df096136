//! Handing finished artifacts to their destination.

use crate::error::{ExportError, Result};
use crate::namer::{truncate_bytes, MAX_FILE_NAME_BYTES};
use crate::snapshot::ExportArtifact;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use tracing::debug;

/// Upper bound on ` (n)` suffixes tried before giving up.
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// Destination of exported documents.
pub trait Delivery {
    /// Deliver an artifact, returning where it ended up.
    fn deliver(&self, artifact: &ExportArtifact) -> Result<PathBuf>;
}

impl<D: Delivery + ?Sized> Delivery for &D {
    fn deliver(&self, artifact: &ExportArtifact) -> Result<PathBuf> {
        (**self).deliver(artifact)
    }
}

/// Writes artifacts into a directory.
///
/// Writes go through a temporary file in the same directory that is then
/// linked under its final name, so a reader never sees a partial document.
/// Linking fails instead of replacing, so an existing file is never
/// overwritten: `name.html` becomes `name (1).html`, `name (2).html`...
#[derive(Debug, Clone)]
pub struct FileDelivery {
    dir: PathBuf,
}

impl FileDelivery {
    /// Deliver into `dir`, created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn io_error(&self, artifact: &ExportArtifact, source: std::io::Error) -> ExportError {
        ExportError::DeliveryError {
            file_name: artifact.file_name.clone(),
            dir: self.dir.clone(),
            source,
        }
    }
}

impl Delivery for FileDelivery {
    fn deliver(&self, artifact: &ExportArtifact) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|e| self.io_error(artifact, e))?;

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| self.io_error(artifact, e))?;
        tmp.write_all(artifact.document.as_bytes())
            .map_err(|e| self.io_error(artifact, e))?;
        let _ = tmp.as_file().sync_all();

        for attempt in 0..=MAX_NAME_ATTEMPTS {
            let target = self.dir.join(candidate_name(&artifact.file_name, attempt));
            match tmp.persist_noclobber(&target) {
                Ok(_) => {
                    debug!(path = %target.display(), bytes = artifact.len(), "artifact written");
                    return Ok(target);
                }
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => tmp = e.file,
                Err(e) => return Err(self.io_error(artifact, e.error)),
            }
        }

        Err(self.io_error(
            artifact,
            std::io::Error::new(ErrorKind::AlreadyExists, "no free file name"),
        ))
    }
}

/// `name.html` for attempt 0, then `name (n).html`, browser-download style.
///
/// The stem is shortened so the result stays within [`MAX_FILE_NAME_BYTES`].
fn candidate_name(file_name: &str, attempt: u32) -> String {
    let (stem, ext) = match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name.split_at(idx),
        _ => (file_name, ""),
    };
    let suffix = if attempt == 0 {
        String::new()
    } else {
        format!(" ({attempt})")
    };
    let room = MAX_FILE_NAME_BYTES.saturating_sub(suffix.len() + ext.len());
    format!("{}{suffix}{ext}", truncate_bytes(stem, room))
}

/// Keeps artifacts in memory.
#[derive(Debug, Default)]
pub struct MemoryDelivery {
    artifacts: Mutex<Vec<ExportArtifact>>,
}

impl MemoryDelivery {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far.
    pub fn artifacts(&self) -> Vec<ExportArtifact> {
        self.artifacts
            .lock()
            .map(|a| a.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Most recent artifact.
    pub fn last(&self) -> Option<ExportArtifact> {
        self.artifacts().pop()
    }
}

impl Delivery for MemoryDelivery {
    fn deliver(&self, artifact: &ExportArtifact) -> Result<PathBuf> {
        let mut artifacts = self
            .artifacts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        artifacts.push(artifact.clone());
        Ok(PathBuf::from(&artifact.file_name))
    }
}
