use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid json in {path}: {message}")]
    Json { path: String, message: String },
}

/// What a no-clobber write did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Created(PathBuf),
    AlreadyExists(PathBuf),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Writes `{dir}/{filename}` through a temp file in the same directory, so
/// the final name only ever holds complete content.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write, replacing any existing file.
    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        let target = self.dir.join(filename);
        let tmp = self.stage(content)?;
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }

    /// Write only if nothing exists under `filename` yet.
    pub fn write_new(&self, filename: &str, content: &str) -> Result<WriteOutcome, PersistError> {
        let target = self.dir.join(filename);
        if target.exists() {
            return Ok(WriteOutcome::AlreadyExists(target));
        }
        let tmp = self.stage(content)?;
        match tmp.persist_noclobber(&target) {
            Ok(_) => Ok(WriteOutcome::Created(target)),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                Ok(WriteOutcome::AlreadyExists(target))
            }
            Err(e) => Err(PersistError::Io(e.error)),
        }
    }

    fn stage(&self, content: &str) -> Result<NamedTempFile, PersistError> {
        ensure_output_dir(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        Ok(tmp)
    }
}
