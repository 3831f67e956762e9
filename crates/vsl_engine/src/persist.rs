use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("download directory {dir:?} is unusable: {source}")]
    OutputDir { dir: PathBuf, source: io::Error },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Creates `dir` and its parents as needed. Fails when the path exists but
/// is not a directory.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    fs::create_dir_all(dir).map_err(|source| PersistError::OutputDir {
        dir: dir.to_path_buf(),
        source,
    })
}

/// Writes files under `dir` through a temp file that is renamed into place,
/// so a failed or interrupted write never leaves a partial target.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Starts a streamed write. Nothing appears under the target name until
    /// [`PendingFile::commit`].
    pub fn begin(&self) -> Result<PendingFile, PersistError> {
        ensure_output_dir(&self.dir)?;
        let tmp = NamedTempFile::new_in(&self.dir)?;
        Ok(PendingFile {
            dir: self.dir.clone(),
            tmp,
            written: 0,
        })
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        let mut pending = self.begin()?;
        pending.write_chunk(content)?;
        pending.commit(filename)
    }
}

pub struct PendingFile {
    dir: PathBuf,
    tmp: NamedTempFile,
    written: u64,
}

impl PendingFile {
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), PersistError> {
        self.tmp.write_all(chunk)?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Moves the finished video under `filename`, replacing an earlier
    /// download of the same name.
    pub fn commit(mut self, filename: &str) -> Result<PathBuf, PersistError> {
        self.tmp.flush()?;
        self.tmp.as_file().sync_all()?;

        let target = self.dir.join(filename);
        self.tmp.persist(&target).map_err(|err| err.error)?;
        Ok(target)
    }
}
