//! Single-instance guard for a library data directory

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::domain::result::{Error, Result};

const LOCK_FILENAME: &str = ".lock";

/// Exclusive advisory lock on `<data_dir>/.lock`, held until dropped
///
/// The data files assume one running instance; a second process opening the
/// same directory fails fast instead of racing on full-file rewrites.
#[derive(Debug)]
pub struct DirectoryLock {
    file: File,
    path: PathBuf,
}

impl DirectoryLock {
    pub fn acquire(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(LOCK_FILENAME);

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        file.try_lock_exclusive()
            .map_err(|_| Error::Locked(data_dir.display().to_string()))?;

        debug!("Acquired lock {}", path.display());
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DirectoryLock {
    fn drop(&mut self) {
        // closing the handle releases the lock too; unlock eagerly anyway
        let _ = FileExt::unlock(&self.file);
    }
}
