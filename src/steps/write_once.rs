//! Write-once file creation for persisted host artifacts.
//!
//! An artifact is created only if absent. An existing file is never opened
//! for writing, so a rerun cannot change its contents.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::error::Result;

/// What [`write_once`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was created.
    Written,
    /// The file already existed and was left untouched.
    AlreadyExists,
    /// Dry run: the file is absent and would have been created.
    Skipped,
}

/// Create `path` with `contents` and `mode` unless it already exists.
///
/// Parent directories are created as needed. Creation uses `O_EXCL`, so a
/// file that appears concurrently is reported as existing, not clobbered.
pub fn write_once(path: &Path, contents: &str, mode: u32, dry_run: bool) -> Result<WriteOutcome> {
    if path.symlink_metadata().is_ok() {
        return Ok(WriteOutcome::AlreadyExists);
    }
    if dry_run {
        return Ok(WriteOutcome::Skipped);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = match options.open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Ok(WriteOutcome::AlreadyExists)
        }
        Err(e) => return Err(e.into()),
    };
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;

    tracing::debug!(path = %path.display(), "wrote file");
    Ok(WriteOutcome::Written)
}
