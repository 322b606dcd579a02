// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-request scratch files in a shared directory.
//
// Each request gets `printhook-<random>.pdf`.  The directory may be shared with
// the print server and with unrelated processes, so the stale-file sweep only
// ever touches names matching that pattern.
//
// A scratch file is removed when its handle is dropped, so a cancelled or
// panicking request cannot leave it behind.  Only `keep_temp_files` detaches
// the file from that guard.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempPath;
use tokio::fs::{self, File};
use tracing::{debug, info, instrument, warn};

use printhook_core::error::{PrinthookError, Result};

/// File name prefix of every scratch file this service creates.
pub const SCRATCH_PREFIX: &str = "printhook-";

/// File name suffix of every scratch file this service creates.
pub const SCRATCH_SUFFIX: &str = ".pdf";

/// Random bytes in a scratch name, as many as a v4 UUID carries.
const NAME_RAND_BYTES: usize = 16;

/// Scratch files older than this are reclaimed by [`ScratchDir::sweep`].
pub const STALE_AFTER: Duration = Duration::from_secs(60 * 60);

/// Whether `name` follows the scratch naming pattern.
pub fn is_scratch_name(name: &str) -> bool {
    name.len() > SCRATCH_PREFIX.len() + SCRATCH_SUFFIX.len()
        && name.starts_with(SCRATCH_PREFIX)
        && name.ends_with(SCRATCH_SUFFIX)
}

/// One request's scratch file.
///
/// Dropping it deletes the file unless it was created by a [`ScratchDir`]
/// that keeps files.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    guard: Option<TempPath>,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PartialEq for ScratchFile {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for ScratchFile {}

/// The shared scratch directory and its retention policy.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    dir: PathBuf,
    /// Keep files after use and skip the sweep (debugging aid).
    keep_files: bool,
}

impl ScratchDir {
    pub fn new(dir: impl Into<PathBuf>, keep_files: bool) -> Self {
        Self {
            dir: dir.into(),
            keep_files,
        }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if it does not exist yet.
    pub async fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            PrinthookError::ScratchFile(format!("create {}: {e}", self.dir.display()))
        })
    }

    /// Create a new, uniquely named scratch file opened for writing.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn create(&self) -> Result<(ScratchFile, File)> {
        let mut builder = tempfile::Builder::new();
        builder
            .prefix(SCRATCH_PREFIX)
            .suffix(SCRATCH_SUFFIX)
            .rand_bytes(NAME_RAND_BYTES);
        // The print server may read the directory as another user.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o644));
        }

        let (file, temp_path) = builder
            .tempfile_in(&self.dir)
            .map_err(|e| {
                PrinthookError::ScratchFile(format!("create in {}: {e}", self.dir.display()))
            })?
            .into_parts();

        let path = temp_path.to_path_buf();
        let guard = if self.keep_files {
            temp_path.keep().map_err(|e| {
                PrinthookError::ScratchFile(format!("keep {}: {e}", path.display()))
            })?;
            None
        } else {
            Some(temp_path)
        };

        debug!(path = %path.display(), "scratch file created");
        Ok((ScratchFile { path, guard }, File::from_std(file)))
    }

    /// Check that a written scratch file is readable and not empty.
    /// Returns its size in bytes.
    pub async fn validate(&self, file: &ScratchFile) -> Result<u64> {
        let handle = File::open(&file.path).await.map_err(|e| {
            PrinthookError::ScratchFile(format!("{} is not readable: {e}", file.path.display()))
        })?;
        let size = handle
            .metadata()
            .await
            .map_err(|e| {
                PrinthookError::ScratchFile(format!("stat {}: {e}", file.path.display()))
            })?
            .len();

        if size == 0 {
            return Err(PrinthookError::ScratchFile(format!(
                "{} is empty",
                file.path.display()
            )));
        }

        debug!(path = %file.path.display(), size, "scratch file validated");
        Ok(size)
    }

    /// Delete a scratch file unless files are kept. Returns whether the file
    /// was removed. Failures are logged, not returned.
    pub fn release(&self, file: ScratchFile) -> bool {
        let ScratchFile { path, guard } = file;
        let Some(guard) = guard else {
            info!(path = %path.display(), "keeping scratch file");
            return false;
        };

        match guard.close() {
            Ok(()) => {
                debug!(path = %path.display(), "scratch file removed");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to remove scratch file");
                false
            }
        }
    }

    /// Remove scratch files older than [`STALE_AFTER`].
    pub async fn sweep(&self) -> usize {
        self.sweep_older_than(STALE_AFTER).await
    }

    /// Remove scratch files whose modification time is more than `max_age`
    /// ago. Skipped entirely when files are kept. Returns the number removed.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn sweep_older_than(&self, max_age: Duration) -> usize {
        if self.keep_files {
            return 0;
        }

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "cannot read scratch directory for sweep");
                return 0;
            }
        };

        let now = SystemTime::now();
        let mut removed = 0;

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "scratch directory sweep interrupted");
                    break;
                }
            };

            let name = entry.file_name();
            if !name.to_str().is_some_and(is_scratch_name) {
                continue;
            }

            let modified = match entry.metadata().await.and_then(|m| {
                if m.is_file() {
                    m.modified()
                } else {
                    Err(std::io::Error::other("not a regular file"))
                }
            }) {
                Ok(modified) => modified,
                Err(_) => continue,
            };

            // Clock skew can put mtime in the future; such files are young.
            let age = now.duration_since(modified).unwrap_or_default();
            if age <= max_age {
                continue;
            }

            match fs::remove_file(entry.path()).await {
                Ok(()) => {
                    removed += 1;
                    debug!(path = %entry.path().display(), age_secs = age.as_secs(), "swept stale scratch file");
                }
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "failed to sweep scratch file");
                }
            }
        }

        if removed > 0 {
            info!(removed, "stale scratch files swept");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    async fn write_scratch(scratch: &ScratchDir, bytes: &[u8]) -> ScratchFile {
        let (file, mut handle) = scratch.create().await.unwrap();
        handle.write_all(bytes).await.unwrap();
        handle.flush().await.unwrap();
        file
    }

    fn age_file(path: &Path, age: Duration) {
        let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[test]
    fn scratch_name_pattern() {
        assert!(is_scratch_name("printhook-0f3a.pdf"));
        assert!(!is_scratch_name("printhook-.pdf"));
        assert!(!is_scratch_name("other-0f3a.pdf"));
        assert!(!is_scratch_name("printhook-0f3a.txt"));
    }

    #[tokio::test]
    async fn create_yields_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(dir.path(), false);

        let (a, _) = scratch.create().await.unwrap();
        let (b, _) = scratch.create().await.unwrap();
        assert_ne!(a, b);
        let name = a.path().file_name().unwrap().to_str().unwrap();
        assert!(is_scratch_name(name));
    }

    #[tokio::test]
    async fn validate_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(dir.path(), false);

        let empty = write_scratch(&scratch, b"").await;
        assert!(matches!(
            scratch.validate(&empty).await,
            Err(PrinthookError::ScratchFile(_))
        ));

        let full = write_scratch(&scratch, b"%PDF-1.7").await;
        assert_eq!(scratch.validate(&full).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn release_removes_unless_kept() {
        let dir = tempfile::tempdir().unwrap();

        let scratch = ScratchDir::new(dir.path(), false);
        let file = write_scratch(&scratch, b"%PDF").await;
        let path = file.path().to_path_buf();
        assert!(scratch.release(file));
        assert!(!path.exists());

        let keeping = ScratchDir::new(dir.path(), true);
        let kept = write_scratch(&keeping, b"%PDF").await;
        let kept_path = kept.path().to_path_buf();
        assert!(!keeping.release(kept));
        assert!(kept_path.exists());
    }

    #[tokio::test]
    async fn release_tolerates_a_vanished_file() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(dir.path(), false);

        let file = write_scratch(&scratch, b"%PDF").await;
        std::fs::remove_file(file.path()).unwrap();
        assert!(!scratch.release(file));
    }

    #[tokio::test]
    async fn dropping_the_handle_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();

        let scratch = ScratchDir::new(dir.path(), false);
        let file = write_scratch(&scratch, b"%PDF").await;
        let path = file.path().to_path_buf();
        assert!(path.exists());
        drop(file);
        assert!(!path.exists());

        let keeping = ScratchDir::new(dir.path(), true);
        let kept = write_scratch(&keeping, b"%PDF").await;
        let kept_path = kept.path().to_path_buf();
        drop(kept);
        assert!(kept_path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn scratch_files_are_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(dir.path(), false);
        let file = write_scratch(&scratch, b"%PDF").await;

        let mode = std::fs::metadata(file.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o004, 0o004);
    }

    #[tokio::test]
    async fn sweep_removes_only_stale_scratch_files() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(dir.path(), false);

        let stale = write_scratch(&scratch, b"%PDF").await;
        age_file(stale.path(), Duration::from_secs(2 * 60 * 60));
        let fresh = write_scratch(&scratch, b"%PDF").await;

        let foreign = dir.path().join("someone-else.pdf");
        std::fs::write(&foreign, b"%PDF").unwrap();
        age_file(&foreign, Duration::from_secs(2 * 60 * 60));

        assert_eq!(scratch.sweep().await, 1);
        assert!(!stale.path().exists());
        assert!(fresh.path().exists());
        assert!(foreign.exists());
    }

    #[tokio::test]
    async fn sweep_is_skipped_when_keeping_files() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(dir.path(), true);

        let stale = write_scratch(&scratch, b"%PDF").await;
        age_file(stale.path(), Duration::from_secs(2 * 60 * 60));

        assert_eq!(scratch.sweep().await, 0);
        assert!(stale.path().exists());
    }

    #[tokio::test]
    async fn ensure_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(dir.path().join("a").join("b"), false);
        scratch.ensure().await.unwrap();
        assert!(scratch.path().is_dir());
    }
}
