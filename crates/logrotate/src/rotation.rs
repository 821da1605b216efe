//! Live file ownership and the rotate/prune cycle

use chrono::{DateTime, SecondsFormat, Utc};
use logrotate_core::{constants, Error, Result, RotateConfig};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::scan;

/// Timestamp suffix for a rotated file: RFC3339 in UTC with `:` replaced by `-`
pub fn rotation_suffix(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true).replace(':', "-")
}

/// Path a live file is renamed to when rotated at `at`
pub fn rotated_path(live: &Path, at: DateTime<Utc>) -> PathBuf {
    let mut name = live.as_os_str().to_os_string();
    name.push(".");
    name.push(rotation_suffix(at));
    PathBuf::from(name)
}

/// Create the parent directory of `path` if it is missing
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if parent.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(constants::DIR_MODE);
    }
    builder
        .create(parent)
        .map_err(|e| Error::create_dir(parent, e))
}

fn open_append(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(constants::FILE_MODE);
    }
    options.open(path)
}

/// The live log file and the number of bytes it holds.
///
/// Owned by exactly one thread. Rotated files are never tracked here; they are
/// rediscovered from the directory on every rotation.
pub struct ActiveFile {
    config: RotateConfig,
    file: Option<File>,
    current_size: u64,
    list_siblings: fn(&Path) -> io::Result<Vec<PathBuf>>,
}

impl ActiveFile {
    /// Create the log directory if needed and open the live file
    pub fn open(config: RotateConfig) -> Result<Self> {
        ensure_parent_dir(&config.path)?;

        let mut active = Self {
            config,
            file: None,
            current_size: 0,
            list_siblings: scan::sibling_logs,
        };
        active.reopen()?;
        Ok(active)
    }

    /// Open (or create) the live file, rotating first if it is already
    /// larger than `max_size`
    pub fn reopen(&mut self) -> Result<()> {
        self.open_live()?;
        if self.current_size > self.config.max_size {
            self.rotate()?;
        }
        Ok(())
    }

    fn open_live(&mut self) -> Result<()> {
        self.file = None;

        let path = &self.config.path;
        let file = open_append(path).map_err(|e| Error::open(path, e))?;
        let size = file.metadata().map_err(|e| Error::open(path, e))?.len();

        debug!("Opened log file {} ({} bytes)", path.display(), size);
        self.file = Some(file);
        self.current_size = size;
        Ok(())
    }

    fn handle(&mut self) -> Result<&mut File> {
        if self.file.is_none() {
            self.reopen()?;
        }
        self.file.as_mut().ok_or_else(|| {
            Error::open(
                &self.config.path,
                io::Error::new(io::ErrorKind::NotFound, "live file is not open"),
            )
        })
    }

    /// Append one payload and rotate once the threshold is reached.
    ///
    /// If the write fails the live file is reopened and the payload is
    /// dropped, not retried. When no file is open (an earlier reopen failed)
    /// opening is retried here first. An `Err` always means the payload was
    /// dropped; rotation failures after a successful write are only logged.
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        if let Err(e) = self.handle()?.write_all(data) {
            warn!(
                "Write to {} failed, dropping {} bytes and reopening: {}",
                self.config.path.display(),
                data.len(),
                e
            );
            self.reopen()?;
            return Err(Error::IoError(e));
        }

        self.current_size += data.len() as u64;
        if self.current_size >= self.config.max_size {
            // The payload is on disk; a failed reopen is retried by the next
            // append.
            if let Err(e) = self.rotate() {
                warn!(
                    "Rotation of {} failed after write: {}",
                    self.config.path.display(),
                    e
                );
            }
        }
        Ok(())
    }

    /// Move the live file aside, start a fresh one and prune old rotations.
    ///
    /// A failed rename is logged and rotation carries on with the existing
    /// file. A failed directory listing only skips pruning.
    pub fn rotate(&mut self) -> Result<()> {
        self.file = None;

        let target = rotated_path(&self.config.path, Utc::now());
        debug!(
            "Rotating log file: {} -> {}",
            self.config.path.display(),
            target.display()
        );
        let renamed = match fs::rename(&self.config.path, &target) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "Failed to rename {} to {}: {}",
                    self.config.path.display(),
                    target.display(),
                    e
                );
                false
            }
        };

        self.open_live()?;
        // Only retry while renames succeed, otherwise an oversized file that
        // cannot be moved would rotate forever.
        if renamed && self.current_size > self.config.max_size {
            return self.rotate();
        }

        if let Err(e) = self.prune() {
            warn!(
                "Skipping retention for {}: {}",
                self.config.path.display(),
                e
            );
        }
        Ok(())
    }

    /// Delete rotated files beyond `max_files`, keeping the newest.
    ///
    /// Entries are ordered by name, newest first, which the fixed-width UTC
    /// suffix makes chronological. The live file is never deleted.
    pub fn prune(&self) -> io::Result<Vec<PathBuf>> {
        let mut entries = (self.list_siblings)(&self.config.path)?;
        entries.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

        let live_name = self.config.path.file_name();
        let mut kept = 0;
        let mut removed = Vec::new();
        for entry in entries {
            if kept < self.config.max_files {
                kept += 1;
                continue;
            }
            if entry.file_name() == live_name {
                continue;
            }
            match fs::remove_file(&entry) {
                Ok(()) => {
                    debug!("Removed old log file {}", entry.display());
                    removed.push(entry);
                }
                Err(e) => warn!("Failed to remove old log file {}: {}", entry.display(), e),
            }
        }
        Ok(removed)
    }

    /// Close the live file, syncing it to disk first
    pub fn close(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = file.sync_all() {
                warn!("Failed to sync {}: {}", self.config.path.display(), e);
            }
            debug!("Closed log file {}", self.config.path.display());
        }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Bytes in the live file since it was opened
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}
