//! Disc mount resolution and file discovery.
//!
//! Mounting ISO images is left to external providers implementing
//! [`MountProvider`]. [`DirectoryMount`] handles discs that are already
//! extracted to a directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Name of the DVD video directory and its menu files.
pub const VIDEO_TS: &str = "VIDEO_TS";

/// Errors that can occur while resolving a mount path.
#[derive(Error, Debug)]
pub enum MountError {
    #[error("Path needs to point to an ISO image or the root of a DVD: {0}")]
    InvalidPath(PathBuf),

    #[error("Cannot mount disc image '{0}' without an image mount provider")]
    Unsupported(PathBuf),

    #[error("Mount failed for '{path}': {message}")]
    MountFailed { path: PathBuf, message: String },
}

/// Result type for mount operations.
pub type MountResult<T> = Result<T, MountError>;

/// Resolves a disc (image or directory) to the root directory of its
/// file system. [`video_ts_dir`] then locates the IFO and VOB files.
pub trait MountProvider {
    /// Return the root directory of the mounted disc.
    fn mount_path(&self, disc: &Path) -> MountResult<PathBuf>;
}

/// Mount provider for discs extracted to a directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryMount;

impl MountProvider for DirectoryMount {
    fn mount_path(&self, disc: &Path) -> MountResult<PathBuf> {
        if disc.is_file() {
            return Err(MountError::Unsupported(disc.to_path_buf()));
        }
        if !disc.is_dir() {
            return Err(MountError::InvalidPath(disc.to_path_buf()));
        }

        Ok(disc.to_path_buf())
    }
}

/// Locate the `VIDEO_TS` directory of a disc root.
///
/// A path that already names `VIDEO_TS` is treated as its own folder.
pub fn video_ts_dir(root: &Path, force_root: bool) -> PathBuf {
    if force_root {
        return root.to_path_buf();
    }

    let is_video_ts = root
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.eq_ignore_ascii_case(VIDEO_TS))
        .unwrap_or(false);

    match root.parent() {
        Some(parent) if is_video_ts => parent.join(VIDEO_TS),
        _ if is_video_ts => root.to_path_buf(),
        _ => root.join(VIDEO_TS),
    }
}

/// List files with the given extension (case-insensitive), sorted by
/// name, skipping the `VIDEO_TS` menu files.
pub fn list_disc_files(dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(extension))
            .unwrap_or(false);

        let is_menu = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.eq_ignore_ascii_case(VIDEO_TS))
            .unwrap_or(false);

        if matches_ext && !is_menu {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
