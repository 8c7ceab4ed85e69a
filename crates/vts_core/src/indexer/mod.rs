//! VOB indexing through external indexer tools.
//!
//! Indexers build an index file over the VOBs of a disc, which the
//! sequence provider then opens for frame-accurate decoding. Each tool
//! writes its own format; [`DvdIndexer::get_info`] normalises them into
//! [`IndexFileInfo`].
//!
//! # Usage
//!
//! ```ignore
//! use vts_core::indexer::{index_files, D2vWitch, DvdIndexer};
//!
//! let indexer = D2vWitch::new();
//! let index_path = indexer.index_path(Path::new("/discs/MOVIE"));
//! let info = index_files(&indexer, &vob_files, &index_path)?;
//! println!("{} frames indexed", info.total_frames);
//! ```

mod configured;
mod d2v;
mod dgi;
mod types;

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use sha2::{Digest, Sha256};

pub use configured::ConfiguredIndexer;
pub use d2v::D2vWitch;
pub use dgi::DgIndexNv;
pub use types::{
    FrameDataRecord, IndexFileInfo, IndexFooter, IndexedVideo, IndexerError, IndexerResult,
};

use crate::models::IndexerKind;

/// An external tool that indexes VOB files.
pub trait DvdIndexer {
    /// Which tool this is.
    fn kind(&self) -> IndexerKind;

    /// Index file location for a disc or media path.
    fn index_path(&self, media: &Path) -> PathBuf;

    /// Build a fresh index over `files`.
    fn build_index(&self, files: &[PathBuf], index_path: &Path) -> IndexerResult<()>;

    /// Point an existing index at the current locations of `files`.
    fn update_index(&self, index_path: &Path, files: &[PathBuf]) -> IndexerResult<()>;

    /// Read an index, selecting frame data for `track`.
    fn get_info(&self, index_path: &Path, track: usize) -> IndexerResult<IndexFileInfo>;
}

/// Make sure `index_path` indexes `files` and return its track 0 info.
///
/// Missing indexes are built. A zero-byte index (an interrupted previous
/// run) is removed and rebuilt. Existing indexes are updated in place.
pub fn index_files(
    indexer: &dyn DvdIndexer,
    files: &[PathBuf],
    index_path: &Path,
) -> IndexerResult<IndexFileInfo> {
    if files.is_empty() {
        return Err(IndexerError::EmptyFileList);
    }

    if !index_path.is_file() {
        tracing::info!(
            "Building {} index {}",
            indexer.kind(),
            index_path.display()
        );
        indexer.build_index(files, index_path)?;
    } else {
        let size = fs::metadata(index_path)
            .map_err(|e| IndexerError::io(index_path, e))?
            .len();

        if size == 0 {
            tracing::warn!("Index {} is empty, rebuilding", index_path.display());
            fs::remove_file(index_path).map_err(|e| IndexerError::io(index_path, e))?;
            indexer.build_index(files, index_path)?;
        }

        indexer.update_index(index_path, files)?;
    }

    indexer.get_info(index_path, 0)
}

/// Index file location for `media`.
///
/// Without an index directory the index sits next to the media with the
/// tool's extension. With one, the file name carries a SHA-256 prefix of
/// the media path so discs with the same name don't collide.
pub fn index_path_for(media: &Path, kind: IndexerKind, index_dir: Option<&Path>) -> PathBuf {
    let Some(dir) = index_dir else {
        return media.with_extension(kind.extension());
    };

    let mut hasher = Sha256::new();
    hasher.update(media.to_string_lossy().as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    let stem = media
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "disc".to_string());

    dir.join(format!("{}_{}.{}", stem, &hash[..12], kind.extension()))
}

/// Run an indexer executable to completion.
fn run_tool(executable: &str, args: &[OsString]) -> IndexerResult<()> {
    tracing::debug!(
        "$ {} {}",
        executable,
        args.iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let output = Command::new(executable)
        .args(args)
        .output()
        .map_err(|e| IndexerError::ToolExecutionFailed {
            tool: executable.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(IndexerError::CommandFailed {
            tool: executable.to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}

/// A block of consecutive non-blank lines.
struct Section<'a> {
    /// 1-based line number of the first line.
    first_line: usize,
    lines: Vec<&'a str>,
}

/// Split index text into blank-line separated sections.
fn split_sections(content: &str) -> Vec<Section<'_>> {
    let mut sections = Vec::new();
    let mut current: Option<Section<'_>> = None;

    for (i, raw) in content.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            continue;
        }

        current
            .get_or_insert_with(|| Section {
                first_line: i + 1,
                lines: Vec::new(),
            })
            .lines
            .push(line);
    }

    if let Some(section) = current {
        sections.push(section);
    }

    sections
}

/// Replace the first section of an index file with `head`, keeping the
/// rest byte-for-byte. Returns `None` if nothing changed.
fn replace_head(content: &str, head: &[String]) -> Option<String> {
    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };

    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if line.trim().is_empty() {
            break;
        }
        offset += line.len();
    }

    let mut new_head = head.join(newline);
    new_head.push_str(newline);

    if content[..offset] == new_head {
        return None;
    }

    Some(format!("{}{}", new_head, &content[offset..]))
}
