//! Resolver types and error definitions.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ifo::IfoError;
use crate::indexer::IndexerError;
use crate::models::{ChapterBoundaries, FrameRate};
use crate::mount::MountError;
use crate::sequence::{SequenceError, SourceArgs};
use crate::titles::{JoinedTitles, TitleError, TitleSet, MENU_SIZE_THRESHOLD};

/// Errors that can occur while resolving a disc.
#[derive(Error, Debug)]
pub enum DiscError {
    #[error(transparent)]
    Mount(#[from] MountError),

    #[error(transparent)]
    Ifo(#[from] IfoError),

    #[error(transparent)]
    Indexer(#[from] IndexerError),

    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error(transparent)]
    Title(#[from] TitleError),

    #[error("No VOB files found in '{0}'")]
    NoVobFilesFound(PathBuf),

    #[error("Failed to list '{path}': {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize disc layout: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Type alias for resolver results.
pub type DiscResult<T> = Result<T, DiscError>;

/// Non-fatal problems found while resolving a disc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscWarning {
    /// Chapters declare more frames than were decoded.
    BrokenChapters { declared: u64, decoded: u64 },
}

impl fmt::Display for DiscWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrokenChapters { declared, decoded } => write!(
                f,
                "The chapters are broken ({} frames declared, {} decoded): the last chapters \
                 and negative indices will probably fail. Enable safe indices to trim them.",
                declared, decoded
            ),
        }
    }
}

/// Options controlling how a disc is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Repair chapters that run past the decoded stream instead of warning.
    pub safe_indices: bool,
    /// Use the disc path as-is instead of descending into `VIDEO_TS`.
    pub force_root: bool,
    /// First-video size in bytes above which the disc has a menu segment.
    pub menu_size_threshold: u64,
    /// Extra source filter arguments.
    pub source_args: SourceArgs,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            safe_indices: false,
            force_root: false,
            menu_size_threshold: MENU_SIZE_THRESHOLD,
            source_args: SourceArgs::new(),
        }
    }
}

/// Split titles and their joined form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTitles<S> {
    pub titles: TitleSet<S>,
    pub joined: JoinedTitles<S>,
}

/// Serializable summary of a resolved disc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscLayout {
    pub disc: PathBuf,
    pub fps: FrameRate,
    /// Decoded frame count, menu segment included.
    pub total_frames: u64,
    pub menu_length: u64,
    pub titles: Vec<TitleLayout>,
    /// Merged boundaries of the joined sequence.
    pub joined_chapters: ChapterBoundaries,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DiscWarning>,
}

impl DiscLayout {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> DiscResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One entry of a [`DiscLayout`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleLayout {
    pub index: usize,
    /// Frames actually present in the title's slice.
    pub frames: u64,
    pub chapters: ChapterBoundaries,
    #[serde(default)]
    pub menu: bool,
}
