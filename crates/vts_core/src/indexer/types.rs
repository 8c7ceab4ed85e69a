//! Index file types and error definitions.
//!
//! Both indexers are normalised into [`IndexFileInfo`] so the title
//! splitter never needs to know which tool produced the index.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::IndexerKind;

/// A video file referenced by an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedVideo {
    /// Path of the VOB file.
    pub path: PathBuf,
    /// Size in bytes (declared by the index, or read from disk).
    pub size: u64,
}

/// One frame-data record (a GOP line) of an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDataRecord {
    /// Index of the video file this record belongs to.
    pub file: usize,
    /// Byte position of the record within its file (D2V) or the stream (DGI).
    pub position: u64,
    /// VOB id, when the indexer records it.
    pub vob: Option<u32>,
    /// Cell id, when the indexer records it.
    pub cell: Option<u32>,
    /// Number of frames described by this record.
    pub frames: u32,
}

/// Trailing statistics written by DGIndexNV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexFooter {
    /// Percentage of film (soft-telecined) frames.
    pub film: f64,
    /// Coded frame count.
    pub coded_frames: u64,
    /// Playback frame count after pulldown.
    pub playback_frames: u64,
    /// Field order reported by the indexer.
    pub order: Option<i32>,
}

/// Normalised contents of an index file, restricted to one track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexFileInfo {
    /// Tool that wrote the index.
    pub kind: IndexerKind,
    /// Path of the index file.
    pub path: PathBuf,
    /// Track (video file) the frame data was selected for.
    pub track: usize,
    /// Every video file referenced by the index.
    pub videos: Vec<IndexedVideo>,
    /// Frame-data records belonging to `track`.
    pub frame_data: Vec<FrameDataRecord>,
    /// Frame count of the whole indexed stream.
    pub total_frames: u64,
    /// DGIndexNV footer, if present.
    pub footer: Option<IndexFooter>,
}

impl IndexFileInfo {
    /// Size of the first indexed video file.
    pub fn first_video_size(&self) -> u64 {
        self.videos.first().map(|v| v.size).unwrap_or(0)
    }

    /// Whether the indexer reported the stream as 100% film.
    pub fn is_full_film(&self) -> bool {
        self.footer
            .as_ref()
            .map(|f| (f.film - 100.0).abs() < f64::EPSILON)
            .unwrap_or(false)
    }
}

/// Errors that can occur during indexing.
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    /// No files were given to index.
    #[error("At least one file is needed to build an index")]
    EmptyFileList,

    /// The indexer executable could not be launched.
    #[error("Failed to run {tool}: {message}")]
    ToolExecutionFailed { tool: String, message: String },

    /// The indexer exited with an error.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// The index does not carry the expected magic line.
    #[error("Unrecognised {kind} index file '{path}'")]
    Unrecognised { kind: IndexerKind, path: PathBuf },

    /// The index could not be parsed.
    #[error("Failed to parse index '{path}' at line {line}: {message}")]
    ParseError {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Requested track is not part of the index.
    #[error("Track {track} is out of range ({count} videos indexed)")]
    TrackOutOfRange { track: usize, count: usize },

    /// IO error on the index or a video file.
    #[error("Failed to access '{path}': {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl IndexerError {
    /// Create an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error.
    pub fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

/// Type alias for indexer results.
pub type IndexerResult<T> = Result<T, IndexerError>;
