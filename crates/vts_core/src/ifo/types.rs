//! IFO types and error definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::{ChapterBoundaries, FrameRate};

/// Chapter data extracted from every title set of a disc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfoInfo {
    /// Chapter boundaries per title, in disc order.
    pub chapters: Vec<ChapterBoundaries>,
    /// Frame rate to assign to the decoded stream.
    pub fps: FrameRate,
    /// Whether the disc carries more than one VTS IFO file.
    pub multiple_ifos: bool,
}

impl IfoInfo {
    /// Number of titles found.
    pub fn title_count(&self) -> usize {
        self.chapters.len()
    }

    /// Sum of every title's declared frame length.
    pub fn total_frames(&self) -> u64 {
        self.chapters.iter().map(|c| c.total_frames()).sum()
    }
}

/// Errors that can occur while reading IFO files.
#[derive(Debug, thiserror::Error)]
pub enum IfoError {
    /// No IFO files to decode.
    #[error("No IFO files found")]
    NoIfoFilesFound,

    /// A program chain mixes frame rates.
    #[error("Title {title} mixes frame rates (codes {codes:?}); variable frame rate discs are not supported")]
    VariableFrameRate { title: usize, codes: Vec<u8> },

    /// A playback time carries a reserved frame-rate code.
    #[error("Title {title} uses unknown frame rate code {code}")]
    UnknownFrameRate { title: usize, code: u8 },

    /// A program chain has no chapters.
    #[error("Title {title} has no chapters")]
    EmptyProgramChain { title: usize },

    /// The IFO data could not be decoded.
    #[error("Malformed IFO '{path}': {message}")]
    Malformed { path: PathBuf, message: String },

    /// Failed to read an IFO file or list the mount directory.
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl IfoError {
    /// Create a malformed-data error.
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }
}

/// Type alias for IFO operation results.
pub type IfoResult<T> = Result<T, IfoError>;
