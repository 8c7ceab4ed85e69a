//! Core enums used throughout the crate.

use serde::{Deserialize, Serialize};

/// External tool used to index VOB files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexerKind {
    /// D2V Witch, writes `.d2v` project files.
    #[default]
    D2vWitch,
    /// DGIndexNV, writes `.dgi` index files.
    DgIndexNv,
}

impl IndexerKind {
    /// Get the display name for this indexer.
    pub fn name(&self) -> &'static str {
        match self {
            Self::D2vWitch => "D2V Witch",
            Self::DgIndexNv => "DGIndexNV",
        }
    }

    /// File extension of the index files this tool writes.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::D2vWitch => "d2v",
            Self::DgIndexNv => "dgi",
        }
    }

    /// Default executable name.
    pub fn executable(&self) -> &'static str {
        match self {
            Self::D2vWitch => "d2vwitch",
            Self::DgIndexNv => "DGIndexNV",
        }
    }

    /// VapourSynth function that opens this tool's index files.
    pub fn source_filter(&self) -> &'static str {
        match self {
            Self::D2vWitch => "d2v.Source",
            Self::DgIndexNv => "dgdecodenv.DGSource",
        }
    }

    /// Name of the source filter's index path argument.
    pub fn source_argument(&self) -> &'static str {
        match self {
            Self::D2vWitch => "input",
            Self::DgIndexNv => "source",
        }
    }

    /// Get all available indexers.
    pub fn all() -> &'static [IndexerKind] {
        &[Self::D2vWitch, Self::DgIndexNv]
    }
}

impl std::fmt::Display for IndexerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
