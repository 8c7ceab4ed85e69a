//! Chapter boundary lists.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a boundary list breaks its invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoundaryError {
    #[error("Chapter boundaries are empty")]
    Empty,

    #[error("Chapter boundaries must start at 0, found {0}")]
    NonZeroStart(u64),

    #[error("Chapter boundary {index} ({value}) is below the previous boundary ({previous})")]
    Decreasing { index: usize, value: u64, previous: u64 },
}

/// Cumulative chapter start offsets within one title.
///
/// Always starts at 0 and never decreases. The last entry is the title's
/// frame length, so a list of `n + 1` entries describes `n` chapters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct ChapterBoundaries(Vec<u64>);

impl ChapterBoundaries {
    /// Validate an explicit boundary list.
    pub fn new(offsets: Vec<u64>) -> Result<Self, BoundaryError> {
        let first = *offsets.first().ok_or(BoundaryError::Empty)?;
        if first != 0 {
            return Err(BoundaryError::NonZeroStart(first));
        }

        for (index, pair) in offsets.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(BoundaryError::Decreasing {
                    index: index + 1,
                    value: pair[1],
                    previous: pair[0],
                });
            }
        }

        Ok(Self(offsets))
    }

    /// Build boundaries from per-chapter frame lengths (leading 0, running sum).
    pub fn from_chapter_lengths(lengths: impl IntoIterator<Item = u64>) -> Self {
        let mut offsets = vec![0];
        let mut total = 0u64;
        for length in lengths {
            total += length;
            offsets.push(total);
        }
        Self(offsets)
    }

    /// Two-entry list `[0, length]` covering a single segment.
    pub fn single(length: u64) -> Self {
        Self(vec![0, length])
    }

    /// Boundary offsets as a slice.
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    /// Number of boundary entries (chapters + 1).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a validated list; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of chapters described.
    pub fn chapter_count(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Final boundary, i.e. the declared title length.
    pub fn total_frames(&self) -> u64 {
        self.0.last().copied().unwrap_or(0)
    }

    /// Boundary at `index`, if present.
    pub fn get(&self, index: usize) -> Option<u64> {
        self.0.get(index).copied()
    }

    /// Iterate over boundary offsets.
    pub fn iter(&self) -> impl Iterator<Item = &u64> {
        self.0.iter()
    }

    /// Consume into the raw offsets.
    pub fn into_inner(self) -> Vec<u64> {
        self.0
    }
}

impl AsRef<[u64]> for ChapterBoundaries {
    fn as_ref(&self) -> &[u64] {
        &self.0
    }
}

impl TryFrom<Vec<u64>> for ChapterBoundaries {
    type Error = BoundaryError;

    fn try_from(offsets: Vec<u64>) -> Result<Self, Self::Error> {
        Self::new(offsets)
    }
}

impl From<ChapterBoundaries> for Vec<u64> {
    fn from(boundaries: ChapterBoundaries) -> Self {
        boundaries.0
    }
}
