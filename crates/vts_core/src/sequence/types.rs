//! Sequence types and error definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::indexer::IndexerError;
use crate::models::FrameRate;

/// An opaque, sliceable sequence of decoded frames.
///
/// Title resolution never looks at pixels. It only needs to count,
/// slice, join and retime sequences.
pub trait FrameSequence: Clone + fmt::Debug {
    /// Number of frames in the sequence.
    fn frame_count(&self) -> u64;

    /// Frames `start..end`.
    ///
    /// Ends past the sequence are clipped, and a start past the end
    /// yields an empty sequence.
    fn slice(&self, start: u64, end: u64) -> Self;

    /// This sequence followed by `other`.
    fn concat(&self, other: &Self) -> Self;

    /// Copy of the sequence with an assigned frame rate.
    fn with_frame_rate(&self, fps: FrameRate) -> Self;

    /// Assigned frame rate, if any.
    fn frame_rate(&self) -> Option<FrameRate>;
}

/// Frame sequence described by ranges of source frame numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRanges {
    ranges: Vec<Range<u64>>,
    fps: Option<FrameRate>,
}

impl FrameRanges {
    /// Source frames `0..count`.
    pub fn contiguous(count: u64) -> Self {
        let ranges = if count > 0 { vec![0..count] } else { Vec::new() };
        Self { ranges, fps: None }
    }

    /// Source frame ranges making up the sequence, in order.
    pub fn ranges(&self) -> &[Range<u64>] {
        &self.ranges
    }

    /// Enumerate the underlying source frame numbers.
    pub fn source_frames(&self) -> impl Iterator<Item = u64> + '_ {
        self.ranges.iter().flat_map(|r| r.clone())
    }

    fn push(&mut self, range: Range<u64>) {
        if range.is_empty() {
            return;
        }
        match self.ranges.last_mut() {
            Some(last) if last.end == range.start => last.end = range.end,
            _ => self.ranges.push(range),
        }
    }
}

impl FrameSequence for FrameRanges {
    fn frame_count(&self) -> u64 {
        self.ranges.iter().map(|r| r.end - r.start).sum()
    }

    fn slice(&self, start: u64, end: u64) -> Self {
        let end = end.min(self.frame_count());
        let start = start.min(end);

        let mut out = Self {
            ranges: Vec::new(),
            fps: self.fps,
        };

        let mut position = 0u64;
        for range in &self.ranges {
            let len = range.end - range.start;
            let lo = start.max(position);
            let hi = end.min(position + len);
            if lo < hi {
                out.push(range.start + (lo - position)..range.start + (hi - position));
            }
            position += len;
            if position >= end {
                break;
            }
        }

        out
    }

    fn concat(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for range in &other.ranges {
            out.push(range.clone());
        }
        out.fps = self.fps.or(other.fps);
        out
    }

    fn with_frame_rate(&self, fps: FrameRate) -> Self {
        Self {
            ranges: self.ranges.clone(),
            fps: Some(fps),
        }
    }

    fn frame_rate(&self) -> Option<FrameRate> {
        self.fps
    }
}

/// Keyword arguments passed to an index source filter.
///
/// Values are kept verbatim, so strings must carry their own quotes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceArgs(BTreeMap<String, String>);

impl SourceArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an argument, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Arguments of `other` override ours.
    pub fn merged(&self, other: &SourceArgs) -> SourceArgs {
        let mut out = self.clone();
        out.0
            .extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for SourceArgs {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Errors that can occur while opening a frame sequence.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    /// The index could not be read.
    #[error(transparent)]
    Indexer(#[from] IndexerError),

    /// The sequence backend failed to open the index.
    #[error("Failed to open '{path}': {message}")]
    OpenFailed { path: PathBuf, message: String },

    /// The backend reported a variable frame rate.
    #[error("Variable frame rate sequence '{path}' is not supported")]
    VariableFrameRate { path: PathBuf },
}

/// Type alias for sequence results.
pub type SequenceResult<T> = Result<T, SequenceError>;
