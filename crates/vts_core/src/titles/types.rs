//! Title types and error definitions.

use std::ops::Range;

use thiserror::Error;

use crate::models::{BoundaryError, ChapterBoundaries};

/// One title: its slice of the decoded sequence and its chapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title<S> {
    pub sequence: S,
    pub chapters: ChapterBoundaries,
}

/// Per-title split of a decoded sequence.
///
/// When the disc carries a menu segment it is the last entry, with
/// boundaries `[0, menu_length]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleSet<S> {
    titles: Vec<Title<S>>,
    menu_length: u64,
}

impl<S> TitleSet<S> {
    pub(crate) fn new(titles: Vec<Title<S>>, menu_length: u64) -> Self {
        Self {
            titles,
            menu_length,
        }
    }

    /// Every entry, menu segment included.
    pub fn titles(&self) -> &[Title<S>] {
        &self.titles
    }

    pub fn get(&self, index: usize) -> Option<&Title<S>> {
        self.titles.get(index)
    }

    /// Number of entries, menu segment included.
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Frame length of the leading menu segment, 0 when there is none.
    pub fn menu_length(&self) -> u64 {
        self.menu_length
    }

    /// The trailing menu entry, if any.
    pub fn menu(&self) -> Option<&Title<S>> {
        if self.menu_length > 0 {
            self.titles.last()
        } else {
            None
        }
    }

    /// Chapter boundaries of every entry, menu segment included.
    pub fn chapters(&self) -> Vec<ChapterBoundaries> {
        self.titles.iter().map(|t| t.chapters.clone()).collect()
    }
}

/// Titles concatenated back into one sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedTitles<S> {
    pub sequence: S,
    /// Merged boundaries across every title.
    pub chapters: ChapterBoundaries,
}

/// A chapter query against one boundary list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterQuery {
    /// One chapter; negative values count from the end (`-1` is the last).
    Single(i64),
    /// Inclusive chapter range. Open ends run to the first or last chapter.
    Range(Option<i64>, Option<i64>),
    /// Several queries resolved independently.
    Many(Vec<ChapterQuery>),
}

impl From<i64> for ChapterQuery {
    fn from(chapter: i64) -> Self {
        Self::Single(chapter)
    }
}

impl From<(Option<i64>, Option<i64>)> for ChapterQuery {
    fn from((start, end): (Option<i64>, Option<i64>)) -> Self {
        Self::Range(start, end)
    }
}

impl From<(i64, i64)> for ChapterQuery {
    fn from((start, end): (i64, i64)) -> Self {
        Self::Range(Some(start), Some(end))
    }
}

impl<Q: Into<ChapterQuery>> FromIterator<Q> for ChapterQuery {
    fn from_iter<T: IntoIterator<Item = Q>>(iter: T) -> Self {
        Self::Many(iter.into_iter().map(Into::into).collect())
    }
}

/// Frame ranges selected by a [`ChapterQuery`], shaped like the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSelection {
    Range(Range<u64>),
    Many(Vec<FrameSelection>),
}

/// Sequence slices selected by a [`ChapterQuery`], shaped like the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<S> {
    Single(S),
    Many(Vec<Selection<S>>),
}

impl<S> Selection<S> {
    /// The single sequence, if this is not a list.
    pub fn into_single(self) -> Option<S> {
        match self {
            Self::Single(seq) => Some(seq),
            Self::Many(_) => None,
        }
    }

    /// Every selected sequence in query order.
    pub fn flatten(self) -> Vec<S> {
        match self {
            Self::Single(seq) => vec![seq],
            Self::Many(items) => items.into_iter().flat_map(Selection::flatten).collect(),
        }
    }
}

/// Errors that can occur while splitting, joining or querying titles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TitleError {
    #[error("No titles to join")]
    NoTitles,

    #[error("Title {title} is out of range ({count} titles)")]
    TitleOutOfRange { title: usize, count: usize },

    #[error("Chapter index {index} is out of range for {len} boundaries")]
    ChapterOutOfRange { index: i64, len: usize },

    #[error("Chapter range {start}..={end} is reversed")]
    ReversedRange { start: usize, end: usize },

    #[error("Invalid chapter boundaries: {0}")]
    InvalidBoundaries(#[from] BoundaryError),

    #[error("Cannot clamp title {title} to {total} frames (menu {menu_length}, {count} titles)")]
    InvalidCorrection {
        title: usize,
        total: u64,
        menu_length: u64,
        count: usize,
    },
}

/// Type alias for title results.
pub type TitleResult<T> = Result<T, TitleError>;
