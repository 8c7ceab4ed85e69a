//! Resolving chapter queries into frame ranges.

use std::ops::Range;

use super::types::{ChapterQuery, FrameSelection, Selection, TitleError, TitleResult};
use crate::models::ChapterBoundaries;
use crate::sequence::FrameSequence;

/// Resolve `query` against `boundaries` into exclusive-end frame ranges.
///
/// A single chapter `c` selects `boundaries[c]..boundaries[c + 1]`;
/// negative `c` counts chapters from the end. A range selects its
/// chapters inclusively: an open start is the first chapter, an open end
/// runs to the last boundary, and a negative end `e` stops at boundary
/// `len + e`, so `-1` includes the last chapter. On `[0, 100, 200, 300]`
/// the range `(1, -1)` is `100..300` and `(-1, -1)` is `200..300`.
pub fn resolve_chapters(
    boundaries: &ChapterBoundaries,
    query: &ChapterQuery,
) -> TitleResult<FrameSelection> {
    match query {
        ChapterQuery::Single(chapter) => {
            single_chapter(boundaries, *chapter).map(FrameSelection::Range)
        }
        ChapterQuery::Range(start, end) => {
            chapter_range(boundaries, *start, *end).map(FrameSelection::Range)
        }
        ChapterQuery::Many(queries) => queries
            .iter()
            .map(|q| resolve_chapters(boundaries, q))
            .collect::<TitleResult<Vec<_>>>()
            .map(FrameSelection::Many),
    }
}

/// Slice `sequence` by the ranges `query` selects.
pub fn select_chapters<S: FrameSequence>(
    sequence: &S,
    boundaries: &ChapterBoundaries,
    query: &ChapterQuery,
) -> TitleResult<Selection<S>> {
    Ok(apply_selection(sequence, &resolve_chapters(boundaries, query)?))
}

fn apply_selection<S: FrameSequence>(sequence: &S, selection: &FrameSelection) -> Selection<S> {
    match selection {
        FrameSelection::Range(range) => Selection::Single(sequence.slice(range.start, range.end)),
        FrameSelection::Many(items) => {
            Selection::Many(items.iter().map(|s| apply_selection(sequence, s)).collect())
        }
    }
}

/// Boundary at a signed index, failing outside `0..len`.
fn boundary_at(boundaries: &ChapterBoundaries, index: i64) -> TitleResult<u64> {
    usize::try_from(index)
        .ok()
        .and_then(|i| boundaries.get(i))
        .ok_or(TitleError::ChapterOutOfRange {
            index,
            len: boundaries.len(),
        })
}

fn single_chapter(boundaries: &ChapterBoundaries, chapter: i64) -> TitleResult<Range<u64>> {
    let len = boundaries.len() as i64;

    let (start, end) = if chapter == len - 1 {
        (len - 2, len - 1)
    } else if chapter == 0 {
        (0, 1)
    } else if chapter < 0 {
        (len - 1 + chapter, len + chapter)
    } else {
        let end = chapter
            .checked_add(1)
            .ok_or_else(|| out_of_range(boundaries, chapter))?;
        (chapter, end)
    };

    let start_frame =
        boundary_at(boundaries, start).map_err(|_| out_of_range(boundaries, chapter))?;
    let end_frame = boundary_at(boundaries, end).map_err(|_| out_of_range(boundaries, chapter))?;
    Ok(start_frame..end_frame)
}

fn chapter_range(
    boundaries: &ChapterBoundaries,
    start: Option<i64>,
    end: Option<i64>,
) -> TitleResult<Range<u64>> {
    let len = boundaries.len() as i64;

    let start_index = match start {
        None => 0,
        Some(s) if s < 0 => len - 1 + s,
        Some(s) => s,
    };

    let end_index = match end {
        None => len - 1,
        // Negative ends are inclusive of the chapter they name
        Some(e) if e < 0 => len + e,
        Some(e) => e.checked_add(1).ok_or_else(|| out_of_range(boundaries, e))?,
    };

    let start_frame = boundary_at(boundaries, start_index)
        .map_err(|_| out_of_range(boundaries, start.unwrap_or(0)))?;
    let end_frame = boundary_at(boundaries, end_index)
        .map_err(|_| out_of_range(boundaries, end.unwrap_or(len - 1)))?;

    if start_index > end_index {
        return Err(TitleError::ReversedRange {
            start: start_index as usize,
            end: end_index as usize,
        });
    }

    Ok(start_frame..end_frame)
}

fn out_of_range(boundaries: &ChapterBoundaries, index: i64) -> TitleError {
    TitleError::ChapterOutOfRange {
        index,
        len: boundaries.len(),
    }
}
