//! Joining titles back into one sequence.

use super::types::{JoinedTitles, TitleError, TitleResult, TitleSet};
use crate::models::ChapterBoundaries;
use crate::sequence::FrameSequence;

/// Concatenate every entry of `set` in order, menu segment last.
///
/// Boundaries of each later title are shifted by the merged list's last
/// value; their zero entries are dropped so seams don't repeat.
pub fn join_titles<S: FrameSequence>(set: &TitleSet<S>) -> TitleResult<JoinedTitles<S>> {
    let (first, rest) = set.titles().split_first().ok_or(TitleError::NoTitles)?;

    let mut sequence = first.sequence.clone();
    let mut merged = first.chapters.as_slice().to_vec();

    for title in rest {
        sequence = sequence.concat(&title.sequence);

        let shift = merged.last().copied().unwrap_or(0);
        merged.extend(
            title
                .chapters
                .iter()
                .filter(|&&b| b != 0)
                .map(|&b| b + shift),
        );
    }

    Ok(JoinedTitles {
        sequence,
        chapters: ChapterBoundaries::new(merged)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::FrameRanges;
    use crate::titles::split_titles;

    #[test]
    fn merges_boundaries_without_duplicate_zeros() {
        let seq = FrameRanges::contiguous(300);
        let chapters = vec![
            ChapterBoundaries::from_chapter_lengths([50, 50]),
            ChapterBoundaries::from_chapter_lengths([0, 200]),
        ];

        let joined = join_titles(&split_titles(&seq, &chapters, 0)).unwrap();
        assert_eq!(joined.chapters.as_slice(), &[0, 50, 100, 300]);
        assert_eq!(joined.sequence.frame_count(), 300);
    }

    #[test]
    fn split_then_join_keeps_length() {
        let seq = FrameRanges::contiguous(1000);
        let chapters = vec![
            ChapterBoundaries::from_chapter_lengths([100, 150]),
            ChapterBoundaries::from_chapter_lengths([250]),
            ChapterBoundaries::from_chapter_lengths([300, 200]),
        ];

        let joined = join_titles(&split_titles(&seq, &chapters, 0)).unwrap();
        assert_eq!(joined.sequence, seq);
        assert_eq!(joined.chapters.total_frames(), seq.frame_count());
    }

    #[test]
    fn menu_segment_is_joined_last() {
        let seq = FrameRanges::contiguous(110);
        let chapters = vec![ChapterBoundaries::from_chapter_lengths([100])];

        let joined = join_titles(&split_titles(&seq, &chapters, 10)).unwrap();
        assert_eq!(joined.sequence.ranges(), &[10..110, 0..10]);
        assert_eq!(joined.chapters.as_slice(), &[0, 100, 110]);
    }

    #[test]
    fn empty_set_has_nothing_to_join() {
        let seq = FrameRanges::contiguous(10);
        let set = split_titles(&seq, &[], 0);
        assert_eq!(join_titles(&set), Err(TitleError::NoTitles));
    }
}
