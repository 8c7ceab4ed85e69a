//! Cutting the decoded sequence into titles.

use super::types::{Title, TitleSet};
use crate::indexer::IndexFileInfo;
use crate::models::ChapterBoundaries;
use crate::sequence::FrameSequence;

/// Default first-video size above which the disc has a menu segment.
pub const MENU_SIZE_THRESHOLD: u64 = 2 << 12;

/// Frame length of the menu segment heading the decoded stream.
///
/// A first video larger than `threshold` bytes holds a real menu, one
/// frame per frame-data record of that video.
pub fn dvd_menu_length(info: &IndexFileInfo, threshold: u64) -> u64 {
    if info.first_video_size() > threshold {
        info.frame_data.len() as u64
    } else {
        0
    }
}

/// Split `sequence` into one entry per title.
///
/// The first `menu_length` frames are dropped before slicing and, when
/// non-empty, appended as a final entry with boundaries `[0, menu_length]`.
pub fn split_titles<S: FrameSequence>(
    sequence: &S,
    chapters: &[ChapterBoundaries],
    menu_length: u64,
) -> TitleSet<S> {
    let content = sequence.slice(menu_length, sequence.frame_count());

    let mut titles = Vec::with_capacity(chapters.len() + 1);
    let mut start = 0u64;
    for boundaries in chapters {
        let end = start + boundaries.total_frames();
        titles.push(Title {
            sequence: content.slice(start, end),
            chapters: boundaries.clone(),
        });
        start = end;
    }

    if start != content.frame_count() {
        tracing::debug!(
            "Titles declare {} frames, {} decoded after the menu",
            start,
            content.frame_count()
        );
    }

    if menu_length > 0 {
        titles.push(Title {
            sequence: sequence.slice(0, menu_length),
            chapters: ChapterBoundaries::single(menu_length),
        });
    }

    TitleSet::new(titles, menu_length)
}
