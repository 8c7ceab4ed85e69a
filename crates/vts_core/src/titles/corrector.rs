//! Repairing chapter boundaries that run past the decoded stream.
//!
//! Some discs declare chapter marks beyond the last encoded frame. The
//! joined boundary list then ends past the sequence and queries on the
//! last chapters fail. Correction clamps the first overflowing boundary
//! and collapses every later title to a one-frame placeholder.

use super::types::{TitleError, TitleResult};
use crate::models::ChapterBoundaries;

/// Whether merged boundaries declare more frames than were decoded.
pub fn chapters_are_broken(joined: &ChapterBoundaries, total_frames: u64) -> bool {
    joined.total_frames() > total_frames
}

/// Clamp split chapter boundaries to `total_frames`.
///
/// `split` is every entry of a title set, the menu entry included. Titles
/// are walked in order with a running offset; the first boundary at or
/// past `total_frames` becomes `total - menu - count + title + 2` and ends
/// its title. Later titles become `[0, 1]`. The menu entry is never
/// changed.
pub fn correct_chapters(
    split: &[ChapterBoundaries],
    total_frames: u64,
    menu_length: u64,
) -> TitleResult<Vec<ChapterBoundaries>> {
    let count = split.len();
    let mut corrected = split.to_vec();
    let mut offset = 0u64;

    for (i, title) in split.iter().enumerate() {
        let Some(j) = title.iter().position(|&b| b + offset >= total_frames) else {
            offset += title.total_frames();
            continue;
        };

        let clamp = total_frames as i128 - menu_length as i128 - count as i128 + i as i128 + 2;
        if clamp < 0 {
            return Err(TitleError::InvalidCorrection {
                title: i,
                total: total_frames,
                menu_length,
                count,
            });
        }

        let mut boundaries = title.as_slice()[..j].to_vec();
        boundaries.push(clamp as u64);
        tracing::debug!(
            "Title {}: boundary {} clamped from {} to {}",
            i,
            j,
            title.get(j).unwrap_or(0),
            clamp
        );
        corrected[i] = ChapterBoundaries::new(boundaries)?;

        let last_title = count - usize::from(menu_length > 0);
        for placeholder in corrected.iter_mut().take(last_title).skip(i + 1) {
            *placeholder = ChapterBoundaries::single(1);
        }

        if menu_length > 0 {
            corrected[count - 1] = split[count - 1].clone();
        }

        break;
    }

    Ok(corrected)
}
