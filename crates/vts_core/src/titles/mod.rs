//! Title splitting, joining, correction and chapter queries.
//!
//! # Flow
//!
//! 1. [`split_titles`] cuts the decoded sequence at each title's length,
//!    moving a leading menu segment to the end
//! 2. [`join_titles`] concatenates the titles and merges their boundaries
//! 3. If the merged boundaries overrun the sequence,
//!    [`correct_chapters`] clamps them and the split is redone
//! 4. [`select_chapters`] answers chapter queries on a title or the joined
//!    sequence
//!
//! # Usage
//!
//! ```ignore
//! use vts_core::titles::{join_titles, select_chapters, split_titles, ChapterQuery};
//!
//! let set = split_titles(&sequence, &ifo.chapters, menu_length);
//! let joined = join_titles(&set)?;
//! let last = select_chapters(&joined.sequence, &joined.chapters, &ChapterQuery::Single(-1))?;
//! ```

mod corrector;
mod joiner;
mod query;
mod splitter;
mod types;

pub use corrector::{chapters_are_broken, correct_chapters};
pub use joiner::join_titles;
pub use query::{resolve_chapters, select_chapters};
pub use splitter::{dvd_menu_length, split_titles, MENU_SIZE_THRESHOLD};
pub use types::{
    ChapterQuery, FrameSelection, JoinedTitles, Selection, Title, TitleError, TitleResult,
    TitleSet,
};
