//! Data models for DVD title resolution.
//!
//! This module contains the value types shared by every stage:
//! - Frame rates and the DVD frame-rate codes
//! - Playback times and program chains decoded from IFO files
//! - Chapter boundary lists
//! - Indexer selection

mod boundaries;
mod enums;
mod frame_rate;
mod playback;

// Re-export all public types
pub use boundaries::{BoundaryError, ChapterBoundaries};
pub use enums::IndexerKind;
pub use frame_rate::FrameRate;
pub use playback::{PlaybackTime, ProgramChain};
