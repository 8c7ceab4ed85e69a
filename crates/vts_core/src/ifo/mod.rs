//! IFO decoding and chapter extraction.
//!
//! This module handles everything between the VTS IFO files of a mounted
//! disc and per-title chapter boundaries.
//!
//! # Features
//!
//! - **Decoding**: Read program chains from the VTS_PGCI table
//! - **Extraction**: Convert playback times into frame boundaries and
//!   reject variable frame rate titles
//! - **Caching**: Decode each mount path at most once
//!
//! # Usage
//!
//! ```ignore
//! use vts_core::ifo::{read_ifo_info, VtsIfoReader};
//!
//! let info = read_ifo_info(Path::new("/mnt/disc/VIDEO_TS"), &VtsIfoReader::new())?;
//! println!("{} titles at {} fps", info.title_count(), info.fps);
//! ```

mod cache;
mod extract;
mod reader;
mod types;

// Re-export types
pub use cache::IfoCache;
pub use reader::{IfoDecoder, VtsIfoReader};
pub use types::{IfoError, IfoInfo, IfoResult};

// Re-export functions
pub use extract::{
    chain_boundaries, chain_frame_rate, extract_chapters, list_ifo_files, read_ifo_info,
};
