//! VTS Core - DVD title and chapter resolution
//!
//! Resolves the titles and chapters described by a disc's IFO files into
//! frame ranges over the single decoded sequence of its VOBs.
//!
//! # Pipeline
//!
//! - [`mount`]: locate the directory holding IFO/VOB files
//! - [`indexer`]: build or update the frame index over the VOBs
//! - [`ifo`]: decode program chains into per-title chapter boundaries
//! - [`sequence`]: open the decoded frame sequence behind the index
//! - [`titles`]: split, join, repair and query titles
//! - [`disc`]: the resolver driving all of the above
//!
//! Decoding pixels is left to the sequence provider; this crate only
//! manipulates frame numbers.

pub mod config;
pub mod disc;
pub mod ifo;
pub mod indexer;
pub mod logging;
pub mod models;
pub mod mount;
pub mod sequence;
pub mod titles;

pub use disc::{DiscError, DiscResolver, DiscResult, DiscWarning, ResolverOptions};
pub use titles::{ChapterQuery, Selection};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
