//! Disc-level resolution.
//!
//! [`DiscResolver`] drives the whole pipeline for one disc: mount, index
//! the VOBs, decode the IFOs, open the sequence, split it into titles and
//! answer chapter queries.
//!
//! # Usage
//!
//! ```ignore
//! use vts_core::disc::DiscResolver;
//! use vts_core::titles::ChapterQuery;
//!
//! let settings = config.settings();
//! let mut resolver = DiscResolver::new(
//!     "/discs/MOVIE",
//!     DirectoryMount,
//!     settings.indexer(),
//!     VtsIfoReader::new(),
//!     IndexFrameProvider::new(settings.indexer()),
//! )
//! .with_options(settings.resolver_options());
//!
//! let chapters = resolver.get_title(Some(0), Some(&ChapterQuery::Range(Some(1), Some(-1))))?;
//! for warning in resolver.warnings() {
//!     eprintln!("{}", warning);
//! }
//! ```

mod resolver;
mod types;

pub use resolver::DiscResolver;
pub use types::{
    DiscError, DiscLayout, DiscResult, DiscWarning, ResolvedTitles, ResolverOptions, TitleLayout,
};
