//! Decoded frame sequences.
//!
//! Title resolution works on an opaque [`FrameSequence`]: it slices,
//! concatenates and retimes it but never decodes a frame itself. A
//! [`SequenceProvider`] opens the sequence behind an index file.
//!
//! # Usage
//!
//! ```ignore
//! use vts_core::sequence::{IndexFrameProvider, SequenceProvider, SourceArgs};
//!
//! let provider = IndexFrameProvider::new(D2vWitch::new());
//! let seq = provider.open(&index_path, &SourceArgs::new())?;
//! let first_minute = seq.slice(0, 1800);
//! ```

mod provider;
mod types;
#[cfg(feature = "vapoursynth")]
mod vapoursynth;

pub use provider::{IndexFrameProvider, SequenceProvider};
pub use types::{FrameRanges, FrameSequence, SequenceError, SequenceResult, SourceArgs};
#[cfg(feature = "vapoursynth")]
pub use vapoursynth::VapourSynthProvider;
