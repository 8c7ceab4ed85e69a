//! Sequence providers backed by index files.

use std::path::Path;

use super::types::{FrameRanges, FrameSequence, SequenceResult, SourceArgs};
use crate::indexer::DvdIndexer;

/// Opens the decoded frame sequence of an index file.
pub trait SequenceProvider {
    type Sequence: FrameSequence;

    /// Open `index_path`, passing `args` to the source filter.
    fn open(&self, index_path: &Path, args: &SourceArgs) -> SequenceResult<Self::Sequence>;
}

/// Provider that trusts the frame count recorded in the index.
///
/// No decoding happens; the sequence is the index's frame numbers.
#[derive(Debug, Clone)]
pub struct IndexFrameProvider<I> {
    indexer: I,
}

impl<I: DvdIndexer> IndexFrameProvider<I> {
    pub fn new(indexer: I) -> Self {
        Self { indexer }
    }
}

impl<I: DvdIndexer> SequenceProvider for IndexFrameProvider<I> {
    type Sequence = FrameRanges;

    fn open(&self, index_path: &Path, args: &SourceArgs) -> SequenceResult<FrameRanges> {
        if !args.is_empty() {
            tracing::trace!("Ignoring source arguments for index-backed sequence");
        }

        let info = self.indexer.get_info(index_path, 0)?;
        tracing::debug!(
            "Opened {} with {} indexed frames",
            index_path.display(),
            info.total_frames
        );
        Ok(FrameRanges::contiguous(info.total_frames))
    }
}
