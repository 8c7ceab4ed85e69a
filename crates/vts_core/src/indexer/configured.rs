//! Indexer selected at runtime from configuration.

use std::path::{Path, PathBuf};

use super::types::{IndexFileInfo, IndexerResult};
use super::{D2vWitch, DgIndexNv, DvdIndexer};
use crate::models::IndexerKind;

/// Either supported indexer, chosen by [`IndexerKind`].
#[derive(Debug, Clone)]
pub enum ConfiguredIndexer {
    D2v(D2vWitch),
    Dgi(DgIndexNv),
}

impl ConfiguredIndexer {
    /// Build the indexer for `kind`, running `executable` and storing
    /// indexes in `index_dir` when given.
    pub fn new(kind: IndexerKind, executable: &str, index_dir: Option<PathBuf>) -> Self {
        match kind {
            IndexerKind::D2vWitch => {
                let indexer = D2vWitch::new().with_executable(executable);
                Self::D2v(match index_dir {
                    Some(dir) => indexer.with_index_dir(dir),
                    None => indexer,
                })
            }
            IndexerKind::DgIndexNv => {
                let indexer = DgIndexNv::new().with_executable(executable);
                Self::Dgi(match index_dir {
                    Some(dir) => indexer.with_index_dir(dir),
                    None => indexer,
                })
            }
        }
    }

    fn inner(&self) -> &dyn DvdIndexer {
        match self {
            Self::D2v(indexer) => indexer,
            Self::Dgi(indexer) => indexer,
        }
    }
}

impl DvdIndexer for ConfiguredIndexer {
    fn kind(&self) -> IndexerKind {
        self.inner().kind()
    }

    fn index_path(&self, media: &Path) -> PathBuf {
        self.inner().index_path(media)
    }

    fn build_index(&self, files: &[PathBuf], index_path: &Path) -> IndexerResult<()> {
        self.inner().build_index(files, index_path)
    }

    fn update_index(&self, index_path: &Path, files: &[PathBuf]) -> IndexerResult<()> {
        self.inner().update_index(index_path, files)
    }

    fn get_info(&self, index_path: &Path, track: usize) -> IndexerResult<IndexFileInfo> {
        self.inner().get_info(index_path, track)
    }
}
