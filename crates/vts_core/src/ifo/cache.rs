//! Memoised IFO decoding keyed by mount path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use super::types::{IfoInfo, IfoResult};

static GLOBAL_CACHE: Lazy<Arc<IfoCache>> = Lazy::new(|| Arc::new(IfoCache::new()));

/// Cache of decoded IFO information, one entry per mount path.
///
/// Entries are never evicted. The lock is held while decoding so a mount
/// path is decoded at most once.
#[derive(Debug, Default)]
pub struct IfoCache {
    entries: Mutex<HashMap<PathBuf, Arc<IfoInfo>>>,
}

impl IfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache shared by resolvers that don't bring their own.
    pub fn global() -> Arc<IfoCache> {
        Arc::clone(&GLOBAL_CACHE)
    }

    /// Return the cached entry for `mount_path`, decoding it on first use.
    ///
    /// Failed decodes are not cached.
    pub fn get_or_decode<F>(&self, mount_path: &Path, decode: F) -> IfoResult<Arc<IfoInfo>>
    where
        F: FnOnce() -> IfoResult<IfoInfo>,
    {
        let mut entries = self.entries.lock();

        if let Some(info) = entries.get(mount_path) {
            tracing::trace!("IFO cache hit for {}", mount_path.display());
            return Ok(Arc::clone(info));
        }

        let info = Arc::new(decode()?);
        entries.insert(mount_path.to_path_buf(), Arc::clone(&info));
        Ok(info)
    }

    /// Cached entry for `mount_path`, if decoded already.
    pub fn get(&self, mount_path: &Path) -> Option<Arc<IfoInfo>> {
        self.entries.lock().get(mount_path).cloned()
    }

    /// Number of cached mount paths.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ifo::IfoError;
    use crate::models::{ChapterBoundaries, FrameRate};
    use std::cell::Cell;

    fn info() -> IfoInfo {
        IfoInfo {
            chapters: vec![ChapterBoundaries::from_chapter_lengths([10, 20])],
            fps: FrameRate::PAL,
            multiple_ifos: false,
        }
    }

    #[test]
    fn decodes_once_per_mount_path() {
        let cache = IfoCache::new();
        let calls = Cell::new(0);
        let path = Path::new("/mnt/disc/VIDEO_TS");

        for _ in 0..3 {
            let result = cache
                .get_or_decode(path, || {
                    calls.set(calls.get() + 1);
                    Ok(info())
                })
                .unwrap();
            assert_eq!(result.total_frames(), 30);
        }

        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_paths_are_cached_separately() {
        let cache = IfoCache::new();
        cache.get_or_decode(Path::new("/a"), || Ok(info())).unwrap();
        cache.get_or_decode(Path::new("/b"), || Ok(info())).unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.get(Path::new("/a")).is_some());
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = IfoCache::new();
        let path = Path::new("/broken");

        let result = cache.get_or_decode(path, || Err(IfoError::NoIfoFilesFound));
        assert!(result.is_err());
        assert!(cache.is_empty());

        cache.get_or_decode(path, || Ok(info())).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn global_cache_is_shared() {
        assert!(Arc::ptr_eq(&IfoCache::global(), &IfoCache::global()));
    }
}
