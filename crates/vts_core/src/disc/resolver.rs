//! Disc resolver tying mount, index, IFO and sequence together.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::types::{
    DiscError, DiscLayout, DiscResult, DiscWarning, ResolvedTitles, ResolverOptions, TitleLayout,
};
use crate::ifo::{read_ifo_info, IfoCache, IfoDecoder, IfoInfo};
use crate::indexer::{index_files, DvdIndexer, IndexFileInfo};
use crate::mount::{list_disc_files, video_ts_dir, MountProvider};
use crate::sequence::{FrameSequence, SequenceProvider, SourceArgs};
use crate::titles::{
    chapters_are_broken, correct_chapters, dvd_menu_length, join_titles, select_chapters,
    split_titles, ChapterQuery, Selection, TitleError,
};

/// Resolves titles and chapters of one disc.
///
/// Everything is derived lazily on first use and kept for the lifetime
/// of the resolver. IFO decoding is shared through an [`IfoCache`].
pub struct DiscResolver<M, I, D, P: SequenceProvider> {
    disc: PathBuf,
    mount: M,
    indexer: I,
    decoder: D,
    provider: P,
    options: ResolverOptions,
    cache: Arc<IfoCache>,

    mount_path: Option<PathBuf>,
    index_info: Option<IndexFileInfo>,
    sequence: Option<P::Sequence>,
    resolved: Option<ResolvedTitles<P::Sequence>>,
    warnings: Vec<DiscWarning>,
}

impl<M, I, D, P> DiscResolver<M, I, D, P>
where
    M: MountProvider,
    I: DvdIndexer,
    D: IfoDecoder,
    P: SequenceProvider,
{
    pub fn new(disc: impl Into<PathBuf>, mount: M, indexer: I, decoder: D, provider: P) -> Self {
        Self {
            disc: disc.into(),
            mount,
            indexer,
            decoder,
            provider,
            options: ResolverOptions::default(),
            cache: IfoCache::global(),
            mount_path: None,
            index_info: None,
            sequence: None,
            resolved: None,
            warnings: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Use `cache` instead of the process-wide IFO cache.
    pub fn with_cache(mut self, cache: Arc<IfoCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn disc(&self) -> &Path {
        &self.disc
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Warnings collected so far.
    pub fn warnings(&self) -> &[DiscWarning] {
        &self.warnings
    }

    /// Index metadata, once [`source`](Self::source) has run.
    pub fn index_info(&self) -> Option<&IndexFileInfo> {
        self.index_info.as_ref()
    }

    /// Index file location for this disc.
    pub fn index_path(&self) -> PathBuf {
        self.indexer.index_path(&self.disc)
    }

    /// Directory exposing the disc's IFO and VOB files.
    ///
    /// This is the `VIDEO_TS` folder of the mounted disc, or the mount
    /// root itself with `force_root`.
    pub fn mount_path(&mut self) -> DiscResult<PathBuf> {
        if let Some(path) = &self.mount_path {
            return Ok(path.clone());
        }

        let root = self.mount.mount_path(&self.disc)?;
        let path = video_ts_dir(&root, self.options.force_root);
        tracing::debug!("Resolved mount path {}", path.display());

        self.mount_path = Some(path.clone());
        Ok(path)
    }

    /// Chapter information of every title, decoded once per mount path.
    pub fn ifo_info(&mut self) -> DiscResult<Arc<IfoInfo>> {
        let mount_path = self.mount_path()?;
        let decoder = &self.decoder;
        let info = self
            .cache
            .get_or_decode(&mount_path, || read_ifo_info(&mount_path, decoder))?;
        Ok(info)
    }

    /// Index the disc's VOBs and open the decoded sequence.
    ///
    /// The sequence carries the disc's frame rate.
    pub fn source(&mut self) -> DiscResult<P::Sequence> {
        if let Some(sequence) = &self.sequence {
            return Ok(sequence.clone());
        }

        let mount_path = self.mount_path()?;
        let vob_files = list_disc_files(&mount_path, "vob").map_err(|e| DiscError::IoError {
            path: mount_path.clone(),
            source: e,
        })?;

        if vob_files.is_empty() {
            return Err(DiscError::NoVobFilesFound(mount_path));
        }

        let index_path = self.index_path();
        let info = index_files(&self.indexer, &vob_files, &index_path)?;

        let mut args = SourceArgs::new();
        if info.is_full_film() {
            args.set("fieldop", "2");
        }
        let args = args.merged(&self.options.source_args);

        let sequence = self.provider.open(&index_path, &args)?;
        let ifo = self.ifo_info()?;
        let sequence = sequence.with_frame_rate(ifo.fps);

        tracing::info!(
            "Opened {} from {} VOB files: {} frames at {} fps",
            self.disc.display(),
            vob_files.len(),
            sequence.frame_count(),
            ifo.fps
        );

        self.index_info = Some(info);
        self.sequence = Some(sequence.clone());
        Ok(sequence)
    }

    /// Split the sequence into titles and join them back together.
    ///
    /// Chapters running past the decoded stream are repaired when safe
    /// indices are enabled and reported as a warning otherwise.
    pub fn split_titles(&mut self) -> DiscResult<&ResolvedTitles<P::Sequence>> {
        let sequence = self.source()?;
        let ifo = self.ifo_info()?;

        let menu_length = self
            .index_info
            .as_ref()
            .map(|info| dvd_menu_length(info, self.options.menu_size_threshold))
            .unwrap_or(0);

        let total_frames = sequence.frame_count();
        let mut titles = split_titles(&sequence, &ifo.chapters, menu_length);
        let mut joined = join_titles(&titles)?;

        if chapters_are_broken(&joined.chapters, total_frames) {
            let declared = joined.chapters.total_frames();

            if !self.options.safe_indices {
                let warning = DiscWarning::BrokenChapters {
                    declared,
                    decoded: total_frames,
                };
                tracing::warn!("{}", warning);
                if !self.warnings.contains(&warning) {
                    self.warnings.push(warning);
                }
            } else {
                tracing::info!(
                    "Trimming chapters from {} to {} decoded frames",
                    declared,
                    total_frames
                );

                let corrected = correct_chapters(&titles.chapters(), total_frames, menu_length)?;
                let content = if menu_length > 0 {
                    &corrected[..corrected.len() - 1]
                } else {
                    &corrected[..]
                };

                titles = split_titles(&sequence, content, menu_length);
                joined = join_titles(&titles)?;
            }
        }

        tracing::debug!(
            "Split {} titles (menu {} frames), joined {} frames",
            titles.len(),
            menu_length,
            joined.sequence.frame_count()
        );

        Ok(self.resolved.insert(ResolvedTitles { titles, joined }))
    }

    /// Select chapters of one title, or of the joined sequence when
    /// `title` is `None`. Without a query the whole sequence is returned.
    pub fn get_title(
        &mut self,
        title: Option<usize>,
        query: Option<&ChapterQuery>,
    ) -> DiscResult<Selection<P::Sequence>> {
        if self.resolved.is_none() {
            self.split_titles()?;
        }
        let Some(resolved) = &self.resolved else {
            return Err(TitleError::NoTitles.into());
        };

        let (sequence, chapters) = match title {
            Some(index) => {
                let entry = resolved.titles.get(index).ok_or(TitleError::TitleOutOfRange {
                    title: index,
                    count: resolved.titles.len(),
                })?;
                (&entry.sequence, &entry.chapters)
            }
            None => (&resolved.joined.sequence, &resolved.joined.chapters),
        };

        match query {
            Some(query) => Ok(select_chapters(sequence, chapters, query)?),
            None => Ok(Selection::Single(sequence.clone())),
        }
    }

    /// Summary of the resolved titles.
    pub fn layout(&mut self) -> DiscResult<DiscLayout> {
        if self.resolved.is_none() {
            self.split_titles()?;
        }
        let ifo = self.ifo_info()?;
        let total_frames = self.source()?.frame_count();

        let Some(resolved) = &self.resolved else {
            return Err(TitleError::NoTitles.into());
        };

        let menu_length = resolved.titles.menu_length();
        let menu_index = (menu_length > 0).then(|| resolved.titles.len() - 1);

        let titles = resolved
            .titles
            .titles()
            .iter()
            .enumerate()
            .map(|(index, title)| TitleLayout {
                index,
                frames: title.sequence.frame_count(),
                chapters: title.chapters.clone(),
                menu: Some(index) == menu_index,
            })
            .collect();

        Ok(DiscLayout {
            disc: self.disc.clone(),
            fps: ifo.fps,
            total_frames,
            menu_length,
            titles,
            joined_chapters: resolved.joined.chapters.clone(),
            warnings: self.warnings.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ifo::{IfoError, IfoResult};
    use crate::indexer::{FrameDataRecord, IndexFooter, IndexedVideo, IndexerError, IndexerResult};
    use crate::models::{FrameRate, IndexerKind, PlaybackTime, ProgramChain};
    use crate::mount::{DirectoryMount, VIDEO_TS};
    use crate::sequence::{FrameRanges, SequenceResult};
    use std::cell::RefCell;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::{tempdir, TempDir};

    /// Decoder turning per-title chapter lengths (in frames) into chains.
    struct FakeDecoder {
        titles: Vec<Vec<u32>>,
        fps_code: u8,
        calls: Arc<AtomicUsize>,
    }

    impl FakeDecoder {
        fn pal(titles: Vec<Vec<u32>>) -> Self {
            Self {
                titles,
                fps_code: 1,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl IfoDecoder for FakeDecoder {
        fn decode_program_chains(&self, _path: &Path) -> IfoResult<Vec<ProgramChain>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .titles
                .iter()
                .map(|lengths| {
                    ProgramChain::new(
                        PlaybackTime::default(),
                        lengths
                            .iter()
                            .map(|&frames| PlaybackTime::new(0, 0, 0, frames, self.fps_code))
                            .collect(),
                    )
                })
                .collect())
        }
    }

    /// Indexer reporting a fixed first-video size and record count.
    struct FakeIndexer {
        first_size: u64,
        records: usize,
        film: f64,
    }

    impl FakeIndexer {
        fn without_menu() -> Self {
            Self {
                first_size: 2048,
                records: 3,
                film: 0.0,
            }
        }
    }

    impl DvdIndexer for FakeIndexer {
        fn kind(&self) -> IndexerKind {
            IndexerKind::DgIndexNv
        }

        fn index_path(&self, media: &Path) -> PathBuf {
            media.join("disc.dgi")
        }

        fn build_index(&self, _files: &[PathBuf], index_path: &Path) -> IndexerResult<()> {
            fs::write(index_path, "index").map_err(|e| IndexerError::io(index_path, e))
        }

        fn update_index(&self, _index_path: &Path, _files: &[PathBuf]) -> IndexerResult<()> {
            Ok(())
        }

        fn get_info(&self, index_path: &Path, track: usize) -> IndexerResult<IndexFileInfo> {
            Ok(IndexFileInfo {
                kind: self.kind(),
                path: index_path.to_path_buf(),
                track,
                videos: vec![IndexedVideo {
                    path: PathBuf::from("VTS_01_1.VOB"),
                    size: self.first_size,
                }],
                frame_data: (0..self.records)
                    .map(|i| FrameDataRecord {
                        file: 0,
                        position: i as u64,
                        vob: None,
                        cell: None,
                        frames: 1,
                    })
                    .collect(),
                total_frames: 0,
                footer: Some(IndexFooter {
                    film: self.film,
                    coded_frames: 0,
                    playback_frames: 0,
                    order: None,
                }),
            })
        }
    }

    /// Provider returning a fixed-length sequence and recording arguments.
    struct FakeProvider {
        frames: u64,
        args: RefCell<Vec<SourceArgs>>,
    }

    impl FakeProvider {
        fn new(frames: u64) -> Self {
            Self {
                frames,
                args: RefCell::new(Vec::new()),
            }
        }
    }

    impl SequenceProvider for FakeProvider {
        type Sequence = FrameRanges;

        fn open(&self, _index_path: &Path, args: &SourceArgs) -> SequenceResult<FrameRanges> {
            self.args.borrow_mut().push(args.clone());
            Ok(FrameRanges::contiguous(self.frames))
        }
    }

    fn disc_dir(vobs: &[&str]) -> TempDir {
        let dir = tempdir().unwrap();
        let video_ts = dir.path().join(VIDEO_TS);
        fs::create_dir(&video_ts).unwrap();
        fs::write(video_ts.join("VTS_01_0.IFO"), b"ifo").unwrap();
        for vob in vobs {
            fs::write(video_ts.join(vob), b"vob").unwrap();
        }
        dir
    }

    type TestResolver = DiscResolver<DirectoryMount, FakeIndexer, FakeDecoder, FakeProvider>;

    fn resolver(
        dir: &TempDir,
        titles: Vec<Vec<u32>>,
        indexer: FakeIndexer,
        frames: u64,
    ) -> TestResolver {
        DiscResolver::new(
            dir.path(),
            DirectoryMount::default(),
            indexer,
            FakeDecoder::pal(titles),
            FakeProvider::new(frames),
        )
        .with_cache(Arc::new(IfoCache::new()))
    }

    fn single(selection: Selection<FrameRanges>) -> FrameRanges {
        selection.into_single().unwrap()
    }

    #[test]
    fn resolves_titles_and_chapters() {
        let dir = disc_dir(&["VTS_01_1.VOB"]);
        let mut r = resolver(
            &dir,
            vec![vec![100, 100], vec![50]],
            FakeIndexer::without_menu(),
            250,
        );

        let seq = r.source().unwrap();
        assert_eq!(seq.frame_rate(), Some(FrameRate::PAL));

        let resolved = r.split_titles().unwrap();
        assert_eq!(resolved.titles.len(), 2);
        assert_eq!(resolved.joined.chapters.as_slice(), &[0, 100, 200, 250]);

        let last = single(r.get_title(None, Some(&ChapterQuery::Single(-1))).unwrap());
        assert_eq!(last.ranges(), &[200..250]);

        let title = single(r.get_title(Some(1), None).unwrap());
        assert_eq!(title.ranges(), &[200..250]);
        assert!(r.warnings().is_empty());
    }

    #[test]
    fn split_then_join_keeps_decoded_length() {
        let dir = disc_dir(&["VTS_01_1.VOB"]);
        let mut r = resolver(
            &dir,
            vec![vec![40, 60], vec![30, 70]],
            FakeIndexer::without_menu(),
            200,
        );

        let joined = single(r.get_title(None, None).unwrap());
        assert_eq!(joined.frame_count(), 200);
    }

    #[test]
    fn menu_segment_is_moved_last() {
        let dir = disc_dir(&["VTS_01_1.VOB"]);
        let indexer = FakeIndexer {
            first_size: 1 << 20,
            records: 10,
            film: 0.0,
        };
        let mut r = resolver(&dir, vec![vec![100]], indexer, 110);

        let resolved = r.split_titles().unwrap();
        assert_eq!(resolved.titles.menu_length(), 10);
        assert_eq!(resolved.titles.len(), 2);
        assert_eq!(resolved.titles.titles()[0].sequence.ranges(), &[10..110]);

        let menu = single(r.get_title(Some(1), None).unwrap());
        assert_eq!(menu.ranges(), &[0..10]);
    }

    #[test]
    fn broken_chapters_warn_by_default() {
        let dir = disc_dir(&["VTS_01_1.VOB"]);
        let mut r = resolver(&dir, vec![vec![100, 200]], FakeIndexer::without_menu(), 250);

        let resolved = r.split_titles().unwrap();
        assert_eq!(resolved.joined.chapters.as_slice(), &[0, 100, 300]);
        r.split_titles().unwrap();

        assert_eq!(
            r.warnings(),
            &[DiscWarning::BrokenChapters {
                declared: 300,
                decoded: 250
            }]
        );
    }

    #[test]
    fn safe_indices_clamp_broken_chapters() {
        let dir = disc_dir(&["VTS_01_1.VOB"]);
        let mut r = resolver(&dir, vec![vec![100, 200]], FakeIndexer::without_menu(), 250)
            .with_options(ResolverOptions {
                safe_indices: true,
                ..Default::default()
            });

        let resolved = r.split_titles().unwrap();
        assert_eq!(resolved.titles.titles()[0].chapters.as_slice(), &[0, 100, 251]);

        let title = single(r.get_title(Some(0), None).unwrap());
        assert_eq!(title.frame_count(), 250);

        let last = single(r.get_title(Some(0), Some(&ChapterQuery::Single(-1))).unwrap());
        assert_eq!(last.ranges(), &[100..250]);
        assert!(r.warnings().is_empty());
    }

    #[test]
    fn safe_indices_keep_menu_segment() {
        let dir = disc_dir(&["VTS_01_1.VOB"]);
        let indexer = FakeIndexer {
            first_size: 1 << 20,
            records: 20,
            film: 0.0,
        };
        let mut r = resolver(&dir, vec![vec![200], vec![100]], indexer, 250).with_options(
            ResolverOptions {
                safe_indices: true,
                ..Default::default()
            },
        );

        let resolved = r.split_titles().unwrap();
        let titles = resolved.titles.titles();
        assert_eq!(resolved.titles.menu_length(), 20);
        assert_eq!(titles.len(), 3);

        assert_eq!(titles[0].sequence.ranges(), &[20..220]);
        assert_eq!(titles[1].sequence.ranges(), &[220..250]);
        assert_eq!(titles[2].sequence.ranges(), &[0..20]);

        assert_eq!(titles[0].chapters.as_slice(), &[0, 200]);
        assert_eq!(titles[1].chapters.as_slice(), &[0, 230]);
        assert_eq!(titles[2].chapters.as_slice(), &[0, 20]);
        assert!(r.warnings().is_empty());
    }

    #[test]
    fn force_root_reads_disc_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("VTS_01_0.IFO"), b"ifo").unwrap();
        fs::write(dir.path().join("VTS_01_1.VOB"), b"vob").unwrap();

        let options = ResolverOptions {
            force_root: true,
            ..Default::default()
        };
        let mut r = DiscResolver::new(
            dir.path(),
            DirectoryMount,
            FakeIndexer::without_menu(),
            FakeDecoder::pal(vec![vec![100]]),
            FakeProvider::new(100),
        )
        .with_options(options)
        .with_cache(Arc::new(IfoCache::new()));

        assert_eq!(r.mount_path().unwrap(), dir.path());
        assert_eq!(r.source().unwrap().frame_count(), 100);
    }

    #[test]
    fn missing_vobs_are_reported() {
        let dir = disc_dir(&[]);
        let mut r = resolver(&dir, vec![vec![100]], FakeIndexer::without_menu(), 100);
        assert!(matches!(r.source(), Err(DiscError::NoVobFilesFound(_))));
    }

    #[test]
    fn unknown_title_is_out_of_range() {
        let dir = disc_dir(&["VTS_01_1.VOB"]);
        let mut r = resolver(&dir, vec![vec![100]], FakeIndexer::without_menu(), 100);
        assert!(matches!(
            r.get_title(Some(3), None),
            Err(DiscError::Title(TitleError::TitleOutOfRange { title: 3, count: 1 }))
        ));
    }

    #[test]
    fn full_film_index_sets_field_operation() {
        let dir = disc_dir(&["VTS_01_1.VOB"]);
        let indexer = FakeIndexer {
            film: 100.0,
            ..FakeIndexer::without_menu()
        };
        let mut r = resolver(&dir, vec![vec![100]], indexer, 100);
        r.source().unwrap();

        let args = r.provider.args.borrow();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].get("fieldop"), Some("2"));
    }

    #[test]
    fn ifo_decoding_is_shared_across_resolvers() {
        let dir = disc_dir(&["VTS_01_1.VOB"]);
        let cache = Arc::new(IfoCache::new());
        let decoder = FakeDecoder::pal(vec![vec![100]]);
        let calls = Arc::clone(&decoder.calls);

        let mut first = DiscResolver::new(
            dir.path(),
            DirectoryMount::default(),
            FakeIndexer::without_menu(),
            decoder,
            FakeProvider::new(100),
        )
        .with_cache(Arc::clone(&cache));
        first.split_titles().unwrap();

        let mut second = DiscResolver::new(
            dir.path(),
            DirectoryMount::default(),
            FakeIndexer::without_menu(),
            FakeDecoder::pal(vec![vec![999]]),
            FakeProvider::new(100),
        )
        .with_cache(cache);
        let resolved = second.split_titles().unwrap();

        assert_eq!(resolved.joined.chapters.as_slice(), &[0, 100]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn variable_frame_rate_title_fails() {
        struct VfrDecoder;

        impl IfoDecoder for VfrDecoder {
            fn decode_program_chains(&self, _path: &Path) -> IfoResult<Vec<ProgramChain>> {
                Ok(vec![ProgramChain::new(
                    PlaybackTime::default(),
                    vec![PlaybackTime::new(0, 0, 1, 0, 1), PlaybackTime::new(0, 0, 1, 0, 3)],
                )])
            }
        }

        let dir = disc_dir(&["VTS_01_1.VOB"]);
        let mut r = DiscResolver::new(
            dir.path(),
            DirectoryMount::default(),
            FakeIndexer::without_menu(),
            VfrDecoder,
            FakeProvider::new(100),
        )
        .with_cache(Arc::new(IfoCache::new()));

        assert!(matches!(
            r.split_titles(),
            Err(DiscError::Ifo(IfoError::VariableFrameRate { .. }))
        ));
    }

    #[test]
    fn layout_serializes_titles() {
        let dir = disc_dir(&["VTS_01_1.VOB"]);
        let indexer = FakeIndexer {
            first_size: 1 << 20,
            records: 10,
            film: 0.0,
        };
        let mut r = resolver(&dir, vec![vec![50, 50]], indexer, 110);

        let layout = r.layout().unwrap();
        assert_eq!(layout.fps, FrameRate::PAL);
        assert_eq!(layout.total_frames, 110);
        assert_eq!(layout.titles.len(), 2);
        assert!(layout.titles[1].menu);
        assert_eq!(layout.joined_chapters.as_slice(), &[0, 50, 100, 110]);

        let json = layout.to_json().unwrap();
        let parsed: DiscLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, layout);
    }
}
