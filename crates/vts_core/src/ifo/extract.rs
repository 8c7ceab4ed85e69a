//! Chapter extraction from VTS IFO files.
//!
//! Turns the program chains of every title set into frame-count chapter
//! boundaries, one list per title.

use std::path::{Path, PathBuf};

use super::reader::IfoDecoder;
use super::types::{IfoError, IfoInfo, IfoResult};
use crate::models::{ChapterBoundaries, FrameRate, ProgramChain};
use crate::mount::list_disc_files;

/// List the VTS IFO files of a mount path, sorted by name.
pub fn list_ifo_files(mount_path: &Path) -> IfoResult<Vec<PathBuf>> {
    list_disc_files(mount_path, "ifo").map_err(|e| IfoError::read(mount_path, e))
}

/// Read chapter information for every title on a mounted disc.
pub fn read_ifo_info(mount_path: &Path, decoder: &dyn IfoDecoder) -> IfoResult<IfoInfo> {
    let files = list_ifo_files(mount_path)?;
    tracing::debug!("Found {} IFO files in {}", files.len(), mount_path.display());
    extract_chapters(&files, decoder)
}

/// Decode program chains from `ifo_files` and convert them into chapter
/// boundaries.
///
/// When more than one IFO is present, the first program chain of each
/// file is the title set menu and is skipped.
pub fn extract_chapters(ifo_files: &[PathBuf], decoder: &dyn IfoDecoder) -> IfoResult<IfoInfo> {
    if ifo_files.is_empty() {
        return Err(IfoError::NoIfoFilesFound);
    }

    let multiple_ifos = ifo_files.len() > 1;
    let skip = usize::from(multiple_ifos);

    let mut program_chains = Vec::new();
    for file in ifo_files {
        let chains = decoder.decode_program_chains(file)?;
        program_chains.extend(chains.into_iter().skip(skip));
    }

    let mut chapters = Vec::with_capacity(program_chains.len());
    let mut fps = FrameRate::NTSC;

    for (title, chain) in program_chains.iter().enumerate() {
        let title_fps = chain_frame_rate(title, chain)?;
        if title > 0 && title_fps != fps {
            tracing::warn!(
                "Title {} runs at {} fps while title {} runs at {} fps",
                title,
                title_fps,
                title - 1,
                fps
            );
        }
        fps = title_fps;

        let boundaries = chain_boundaries(chain, fps);
        tracing::debug!(
            "Title {}: {} chapters, {} frames",
            title,
            boundaries.chapter_count(),
            boundaries.total_frames()
        );
        chapters.push(boundaries);
    }

    tracing::info!(
        "Extracted {} titles at {} fps from {} IFO files",
        chapters.len(),
        fps,
        ifo_files.len()
    );

    Ok(IfoInfo {
        chapters,
        fps,
        multiple_ifos,
    })
}

/// Resolve the single frame rate of a program chain.
///
/// Every playback time must carry the same frame-rate code.
pub fn chain_frame_rate(title: usize, chain: &ProgramChain) -> IfoResult<FrameRate> {
    let codes = chain.fps_codes();
    let first = *codes.first().ok_or(IfoError::EmptyProgramChain { title })?;

    if codes.iter().any(|&code| code != first) {
        return Err(IfoError::VariableFrameRate { title, codes });
    }

    FrameRate::from_dvd_code(first).ok_or(IfoError::UnknownFrameRate { title, code: first })
}

/// Convert chapter playback times into cumulative frame boundaries.
pub fn chain_boundaries(chain: &ProgramChain, fps: FrameRate) -> ChapterBoundaries {
    let timecode_fps = fps.timecode_fps();
    ChapterBoundaries::from_chapter_lengths(
        chain.playback_times.iter().map(|t| t.to_frames(timecode_fps)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ifo::reader::fixture::{build_ifo, time};
    use crate::ifo::reader::VtsIfoReader;
    use crate::models::PlaybackTime;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    /// Decoder returning canned chains per file name.
    struct FakeDecoder(HashMap<PathBuf, Vec<ProgramChain>>);

    impl IfoDecoder for FakeDecoder {
        fn decode_program_chains(&self, path: &Path) -> IfoResult<Vec<ProgramChain>> {
            Ok(self.0.get(path).cloned().unwrap_or_default())
        }
    }

    fn chain(times: &[(u32, u32, u8)]) -> ProgramChain {
        ProgramChain::new(
            PlaybackTime::default(),
            times
                .iter()
                .map(|&(s, f, code)| PlaybackTime::new(0, 0, s, f, code))
                .collect(),
        )
    }

    #[test]
    fn empty_file_list_fails_first() {
        let decoder = FakeDecoder(HashMap::new());
        assert!(matches!(
            extract_chapters(&[], &decoder),
            Err(IfoError::NoIfoFilesFound)
        ));
    }

    #[test]
    fn single_ifo_keeps_every_chain() {
        let file = PathBuf::from("VTS_01_0.IFO");
        let decoder = FakeDecoder(HashMap::from([(
            file.clone(),
            vec![chain(&[(1, 0, 3), (2, 5, 3)]), chain(&[(0, 10, 3)])],
        )]));

        let info = extract_chapters(&[file], &decoder).unwrap();
        assert!(!info.multiple_ifos);
        assert_eq!(info.fps, FrameRate::NTSC);
        assert_eq!(info.chapters.len(), 2);
        assert_eq!(info.chapters[0].as_slice(), &[0, 30, 95]);
        assert_eq!(info.chapters[1].as_slice(), &[0, 10]);
    }

    #[test]
    fn multiple_ifos_skip_menu_chain() {
        let a = PathBuf::from("VTS_01_0.IFO");
        let b = PathBuf::from("VTS_02_0.IFO");
        let decoder = FakeDecoder(HashMap::from([
            (a.clone(), vec![chain(&[(9, 0, 1)]), chain(&[(1, 0, 1)])]),
            (b.clone(), vec![chain(&[(9, 0, 1)]), chain(&[(2, 0, 1)])]),
        ]));

        let info = extract_chapters(&[a, b], &decoder).unwrap();
        assert!(info.multiple_ifos);
        assert_eq!(info.fps, FrameRate::PAL);
        assert_eq!(info.chapters.len(), 2);
        assert_eq!(info.chapters[0].as_slice(), &[0, 25]);
        assert_eq!(info.chapters[1].as_slice(), &[0, 50]);
    }

    #[test]
    fn variable_frame_rate_is_rejected() {
        let file = PathBuf::from("VTS_01_0.IFO");
        let decoder = FakeDecoder(HashMap::from([(
            file.clone(),
            vec![chain(&[(1, 0, 3), (1, 0, 1)])],
        )]));

        match extract_chapters(&[file], &decoder) {
            Err(IfoError::VariableFrameRate { title, codes }) => {
                assert_eq!(title, 0);
                assert_eq!(codes, vec![3, 1]);
            }
            other => panic!("expected VariableFrameRate, got {:?}", other),
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        let file = PathBuf::from("VTS_01_0.IFO");
        let decoder = FakeDecoder(HashMap::from([(file.clone(), vec![chain(&[(1, 0, 2)])])]));

        assert!(matches!(
            extract_chapters(&[file], &decoder),
            Err(IfoError::UnknownFrameRate { code: 2, .. })
        ));
    }

    #[test]
    fn last_title_rate_wins() {
        let file = PathBuf::from("VTS_01_0.IFO");
        let decoder = FakeDecoder(HashMap::from([(
            file.clone(),
            vec![chain(&[(1, 0, 3)]), chain(&[(1, 0, 1)])],
        )]));

        let info = extract_chapters(&[file], &decoder).unwrap();
        assert_eq!(info.fps, FrameRate::PAL);
        assert_eq!(info.chapters[0].as_slice(), &[0, 30]);
        assert_eq!(info.chapters[1].as_slice(), &[0, 25]);
    }

    #[test]
    fn reads_ifo_files_from_mount() {
        let dir = tempdir().unwrap();
        let data = build_ifo(&[vec![vec![time(0, 0, 2, 0, 1)], vec![time(0, 0, 1, 12, 1)]]]);
        fs::write(dir.path().join("VTS_01_0.IFO"), data).unwrap();
        fs::write(dir.path().join("VIDEO_TS.IFO"), b"menu").unwrap();

        let info = read_ifo_info(dir.path(), &VtsIfoReader::new()).unwrap();
        assert_eq!(info.chapters.len(), 1);
        assert_eq!(info.chapters[0].as_slice(), &[0, 50, 87]);
        assert_eq!(info.total_frames(), 87);
    }

    #[test]
    fn empty_mount_reports_no_ifos() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            read_ifo_info(dir.path(), &VtsIfoReader::new()),
            Err(IfoError::NoIfoFilesFound)
        ));
    }
}
