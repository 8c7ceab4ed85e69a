//! DGIndexNV indexer and `.dgi` index parser.
//!
//! Sections of a DGI file:
//!
//! ```text
//! DGMPGIndexFileNV16
//! /mnt/VIDEO_TS/VTS_01_1.VOB 1073709056
//!
//! DEVICE 0
//! STREAM 224 0
//! ...
//!
//! 2048 3 2 2 2
//! 9216 2 2 2
//!
//! FILM 0.00%
//! CODED 41953
//! PLAYBACK 41953
//! ORDER 1
//! ```
//!
//! The first field of a data line is the byte position in the
//! concatenated stream; each further field describes one frame.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{
    FrameDataRecord, IndexFileInfo, IndexFooter, IndexedVideo, IndexerError, IndexerResult,
};
use super::{index_path_for, replace_head, run_tool, split_sections, DvdIndexer, Section};
use crate::models::IndexerKind;

const DGI_MAGIC_PREFIX: &str = "DG";
const DGI_MAGIC_SUFFIX: &str = "IndexFileNV";

/// DGIndexNV indexer.
#[derive(Debug, Clone)]
pub struct DgIndexNv {
    executable: String,
    index_dir: Option<PathBuf>,
}

impl Default for DgIndexNv {
    fn default() -> Self {
        Self {
            executable: IndexerKind::DgIndexNv.executable().to_string(),
            index_dir: None,
        }
    }
}

impl DgIndexNv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific DGIndexNV executable.
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Store index files in `dir` instead of next to the media.
    pub fn with_index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.index_dir = Some(dir.into());
        self
    }

    /// Parse DGI text.
    pub fn parse(
        &self,
        index_path: &Path,
        content: &str,
        track: usize,
    ) -> IndexerResult<IndexFileInfo> {
        let sections = split_sections(content);

        let head = sections
            .first()
            .filter(|s| is_dgi_magic(s.lines[0]))
            .ok_or_else(|| IndexerError::Unrecognised {
                kind: IndexerKind::DgIndexNv,
                path: index_path.to_path_buf(),
            })?;

        let videos = parse_videos(index_path, head)?;

        if track >= videos.len() {
            return Err(IndexerError::TrackOutOfRange {
                track,
                count: videos.len(),
            });
        }

        // Cumulative end offset of every video in the concatenated stream
        let ends: Vec<u64> = videos
            .iter()
            .scan(0u64, |acc, v| {
                *acc += v.size;
                Some(*acc)
            })
            .collect();

        let mut footer = None;
        let mut frame_data = Vec::new();
        let mut counted_frames = 0u64;

        // Section 1 is the decoder header
        for section in sections.iter().skip(2) {
            if section.lines[0].starts_with("FILM") {
                footer = Some(parse_footer(index_path, section)?);
                continue;
            }

            for line in &section.lines {
                let mut tokens = line.split_whitespace();
                let Some(position) = tokens.next().and_then(|t| t.parse::<u64>().ok()) else {
                    tracing::trace!("Skipping non-data DGI line: {}", line);
                    continue;
                };

                let frames = tokens.count() as u32;
                counted_frames += frames as u64;

                let file = ends
                    .iter()
                    .position(|&end| position < end)
                    .unwrap_or(videos.len() - 1);

                if file == track {
                    frame_data.push(FrameDataRecord {
                        file,
                        position,
                        vob: None,
                        cell: None,
                        frames,
                    });
                }
            }
        }

        let total_frames = footer
            .as_ref()
            .map(|f: &IndexFooter| f.playback_frames)
            .unwrap_or(counted_frames);

        Ok(IndexFileInfo {
            kind: IndexerKind::DgIndexNv,
            path: index_path.to_path_buf(),
            track,
            videos,
            frame_data,
            total_frames,
            footer,
        })
    }
}

fn is_dgi_magic(line: &str) -> bool {
    line.starts_with(DGI_MAGIC_PREFIX) && line.contains(DGI_MAGIC_SUFFIX)
}

/// Parse the `path size` lines following the magic line.
fn parse_videos(index_path: &Path, head: &Section<'_>) -> IndexerResult<Vec<IndexedVideo>> {
    head.lines[1..]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let line_no = head.first_line + 1 + i;
            let (path, size) = line
                .trim()
                .rsplit_once(' ')
                .ok_or_else(|| IndexerError::parse(index_path, line_no, "expected 'path size'"))?;

            let size = size.parse().map_err(|_| {
                IndexerError::parse(index_path, line_no, format!("invalid size '{}'", size))
            })?;

            Ok(IndexedVideo {
                path: PathBuf::from(path.trim_end()),
                size,
            })
        })
        .collect()
}

fn parse_footer(index_path: &Path, section: &Section<'_>) -> IndexerResult<IndexFooter> {
    let mut footer = IndexFooter {
        film: 0.0,
        coded_frames: 0,
        playback_frames: 0,
        order: None,
    };

    for (i, line) in section.lines.iter().enumerate() {
        let line_no = section.first_line + i;
        let Some((key, value)) = line.trim().split_once(char::is_whitespace) else {
            continue;
        };
        let value = value.trim();

        let invalid = || {
            IndexerError::parse(
                index_path,
                line_no,
                format!("invalid {} value '{}'", key, value),
            )
        };

        match key {
            "FILM" => {
                footer.film = value.trim_end_matches('%').parse().map_err(|_| invalid())?;
            }
            "CODED" => footer.coded_frames = value.parse().map_err(|_| invalid())?,
            "PLAYBACK" => footer.playback_frames = value.parse().map_err(|_| invalid())?,
            "ORDER" => footer.order = Some(value.parse().map_err(|_| invalid())?),
            _ => {}
        }
    }

    Ok(footer)
}

impl DvdIndexer for DgIndexNv {
    fn kind(&self) -> IndexerKind {
        IndexerKind::DgIndexNv
    }

    fn index_path(&self, media: &Path) -> PathBuf {
        index_path_for(media, self.kind(), self.index_dir.as_deref())
    }

    fn build_index(&self, files: &[PathBuf], index_path: &Path) -> IndexerResult<()> {
        if files.is_empty() {
            return Err(IndexerError::EmptyFileList);
        }

        let inputs = files
            .iter()
            .map(|f| f.to_string_lossy())
            .collect::<Vec<_>>()
            .join(",");

        let args: Vec<OsString> = vec![
            "-i".into(),
            inputs.into(),
            "-o".into(),
            index_path.into(),
            "-h".into(),
        ];
        run_tool(&self.executable, &args)
    }

    fn update_index(&self, index_path: &Path, files: &[PathBuf]) -> IndexerResult<()> {
        let content =
            fs::read_to_string(index_path).map_err(|e| IndexerError::io(index_path, e))?;

        let sections = split_sections(&content);
        let head = sections
            .first()
            .filter(|s| is_dgi_magic(s.lines[0]))
            .ok_or_else(|| IndexerError::Unrecognised {
                kind: IndexerKind::DgIndexNv,
                path: index_path.to_path_buf(),
            })?;
        let previous = parse_videos(index_path, head)?;

        let mut lines = vec![head.lines[0].to_string()];
        for (i, file) in files.iter().enumerate() {
            // Keep the declared size; only new files are measured
            let size = match previous.get(i) {
                Some(video) => video.size,
                None => fs::metadata(file)
                    .map_err(|e| IndexerError::io(file, e))?
                    .len(),
            };
            lines.push(format!("{} {}", file.to_string_lossy(), size));
        }

        if let Some(updated) = replace_head(&content, &lines) {
            tracing::debug!("Updating video paths in {}", index_path.display());
            fs::write(index_path, updated).map_err(|e| IndexerError::io(index_path, e))?;
        }

        Ok(())
    }

    fn get_info(&self, index_path: &Path, track: usize) -> IndexerResult<IndexFileInfo> {
        let content =
            fs::read_to_string(index_path).map_err(|e| IndexerError::io(index_path, e))?;
        self.parse(index_path, &content, track)
    }
}
