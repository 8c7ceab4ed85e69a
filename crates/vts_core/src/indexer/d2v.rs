//! D2V Witch indexer and `.d2v` project file parser.
//!
//! A D2V file is made of blank-line separated sections:
//!
//! ```text
//! DGIndexProjectFile16
//! 2
//! /mnt/VIDEO_TS/VTS_01_1.VOB
//! /mnt/VIDEO_TS/VTS_01_2.VOB
//!
//! Stream_Type=1
//! ...
//!
//! 900 5 0 2048 0 1 1 92 b2 a2 b2
//! 900 5 1 0 0 1 1 92 b2 a2 b2 ff
//! ```
//!
//! Each data line is one GOP: `info matrix file position skip vob cell`
//! followed by one flag byte per frame. `ff` terminates the stream.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{FrameDataRecord, IndexFileInfo, IndexedVideo, IndexerError, IndexerResult};
use super::{index_path_for, replace_head, run_tool, split_sections, DvdIndexer};
use crate::models::IndexerKind;

const D2V_MAGIC: &str = "DGIndexProjectFile";
const END_OF_STREAM: &str = "ff";

/// D2V Witch indexer.
#[derive(Debug, Clone)]
pub struct D2vWitch {
    executable: String,
    index_dir: Option<PathBuf>,
}

impl Default for D2vWitch {
    fn default() -> Self {
        Self {
            executable: IndexerKind::D2vWitch.executable().to_string(),
            index_dir: None,
        }
    }
}

impl D2vWitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific d2vwitch executable.
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Store index files in `dir` instead of next to the media.
    pub fn with_index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.index_dir = Some(dir.into());
        self
    }

    /// Parse D2V text, looking up video sizes through `video_size`.
    pub fn parse(
        &self,
        index_path: &Path,
        content: &str,
        track: usize,
        video_size: &dyn Fn(&Path) -> IndexerResult<u64>,
    ) -> IndexerResult<IndexFileInfo> {
        let sections = split_sections(content);

        let head = sections.first().ok_or_else(|| IndexerError::Unrecognised {
            kind: IndexerKind::D2vWitch,
            path: index_path.to_path_buf(),
        })?;

        if !head.lines[0].contains(D2V_MAGIC) {
            return Err(IndexerError::Unrecognised {
                kind: IndexerKind::D2vWitch,
                path: index_path.to_path_buf(),
            });
        }

        let count_line = head.first_line + 1;
        let count: usize = head
            .lines
            .get(1)
            .and_then(|l| l.trim().parse().ok())
            .ok_or_else(|| IndexerError::parse(index_path, count_line, "missing video count"))?;

        if head.lines.len() < 2 + count {
            return Err(IndexerError::parse(
                index_path,
                count_line,
                format!("expected {} video paths, found {}", count, head.lines.len() - 2),
            ));
        }

        if track >= count {
            return Err(IndexerError::TrackOutOfRange { track, count });
        }

        let videos = head.lines[2..2 + count]
            .iter()
            .map(|line| {
                let path = PathBuf::from(line.trim());
                let size = video_size(&path)?;
                Ok(IndexedVideo { path, size })
            })
            .collect::<IndexerResult<Vec<_>>>()?;

        let mut frame_data = Vec::new();
        let mut total_frames = 0u64;

        // Section 1 holds the settings, section 2 the GOP lines
        if let Some(data) = sections.get(2) {
            for (i, line) in data.lines.iter().enumerate() {
                let line_no = data.first_line + i;
                let tokens: Vec<&str> = line.split_whitespace().collect();

                if tokens.first() == Some(&END_OF_STREAM) {
                    break;
                }
                let record = parse_gop_line(index_path, line_no, &tokens)?;
                total_frames += record.frames as u64;

                if record.file == track {
                    frame_data.push(record);
                }

                if tokens.last() == Some(&END_OF_STREAM) {
                    break;
                }
            }
        }

        Ok(IndexFileInfo {
            kind: IndexerKind::D2vWitch,
            path: index_path.to_path_buf(),
            track,
            videos,
            frame_data,
            total_frames,
            footer: None,
        })
    }
}

fn parse_gop_line(path: &Path, line: usize, tokens: &[&str]) -> IndexerResult<FrameDataRecord> {
    if tokens.len() < 8 {
        return Err(IndexerError::parse(
            path,
            line,
            format!("expected at least 8 fields, found {}", tokens.len()),
        ));
    }

    let field = |i: usize, name: &str| -> IndexerResult<u64> {
        tokens[i]
            .parse()
            .map_err(|_| IndexerError::parse(path, line, format!("invalid {} '{}'", name, tokens[i])))
    };

    let frames = tokens[7..]
        .iter()
        .filter(|&&flag| flag != END_OF_STREAM)
        .count() as u32;

    Ok(FrameDataRecord {
        file: field(2, "file")? as usize,
        position: field(3, "position")?,
        vob: Some(field(5, "vob")? as u32),
        cell: Some(field(6, "cell")? as u32),
        frames,
    })
}

impl DvdIndexer for D2vWitch {
    fn kind(&self) -> IndexerKind {
        IndexerKind::D2vWitch
    }

    fn index_path(&self, media: &Path) -> PathBuf {
        index_path_for(media, self.kind(), self.index_dir.as_deref())
    }

    fn build_index(&self, files: &[PathBuf], index_path: &Path) -> IndexerResult<()> {
        if files.is_empty() {
            return Err(IndexerError::EmptyFileList);
        }

        let mut args: Vec<OsString> = vec!["--output".into(), index_path.into()];
        args.extend(files.iter().map(OsString::from));
        run_tool(&self.executable, &args)
    }

    fn update_index(&self, index_path: &Path, files: &[PathBuf]) -> IndexerResult<()> {
        let content =
            fs::read_to_string(index_path).map_err(|e| IndexerError::io(index_path, e))?;

        let sections = split_sections(&content);
        let magic = sections
            .first()
            .map(|s| s.lines[0])
            .filter(|l| l.contains(D2V_MAGIC))
            .ok_or_else(|| IndexerError::Unrecognised {
                kind: IndexerKind::D2vWitch,
                path: index_path.to_path_buf(),
            })?;

        let mut head = vec![magic.to_string(), files.len().to_string()];
        head.extend(files.iter().map(|f| f.to_string_lossy().to_string()));

        if let Some(updated) = replace_head(&content, &head) {
            tracing::debug!("Updating video paths in {}", index_path.display());
            fs::write(index_path, updated).map_err(|e| IndexerError::io(index_path, e))?;
        }

        Ok(())
    }

    fn get_info(&self, index_path: &Path, track: usize) -> IndexerResult<IndexFileInfo> {
        let content =
            fs::read_to_string(index_path).map_err(|e| IndexerError::io(index_path, e))?;

        self.parse(index_path, &content, track, &|path: &Path| {
            fs::metadata(path)
                .map(|m| m.len())
                .map_err(|e| IndexerError::io(path, e))
        })
    }
}
