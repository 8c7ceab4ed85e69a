//! Binary VTS IFO reader.
//!
//! Decodes the program chain information table (VTS_PGCI) of a video
//! title set IFO into one [`ProgramChain`] per PGC. Every program of a
//! chain becomes one chapter whose playback time is the sum of its cells.

use std::fs;
use std::path::Path;

use super::types::{IfoError, IfoResult};
use crate::models::{FrameRate, PlaybackTime, ProgramChain};

pub(crate) const VTS_MAGIC: &[u8; 12] = b"DVDVIDEO-VTS";
pub(crate) const SECTOR_SIZE: usize = 2048;
/// Offset of the VTS_PGCI start sector in the VTS IFO header.
pub(crate) const VTS_PGCI_SECTOR: usize = 0xCC;
pub(crate) const PGC_PROGRAM_MAP_OFFSET: usize = 0xE6;
pub(crate) const PGC_CELL_PLAYBACK_OFFSET: usize = 0xE8;
pub(crate) const CELL_PLAYBACK_SIZE: usize = 24;

/// Decodes program chains from an IFO file.
pub trait IfoDecoder {
    /// Decode every program chain of the IFO at `path`, in table order.
    fn decode_program_chains(&self, path: &Path) -> IfoResult<Vec<ProgramChain>>;
}

/// Reads program chains straight from VTS IFO bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct VtsIfoReader;

impl VtsIfoReader {
    pub fn new() -> Self {
        Self
    }

    /// Decode program chains from in-memory IFO data.
    ///
    /// `path` is only used for error messages.
    pub fn parse(&self, path: &Path, data: &[u8]) -> IfoResult<Vec<ProgramChain>> {
        PgciParser { path, data }.program_chains()
    }
}

impl IfoDecoder for VtsIfoReader {
    fn decode_program_chains(&self, path: &Path) -> IfoResult<Vec<ProgramChain>> {
        let data = fs::read(path).map_err(|e| IfoError::read(path, e))?;
        let chains = self.parse(path, &data)?;

        tracing::debug!(
            "Decoded {} program chains from {}",
            chains.len(),
            path.display()
        );

        Ok(chains)
    }
}

struct PgciParser<'a> {
    path: &'a Path,
    data: &'a [u8],
}

impl PgciParser<'_> {
    fn program_chains(&self) -> IfoResult<Vec<ProgramChain>> {
        if self.data.len() < VTS_MAGIC.len() || &self.data[..VTS_MAGIC.len()] != VTS_MAGIC {
            return Err(IfoError::malformed(self.path, "missing DVDVIDEO-VTS header"));
        }

        let table = self.u32_at(VTS_PGCI_SECTOR)? as usize * SECTOR_SIZE;
        if table == 0 {
            return Err(IfoError::malformed(self.path, "VTS_PGCI sector is 0"));
        }

        let count = self.u16_at(table)? as usize;
        let mut chains = Vec::with_capacity(count);

        for title in 0..count {
            let search_pointer = table + 8 + title * 8;
            let pgc = table + self.u32_at(search_pointer + 4)? as usize;
            chains.push(self.program_chain(title, pgc)?);
        }

        Ok(chains)
    }

    fn program_chain(&self, title: usize, pgc: usize) -> IfoResult<ProgramChain> {
        let program_count = self.u8_at(pgc + 2)? as usize;
        let cell_count = self.u8_at(pgc + 3)? as usize;
        let duration = self.playback_time(pgc + 4)?;

        if program_count == 0 {
            return Ok(ProgramChain::new(duration, Vec::new()));
        }

        let program_map = pgc + self.u16_at(pgc + PGC_PROGRAM_MAP_OFFSET)? as usize;
        let cell_table = pgc + self.u16_at(pgc + PGC_CELL_PLAYBACK_OFFSET)? as usize;

        let entry_cells = (0..program_count)
            .map(|p| self.u8_at(program_map + p).map(|c| c as usize))
            .collect::<IfoResult<Vec<_>>>()?;

        let cells = (0..cell_count)
            .map(|c| self.playback_time(cell_table + c * CELL_PLAYBACK_SIZE + 4))
            .collect::<IfoResult<Vec<_>>>()?;

        let mut playback_times = Vec::with_capacity(program_count);

        for (program, &first) in entry_cells.iter().enumerate() {
            // Cell numbers are 1-based; a program runs up to the next entry cell
            let end = entry_cells
                .get(program + 1)
                .copied()
                .unwrap_or(cell_count + 1);

            if first == 0 || first >= end || end > cell_count + 1 {
                return Err(IfoError::malformed(
                    self.path,
                    format!(
                        "title {} program {} has invalid cell range {}..{} ({} cells)",
                        title, program, first, end, cell_count
                    ),
                ));
            }

            playback_times.push(self.program_time(title, &cells[first - 1..end - 1])?);
        }

        Ok(ProgramChain::new(duration, playback_times))
    }

    fn program_time(&self, title: usize, cells: &[PlaybackTime]) -> IfoResult<PlaybackTime> {
        let code = cells[0].fps_code;

        if cells.iter().any(|c| c.fps_code != code) {
            return Err(IfoError::VariableFrameRate {
                title,
                codes: cells.iter().map(|c| c.fps_code).collect(),
            });
        }

        let fps = FrameRate::from_dvd_code(code)
            .ok_or(IfoError::UnknownFrameRate { title, code })?
            .timecode_fps();

        let zero = PlaybackTime::new(0, 0, 0, 0, code);
        Ok(cells.iter().fold(zero, |acc, cell| acc.accumulate(cell, fps)))
    }

    fn playback_time(&self, offset: usize) -> IfoResult<PlaybackTime> {
        let bytes = self.bytes(offset, 4)?;
        let frame_byte = bytes[3];

        Ok(PlaybackTime::new(
            bcd(bytes[0]),
            bcd(bytes[1]),
            bcd(bytes[2]),
            bcd(frame_byte & 0x3f),
            frame_byte >> 6,
        ))
    }

    fn bytes(&self, offset: usize, len: usize) -> IfoResult<&[u8]> {
        self.data.get(offset..offset + len).ok_or_else(|| {
            IfoError::malformed(
                self.path,
                format!(
                    "read of {} bytes at 0x{:X} past end of data ({} bytes)",
                    len,
                    offset,
                    self.data.len()
                ),
            )
        })
    }

    fn u8_at(&self, offset: usize) -> IfoResult<u8> {
        Ok(self.bytes(offset, 1)?[0])
    }

    fn u16_at(&self, offset: usize) -> IfoResult<u16> {
        let b = self.bytes(offset, 2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32_at(&self, offset: usize) -> IfoResult<u32> {
        let b = self.bytes(offset, 4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Decode a packed BCD byte.
fn bcd(byte: u8) -> u32 {
    (byte >> 4) as u32 * 10 + (byte & 0x0f) as u32
}


#[cfg(test)]
mod tests {
    use super::fixture::{build_ifo, time};
    use super::*;
    use std::path::PathBuf;

    fn parse(data: &[u8]) -> IfoResult<Vec<ProgramChain>> {
        VtsIfoReader::new().parse(Path::new("VTS_01_0.IFO"), data)
    }

    #[test]
    fn bcd_decodes() {
        assert_eq!(bcd(0x00), 0);
        assert_eq!(bcd(0x59), 59);
        assert_eq!(bcd(0x29), 29);
    }

    #[test]
    fn decodes_programs_as_chapters() {
        let data = build_ifo(&[vec![
            vec![time(0, 1, 0, 0, 3)],
            vec![time(0, 0, 30, 15, 3)],
        ]]);

        let chains = parse(&data).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].playback_times.len(), 2);
        assert_eq!(chains[0].playback_times[0], PlaybackTime::new(0, 1, 0, 0, 3));
        assert_eq!(chains[0].playback_times[1], PlaybackTime::new(0, 0, 30, 15, 3));
    }

    #[test]
    fn sums_cells_within_a_program() {
        let data = build_ifo(&[vec![vec![time(0, 0, 59, 20, 1), time(0, 0, 0, 10, 1)]]]);

        let chains = parse(&data).unwrap();
        let chapter = chains[0].playback_times[0];
        assert_eq!(chapter, PlaybackTime::new(0, 1, 0, 5, 1));
        assert_eq!(chapter.to_frames(25), 59 * 25 + 20 + 10);
    }

    #[test]
    fn decodes_multiple_chains_in_order() {
        let data = build_ifo(&[
            vec![vec![time(0, 0, 1, 0, 1)]],
            vec![vec![time(0, 0, 2, 0, 1)], vec![time(0, 0, 3, 0, 1)]],
        ]);

        let chains = parse(&data).unwrap();
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].chapter_count(), 1);
        assert_eq!(chains[1].chapter_count(), 2);
        assert_eq!(chains[1].playback_times[1].seconds, 3);
    }

    #[test]
    fn mixed_cell_rates_in_program_fail() {
        let data = build_ifo(&[vec![vec![time(0, 0, 1, 0, 1), time(0, 0, 1, 0, 3)]]]);

        match parse(&data) {
            Err(IfoError::VariableFrameRate { title, codes }) => {
                assert_eq!(title, 0);
                assert_eq!(codes, vec![1, 3]);
            }
            other => panic!("expected VariableFrameRate, got {:?}", other),
        }
    }

    #[test]
    fn rejects_missing_header() {
        let result = parse(b"not an ifo file at all");
        assert!(matches!(result, Err(IfoError::Malformed { .. })));
    }

    #[test]
    fn rejects_truncated_table() {
        let mut data = build_ifo(&[vec![vec![time(0, 0, 1, 0, 1)]]]);
        data.truncate(SECTOR_SIZE + 4);
        assert!(matches!(parse(&data), Err(IfoError::Malformed { .. })));
    }

    #[test]
    fn read_missing_file_fails() {
        let result = VtsIfoReader::new()
            .decode_program_chains(&PathBuf::from("/nonexistent/VTS_01_0.IFO"));
        assert!(matches!(result, Err(IfoError::ReadError { .. })));
    }
}
