//! Playback times and program chains decoded from VTS IFO files.

use serde::{Deserialize, Serialize};

use super::frame_rate::FrameRate;

/// A DVD playback time (timecode plus frame-rate code).
///
/// Decoded from the 4-byte BCD records of the IFO program chain tables.
/// Components are not necessarily normalised (a summed time may carry
/// more than 59 minutes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackTime {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub frames: u32,
    /// Two-bit frame-rate code (1 = 25 fps, 3 = 29.97 fps).
    pub fps_code: u8,
}

impl PlaybackTime {
    /// Create a new playback time.
    pub fn new(hours: u32, minutes: u32, seconds: u32, frames: u32, fps_code: u8) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            frames,
            fps_code,
        }
    }

    /// Frame rate this time was recorded at, if the code is valid.
    pub fn frame_rate(&self) -> Option<FrameRate> {
        FrameRate::from_dvd_code(self.fps_code)
    }

    /// Number of frames this time spans at the given timecode rate.
    pub fn to_frames(&self, timecode_fps: u64) -> u64 {
        let secs =
            self.hours as u64 * 3600 + self.minutes as u64 * 60 + self.seconds as u64;
        self.frames as u64 + secs * timecode_fps
    }

    /// Add another time to this one, carrying frames into seconds at
    /// `timecode_fps` and seconds/minutes at 60.
    ///
    /// The frame-rate code of `self` is kept.
    pub fn accumulate(&self, other: &PlaybackTime, timecode_fps: u64) -> Self {
        let fps = timecode_fps.max(1);
        let total = self.to_frames(fps) + other.to_frames(fps);

        let frames = total % fps;
        let secs = total / fps;

        Self {
            hours: (secs / 3600) as u32,
            minutes: ((secs % 3600) / 60) as u32,
            seconds: (secs % 60) as u32,
            frames: frames as u32,
            fps_code: self.fps_code,
        }
    }
}

impl std::fmt::Display for PlaybackTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}.{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

/// One program chain (title) with one playback time per chapter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgramChain {
    /// Total playback time declared for the whole chain.
    pub duration: PlaybackTime,
    /// Chapter playback times in program order.
    pub playback_times: Vec<PlaybackTime>,
}

impl ProgramChain {
    /// Create a program chain from chapter times.
    pub fn new(duration: PlaybackTime, playback_times: Vec<PlaybackTime>) -> Self {
        Self {
            duration,
            playback_times,
        }
    }

    /// Number of chapters in this chain.
    pub fn chapter_count(&self) -> usize {
        self.playback_times.len()
    }

    /// Frame-rate codes of every chapter, in order.
    pub fn fps_codes(&self) -> Vec<u8> {
        self.playback_times.iter().map(|t| t.fps_code).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_frames_uses_timecode_rate() {
        let time = PlaybackTime::new(1, 2, 3, 4, 3);
        assert_eq!(time.to_frames(30), 4 + (3600 + 120 + 3) * 30);
        assert_eq!(time.to_frames(25), 4 + (3600 + 120 + 3) * 25);
    }

    #[test]
    fn accumulate_carries() {
        let a = PlaybackTime::new(0, 59, 59, 20, 1);
        let b = PlaybackTime::new(0, 0, 0, 10, 1);
        let sum = a.accumulate(&b, 25);

        assert_eq!(sum, PlaybackTime::new(1, 0, 0, 5, 1));
        assert_eq!(sum.to_frames(25), a.to_frames(25) + b.to_frames(25));
    }

    #[test]
    fn display_pads_components() {
        let time = PlaybackTime::new(0, 5, 7, 12, 3);
        assert_eq!(time.to_string(), "00:05:07.12");
    }

    #[test]
    fn chain_reports_codes() {
        let chain = ProgramChain::new(
            PlaybackTime::default(),
            vec![PlaybackTime::new(0, 0, 1, 0, 3), PlaybackTime::new(0, 0, 2, 0, 1)],
        );
        assert_eq!(chain.chapter_count(), 2);
        assert_eq!(chain.fps_codes(), vec![3, 1]);
    }
}
