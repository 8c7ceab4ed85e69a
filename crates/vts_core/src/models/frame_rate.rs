//! Rational frame rates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A rational frame rate (e.g. 30000/1001).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    pub numerator: u32,
    pub denominator: u32,
}

impl FrameRate {
    /// NTSC film/video rate, 29.97 fps.
    pub const NTSC: FrameRate = FrameRate::new(30000, 1001);
    /// PAL rate, 25 fps.
    pub const PAL: FrameRate = FrameRate::new(25, 1);

    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Resolve the two-bit frame-rate code stored in IFO playback times.
    ///
    /// Codes 0 and 2 are reserved and have no rate.
    pub fn from_dvd_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::PAL),
            3 => Some(Self::NTSC),
            _ => None,
        }
    }

    /// Integer frame rate used to convert IFO timecodes into frame counts.
    ///
    /// DVD timecodes count 30 frames per second on NTSC discs (non-drop),
    /// and 25 on everything else.
    pub fn timecode_fps(&self) -> u64 {
        if self.numerator == 30000 {
            30
        } else {
            25
        }
    }

    /// Frame rate as a float.
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::NTSC
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}
