//! VapourSynth-backed sequence provider.
//!
//! Evaluates a small script that opens the index with the indexer's
//! source filter and reads the decoded frame count and frame rate.

use std::path::Path;

use vapoursynth::prelude::*;
use vapoursynth::video_info::Property;

use super::provider::SequenceProvider;
use super::types::{FrameRanges, FrameSequence, SequenceError, SequenceResult, SourceArgs};
use crate::models::{FrameRate, IndexerKind};

/// Sequence provider that decodes through VapourSynth.
#[derive(Debug, Clone)]
pub struct VapourSynthProvider {
    kind: IndexerKind,
    defaults: SourceArgs,
}

impl VapourSynthProvider {
    pub fn new(kind: IndexerKind) -> Self {
        Self {
            kind,
            defaults: SourceArgs::new(),
        }
    }

    /// Arguments applied to every open, overridden per call.
    pub fn with_defaults(mut self, defaults: SourceArgs) -> Self {
        self.defaults = defaults;
        self
    }

    /// Check if VapourSynth can evaluate scripts.
    pub fn is_available() -> bool {
        let script = "import vapoursynth as vs\ncore = vs.core\ncore.std.BlankClip().set_output()";
        Environment::from_script(script).is_ok()
    }

    /// Build the script opening `index_path`.
    fn create_script(&self, index_path: &Path, args: &SourceArgs) -> String {
        let path_str = index_path.to_string_lossy().replace('\\', "/");

        let mut call = format!("{}=r\"{}\"", self.kind.source_argument(), path_str);
        for (key, value) in self.defaults.merged(args).iter() {
            call.push_str(&format!(", {}={}", key, value));
        }

        format!(
            r#"import vapoursynth as vs
core = vs.core
clip = core.{}({})
clip.set_output()
"#,
            self.kind.source_filter(),
            call
        )
    }
}

impl SequenceProvider for VapourSynthProvider {
    type Sequence = FrameRanges;

    fn open(&self, index_path: &Path, args: &SourceArgs) -> SequenceResult<FrameRanges> {
        let script = self.create_script(index_path, args);
        tracing::debug!("[VapourSynth] Script:\n{}", script);

        let open_failed = |message: String| SequenceError::OpenFailed {
            path: index_path.to_path_buf(),
            message,
        };

        let environment = Environment::from_script(&script)
            .map_err(|e| open_failed(format!("VapourSynth script evaluation failed: {}", e)))?;

        let (node, _) = environment
            .get_output(0)
            .map_err(|e| open_failed(format!("Failed to get VapourSynth output: {}", e)))?;

        let info = node.info();
        let framerate = match info.framerate {
            Property::Constant(f) => f,
            Property::Variable => {
                return Err(SequenceError::VariableFrameRate {
                    path: index_path.to_path_buf(),
                });
            }
        };

        let num_frames = info.num_frames as u64;
        tracing::info!(
            "[VapourSynth] {}: {} frames at {}/{}",
            index_path.display(),
            num_frames,
            framerate.numerator,
            framerate.denominator
        );

        let fps = FrameRate::new(framerate.numerator as u32, framerate.denominator as u32);
        Ok(FrameRanges::contiguous(num_frames).with_frame_rate(fps))
    }
}
