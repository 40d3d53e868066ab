//! ImageMagick backend
//!
//! Quantizes a downscaled copy of the image with `-colors N -unique-colors`.
//! ImageMagick often returns fewer unique colours than asked for on
//! low-entropy images, so N is escalated over a fixed range before giving up
//! and duplicating what was found.

use std::path::Path;

use log::{debug, error, warn};

use super::command::{available_candidates, CandidateCommand, CommandError, CommandRunner};
use super::{
    parse_hex_colors, pad_by_duplication, slice, to_output, Backend, BackendContext,
    BackendError, BackendOutput, BackendResult, Extraction,
};
use crate::colour::Color;
use crate::scheme::PALETTE_SIZE;

pub const ID: &str = "wal";

/// First `-colors` value requested
pub const FIRST_COLOR_COUNT: usize = 16;
/// Number of increasing `-colors` values tried per command
pub const COLOR_COUNT_STEPS: usize = 20;

const DEPENDENCY: &str = "ImageMagick";

/// `magick`, `magick convert` and `convert`, in order of preference
pub fn imagemagick_candidates() -> Vec<CandidateCommand> {
    vec![
        CandidateCommand::new("magick"),
        CandidateCommand::with_prefix("magick", &["convert"]),
        CandidateCommand::new("convert"),
    ]
}

/// First frame of `image` in ImageMagick's input syntax
pub(crate) fn first_frame(image: &Path) -> String {
    format!("{}[0]", image.to_string_lossy())
}

pub struct WalBackend {
    candidates: Vec<CandidateCommand>,
}

impl Default for WalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl WalBackend {
    pub fn new() -> Self {
        Self::with_candidates(imagemagick_candidates())
    }

    pub fn with_candidates(candidates: Vec<CandidateCommand>) -> Self {
        Self { candidates }
    }

    /// Escalate the colour count with one command. `Ok(None)` means this
    /// command is unusable and the next one should be tried.
    fn extract_with(
        &self,
        candidate: &CandidateCommand,
        image: &Path,
        runner: &CommandRunner,
    ) -> BackendResult<Option<Extraction>> {
        let last = FIRST_COLOR_COUNT + COLOR_COUNT_STEPS - 1;
        let mut colors = Vec::new();

        for count in FIRST_COLOR_COUNT..=last {
            let args = vec![
                first_frame(image),
                "-resize".to_string(),
                "25%".to_string(),
                "-colors".to_string(),
                count.to_string(),
                "-unique-colors".to_string(),
                "txt:-".to_string(),
            ];

            let output = match candidate.run(runner, &args) {
                Ok(output) => output,
                Err(e @ (CommandError::Timeout { .. } | CommandError::NotFound { .. })) => {
                    return Err(BackendError::from_command(ID, DEPENDENCY, e));
                }
                Err(e) => {
                    error!("ImageMagick error: {}", e);
                    return Ok(None);
                }
            };

            colors = parse_hex_colors(&output);
            if colors.len() >= PALETTE_SIZE {
                return Ok(Some(Extraction::complete(colors)));
            }

            if count < last {
                warn!(
                    "ImageMagick couldn't generate a palette with {}, trying a larger palette size {}",
                    candidate,
                    count + 1
                );
            }
        }

        if colors.is_empty() {
            return Ok(None);
        }

        error!("ImageMagick couldn't generate a suitable palette with {}", candidate);
        warn!("Duplicating the {} colours found, good results not guaranteed", colors.len());
        pad_by_duplication(&mut colors, PALETTE_SIZE);
        Ok(Some(Extraction {
            colors,
            degraded: true,
        }))
    }
}

impl Backend for WalBackend {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "ImageMagick colour quantization (default)"
    }

    fn extract(&self, image: &Path, context: &BackendContext) -> BackendResult<Extraction> {
        let candidates = available_candidates(&self.candidates);
        if candidates.is_empty() {
            return Err(BackendError::missing_dependency(ID, DEPENDENCY));
        }

        for candidate in &candidates {
            debug!("Trying {}...", candidate);
            if let Some(extraction) = self.extract_with(candidate, image, &context.runner)? {
                return Ok(extraction);
            }
            warn!("Failed to generate colours with {}", candidate);
        }

        let tried: Vec<String> = candidates.iter().map(|c| c.to_string()).collect();
        Err(BackendError::extraction_failed(
            ID,
            format!(
                "failed to generate a palette from {} with these commands: {}",
                image.display(),
                tried.join(", ")
            ),
        ))
    }

    /// `raw[0]`, then `raw[8..16]`, then `raw[8..len-1]`
    fn normalize(&self, raw: &[Color]) -> BackendResult<BackendOutput> {
        let mut slots: Vec<Color> = raw.iter().take(1).copied().collect();
        slots.extend_from_slice(slice(raw, 8, 16));
        slots.extend_from_slice(slice(raw, 8, raw.len().saturating_sub(1)));
        to_output(ID, &slots)
    }
}
