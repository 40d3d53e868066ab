//! Average colour of an image
//!
//! Contrast enforcement measures the palette against the wallpaper's mean
//! colour. The default shells out to ImageMagick; the linked averager decodes
//! the image in-process.

use std::path::Path;

use super::command::{available_candidates, CandidateCommand, CommandRunner};
use super::{decode_image, parse_hex_colors, BackendError, BackendResult};
use crate::colour::Color;
use crate::scheme::AveragerKind;

const ID: &str = "average";

pub trait ColorAverager: Send + Sync {
    fn average(&self, image: &Path, runner: &CommandRunner) -> BackendResult<Color>;
}

/// Averager for a configured kind
pub fn averager_for(kind: AveragerKind) -> Box<dyn ColorAverager> {
    match kind {
        AveragerKind::Magick => Box::new(MagickAverager::new()),
        AveragerKind::Linked => Box::new(PixelAverager),
    }
}

/// Resizes the image to a single pixel with ImageMagick
pub struct MagickAverager {
    candidates: Vec<CandidateCommand>,
}

impl Default for MagickAverager {
    fn default() -> Self {
        Self::new()
    }
}

impl MagickAverager {
    pub fn new() -> Self {
        Self::with_candidates(vec![CandidateCommand::new("magick"), CandidateCommand::new("convert")])
    }

    pub fn with_candidates(candidates: Vec<CandidateCommand>) -> Self {
        Self { candidates }
    }
}

impl ColorAverager for MagickAverager {
    fn average(&self, image: &Path, runner: &CommandRunner) -> BackendResult<Color> {
        let command = available_candidates(&self.candidates)
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::missing_dependency(ID, "ImageMagick"))?;

        let args = vec![
            image.to_string_lossy().into_owned(),
            "-resize".to_string(),
            "1x1!".to_string(),
            "txt:-".to_string(),
        ];
        let output = command
            .run(runner, &args)
            .map_err(|e| BackendError::from_command(ID, "ImageMagick", e))?;

        parse_hex_colors(&output)
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::extraction_failed(ID, "no average colour in ImageMagick output"))
    }
}

/// Mean over every decoded pixel
#[derive(Debug, Default, Clone, Copy)]
pub struct PixelAverager;

impl ColorAverager for PixelAverager {
    fn average(&self, image: &Path, _runner: &CommandRunner) -> BackendResult<Color> {
        let decoded = decode_image(image).map_err(|e| {
            BackendError::extraction_failed(ID, format!("cannot decode {}: {}", image.display(), e))
        })?;

        let mut sums = [0u64; 3];
        let mut count = 0u64;
        for pixel in decoded.pixels() {
            for (sum, channel) in sums.iter_mut().zip(pixel.0.iter()) {
                *sum += u64::from(*channel);
            }
            count += 1;
        }
        if count == 0 {
            return Err(BackendError::extraction_failed(ID, "image has no pixels"));
        }

        let mean = |sum: u64| (sum as f64 / count as f64).round() as u8;
        Ok(Color::new(mean(sums[0]), mean(sums[1]), mean(sums[2])))
    }
}
