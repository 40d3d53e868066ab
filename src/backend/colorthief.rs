//! Linked colour-thief backend
//!
//! Samples the decoded image in process and clusters the sample with the
//! shared k-means quantizer, so no external tool is needed.

use std::path::Path;

use log::debug;

use super::kmeans::quantize;
use super::{
    decode_image, sort_by_yiq, to_output, Backend, BackendContext, BackendError, BackendOutput,
    BackendResult, Extraction, SEED_BACKGROUND_DARKEN,
};
use crate::colour::Color;

pub const ID: &str = "colorthief";

/// Colours requested from the quantizer
pub const REQUESTED_COLORS: usize = 16;
/// Every n-th pixel is sampled
pub const QUALITY: usize = 10;

const MIN_ALPHA: u8 = 125;
const NEAR_WHITE: u8 = 250;

/// Every `quality`-th opaque, non-white pixel. Falls back to all opaque
/// pixels when the filter leaves nothing.
pub fn sample_pixels(image: &image::RgbaImage, quality: usize) -> Vec<[u8; 3]> {
    let opaque = || {
        image
            .pixels()
            .filter(|pixel| pixel.0[3] >= MIN_ALPHA)
            .map(|pixel| [pixel.0[0], pixel.0[1], pixel.0[2]])
    };

    let sampled: Vec<[u8; 3]> = opaque()
        .step_by(quality.max(1))
        .filter(|rgb| rgb.iter().any(|&c| c <= NEAR_WHITE))
        .collect();
    if sampled.is_empty() {
        opaque().collect()
    } else {
        sampled
    }
}

#[derive(Debug, Default)]
pub struct ColorThiefBackend;

impl Backend for ColorThiefBackend {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "Built-in k-means quantizer over sampled pixels"
    }

    fn extract(&self, image: &Path, _context: &BackendContext) -> BackendResult<Extraction> {
        let decoded = decode_image(image).map_err(|e| {
            BackendError::extraction_failed(ID, format!("cannot decode {}: {}", image.display(), e))
        })?;
        let pixels = sample_pixels(&decoded, QUALITY);
        debug!("Quantizing {} sampled pixels", pixels.len());
        Ok(Extraction::complete(quantize(&pixels, REQUESTED_COLORS)))
    }

    /// Sorted by YIQ and doubled, slot 0 darkened
    fn normalize(&self, raw: &[Color]) -> BackendResult<BackendOutput> {
        let mut sorted = raw.to_vec();
        sort_by_yiq(&mut sorted);
        let mut slots = [sorted.as_slice(), sorted.as_slice()].concat();
        if let Some(first) = slots.first_mut() {
            *first = first.darken(SEED_BACKGROUND_DARKEN);
        }
        to_output(ID, &slots)
    }
}
