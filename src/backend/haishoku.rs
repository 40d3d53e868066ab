//! Linked haishoku backend
//!
//! Shrinks the image to a thumbnail and clusters every pixel into a small
//! dominant palette. Fewer colours than the other backends, so the palette
//! is always padded.

use std::path::Path;

use image::imageops;
use log::debug;

use super::kmeans::quantize;
use super::{
    decode_image, sort_by_yiq, to_output, Backend, BackendContext, BackendError, BackendOutput,
    BackendResult, Extraction, SEED_BACKGROUND_DARKEN,
};
use crate::colour::Color;

pub const ID: &str = "haishoku";

/// Size of the dominant palette
pub const PALETTE_COLORS: usize = 8;
/// Longest thumbnail edge in pixels
pub const THUMBNAIL_EDGE: u32 = 256;

/// Every pixel of `image` after shrinking it to fit the thumbnail edge.
/// Alpha is ignored.
pub fn thumbnail_pixels(image: &image::RgbaImage) -> Vec<[u8; 3]> {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    let pixels = |img: &image::RgbaImage| -> Vec<[u8; 3]> {
        img.pixels().map(|p| [p.0[0], p.0[1], p.0[2]]).collect()
    };
    if longest <= THUMBNAIL_EDGE {
        return pixels(image);
    }

    let scale = f64::from(THUMBNAIL_EDGE) / f64::from(longest);
    let fit = |edge: u32| ((f64::from(edge) * scale).round() as u32).max(1);
    pixels(&imageops::thumbnail(image, fit(width), fit(height)))
}

#[derive(Debug, Default)]
pub struct HaishokuBackend;

impl Backend for HaishokuBackend {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "Built-in dominant palette of a thumbnail"
    }

    fn extract(&self, image: &Path, _context: &BackendContext) -> BackendResult<Extraction> {
        let decoded = decode_image(image).map_err(|e| {
            BackendError::extraction_failed(ID, format!("cannot decode {}: {}", image.display(), e))
        })?;
        let pixels = thumbnail_pixels(&decoded);
        debug!("Clustering {} thumbnail pixels", pixels.len());
        Ok(Extraction::complete(quantize(&pixels, PALETTE_COLORS)))
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
