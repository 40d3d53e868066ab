//! K-means colour quantization in CIE Lab
//!
//! Shared by the in-process backends. Clustering runs with a fixed seed so
//! the same pixels always yield the same colours.

use std::cmp::Reverse;
use std::collections::HashSet;

use kmeans_colors::get_kmeans;
use palette::{FromColor, IntoColor, Lab, Srgb};

use crate::colour::Color;

const MAX_ITERATIONS: usize = 20;
const CONVERGENCE: f32 = 1e-4;
const SEED: u64 = 0;

fn to_lab(pixel: &[u8; 3]) -> Lab {
    Srgb::new(pixel[0], pixel[1], pixel[2])
        .into_format::<f32>()
        .into_color()
}

fn from_lab(lab: Lab) -> Color {
    let rgb: Srgb<u8> = Srgb::<f32>::from_color(lab).into_format();
    Color::new(rgb.red, rgb.green, rgb.blue)
}

/// Reduce `pixels` to at most `max_colors` cluster centres, most populous
/// first. Inputs with fewer distinct colours yield one colour per distinct
/// pixel value.
pub fn quantize(pixels: &[[u8; 3]], max_colors: usize) -> Vec<Color> {
    let distinct = pixels.iter().collect::<HashSet<_>>().len();
    // Cluster indices are stored as u8
    let k = max_colors.min(distinct).min(usize::from(u8::MAX) + 1);
    if k == 0 {
        return Vec::new();
    }

    let lab: Vec<Lab> = pixels.iter().map(to_lab).collect();
    let result = get_kmeans(k, MAX_ITERATIONS, CONVERGENCE, false, &lab, SEED);

    let mut population = vec![0usize; result.centroids.len()];
    for &index in &result.indices {
        population[usize::from(index)] += 1;
    }

    let mut clusters: Vec<(usize, Lab)> = population
        .into_iter()
        .zip(result.centroids)
        .filter(|(count, _)| *count > 0)
        .collect();
    clusters.sort_by_key(|(count, _)| Reverse(*count));
    clusters.into_iter().map(|(_, lab)| from_lab(lab)).collect()
}
