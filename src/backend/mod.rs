//! Palette extraction backends
//!
//! A backend turns an image into raw colours ([`Backend::extract`]), reorders
//! them into exactly 16 slots ([`Backend::normalize`]) and hands the result to
//! the shared adjuster ([`Backend::get`]). The set of backends is closed and
//! lives in [`registry::BackendRegistry`].

pub mod average;
pub mod colorthief;
pub mod command;
pub mod error;
pub mod haishoku;
pub mod kmeans;
pub mod okthief;
pub mod registry;
pub mod schemer2;
pub mod wal;

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::colour::Color;
use crate::scheme::{adjust, GenerationOptions, Palette, ShadeConstants};

pub use average::{ColorAverager, MagickAverager, PixelAverager};
pub use command::{CandidateCommand, CommandError, CommandRunner};
pub use error::{BackendError, BackendResult};
pub use registry::{BackendRegistry, DEFAULT_BACKEND, RANDOM_BACKEND};

/// Slot 0 darkening applied by the sorting backends before adjustment
pub const SEED_BACKGROUND_DARKEN: f64 = 0.80;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[A-Fa-f0-9]{6}").expect("valid regex"));

/// Raw colours pulled from an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub colors: Vec<Color>,
    /// Colours had to be duplicated to reach the requested count
    pub degraded: bool,
}

impl Extraction {
    pub fn complete(colors: Vec<Color>) -> Self {
        Self {
            colors,
            degraded: false,
        }
    }
}

/// A 16-slot palette plus whether any step padded it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendOutput {
    pub palette: Palette,
    pub degraded: bool,
}

/// Collaborators every backend may use
#[derive(Debug, Clone, Default)]
pub struct BackendContext {
    pub runner: CommandRunner,
    pub shading: ShadeConstants,
}

impl BackendContext {
    pub fn new(runner: CommandRunner, shading: ShadeConstants) -> Self {
        Self { runner, shading }
    }
}

/// Capability set shared by all extraction backends
pub trait Backend: Send + Sync {
    /// Identifier used on the command line and in cache keys
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Pull raw colours out of `image`
    fn extract(&self, image: &Path, context: &BackendContext) -> BackendResult<Extraction>;

    /// Reorder raw colours into exactly 16 slots
    fn normalize(&self, raw: &[Color]) -> BackendResult<BackendOutput>;

    /// Extract, normalize and adjust. Adjustment happens exactly once here.
    fn get(
        &self,
        image: &Path,
        options: &GenerationOptions,
        context: &BackendContext,
    ) -> BackendResult<BackendOutput> {
        let extraction = self.extract(image, context)?;
        let normalized = self.normalize(&extraction.colors)?;
        Ok(BackendOutput {
            palette: adjust(
                &normalized.palette,
                options.light,
                options.shade_mode,
                &context.shading,
            ),
            degraded: extraction.degraded || normalized.degraded,
        })
    }
}

/// First `#RRGGBB` on each line, lines without one are skipped
pub fn parse_hex_colors(output: &str) -> Vec<Color> {
    output
        .lines()
        .filter_map(|line| HEX_COLOR.find(line))
        .filter_map(|found| Color::from_hex(found.as_str()).ok())
        .collect()
}

/// Stable sort by YIQ, darkest first
pub fn sort_by_yiq(colors: &mut [Color]) {
    colors.sort_by(|a, b| a.cmp_yiq(b));
}

/// Repeat the whole list until it holds at least `count` colours. Returns
/// whether any duplication happened.
pub fn pad_by_duplication(colors: &mut Vec<Color>, count: usize) -> bool {
    if colors.is_empty() || colors.len() >= count {
        return false;
    }
    while colors.len() < count {
        colors.extend_from_within(..);
    }
    true
}

/// Turn a reordered list into a palette, reporting padding as degradation
pub fn to_output(backend: &str, slots: &[Color]) -> BackendResult<BackendOutput> {
    let (palette, padded) = Palette::fill_from(slots)
        .ok_or_else(|| BackendError::extraction_failed(backend, "no colours extracted"))?;
    if padded {
        log::warn!(
            "Backend '{}' produced only {} colours, duplicating to fill the palette",
            backend,
            slots.len()
        );
    }
    Ok(BackendOutput {
        palette,
        degraded: padded,
    })
}

/// Decode an image, sniffing the format from its content
pub fn decode_image(image: &Path) -> Result<image::RgbaImage, image::ImageError> {
    Ok(image::ImageReader::open(image)?
        .with_guessed_format()?
        .decode()?
        .to_rgba8())
}

/// Bounded slice that tolerates short inputs
pub(crate) fn slice(colors: &[Color], start: usize, end: usize) -> &[Color] {
    let end = end.min(colors.len());
    let start = start.min(end);
    &colors[start..end]
}
