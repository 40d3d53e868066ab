//! Colour scheme generation
//!
//! Turns backend output into the final [`ColorScheme`]:
//!
//! - [`adjust`]: deterministic shading of the raw 16-slot palette
//! - [`contrast`]: optional W3 contrast enforcement against the wallpaper
//! - [`cache`]: content-checked result cache keyed on image and options
//! - [`generator`]: the orchestrator tying backends, shading and cache together

pub mod adjust;
pub mod cache;
pub mod config;
pub mod contrast;
pub mod generator;
pub mod palette;

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::backend::registry::DEFAULT_BACKEND;
use crate::colour::{Alpha, Color};

pub use adjust::{adjust, ShadeConstants};
pub use cache::{CacheKey, CacheLookup, CacheManager, CacheMiss};
pub use config::{AveragerKind, GeneratorConfig};
pub use contrast::{ensure_contrast, ContrastError, ContrastOutcome};
pub use generator::{GenerateError, GenerateResult, Generation, Generator, Origin};
pub use self::palette::{Palette, PALETTE_SIZE};

/// Strategy for deriving the bright slots in 16-colour mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadeMode {
    /// Classic 9-colour derivation
    #[default]
    None,
    /// Slots 9-14 become lightened copies of 1-6
    Lighten,
    /// Slots 1-6 are darkened in place
    Darken,
    /// Both of the above
    Dual,
}

impl ShadeMode {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, ShadeMode::None)
    }

    pub fn lightens(&self) -> bool {
        matches!(self, ShadeMode::Lighten | ShadeMode::Dual)
    }

    pub fn darkens(&self) -> bool {
        matches!(self, ShadeMode::Darken | ShadeMode::Dual)
    }

    /// Name used on the command line and in cache file names
    pub fn as_str(&self) -> &'static str {
        match self {
            ShadeMode::None => "none",
            ShadeMode::Lighten => "lighten",
            ShadeMode::Darken => "darken",
            ShadeMode::Dual => "dual",
        }
    }
}

impl fmt::Display for ShadeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShadeMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(ShadeMode::None),
            "lighten" => Ok(ShadeMode::Lighten),
            "darken" => Ok(ShadeMode::Darken),
            "dual" => Ok(ShadeMode::Dual),
            _ => Err(format!("Invalid 16 colour mode: {}. Valid options: lighten, darken, dual", s)),
        }
    }
}

/// Options bag for a single generation
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Light scheme instead of dark
    pub light: bool,
    /// 16-colour shading strategy
    pub shade_mode: ShadeMode,
    /// Saturation delta in [-1, 1], kept as typed so it can be echoed into the cache key
    pub saturation: Option<String>,
    /// Target W3 contrast ratio in [1, 21], kept as typed
    pub contrast: Option<String>,
    /// Backend identifier, or `random`
    pub backend: String,
    pub alpha: Alpha,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            light: false,
            shade_mode: ShadeMode::None,
            saturation: None,
            contrast: None,
            backend: DEFAULT_BACKEND.to_string(),
            alpha: Alpha::default(),
        }
    }
}

/// Special slots consumed by terminals directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Special {
    pub background: Color,
    pub foreground: Color,
    pub cursor: Color,
}

/// The finished, immutable result of a generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    /// Content checksum of the source image
    pub checksum: String,
    /// Source image path with forward slashes
    pub wallpaper: String,
    pub alpha: Alpha,
    pub special: Special,
    pub colors: Palette,
}

impl ColorScheme {
    pub fn new(checksum: String, wallpaper: &Path, alpha: Alpha, colors: Palette) -> Self {
        Self {
            checksum,
            wallpaper: normalize_wallpaper_path(wallpaper),
            alpha,
            special: Special {
                background: colors[0],
                foreground: colors[15],
                cursor: colors[15],
            },
            colors,
        }
    }

    /// Read a persisted scheme
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read colour scheme: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse colour scheme: {}", path.display()))
    }

    /// Flatten `special` and `colors` into named values for template export
    pub fn named_colors(&self) -> Vec<(String, Color)> {
        let mut named = vec![
            ("background".to_string(), self.special.background),
            ("foreground".to_string(), self.special.foreground),
            ("cursor".to_string(), self.special.cursor),
        ];
        named.extend(
            self.colors
                .iter()
                .enumerate()
                .map(|(i, color)| (Palette::slot_name(i), *color)),
        );
        named
    }
}

/// Wallpaper paths are stored with forward slashes so the JSON stays valid
/// and portable on Windows.
pub fn normalize_wallpaper_path(path: &Path) -> String {
    let path = path.to_string_lossy();
    if cfg!(windows) {
        path.replace('\\', "/")
    } else {
        path.into_owned()
    }
}
