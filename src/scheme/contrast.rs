//! W3 Contrast Enforcement
//!
//! Optionally nudges palette slots 1-14 so they reach a requested contrast
//! ratio against the wallpaper's average colour. Hue is preserved; saturation
//! and value are found by a fixed-length bisection in HSV space.
//!
//! Invalid input never propagates: the palette is returned untouched and the
//! reason is logged and reported through [`ContrastOutcome::Skipped`].

use log::{debug, warn};
use thiserror::Error;

use crate::colour::Color;
use super::palette::Palette;

/// Bisection steps; the result lies within 2^-10 of the searched interval.
pub const BISECTION_ITERATIONS: usize = 10;

/// Valid W3 contrast ratios
pub const MIN_CONTRAST: f64 = 1.0;
pub const MAX_CONTRAST: f64 = 21.0;

/// Targets at or beyond these would flatten colours to pure white/black
pub const LUMINANCE_CEILING: f64 = 0.99;
pub const LUMINANCE_FLOOR: f64 = 0.01;

/// Slots subject to enforcement; 0 and 15 are exempt
const ENFORCED_SLOTS: std::ops::Range<usize> = 1..15;

/// Reasons contrast enforcement was skipped
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContrastError {
    #[error("Contrast ratio '{value}' could not be parsed")]
    Unparsable { value: String },

    #[error("Specified contrast ratio {ratio} is too extreme (must be between 1 and 21)")]
    OutOfRange { ratio: f64 },

    #[error("Can't contrast this palette without changing colours to white (target luminance {target:.3})")]
    TargetTooBright { target: f64 },

    #[error("Can't contrast this palette without changing colours to black (target luminance {target:.3})")]
    TargetTooDark { target: f64 },
}

/// What [`ensure_contrast`] did to the palette
#[derive(Debug, Clone, PartialEq)]
pub enum ContrastOutcome {
    /// Enforcement ran; `adjusted` slots were changed
    Applied { target: f64, adjusted: usize },
    /// Palette returned unmodified
    Skipped(ContrastError),
}

/// Parse and range-check a contrast ratio
pub fn parse_ratio(raw: &str) -> Result<f64, ContrastError> {
    let ratio = raw.trim().parse::<f64>().map_err(|_| ContrastError::Unparsable {
        value: raw.to_string(),
    })?;
    if !(MIN_CONTRAST..=MAX_CONTRAST).contains(&ratio) {
        return Err(ContrastError::OutOfRange { ratio });
    }
    Ok(ratio)
}

/// Solve `ratio = (L_lighter + 0.05) / (L_darker + 0.05)` for the palette
/// luminance. Dark schemes need colours brighter than the background, light
/// schemes darker.
pub fn target_luminance(ratio: f64, background_luminance: f64, light: bool) -> Result<f64, ContrastError> {
    let target = if light {
        (background_luminance + 0.05) / ratio - 0.05
    } else {
        (background_luminance + 0.05) * ratio - 0.05
    };

    if target >= LUMINANCE_CEILING {
        return Err(ContrastError::TargetTooBright { target });
    }
    if target <= LUMINANCE_FLOOR {
        return Err(ContrastError::TargetTooDark { target });
    }
    Ok(target)
}

/// Whether `color` already meets the target for the scheme direction
pub fn satisfies(color: &Color, target: f64, light: bool) -> bool {
    let luminance = color.w3_luminance();
    if light {
        luminance <= target
    } else {
        luminance >= target
    }
}

/// Enforce `ratio` on slots 1-14 against `background`, in place.
pub fn ensure_contrast(colors: &mut Palette, ratio: &str, light: bool, background: Color) -> ContrastOutcome {
    let target = match parse_ratio(ratio)
        .and_then(|ratio| target_luminance(ratio, background.w3_luminance(), light))
    {
        Ok(target) => target,
        Err(e) => {
            warn!("{}", e);
            return ContrastOutcome::Skipped(e);
        }
    };

    debug!("Enforcing contrast {} against {}: target luminance {:.4}", ratio, background, target);

    let mut adjusted = 0;
    for index in ENFORCED_SLOTS {
        let color = colors[index];
        if satisfies(&color, target, light) {
            continue;
        }
        colors[index] = reach_luminance(&color, target, light);
        adjusted += 1;
    }

    ContrastOutcome::Applied { target, adjusted }
}

/// Pick the HSV search box for a colour that misses the target.
fn reach_luminance(color: &Color, target: f64, light: bool) -> Color {
    let (h, s, v) = color.to_hsv();

    if light {
        // Darker: lower value, raise saturation
        return bisect_luminance(target, h, (s, 1.0), (0.0, v), light);
    }

    if Color::from_hsv(h, s, 1.0).w3_luminance() >= target {
        // Raising value alone is enough
        bisect_luminance(target, h, (s, s), (v, 1.0), light)
    } else {
        // Full value is not enough, also give up saturation
        bisect_luminance(target, h, (0.0, s), (1.0, 1.0), light)
    }
}

/// Bisect saturation and value jointly towards `target` luminance.
///
/// Each step moves towards the boundary: too bright raises the saturation
/// floor and lowers the value ceiling, too dark does the opposite. The bound
/// on the satisfying side of the boundary is returned, so the result always
/// meets the target and lies within 2^-10 of the interval from it.
fn bisect_luminance(target: f64, hue: f64, saturation: (f64, f64), value: (f64, f64), light: bool) -> Color {
    let (mut s_min, mut s_max) = saturation;
    let (mut v_min, mut v_max) = value;

    for _ in 0..BISECTION_ITERATIONS {
        let s = (s_min + s_max) / 2.0;
        let v = (v_min + v_max) / 2.0;

        if Color::from_hsv(hue, s, v).w3_luminance() >= target {
            s_min = s;
            v_max = v;
        } else {
            s_max = s;
            v_min = v;
        }
    }

    if light {
        Color::from_hsv(hue, s_max, v_min)
    } else {
        Color::from_hsv(hue, s_min, v_max)
    }
}
