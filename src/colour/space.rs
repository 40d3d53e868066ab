//! Colour space conversions on unit-range channels.
//!
//! HSV, HLS and relative luminance come from `palette` at f64 precision.
//! Hue is exposed as a fraction of a turn in [0, 1). YIQ has no `palette`
//! counterpart and is computed here.

use palette::color_difference::Wcag21RelativeContrast;
use palette::{encoding, FromColor, Hsl, Hsv, Srgb};

type Rgb = Srgb<f64>;
type HsvF = Hsv<encoding::Srgb, f64>;
type HslF = Hsl<encoding::Srgb, f64>;

const DEGREES_PER_TURN: f64 = 360.0;

fn turns(degrees: f64) -> f64 {
    (degrees / DEGREES_PER_TURN).rem_euclid(1.0)
}

fn degrees(turns: f64) -> f64 {
    turns.rem_euclid(1.0) * DEGREES_PER_TURN
}

fn channels(rgb: Rgb) -> (f64, f64, f64) {
    (rgb.red, rgb.green, rgb.blue)
}

/// Convert RGB to (hue, lightness, saturation).
pub fn rgb_to_hls(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let hsl = HslF::from_color(Rgb::new(r, g, b));
    (turns(hsl.hue.into_positive_degrees()), hsl.lightness, hsl.saturation)
}

/// Convert (hue, lightness, saturation) to RGB.
pub fn hls_to_rgb(h: f64, l: f64, s: f64) -> (f64, f64, f64) {
    channels(Rgb::from_color(HslF::new(degrees(h), s, l)))
}

/// Convert RGB to (hue, saturation, value).
pub fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let hsv = HsvF::from_color(Rgb::new(r, g, b));
    (turns(hsv.hue.into_positive_degrees()), hsv.saturation, hsv.value)
}

/// Convert (hue, saturation, value) to RGB.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    channels(Rgb::from_color(HsvF::new(degrees(h), s, v)))
}

/// W3 relative luminance of sRGB channels
pub fn relative_luminance(r: f64, g: f64, b: f64) -> f64 {
    Rgb::new(r, g, b).relative_luminance().luma
}

/// W3 contrast ratio between two sRGB colours, in [1, 21]
pub fn contrast_ratio(a: (f64, f64, f64), b: (f64, f64, f64)) -> f64 {
    Rgb::new(a.0, a.1, a.2).relative_contrast(Rgb::new(b.0, b.1, b.2))
}

/// Convert RGB to YIQ. Several backends sort raw colours by this triple.
pub fn rgb_to_yiq(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let y = 0.30 * r + 0.59 * g + 0.11 * b;
    let i = 0.74 * (r - y) - 0.27 * (b - y);
    let q = 0.48 * (r - y) + 0.41 * (b - y);
    (y, i, q)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: (f64, f64, f64), b: (f64, f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9 && (a.2 - b.2).abs() < 1e-9
    }

    #[test]
    fn test_hsv_primaries() {
        assert!(approx(rgb_to_hsv(1.0, 0.0, 0.0), (0.0, 1.0, 1.0)));
        assert!(approx(rgb_to_hsv(0.0, 1.0, 0.0), (1.0 / 3.0, 1.0, 1.0)));
        assert!(approx(rgb_to_hsv(0.0, 0.0, 1.0), (2.0 / 3.0, 1.0, 1.0)));
        assert!(approx(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0), (0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_hsv_grey_has_no_saturation() {
        let (_, s, v) = rgb_to_hsv(0.5, 0.5, 0.5);
        assert!(s.abs() < 1e-12);
        assert!((v - 0.5).abs() < 1e-12);
        assert!(approx(hsv_to_rgb(0.3, 0.0, 0.5), (0.5, 0.5, 0.5)));
    }

    #[test]
    fn test_hls_round_trip_dark() {
        let (h, l, s) = rgb_to_hls(0.2, 0.4, 0.6);
        assert!(l < 0.5);
        assert!(approx(hls_to_rgb(h, l, s), (0.2, 0.4, 0.6)));
    }

    #[test]
    fn test_hls_round_trip_light() {
        let (h, l, s) = rgb_to_hls(0.9, 0.8, 0.3);
        assert!((l - 0.6).abs() < 1e-12);
        // (max - min) / (2 - max - min)
        assert!((s - 0.75).abs() < 1e-9);
        assert!(approx(hls_to_rgb(h, l, s), (0.9, 0.8, 0.3)));
    }

    #[test]
    fn test_hue_wraps_into_unit_range() {
        // Red is max and blue above green, so the hue sits just below a full turn
        let (h, _, _) = rgb_to_hsv(1.0, 0.0, 0.5);
        assert!((0.0..1.0).contains(&h));
        assert!(h > 0.9);
        assert!(approx(hsv_to_rgb(h + 1.0, 1.0, 1.0), (1.0, 0.0, 0.5)));
    }

    #[test]
    fn test_relative_luminance_and_contrast() {
        assert!(relative_luminance(0.0, 0.0, 0.0).abs() < 1e-12);
        assert!((relative_luminance(1.0, 1.0, 1.0) - 1.0).abs() < 1e-4);
        assert!((relative_luminance(0.0, 1.0, 0.0) - 0.7152).abs() < 1e-4);
        assert!((contrast_ratio((0.0, 0.0, 0.0), (1.0, 1.0, 1.0)) - 21.0).abs() < 1e-3);
        assert!((contrast_ratio((1.0, 1.0, 1.0), (0.0, 0.0, 0.0)) - 21.0).abs() < 1e-3);
    }

    #[test]
    fn test_yiq_luma() {
        let (y, _, _) = rgb_to_yiq(255.0, 255.0, 255.0);
        assert!((y - 255.0).abs() < 1e-9);
        let (y, _, _) = rgb_to_yiq(0.0, 0.0, 0.0);
        assert_eq!(y, 0.0);
    }
}
