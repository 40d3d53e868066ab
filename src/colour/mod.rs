//! Colour values
//!
//! A [`Color`] is an immutable triple of 8-bit channels written as `#RRGGBB`.
//! All shading operations truncate back to integer channels, so chaining them
//! is deterministic but not reversible.

pub mod alpha;
pub mod space;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub use alpha::Alpha;

/// Error returned when a string is not a `#RRGGBB` colour
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid hex colour '{value}': expected #RRGGBB")]
pub struct ColorParseError {
    pub value: String,
}

/// An sRGB colour with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
}

/// Truncate a 0-255 float the way integer conversion does, saturating at the ends.
fn channel(value: f64) -> u8 {
    value as u8
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (or `RRGGBB`), either case.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError { value: hex.to_string() };
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let component = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| err())
        };
        Ok(Self::new(component(0..2)?, component(2..4)?, component(4..6)?))
    }

    /// Build a colour from unit-range channels, truncating each to 8 bits.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        Self::new(channel(r * 255.0), channel(g * 255.0), channel(b * 255.0))
    }

    pub fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let (r, g, b) = space::hsv_to_rgb(h, s, v);
        Self::from_unit(r, g, b)
    }

    pub fn from_hls(h: f64, l: f64, s: f64) -> Self {
        let (r, g, b) = space::hls_to_rgb(h, l, s);
        Self::from_unit(r, g, b)
    }

    /// Uppercase `#RRGGBB`
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn red(&self) -> u8 {
        self.r
    }

    pub fn green(&self) -> u8 {
        self.g
    }

    pub fn blue(&self) -> u8 {
        self.b
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Channels scaled to [0, 1]
    pub fn unit(&self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }

    pub fn to_hsv(&self) -> (f64, f64, f64) {
        let (r, g, b) = self.unit();
        space::rgb_to_hsv(r, g, b)
    }

    pub fn to_hls(&self) -> (f64, f64, f64) {
        let (r, g, b) = self.unit();
        space::rgb_to_hls(r, g, b)
    }

    /// YIQ triple computed over 0-255 channels
    pub fn yiq(&self) -> (f64, f64, f64) {
        space::rgb_to_yiq(f64::from(self.r), f64::from(self.g), f64::from(self.b))
    }

    /// Order two colours by their YIQ triple, luma first
    pub fn cmp_yiq(&self, other: &Color) -> Ordering {
        let (a, b) = (self.yiq(), other.yiq());
        a.0.total_cmp(&b.0)
            .then(a.1.total_cmp(&b.1))
            .then(a.2.total_cmp(&b.2))
    }

    /// Relative luminance per the W3 contrast definition
    pub fn w3_luminance(&self) -> f64 {
        let (r, g, b) = self.unit();
        space::relative_luminance(r, g, b)
    }

    /// W3 contrast ratio against another colour, in [1, 21]
    pub fn contrast_ratio(&self, other: &Color) -> f64 {
        space::contrast_ratio(self.unit(), other.unit())
    }

    /// Scale every channel towards black by `amount`.
    pub fn darken(&self, amount: f64) -> Self {
        let f = |c: u8| channel(f64::from(c) * (1.0 - amount));
        Self::new(f(self.r), f(self.g), f(self.b))
    }

    /// Move every channel towards white by `amount`.
    pub fn lighten(&self, amount: f64) -> Self {
        let f = |c: u8| channel(f64::from(c) + (255.0 - f64::from(c)) * amount);
        Self::new(f(self.r), f(self.g), f(self.b))
    }

    /// Replace the HLS saturation with `saturation`.
    pub fn saturate(&self, saturation: f64) -> Self {
        let (h, l, _) = self.to_hls();
        Self::from_hls(h, l, saturation)
    }

    /// Add `delta` to the HLS saturation, clamped to [0, 1].
    pub fn add_saturation(&self, delta: f64) -> Self {
        let (h, l, s) = self.to_hls();
        Self::from_hls(h, l, (s + delta).clamp(0.0, 1.0))
    }

    /// Channel-wise mean of two colours
    pub fn blend(&self, other: &Color) -> Self {
        let f = |a: u8, b: u8| channel(0.5 * f64::from(a) + 0.5 * f64::from(b));
        Self::new(f(self.r, other.r), f(self.g, other.g), f(self.b, other.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s.trim())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
