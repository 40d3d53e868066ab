//! Alpha setting carried alongside a scheme for terminals that support it.
//!
//! Only display-side tooling reads this; it never takes part in luminance math.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opacity as an integer percentage in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Alpha(u8);

impl Alpha {
    pub const OPAQUE: Alpha = Alpha(100);

    /// Normalize a user-supplied value: negatives are made positive,
    /// fractions below 1 are read as a proportion and anything above 100 is
    /// clamped.
    pub fn from_value(value: f64) -> Self {
        let mut a = value.abs();
        if a < 1.0 {
            a *= 100.0;
        }
        Alpha(a.min(100.0) as u8)
    }

    pub fn percent(&self) -> u8 {
        self.0
    }

    /// Alpha as a decimal in [0, 1]
    pub fn decimal(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Alpha scaled to a two digit hex byte
    pub fn hex(&self) -> String {
        format!("{:02X}", u32::from(self.0) * 255 / 100)
    }
}

impl Default for Alpha {
    fn default() -> Self {
        Self::OPAQUE
    }
}

impl fmt::Display for Alpha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Alpha {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Alpha::from_value)
            .ok_or_else(|| format!("Invalid alpha value: {}. Expected a number between 0 and 100", s))
    }
}

impl Serialize for Alpha {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Alpha {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
