//! Palette Adjustment
//!
//! Shades a raw 16-slot palette into the final terminal palette. Slot 0 is
//! the anchor (background); slots 7, 8 and 15 are always derived from it, and
//! in 16-colour mode the bright slots are derived from the base slots.
//!
//! [`adjust`] is deliberately not idempotent: feeding it its own output keeps
//! shifting the anchor, so it must run exactly once per raw extraction.

use crate::colour::Color;
use super::palette::Palette;
use super::ShadeMode;

/// Calibration constants for the shading rules.
///
/// The defaults are the empirically tuned values existing schemes were
/// generated with; changing any of them changes every generated palette (and
/// should be paired with a cache version bump).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadeConstants {
    /// Dark mode: blend of slot 0 towards black
    pub dark_background_darken: f64,
    /// Dark mode: lighten applied to an under-saturated slot 0
    pub dark_undersaturated_lighten: f64,
    /// Dark mode: saturation given to an under-saturated slot 0
    pub dark_undersaturated_saturation: f64,
    /// Dark mode: slot 7/15 lighten of slot 0
    pub dark_foreground_lighten: f64,
    /// Dark mode: slot 8 lighten of slot 0
    pub dark_bright_black_lighten: f64,
    /// Dark mode: slot 8 saturation
    pub dark_bright_black_saturation: f64,

    /// Light mode: saturation given to every input colour
    pub light_input_saturation: f64,
    /// Light mode: darken applied to every input colour
    pub light_input_darken: f64,
    /// Light mode: blend of slot 0 towards white
    pub light_background_lighten: f64,
    /// Light mode: slot 7/15 darken of slot 0
    pub light_foreground_darken: f64,
    /// Light mode: slot 8 darken of slot 0
    pub light_bright_black_darken: f64,

    /// 16-colour dark: slot 7 lighten / saturation
    pub c16_dark_foreground_lighten: f64,
    pub c16_dark_foreground_saturation: f64,
    /// 16-colour dark: slot 8 lighten / saturation
    pub c16_dark_bright_black_lighten: f64,
    pub c16_dark_bright_black_saturation: f64,
    /// 16-colour dark: slot 15 lighten
    pub c16_dark_bright_foreground_lighten: f64,

    /// 16-colour light: slot 7, 8 and 15 darken of slot 0
    pub c16_light_foreground_darken: f64,
    pub c16_light_bright_black_darken: f64,
    pub c16_light_bright_foreground_darken: f64,

    /// `lighten`/`dual`: slots 9-14 lighten of slots 1-6
    pub c16_bright_lighten: f64,
    /// `lighten`/`dual` in dark mode: saturation of slots 9-14
    pub c16_bright_saturation: f64,
    /// `darken`/`dual`: darken of slots 1-6
    pub c16_base_darken: f64,
}

impl Default for ShadeConstants {
    fn default() -> Self {
        Self {
            dark_background_darken: 0.40,
            dark_undersaturated_lighten: 0.03,
            dark_undersaturated_saturation: 0.40,
            dark_foreground_lighten: 0.75,
            dark_bright_black_lighten: 0.35,
            dark_bright_black_saturation: 0.10,

            light_input_saturation: 0.60,
            light_input_darken: 0.50,
            light_background_lighten: 0.95,
            light_foreground_darken: 0.75,
            light_bright_black_darken: 0.25,

            c16_dark_foreground_lighten: 0.55,
            c16_dark_foreground_saturation: 0.05,
            c16_dark_bright_black_lighten: 0.35,
            c16_dark_bright_black_saturation: 0.10,
            c16_dark_bright_foreground_lighten: 0.75,

            c16_light_foreground_darken: 0.50,
            c16_light_bright_black_darken: 0.25,
            c16_light_bright_foreground_darken: 0.75,

            c16_bright_lighten: 0.25,
            c16_bright_saturation: 0.40,
            c16_base_darken: 0.25,
        }
    }
}

impl ShadeConstants {
    /// Configuration key of every overridable constant
    pub const KEYS: [&'static str; 22] = [
        "dark-background-darken",
        "dark-undersaturated-lighten",
        "dark-undersaturated-saturation",
        "dark-foreground-lighten",
        "dark-bright-black-lighten",
        "dark-bright-black-saturation",
        "light-input-saturation",
        "light-input-darken",
        "light-background-lighten",
        "light-foreground-darken",
        "light-bright-black-darken",
        "c16-dark-foreground-lighten",
        "c16-dark-foreground-saturation",
        "c16-dark-bright-black-lighten",
        "c16-dark-bright-black-saturation",
        "c16-dark-bright-foreground-lighten",
        "c16-light-foreground-darken",
        "c16-light-bright-black-darken",
        "c16-light-bright-foreground-darken",
        "c16-bright-lighten",
        "c16-bright-saturation",
        "c16-base-darken",
    ];

    fn slot(&mut self, key: &str) -> Option<&mut f64> {
        let slot = match key {
            "dark-background-darken" => &mut self.dark_background_darken,
            "dark-undersaturated-lighten" => &mut self.dark_undersaturated_lighten,
            "dark-undersaturated-saturation" => &mut self.dark_undersaturated_saturation,
            "dark-foreground-lighten" => &mut self.dark_foreground_lighten,
            "dark-bright-black-lighten" => &mut self.dark_bright_black_lighten,
            "dark-bright-black-saturation" => &mut self.dark_bright_black_saturation,
            "light-input-saturation" => &mut self.light_input_saturation,
            "light-input-darken" => &mut self.light_input_darken,
            "light-background-lighten" => &mut self.light_background_lighten,
            "light-foreground-darken" => &mut self.light_foreground_darken,
            "light-bright-black-darken" => &mut self.light_bright_black_darken,
            "c16-dark-foreground-lighten" => &mut self.c16_dark_foreground_lighten,
            "c16-dark-foreground-saturation" => &mut self.c16_dark_foreground_saturation,
            "c16-dark-bright-black-lighten" => &mut self.c16_dark_bright_black_lighten,
            "c16-dark-bright-black-saturation" => &mut self.c16_dark_bright_black_saturation,
            "c16-dark-bright-foreground-lighten" => &mut self.c16_dark_bright_foreground_lighten,
            "c16-light-foreground-darken" => &mut self.c16_light_foreground_darken,
            "c16-light-bright-black-darken" => &mut self.c16_light_bright_black_darken,
            "c16-light-bright-foreground-darken" => &mut self.c16_light_bright_foreground_darken,
            "c16-bright-lighten" => &mut self.c16_bright_lighten,
            "c16-bright-saturation" => &mut self.c16_bright_saturation,
            "c16-base-darken" => &mut self.c16_base_darken,
            _ => return None,
        };
        Some(slot)
    }

    /// Override a constant by its configuration key. Values must lie in [0, 1].
    pub fn set(&mut self, key: &str, value: f64) -> Result<(), String> {
        if !(0.0..=1.0).contains(&value) {
            return Err(format!("Shading constant {} must be between 0 and 1, got {}", key, value));
        }
        let slot = self
            .slot(key)
            .ok_or_else(|| format!("Unknown shading constant: {}", key))?;
        *slot = value;
        Ok(())
    }
}

/// Red channel below 0x10, i.e. a leading `0` digit in `#RRGGBB`.
/// Used as the "already dark enough" test for the dark-mode anchor.
fn red_high_digit_is_zero(color: &Color) -> bool {
    color.red() < 0x10
}

/// Any channel below 0x10 marks the dark-mode anchor as under-saturated.
fn any_high_digit_is_zero(color: &Color) -> bool {
    color.red() < 0x10 || color.green() < 0x10 || color.blue() < 0x10
}

/// Shade a raw palette into its final form.
pub fn adjust(colors: &Palette, light: bool, mode: ShadeMode, k: &ShadeConstants) -> Palette {
    let mut colors = *colors;

    if light {
        for color in colors.iter_mut() {
            *color = color
                .saturate(k.light_input_saturation)
                .darken(k.light_input_darken);
        }

        colors[0] = colors[0].lighten(k.light_background_lighten);
        if mode.is_enabled() {
            shade_16(&mut colors, light, mode, k);
        } else {
            colors[7] = colors[0].darken(k.light_foreground_darken);
            colors[8] = colors[0].darken(k.light_bright_black_darken);
            colors[15] = colors[7];
        }
    } else {
        if !red_high_digit_is_zero(&colors[0]) {
            colors[0] = colors[0].darken(k.dark_background_darken);
        }

        if any_high_digit_is_zero(&colors[0]) {
            colors[0] = colors[0]
                .lighten(k.dark_undersaturated_lighten)
                .saturate(k.dark_undersaturated_saturation);
        }

        if mode.is_enabled() {
            shade_16(&mut colors, light, mode, k);
        } else {
            colors[7] = colors[0].lighten(k.dark_foreground_lighten);
            colors[8] = colors[0]
                .lighten(k.dark_bright_black_lighten)
                .saturate(k.dark_bright_black_saturation);
            colors[15] = colors[7];
        }
    }

    colors
}

/// 16-colour derivation of slots 7, 8 and 15 plus the optional bright/base passes.
fn shade_16(colors: &mut Palette, light: bool, mode: ShadeMode, k: &ShadeConstants) {
    if light {
        colors[7] = colors[0].darken(k.c16_light_foreground_darken);
        colors[8] = colors[0].darken(k.c16_light_bright_black_darken);
        colors[15] = colors[0].darken(k.c16_light_bright_foreground_darken);
    } else {
        colors[7] = colors[0]
            .lighten(k.c16_dark_foreground_lighten)
            .saturate(k.c16_dark_foreground_saturation);
        colors[8] = colors[0]
            .lighten(k.c16_dark_bright_black_lighten)
            .saturate(k.c16_dark_bright_black_saturation);
        colors[15] = colors[0].lighten(k.c16_dark_bright_foreground_lighten);
    }

    if mode.lightens() {
        for i in 1..=6 {
            let bright = colors[i].lighten(k.c16_bright_lighten);
            colors[i + 8] = if light {
                bright
            } else {
                bright.saturate(k.c16_bright_saturation)
            };
        }
    }

    if mode.darkens() {
        for i in 1..=6 {
            colors[i] = colors[i].darken(k.c16_base_darken);
        }
    }
}

/// Add `amount` of saturation to every slot except 7 and 15.
///
/// The amount must parse and lie in [-1, 1]; anything else leaves the palette
/// untouched and returns `false`.
pub fn saturate_palette(colors: &mut Palette, amount: &str) -> bool {
    let amount = match amount.trim().parse::<f64>() {
        Ok(value) if (-1.0..=1.0).contains(&value) => value,
        _ => {
            log::warn!("Ignoring saturation {}: expected a number between -1 and 1", amount);
            return false;
        }
    };

    for (i, color) in colors.iter_mut().enumerate() {
        if i != 7 && i != 15 {
            *color = color.add_saturation(amount);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grey_palette() -> Palette {
        Palette::uniform(Color::new(0x80, 0x80, 0x80))
    }

    fn vivid_palette() -> Palette {
        let mut palette = Palette::uniform(Color::new(0x33, 0x66, 0x99));
        for i in 1..=6u8 {
            palette[usize::from(i)] = Color::new(40 * i, 200 - 20 * i, 90);
        }
        palette
    }

    #[test]
    fn test_dark_greys() {
        let k = ShadeConstants::default();
        let out = adjust(&grey_palette(), false, ShadeMode::None, &k);

        let anchor = Color::new(0x80, 0x80, 0x80).darken(k.dark_background_darken);
        assert_eq!(out[0], anchor);
        assert_eq!(out[0], Color::new(76, 76, 76));
        assert_eq!(out[7], anchor.lighten(k.dark_foreground_lighten));
        assert_eq!(out[15], out[7]);
        assert_eq!(out[8], anchor.lighten(0.35).saturate(0.10));
        // Untouched base slots
        assert_eq!(out[3], Color::new(0x80, 0x80, 0x80));
    }

    #[test]
    fn test_light_greys() {
        let k = ShadeConstants::default();
        let out = adjust(&grey_palette(), true, ShadeMode::None, &k);

        let shaded = Color::new(0x80, 0x80, 0x80).saturate(0.60).darken(0.50);
        let anchor = shaded.lighten(0.95);
        assert_eq!(out[0], anchor);
        assert_eq!(out[7], anchor.darken(0.75));
        assert_eq!(out[15], out[7]);
        assert_eq!(out[8], anchor.darken(0.25));
        assert_eq!(out[4], shaded);
    }

    #[test]
    fn test_dark_anchor_already_dark_is_not_darkened() {
        let k = ShadeConstants::default();
        let mut raw = grey_palette();
        // Red below 0x10 skips the darken; low channels trigger the saturation fix
        raw[0] = Color::new(0x0a, 0x30, 0x40);
        let out = adjust(&raw, false, ShadeMode::None, &k);
        assert_eq!(out[0], Color::new(0x0a, 0x30, 0x40).lighten(0.03).saturate(0.40));
    }

    #[test]
    fn test_dark_anchor_saturation_fix_after_darkening() {
        let k = ShadeConstants::default();
        let mut raw = grey_palette();
        // Blue drops below 0x10 once darkened
        raw[0] = Color::new(0x90, 0x80, 0x18);
        let out = adjust(&raw, false, ShadeMode::None, &k);
        let darkened = Color::new(0x90, 0x80, 0x18).darken(0.40);
        assert!(darkened.blue() < 0x10);
        assert_eq!(out[0], darkened.lighten(0.03).saturate(0.40));
    }

    #[test]
    fn test_sixteen_colour_dark_lighten() {
        let k = ShadeConstants::default();
        let raw = vivid_palette();
        let out = adjust(&raw, false, ShadeMode::Lighten, &k);

        assert_eq!(out[7], out[0].lighten(0.55).saturate(0.05));
        assert_eq!(out[8], out[0].lighten(0.35).saturate(0.10));
        assert_eq!(out[15], out[0].lighten(0.75));
        assert_ne!(out[15], out[7]);
        for i in 1..=6 {
            assert_eq!(out[i], raw[i]);
            assert_eq!(out[i + 8], raw[i].lighten(0.25).saturate(0.40));
        }
    }

    #[test]
    fn test_sixteen_colour_light_dual() {
        let k = ShadeConstants::default();
        let raw = vivid_palette();
        let out = adjust(&raw, true, ShadeMode::Dual, &k);

        assert_eq!(out[7], out[0].darken(0.50));
        assert_eq!(out[8], out[0].darken(0.25));
        assert_eq!(out[15], out[0].darken(0.75));
        for i in 1..=6 {
            let shaded = raw[i].saturate(0.60).darken(0.50);
            // Bright slots derive from the base slot before it is darkened
            assert_eq!(out[i + 8], shaded.lighten(0.25));
            assert_eq!(out[i], shaded.darken(0.25));
        }
    }

    #[test]
    fn test_sixteen_colour_darken_leaves_bright_slots() {
        let k = ShadeConstants::default();
        let raw = vivid_palette();
        let out = adjust(&raw, false, ShadeMode::Darken, &k);
        for i in 1..=6 {
            assert_eq!(out[i], raw[i].darken(0.25));
            assert_eq!(out[i + 8], raw[i + 8]);
        }
    }

    #[test]
    fn test_adjust_is_deterministic_but_not_idempotent() {
        let k = ShadeConstants::default();
        let once = adjust(&vivid_palette(), false, ShadeMode::None, &k);
        assert_eq!(once, adjust(&vivid_palette(), false, ShadeMode::None, &k));
        assert_ne!(adjust(&once, false, ShadeMode::None, &k), once);
    }

    #[test]
    fn test_constants_override() {
        let mut k = ShadeConstants::default();
        k.set("dark-background-darken", 0.5).unwrap();
        assert_eq!(k.dark_background_darken, 0.5);
        assert!(k.set("dark-background-darken", 1.5).is_err());
        assert!(k.set("no-such-constant", 0.5).is_err());
        for key in ShadeConstants::KEYS {
            assert!(k.set(key, 0.3).is_ok(), "key {} should be settable", key);
        }
    }

    #[test]
    fn test_saturate_palette_skips_foreground_slots() {
        let mut palette = vivid_palette();
        palette[7] = Color::new(0x80, 0x70, 0x60);
        palette[15] = Color::new(0x80, 0x70, 0x60);
        let before = palette;

        assert!(saturate_palette(&mut palette, "0.5"));
        assert_eq!(palette[7], before[7]);
        assert_eq!(palette[15], before[15]);
        assert_eq!(palette[1], before[1].add_saturation(0.5));
    }

    #[test]
    fn test_saturate_palette_rejects_out_of_range() {
        let mut palette = vivid_palette();
        let before = palette;
        assert!(!saturate_palette(&mut palette, "1.5"));
        assert!(!saturate_palette(&mut palette, "lots"));
        assert_eq!(palette, before);
    }
}
