//! Swatch rendering for generated palettes

use colored::Colorize;

use crate::colour::Color;
use crate::scheme::{ColorScheme, Palette};

/// Width of one swatch in cells
pub const SWATCH_WIDTH: usize = 4;
/// Swatches per row, normal colours then bright colours
pub const SWATCHES_PER_ROW: usize = 8;

/// 24-bit background escape, emitted whatever colour support the terminal
/// advertises
fn truecolor_background(color: &Color, text: &str) -> String {
    let (r, g, b) = color.rgb();
    format!("\x1b[48;2;{};{};{}m{}\x1b[0m", r, g, b, text)
}

fn swatch(color: &Color, colours: bool) -> String {
    if colours {
        truecolor_background(color, &" ".repeat(SWATCH_WIDTH))
    } else {
        color.to_hex()
    }
}

/// Two rows of eight swatches. Without colour the hex values are printed instead.
pub fn render_palette(palette: &Palette, colours: bool) -> String {
    let mut output = String::new();
    for row in palette.colors().chunks(SWATCHES_PER_ROW) {
        let cells: Vec<String> = row.iter().map(|color| swatch(color, colours)).collect();
        let separator = if colours { "" } else { " " };
        output.push_str(&cells.join(separator));
        output.push('\n');
    }
    output
}

/// One line per named colour: name, hex value and a swatch
pub fn render_scheme(scheme: &ColorScheme, colours: bool) -> String {
    let mut output = String::new();
    for (name, color) in scheme.named_colors() {
        let label = format!("{:<11}", name);
        if colours {
            output.push_str(&format!("{} {} {}", label.bold(), color, swatch(&color, true)));
        } else {
            output.push_str(&format!("{} {}", label, color));
        }
        output.push('\n');
    }
    output
}
