//! Terminal output for generated schemes
//!
//! Colour is used only when the destination is a terminal and neither
//! `--no-color` nor `NO_COLOR` asks otherwise; `--color` forces it.

pub mod preview;

use std::io::IsTerminal;

pub use preview::{render_palette, render_scheme};

/// How the user asked colour to be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColourChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColourChoice {
    /// Resolve `--color` / `--no-color`; `--no-color` wins
    pub fn from_flags(color: bool, no_color: bool) -> Self {
        if no_color {
            ColourChoice::Never
        } else if color {
            ColourChoice::Always
        } else {
            ColourChoice::Auto
        }
    }

    /// Whether to emit ANSI colour on stderr, where previews are written
    pub fn should_use_colours(&self) -> bool {
        match self {
            ColourChoice::Always => true,
            ColourChoice::Never => false,
            ColourChoice::Auto => {
                std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
            }
        }
    }
}
