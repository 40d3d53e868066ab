//! walgen: 16-colour terminal scheme generation from images
//!
//! The pipeline lives in [`scheme::Generator`]: a cache lookup, an extraction
//! [`backend`], deterministic shading ([`scheme::adjust`]), optional
//! saturation and contrast passes, and a cache store.

pub mod app;
pub mod backend;
pub mod cli;
pub mod colour;
pub mod config;
pub mod display;
pub mod logging;
pub mod scheme;

pub use colour::{Alpha, Color};
pub use scheme::{ColorScheme, GenerationOptions, Generator, GeneratorConfig, Palette};
