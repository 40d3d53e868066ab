//! Command execution: listing, cache maintenance and generation

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::backend::RANDOM_BACKEND;
use crate::cli;
use crate::colour::Alpha;
use crate::display::{render_palette, render_scheme, ColourChoice};
use crate::scheme::{ColorScheme, GenerationOptions, Generator, GeneratorConfig, Origin, ShadeMode};

/// Translate CLI flags into generation options
pub fn build_options(args: &cli::Args, config: &GeneratorConfig) -> Result<GenerationOptions> {
    let shade_mode = match &args.cols16 {
        Some(mode) => mode.parse::<ShadeMode>().map_err(|e| anyhow::anyhow!(e))?,
        None => ShadeMode::None,
    };
    let alpha = match &args.alpha {
        Some(alpha) => alpha.parse::<Alpha>().map_err(|e| anyhow::anyhow!(e))?,
        None => Alpha::default(),
    };

    Ok(GenerationOptions {
        light: args.light,
        shade_mode,
        saturation: args.saturate.clone(),
        contrast: args.contrast.clone(),
        backend: args
            .backend
            .clone()
            .unwrap_or_else(|| config.default_backend.clone()),
        alpha,
    })
}

pub fn run(args: &cli::Args, generator_config: GeneratorConfig) -> Result<()> {
    let generator = Generator::new(generator_config);
    let mut stdout = io::stdout().lock();

    if args.list_backends {
        write_backend_list(&generator, &mut stdout)?;
        if args.image.is_none() {
            return Ok(());
        }
    }

    if args.clear_cache {
        generator
            .clear_cache()
            .with_context(|| format!("Failed to clear cache at {}", generator.cache().schemes_dir().display()))?;
        info!("Cleared cache at {}", generator.cache().schemes_dir().display());
        if args.image.is_none() {
            return Ok(());
        }
    }

    let image = args
        .image
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("No image given"))?;
    let options = build_options(args, generator.config())?;
    let generation = generator.generate(image, &options)?;

    match &generation.origin {
        Origin::Cached => info!("Using cached scheme for {}", image.display()),
        Origin::Generated { backend, degraded: true } => {
            warn!("Scheme from {} backend is degraded: too few distinct colours", backend)
        }
        Origin::Generated { backend, .. } => info!("Scheme generated with {} backend", backend),
    }

    emit_scheme(&generation.scheme, args.output.as_deref(), &mut stdout)?;

    if args.preview {
        let colours = ColourChoice::from_flags(args.color, args.no_color).should_use_colours();
        if colours {
            eprint!("{}", render_palette(&generation.scheme.colors, true));
        }
        eprint!("{}", render_scheme(&generation.scheme, colours));
    }

    Ok(())
}

fn write_backend_list(generator: &Generator, out: &mut impl Write) -> Result<()> {
    for (id, description) in generator.registry().describe() {
        let marker = if id == generator.registry().default_backend() { " (default)" } else { "" };
        writeln!(out, "{:<12} {}{}", id, description, marker)?;
    }
    writeln!(out, "{:<12} A random backend from the list above", RANDOM_BACKEND)?;
    Ok(())
}

/// Write the scheme JSON to `output`, or to `stdout` when no file is given
pub fn emit_scheme(scheme: &ColorScheme, output: Option<&Path>, stdout: &mut impl Write) -> Result<()> {
    let json = serde_json::to_string_pretty(scheme).context("Failed to serialize scheme")?;
    match output {
        Some(path) => {
            fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write scheme to {}", path.display()))?;
            info!("Wrote scheme to {}", path.display());
        }
        None => writeln!(stdout, "{}", json)?,
    }
    Ok(())
}
