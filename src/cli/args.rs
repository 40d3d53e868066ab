use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::debug;

use crate::colour::Alpha;
use crate::scheme::ShadeMode;

/// Terminal colour scheme generator
#[derive(Parser, Debug)]
#[command(name = "walgen")]
#[command(about = "Generate a 16-colour terminal scheme from an image")]
#[command(version)]
pub struct Args {
    /// Image to generate the scheme from
    #[arg(short = 'i', long = "image", value_name = "IMAGE")]
    pub image: Option<PathBuf>,

    /// Generate a light scheme
    #[arg(short = 'l', long)]
    pub light: bool,

    /// Extraction backend, or "random" (see --list-backends)
    #[arg(long, value_name = "BACKEND")]
    pub backend: Option<String>,

    /// Derive all 16 colours: lighten, darken or dual
    #[arg(long = "cols16", value_name = "MODE")]
    pub cols16: Option<String>,

    /// Saturation delta applied to the palette, -1.0 to 1.0
    #[arg(long, value_name = "AMOUNT", allow_hyphen_values = true)]
    pub saturate: Option<String>,

    /// Minimum W3 contrast ratio against the image, 1 to 21
    #[arg(long, value_name = "RATIO")]
    pub contrast: Option<String>,

    /// Terminal background transparency, 0-100 (or 0.0-1.0)
    #[arg(short = 'a', long, value_name = "ALPHA", allow_hyphen_values = true)]
    pub alpha: Option<String>,

    /// Cache directory (overrides config)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Write the scheme JSON to a file instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the palette as colour swatches
    #[arg(long)]
    pub preview: bool,

    /// List available backends and exit
    #[arg(long)]
    pub list_backends: bool,

    /// Delete all cached schemes
    #[arg(short = 'c', long)]
    pub clear_cache: bool,

    /// Verbose output (debug level logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (error level logging only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug output (trace level logging)
    #[arg(long)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log file path for file output
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL")]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Configuration section name
    #[arg(long, value_name = "SECTION")]
    pub config_name: Option<String>,

    /// Force coloured previews
    #[arg(long)]
    pub color: bool,

    /// Disable coloured previews
    #[arg(long)]
    pub no_color: bool,
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    let args = Args::parse();
    debug!("Parsed CLI arguments: {:?}", args);
    args
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(anyhow::anyhow!(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified"
        ));
    }

    match args.log_format.to_lowercase().as_str() {
        "text" | "json" => {}
        _ => {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Valid options: text, json",
                args.log_format
            ))
        }
    }

    if let Some(ref level) = args.log_file_level {
        match level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid log file level '{}'. Valid levels: error, warn, info, debug, trace",
                    level
                ))
            }
        }
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!("--log-file-level requires --log-file to be specified"));
    }

    if let Some(ref mode) = args.cols16 {
        let mode = mode.parse::<ShadeMode>().map_err(|e| anyhow::anyhow!(e))?;
        if !mode.is_enabled() {
            return Err(anyhow::anyhow!(
                "Invalid 16 colour mode: none. Valid options: lighten, darken, dual"
            ));
        }
    }

    if let Some(ref alpha) = args.alpha {
        alpha
            .parse::<Alpha>()
            .map_err(|e| anyhow::anyhow!("Invalid alpha '{}': {}", alpha, e))?;
    }

    if args.image.is_none() && !args.list_backends && !args.clear_cache {
        return Err(anyhow::anyhow!(
            "No image given. Use -i IMAGE, --list-backends or --clear-cache"
        ));
    }

    debug!("CLI arguments validated successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create Args with default values for testing
    fn create_test_args() -> Args {
        Args {
            image: Some(PathBuf::from("wall.png")),
            light: false,
            backend: None,
            cols16: None,
            saturate: None,
            contrast: None,
            alpha: None,
            cache_dir: None,
            output: None,
            preview: false,
            list_backends: false,
            clear_cache: false,
            verbose: false,
            quiet: false,
            debug: false,
            log_format: "text".to_string(),
            log_file: None,
            log_file_level: None,
            config_file: None,
            config_name: None,
            color: false,
            no_color: false,
        }
    }

    #[test]
    fn test_validate_args_success() {
        let args = Args {
            verbose: true,
            log_format: "json".to_string(),
            cols16: Some("dual".to_string()),
            alpha: Some("0.8".to_string()),
            ..create_test_args()
        };
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_conflicting_flags() {
        let args = Args {
            verbose: true,
            quiet: true,
            ..create_test_args()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_invalid_format() {
        let args = Args {
            log_format: "xml".to_string(),
            ..create_test_args()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_file_level_without_file() {
        let args = Args {
            log_file_level: Some("debug".to_string()),
            ..create_test_args()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_cols16() {
        for mode in ["none", "sideways"] {
            let args = Args {
                cols16: Some(mode.to_string()),
                ..create_test_args()
            };
            assert!(validate_args(&args).is_err(), "{}", mode);
        }
    }

    #[test]
    fn test_image_required_for_generation() {
        let args = Args {
            image: None,
            ..create_test_args()
        };
        assert!(validate_args(&args).is_err());

        let args = Args {
            image: None,
            list_backends: true,
            ..create_test_args()
        };
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_clap_parsing() {
        let args = Args::try_parse_from([
            "walgen", "-i", "wall.png", "-l", "--backend", "colorthief", "--cols16", "lighten",
            "--saturate", "-0.2", "--contrast", "4.5", "-a", "90", "--preview",
        ])
        .unwrap();
        assert_eq!(args.image, Some(PathBuf::from("wall.png")));
        assert!(args.light);
        assert_eq!(args.backend.as_deref(), Some("colorthief"));
        assert_eq!(args.cols16.as_deref(), Some("lighten"));
        assert_eq!(args.saturate.as_deref(), Some("-0.2"));
        assert_eq!(args.contrast.as_deref(), Some("4.5"));
        assert_eq!(args.alpha.as_deref(), Some("90"));
        assert!(args.preview);
        assert!(validate_args(&args).is_ok());
    }
}
