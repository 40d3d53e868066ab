//! Application initialization and configuration

use std::str::FromStr;

use anyhow::Result;
use log::{debug, LevelFilter};

use crate::scheme::GeneratorConfig;
use crate::{cli, config, logging};

pub fn load_configuration(args: &cli::Args) -> Result<config::ConfigManager> {
    let mut manager = if let Some(config_file) = &args.config_file {
        debug!("Loading configuration from explicit file: {}", config_file.display());
        config::ConfigManager::load_from_file(config_file.clone())?
    } else {
        config::ConfigManager::load()?
    };

    if let Some(section_name) = &args.config_name {
        manager.select_section(section_name.clone());
    }

    Ok(manager)
}

pub fn configure_logging(args: &cli::Args, config: &config::ConfigManager) -> Result<logging::LogConfig> {
    let console_level = if args.debug {
        LevelFilter::Trace
    } else if args.verbose {
        LevelFilter::Debug
    } else if args.quiet {
        LevelFilter::Error
    } else {
        match config.get_log_level("base", "console-level") {
            Ok(Some(level)) => level,
            Ok(None) => LevelFilter::Info,
            Err(e) => {
                eprintln!("Invalid console-level in config, using info: {}", e);
                LevelFilter::Info
            }
        }
    };

    let format = if !args.log_format.is_empty() && args.log_format != "text" {
        logging::LogFormat::from_str(&args.log_format).map_err(|e| anyhow::anyhow!(e))?
    } else {
        match config.get_value("base", "log-format") {
            Some(format_str) => {
                logging::LogFormat::from_str(format_str).unwrap_or(logging::LogFormat::Text)
            }
            None => logging::LogFormat::Text,
        }
    };

    let log_file_path = args
        .log_file
        .clone()
        .or_else(|| config.get_path("base", "log-file"));

    let file_log_level = match &args.log_file_level {
        Some(level_str) => Some(logging::parse_log_level(level_str)?),
        None => config.get_log_level("base", "file-log-level").unwrap_or_default(),
    };

    let (destination, file_level) = match (log_file_path, file_log_level) {
        (Some(file_path), level) => (
            logging::LogDestination::Both(file_path),
            Some(level.unwrap_or(console_level)),
        ),
        (None, None) => (logging::LogDestination::Console, None),
        (None, Some(_)) => {
            return Err(anyhow::anyhow!("Log file level specified without log file"));
        }
    };

    Ok(logging::LogConfig {
        console_level,
        file_level,
        format,
        destination,
    })
}

/// Generator configuration from the config file with CLI overrides applied
pub fn build_generator_config(args: &cli::Args, config: &config::ConfigManager) -> Result<GeneratorConfig> {
    let mut generator_config = config.get_generator_config()?;

    if let Some(cache_dir) = &args.cache_dir {
        generator_config.cache_root = cache_dir.clone();
    }

    debug!("Generator configuration: {:?}", generator_config);
    Ok(generator_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigManager, Configuration};
    use clap::Parser;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn args(extra: &[&str]) -> cli::Args {
        let mut argv = vec!["walgen", "-i", "wall.png"];
        argv.extend_from_slice(extra);
        cli::Args::try_parse_from(argv).unwrap()
    }

    fn config_with(section: &str, key: &str, value: &str) -> ConfigManager {
        let mut config = Configuration::new();
        config.insert(
            section.to_string(),
            HashMap::from([(key.to_string(), value.to_string())]),
        );
        ConfigManager::from_config(config)
    }

    #[test]
    fn test_cli_level_beats_config() {
        let config = config_with("base", "console-level", "warn");
        assert_eq!(
            configure_logging(&args(&["--debug"]), &config).unwrap().console_level,
            LevelFilter::Trace
        );
        assert_eq!(
            configure_logging(&args(&[]), &config).unwrap().console_level,
            LevelFilter::Warn
        );
    }

    #[test]
    fn test_log_file_defaults_to_console_level() {
        let config = ConfigManager::from_config(Configuration::new());
        let log_config =
            configure_logging(&args(&["--quiet", "--log-file", "/tmp/walgen.log"]), &config).unwrap();
        assert_eq!(
            log_config.destination,
            logging::LogDestination::Both(PathBuf::from("/tmp/walgen.log"))
        );
        assert_eq!(log_config.file_level, Some(LevelFilter::Error));
    }

    #[test]
    fn test_json_format_from_config() {
        let config = config_with("base", "log-format", "json");
        let log_config = configure_logging(&args(&[]), &config).unwrap();
        assert_eq!(log_config.format, logging::LogFormat::Json);
    }

    #[test]
    fn test_cache_dir_override() {
        let config = config_with("generator", "cache-dir", "/tmp/from-config");
        let generator_config =
            build_generator_config(&args(&["--cache-dir", "/tmp/from-cli"]), &config).unwrap();
        assert_eq!(generator_config.cache_root, PathBuf::from("/tmp/from-cli"));

        let generator_config = build_generator_config(&args(&[]), &config).unwrap();
        assert_eq!(generator_config.cache_root, PathBuf::from("/tmp/from-config"));
    }
}
