use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use toml::Value;

use crate::scheme::{AveragerKind, GeneratorConfig, ShadeConstants};

/// Configuration storage - section_name -> key -> value
pub type Configuration = HashMap<String, HashMap<String, String>>;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV: &str = "WALGEN_CONFIG";

/// Configuration manager
pub struct ConfigManager {
    config: Configuration,
    config_file_path: Option<PathBuf>,
    selected_section: Option<String>,
}

impl ConfigManager {
    /// Create a new ConfigManager from a Configuration (primarily for testing)
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config,
            config_file_path: None,
            selected_section: None,
        }
    }

    /// Load configuration using discovery hierarchy
    pub fn load() -> Result<Self> {
        debug!("Starting configuration discovery");

        for path in discover_config_files() {
            debug!("Attempting to load config from: {}", path.display());
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        info!("No configuration file found, using defaults");
        Ok(Self::from_config(Configuration::new()))
    }

    /// Load configuration from explicit file path
    pub fn load_from_file(path: PathBuf) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = parse_toml_config(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!("Loaded configuration from: {}", path.display());
        Ok(Self {
            config,
            config_file_path: Some(path),
            selected_section: None,
        })
    }

    pub fn config_file_path(&self) -> Option<&Path> {
        self.config_file_path.as_deref()
    }

    /// Get value from configuration with section fallback
    pub fn get_value(&self, section: &str, key: &str) -> Option<&String> {
        // Priority: selected_section -> specified section -> base
        if let Some(selected) = &self.selected_section {
            if let Some(value) = self.config.get(selected).and_then(|s| s.get(key)) {
                return Some(value);
            }
        }

        if let Some(value) = self.config.get(section).and_then(|s| s.get(key)) {
            return Some(value);
        }

        self.config.get("base").and_then(|s| s.get(key))
    }

    /// Select configuration section for --config-name
    pub fn select_section(&mut self, section: String) {
        debug!("Selecting configuration section: {}", section);
        self.selected_section = Some(section);
    }

    /// Get log level value with type conversion
    pub fn get_log_level(&self, section: &str, key: &str) -> Result<Option<log::LevelFilter>> {
        match self.get_value(section, key) {
            Some(value) => Ok(Some(crate::logging::parse_log_level(value)?)),
            None => Ok(None),
        }
    }

    /// Get path value, expanding a leading `~`
    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_value(section, key).map(|value| expand_tilde(value))
    }

    /// Shading constants with any `[shading]` overrides applied
    pub fn get_shading(&self) -> Result<ShadeConstants> {
        let mut shading = ShadeConstants::default();

        for key in ShadeConstants::KEYS {
            if let Some(raw) = self.get_value("shading", key) {
                let value = raw
                    .parse::<f64>()
                    .with_context(|| format!("Invalid shading value for {}: {}", key, raw))?;
                shading.set(key, value).map_err(|e| anyhow::anyhow!(e))?;
                debug!("Shading override {} = {}", key, value);
            }
        }

        if let Some(section) = self.config.get("shading") {
            for key in section.keys() {
                if !ShadeConstants::KEYS.contains(&key.as_str()) {
                    warn!("Ignoring unknown shading constant in config: {}", key);
                }
            }
        }

        Ok(shading)
    }

    /// Generator configuration from the `[generator]` and `[shading]` sections
    pub fn get_generator_config(&self) -> Result<GeneratorConfig> {
        let mut config = GeneratorConfig::default();

        if let Some(cache_dir) = self.get_path("generator", "cache-dir") {
            config.cache_root = cache_dir;
        }

        if let Some(backend) = self.get_value("generator", "backend") {
            config.default_backend = backend.clone();
        }

        if let Some(timeout) = self.get_value("generator", "command-timeout") {
            let seconds = timeout
                .parse::<u64>()
                .with_context(|| format!("Invalid command-timeout value in config: {}", timeout))?;
            config.command_timeout = (seconds > 0).then(|| Duration::from_secs(seconds));
        }

        if let Some(averager) = self.get_value("generator", "averager") {
            config.averager = averager
                .parse::<AveragerKind>()
                .map_err(|e| anyhow::anyhow!(e))?;
        }

        config.shading = self.get_shading()?;

        config
            .validate()
            .with_context(|| "Generator configuration validation failed")?;
        Ok(config)
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(path));
    }
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Discover configuration files in order of precedence
fn discover_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Environment variable $WALGEN_CONFIG
    if let Ok(env_path) = env::var(CONFIG_ENV) {
        paths.push(expand_tilde(&env_path));
    }

    // 2. XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("walgen").join("config.toml"));
    }

    // 3. Home directory
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".walgen.toml"));
    }

    // 4. Project local
    paths.push(PathBuf::from("./.walgen.toml"));

    debug!("Config discovery paths: {:?}", paths);
    paths
}

/// Parse TOML content to string-based configuration
fn parse_toml_config(content: &str) -> Result<Configuration> {
    let toml_value: Value = content.parse().context("Failed to parse TOML content")?;

    let mut config = Configuration::new();
    if let Value::Table(table) = toml_value {
        flatten_toml_table(&table, String::new(), &mut config);
    }

    debug!("Parsed configuration: {:?}", config);
    Ok(config)
}

/// Recursively flatten TOML tables into section.subsection format
fn flatten_toml_table(table: &toml::Table, prefix: String, config: &mut Configuration) {
    for (key, value) in table {
        let section_name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Table(subtable) if subtable.values().all(|v| !v.is_table()) => {
                config.entry(section_name).or_default().extend(
                    subtable
                        .iter()
                        .map(|(subkey, subvalue)| (subkey.clone(), toml_value_to_string(subvalue))),
                );
            }
            Value::Table(subtable) => flatten_toml_table(subtable, section_name, config),
            // Top-level keys belong to [base]
            _ => {
                config
                    .entry("base".to_string())
                    .or_default()
                    .insert(key.clone(), toml_value_to_string(value));
            }
        }
    }
}

/// Convert TOML Value to string representation
fn toml_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn manager_from(toml_content: &str) -> ConfigManager {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, toml_content).unwrap();
        ConfigManager::load_from_file(temp_file.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_toml_value_to_string_conversion() {
        assert_eq!(toml_value_to_string(&Value::String("wal".to_string())), "wal");
        assert_eq!(toml_value_to_string(&Value::Integer(30)), "30");
        assert_eq!(toml_value_to_string(&Value::Float(0.4)), "0.4");
        assert_eq!(toml_value_to_string(&Value::Boolean(true)), "true");
    }

    #[test]
    fn test_parse_toml_config() {
        let config = parse_toml_config(
            r#"
console-level = "warn"

[base]
log-format = "json"

[generator]
backend = "colorthief"
command-timeout = 10

[profiles.laptop]
backend = "okthief"
"#,
        )
        .unwrap();

        assert_eq!(config["base"]["log-format"], "json");
        assert_eq!(config["base"]["console-level"], "warn");
        assert_eq!(config["generator"]["backend"], "colorthief");
        assert_eq!(config["generator"]["command-timeout"], "10");
        assert_eq!(config["profiles.laptop"]["backend"], "okthief");
    }

    #[test]
    fn test_section_fallback_and_selection() {
        let mut config = Configuration::new();
        config.insert(
            "base".to_string(),
            HashMap::from([("log-format".to_string(), "text".to_string())]),
        );
        config.insert(
            "generator".to_string(),
            HashMap::from([("backend".to_string(), "wal".to_string())]),
        );
        config.insert(
            "work".to_string(),
            HashMap::from([("backend".to_string(), "schemer2".to_string())]),
        );

        let mut manager = ConfigManager::from_config(config);
        assert_eq!(manager.get_value("generator", "log-format").unwrap(), "text");
        assert_eq!(manager.get_value("generator", "backend").unwrap(), "wal");
        assert!(manager.get_value("generator", "missing").is_none());

        manager.select_section("work".to_string());
        assert_eq!(manager.get_value("generator", "backend").unwrap(), "schemer2");
    }

    #[test]
    fn test_generator_config_defaults() {
        let config = ConfigManager::from_config(Configuration::new())
            .get_generator_config()
            .unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_generator_config_from_toml() {
        let manager = manager_from(
            r#"
[generator]
cache-dir = "/tmp/walgen-cache"
backend = "colorthief"
command-timeout = 0
averager = "linked"

[shading]
dark-background-darken = 0.5
c16-base-darken = 0.1
"#,
        );
        let config = manager.get_generator_config().unwrap();

        assert_eq!(config.cache_root, PathBuf::from("/tmp/walgen-cache"));
        assert_eq!(config.default_backend, "colorthief");
        assert_eq!(config.command_timeout, None);
        assert_eq!(config.averager, AveragerKind::Linked);
        assert_eq!(config.shading.dark_background_darken, 0.5);
        assert_eq!(config.shading.c16_base_darken, 0.1);
        assert_eq!(config.shading.dark_foreground_lighten, 0.75);
    }

    #[test]
    fn test_invalid_generator_values() {
        for content in [
            "[generator]\ncommand-timeout = \"soon\"\n",
            "[generator]\naverager = \"gimp\"\n",
            "[shading]\ndark-background-darken = 1.5\n",
            "[shading]\nlight-input-darken = \"half\"\n",
        ] {
            assert!(manager_from(content).get_generator_config().is_err(), "{}", content);
        }
    }

    #[test]
    fn test_log_level_and_path() {
        let manager = manager_from(
            r#"
[base]
console-level = "debug"
file-log-level = "loud"
log-file = "~/walgen.log"
"#,
        );
        assert_eq!(
            manager.get_log_level("base", "console-level").unwrap(),
            Some(log::LevelFilter::Debug)
        );
        assert!(manager.get_log_level("base", "file-log-level").is_err());
        assert!(manager.get_log_level("base", "missing").unwrap().is_none());

        let path = manager.get_path("base", "log-file").unwrap();
        assert!(path.ends_with("walgen.log"));
        if dirs::home_dir().is_some() {
            assert!(!path.starts_with("~"));
        }
    }

    #[test]
    fn test_config_file_path_recorded() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, "[base]\nlog-format = \"json\"\n").unwrap();
        let manager = ConfigManager::load_from_file(temp_file.path().to_path_buf()).unwrap();
        assert_eq!(manager.config_file_path(), Some(temp_file.path()));
    }

    #[test]
    fn test_expand_tilde_leaves_other_paths() {
        assert_eq!(expand_tilde("/etc/walgen"), PathBuf::from("/etc/walgen"));
        assert_eq!(expand_tilde("relative/dir"), PathBuf::from("relative/dir"));
    }
}
