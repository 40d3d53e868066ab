//! Generator configuration
//!
//! Everything the orchestrator needs that would otherwise be process-wide
//! state: where the cache lives, which backend to default to, how long an
//! external tool may run and the shading calibration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;

use crate::backend::registry::DEFAULT_BACKEND;
use super::adjust::ShadeConstants;
use super::cache::CACHE_VERSION;

/// Default bound on a single external tool invocation
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// How the wallpaper's average colour is computed for contrast enforcement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AveragerKind {
    /// ImageMagick `-resize 1x1!`
    #[default]
    Magick,
    /// In-process mean over decoded pixels
    Linked,
}

impl FromStr for AveragerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "magick" => Ok(AveragerKind::Magick),
            "linked" => Ok(AveragerKind::Linked),
            _ => Err(format!("Invalid averager: {}. Valid options: magick, linked", s)),
        }
    }
}

/// Configuration threaded through [`super::Generator`]
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Cache root; schemes live under `<cache_root>/schemes`
    pub cache_root: PathBuf,
    /// Backend used when the requested one is unknown
    pub default_backend: String,
    /// Bound on each external tool invocation, `None` to wait forever
    pub command_timeout: Option<Duration>,
    pub averager: AveragerKind,
    pub shading: ShadeConstants,
    /// Embedded in cache file names
    pub cache_version: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            cache_root: default_cache_root(),
            default_backend: DEFAULT_BACKEND.to_string(),
            command_timeout: Some(DEFAULT_COMMAND_TIMEOUT),
            averager: AveragerKind::default(),
            shading: ShadeConstants::default(),
            cache_version: CACHE_VERSION.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Default configuration rooted at a specific cache directory
    pub fn with_cache_root(cache_root: PathBuf) -> Self {
        Self {
            cache_root,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_backend.trim().is_empty() {
            return Err(anyhow::anyhow!("default backend must not be empty"));
        }
        if self.cache_version.trim().is_empty() {
            return Err(anyhow::anyhow!("cache version must not be empty"));
        }
        if self.command_timeout == Some(Duration::ZERO) {
            return Err(anyhow::anyhow!("command timeout must be positive; omit it to disable"));
        }
        Ok(())
    }
}

/// `<user cache dir>/walgen`, falling back to a relative `.cache/walgen`
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("walgen")
}
