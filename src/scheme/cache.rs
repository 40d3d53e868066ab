//! Scheme Cache
//!
//! Finished schemes are stored as JSON under `<cache_root>/schemes`, one file
//! per (image, options) combination. The file name only encodes cheap facts
//! about the image (path and byte size), so every hit is confirmed against a
//! full content checksum stored inside the scheme.
//!
//! Nothing here fails a generation: unreadable or stale entries are misses,
//! and write failures are logged and swallowed. Reads and writes are not
//! locked, so concurrent runs against the same key may race.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use sha2::{Digest, Sha256};

use super::contrast;
use super::{ColorScheme, GenerationOptions};

include!(concat!(env!("OUT_DIR"), "/cache_version.rs"));

/// Subdirectory of the cache root holding scheme files
pub const SCHEMES_DIR: &str = "schemes";

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]").expect("valid regex"));

/// Deterministic identity of a cached scheme
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    image_token: String,
    file_size: u64,
    backend: String,
    light: bool,
    shade_mode: Option<String>,
    saturation: String,
    contrast: Option<String>,
    version: String,
}

impl CacheKey {
    /// Derive the key for `image` under `options`. Fails only if the image
    /// cannot be stat'ed.
    pub fn new(image: &Path, options: &GenerationOptions, version: &str) -> io::Result<Self> {
        let file_size = fs::metadata(image)?.len();
        Ok(Self {
            image_token: image_token(image),
            file_size,
            backend: options.backend.clone(),
            light: options.light,
            shade_mode: options
                .shade_mode
                .is_enabled()
                .then(|| options.shade_mode.as_str().to_string()),
            saturation: options.saturation.clone().unwrap_or_default(),
            contrast: options
                .contrast
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .map(contrast_token),
            version: version.to_string(),
        })
    }

    /// `<img>_[16_<mode>_]<dark|light>_<backend>_<sat>[_<contrast>]_<size>_<version>.json`
    pub fn file_name(&self) -> String {
        let mut parts: Vec<String> = vec![self.image_token.clone()];
        if let Some(mode) = &self.shade_mode {
            parts.push("16".to_string());
            parts.push(mode.clone());
        }
        parts.push(if self.light { "light" } else { "dark" }.to_string());
        parts.push(self.backend.clone());
        parts.push(self.saturation.clone());
        if let Some(contrast) = &self.contrast {
            parts.push(contrast.clone());
        }
        parts.push(self.file_size.to_string());
        parts.push(self.version.clone());
        format!("{}.json", parts.join("_"))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Path-derived token with every non-alphanumeric character replaced
pub fn image_token(image: &Path) -> String {
    NON_ALPHANUMERIC
        .replace_all(&image.to_string_lossy(), "_")
        .into_owned()
}

/// Contrast values are keyed by their numeric value so `4.5` and `4.50` agree
fn contrast_token(raw: &str) -> String {
    match contrast::parse_ratio(raw) {
        Ok(value) if value.fract() == 0.0 => format!("{:.1}", value),
        Ok(value) => value.to_string(),
        Err(_) => raw.trim().to_string(),
    }
}

/// Streamed SHA-256 of the file contents, lowercase hex
pub fn image_checksum(image: &Path) -> io::Result<String> {
    let mut file = File::open(image)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 4096];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Why a lookup did not produce a scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMiss {
    NotFound,
    Unreadable,
    Corrupt,
    ChecksumMismatch,
}

impl fmt::Display for CacheMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            CacheMiss::NotFound => "no cached scheme",
            CacheMiss::Unreadable => "cached scheme unreadable",
            CacheMiss::Corrupt => "cached scheme corrupt",
            CacheMiss::ChecksumMismatch => "image changed since scheme was cached",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(ColorScheme),
    Miss(CacheMiss),
}

/// Reads and writes scheme files under a cache root
#[derive(Debug, Clone)]
pub struct CacheManager {
    root: PathBuf,
}

impl CacheManager {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn schemes_dir(&self) -> PathBuf {
        self.root.join(SCHEMES_DIR)
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.schemes_dir().join(key.file_name())
    }

    /// Look up a scheme, confirming it against the image's current checksum.
    pub fn lookup(&self, key: &CacheKey, image: &Path) -> CacheLookup {
        let path = self.path_for(key);
        if !path.is_file() {
            return CacheLookup::Miss(CacheMiss::NotFound);
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!("Failed to read cached scheme {}: {}", path.display(), e);
                return CacheLookup::Miss(CacheMiss::Unreadable);
            }
        };

        let scheme: ColorScheme = match serde_json::from_str(&content) {
            Ok(scheme) => scheme,
            Err(e) => {
                debug!("Failed to parse cached scheme {}: {}", path.display(), e);
                return CacheLookup::Miss(CacheMiss::Corrupt);
            }
        };

        match image_checksum(image) {
            Ok(checksum) if checksum == scheme.checksum => CacheLookup::Hit(scheme),
            Ok(_) => CacheLookup::Miss(CacheMiss::ChecksumMismatch),
            Err(e) => {
                debug!("Failed to checksum {}: {}", image.display(), e);
                CacheLookup::Miss(CacheMiss::Unreadable)
            }
        }
    }

    /// Persist a scheme. Failures are logged and reported as `false`.
    pub fn store(&self, key: &CacheKey, scheme: &ColorScheme) -> bool {
        let path = self.path_for(key);
        match self.write(&path, scheme) {
            Ok(()) => {
                debug!("Cached scheme at {}", path.display());
                true
            }
            Err(e) => {
                warn!("Couldn't write to {}: {}", path.display(), e);
                false
            }
        }
    }

    fn write(&self, path: &Path, scheme: &ColorScheme) -> io::Result<()> {
        fs::create_dir_all(self.schemes_dir())?;
        let json = serde_json::to_string_pretty(scheme).map_err(io::Error::other)?;
        fs::write(path, json)
    }

    /// Remove every cached scheme
    pub fn clear(&self) -> io::Result<()> {
        let dir = self.schemes_dir();
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}
