//! Generation orchestrator
//!
//! `cache lookup -> backend get -> saturation -> contrast -> assemble -> store`.
//! A cache hit short-circuits everything after the lookup and returns the
//! stored scheme verbatim.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use super::adjust::saturate_palette;
use super::cache::{image_checksum, CacheKey, CacheLookup, CacheManager};
use super::config::GeneratorConfig;
use super::contrast::{self, ensure_contrast};
use super::{ColorScheme, GenerationOptions};
use crate::backend::average::averager_for;
use crate::backend::{
    BackendContext, BackendError, BackendOutput, BackendRegistry, ColorAverager, CommandRunner,
};

/// Result type for generation
pub type GenerateResult<T> = Result<T, GenerateError>;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Cannot read image {path}: {source}")]
    ImageUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GenerateError {
    fn image_unreadable(path: &Path, source: io::Error) -> Self {
        Self::ImageUnreadable {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Remediation hint for the user, when one exists
    pub fn remediation(&self) -> Option<&str> {
        match self {
            GenerateError::Backend(e) => e.remediation(),
            GenerateError::ImageUnreadable { .. } => None,
        }
    }
}

/// Where a scheme came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Cached,
    Generated {
        /// Backend that actually ran
        backend: String,
        /// Colours were duplicated to fill the palette
        degraded: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub scheme: ColorScheme,
    pub origin: Origin,
}

impl Generation {
    pub fn is_cached(&self) -> bool {
        matches!(self.origin, Origin::Cached)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.origin, Origin::Generated { degraded: true, .. })
    }
}

pub struct Generator {
    config: GeneratorConfig,
    registry: BackendRegistry,
    averager: Box<dyn ColorAverager>,
    cache: CacheManager,
    context: BackendContext,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            registry: BackendRegistry::builtin(&config.default_backend),
            averager: averager_for(config.averager),
            cache: CacheManager::new(config.cache_root.clone()),
            context: BackendContext::new(CommandRunner::new(config.command_timeout), config.shading),
            config,
        }
    }

    /// Replace the backend set
    pub fn with_registry(mut self, registry: BackendRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the average colour source used for contrast enforcement
    pub fn with_averager(mut self, averager: Box<dyn ColorAverager>) -> Self {
        self.averager = averager;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    pub fn list_backends(&self) -> Vec<&'static str> {
        self.registry.list()
    }

    pub fn clear_cache(&self) -> io::Result<()> {
        self.cache.clear()
    }

    /// Produce the scheme for `image`, from cache when possible
    pub fn generate(&self, image: &Path, options: &GenerationOptions) -> GenerateResult<Generation> {
        let image = fs::canonicalize(image).map_err(|e| GenerateError::image_unreadable(image, e))?;
        let key = CacheKey::new(&image, options, &self.config.cache_version)
            .map_err(|e| GenerateError::image_unreadable(&image, e))?;

        match self.cache.lookup(&key, &image) {
            CacheLookup::Hit(scheme) => {
                info!("Found cached colorscheme");
                return Ok(Generation {
                    scheme,
                    origin: Origin::Cached,
                });
            }
            CacheLookup::Miss(reason) => debug!("Cache miss for {}: {}", key, reason),
        }

        info!("Generating a colorscheme");
        let backend = self.registry.resolve(&options.backend)?;
        info!("Using {} backend", backend.id());

        let BackendOutput {
            mut palette,
            degraded,
        } = backend.get(&image, options, &self.context)?;
        if degraded {
            warn!("Palette from {} was padded by duplicating colours", backend.id());
        }

        if let Some(amount) = non_empty(options.saturation.as_deref()) {
            saturate_palette(&mut palette, amount);
        }

        if let Some(ratio) = non_empty(options.contrast.as_deref()) {
            // Validate before paying for the average colour
            match contrast::parse_ratio(ratio) {
                Ok(_) => {
                    let background = self.averager.average(&image, &self.context.runner)?;
                    ensure_contrast(&mut palette, ratio, options.light, background);
                }
                Err(e) => warn!("{}", e),
            }
        }

        let checksum =
            image_checksum(&image).map_err(|e| GenerateError::image_unreadable(&image, e))?;
        let scheme = ColorScheme::new(checksum, &image, options.alpha, palette);
        self.cache.store(&key, &scheme);
        info!("Generation complete");

        Ok(Generation {
            scheme,
            origin: Origin::Generated {
                backend: backend.id().to_string(),
                degraded,
            },
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendResult, Extraction};
    use crate::backend::Backend;
    use crate::colour::Color;
    use crate::scheme::Palette;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct FixedBackend {
        calls: Arc<AtomicUsize>,
    }

    impl Backend for FixedBackend {
        fn id(&self) -> &'static str {
            "fixed"
        }

        fn description(&self) -> &'static str {
            "test"
        }

        fn extract(&self, _image: &Path, _context: &BackendContext) -> BackendResult<Extraction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Extraction::complete(
                (0..16u8).map(|i| Color::new(i * 15, 100, 255 - i * 15)).collect(),
            ))
        }

        fn normalize(&self, raw: &[Color]) -> BackendResult<BackendOutput> {
            let (palette, degraded) = Palette::fill_from(raw)
                .ok_or_else(|| BackendError::extraction_failed("fixed", "empty"))?;
            Ok(BackendOutput { palette, degraded })
        }
    }

    struct Unreachable;

    impl ColorAverager for Unreachable {
        fn average(&self, _image: &Path, _runner: &CommandRunner) -> BackendResult<Color> {
            panic!("averager must not run");
        }
    }

    fn generator(dir: &TempDir) -> (Generator, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = BackendRegistry::new("fixed");
        registry
            .register(Box::new(FixedBackend { calls: calls.clone() }))
            .unwrap();
        let generator = Generator::new(GeneratorConfig::with_cache_root(dir.path().join("cache")))
            .with_registry(registry)
            .with_averager(Box::new(Unreachable));
        (generator, calls)
    }

    fn options() -> GenerationOptions {
        GenerationOptions {
            backend: "fixed".to_string(),
            ..GenerationOptions::default()
        }
    }

    #[test]
    fn test_second_call_is_cached() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("wall.png");
        fs::write(&image, b"image bytes").unwrap();
        let (generator, calls) = generator(&dir);

        let first = generator.generate(&image, &options()).unwrap();
        assert_eq!(
            first.origin,
            Origin::Generated {
                backend: "fixed".to_string(),
                degraded: false
            }
        );
        let second = generator.generate(&image, &options()).unwrap();
        assert!(second.is_cached());
        assert_eq!(second.scheme, first.scheme);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_contrast_skips_averaging() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("wall.png");
        fs::write(&image, b"image bytes").unwrap();
        let (generator, _) = generator(&dir);

        let plain = generator.generate(&image, &options()).unwrap();
        for ratio in ["25", "abc", "0.5"] {
            let opts = GenerationOptions {
                contrast: Some(ratio.to_string()),
                ..options()
            };
            let result = generator.generate(&image, &opts).unwrap();
            assert_eq!(result.scheme.colors, plain.scheme.colors);
        }
    }

    #[test]
    fn test_unknown_backend_falls_back() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("wall.png");
        fs::write(&image, b"image bytes").unwrap();
        let (generator, calls) = generator(&dir);

        let opts = GenerationOptions {
            backend: "nope".to_string(),
            ..options()
        };
        let generation = generator.generate(&image, &opts).unwrap();
        assert!(matches!(generation.origin, Origin::Generated { ref backend, .. } if backend == "fixed"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_image() {
        let dir = TempDir::new().unwrap();
        let (generator, _) = generator(&dir);
        let result = generator.generate(&dir.path().join("absent.png"), &options());
        assert!(matches!(result, Err(GenerateError::ImageUnreadable { .. })));
    }
}
