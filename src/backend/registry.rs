//! Backend Registry
//!
//! Closed set of extraction backends, looked up by identifier.

use std::collections::BTreeMap;

use log::{debug, warn};
use rand::Rng;

use super::colorthief::ColorThiefBackend;
use super::error::{BackendError, BackendResult};
use super::haishoku::HaishokuBackend;
use super::okthief::OkthiefBackend;
use super::schemer2::Schemer2Backend;
use super::wal::WalBackend;
use super::Backend;

/// Backend used when none is requested or the requested one is unknown
pub const DEFAULT_BACKEND: &str = "wal";

/// Reserved identifier selecting a registered backend at random
pub const RANDOM_BACKEND: &str = "random";

/// Registry for backend instances
pub struct BackendRegistry {
    backends: BTreeMap<&'static str, Box<dyn Backend>>,
    default: String,
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::builtin(DEFAULT_BACKEND)
    }
}

impl BackendRegistry {
    /// Create an empty registry
    pub fn new<S: Into<String>>(default: S) -> Self {
        Self {
            backends: BTreeMap::new(),
            default: default.into(),
        }
    }

    /// Registry holding every built-in backend
    pub fn builtin(default: &str) -> Self {
        let mut registry = Self::new(default);
        let builtins: Vec<Box<dyn Backend>> = vec![
            Box::new(WalBackend::new()),
            Box::new(Schemer2Backend::new()),
            Box::new(OkthiefBackend::new()),
            Box::new(ColorThiefBackend),
            Box::new(HaishokuBackend),
        ];
        for backend in builtins {
            // Built-in ids are distinct
            let _ = registry.register(backend);
        }
        registry
    }

    /// Register a backend
    pub fn register(&mut self, backend: Box<dyn Backend>) -> BackendResult<()> {
        let id = backend.id();
        if id == RANDOM_BACKEND {
            return Err(BackendError::already_registered(id));
        }
        if self.backends.contains_key(id) {
            return Err(BackendError::already_registered(id));
        }
        self.backends.insert(id, backend);
        Ok(())
    }

    /// Registered identifiers, sorted
    pub fn list(&self) -> Vec<&'static str> {
        self.backends.keys().copied().collect()
    }

    /// `(id, description)` pairs, sorted by id
    pub fn describe(&self) -> Vec<(&'static str, &'static str)> {
        self.backends
            .values()
            .map(|backend| (backend.id(), backend.description()))
            .collect()
    }

    pub fn default_backend(&self) -> &str {
        &self.default
    }

    pub fn get(&self, id: &str) -> Option<&dyn Backend> {
        self.backends.get(id).map(|backend| backend.as_ref())
    }

    /// Turn a requested identifier into a backend.
    ///
    /// `random` picks uniformly among the registered backends. Unknown ids
    /// fall back to the default backend with a warning.
    pub fn resolve(&self, requested: &str) -> BackendResult<&dyn Backend> {
        if requested == RANDOM_BACKEND {
            if self.backends.is_empty() {
                return Err(BackendError::not_registered(RANDOM_BACKEND));
            }
            let pick = rand::rng().random_range(0..self.backends.len());
            if let Some(backend) = self.backends.values().nth(pick) {
                debug!("Randomly selected backend '{}'", backend.id());
                return Ok(backend.as_ref());
            }
        }

        if let Some(backend) = self.get(requested) {
            return Ok(backend);
        }

        if requested != RANDOM_BACKEND {
            warn!(
                "Backend '{}' not found, falling back to '{}'",
                requested, self.default
            );
        }
        self.get(&self.default)
            .ok_or_else(|| BackendError::not_registered(self.default.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_backends_listed_sorted() {
        let registry = BackendRegistry::default();
        assert_eq!(registry.list(), vec!["colorthief", "haishoku", "okthief", "schemer2", "wal"]);
        assert_eq!(registry.describe().len(), 5);
    }

    #[test]
    fn test_resolve_known_and_unknown() {
        let registry = BackendRegistry::default();
        assert_eq!(registry.resolve("schemer2").unwrap().id(), "schemer2");
        assert_eq!(registry.resolve("nonexistent").unwrap().id(), DEFAULT_BACKEND);
    }

    #[test]
    fn test_resolve_random_picks_registered() {
        let registry = BackendRegistry::default();
        let ids = registry.list();
        for _ in 0..20 {
            let picked = registry.resolve(RANDOM_BACKEND).unwrap().id();
            assert!(ids.contains(&picked));
        }
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = BackendRegistry::default();
        let result = registry.register(Box::new(WalBackend::new()));
        assert!(matches!(result, Err(BackendError::AlreadyRegistered { .. })));
    }

    #[test]
    fn test_empty_registry() {
        let registry = BackendRegistry::new(DEFAULT_BACKEND);
        assert!(matches!(
            registry.resolve(DEFAULT_BACKEND),
            Err(BackendError::NotRegistered { .. })
        ));
        assert!(registry.resolve(RANDOM_BACKEND).is_err());
    }
}
