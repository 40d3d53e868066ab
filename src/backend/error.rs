//! Backend Error Types
//!
//! Errors raised while extracting or normalizing a palette.

use std::time::Duration;

use thiserror::Error;

use super::command::CommandError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Error, Debug)]
pub enum BackendError {
    /// A tool or library the backend needs is not installed
    #[error("{dependency} wasn't found on your system (backend '{backend}'). {remediation}")]
    MissingDependency {
        backend: String,
        dependency: String,
        remediation: String,
    },

    /// The backend ran but produced nothing usable
    #[error("Backend '{backend}' failed: {message}")]
    ExtractionFailed { backend: String, message: String },

    /// An external tool exceeded its time budget
    #[error("Command `{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// A tool emitted something that is not a colour
    #[error("Invalid colour in backend output: {value}")]
    InvalidColor { value: String },

    /// Backend not present in the registry
    #[error("Backend not found: {backend}")]
    NotRegistered { backend: String },

    /// Backend id registered twice
    #[error("Backend already registered: {backend}")]
    AlreadyRegistered { backend: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shown alongside every missing dependency
pub const REMEDIATION: &str = "Try another backend. (walgen --backend)";

impl BackendError {
    /// Create a missing dependency error with the standard remediation
    pub fn missing_dependency<B: Into<String>, D: Into<String>>(backend: B, dependency: D) -> Self {
        Self::MissingDependency {
            backend: backend.into(),
            dependency: dependency.into(),
            remediation: REMEDIATION.to_string(),
        }
    }

    /// Create an extraction failure
    pub fn extraction_failed<B: Into<String>, S: Into<String>>(backend: B, message: S) -> Self {
        Self::ExtractionFailed {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create an invalid colour error
    pub fn invalid_color<S: Into<String>>(value: S) -> Self {
        Self::InvalidColor { value: value.into() }
    }

    /// Create a not registered error
    pub fn not_registered<S: Into<String>>(backend: S) -> Self {
        Self::NotRegistered { backend: backend.into() }
    }

    /// Create an already registered error
    pub fn already_registered<S: Into<String>>(backend: S) -> Self {
        Self::AlreadyRegistered { backend: backend.into() }
    }

    /// Map a process failure onto the backend that issued it
    pub fn from_command(backend: &str, dependency: &str, error: CommandError) -> Self {
        match error {
            CommandError::NotFound { .. } => Self::missing_dependency(backend, dependency),
            CommandError::Timeout { command, timeout } => Self::Timeout { command, timeout },
            other => Self::extraction_failed(backend, other.to_string()),
        }
    }

    /// Fatal errors end the invocation; there is no fallback to another backend
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BackendError::MissingDependency { .. } | BackendError::Timeout { .. }
        )
    }

    /// Remediation hint for the user, when one exists
    pub fn remediation(&self) -> Option<&str> {
        match self {
            BackendError::MissingDependency { remediation, .. } => Some(remediation),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency_message() {
        let error = BackendError::missing_dependency("schemer2", "schemer2");
        let message = error.to_string();
        assert!(message.contains("schemer2 wasn't found"));
        assert!(message.contains("--backend"));
        assert!(error.is_fatal());
        assert_eq!(error.remediation(), Some(REMEDIATION));
    }

    #[test]
    fn test_command_error_mapping() {
        let not_found = CommandError::NotFound { command: "magick".to_string() };
        assert!(matches!(
            BackendError::from_command("wal", "ImageMagick", not_found),
            BackendError::MissingDependency { .. }
        ));

        let timeout = CommandError::Timeout {
            command: "magick".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert!(matches!(
            BackendError::from_command("wal", "ImageMagick", timeout),
            BackendError::Timeout { .. }
        ));

        let failed = CommandError::Failed {
            command: "magick".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "bad image".to_string(),
        };
        let mapped = BackendError::from_command("wal", "ImageMagick", failed);
        assert!(matches!(mapped, BackendError::ExtractionFailed { .. }));
        assert!(!mapped.is_fatal());
    }
}
