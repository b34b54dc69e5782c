//! Registry and router configuration.
//!
//! All fields have defaults, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "enforce_families": false, "max_body_size": 65536 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::error::{RegistryError, Result};

/// Default maximum packet body size (16 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Default maximum concurrent packet handlers.
pub const DEFAULT_MAX_CONCURRENT_HANDLERS: usize = 256;

/// Configuration for building and serving a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Reject codes outside the kind's declared family block.
    pub enforce_families: bool,
    /// Largest body accepted by the packet decoder.
    pub max_body_size: usize,
    /// Router handler concurrency before packets are dropped.
    pub max_concurrent_handlers: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            enforce_families: true,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            max_concurrent_handlers: DEFAULT_MAX_CONCURRENT_HANDLERS,
        }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn family range enforcement on or off.
    ///
    /// Default: on
    pub fn enforce_families(mut self, enforce: bool) -> Self {
        self.enforce_families = enforce;
        self
    }

    /// Set the maximum body size.
    ///
    /// Default: 16 MB
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Set the maximum number of concurrent handlers.
    ///
    /// Default: 256
    pub fn max_concurrent_handlers(mut self, limit: usize) -> Self {
        self.max_concurrent_handlers = limit;
        self
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `max_body_size` is zero or
    /// `max_concurrent_handlers` is outside `1..=Semaphore::MAX_PERMITS`.
    pub fn validate(&self) -> Result<()> {
        if self.max_body_size == 0 {
            return Err(RegistryError::InvalidConfig(
                "max_body_size must be greater than 0".to_string(),
            ));
        }
        if !(1..=Semaphore::MAX_PERMITS).contains(&self.max_concurrent_handlers) {
            return Err(RegistryError::InvalidConfig(format!(
                "max_concurrent_handlers must be between 1 and {}, got {}",
                Semaphore::MAX_PERMITS,
                self.max_concurrent_handlers
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!("Loaded registry config from {}", path.display());
        Ok(config)
    }
}
