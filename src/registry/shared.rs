//! Post-startup registration by snapshot and swap.
//!
//! Readers call [`SharedRegistry::snapshot`] and work with an
//! `Arc<ProtocolRegistry>` that never changes under them. Writers are
//! serialized on a mutex, build a complete new table from the current one
//! plus their entry, and publish it with a single pointer swap. A failed
//! registration publishes nothing.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::ProtocolRegistry;
use crate::error::Result;
use crate::message::{Protocol, ProtocolKind};

/// A registry that can grow after startup (plugin-style message kinds).
pub struct SharedRegistry {
    /// Published table.
    current: RwLock<Arc<ProtocolRegistry>>,
    /// Serializes writers so no registration is lost between read and swap.
    write_lock: Mutex<()>,
}

impl SharedRegistry {
    pub fn new(registry: ProtocolRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
            write_lock: Mutex::new(()),
        }
    }

    /// Get the currently published table.
    pub fn snapshot(&self) -> Arc<ProtocolRegistry> {
        // The guarded value is only ever replaced whole, so a poisoned lock
        // still holds a complete table.
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Register kind `T` under `code` and publish the new table.
    pub fn register<T: ProtocolKind>(&self, code: u16) -> Result<Arc<ProtocolRegistry>> {
        self.register_prototype(code, Box::new(T::default()))
    }

    /// Register a boxed prototype under `code` and publish the new table.
    pub fn register_prototype(
        &self,
        code: u16,
        prototype: Box<dyn Protocol>,
    ) -> Result<Arc<ProtocolRegistry>> {
        let _writer = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut builder = self.snapshot().to_builder()?;
        builder.register_prototype(code, prototype)?;
        let next = Arc::new(builder.build());

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next.clone();
        tracing::info!("Published protocol registry with {} entries", next.len());
        Ok(next)
    }
}

impl From<ProtocolRegistry> for SharedRegistry {
    fn from(registry: ProtocolRegistry) -> Self {
        Self::new(registry)
    }
}
