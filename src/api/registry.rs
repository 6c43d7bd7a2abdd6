//! Late-bound route trees.
//!
//! Extensions register a builder under a mount path before the server
//! starts. The registry is read once, when the authenticated group is
//! assembled, and refuses registrations from then on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::routing::RouteBuilder;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("route tree already built, cannot register '{path}'")]
    Sealed { path: String },

    #[error("invalid mount path '{path}': must start with '/' and name a segment")]
    InvalidPath { path: String },
}

/// Mapping from mount path to route builder. Iteration order is unspecified.
#[derive(Default)]
pub struct RouteRegistry {
    routers: HashMap<String, RouteBuilder>,
    sealed: AtomicBool,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `builder` under `path`, replacing any earlier builder for the
    /// same path.
    pub fn add(&mut self, path: impl Into<String>, builder: RouteBuilder) -> Result<(), RegistryError> {
        let path = path.into();
        if self.is_sealed() {
            return Err(RegistryError::Sealed { path });
        }
        if !path.starts_with('/') || path.trim_end_matches('/').is_empty() {
            return Err(RegistryError::InvalidPath { path });
        }
        // "/extra" and "/extra/" mount at the same prefix.
        let path = path.trim_end_matches('/').to_string();

        if self.routers.insert(path.clone(), builder).is_some() {
            tracing::warn!(path = %path, "Router replaced by later registration");
        } else {
            tracing::debug!(path = %path, "Router registered");
        }
        Ok(())
    }

    /// Close the registry and hand out its entries.
    pub fn seal(&self) -> &HashMap<String, RouteBuilder> {
        self.sealed.store(true, Ordering::Release);
        &self.routers
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }
}

impl std::fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRegistry")
            .field("paths", &self.routers.keys().collect::<Vec<_>>())
            .field("sealed", &self.is_sealed())
            .finish()
    }
}
