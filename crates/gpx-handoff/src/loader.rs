//! Content loader - reads an accepted resource into memory as text

use crate::reference::ResourceReference;
use crate::resolver::ResourceResolver;
use crate::{HandoffError, Result};
use std::fmt;
use std::io::Read;
use std::sync::Arc;

/// Text content of a GPX resource, untouched
#[derive(Clone, PartialEq, Eq)]
pub struct GpxPayload(String);

impl GpxPayload {
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

// GPX documents can be megabytes long; keep logs readable
impl fmt::Debug for GpxPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GpxPayload({} bytes)", self.0.len())
    }
}

/// Reads whole resources through a [`ResourceResolver`].
///
/// The read is blocking and performed inline: GPX files are small, and there is
/// no timeout, cancellation or retry. The resource is never modified.
#[derive(Clone)]
pub struct ContentLoader {
    resolver: Arc<dyn ResourceResolver>,
}

impl ContentLoader {
    pub fn new(resolver: Arc<dyn ResourceResolver>) -> Self {
        Self { resolver }
    }

    /// Read the full resource as UTF-8.
    ///
    /// Any failure (cannot open, I/O error, invalid UTF-8) is
    /// [`HandoffError::ResourceUnavailable`].
    pub fn load(&self, reference: &ResourceReference) -> Result<GpxPayload> {
        profiling::scope!("ContentLoader::load");

        let unavailable = |source| HandoffError::ResourceUnavailable {
            reference: reference.to_string(),
            source,
        };

        let mut reader = self.resolver.open(reference).map_err(unavailable)?;
        let mut content = String::new();
        reader.read_to_string(&mut content).map_err(unavailable)?;

        tracing::debug!("Read {} bytes from {}", content.len(), reference);
        Ok(GpxPayload(content))
    }
}
