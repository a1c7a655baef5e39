//! Resource resolvers - the platform seam for looking up and opening references
//!
//! The handoff core never talks to a content provider or a sandbox API itself.
//! Everything platform-specific goes through [`ResourceResolver`]:
//!
//! - [`LocalResolver`]: the filesystem for `file://`, plus a table of registered
//!   `content://` entries (used by the desktop host to stand in for a provider).
//! - [`DescriptorResolver`] (unix): the platform shim opens the resource itself and
//!   hands over an owned file descriptor. This is how the Android shim passes
//!   `ContentResolver.openFileDescriptor` results across.

use crate::reference::{ResourceReference, Scheme};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

/// Platform access to resources named by a [`ResourceReference`]
pub trait ResourceResolver: Send + Sync {
    /// Media type the platform reports for the resource, if any
    fn media_type(&self, reference: &ResourceReference) -> Option<String>;

    /// Open the resource for reading
    fn open(&self, reference: &ResourceReference) -> io::Result<Box<dyn Read + Send>>;

    /// The reference was discarded (rejected, superseded or consumed).
    /// Release anything held for it.
    fn release(&self, reference: &ResourceReference) {
        let _ = reference;
    }
}

/// Entry standing in for a content provider row
#[derive(Debug, Clone)]
struct ContentEntry {
    path: PathBuf,
    media_type: Option<String>,
}

/// Filesystem-backed resolver
#[derive(Debug, Clone, Default)]
pub struct LocalResolver {
    content: HashMap<String, ContentEntry>,
}

impl LocalResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `uri` (a `content://` locator) from `path`, reporting `media_type`
    pub fn with_content(
        mut self,
        uri: &ResourceReference,
        path: impl Into<PathBuf>,
        media_type: Option<String>,
    ) -> Self {
        self.content.insert(
            uri.as_str().to_string(),
            ContentEntry {
                path: path.into(),
                media_type,
            },
        );
        self
    }
}

impl ResourceResolver for LocalResolver {
    fn media_type(&self, reference: &ResourceReference) -> Option<String> {
        self.content
            .get(reference.as_str())
            .and_then(|entry| entry.media_type.clone())
    }

    fn open(&self, reference: &ResourceReference) -> io::Result<Box<dyn Read + Send>> {
        match reference.scheme() {
            Scheme::File => {
                let path = reference.to_file_path().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "not a local file path")
                })?;
                Ok(Box::new(File::open(path)?))
            }
            Scheme::Content => {
                let entry = self.content.get(reference.as_str()).ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, "Could not open URI")
                })?;
                Ok(Box::new(File::open(&entry.path)?))
            }
            Scheme::Other(scheme) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported scheme '{scheme}'"),
            )),
        }
    }
}

#[cfg(unix)]
mod descriptor {
    use super::*;
    use std::os::fd::OwnedFd;
    use std::sync::Mutex;

    struct Handed {
        media_type: Option<String>,
        fd: OwnedFd,
    }

    /// Resolver over descriptors opened by the platform shim.
    ///
    /// Each descriptor can be opened once; opening transfers it to the reader,
    /// releasing closes it.
    #[derive(Default)]
    pub struct DescriptorResolver {
        handed: Mutex<HashMap<String, Handed>>,
    }

    impl DescriptorResolver {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register the descriptor the platform opened for `reference`.
        /// A descriptor already registered for the same locator is closed.
        pub fn register(
            &self,
            reference: &ResourceReference,
            media_type: Option<String>,
            fd: OwnedFd,
        ) {
            let mut handed = self.handed.lock().unwrap_or_else(|poisoned| {
                tracing::warn!("Descriptor table mutex poisoned; recovering");
                poisoned.into_inner()
            });
            handed.insert(reference.as_str().to_string(), Handed { media_type, fd });
        }

        fn take(&self, reference: &ResourceReference) -> Option<Handed> {
            let mut handed = self
                .handed
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            handed.remove(reference.as_str())
        }

        pub fn is_registered(&self, reference: &ResourceReference) -> bool {
            self.handed
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .contains_key(reference.as_str())
        }
    }

    impl ResourceResolver for DescriptorResolver {
        fn media_type(&self, reference: &ResourceReference) -> Option<String> {
            self.handed
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .get(reference.as_str())
                .and_then(|h| h.media_type.clone())
        }

        fn open(&self, reference: &ResourceReference) -> io::Result<Box<dyn Read + Send>> {
            let handed = self.take(reference).ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not open URI")
            })?;
            Ok(Box::new(File::from(handed.fd)))
        }

        fn release(&self, reference: &ResourceReference) {
            if self.take(reference).is_some() {
                tracing::debug!("Closed descriptor for {}", reference);
            }
        }
    }
}

#[cfg(unix)]
pub use descriptor::DescriptorResolver;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn read_all(mut reader: Box<dyn Read + Send>) -> String {
        let mut s = String::new();
        reader.read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn test_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<gpx/>").unwrap();
        let reference = ResourceReference::from_path(file.path()).unwrap();

        let resolver = LocalResolver::new();
        assert_eq!(resolver.media_type(&reference), None);
        assert_eq!(read_all(resolver.open(&reference).unwrap()), "<gpx/>");
    }

    #[test]
    fn test_registered_content_entry() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<gpx>provider</gpx>").unwrap();
        let uri = ResourceReference::parse("content://provider/7").unwrap();

        let resolver = LocalResolver::new().with_content(
            &uri,
            file.path(),
            Some("application/gpx+xml".to_string()),
        );
        assert_eq!(
            resolver.media_type(&uri).as_deref(),
            Some("application/gpx+xml")
        );
        assert_eq!(read_all(resolver.open(&uri).unwrap()), "<gpx>provider</gpx>");

        let unknown = ResourceReference::parse("content://provider/8").unwrap();
        assert_eq!(
            resolver.open(&unknown).err().map(|e| e.kind()),
            Some(io::ErrorKind::NotFound)
        );
    }

    #[test]
    fn test_unsupported_scheme() {
        let reference = ResourceReference::parse("https://example.com/route.gpx").unwrap();
        let err = LocalResolver::new().open(&reference).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[cfg(unix)]
    #[test]
    fn test_descriptor_opens_once() {
        let mut file = tempfile::tempfile().unwrap();
        write!(file, "<gpx>fd</gpx>").unwrap();
        std::io::Seek::rewind(&mut file).unwrap();

        let reference = ResourceReference::parse("content://downloads/3").unwrap();
        let resolver = DescriptorResolver::new();
        resolver.register(&reference, Some("text/xml".to_string()), file.into());

        assert_eq!(resolver.media_type(&reference).as_deref(), Some("text/xml"));
        assert_eq!(read_all(resolver.open(&reference).unwrap()), "<gpx>fd</gpx>");
        assert!(!resolver.is_registered(&reference));
        assert!(resolver.open(&reference).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_descriptor_release() {
        let file = tempfile::tempfile().unwrap();
        let reference = ResourceReference::parse("content://downloads/4").unwrap();
        let resolver = DescriptorResolver::new();
        resolver.register(&reference, None, file.into());
        assert!(resolver.is_registered(&reference));

        resolver.release(&reference);
        assert!(!resolver.is_registered(&reference));
    }
}
