//! ResourceReference - Immutable locator for an OS-supplied resource
//!
//! A reference is created once per launch/open event and dropped after the
//! content loader consumed it or the intake filter rejected it.

use crate::{HandoffError, Result};
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Locator scheme, as far as the intake filter cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheme {
    /// `file://` - a local path
    File,
    /// `content://` - an opaque provider-backed resource
    Content,
    /// Anything else (`https`, `data`, app-specific schemes...)
    Other(String),
}

/// Opaque locator (scheme + path/identifier) handed over by the OS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReference {
    url: Url,
    /// Media type announced together with the request (e.g. the intent's type)
    declared_media_type: Option<String>,
}

impl ResourceReference {
    /// Parse a locator such as `file:///sdcard/route.gpx` or `content://provider/7`
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input.trim()).map_err(|source| HandoffError::InvalidReference {
            input: input.to_string(),
            source,
        })?;
        Ok(Self {
            url,
            declared_media_type: None,
        })
    }

    /// Build a `file://` reference for a filesystem path.
    ///
    /// Relative paths are resolved against the current working directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|dir| dir.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        };
        let url =
            Url::from_file_path(&absolute).map_err(|_| HandoffError::InvalidReference {
                input: path.display().to_string(),
                source: url::ParseError::RelativeUrlWithoutBase,
            })?;
        Ok(Self {
            url,
            declared_media_type: None,
        })
    }

    /// Accept either a locator or a plain filesystem path
    pub fn parse_or_path(input: &str) -> Result<Self> {
        match Self::parse(input) {
            Err(HandoffError::InvalidReference {
                source: url::ParseError::RelativeUrlWithoutBase,
                ..
            }) => Self::from_path(Path::new(input)),
            other => other,
        }
    }

    /// Attach the media type the OS declared for this resource
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        let media_type = media_type.into();
        self.declared_media_type = (!media_type.trim().is_empty()).then_some(media_type);
        self
    }

    pub fn scheme(&self) -> Scheme {
        match self.url.scheme() {
            "file" => Scheme::File,
            "content" => Scheme::Content,
            other => Scheme::Other(other.to_string()),
        }
    }

    /// Path component (still percent-encoded)
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Path with percent-escapes decoded, as the OS reports it to apps.
    /// Falls back to the raw path when the escapes are not valid UTF-8.
    pub fn decoded_path(&self) -> Cow<'_, str> {
        urlencoding::decode(self.url.path()).unwrap_or(Cow::Borrowed(self.url.path()))
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn declared_media_type(&self) -> Option<&str> {
        self.declared_media_type.as_deref()
    }

    /// Decoded local path for `file://` references
    pub fn to_file_path(&self) -> Option<PathBuf> {
        match self.scheme() {
            Scheme::File => self.url.to_file_path().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

impl std::str::FromStr for ResourceReference {
    type Err = HandoffError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_or_path(s)
    }
}
