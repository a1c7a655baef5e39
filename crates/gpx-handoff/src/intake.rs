//! Intake filter - decides whether an incoming reference looks like GPX
//!
//! This is a best-effort sniff on names and media types, never a look at the
//! content. False positives (a `gpx-notes.txt` behind a content provider) and
//! false negatives (a GPX file with a generic name and media type) are a known
//! limitation; the consumer is the one validating the document.

use crate::config::IntakePolicy;
use crate::reference::{ResourceReference, Scheme};

/// Media types that mark a content-scheme resource as GPX
const GPX_MEDIA_TYPES: [&str; 2] = ["application/gpx+xml", "text/xml"];

/// Why a reference was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptReason {
    /// Path ends in `.gpx`
    Extension,
    /// Declared or resolved media type is a GPX/XML type
    MediaType,
    /// Locator contains `gpx` somewhere
    NameHint,
}

/// Outcome of the intake filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept(AcceptReason),
    Reject,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accept(_))
    }
}

/// Acceptance heuristic for inbound resource references
#[derive(Debug, Clone, Copy)]
pub struct IntakeFilter {
    policy: IntakePolicy,
}

impl IntakeFilter {
    pub fn new(policy: IntakePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> IntakePolicy {
        self.policy
    }

    /// Evaluate a reference.
    ///
    /// `media_type` is whatever is known about the resource's type (declared by
    /// the OS or looked up through the resolver); it only matters for
    /// content-scheme references under [`IntakePolicy::ContentAware`].
    pub fn evaluate(&self, reference: &ResourceReference, media_type: Option<&str>) -> Verdict {
        match self.policy {
            IntakePolicy::ContentAware => match reference.scheme() {
                Scheme::File => {
                    if has_gpx_extension(&reference.decoded_path()) {
                        Verdict::Accept(AcceptReason::Extension)
                    } else {
                        Verdict::Reject
                    }
                }
                Scheme::Content => {
                    if media_type.is_some_and(is_gpx_media_type) {
                        Verdict::Accept(AcceptReason::MediaType)
                    } else if contains_gpx(reference.as_str()) {
                        Verdict::Accept(AcceptReason::NameHint)
                    } else {
                        Verdict::Reject
                    }
                }
                Scheme::Other(_) => Verdict::Reject,
            },
            IntakePolicy::NameHint => {
                if has_gpx_extension(&reference.decoded_path()) {
                    Verdict::Accept(AcceptReason::Extension)
                } else if contains_gpx(reference.as_str()) {
                    Verdict::Accept(AcceptReason::NameHint)
                } else {
                    Verdict::Reject
                }
            }
        }
    }

    /// Evaluate an optional reference; no resource at all is a rejection
    pub fn evaluate_optional(
        &self,
        reference: Option<&ResourceReference>,
        media_type: Option<&str>,
    ) -> Verdict {
        reference.map_or(Verdict::Reject, |r| self.evaluate(r, media_type))
    }
}

fn has_gpx_extension(path: &str) -> bool {
    path.to_ascii_lowercase().ends_with(".gpx")
}

fn contains_gpx(locator: &str) -> bool {
    locator.to_ascii_lowercase().contains("gpx")
}

/// Compare on the media type essence: parameters and case are ignored
fn is_gpx_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    GPX_MEDIA_TYPES
        .iter()
        .any(|known| essence.eq_ignore_ascii_case(known))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(s: &str) -> ResourceReference {
        ResourceReference::parse(s).unwrap()
    }

    fn content_aware() -> IntakeFilter {
        IntakeFilter::new(IntakePolicy::ContentAware)
    }

    #[test]
    fn test_file_extension_any_case() {
        let filter = content_aware();
        for locator in [
            "file:///sdcard/route.gpx",
            "file:///sdcard/route.GPX",
            "file:///sdcard/Download/Brevet%20600.Gpx",
        ] {
            assert_eq!(
                filter.evaluate(&reference(locator), None),
                Verdict::Accept(AcceptReason::Extension),
                "{locator}"
            );
        }
    }

    #[test]
    fn test_escaped_extension_is_decoded() {
        let locator = "file:///sdcard/route%2Egpx";
        assert_eq!(
            content_aware().evaluate(&reference(locator), None),
            Verdict::Accept(AcceptReason::Extension)
        );
        assert_eq!(
            IntakeFilter::new(IntakePolicy::NameHint).evaluate(&reference(locator), None),
            Verdict::Accept(AcceptReason::Extension)
        );
    }

    #[test]
    fn test_file_other_extensions_rejected() {
        let filter = content_aware();
        for locator in [
            "file:///sdcard/route.kml",
            "file:///sdcard/route.gpx.bak",
            "file:///sdcard/gpx/route.xml",
            "file:///sdcard/routegpx",
        ] {
            assert_eq!(
                filter.evaluate(&reference(locator), Some("application/gpx+xml")),
                Verdict::Reject,
                "{locator}"
            );
        }
    }

    #[test]
    fn test_content_media_type_wins_over_name() {
        let filter = content_aware();
        let opaque = reference("content://com.android.providers.downloads/document/42");
        for media_type in ["application/gpx+xml", "text/xml", "Text/XML; charset=utf-8"] {
            assert_eq!(
                filter.evaluate(&opaque, Some(media_type)),
                Verdict::Accept(AcceptReason::MediaType),
                "{media_type}"
            );
        }
    }

    #[test]
    fn test_content_falls_back_to_name_hint() {
        let filter = content_aware();
        assert_eq!(
            filter.evaluate(
                &reference("content://mail/attachments/Route.GPX"),
                Some("application/octet-stream")
            ),
            Verdict::Accept(AcceptReason::NameHint)
        );
        assert_eq!(
            filter.evaluate(&reference("content://gpxfiles/12"), None),
            Verdict::Accept(AcceptReason::NameHint)
        );
        assert_eq!(
            filter.evaluate(&reference("content://provider/7"), Some("text/plain")),
            Verdict::Reject
        );
    }

    #[test]
    fn test_other_schemes_rejected() {
        let filter = content_aware();
        assert_eq!(
            filter.evaluate(
                &reference("https://example.com/route.gpx"),
                Some("application/gpx+xml")
            ),
            Verdict::Reject
        );
        assert_eq!(filter.evaluate_optional(None, None), Verdict::Reject);
    }

    #[test]
    fn test_name_hint_policy() {
        let filter = IntakeFilter::new(IntakePolicy::NameHint);
        assert_eq!(
            filter.evaluate(&reference("file:///private/var/mobile/Inbox/route.GPX"), None),
            Verdict::Accept(AcceptReason::Extension)
        );
        assert_eq!(
            filter.evaluate(&reference("https://example.com/export?format=gpx"), None),
            Verdict::Accept(AcceptReason::NameHint)
        );
        // Media types play no part here
        assert_eq!(
            filter.evaluate(&reference("file:///tmp/route.xml"), Some("text/xml")),
            Verdict::Reject
        );
    }
}
