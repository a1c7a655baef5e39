//! Android view intents, with the descriptor the activity opened for them.
//!
//! Unix-only so the ownership rules can be exercised off-device.

use crate::bridge::Bridge;
use gpx_handoff::{DescriptorResolver, ResourceReference};
use std::os::fd::OwnedFd;

/// Which activity callback delivered the intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    /// `onCreate`
    Create,
    /// `onNewIntent`
    NewIntent,
}

/// Forward an intent to `bridge`, returning whether it was handled.
///
/// `fd` is owned from here on. It is closed right away when there is no bridge
/// or no locator, otherwise it is registered with `descriptors` for `uri`.
pub fn handle_intent(
    bridge: Option<&Bridge>,
    descriptors: &DescriptorResolver,
    kind: IntentKind,
    uri: Option<&str>,
    media_type: Option<&str>,
    fd: Option<OwnedFd>,
) -> bool {
    let Some(bridge) = bridge else {
        if fd.is_some() {
            tracing::warn!("No bridge installed; closing descriptor for {:?}", uri);
        }
        return false;
    };
    let Some(uri) = uri else {
        return match kind {
            IntentKind::Create => bridge.on_launch_uri(None, None).handled(),
            IntentKind::NewIntent => false,
        };
    };

    if let Some(fd) = fd {
        match ResourceReference::parse(uri) {
            Ok(reference) => descriptors.register(&reference, media_type.map(String::from), fd),
            Err(err) => tracing::warn!("{}; closing descriptor", err),
        }
    }

    let intake = match kind {
        IntentKind::Create => bridge.on_launch_uri(Some(uri), media_type),
        IntentKind::NewIntent => bridge.on_open_uri(uri, media_type),
    };
    intake.handled()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpx_handoff::{HandoffConfig, Platform};
    use std::io::Write;
    use std::sync::Arc;

    const ROUTE: &str = "content://downloads/route.gpx";

    fn descriptor(content: &str) -> (tempfile::NamedTempFile, OwnedFd) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        let fd = OwnedFd::from(std::fs::File::open(file.path()).unwrap());
        (file, fd)
    }

    fn route() -> ResourceReference {
        ResourceReference::parse(ROUTE).unwrap()
    }

    #[test]
    fn test_descriptor_closed_without_bridge() {
        let descriptors = DescriptorResolver::new();
        let (_file, fd) = descriptor("<gpx/>");

        let handled = handle_intent(
            None,
            &descriptors,
            IntentKind::Create,
            Some(ROUTE),
            Some("application/gpx+xml"),
            Some(fd),
        );
        assert!(!handled);
        assert!(!descriptors.is_registered(&route()));
    }

    #[test]
    fn test_create_registers_and_holds() {
        let descriptors = Arc::new(DescriptorResolver::new());
        let bridge = Bridge::new(
            HandoffConfig::for_platform(Platform::Android),
            descriptors.clone(),
        );
        let (_file, fd) = descriptor("<gpx>route</gpx>");

        let handled = handle_intent(
            Some(&bridge),
            &descriptors,
            IntentKind::Create,
            Some(ROUTE),
            None,
            Some(fd),
        );
        assert!(handled);
        assert!(descriptors.is_registered(&route()));
        assert_eq!(
            bridge.handoff().get_initial_gpx_content().unwrap().as_deref(),
            Some("<gpx>route</gpx>")
        );
        assert!(!descriptors.is_registered(&route()));
    }

    #[test]
    fn test_intent_without_locator() {
        let descriptors = Arc::new(DescriptorResolver::new());
        let bridge = Bridge::new(
            HandoffConfig::for_platform(Platform::Android),
            descriptors.clone(),
        );
        for kind in [IntentKind::Create, IntentKind::NewIntent] {
            assert!(!handle_intent(Some(&bridge), &descriptors, kind, None, None, None));
        }
    }
}
