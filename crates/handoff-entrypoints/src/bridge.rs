//! Process-wide bridge between a platform shim and the handoff core
//!
//! The shims speak strings: locators, media types and JSON-encoded channel
//! messages. [`Bridge`] turns them into core types, and keeps the outgoing
//! notification queue that the platform side drains into its own channel.

use gpx_handoff::{
    GpxHandoff, HandoffConfig, Intake, MethodCall, MethodResponse, NotificationQueue,
    ResourceReference, ResourceResolver,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;

static BRIDGE: OnceCell<Bridge> = OnceCell::new();

pub struct Bridge {
    handoff: GpxHandoff,
    notifications: NotificationQueue,
}

impl Bridge {
    pub fn new(config: HandoffConfig, resolver: Arc<dyn ResourceResolver>) -> Self {
        Self {
            handoff: GpxHandoff::new(config, resolver),
            notifications: NotificationQueue::new(),
        }
    }

    /// Install the process-wide bridge. The first installation wins; later calls
    /// return the existing one.
    pub fn install(bridge: Bridge) -> &'static Bridge {
        let mut fresh = false;
        let installed = BRIDGE.get_or_init(|| {
            fresh = true;
            bridge
        });
        if fresh {
            tracing::info!(
                "GPX handoff bridge installed on {}",
                installed.handoff.channel_name()
            );
        } else {
            tracing::warn!("GPX handoff bridge already installed; keeping the first one");
        }
        installed
    }

    pub fn global() -> Option<&'static Bridge> {
        BRIDGE.get()
    }

    pub fn handoff(&self) -> &GpxHandoff {
        &self.handoff
    }

    /// Start delivering push notifications to the queue
    pub fn attach_channel(&self) {
        self.handoff
            .attach_channel(Box::new(self.notifications.clone()));
    }

    /// Launch / launch-options path
    pub fn on_launch_uri(&self, uri: Option<&str>, media_type: Option<&str>) -> Intake {
        match uri.map(|uri| reference(uri, media_type)) {
            None => self.handoff.on_launch(None),
            Some(Some(reference)) => self.handoff.on_launch(Some(reference)),
            Some(None) => Intake::Rejected,
        }
    }

    /// Already-running path
    pub fn on_open_uri(&self, uri: &str, media_type: Option<&str>) -> Intake {
        match reference(uri, media_type) {
            Some(reference) => self.handoff.on_resource_opened(reference),
            None => Intake::Rejected,
        }
    }

    /// Handle a JSON-encoded [`MethodCall`], returning a JSON-encoded [`MethodResponse`]
    pub fn handle_call_json(&self, json: &str) -> String {
        let response = match MethodCall::from_json(json) {
            Ok(call) => self.handoff.handle_call(&call),
            Err(err) => {
                tracing::warn!("Undecodable channel call: {}", err);
                MethodResponse::NotImplemented
            }
        };
        response
            .to_json()
            .unwrap_or_else(|_| r#"{"status":"not_implemented"}"#.to_string())
    }

    /// Oldest queued notification for the consumer, JSON-encoded
    pub fn next_notification_json(&self) -> Option<String> {
        let call = self.notifications.pop()?;
        match call.to_json() {
            Ok(json) => Some(json),
            Err(err) => {
                tracing::warn!("Dropping unencodable notification: {}", err);
                None
            }
        }
    }
}

fn reference(uri: &str, media_type: Option<&str>) -> Option<ResourceReference> {
    match ResourceReference::parse(uri) {
        Ok(reference) => Some(match media_type {
            Some(media_type) => reference.with_media_type(media_type),
            None => reference,
        }),
        Err(err) => {
            tracing::warn!("{}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpx_handoff::{LocalResolver, Platform};
    use std::io::Write;

    fn bridge(platform: Platform) -> Bridge {
        Bridge::new(
            HandoffConfig::for_platform(platform),
            Arc::new(LocalResolver::new()),
        )
    }

    fn gpx_file(content: &str) -> (tempfile::NamedTempFile, String) {
        let mut file = tempfile::Builder::new().suffix(".gpx").tempfile().unwrap();
        write!(file, "{content}").unwrap();
        let uri = ResourceReference::from_path(file.path())
            .unwrap()
            .to_string();
        (file, uri)
    }

    #[test]
    fn test_launch_then_pull_json() {
        let (_file, uri) = gpx_file("<gpx>launch</gpx>");
        let bridge = bridge(Platform::Apple);
        assert_eq!(bridge.on_launch_uri(Some(&uri), None), Intake::Held);

        let call = r#"{"method":"getInitialGpxContent"}"#;
        assert_eq!(
            bridge.handle_call_json(call),
            r#"{"status":"success","result":"<gpx>launch</gpx>"}"#
        );
        assert_eq!(
            bridge.handle_call_json(call),
            r#"{"status":"success","result":null}"#
        );
    }

    #[test]
    fn test_open_while_attached_queues_notification() {
        let (_file, uri) = gpx_file("<gpx>open</gpx>");
        let bridge = bridge(Platform::Android);
        bridge.attach_channel();

        assert_eq!(bridge.on_open_uri(&uri, None), Intake::Pushed);
        assert_eq!(
            bridge.next_notification_json().as_deref(),
            Some(r#"{"method":"onGpxFileReceived","arguments":"<gpx>open</gpx>"}"#)
        );
        assert_eq!(bridge.next_notification_json(), None);
    }

    #[test]
    fn test_bad_input() {
        let bridge = bridge(Platform::Android);
        assert_eq!(bridge.on_open_uri("not a uri", None), Intake::Rejected);
        assert_eq!(bridge.on_launch_uri(None, None), Intake::Ignored);
        assert_eq!(
            bridge.handle_call_json("{"),
            r#"{"status":"not_implemented"}"#
        );
        assert_eq!(
            bridge.handle_call_json(r#"{"method":"deleteGpx"}"#),
            r#"{"status":"not_implemented"}"#
        );
    }
}
