//! Delivery channel - the two-message protocol towards the consuming application
//!
//! - `getInitialGpxContent()` (consumer → shim, request/response): the pending text,
//!   `null` when nothing is pending, or a `READ_ERROR` when it could not be read.
//! - `onGpxFileReceived(content)` (shim → consumer, one-way): a file arrived while
//!   the consumer was already listening. Nothing is sent back.
//!
//! Messages are serde types so the C ABI and JNI layers can pass them as JSON.

use crate::{HandoffError, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Channel name shared by both shims and the consumer
pub const DEFAULT_CHANNEL_NAME: &str = "com.example.brevet_map/gpx";

pub const GET_INITIAL_GPX_CONTENT: &str = "getInitialGpxContent";
pub const ON_GPX_FILE_RECEIVED: &str = "onGpxFileReceived";

/// Error code of a failed pull
pub const READ_ERROR: &str = "READ_ERROR";

/// A method invocation on the channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Option<String>) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    pub fn get_initial_gpx_content() -> Self {
        Self::new(GET_INITIAL_GPX_CONTENT, None)
    }

    pub fn gpx_file_received(content: String) -> Self {
        Self::new(ON_GPX_FILE_RECEIVED, Some(content))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Reply to a request/response call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResponse {
    Success { result: Option<String> },
    Error { code: String, message: String },
    NotImplemented,
}

impl MethodResponse {
    pub fn success(result: Option<String>) -> Self {
        Self::Success { result }
    }

    pub fn read_error(message: impl Into<String>) -> Self {
        Self::Error {
            code: READ_ERROR.to_string(),
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Outgoing side of the channel, used for fire-and-forget notifications
pub trait ChannelSink: Send {
    /// Queue `call` for the consumer. Must not wait for the consumer.
    fn invoke(&self, call: MethodCall) -> Result<()>;
}

impl ChannelSink for tokio::sync::mpsc::UnboundedSender<MethodCall> {
    fn invoke(&self, call: MethodCall) -> Result<()> {
        self.send(call).map_err(|_| HandoffError::ChannelClosed)
    }
}

/// Shared queue of notifications, drained by the platform side.
///
/// Used where the consumer lives on the other side of an FFI boundary and
/// polls for messages instead of receiving them on a Rust channel.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    queue: Arc<Mutex<VecDeque<MethodCall>>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<MethodCall>> {
        self.queue.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Notification queue mutex poisoned; recovering");
            poisoned.into_inner()
        })
    }

    /// Oldest queued notification, if any
    pub fn pop(&self) -> Option<MethodCall> {
        self.lock().pop_front()
    }

    /// Take every queued notification
    pub fn drain(&self) -> Vec<MethodCall> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl ChannelSink for NotificationQueue {
    fn invoke(&self, call: MethodCall) -> Result<()> {
        self.lock().push_back(call);
        Ok(())
    }
}
