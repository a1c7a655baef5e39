//! GPX Handoff - Core Logic for OS-Delivered GPX Files
//!
//! This library is the glue between an operating system "view this GPX file" request
//! (file manager, mail attachment, share sheet) and the application that consumes the
//! file. It never looks inside the GPX document: it decides whether a resource looks
//! like GPX, reads it as text, and hands it over exactly once.
//!
//! # Architecture
//!
//! - **[`ResourceReference`]**: Immutable locator supplied by the OS
//! - **[`IntakeFilter`]**: Lenient accept/reject heuristic for incoming references
//! - **[`ResourceResolver`]**: Platform seam for media type lookup and opening resources
//! - **[`ContentLoader`]**: Reads an accepted resource into a [`GpxPayload`]
//! - **[`PendingSlot`]**: At-most-one holding area between arrival and the consumer's pull
//! - **[`GpxHandoff`]**: The state machine tying it all together behind the two-message
//!   delivery channel (`getInitialGpxContent` / `onGpxFileReceived`)

mod channel;
mod config;
mod handoff;
mod intake;
mod loader;
mod reference;
mod resolver;
mod slot;

// Public API exports
pub use channel::{
    ChannelSink, DEFAULT_CHANNEL_NAME, GET_INITIAL_GPX_CONTENT, MethodCall, MethodResponse,
    NotificationQueue, ON_GPX_FILE_RECEIVED, READ_ERROR,
};
pub use config::{HandoffConfig, HoldStrategy, IntakePolicy, Platform};
pub use handoff::{GpxHandoff, Intake, LaunchEvent};
pub use intake::{AcceptReason, IntakeFilter, Verdict};
pub use loader::{ContentLoader, GpxPayload};
pub use reference::{ResourceReference, Scheme};
#[cfg(unix)]
pub use resolver::DescriptorResolver;
pub use resolver::{LocalResolver, ResourceResolver};
pub use slot::{Pending, PendingSlot, SlotState};

/// Error types for the handoff core
#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    #[error("Invalid resource reference '{input}': {source}")]
    InvalidReference {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Could not read {reference}: {source}")]
    ResourceUnavailable {
        reference: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Delivery channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, HandoffError>;
