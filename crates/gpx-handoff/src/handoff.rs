//! GpxHandoff - store-and-forward between OS launch events and the consumer
//!
//! Every entry point (launch, resource opened, channel call, channel attach)
//! runs under one mutex, so at most one handler touches the slot at a time.
//! Reads happen inline while the lock is held.
//!
//! Delivery paths:
//!
//! - **Launch** (cold start, launch options): the accepted resource is parked in
//!   the slot, as a reference or as read content depending on [`HoldStrategy`].
//! - **Pull** (`getInitialGpxContent`): takes from the slot. A failed read is
//!   reported as `READ_ERROR` and the slot is cleared anyway.
//! - **Push** (resource opened while running): read immediately and sent as
//!   `onGpxFileReceived`. A failed read is logged and dropped, see
//!   [`drop_unreadable_push`].

use crate::channel::{ChannelSink, GET_INITIAL_GPX_CONTENT, MethodCall, MethodResponse};
use crate::config::{HandoffConfig, HoldStrategy};
use crate::intake::{IntakeFilter, Verdict};
use crate::loader::ContentLoader;
use crate::reference::ResourceReference;
use crate::resolver::ResourceResolver;
use crate::slot::{Pending, PendingSlot, SlotState};
use crate::{HandoffError, Result};
use std::sync::{Arc, Mutex, MutexGuard};

/// Platform lifecycle events, funneled into the same intake logic
#[derive(Debug, Clone)]
pub enum LaunchEvent {
    /// Process start (or launch options), with the view request that caused it, if any
    Launched(Option<ResourceReference>),
    /// A view request delivered to the running process
    Opened(ResourceReference),
}

/// What happened to an incoming reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intake {
    /// There was no resource
    Ignored,
    /// Not GPX-like; nothing changed
    Rejected,
    /// Parked in the pending slot for the next pull
    Held,
    /// Sent to the listening consumer
    Pushed,
    /// Accepted but unreadable on the push path; logged and dropped
    Dropped,
}

impl Intake {
    /// Whether the request was taken on (the answer to an `open url` callback)
    pub fn handled(&self) -> bool {
        matches!(self, Intake::Held | Intake::Pushed)
    }
}

struct Inner {
    slot: PendingSlot,
    channel: Option<Box<dyn ChannelSink>>,
}

/// The handoff state machine
pub struct GpxHandoff {
    config: HandoffConfig,
    filter: IntakeFilter,
    loader: ContentLoader,
    resolver: Arc<dyn ResourceResolver>,
    inner: Mutex<Inner>,
}

impl GpxHandoff {
    pub fn new(config: HandoffConfig, resolver: Arc<dyn ResourceResolver>) -> Self {
        Self {
            filter: IntakeFilter::new(config.intake_policy),
            loader: ContentLoader::new(resolver.clone()),
            resolver,
            config,
            inner: Mutex::new(Inner {
                slot: PendingSlot::new(),
                channel: None,
            }),
        }
    }

    pub fn config(&self) -> &HandoffConfig {
        &self.config
    }

    pub fn channel_name(&self) -> &str {
        &self.config.channel_name
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Handoff mutex poisoned; recovering");
            poisoned.into_inner()
        })
    }

    /// Current slot state, for diagnostics
    pub fn slot_state(&self) -> SlotState {
        self.lock().slot.state().clone()
    }

    pub fn is_channel_attached(&self) -> bool {
        self.lock().channel.is_some()
    }

    /// The consumer started listening; later arrivals are pushed to `sink`
    pub fn attach_channel(&self, sink: Box<dyn ChannelSink>) {
        let mut inner = self.lock();
        if inner.channel.replace(sink).is_some() {
            tracing::debug!("Replaced channel sink on {}", self.config.channel_name);
        } else {
            tracing::info!("Consumer attached to {}", self.config.channel_name);
        }
    }

    pub fn detach_channel(&self) {
        if self.lock().channel.take().is_some() {
            tracing::info!("Consumer detached from {}", self.config.channel_name);
        }
    }

    pub fn dispatch(&self, event: LaunchEvent) -> Intake {
        match event {
            LaunchEvent::Launched(reference) => self.on_launch(reference),
            LaunchEvent::Opened(reference) => self.on_resource_opened(reference),
        }
    }

    /// Cold start (or launch options) with an optional view request
    pub fn on_launch(&self, reference: Option<ResourceReference>) -> Intake {
        let Some(reference) = reference else {
            tracing::debug!("Launched without a resource");
            return Intake::Ignored;
        };

        let mut inner = self.lock();
        if !self.accepts(&inner, &reference) {
            return Intake::Rejected;
        }
        self.park(&mut inner, reference);
        Intake::Held
    }

    /// A view request reached the already-running process
    pub fn on_resource_opened(&self, reference: ResourceReference) -> Intake {
        let mut inner = self.lock();
        if !self.accepts(&inner, &reference) {
            return Intake::Rejected;
        }
        if inner.channel.is_none() {
            // Nobody listening yet; behave like a launch so the first pull gets it
            tracing::debug!(
                "No consumer on {}; holding {}",
                self.config.channel_name,
                reference
            );
            self.park(&mut inner, reference);
            return Intake::Held;
        }

        let payload = match self.loader.load(&reference) {
            Ok(payload) => payload,
            Err(err) => {
                self.resolver.release(&reference);
                drop_unreadable_push(&err);
                return Intake::Dropped;
            }
        };
        self.resolver.release(&reference);

        let size = payload.len();
        let sent = inner.channel.as_ref().map(|channel| {
            channel.invoke(MethodCall::gpx_file_received(
                payload.as_str().to_string(),
            ))
        });
        match sent {
            Some(Ok(())) => {
                if let Some(displaced) = inner.slot.mark_delivered() {
                    self.discard(&inner, displaced);
                }
                tracing::info!("Pushed {} bytes from {}", size, reference);
                Intake::Pushed
            }
            _ => {
                tracing::warn!(
                    "Consumer on {} went away; holding {} for the next pull",
                    self.config.channel_name,
                    reference
                );
                inner.channel = None;
                self.hold(&mut inner, Pending::Content(payload));
                Intake::Held
            }
        }
    }

    /// The pull: hand out whatever is pending, at most once.
    ///
    /// Returns `Ok(None)` when nothing is pending. A failed read is returned as
    /// an error and the slot stays cleared.
    pub fn get_initial_gpx_content(&self) -> Result<Option<String>> {
        let mut inner = self.lock();
        let Some(pending) = inner.slot.take() else {
            return Ok(None);
        };

        match pending {
            Pending::Content(payload) => {
                tracing::info!("Delivered {} pending bytes", payload.len());
                Ok(Some(payload.into_string()))
            }
            Pending::Reference(reference) => {
                let result = self.loader.load(&reference);
                self.resolver.release(&reference);
                match result {
                    Ok(payload) => {
                        tracing::info!("Delivered {} bytes from {}", payload.len(), reference);
                        Ok(Some(payload.into_string()))
                    }
                    Err(err) => {
                        tracing::warn!("Pending resource unreadable: {}", err);
                        Err(err)
                    }
                }
            }
            Pending::Unreadable { reference, reason } => {
                Err(HandoffError::ResourceUnavailable {
                    reference: reference.to_string(),
                    source: std::io::Error::other(reason),
                })
            }
        }
    }

    /// Dispatch a channel call from the consumer
    pub fn handle_call(&self, call: &MethodCall) -> MethodResponse {
        match call.method.as_str() {
            GET_INITIAL_GPX_CONTENT => match self.get_initial_gpx_content() {
                Ok(content) => MethodResponse::success(content),
                Err(err) => MethodResponse::read_error(err.to_string()),
            },
            other => {
                tracing::debug!("{} does not implement '{}'", self.config.channel_name, other);
                MethodResponse::NotImplemented
            }
        }
    }

    fn accepts(&self, inner: &Inner, reference: &ResourceReference) -> bool {
        let resolved;
        let media_type = match reference.declared_media_type() {
            Some(declared) => Some(declared),
            None => {
                resolved = self.resolver.media_type(reference);
                resolved.as_deref()
            }
        };

        match self.filter.evaluate(reference, media_type) {
            Verdict::Accept(reason) => {
                tracing::debug!("Accepted {} ({:?})", reference, reason);
                true
            }
            Verdict::Reject => {
                tracing::debug!("Ignoring {} (media type {:?})", reference, media_type);
                self.release_unless_parked(inner, reference);
                false
            }
        }
    }

    /// Put an accepted reference in the slot according to the hold strategy
    fn park(&self, inner: &mut Inner, reference: ResourceReference) {
        let pending = match self.config.hold {
            HoldStrategy::Reference => Pending::Reference(reference),
            HoldStrategy::Content => self.read_for_slot(reference),
        };
        self.hold(inner, pending);
    }

    /// Eager read for the slot; a failure is kept so the pull can report it
    fn read_for_slot(&self, reference: ResourceReference) -> Pending {
        let result = self.loader.load(&reference);
        self.resolver.release(&reference);
        match result {
            Ok(payload) => Pending::Content(payload),
            Err(err) => {
                tracing::warn!("Holding read failure for the next pull: {}", err);
                let reason = match &err {
                    HandoffError::ResourceUnavailable { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                Pending::Unreadable { reference, reason }
            }
        }
    }

    fn hold(&self, inner: &mut Inner, pending: Pending) {
        match &pending {
            Pending::Reference(reference) => tracing::info!("Holding {}", reference),
            Pending::Content(payload) => tracing::info!("Holding {} bytes", payload.len()),
            Pending::Unreadable { reference, .. } => {
                tracing::info!("Holding unreadable {}", reference)
            }
        }
        if let Some(displaced) = inner.slot.hold(pending) {
            self.discard(inner, displaced);
        }
    }

    fn discard(&self, inner: &Inner, displaced: Pending) {
        tracing::debug!("Superseded pending item");
        if let Pending::Reference(reference) = displaced {
            self.release_unless_parked(inner, &reference);
        }
    }

    /// Resolver handles are keyed by locator: a reference still parked under the
    /// same locator owns the handle, so it must stay open for the pull.
    fn release_unless_parked(&self, inner: &Inner, reference: &ResourceReference) {
        let parked = matches!(
            inner.slot.state(),
            SlotState::Holding(Pending::Reference(held)) if held.as_str() == reference.as_str()
        );
        if parked {
            tracing::debug!("Keeping handle for parked {}", reference);
        } else {
            self.resolver.release(reference);
        }
    }
}

/// Push-path failure policy: log and drop.
///
/// A resource opened while the consumer is running has no synchronous caller to
/// report to, so a read failure ends here. The slot is left as it was.
pub(crate) fn drop_unreadable_push(err: &HandoffError) {
    tracing::warn!("Dropping pushed resource: {}", err);
}
