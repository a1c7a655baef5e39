//! C ABI used by the iOS app delegate.
//!
//! Strings cross the boundary as NUL-terminated UTF-8. Strings returned to the
//! caller are owned by Rust and must be released with [`gpx_handoff_string_free`].
//!
//! Expected call sequence from the delegate:
//!
//! 1. `gpx_handoff_init("apple", NULL)`
//! 2. `gpx_handoff_did_finish_launching(launchOptions[.url])`
//! 3. `gpx_handoff_attach_channel()` once the method channel is registered
//! 4. `gpx_handoff_handle_call(json)` from the method call handler
//! 5. `gpx_handoff_open_url(url)` from `application(_:open:options:)`, then
//!    `gpx_handoff_next_notification()` until it returns NULL

use crate::bridge::Bridge;
use gpx_handoff::{HandoffConfig, LocalResolver, Platform};
use std::ffi::{CStr, CString, c_char};
use std::sync::Arc;

/// Borrow a C string argument. NULL and invalid UTF-8 read as `None`.
///
/// # Safety
/// `ptr` must be NULL or point to a NUL-terminated string valid for `'a`.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    match unsafe { CStr::from_ptr(ptr) }.to_str() {
        Ok(s) => Some(s),
        Err(err) => {
            tracing::warn!("Ignoring non UTF-8 argument: {}", err);
            None
        }
    }
}

fn into_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c) => c.into_raw(),
        Err(err) => {
            tracing::warn!("Cannot pass string with interior NUL: {}", err);
            std::ptr::null_mut()
        }
    }
}

fn bridge() -> Option<&'static Bridge> {
    let bridge = Bridge::global();
    if bridge.is_none() {
        tracing::warn!("gpx_handoff_init has not been called");
    }
    bridge
}

/// Install the process-wide bridge.
///
/// `platform` is `"apple"` or `"android"` (NULL means apple), `channel` overrides
/// the channel name (NULL keeps the default). Returns false on an unknown platform.
///
/// # Safety
/// Both arguments must be NULL or valid NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gpx_handoff_init(
    platform: *const c_char,
    channel: *const c_char,
) -> bool {
    crate::logging::setup_logging();
    crate::log_version_info();

    let platform = match unsafe { str_arg(platform) }.map(str::parse::<Platform>) {
        None => Platform::Apple,
        Some(Ok(platform)) => platform,
        Some(Err(err)) => {
            tracing::error!("{}", err);
            return false;
        }
    };
    let mut config = HandoffConfig::for_platform(platform);
    if let Some(channel) = unsafe { str_arg(channel) } {
        config = config.with_channel_name(channel);
    }

    Bridge::install(Bridge::new(config, Arc::new(LocalResolver::new())));
    true
}

/// Cold start: `url` is the launch options URL, or NULL.
/// Returns true when it was taken on.
///
/// # Safety
/// `url` must be NULL or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gpx_handoff_did_finish_launching(url: *const c_char) -> bool {
    let url = unsafe { str_arg(url) };
    bridge().is_some_and(|bridge| bridge.on_launch_uri(url, None).handled())
}

/// `application(_:open:options:)`. Returns the value the delegate should return.
///
/// # Safety
/// `url` must be NULL or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gpx_handoff_open_url(url: *const c_char) -> bool {
    let Some(url) = (unsafe { str_arg(url) }) else {
        return false;
    };
    bridge().is_some_and(|bridge| bridge.on_open_uri(url, None).handled())
}

/// The consumer's method channel is ready; later arrivals are queued as notifications
#[unsafe(no_mangle)]
pub extern "C" fn gpx_handoff_attach_channel() {
    if let Some(bridge) = bridge() {
        bridge.attach_channel();
    }
}

/// Handle a JSON method call; returns a JSON response (free with
/// [`gpx_handoff_string_free`]) or NULL when the bridge is not initialised.
///
/// # Safety
/// `call_json` must be NULL or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gpx_handoff_handle_call(call_json: *const c_char) -> *mut c_char {
    let Some(bridge) = bridge() else {
        return std::ptr::null_mut();
    };
    let call_json = unsafe { str_arg(call_json) }.unwrap_or_default();
    into_c_string(bridge.handle_call_json(call_json))
}

/// Next queued notification as JSON, or NULL when there is none
#[unsafe(no_mangle)]
pub extern "C" fn gpx_handoff_next_notification() -> *mut c_char {
    bridge()
        .and_then(Bridge::next_notification_json)
        .map_or(std::ptr::null_mut(), into_c_string)
}

/// Release a string returned by this library.
///
/// # Safety
/// `s` must be NULL or a pointer previously returned by this library, freed once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gpx_handoff_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}
