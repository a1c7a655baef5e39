//! JNI exports for the Android activity.
//!
//! The activity cannot hand Rust a `content://` stream directly, so it opens the
//! resource with `ContentResolver.openFileDescriptor(uri, "r")`, detaches the
//! descriptor and passes it along with the locator and `ContentResolver.getType`.
//! Rust owns the descriptor from then on; it is read at most once and closed when
//! the reference is consumed, rejected or superseded. A negative descriptor means
//! the activity could not open the resource.
//!
//! Java side (`com.example.brevet_map.GpxHandoffBridge`):
//!
//! ```java
//! static native void nativeInit(String channel);
//! static native boolean nativeOnCreate(String uri, String mimeType, int fd);
//! static native boolean nativeOnNewIntent(String uri, String mimeType, int fd);
//! static native void nativeAttachChannel();
//! static native String nativeHandleCall(String callJson);
//! static native String nativeNextNotification();
//! ```

use crate::bridge::Bridge;
use crate::intent::{IntentKind, handle_intent};
use gpx_handoff::{DescriptorResolver, HandoffConfig, Platform};
use jni::JNIEnv;
use jni::objects::{JClass, JString};
use jni::sys::{JNI_FALSE, JNI_TRUE, jboolean, jint, jstring};
use once_cell::sync::Lazy;
use std::os::fd::{FromRawFd, OwnedFd};
use std::sync::Arc;

static DESCRIPTORS: Lazy<Arc<DescriptorResolver>> =
    Lazy::new(|| Arc::new(DescriptorResolver::new()));

fn read_string(env: &mut JNIEnv, s: &JString) -> Option<String> {
    if s.is_null() {
        return None;
    }
    match env.get_string(s) {
        Ok(java_str) => Some(java_str.into()),
        Err(err) => {
            log::warn!("Failed to read Java string: {:?}", err);
            None
        }
    }
}

fn new_string(env: &mut JNIEnv, s: Option<String>) -> jstring {
    let Some(s) = s else {
        return std::ptr::null_mut();
    };
    match env.new_string(s) {
        Ok(java_str) => java_str.into_raw(),
        Err(err) => {
            log::warn!("Failed to create Java string: {:?}", err);
            std::ptr::null_mut()
        }
    }
}

fn to_jboolean(value: bool) -> jboolean {
    if value { JNI_TRUE } else { JNI_FALSE }
}

/// Take ownership of the activity's descriptor; `None` for a negative one
fn own_descriptor(fd: jint) -> Option<OwnedFd> {
    // SAFETY: the activity detached this descriptor and no longer uses it
    (fd >= 0).then(|| unsafe { OwnedFd::from_raw_fd(fd) })
}

fn bridge() -> Option<&'static Bridge> {
    let bridge = Bridge::global();
    if bridge.is_none() {
        log::warn!("nativeInit has not been called");
    }
    bridge
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_example_brevet_1map_GpxHandoffBridge_nativeInit<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    channel: JString<'local>,
) {
    crate::logging::setup_logging();
    crate::log_version_info();

    let mut config = HandoffConfig::for_platform(Platform::Android);
    if let Some(channel) = read_string(&mut env, &channel) {
        config = config.with_channel_name(channel);
    }
    Bridge::install(Bridge::new(config, DESCRIPTORS.clone()));
}

fn on_intent(
    env: &mut JNIEnv,
    kind: IntentKind,
    uri: &JString,
    media_type: &JString,
    fd: jint,
) -> jboolean {
    let fd = own_descriptor(fd);
    let uri = read_string(env, uri);
    let media_type = read_string(env, media_type);
    to_jboolean(handle_intent(
        bridge(),
        &DESCRIPTORS,
        kind,
        uri.as_deref(),
        media_type.as_deref(),
        fd,
    ))
}

/// `onCreate`: the intent that started the activity
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_example_brevet_1map_GpxHandoffBridge_nativeOnCreate<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    uri: JString<'local>,
    media_type: JString<'local>,
    fd: jint,
) -> jboolean {
    on_intent(&mut env, IntentKind::Create, &uri, &media_type, fd)
}

/// `onNewIntent`: a view request reached the running activity
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_example_brevet_1map_GpxHandoffBridge_nativeOnNewIntent<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    uri: JString<'local>,
    media_type: JString<'local>,
    fd: jint,
) -> jboolean {
    on_intent(&mut env, IntentKind::NewIntent, &uri, &media_type, fd)
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_example_brevet_1map_GpxHandoffBridge_nativeAttachChannel<
    'local,
>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
) {
    if let Some(bridge) = bridge() {
        bridge.attach_channel();
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_example_brevet_1map_GpxHandoffBridge_nativeHandleCall<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    call_json: JString<'local>,
) -> jstring {
    let Some(bridge) = bridge() else {
        return std::ptr::null_mut();
    };
    let call_json = read_string(&mut env, &call_json).unwrap_or_default();
    let response = bridge.handle_call_json(&call_json);
    new_string(&mut env, Some(response))
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_example_brevet_1map_GpxHandoffBridge_nativeNextNotification<
    'local,
>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jstring {
    let notification = bridge().and_then(Bridge::next_notification_json);
    new_string(&mut env, notification)
}
