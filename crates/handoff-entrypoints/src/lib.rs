//! Platform entry points for the GPX handoff core
//!
//! The mobile shims stay as thin as the platform allows and forward every event
//! to a process-wide [`Bridge`]:
//!
//! - **iOS**: the app delegate calls the C ABI in [`ffi`] from
//!   `didFinishLaunchingWithOptions`, `open url` and the method channel handler.
//! - **Android**: the activity calls the JNI exports in `android` from
//!   `onCreate`, `onNewIntent` and the method channel handler, handing over file
//!   descriptors opened through its `ContentResolver`.
//! - **Desktop**: the host binary uses [`Bridge`] and the helpers below directly.
//!
//! Notifications for the consumer are queued and drained by the platform side,
//! which forwards them on its own method channel.

pub mod bridge;
pub mod cli;
pub mod ffi;
pub mod logging;

#[cfg(unix)]
pub mod intent;

#[cfg(target_os = "android")]
pub mod android;

mod metadata;
pub use metadata::{log_version_info, short_version_info};

// Re-export commonly used types
pub use bridge::Bridge;
pub use cli::{get_env, parse_args};
pub use gpx_handoff;
pub use logging::setup_logging;
