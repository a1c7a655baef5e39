//! Handoff configuration
//!
//! The two mobile shims share the same machinery but differ in how lenient the
//! intake is and in when the resource is read. [`HandoffConfig::for_platform`]
//! produces the matching setup for each.

use crate::channel::DEFAULT_CHANNEL_NAME;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform flavour of the shim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Apple,
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "apple" | "ios" => Ok(Self::Apple),
            other => Err(format!("unknown platform '{other}' (expected android or apple)")),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Android => f.write_str("android"),
            Self::Apple => f.write_str("apple"),
        }
    }
}

/// Which acceptance heuristic the intake filter applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakePolicy {
    /// `file` by extension, `content` by media type then by name, everything else rejected
    ContentAware,
    /// Any scheme, accepted on a `gpx` extension or a `gpx` substring anywhere in the locator
    NameHint,
}

/// What the pending slot keeps between arrival and the consumer's pull
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldStrategy {
    /// Keep the reference and read when the consumer asks
    Reference,
    /// Read on arrival and keep the text
    Content,
}

/// Configuration for a [`crate::GpxHandoff`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandoffConfig {
    /// Name shared by the shim and the consuming application.
    /// Default: `com.example.brevet_map/gpx`
    pub channel_name: String,
    pub intake_policy: IntakePolicy,
    pub hold: HoldStrategy,
}

impl HandoffConfig {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Android => Self {
                channel_name: DEFAULT_CHANNEL_NAME.to_string(),
                intake_policy: IntakePolicy::ContentAware,
                hold: HoldStrategy::Reference,
            },
            Platform::Apple => Self {
                channel_name: DEFAULT_CHANNEL_NAME.to_string(),
                intake_policy: IntakePolicy::NameHint,
                hold: HoldStrategy::Content,
            },
        }
    }

    pub fn with_channel_name(mut self, channel_name: impl Into<String>) -> Self {
        self.channel_name = channel_name.into();
        self
    }
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self::for_platform(Platform::Android)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_defaults() {
        let android = HandoffConfig::for_platform(Platform::Android);
        assert_eq!(android.intake_policy, IntakePolicy::ContentAware);
        assert_eq!(android.hold, HoldStrategy::Reference);

        let apple = HandoffConfig::for_platform(Platform::Apple);
        assert_eq!(apple.intake_policy, IntakePolicy::NameHint);
        assert_eq!(apple.hold, HoldStrategy::Content);
        assert_eq!(apple.channel_name, DEFAULT_CHANNEL_NAME);
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!("Android".parse::<Platform>(), Ok(Platform::Android));
        assert_eq!("ios".parse::<Platform>(), Ok(Platform::Apple));
        assert!("symbian".parse::<Platform>().is_err());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: HandoffConfig =
            serde_json::from_str(r#"{"channel_name":"demo/gpx","hold":"content"}"#).unwrap();
        assert_eq!(config.channel_name, "demo/gpx");
        assert_eq!(config.hold, HoldStrategy::Content);
        assert_eq!(config.intake_policy, IntakePolicy::ContentAware);
    }
}
