use clap::Parser;
use gpx_handoff::{HandoffConfig, Platform, ResourceReference};
use handoff_entrypoints::{get_env, parse_args};
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable overriding the channel name
pub const CHANNEL_ENV: &str = "GPX_HANDOFF_CHANNEL";

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// GPX handoff host - plays the OS shim and the consuming app on the desktop
pub struct Settings {
    /// Platform behaviour to emulate (android: lazy read, content-aware intake;
    /// apple: eager read, name-based intake)
    #[clap(short, long, default_value = "android")]
    pub platform: Platform,

    /// Channel name shared with the consumer (default: $GPX_HANDOFF_CHANNEL or the built-in name)
    #[clap(short, long)]
    pub channel: Option<String>,

    /// Resource that cold-starts the app (locator or path)
    #[clap(short, long, value_name = "URI")]
    pub launch: Option<ResourceReference>,

    /// Resources opened while the app is running (locators or paths)
    #[clap(short, long, value_name = "URI")]
    pub open: Vec<ResourceReference>,

    /// Simulated content provider entries, as URI=PATH or URI=PATH;MEDIA_TYPE
    #[clap(long, value_name = "ENTRY")]
    pub content: Vec<ContentEntry>,
}

impl Settings {
    pub fn from_cli() -> Self {
        match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    pub fn handoff_config(&self) -> HandoffConfig {
        let config = HandoffConfig::for_platform(self.platform);
        match self.channel.clone().or_else(|| get_env(CHANNEL_ENV)) {
            Some(channel) => config.with_channel_name(channel),
            None => config,
        }
    }
}

/// `content://` locator served from a local file
#[derive(Debug, Clone, PartialEq)]
pub struct ContentEntry {
    pub uri: ResourceReference,
    pub path: PathBuf,
    pub media_type: Option<String>,
}

impl FromStr for ContentEntry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (uri, rest) = s
            .split_once('=')
            .ok_or_else(|| format!("expected URI=PATH[;MEDIA_TYPE], got '{s}'"))?;
        let (path, media_type) = match rest.split_once(';') {
            Some((path, media_type)) => (path, Some(media_type.trim().to_string())),
            None => (rest, None),
        };
        if path.is_empty() {
            return Err(format!("missing path in '{s}'"));
        }
        Ok(Self {
            uri: ResourceReference::parse(uri).map_err(|e| e.to_string())?,
            path: PathBuf::from(path),
            media_type: media_type.filter(|m| !m.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpx_handoff::{HoldStrategy, Scheme};

    #[test]
    fn test_defaults() {
        let settings = Settings::try_parse_from(["gpx-handoff-host"]).unwrap();
        assert_eq!(settings.platform, Platform::Android);
        assert!(settings.launch.is_none());
        assert!(settings.open.is_empty());
        assert_eq!(settings.handoff_config().hold, HoldStrategy::Reference);
    }

    #[test]
    fn test_full_command_line() {
        let settings = Settings::try_parse_from([
            "gpx-handoff-host",
            "--platform",
            "apple",
            "--channel",
            "demo/gpx",
            "--launch",
            "file:///sdcard/route.GPX",
            "--open",
            "/tmp/brevet.gpx",
            "--open",
            "content://provider/7",
            "--content",
            "content://provider/7=/tmp/seven.xml;text/xml",
        ])
        .unwrap();

        assert_eq!(settings.platform, Platform::Apple);
        assert_eq!(settings.handoff_config().channel_name, "demo/gpx");
        assert_eq!(
            settings.launch.as_ref().map(|r| r.scheme()),
            Some(Scheme::File)
        );
        assert_eq!(settings.open.len(), 2);
        assert_eq!(settings.open[0].as_str(), "file:///tmp/brevet.gpx");
        assert_eq!(settings.content[0].media_type.as_deref(), Some("text/xml"));
    }

    #[test]
    fn test_content_entry_parsing() {
        let entry: ContentEntry = "content://mail/3=/tmp/a.gpx".parse().unwrap();
        assert_eq!(entry.uri.as_str(), "content://mail/3");
        assert_eq!(entry.path, PathBuf::from("/tmp/a.gpx"));
        assert_eq!(entry.media_type, None);

        assert!("content://mail/3".parse::<ContentEntry>().is_err());
        assert!("content://mail/3=".parse::<ContentEntry>().is_err());
    }

    #[test]
    fn test_unknown_platform_rejected() {
        assert!(Settings::try_parse_from(["gpx-handoff-host", "--platform", "palm"]).is_err());
    }
}
