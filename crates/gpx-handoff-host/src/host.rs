//! Desktop stand-in for a mobile shim and its consumer
//!
//! Replays the lifecycle of a mobile app: cold start with an optional view
//! request, the consumer attaching and pulling, then view requests reaching the
//! running app. Every message crossing the delivery channel is written as one
//! JSON line.

use crate::settings::Settings;
use gpx_handoff::{
    GET_INITIAL_GPX_CONTENT, GpxHandoff, Intake, LocalResolver, MethodCall, MethodResponse,
};
use serde::Serialize;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// One line of host output
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostLine<'a> {
    Intake {
        channel: &'a str,
        path: &'a str,
        reference: String,
        outcome: String,
    },
    Response {
        channel: &'a str,
        method: &'a str,
        response: MethodResponse,
    },
    Notification {
        channel: &'a str,
        call: MethodCall,
    },
}

/// Shared line writer; the consumer task and the shim both write to it
pub type Output<W> = Arc<Mutex<W>>;

fn emit<W: Write>(out: &Output<W>, line: &HostLine<'_>) {
    let json = match serde_json::to_string(line) {
        Ok(json) => json,
        Err(err) => {
            tracing::error!("Failed to encode output line: {}", err);
            return;
        }
    };
    let mut out = out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Err(err) = writeln!(out, "{json}") {
        tracing::error!("Failed to write output line: {}", err);
    }
}

fn outcome(intake: Intake) -> String {
    format!("{intake:?}").to_lowercase()
}

pub fn build_handoff(settings: &Settings) -> GpxHandoff {
    let resolver = settings
        .content
        .iter()
        .fold(LocalResolver::new(), |resolver, entry| {
            resolver.with_content(&entry.uri, entry.path.clone(), entry.media_type.clone())
        });
    GpxHandoff::new(settings.handoff_config(), Arc::new(resolver))
}

/// Run the whole lifecycle, writing channel traffic to `out`
pub async fn run<W: Write + Send + 'static>(settings: Settings, out: Output<W>) {
    let handoff = build_handoff(&settings);
    let channel = handoff.channel_name().to_string();
    tracing::info!(
        "Emulating {} shim on channel {}",
        settings.platform,
        channel
    );

    // Cold start
    let reference = settings.launch.as_ref().map(ToString::to_string);
    let intake = handoff.on_launch(settings.launch.clone());
    emit(
        &out,
        &HostLine::Intake {
            channel: &channel,
            path: "launch",
            reference: reference.unwrap_or_default(),
            outcome: outcome(intake),
        },
    );

    // The consumer comes up and starts listening
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<MethodCall>();
    handoff.attach_channel(Box::new(tx));
    let consumer = {
        let out = out.clone();
        let channel = channel.clone();
        tokio::spawn(async move {
            while let Some(call) = rx.recv().await {
                emit(
                    &out,
                    &HostLine::Notification {
                        channel: &channel,
                        call,
                    },
                );
            }
        })
    };

    let response = handoff.handle_call(&MethodCall::get_initial_gpx_content());
    emit(
        &out,
        &HostLine::Response {
            channel: &channel,
            method: GET_INITIAL_GPX_CONTENT,
            response,
        },
    );

    // View requests reaching the running app
    for reference in settings.open {
        let shown = reference.to_string();
        let intake = handoff.on_resource_opened(reference);
        emit(
            &out,
            &HostLine::Intake {
                channel: &channel,
                path: "open",
                reference: shown,
                outcome: outcome(intake),
            },
        );
    }

    handoff.detach_channel();
    if let Err(err) = consumer.await {
        tracing::error!("Consumer task failed: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::Value;

    fn lines(out: &Output<Vec<u8>>) -> Vec<Value> {
        let buf = out.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    fn gpx_file(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    #[tokio::test]
    async fn test_cold_start_then_open() {
        let dir = tempfile::tempdir().unwrap();
        let launch = gpx_file(&dir, "route.GPX", "route-xml-bytes");
        let open = gpx_file(&dir, "brevet.gpx", "<gpx>brevet</gpx>");
        let settings = Settings::try_parse_from([
            "gpx-handoff-host",
            "--launch",
            &launch,
            "--open",
            &open,
        ])
        .unwrap();

        let out: Output<Vec<u8>> = Arc::new(Mutex::new(Vec::new()));
        run(settings, out.clone()).await;

        let lines = lines(&out);
        assert_eq!(lines.len(), 4, "{lines:?}");
        assert_eq!(lines[0]["event"], "intake");
        assert_eq!(lines[0]["outcome"], "held");
        assert_eq!(lines[1]["event"], "response");
        assert_eq!(lines[1]["response"]["result"], "route-xml-bytes");
        assert_eq!(lines[2]["outcome"], "pushed");
        assert_eq!(lines[3]["event"], "notification");
        assert_eq!(lines[3]["call"]["method"], "onGpxFileReceived");
        assert_eq!(lines[3]["call"]["arguments"], "<gpx>brevet</gpx>");
    }

    #[tokio::test]
    async fn test_rejected_launch_and_simulated_provider() {
        let dir = tempfile::tempdir().unwrap();
        let seven = gpx_file(&dir, "seven.bin", "<gpx>seven</gpx>");
        let entry = format!("content://provider/7={seven};text/plain");
        let settings = Settings::try_parse_from([
            "gpx-handoff-host",
            "--channel",
            "test/gpx",
            "--launch",
            "content://provider/7",
            "--content",
            &entry,
        ])
        .unwrap();

        let out: Output<Vec<u8>> = Arc::new(Mutex::new(Vec::new()));
        run(settings, out.clone()).await;

        let lines = lines(&out);
        assert_eq!(lines.len(), 2, "{lines:?}");
        assert_eq!(lines[0]["channel"], "test/gpx");
        assert_eq!(lines[0]["outcome"], "rejected");
        assert_eq!(lines[1]["response"]["status"], "success");
        assert_eq!(lines[1]["response"]["result"], Value::Null);
    }
}
