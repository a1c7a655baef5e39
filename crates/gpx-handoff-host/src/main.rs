mod host;
mod settings;

use settings::Settings;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

fn main() -> ExitCode {
    handoff_entrypoints::setup_logging();
    handoff_entrypoints::log_version_info();

    let settings = Settings::from_cli();

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(err) => {
            tracing::error!("Failed to create Tokio runtime: {}", err);
            return ExitCode::FAILURE;
        }
    };

    rt.block_on(host::run(settings, Arc::new(Mutex::new(std::io::stdout()))));
    ExitCode::SUCCESS
}
