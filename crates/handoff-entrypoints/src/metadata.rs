use shadow_rs::shadow;

shadow!(build);

/// Banner written once per process when a shim initializes the bridge, so a
/// logcat or console capture tells which build handled the handoff.
pub fn log_version_info() {
    let banner = short_version_info();
    let built = format!(
        "Built {} with {} Rust",
        build::BUILD_TIME_2822,
        build::BUILD_RUST_CHANNEL
    );
    // No tracing subscriber on Android: go straight to android_logger
    #[cfg(target_os = "android")]
    {
        log::info!("{}", banner);
        log::info!("{}", built);
    }
    #[cfg(not(target_os = "android"))]
    {
        tracing::info!("{}", banner);
        tracing::info!("{}", built);
    }
}

/// `handoff-entrypoints 0.1.0 (main@abc1234+dirty)`
pub fn short_version_info() -> String {
    format!(
        "{} {} ({}@{}{})",
        build::PROJECT_NAME,
        build::PKG_VERSION,
        build::BRANCH,
        build::SHORT_COMMIT,
        if build::GIT_CLEAN { "" } else { "+dirty" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_version_info() {
        let info = short_version_info();
        assert!(info.starts_with(build::PROJECT_NAME), "{info}");
        assert!(info.contains(build::PKG_VERSION), "{info}");
    }
}
