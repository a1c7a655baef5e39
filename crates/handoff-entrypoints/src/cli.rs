use clap::Parser;

/// Generic function to get environment variable, parsing it to the desired type.
pub fn get_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Parses the command line arguments of the current process.
pub fn parse_args<T: Parser>() -> Result<T, clap::Error> {
    T::try_parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_missing_or_unparsable() {
        assert_eq!(get_env::<u32>("HANDOFF_ENTRYPOINTS_TEST_SURELY_UNSET"), None);
        // PATH is set everywhere tests run, but it is not a number
        assert_eq!(get_env::<u32>("PATH"), None);
        assert!(get_env::<String>("PATH").is_some());
    }
}
