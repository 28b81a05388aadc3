use navicord_config::schema::LogLevel;
use tracing_subscriber::EnvFilter;

/// Pick the filter directive: CLI flag, then `RUST_LOG`, then the config file.
pub fn filter_directive(cli: Option<&str>, env: Option<&str>, config: &LogLevel) -> String {
    [cli, env]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|d| !d.is_empty() && EnvFilter::try_new(d).is_ok())
        .unwrap_or(config.directive())
        .to_string()
}

/// Install the global subscriber. Logs go to stderr; stdout is left for
/// `--check-config` output.
pub fn init_logging(cli: Option<&str>, config: &LogLevel) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(cli, env.as_deref(), config);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&directive))
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
