use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SUPPORT_DESK_LOG";

/// Installs the stderr subscriber. `SUPPORT_DESK_LOG` takes an `EnvFilter`
/// directive; without it only warnings are shown, or debug with `--verbose`.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("support_desk={default_level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
