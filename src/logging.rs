use tracing_subscriber::{EnvFilter, fmt};

/// Initialize `tracing` for diagnostics on stderr.
///
/// The filter comes from `OCM_LOG` (e.g. `OCM_LOG=debug`) and defaults to
/// `warn`, so regular command output stays clean.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let env_filter = EnvFilter::try_from_env("OCM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
