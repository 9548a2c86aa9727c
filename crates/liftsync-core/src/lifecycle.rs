use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Install the stderr tracing subscriber.
///
/// `RUST_LOG` overrides the filter; HTTP client internals stay at `warn` by default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .init();
}

/// Log the effective storage and sync settings.
pub fn log_startup(config: &AppConfig) {
    let remote = if config.remote.is_enabled() {
        config.remote.base_url.trim()
    } else {
        "disabled"
    };
    tracing::debug!(
        "LiftSync starting: storage={} remote={remote} offline={} verify_writes={}",
        config.storage.dir,
        config.sync.force_offline,
        config.storage.verify_writes
    );
    if config.remote.is_enabled() && config.session.user_id.trim().is_empty() {
        tracing::warn!("No session user_id configured; completed workouts will stay queued");
    }
}

pub fn log_shutdown() {
    tracing::debug!("LiftSync shutting down");
}
