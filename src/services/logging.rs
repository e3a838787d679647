use tracing_subscriber::{
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

const DEFAULT_DIRECTIVES: &str = "warn,healthcare_hub=info";

/// Human readable logs on stderr, filtered by `RUST_LOG`.
pub fn init_default_tracing() {
    init_tracing(false);
}

/// Install the global subscriber. Logs always go to stderr so model output
/// on stdout stays clean. Calling this twice is a no-op.
pub fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let result = if json {
        let layer = fmt::layer()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(std::io::stderr);
        Registry::default().with(filter).with(layer).try_init()
    } else {
        let layer = fmt::layer()
            .with_timer(UtcTime::rfc_3339())
            .with_target(false)
            .with_writer(std::io::stderr);
        Registry::default().with(filter).with(layer).try_init()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "tracing already initialised");
    }
}
