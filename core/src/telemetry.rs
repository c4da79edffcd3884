use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const DEFAULT_LOG_FILTER: &str = "greeter_core=info,bootstrap=info,runner_local=info";

/// Installs the global subscriber. `RUST_LOG` wins over `filter`, which wins
/// over [`DEFAULT_LOG_FILTER`]. Later calls are no-ops.
pub fn init_tracing(filter: Option<&str>) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| filter.unwrap_or(DEFAULT_LOG_FILTER).into());

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
