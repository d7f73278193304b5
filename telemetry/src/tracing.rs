use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info";

/// Filter used by [`init_test_tracing`] when `RUST_LOG` is not set.
const DEFAULT_TEST_FILTER: &str = "delta=debug,info";

static INIT_TEST_TRACING: Once = Once::new();

/// Installs the global tracing subscriber.
///
/// The filter is read from `RUST_LOG` and falls back to `info`. Returns an error if a global
/// subscriber has already been installed.
pub fn init_tracing() -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
}

/// Installs a subscriber that writes through the test harness's captured output.
///
/// Safe to call from every test, only the first call has an effect.
pub fn init_test_tracing() {
    INIT_TEST_TRACING.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_TEST_FILTER.into());

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_test_writer())
            .try_init();
    });
}
