//! Tracing setup for host applications.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,mugsmith_core=debug,mugsmith_renderer=debug,mugsmith_studio=debug";

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: [`DEFAULT_FILTER`]).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    let installed = if json_requested() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

fn json_requested() -> bool {
    std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json")
}
