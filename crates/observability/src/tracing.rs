//! Tracing/logging initialization.
//!
//! JSON lines on stdout, filtered through `RUST_LOG`. Side-channel failures
//! in the engine (audit, notifications) surface here as `warn` records, so
//! the default filter keeps the clubhouse crates at `info`.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str =
    "warn,clubhouse_engine=info,clubhouse_store=info,clubhouse_audit=info";

/// Initialize tracing for the process, honoring `RUST_LOG` when set.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    install(filter);
}

/// Initialize tracing with explicit filter directives, ignoring `RUST_LOG`.
///
/// Intended for tests and one-off tools that want a fixed filter.
pub fn init_with_directives(directives: &str) {
    install(EnvFilter::new(directives));
}

fn install(filter: EnvFilter) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_a_no_op() {
        init_with_directives("warn");
        init_with_directives("info");
        init();
    }
}
