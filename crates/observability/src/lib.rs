//! Tracing and logging setup shared by clubhouse binaries and tests.

pub mod tracing;

pub use tracing::{init, init_with_directives};
