//! The graph node the host executes.

/// Run orchestration, outputs and cache key.
pub mod process;
/// Declared sockets for node registration.
pub mod schema;
