//! Single-slot session coordination between the node thread and the HTTP completion handler.

/// Blocking wait gate and the session ticket.
pub mod gate;
/// Injected randomness for file-name seeds and cache keys.
pub mod seed;
/// The process-wide session slot.
pub mod store;
