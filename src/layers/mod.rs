//! Input normalization into an ordered layer list.

/// Layer assembly and validation.
pub mod assemble;
