//! Scratch-directory artifacts the browser pulls through `/view`.

/// Background and layer PNG publishing.
pub mod publish;
