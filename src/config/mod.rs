//! Configuration
//!
//! Shim descriptions, shared error types, and the installed presets.

pub mod presets;
pub mod types;
