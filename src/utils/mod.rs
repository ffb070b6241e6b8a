//! Utilities
//!
//! Environment hygiene for the exec handoff.

pub mod env_hygiene;
