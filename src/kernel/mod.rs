//! Thin wrappers around Linux kernel primitives.
//!
//! Dependency direction: syscalls -> credentials

pub mod credentials;
pub mod syscalls;
