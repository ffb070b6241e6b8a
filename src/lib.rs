//! suidshim: minimal setuid exec shims
//!
//! Each shim is a tiny privileged executable that moves its credentials to a
//! fixed identity and then replaces itself with a fixed absolute target,
//! forwarding the caller's arguments.
//!
//! # Architecture
//!
//! ## Kernel Primitives ([`kernel`])
//! - [`kernel::syscalls`]: `ProcessSyscalls` seam over getuid/setuid/setgid/execve
//! - [`kernel::credentials`]: Escalate (`setuid(0)`) and normalize (`setuid(euid)`, `setgid(egid)`) transitions
//!
//! ## Execution Control ([`exec`])
//! - [`exec::argv`]: Argument vector construction
//! - [`exec::preexec`]: Type-state enforced transition-then-exec ordering
//! - [`exec::executor`]: The single-shot shim sequence
//!
//! ## Configuration ([`config`])
//! - [`config::types`]: `ShimConfig`, `ShimError`, exit codes
//! - [`config::presets`]: The installed shims
//!
//! ## Utilities ([`utils`])
//! - [`utils::env_hygiene`]: Environment forwarding policy
//!
//! ## Deployment ([`deploy`])
//! - Setuid bit, ownership and target checks for installed shims
//!
//! # Design Principles
//!
//! 1. **All or nothing** - Exec only after every credential step succeeded
//! 2. **Fixed target** - The caller never chooses argv[0] or the executable
//! 3. **Types prevent errors** - Exec before the transition does not compile
//! 4. **Kernel behind a trait** - Ordering is testable without privileges

// Kernel Primitives
pub mod kernel;

// Execution Control
pub mod exec;

// Configuration
pub mod config;

// Utilities
pub mod utils;

// Deployment checks
pub mod deploy;

// CLI entrypoints shared by the shim and admin binaries.
pub mod cli;

pub use config::types::*;
pub use exec::preexec;
