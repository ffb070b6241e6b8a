//! Execution control
//!
//! Builds the handoff and runs the credential transition and exec in a
//! type-state enforced order.

pub mod argv;
pub mod executor;
pub mod preexec;
