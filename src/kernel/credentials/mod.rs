//! UID/GID transitions performed by the shims.
//!
//! CRITICAL: setuid MUST succeed before setgid is attempted, and exec MUST
//! NOT run after any failed step.

mod transition;
mod validation;

pub use transition::{resolve_target, transition_credentials};
pub use validation::verify_transition;
