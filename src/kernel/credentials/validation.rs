//! Post-transition verification.

use crate::config::types::{CredentialTarget, Result, ShimError};
use crate::kernel::syscalls::ProcessSyscalls;

/// The effective uid must be the target. When the shim started as root the
/// real uid must be the target too, otherwise a shell started by the target
/// resets euid back to the caller.
pub fn verify_transition<S: ProcessSyscalls + ?Sized>(sys: &S, target: &CredentialTarget) -> Result<()> {
    let real_uid = sys.getuid();
    let effective_uid = sys.geteuid();

    if effective_uid != target.uid || (target.privileged_start && real_uid != target.uid) {
        return Err(ShimError::Verification(format!(
            "UID: expected {}, got real={}, effective={}",
            target.uid, real_uid, effective_uid
        )));
    }

    if let Some(gid) = target.gid {
        let real_gid = sys.getgid();
        let effective_gid = sys.getegid();
        if effective_gid != gid || (target.privileged_start && real_gid != gid) {
            return Err(ShimError::Verification(format!(
                "GID: expected {}, got real={}, effective={}",
                gid, real_gid, effective_gid
            )));
        }
    }

    log::debug!("UID/GID verification passed");
    Ok(())
}
