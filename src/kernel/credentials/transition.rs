//! UID/GID transitions performed before exec.
//!
//! CRITICAL: every step must succeed before the next one runs. A failure
//! anywhere aborts the shim; exec is never reached on partial transition.

use super::validation::verify_transition;
use crate::config::types::{CredentialPolicy, CredentialStep, CredentialTarget, Result, ShimError};
use crate::kernel::syscalls::ProcessSyscalls;

/// Read the identity a policy transitions to. Must run before any
/// credential call: for `Normalize` the effective ids are the target.
pub fn resolve_target<S: ProcessSyscalls + ?Sized>(sys: &S, policy: CredentialPolicy) -> CredentialTarget {
    let euid = sys.geteuid();
    match policy {
        CredentialPolicy::Escalate => CredentialTarget {
            uid: 0,
            gid: None,
            privileged_start: euid == 0,
        },
        CredentialPolicy::Normalize => CredentialTarget {
            uid: euid,
            gid: Some(sys.getegid()),
            privileged_start: euid == 0,
        },
    }
}

/// resolve -> setuid -> setgid (normalize only) -> verify.
pub fn transition_credentials<S: ProcessSyscalls + ?Sized>(
    sys: &S,
    policy: CredentialPolicy,
    verify: bool,
) -> Result<CredentialTarget> {
    let target = resolve_target(sys, policy);
    log::debug!("Credential policy {} resolved to {:?}", policy, target);

    set_uid(sys, target.uid)?;
    // CRITICAL: GID only after UID succeeded
    if let Some(gid) = target.gid {
        set_gid(sys, gid)?;
    }

    if verify {
        verify_transition(sys, &target)?;
    }

    log::info!("Transitioned to UID={}, GID={:?}", target.uid, target.gid);
    Ok(target)
}

fn set_uid<S: ProcessSyscalls + ?Sized>(sys: &S, uid: u32) -> Result<()> {
    sys.setuid(uid).map_err(|source| ShimError::Credential {
        step: CredentialStep::Uid,
        id: uid,
        source,
    })?;
    log::debug!("Set UID to {}", uid);
    Ok(())
}

fn set_gid<S: ProcessSyscalls + ?Sized>(sys: &S, gid: u32) -> Result<()> {
    sys.setgid(gid).map_err(|source| ShimError::Credential {
        step: CredentialStep::Gid,
        id: gid,
        source,
    })?;
    log::debug!("Set GID to {}", gid);
    Ok(())
}
