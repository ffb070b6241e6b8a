//! Single-shot shim execution.

use crate::config::types::{Result, ShimConfig};
use crate::exec::preexec::Shim;
use crate::kernel::syscalls::ProcessSyscalls;
use std::convert::Infallible;
use std::ffi::OsString;

/// prepare -> transition credentials -> exec.
///
/// On success the process image is replaced and this never returns; the
/// `Ok` type is uninhabited.
pub fn run_shim<A, E>(
    config: &ShimConfig,
    caller_args: A,
    caller_env: E,
    sys: &dyn ProcessSyscalls,
) -> Result<Infallible>
where
    A: IntoIterator<Item = OsString>,
    E: IntoIterator<Item = (OsString, OsString)>,
{
    log::debug!(
        "Shim {} starting: target={}, credentials={}",
        config.name,
        config.target.display(),
        config.credentials
    );

    Shim::prepare(config, caller_args, caller_env, sys)?
        .transition_credentials()?
        .exec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{CredentialPolicy, ShimError, EXIT_NOT_FOUND, EXIT_SHIM_FAILURE};
    use crate::kernel::syscalls::fake::{Call, FakeSyscalls};
    use nix::errno::Errno;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn missing_target_maps_to_not_found() {
        let sys = FakeSyscalls::setuid_root();
        let config = ShimConfig::new("t", "/nonexistent/tool", CredentialPolicy::Normalize);
        let err = match run_shim(&config, os(&["t"]), Vec::new(), &sys) {
            Ok(never) => match never {},
            Err(e) => e,
        };
        assert_eq!(err.exit_code(), EXIT_NOT_FOUND);
        assert!(sys.exec_attempted());
    }

    #[test]
    fn gid_failure_stops_before_exec() {
        let mut sys = FakeSyscalls::setuid_root();
        sys.setgid_error = Some(Errno::EPERM);
        let config = ShimConfig::new("t", "/usr/bin/trac-admin", CredentialPolicy::Normalize);
        let err = match run_shim(&config, os(&["t", "env", "list"]), Vec::new(), &sys) {
            Ok(never) => match never {},
            Err(e) => e,
        };
        assert_eq!(err.exit_code(), EXIT_SHIM_FAILURE);
        assert!(!sys.exec_attempted());
    }

    #[test]
    fn normalize_sequence_is_uid_gid_exec() {
        let sys = FakeSyscalls::new(1000, 0, 1000, 0);
        let config = ShimConfig::new("t", "/usr/bin/trac-admin", CredentialPolicy::Normalize);
        let _ = run_shim(&config, os(&["t", "--verbose", "file.txt"]), Vec::new(), &sys);

        let order: Vec<Call> = sys
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::SetUid(_) | Call::SetGid(_) | Call::Execve { .. }))
            .collect();
        assert_eq!(
            order,
            vec![
                Call::SetUid(0),
                Call::SetGid(0),
                Call::Execve {
                    path: "/usr/bin/trac-admin".to_string(),
                    argv: vec![
                        "/usr/bin/trac-admin".to_string(),
                        "--verbose".to_string(),
                        "file.txt".to_string()
                    ],
                },
            ]
        );
    }

    #[test]
    fn identical_invocations_forward_identical_argv() {
        let config = ShimConfig::new("t", "/usr/bin/edskmgr", CredentialPolicy::Escalate)
            .with_mode_flag("--eject");
        let argv_of = || {
            let sys = FakeSyscalls::setuid_root();
            let _ = run_shim(&config, os(&["t", "sdb"]), Vec::new(), &sys);
            sys.exec_argv()
        };
        assert_eq!(argv_of(), argv_of());
    }

    #[test]
    fn error_line_is_pre_exec_for_credentials() {
        let mut sys = FakeSyscalls::new(1000, 1000, 1000, 1000);
        sys.setuid_error = Some(Errno::EPERM);
        let config = ShimConfig::new("t", "/bin/true", CredentialPolicy::Escalate);
        match run_shim(&config, os(&["t"]), Vec::new(), &sys) {
            Ok(never) => match never {},
            Err(e) => {
                assert!(e.is_pre_exec());
                assert!(matches!(e, ShimError::Credential { .. }));
            }
        }
    }
}
