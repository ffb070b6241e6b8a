/// Environment Hygiene
///
/// The caller's environment crosses a trust boundary when a setuid shim
/// execs its target: after `setuid(0)` the real uid is root, so the target
/// is no longer a secure-mode exec and the dynamic loader honours variables
/// the caller chose. Arguments are forwarded untouched; the invoking user is
/// trusted to pass whatever the target accepts.
use crate::config::types::{Result, ShimError};
use serde::{Deserialize, Serialize};
use std::ffi::{CString, OsString};
use std::os::unix::ffi::OsStrExt;

/// Prefixes of variable families glibc drops for secure-mode executables.
const LOADER_PREFIXES: &[&str] = &["LD_", "MALLOC_"];

/// Single variables glibc drops for secure-mode executables.
const LOADER_VARS: &[&str] = &[
    "GCONV_PATH",
    "GETCONF_DIR",
    "GLIBC_TUNABLES",
    "HOSTALIASES",
    "LOCALDOMAIN",
    "LOCPATH",
    "NIS_PATH",
    "NLSPATH",
    "RESOLV_HOST_CONF",
    "RES_OPTIONS",
    "TMPDIR",
    "TZDIR",
];

/// Environment forwarding policy
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EnvPolicy {
    /// Forward every variable verbatim
    Inherit,
    /// Forward everything except loader-controlling variables
    #[default]
    ScrubLoader,
    /// Forward only the named variables
    AllowList { vars: Vec<String> },
}

impl EnvPolicy {
    pub fn validate(&self) -> Result<()> {
        if let Self::AllowList { vars } = self {
            for var in vars {
                if var.is_empty() || var.contains('=') || var.contains('\0') {
                    return Err(ShimError::Config(format!(
                        "invalid environment variable name in allow-list: {:?}",
                        var
                    )));
                }
            }
        }
        Ok(())
    }

    /// Whether a variable with this name would reach the target.
    pub fn permits(&self, key: &[u8]) -> bool {
        match self {
            Self::Inherit => true,
            Self::ScrubLoader => !is_loader_variable(key),
            Self::AllowList { vars } => vars.iter().any(|v| v.as_bytes() == key),
        }
    }
}

/// `LD_*`, `MALLOC_*` and the other variables listed in [`LOADER_VARS`].
pub fn is_loader_variable(key: &[u8]) -> bool {
    LOADER_PREFIXES.iter().any(|p| key.starts_with(p.as_bytes()))
        || LOADER_VARS.iter().any(|v| v.as_bytes() == key)
}

/// Build the `envp` handed to exec, preserving the caller's order.
pub fn build_exec_env<I>(policy: &EnvPolicy, vars: I) -> Result<Vec<CString>>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut envp = Vec::new();
    for (key, value) in vars {
        let key = key.as_bytes();
        if !policy.permits(key) {
            log::debug!(
                "Dropping environment variable: {}",
                String::from_utf8_lossy(key)
            );
            continue;
        }

        let mut entry = Vec::with_capacity(key.len() + value.len() + 1);
        entry.extend_from_slice(key);
        entry.push(b'=');
        entry.extend_from_slice(value.as_bytes());
        let entry = CString::new(entry).map_err(|_| {
            ShimError::Config(format!(
                "environment variable {} contains NUL byte",
                String::from_utf8_lossy(key)
            ))
        })?;
        envp.push(entry);
    }
    Ok(envp)
}

/// Names of the variables in `vars` that `policy` would drop.
pub fn dropped_variables<'a, I>(policy: &EnvPolicy, vars: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a (OsString, OsString)>,
{
    vars.into_iter()
        .filter(|(key, _)| !policy.permits(key.as_bytes()))
        .map(|(key, _)| key.to_string_lossy().into_owned())
        .collect()
}
