/// Installed shim presets
///
/// Each setuid binary is compiled from exactly one preset. Target paths are
/// fixed at build time; packagers may override them through the
/// `SUIDSHIM_TRAC_ADMIN_PATH` and `SUIDSHIM_EDSKMGR_PATH` environment
/// variables when compiling.
use crate::config::types::{CredentialPolicy, ShimConfig};
use crate::utils::env_hygiene::EnvPolicy;

const fn or_default(value: Option<&'static str>, default: &'static str) -> &'static str {
    match value {
        Some(v) => v,
        None => default,
    }
}

pub const TRAC_ADMIN_PATH: &str = or_default(option_env!("SUIDSHIM_TRAC_ADMIN_PATH"), "/usr/bin/trac-admin");
pub const EDSKMGR_PATH: &str = or_default(option_env!("SUIDSHIM_EDSKMGR_PATH"), "/usr/bin/edskmgr");

/// Built-in shims
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// Runs trac-admin as the identity owning the shim
    TracAdmin,
    /// Runs `edskmgr --load` as root
    EdskmgrLoad,
    /// Runs `edskmgr --eject` as root
    EdskmgrEject,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::TracAdmin, Preset::EdskmgrLoad, Preset::EdskmgrEject];

    pub fn name(self) -> &'static str {
        match self {
            Self::TracAdmin => "trac-admin",
            Self::EdskmgrLoad => "edskmgr-load",
            Self::EdskmgrEject => "edskmgr-eject",
        }
    }

    /// File name of the installed setuid binary.
    pub fn binary_name(self) -> &'static str {
        match self {
            Self::TracAdmin => "trac-admin-suid",
            Self::EdskmgrLoad => "edskmgr-load-suid",
            Self::EdskmgrEject => "edskmgr-eject-suid",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == name || p.binary_name() == name)
    }

    pub fn config(self) -> ShimConfig {
        let config = match self {
            Self::TracAdmin => {
                ShimConfig::new(self.binary_name(), TRAC_ADMIN_PATH, CredentialPolicy::Normalize)
            }
            Self::EdskmgrLoad => {
                ShimConfig::new(self.binary_name(), EDSKMGR_PATH, CredentialPolicy::Escalate)
                    .with_mode_flag("--load")
            }
            Self::EdskmgrEject => {
                ShimConfig::new(self.binary_name(), EDSKMGR_PATH, CredentialPolicy::Escalate)
                    .with_mode_flag("--eject")
            }
        };
        config.with_env(EnvPolicy::ScrubLoader)
    }
}
