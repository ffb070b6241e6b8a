/// Core types and structures for the shim system
use crate::utils::env_hygiene::EnvPolicy;
use nix::errno::Errno;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Credential transition or configuration failed; exec was never attempted.
pub const EXIT_SHIM_FAILURE: u8 = 125;
/// Target exists but the kernel refused to run it.
pub const EXIT_CANNOT_EXECUTE: u8 = 126;
/// Target path does not resolve to a file.
pub const EXIT_NOT_FOUND: u8 = 127;

/// Which credential call failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialStep {
    Uid,
    Gid,
}

impl fmt::Display for CredentialStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uid => f.write_str("UID"),
            Self::Gid => f.write_str("GID"),
        }
    }
}

/// How a shim picks the identity it runs its target under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialPolicy {
    /// `setuid(0)`: become root in real and effective uid.
    Escalate,
    /// `setuid(euid)` then `setgid(egid)`: make the real ids match the
    /// setuid/setgid identity the binary started with.
    Normalize,
}

impl CredentialPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Escalate => "escalate",
            Self::Normalize => "normalize",
        }
    }
}

impl fmt::Display for CredentialPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "escalate" => Ok(Self::Escalate),
            "normalize" => Ok(Self::Normalize),
            other => Err(format!(
                "unknown credential policy '{}' (expected escalate or normalize)",
                other
            )),
        }
    }
}

/// Identity resolved at startup, before any credential call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CredentialTarget {
    pub uid: u32,
    /// `None` for escalation, which leaves the gid untouched.
    pub gid: Option<u32>,
    /// Effective uid was root when the shim started.
    pub privileged_start: bool,
}

/// A single shim: where it execs, under which identity, with what prefix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShimConfig {
    /// Name used as the prefix of error lines on stderr
    pub name: String,
    /// Absolute path of the executable that replaces the shim
    pub target: PathBuf,
    /// Credential transition performed before exec
    pub credentials: CredentialPolicy,
    /// Fixed flag inserted before the forwarded arguments
    #[serde(default)]
    pub mode_flag: Option<String>,
    /// Environment forwarding policy
    #[serde(default)]
    pub env: EnvPolicy,
    /// Read the ids back after the transition and fail on mismatch
    #[serde(default = "default_verify")]
    pub verify_transition: bool,
}

fn default_verify() -> bool {
    true
}

impl ShimConfig {
    pub fn new(name: impl Into<String>, target: impl Into<PathBuf>, credentials: CredentialPolicy) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            credentials,
            mode_flag: None,
            env: EnvPolicy::default(),
            verify_transition: true,
        }
    }

    pub fn with_mode_flag(mut self, flag: impl Into<String>) -> Self {
        self.mode_flag = Some(flag.into());
        self
    }

    pub fn with_env(mut self, env: EnvPolicy) -> Self {
        self.env = env;
        self
    }

    /// Reject configurations that could never be exec'd safely.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ShimError::Config("shim name must not be empty".to_string()));
        }
        if !self.target.is_absolute() {
            return Err(ShimError::Config(format!(
                "target must be an absolute path: {}",
                self.target.display()
            )));
        }
        if contains_nul(self.target.as_os_str().as_bytes()) {
            return Err(ShimError::Config(format!(
                "target path contains NUL byte: {}",
                self.target.display()
            )));
        }
        if let Some(flag) = &self.mode_flag {
            if flag.is_empty() || contains_nul(flag.as_bytes()) {
                return Err(ShimError::Config(format!("invalid mode flag: {:?}", flag)));
            }
        }
        self.env.validate()
    }

    /// Load a shim description from JSON. Only the admin tool does this;
    /// installed shims are compiled from presets.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: ShimConfig = serde_json::from_str(&raw).map_err(|e| {
            ShimError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }
}

fn contains_nul(bytes: &[u8]) -> bool {
    bytes.contains(&0)
}

fn errno_code(errno: &Errno) -> i32 {
    *errno as i32
}

/// Shim error types
#[derive(Error, Debug)]
pub enum ShimError {
    #[error("Failed to set {step} to {id}, error {} {}", errno_code(.source), .source.desc())]
    Credential {
        step: CredentialStep,
        id: u32,
        source: Errno,
    },

    #[error("Credential verification failed: {0}")]
    Verification(String),

    #[error("Failed to execute {}: {}", .path.display(), .source.desc())]
    Exec { path: PathBuf, source: Errno },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Deployment check failed: {0}")]
    Deploy(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShimError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Exec { source, .. } => match source {
                Errno::ENOENT | Errno::ENOTDIR => EXIT_NOT_FOUND,
                _ => EXIT_CANNOT_EXECUTE,
            },
            Self::Deploy(_) => 1,
            Self::Credential { .. } | Self::Verification(_) | Self::Config(_) | Self::Io(_) => {
                EXIT_SHIM_FAILURE
            }
        }
    }

    /// True when the error happened before any exec attempt.
    pub fn is_pre_exec(&self) -> bool {
        !matches!(self, Self::Exec { .. })
    }
}

/// Result type for shim operations
pub type Result<T> = std::result::Result<T, ShimError>;
