//! Pre-Exec Ordering Enforcement
//!
//! The shim sequence is fixed:
//! 1. validate configuration, build argv and envp (no syscalls)
//! 2. credential transition (setuid, then setgid for normalize, then verify)
//! 3. exec target
//!
//! Each step consumes the prior state and returns exactly one next state on
//! success. Only `Shim<CredsTransitioned>` exposes `exec`, so an exec
//! before the credential transition does not compile, and neither does
//! reusing a consumed state.

use crate::config::types::{CredentialTarget, Result, ShimConfig, ShimError};
use crate::exec::argv::ArgumentVector;
use crate::kernel::credentials::transition_credentials;
use crate::kernel::syscalls::ProcessSyscalls;
use crate::utils::env_hygiene::build_exec_env;
use std::convert::Infallible;
use std::ffi::{CString, OsString};
use std::marker::PhantomData;

/// Type-state marker: argv and envp built, credentials untouched
pub struct Fresh;

/// Type-state marker: every credential step succeeded
pub struct CredsTransitioned;

/// A single shim invocation with type-state tracking
pub struct Shim<'s, S> {
    config: &'s ShimConfig,
    argv: ArgumentVector,
    envp: Vec<CString>,
    sys: &'s dyn ProcessSyscalls,
    target: Option<CredentialTarget>,
    _state: PhantomData<S>,
}

impl<S> Shim<'_, S> {
    pub fn config(&self) -> &ShimConfig {
        self.config
    }

    pub fn argv(&self) -> &ArgumentVector {
        &self.argv
    }

    pub fn envp(&self) -> &[CString] {
        &self.envp
    }
}

impl<'s> Shim<'s, Fresh> {
    /// Step 1: everything that can fail without touching the kernel.
    pub fn prepare<A, E>(
        config: &'s ShimConfig,
        caller_args: A,
        caller_env: E,
        sys: &'s dyn ProcessSyscalls,
    ) -> Result<Self>
    where
        A: IntoIterator<Item = OsString>,
        E: IntoIterator<Item = (OsString, OsString)>,
    {
        config.validate()?;
        let argv = ArgumentVector::build(&config.target, config.mode_flag.as_deref(), caller_args)?;
        let envp = build_exec_env(&config.env, caller_env)?;

        Ok(Shim {
            config,
            argv,
            envp,
            sys,
            target: None,
            _state: PhantomData,
        })
    }

    /// Step 2: consumes `Fresh`; there is no way back on failure.
    pub fn transition_credentials(self) -> Result<Shim<'s, CredsTransitioned>> {
        let target = transition_credentials(
            self.sys,
            self.config.credentials,
            self.config.verify_transition,
        )?;

        Ok(Shim {
            config: self.config,
            argv: self.argv,
            envp: self.envp,
            sys: self.sys,
            target: Some(target),
            _state: PhantomData,
        })
    }
}

impl Shim<'_, CredsTransitioned> {
    pub fn credentials(&self) -> Option<CredentialTarget> {
        self.target
    }

    /// Step 3: replace the process image. Returns only on failure.
    pub fn exec(self) -> Result<Infallible> {
        let path = &self.argv.as_slice()[0];
        log::info!(
            "Executing {} with {} argument(s)",
            self.config.target.display(),
            self.argv.len() - 1
        );

        match self.sys.execve(path, self.argv.as_slice(), &self.envp) {
            Ok(never) => match never {},
            Err(source) => Err(ShimError::Exec {
                path: self.config.target.clone(),
                source,
            }),
        }
    }
}
