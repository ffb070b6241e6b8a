//! Argument vector handed to the target.
//!
//! Layout: `[target, mode_flag?, caller_args[1..]...]`. The caller's own
//! `argv[0]` is always discarded so the target never sees a name the
//! caller picked.

use crate::config::types::{Result, ShimError};
use std::ffi::{CString, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgumentVector {
    args: Vec<CString>,
}

impl ArgumentVector {
    pub fn build<I>(target: &Path, mode_flag: Option<&str>, caller_args: I) -> Result<Self>
    where
        I: IntoIterator<Item = OsString>,
    {
        let caller_args = caller_args.into_iter();
        let mut args = Vec::with_capacity(caller_args.size_hint().0 + 2);

        args.push(to_cstring(target.as_os_str().as_bytes(), "target path")?);
        if let Some(flag) = mode_flag {
            args.push(to_cstring(flag.as_bytes(), "mode flag")?);
        }
        for arg in caller_args.skip(1) {
            args.push(to_cstring(arg.as_bytes(), "argument")?);
        }

        Ok(Self { args })
    }

    /// Arguments without the trailing null; `execve` appends it.
    pub fn as_slice(&self) -> &[CString] {
        &self.args
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Lossy rendering for diagnostics.
    pub fn to_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

fn to_cstring(bytes: &[u8], what: &str) -> Result<CString> {
    CString::new(bytes).map_err(|_| {
        ShimError::Config(format!(
            "{} contains NUL byte: {:?}",
            what,
            String::from_utf8_lossy(bytes)
        ))
    })
}
