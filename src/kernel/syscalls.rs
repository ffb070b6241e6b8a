//! Process credential and exec syscalls.
//!
//! Everything the shim asks of the kernel goes through [`ProcessSyscalls`],
//! so the ordering guarantees of the credential transition can be checked
//! without privileges.

use nix::errno::Errno;
use nix::unistd::{self, Gid, Uid};
use std::convert::Infallible;
use std::ffi::{CStr, CString};

pub trait ProcessSyscalls {
    fn getuid(&self) -> u32;
    fn geteuid(&self) -> u32;
    fn getgid(&self) -> u32;
    fn getegid(&self) -> u32;
    fn setuid(&self, uid: u32) -> Result<(), Errno>;
    fn setgid(&self, gid: u32) -> Result<(), Errno>;
    /// Replace the process image. Only returns on failure.
    fn execve(&self, path: &CStr, argv: &[CString], envp: &[CString]) -> Result<Infallible, Errno>;
}

/// The running process, via `nix::unistd`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinuxSyscalls;

impl ProcessSyscalls for LinuxSyscalls {
    fn getuid(&self) -> u32 {
        unistd::getuid().as_raw()
    }

    fn geteuid(&self) -> u32 {
        unistd::geteuid().as_raw()
    }

    fn getgid(&self) -> u32 {
        unistd::getgid().as_raw()
    }

    fn getegid(&self) -> u32 {
        unistd::getegid().as_raw()
    }

    fn setuid(&self, uid: u32) -> Result<(), Errno> {
        unistd::setuid(Uid::from_raw(uid))
    }

    fn setgid(&self, gid: u32) -> Result<(), Errno> {
        unistd::setgid(Gid::from_raw(gid))
    }

    fn execve(&self, path: &CStr, argv: &[CString], envp: &[CString]) -> Result<Infallible, Errno> {
        unistd::execve(path, argv, envp)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linux_ids_match_nix() {
        let sys = LinuxSyscalls;
        assert_eq!(sys.getuid(), unistd::getuid().as_raw());
        assert_eq!(sys.geteuid(), unistd::geteuid().as_raw());
        assert_eq!(sys.getgid(), unistd::getgid().as_raw());
        assert_eq!(sys.getegid(), unistd::getegid().as_raw());
    }

    #[test]
    fn execve_missing_target_returns_enoent() {
        let sys = LinuxSyscalls;
        let path = CString::new("/nonexistent/suidshim-target").unwrap();
        let argv = vec![path.clone()];
        let envp: Vec<CString> = Vec::new();
        match sys.execve(&path, &argv, &envp) {
            Ok(never) => match never {},
            Err(e) => assert_eq!(e, Errno::ENOENT),
        }
    }
}
