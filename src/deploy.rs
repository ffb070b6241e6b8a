//! Deployment precondition checks.
//!
//! A shim only works when its own binary is setuid and root-owned and its
//! target is a real executable. A target writable by anyone but root turns
//! the shim into a root shell for whoever can write it.

use crate::config::types::ShimConfig;
use nix::sys::stat::Mode;
use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;

const EXEC_BITS: Mode = Mode::S_IXUSR.union(Mode::S_IXGRP).union(Mode::S_IXOTH);
const GROUP_OTHER_WRITE: Mode = Mode::S_IWGRP.union(Mode::S_IWOTH);

fn file_mode(meta: &fs::Metadata) -> Mode {
    Mode::from_bits_truncate(meta.permissions().mode())
}

/// Problems found while checking an installed shim.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DeploymentReport {
    pub issues: Vec<String>,
}

impl DeploymentReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    fn push(&mut self, issue: String) {
        log::warn!("{}", issue);
        self.issues.push(issue);
    }
}

pub fn verify_deployment(shim_binary: &Path, config: &ShimConfig) -> DeploymentReport {
    let mut report = DeploymentReport::default();
    check_shim_binary(shim_binary, &mut report);
    check_target(&config.target, &mut report);
    report
}

fn check_shim_binary(path: &Path, report: &mut DeploymentReport) {
    let meta = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            report.push(format!("shim binary {}: {}", path.display(), e));
            return;
        }
    };

    let mode = file_mode(&meta);
    if !meta.is_file() {
        report.push(format!("shim binary {} is not a regular file", path.display()));
    }
    if meta.uid() != 0 {
        report.push(format!(
            "shim binary {} is owned by uid {}, expected root",
            path.display(),
            meta.uid()
        ));
    }
    if !mode.contains(Mode::S_ISUID) {
        report.push(format!("shim binary {} does not have the setuid bit set", path.display()));
    }
    if mode.intersects(GROUP_OTHER_WRITE) {
        report.push(format!(
            "shim binary {} is writable by group or others (mode {:o})",
            path.display(),
            mode.bits()
        ));
    }
}

fn check_target(path: &Path, report: &mut DeploymentReport) {
    if !path.is_absolute() {
        report.push(format!("target {} is not an absolute path", path.display()));
        return;
    }

    let meta = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            report.push(format!("target {}: {}", path.display(), e));
            return;
        }
    };

    let mode = file_mode(&meta);
    if !meta.is_file() {
        report.push(format!("target {} is not a regular file", path.display()));
    }
    if !mode.intersects(EXEC_BITS) {
        report.push(format!("target {} is not executable", path.display()));
    }
    if meta.uid() != 0 {
        report.push(format!(
            "target {} is owned by uid {}, expected root",
            path.display(),
            meta.uid()
        ));
    }
    if mode.intersects(GROUP_OTHER_WRITE) {
        report.push(format!(
            "target {} is writable by group or others (mode {:o})",
            path.display(),
            mode.bits()
        ));
    }
}
