//! Integration tests for the shim binaries
//!
//! These drive the real executables. The normalize policy works without
//! root (setuid to the current euid is always permitted), so the full
//! transition-then-exec path runs end to end against system binaries.

use std::path::Path;
use std::process::{Command, Output};

const SUIDSHIM: &str = env!("CARGO_BIN_EXE_suidshim");

fn run_staged(args: &[&str]) -> Output {
    Command::new(SUIDSHIM)
        .arg("run")
        .args(args)
        .output()
        .expect("failed to spawn suidshim")
}

fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

fn have(path: &str) -> bool {
    Path::new(path).exists()
}

#[test]
fn target_sees_fixed_path_as_argv0() {
    let out = run_staged(&["--target", "/bin/cat", "--", "/proc/self/cmdline"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(out.stdout, b"/bin/cat\0/proc/self/cmdline\0");
}

#[test]
fn injected_flag_precedes_forwarded_args() {
    if !have("/bin/echo") {
        return;
    }
    let out = run_staged(&["--target", "/bin/echo", "--flag", "--load", "--", "foo", "bar"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "--load foo bar\n");
}

#[test]
fn missing_target_exits_127_without_hanging() {
    let out = run_staged(&["--target", "/nonexistent/suidshim-target", "--", "x"]);
    assert_eq!(out.status.code(), Some(127));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Failed to execute /nonexistent/suidshim-target"), "{}", stderr);
    assert!(out.stdout.is_empty());
}

#[test]
fn denied_escalation_exits_before_exec() {
    if is_root() {
        return;
    }
    let out = run_staged(&[
        "--target",
        "/bin/cat",
        "--credentials",
        "escalate",
        "--",
        "/proc/self/cmdline",
    ]);
    assert_eq!(out.status.code(), Some(125));
    assert!(out.stdout.is_empty(), "target must not run");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Failed to set UID to 0, error 1"), "{}", stderr);
}

#[test]
fn allow_list_limits_forwarded_environment() {
    if !have("/usr/bin/env") {
        return;
    }
    let out = Command::new(SUIDSHIM)
        .args(["run", "--target", "/usr/bin/env", "--env-allow", "SHIM_KEEP"])
        .env("SHIM_KEEP", "yes")
        .env("SHIM_DROP", "no")
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "SHIM_KEEP=yes\n");
}

#[test]
fn loader_variables_are_scrubbed_by_default() {
    if !have("/usr/bin/env") {
        return;
    }
    let out = Command::new(SUIDSHIM)
        .args(["run", "--target", "/usr/bin/env"])
        .env("GCONV_PATH", "/tmp")
        .env("SHIM_KEEP", "yes")
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.lines().any(|l| l == "SHIM_KEEP=yes"));
    assert!(!stdout.lines().any(|l| l.starts_with("GCONV_PATH=")));
}

#[test]
fn plan_reports_preset_argv() {
    let out = Command::new(SUIDSHIM)
        .args(["plan", "edskmgr-load", "foo", "bar"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let target = plan["target"].as_str().unwrap().to_string();
    assert_eq!(
        plan["argv"],
        serde_json::json!([target, "--load", "foo", "bar"])
    );
    assert_eq!(plan["credentials"], "escalate");
}

#[test]
fn verify_rejects_unprivileged_binary() {
    let out = Command::new(SUIDSHIM)
        .args(["verify", "trac-admin", "--binary", SUIDSHIM])
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("setuid bit"));
}

#[test]
fn edskmgr_shim_without_setuid_bit_fails_closed() {
    if is_root() {
        return;
    }
    let out = Command::new(env!("CARGO_BIN_EXE_edskmgr-load-suid"))
        .arg("sdb")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(125));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.starts_with("edskmgr-load-suid: Failed to set UID to 0"), "{}", stderr);
}

#[test]
fn trac_admin_shim_reports_missing_target() {
    if have(suidshim::config::presets::TRAC_ADMIN_PATH) {
        return;
    }
    let out = Command::new(env!("CARGO_BIN_EXE_trac-admin-suid"))
        .args(["/srv/trac", "help"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(127));
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("trac-admin-suid: Failed to execute"));
}
