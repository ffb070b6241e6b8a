/// This test should FAIL to compile
/// Attempting to exec before the credential transition

use std::ffi::OsString;
use suidshim::config::types::{CredentialPolicy, ShimConfig};
use suidshim::kernel::syscalls::LinuxSyscalls;
use suidshim::preexec::Shim;

fn main() {
    let config = ShimConfig::new("test", "/bin/true", CredentialPolicy::Escalate);
    let args: Vec<OsString> = vec![OsString::from("test")];
    let env: Vec<(OsString, OsString)> = Vec::new();

    let shim = Shim::prepare(&config, args, env, &LinuxSyscalls)
        .expect("prepare failed");

    // This should fail: Fresh has no exec method
    let _ = shim.exec();
}
