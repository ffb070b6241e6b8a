/// This test should FAIL to compile
/// Attempting to run the credential transition twice on the same state

use std::ffi::OsString;
use suidshim::config::types::{CredentialPolicy, ShimConfig};
use suidshim::kernel::syscalls::LinuxSyscalls;
use suidshim::preexec::Shim;

fn main() {
    let config = ShimConfig::new("test", "/bin/true", CredentialPolicy::Normalize);
    let args: Vec<OsString> = vec![OsString::from("test")];
    let env: Vec<(OsString, OsString)> = Vec::new();

    let shim = Shim::prepare(&config, args, env, &LinuxSyscalls)
        .expect("prepare failed");

    let _ready = shim.transition_credentials();

    // This should fail: shim was moved by the first transition
    let _again = shim.transition_credentials();
}
