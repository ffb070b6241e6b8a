use std::process::ExitCode;

fn main() -> ExitCode {
    suidshim::cli::run_preset(suidshim::config::presets::Preset::EdskmgrEject)
}
