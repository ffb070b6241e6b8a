use crate::config::presets::Preset;
use crate::config::types::{CredentialPolicy, Result, ShimConfig, ShimError};
use crate::deploy::verify_deployment;
use crate::exec::argv::ArgumentVector;
use crate::exec::executor::run_shim;
use crate::kernel::syscalls::{LinuxSyscalls, ProcessSyscalls};
use crate::utils::env_hygiene::{dropped_variables, EnvPolicy};
use clap::{Parser, Subcommand};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

/// Entry point of the installed setuid binaries. Takes no flags of its own:
/// every argument after argv[0] goes to the target.
pub fn run_preset(preset: Preset) -> ExitCode {
    env_logger::init();

    let config = preset.config();
    let err = match run_shim(&config, env::args_os(), env::vars_os(), &LinuxSyscalls) {
        Ok(never) => match never {},
        Err(e) => e,
    };

    log::debug!("{} failed: {:?}", config.name, err);
    eprintln!("{}: {}", config.name, err);
    ExitCode::from(err.exit_code())
}

#[derive(Parser)]
#[command(name = "suidshim", author, version, about = "Inspect, verify and stage setuid exec shims", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in shim presets
    List,
    /// Print a preset as JSON
    Show {
        /// Preset or installed binary name
        preset: String,
    },
    /// Print the argument vector a preset would exec, without running it
    Plan {
        /// Preset or installed binary name
        preset: String,
        /// Arguments as the caller would pass them to the shim
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<OsString>,
    },
    /// Check that an installed shim and its target satisfy the deployment contract
    Verify {
        /// Preset or installed binary name
        preset: String,
        /// Path of the installed shim binary
        #[arg(long)]
        binary: PathBuf,
    },
    /// Run the shim sequence in-process against a preset, config file, or target
    Run {
        /// Built-in preset to stage
        #[arg(long, conflicts_with_all = ["config", "target"])]
        preset: Option<String>,
        /// JSON shim description
        #[arg(long, conflicts_with = "target")]
        config: Option<PathBuf>,
        /// Absolute path of a stand-in target executable
        #[arg(long)]
        target: Option<PathBuf>,
        /// Credential policy for --target
        #[arg(long, default_value = "normalize")]
        credentials: CredentialPolicy,
        /// Fixed flag inserted before forwarded arguments (with --target)
        #[arg(long, requires = "target", allow_hyphen_values = true)]
        flag: Option<String>,
        /// Forward only these environment variables (with --target; repeatable)
        #[arg(long = "env-allow", value_name = "VAR", requires = "target")]
        env_allow: Vec<String>,
        /// Arguments forwarded to the target
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<OsString>,
    },
}

fn lookup_preset(name: &str) -> Result<Preset> {
    Preset::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
        ShimError::Config(format!(
            "unknown preset '{}' (known: {})",
            name,
            known.join(", ")
        ))
    })
}

/// The admin tool stages arbitrary targets, so it must never run with
/// borrowed privileges.
fn refuse_setuid<S: ProcessSyscalls + ?Sized>(sys: &S) -> Result<()> {
    if sys.getuid() != sys.geteuid() || sys.getgid() != sys.getegid() {
        return Err(ShimError::Config(
            "suidshim must not be installed setuid or setgid; use the preset binaries".to_string(),
        ));
    }
    Ok(())
}

fn staged_config(
    preset: Option<String>,
    config: Option<PathBuf>,
    target: Option<PathBuf>,
    credentials: CredentialPolicy,
    flag: Option<String>,
    env_allow: Vec<String>,
) -> Result<ShimConfig> {
    if let Some(name) = preset {
        return Ok(lookup_preset(&name)?.config());
    }
    if let Some(path) = config {
        return ShimConfig::from_json_file(&path);
    }
    let target = target.ok_or_else(|| {
        ShimError::Config("one of --preset, --config or --target is required".to_string())
    })?;

    let mut staged = ShimConfig::new("suidshim", target, credentials);
    staged.mode_flag = flag;
    if !env_allow.is_empty() {
        staged.env = EnvPolicy::AllowList { vars: env_allow };
    }
    staged.validate()?;
    Ok(staged)
}

pub fn run() -> anyhow::Result<()> {
    // Initialize structured logging
    env_logger::init();

    let cli = Cli::parse();
    refuse_setuid(&LinuxSyscalls)?;

    match cli.command {
        Commands::List => {
            for preset in Preset::ALL {
                let config = preset.config();
                println!(
                    "{}\t{}\t{}\t{}",
                    preset.name(),
                    preset.binary_name(),
                    config.credentials,
                    config.target.display()
                );
            }
            Ok(())
        }
        Commands::Show { preset } => {
            let config = lookup_preset(&preset)?.config();
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Plan { preset, args } => {
            let preset = lookup_preset(&preset)?;
            let config = preset.config();
            let caller_args = std::iter::once(OsString::from(preset.binary_name())).chain(args);
            let argv = ArgumentVector::build(&config.target, config.mode_flag.as_deref(), caller_args)?;
            let env: Vec<(OsString, OsString)> = env::vars_os().collect();

            let plan = serde_json::json!({
                "shim": config.name,
                "target": config.target,
                "credentials": config.credentials,
                "argv": argv.to_strings(),
                "env_policy": config.env,
                "dropped_env": dropped_variables(&config.env, &env),
            });
            println!("{}", serde_json::to_string_pretty(&plan)?);
            Ok(())
        }
        Commands::Verify { preset, binary } => {
            let config = lookup_preset(&preset)?.config();
            let report = verify_deployment(&binary, &config);
            if report.is_ok() {
                println!("{}: ok", binary.display());
                return Ok(());
            }
            for issue in &report.issues {
                eprintln!("{}", issue);
            }
            Err(ShimError::Deploy(format!("{} problem(s) found", report.issues.len())).into())
        }
        Commands::Run {
            preset,
            config,
            target,
            credentials,
            flag,
            env_allow,
            args,
        } => {
            let config = staged_config(preset, config, target, credentials, flag, env_allow)?;
            let caller_args = std::iter::once(OsString::from("suidshim")).chain(args);
            let err = match run_shim(&config, caller_args, env::vars_os(), &LinuxSyscalls) {
                Ok(never) => match never {},
                Err(e) => e,
            };
            eprintln!("suidshim: {}", err);
            std::process::exit(i32::from(err.exit_code()));
        }
    }
}
