// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CONTEXT: `fwutil` command-line front end for the firmware platform facade
//! OWNERS: @runtime
//! PURPOSE: Inspect and change platform properties, write-protect state, reboot
//! NOTE: Command-line tool; no library API

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use fwutil::{PlatformConfig, ReadMode, SystemUtility};

#[derive(Debug, Parser)]
#[command(name = "fwutil", version, about = "Firmware platform control utility")]
struct Cli {
    /// TOML configuration file (tools, property keys, reboot timing)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Kill external commands that run longer than this
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a property value
    Get {
        key: String,
        /// Exit with status 1 instead of aborting when the key cannot be read
        #[arg(long)]
        optional: bool,
    },
    /// Set a property value
    Set { key: String, value: String },
    /// Show or set the startup update tries counter
    Tries {
        #[arg(long, allow_negative_numbers = true, value_name = "N")]
        set: Option<i32>,
    },
    /// Show or set the new firmware (slot B) tries counter
    FwTries {
        #[arg(long, allow_negative_numbers = true, value_name = "N")]
        set: Option<i32>,
    },
    /// Show TPM firmware and kernel key versions
    KeyVersions,
    /// Report whether the system booted in one-stop (RO-Normal) mode
    OneStop,
    /// Report write protection status
    Wp {
        #[command(subcommand)]
        kind: WpKind,
    },
    /// Clear non-volatile (CMOS / NVRAM) data
    NvramClear,
    /// Flush storage and restart the system
    Reboot {
        /// Confirm the reboot
        #[arg(long)]
        yes: bool,
    },
    /// Check that the configured external tools are installed
    Doctor,
}

#[derive(Debug, Subcommand)]
enum WpKind {
    /// Hardware write-protect switch
    Hardware,
    /// Flash software write protection on a bus target
    Software { target: String },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("fwutil: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>, timeout: Option<u64>) -> anyhow::Result<PlatformConfig> {
    let mut config = match path {
        Some(path) => PlatformConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PlatformConfig::default(),
    };
    if let Some(secs) = timeout {
        if secs == 0 {
            bail!("--timeout must be positive");
        }
        config.command_timeout = Some(Duration::from_secs(secs));
    }
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = load_config(cli.config.as_deref(), cli.timeout)?;
    log::debug!("config: {config:?}");
    let util = SystemUtility::new(config);

    match cli.command {
        Command::Get { key, optional } => {
            let mode = if optional { ReadMode::Optional } else { ReadMode::Required };
            match util.get_property(&key, mode) {
                Some(value) => {
                    println!("{}", value.trim_end_matches('\n'));
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        Command::Set { key, value } => {
            let ok = util.set_property(&key, &value);
            if !ok {
                util.diagnostics().alert(&format!("Failed to set {key}={value}"));
            }
            Ok(ok)
        }
        Command::Tries { set: Some(tries) } => Ok(util.set_startup_update_tries(tries)),
        Command::Tries { set: None } => {
            println!("{}", util.startup_update_tries());
            Ok(true)
        }
        Command::FwTries { set: Some(tries) } => Ok(util.set_new_firmware_tries(tries)),
        Command::FwTries { set: None } => {
            println!("{}", util.new_firmware_tries());
            Ok(true)
        }
        Command::KeyVersions => {
            println!("firmware: {:#x}", util.firmware_key_version());
            println!("kernel: {:#x}", util.kernel_key_version());
            Ok(true)
        }
        Command::OneStop => {
            println!("{}", util.is_one_stop_mode());
            Ok(true)
        }
        Command::Wp { kind: WpKind::Hardware } => {
            let state = if util.is_hardware_write_protected() { "enabled" } else { "disabled" };
            println!("{state}");
            Ok(true)
        }
        Command::Wp { kind: WpKind::Software { target } } => {
            println!("{}", util.software_write_protect(&target));
            Ok(true)
        }
        Command::NvramClear => {
            let ok = util.clear_non_volatile_data();
            if !ok {
                util.diagnostics().alert("Failed to clear non-volatile data");
            }
            Ok(ok)
        }
        Command::Reboot { yes: false } => bail!("refusing to reboot without --yes"),
        Command::Reboot { yes: true } => util.reboot(),
        Command::Doctor => {
            let missing = util.missing_tools();
            for tool in &missing {
                println!("missing: {tool}");
            }
            if missing.is_empty() {
                println!("all tools available");
            }
            Ok(missing.is_empty())
        }
    }
}
