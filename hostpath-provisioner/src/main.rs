//! Host directory provisioner process.
//!
//! Environment variables:
//! - `NODE_NAME`: identity of this instance (required).
//! - `HOSTPATH_TO_USE`: root directory for volumes (required).
//! - `RUST_LOG`: log filter, defaults to `info`.
//!
//! `delete` prints `deleted` or `ignored` on stdout and exits 0 for both;
//! `ignored` means the volume belongs to another instance.

mod cli;
mod commands;

use anyhow::{Context, Result, bail};
use clap::Parser;
use nix::sys::stat::{Mode, umask};
use tracing::info;
use tracing_subscriber::EnvFilter;

use libhostpath::{HostPathProvisioner, PROVISIONER_NAME, Provisioner, ProvisionerConfig};

use crate::cli::{Cli, Command, LogFormat};
use crate::commands::{delete_volume, read_descriptor};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Load the instance configuration from the environment and build the
/// provisioner.
fn load_provisioner() -> Result<HostPathProvisioner> {
    let config = ProvisionerConfig::from_env().context("Invalid provisioner configuration")?;
    info!(
        identity = %config.identity,
        root_dir = %config.root_dir.display(),
        "hostpath provisioner starting",
    );
    Ok(HostPathProvisioner::new(config))
}

async fn ensure_root(provisioner: &HostPathProvisioner) -> Result<()> {
    if !provisioner.probe().await? {
        bail!(
            "root directory {} is missing or not a directory",
            provisioner.config().root_dir.display()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Directory modes are applied verbatim.
    umask(Mode::empty());

    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Command::Name => println!("{PROVISIONER_NAME}"),
        Command::Probe => {
            let provisioner = load_provisioner()?;
            let healthy = provisioner.probe().await?;
            println!("{healthy}");
            if !healthy {
                bail!("root directory is missing or not a directory");
            }
        }
        Command::Provision(args) => {
            let provisioner = load_provisioner()?;
            ensure_root(&provisioner).await?;
            let volume = provisioner.provision(args.into()).await?;
            println!("{}", serde_json::to_string_pretty(&volume)?);
        }
        Command::Delete { descriptor } => {
            let provisioner = load_provisioner()?;
            ensure_root(&provisioner).await?;
            let volume = read_descriptor(&descriptor).await?;
            let outcome = delete_volume(&provisioner, &volume).await?;
            println!("{outcome}");
        }
    }
    Ok(())
}
