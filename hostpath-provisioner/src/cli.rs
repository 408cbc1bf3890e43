//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use libhostpath::{AccessMode, ReclaimPolicy, VolumeRequest};

#[derive(Parser, Debug)]
#[command(name = "hostpath-provisioner", version, about = "Host directory volume provisioner")]
pub struct Cli {
    /// Log output format written to stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Provision a volume and print its descriptor as JSON.
    Provision(ProvisionArgs),
    /// Release a volume described by a JSON descriptor.
    Delete {
        /// Descriptor file, or `-` for stdin.
        #[arg(long)]
        descriptor: PathBuf,
    },
    /// Check that the root directory is usable.
    Probe,
    /// Print the storage class provisioner name.
    Name,
}

#[derive(Args, Debug)]
pub struct ProvisionArgs {
    #[arg(long)]
    pub volume_name: String,
    #[arg(long)]
    pub namespace: Option<String>,
    #[arg(long)]
    pub claim_name: Option<String>,
    #[arg(long, value_enum, default_value_t = ReclaimArg::Delete)]
    pub reclaim_policy: ReclaimArg,
    /// May be repeated.
    #[arg(long = "access-mode", value_enum)]
    pub access_modes: Vec<AccessModeArg>,
    /// Requested size, e.g. `10Gi`.
    #[arg(long)]
    pub capacity: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReclaimArg {
    Retain,
    Delete,
    Recycle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AccessModeArg {
    ReadWriteOnce,
    ReadOnlyMany,
    ReadWriteMany,
    ReadWriteOncePod,
}

impl From<ReclaimArg> for ReclaimPolicy {
    fn from(arg: ReclaimArg) -> Self {
        match arg {
            ReclaimArg::Retain => Self::Retain,
            ReclaimArg::Delete => Self::Delete,
            ReclaimArg::Recycle => Self::Recycle,
        }
    }
}

impl From<AccessModeArg> for AccessMode {
    fn from(arg: AccessModeArg) -> Self {
        match arg {
            AccessModeArg::ReadWriteOnce => Self::ReadWriteOnce,
            AccessModeArg::ReadOnlyMany => Self::ReadOnlyMany,
            AccessModeArg::ReadWriteMany => Self::ReadWriteMany,
            AccessModeArg::ReadWriteOncePod => Self::ReadWriteOncePod,
        }
    }
}

impl From<ProvisionArgs> for VolumeRequest {
    fn from(args: ProvisionArgs) -> Self {
        Self {
            volume_name: args.volume_name,
            claim_namespace: args.namespace,
            claim_name: args.claim_name,
            reclaim_policy: args.reclaim_policy.into(),
            access_modes: args.access_modes.into_iter().map(Into::into).collect(),
            capacity: args.capacity,
            parameters: Default::default(),
        }
    }
}
