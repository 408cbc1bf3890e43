//! Command handlers that do not depend on process state, so they can be
//! driven from tests.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tracing::warn;

use libhostpath::{Provisioner, VolumeDescriptor};

/// Result of a `delete` call as reported on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The volume was ours and has been released.
    Deleted,
    /// The volume belongs to another instance; this one must not act on it.
    Ignored,
}

impl fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deleted => f.write_str("deleted"),
            Self::Ignored => f.write_str("ignored"),
        }
    }
}

/// Read a volume descriptor as JSON from `path`, or from stdin when `path`
/// is `-`.
pub async fn read_descriptor(path: &Path) -> Result<VolumeDescriptor> {
    let json = if path.as_os_str() == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read descriptor from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read descriptor {}", path.display()))?
    };
    serde_json::from_str(&json).context("Failed to parse volume descriptor")
}

/// Release `volume`, mapping an ownership mismatch to
/// [`DeleteOutcome::Ignored`] rather than an error.
pub async fn delete_volume<P>(provisioner: &P, volume: &VolumeDescriptor) -> Result<DeleteOutcome>
where
    P: Provisioner + ?Sized,
{
    match provisioner.delete(volume).await {
        Ok(()) => Ok(DeleteOutcome::Deleted),
        Err(e) if e.is_ignored() => {
            warn!(volume = %volume.name, reason = %e, "volume not owned by this instance");
            Ok(DeleteOutcome::Ignored)
        }
        Err(e) => Err(e.into()),
    }
}
