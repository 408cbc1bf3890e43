//! Core provisioning types: requests, volume descriptors, and the
//! pass-through attributes copied between them.
//!
//! All types are [`Serialize`]/[`Deserialize`] so descriptors can be stored
//! by the orchestrator and handed back to `delete` as JSON.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Annotation key holding the identity of the instance that provisioned a
/// volume.
pub const IDENTITY_ANNOTATION: &str = "hostPathProvisionerIdentity";

/// Annotation key recording which provisioner (by name) created a volume.
pub const PROVISIONED_BY_ANNOTATION: &str = "pv.kubernetes.io/provisioned-by";

// ---------------------------------------------------------------------------
// Pass-through attributes
// ---------------------------------------------------------------------------

/// What the orchestrator should do with the storage once its claim is
/// released.  Not enforced by the provisioner.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReclaimPolicy {
    Retain,
    #[default]
    Delete,
    Recycle,
}

impl fmt::Display for ReclaimPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Retain => "Retain",
            Self::Delete => "Delete",
            Self::Recycle => "Recycle",
        };
        f.write_str(s)
    }
}

/// Describes how a volume may be accessed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccessMode {
    /// Single-node read-write.
    ReadWriteOnce,
    /// Multi-node read-only.
    ReadOnlyMany,
    /// Multi-node read-write.
    ReadWriteMany,
    /// Single-pod read-write.
    ReadWriteOncePod,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Request to provision a new volume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeRequest {
    /// Unique volume name assigned by the orchestrator.
    pub volume_name: String,
    /// Namespace of the claim, if any.
    #[serde(default)]
    pub claim_namespace: Option<String>,
    /// Name of the claim, if any.
    #[serde(default)]
    pub claim_name: Option<String>,
    #[serde(default)]
    pub reclaim_policy: ReclaimPolicy,
    #[serde(default)]
    pub access_modes: Vec<AccessMode>,
    /// Requested storage quantity, e.g. `"1Gi"`.  Recorded, never enforced.
    #[serde(default)]
    pub capacity: Option<String>,
    /// Storage class parameters, forwarded untouched.
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

impl VolumeRequest {
    /// Shorthand for a request that only carries a volume name.
    pub fn new(volume_name: impl Into<String>) -> Self {
        Self {
            volume_name: volume_name.into(),
            ..Default::default()
        }
    }

    /// Attach the claim this volume is provisioned for.
    pub fn with_claim(mut self, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        self.claim_namespace = Some(namespace.into());
        self.claim_name = Some(name.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Volume descriptor
// ---------------------------------------------------------------------------

/// A provisioned volume, as returned by `provision` and later handed back to
/// `delete`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeDescriptor {
    /// Equal to [`VolumeRequest::volume_name`].
    pub name: String,
    /// Host directory backing the volume.
    pub backing_path: PathBuf,
    /// Object annotations; carries [`IDENTITY_ANNOTATION`].
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    pub reclaim_policy: ReclaimPolicy,
    #[serde(default)]
    pub access_modes: Vec<AccessMode>,
    #[serde(default)]
    pub capacity: Option<String>,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

impl VolumeDescriptor {
    /// Identity of the provisioner instance that created this volume, or
    /// `None` when the annotation is absent.
    pub fn owner_identity(&self) -> Option<&str> {
        self.annotations.get(IDENTITY_ANNOTATION).map(String::as_str)
    }

    /// Name of the provisioner that created this volume, if recorded.
    pub fn provisioned_by(&self) -> Option<&str> {
        self.annotations
            .get(PROVISIONED_BY_ANNOTATION)
            .map(String::as_str)
    }
}
