//! Provisioner error types.
//!
//! Every failure surfaced by `libhostpath` is a [`ProvisionError`].  The enum
//! derives [`thiserror::Error`] and also implements
//! [`Serialize`]/[`Deserialize`] so a controller can record the outcome of a
//! call next to the volume it concerns.
//!
//! [`ProvisionError::Ignored`] is not a failure: it tells the controller that
//! the volume belongs to another provisioner instance.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for provisioning operations.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    /// Required process configuration is missing or empty.
    #[error("missing required configuration {key}: {hint}")]
    Configuration {
        /// Name of the missing setting (environment variable).
        key: String,
        /// What the operator should do about it.
        hint: String,
    },

    /// Creating a namespace or volume directory failed.
    #[error("allocation failed at {path}: {reason}")]
    Allocation {
        /// Directory that could not be created.
        path: String,
        /// Underlying I/O failure.
        reason: String,
    },

    /// Every disambiguation suffix for `name` is already taken.
    #[error("could not find an unused name for {name} in {namespace_dir}")]
    Exhausted {
        /// The requested (undecorated) name.
        name: String,
        /// Namespace directory that was searched.
        namespace_dir: String,
    },

    /// The volume carries no owner identity annotation.
    #[error("identity annotation not found on volume {0}")]
    MissingAnnotation(String),

    /// The volume is owned by another provisioner instance.
    #[error("ignored: {0}")]
    Ignored(String),

    /// The caller supplied an invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ProvisionError {
    /// Create a [`ProvisionError::Allocation`] for `path` from any
    /// displayable failure.
    pub fn allocation<E: std::fmt::Display>(path: &Path, e: E) -> Self {
        Self::Allocation {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
    }

    /// `true` for the ownership-mismatch outcome of a delete.
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }

    /// Whether a controller may retry the same call against this instance.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Allocation { .. } | Self::Exhausted { .. })
    }
}
