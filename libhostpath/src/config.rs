//! Provisioner instance configuration.
//!
//! Environment variables:
//! - `NODE_NAME`: identity of this provisioner instance, normally the name of
//!   the node it runs on.  Required.
//! - `HOSTPATH_TO_USE`: root directory under which volume directories are
//!   created.  Required.
//!
//! The configuration is an ordinary value handed to the provisioner
//! constructor, so several instances can live in one process.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ProvisionError;

/// Environment variable carrying the instance identity.
pub const IDENTITY_ENV: &str = "NODE_NAME";

/// Environment variable carrying the root directory.
pub const ROOT_DIR_ENV: &str = "HOSTPATH_TO_USE";

/// Immutable configuration of one provisioner instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProvisionerConfig {
    /// Base directory for all namespace and volume directories.
    pub root_dir: PathBuf,
    /// Tag stamped on every provisioned volume and checked on delete.
    pub identity: String,
}

impl ProvisionerConfig {
    pub fn new(root_dir: impl Into<PathBuf>, identity: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            identity: identity.into(),
        }
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ProvisionError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.  Missing and
    /// empty values are both treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProvisionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str, hint: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ProvisionError::Configuration {
                    key: key.to_owned(),
                    hint: hint.to_owned(),
                })
        };

        let identity = required(
            IDENTITY_ENV,
            "must be set so that this provisioner can identify itself",
        )?;
        let root_dir = required(
            ROOT_DIR_ENV,
            "must point to the host directory volumes are created in",
        )?;

        Ok(Self::new(root_dir, identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_both_variables() {
        let cfg = ProvisionerConfig::from_lookup(lookup_from(&[
            (IDENTITY_ENV, "node-01"),
            (ROOT_DIR_ENV, "/var/vols"),
        ]))
        .unwrap();
        assert_eq!(cfg, ProvisionerConfig::new("/var/vols", "node-01"));
    }

    #[test]
    fn missing_identity_is_configuration_error() {
        let err = ProvisionerConfig::from_lookup(lookup_from(&[(ROOT_DIR_ENV, "/var/vols")]))
            .unwrap_err();
        assert!(
            matches!(err, ProvisionError::Configuration { ref key, .. } if key == IDENTITY_ENV)
        );
    }

    #[test]
    fn empty_root_is_configuration_error() {
        let err = ProvisionerConfig::from_lookup(lookup_from(&[
            (IDENTITY_ENV, "node-01"),
            (ROOT_DIR_ENV, ""),
        ]))
        .unwrap_err();
        assert!(
            matches!(err, ProvisionError::Configuration { ref key, .. } if key == ROOT_DIR_ENV)
        );
    }
}
