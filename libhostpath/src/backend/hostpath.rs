//! Host directory backend.
//!
//! [`HostPathProvisioner`] backs every volume with a plain directory under
//! the configured root and tags it with the instance identity, so that
//! one provisioner per node can share a cluster without touching volumes
//! created by its peers.
//!
//! # On-disk layout
//!
//! ```text
//! <root_dir>/
//!   <claim-namespace | "_">/
//!     <claim-name | volume-name>[-NN]/
//! ```

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs::DirBuilder;
use tracing::{debug, info, instrument};

use crate::allocator::{self, DEFAULT_NAMESPACE, DIR_MODE};
use crate::config::ProvisionerConfig;
use crate::error::ProvisionError;
use crate::provisioner::Provisioner;
use crate::types::*;

/// Storage class `provisioner` name served by this backend.
pub const PROVISIONER_NAME: &str = "itix.fr/hostpath";

/// Provisioner that allocates host directories.
pub struct HostPathProvisioner {
    config: ProvisionerConfig,
}

impl HostPathProvisioner {
    pub fn new(config: ProvisionerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProvisionerConfig {
        &self.config
    }

    pub fn identity(&self) -> &str {
        &self.config.identity
    }
}

/// Namespace and directory name a request maps to.  Empty claim fields fall
/// back to the defaults just like absent ones.
fn naming(req: &VolumeRequest) -> (&str, &str) {
    let namespace = req
        .claim_namespace
        .as_deref()
        .filter(|ns| !ns.is_empty())
        .unwrap_or(DEFAULT_NAMESPACE);
    let name = req
        .claim_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(&req.volume_name);
    (namespace, name)
}

/// Create the volume directory itself.  Not recursive: if another call won
/// the race for this path, creation fails instead of silently sharing it.
async fn create_backing_dir(path: &Path) -> Result<(), ProvisionError> {
    DirBuilder::new()
        .mode(DIR_MODE)
        .create(path)
        .await
        .map_err(|e| ProvisionError::allocation(path, e))
}

#[async_trait]
impl Provisioner for HostPathProvisioner {
    fn name(&self) -> &str {
        PROVISIONER_NAME
    }

    #[instrument(skip(self, req), fields(volume = %req.volume_name))]
    async fn provision(&self, req: VolumeRequest) -> Result<VolumeDescriptor, ProvisionError> {
        if req.volume_name.is_empty() {
            return Err(ProvisionError::InvalidArgument(
                "volume name must not be empty".into(),
            ));
        }

        let (namespace, name) = naming(&req);
        let backing_path = allocator::allocate(&self.config.root_dir, namespace, name).await?;
        create_backing_dir(&backing_path).await?;

        let annotations = HashMap::from([
            (IDENTITY_ANNOTATION.to_owned(), self.config.identity.clone()),
            (PROVISIONED_BY_ANNOTATION.to_owned(), PROVISIONER_NAME.to_owned()),
        ]);

        info!(path = %backing_path.display(), %namespace, "volume provisioned");
        Ok(VolumeDescriptor {
            name: req.volume_name,
            backing_path,
            annotations,
            reclaim_policy: req.reclaim_policy,
            access_modes: req.access_modes,
            capacity: req.capacity,
            parameters: req.parameters,
        })
    }

    #[instrument(skip(self, volume), fields(volume = %volume.name))]
    async fn delete(&self, volume: &VolumeDescriptor) -> Result<(), ProvisionError> {
        let owner = volume
            .owner_identity()
            .ok_or_else(|| ProvisionError::MissingAnnotation(volume.name.clone()))?;
        if owner != self.config.identity {
            debug!(%owner, "volume owned by another provisioner");
            return Err(ProvisionError::Ignored(
                "identity annotation on volume does not match ours".into(),
            ));
        }

        // Backing directories are retained on delete: the data stays on the
        // host until an operator removes it.
        info!(
            path = %volume.backing_path.display(),
            "volume released, backing directory retained",
        );
        Ok(())
    }

    async fn probe(&self) -> Result<bool, ProvisionError> {
        let healthy = tokio::fs::metadata(&self.config.root_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        Ok(healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn make_provisioner(dir: &Path, identity: &str) -> HostPathProvisioner {
        HostPathProvisioner::new(ProvisionerConfig::new(dir, identity))
    }

    fn snapshot(dir: &Path) -> Vec<PathBuf> {
        let mut out = Vec::new();
        let mut stack = vec![dir.to_path_buf()];
        while let Some(d) = stack.pop() {
            for entry in std::fs::read_dir(&d).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    stack.push(path.clone());
                }
                out.push(path);
            }
        }
        out.sort();
        out
    }

    #[test]
    fn naming_defaults() {
        let req = VolumeRequest::new("pvc-1");
        assert_eq!(naming(&req), ("_", "pvc-1"));

        let req = VolumeRequest::new("pvc-1").with_claim("", "");
        assert_eq!(naming(&req), ("_", "pvc-1"));

        let req = VolumeRequest::new("pvc-1").with_claim("team-a", "db");
        assert_eq!(naming(&req), ("team-a", "db"));
    }

    #[tokio::test]
    async fn provision_creates_directory_and_stamps_identity() {
        let tmp = tempfile::tempdir().unwrap();
        let prov = make_provisioner(tmp.path(), "node-a");

        let req = VolumeRequest {
            reclaim_policy: ReclaimPolicy::Retain,
            access_modes: vec![AccessMode::ReadWriteOnce, AccessMode::ReadOnlyMany],
            capacity: Some("5Gi".into()),
            parameters: HashMap::from([("tier".into(), "fast".into())]),
            ..VolumeRequest::new("pvc-123").with_claim("default", "data")
        };
        let vol = prov.provision(req).await.unwrap();

        assert_eq!(vol.name, "pvc-123");
        assert_eq!(vol.backing_path, tmp.path().join("default/data"));
        assert!(vol.backing_path.is_dir());
        assert!(vol.backing_path.starts_with(tmp.path()));
        assert_eq!(vol.owner_identity(), Some("node-a"));
        assert_eq!(vol.provisioned_by(), Some(PROVISIONER_NAME));
        assert_eq!(vol.reclaim_policy, ReclaimPolicy::Retain);
        assert_eq!(
            vol.access_modes,
            vec![AccessMode::ReadWriteOnce, AccessMode::ReadOnlyMany]
        );
        assert_eq!(vol.capacity.as_deref(), Some("5Gi"));
        assert_eq!(vol.parameters.get("tier").map(String::as_str), Some("fast"));
    }

    #[tokio::test]
    async fn repeated_claim_gets_suffix() {
        let tmp = tempfile::tempdir().unwrap();
        let prov = make_provisioner(tmp.path(), "node-a");

        let first = prov
            .provision(VolumeRequest::new("pvc-1").with_claim("default", "data"))
            .await
            .unwrap();
        let second = prov
            .provision(VolumeRequest::new("pvc-2").with_claim("default", "data"))
            .await
            .unwrap();

        assert_eq!(first.backing_path, tmp.path().join("default/data"));
        assert_eq!(second.backing_path, tmp.path().join("default/data-01"));
        assert!(second.backing_path.is_dir());
    }

    #[tokio::test]
    async fn missing_claim_uses_sentinel_namespace() {
        let tmp = tempfile::tempdir().unwrap();
        let prov = make_provisioner(tmp.path(), "node-a");

        let vol = prov.provision(VolumeRequest::new("pvc-777")).await.unwrap();
        assert_eq!(vol.backing_path, tmp.path().join("_/pvc-777"));
    }

    #[tokio::test]
    async fn empty_volume_name_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let prov = make_provisioner(tmp.path(), "node-a");

        let err = prov.provision(VolumeRequest::default()).await.unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidArgument(_)));
        assert!(snapshot(tmp.path()).is_empty());
    }

    #[tokio::test]
    async fn exhaustion_creates_no_volume_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let ns = tmp.path().join("default");
        std::fs::create_dir_all(ns.join("data")).unwrap();
        for i in 1..=allocator::MAX_SUFFIX {
            std::fs::create_dir(ns.join(format!("data-{i:02}"))).unwrap();
        }
        let before = snapshot(tmp.path());
        let prov = make_provisioner(tmp.path(), "node-a");

        let err = prov
            .provision(VolumeRequest::new("pvc-1").with_claim("default", "data"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::Exhausted { .. }));
        assert_eq!(snapshot(tmp.path()), before);
    }

    #[tokio::test]
    async fn lost_race_fails_volume_creation() {
        let tmp = tempfile::tempdir().unwrap();

        // Two callers both see the same path as free...
        let a = allocator::allocate(tmp.path(), "default", "data").await.unwrap();
        let b = allocator::allocate(tmp.path(), "default", "data").await.unwrap();
        assert_eq!(a, b);

        // ...and only the first directory creation wins.
        create_backing_dir(&a).await.unwrap();
        let err = create_backing_dir(&b).await.unwrap_err();
        assert!(matches!(err, ProvisionError::Allocation { .. }));
    }

    #[tokio::test]
    async fn delete_matching_identity_retains_data() {
        let tmp = tempfile::tempdir().unwrap();
        let prov = make_provisioner(tmp.path(), "node-a");
        let vol = prov.provision(VolumeRequest::new("pvc-1")).await.unwrap();
        std::fs::write(vol.backing_path.join("payload"), b"keep me").unwrap();
        let before = snapshot(tmp.path());

        prov.delete(&vol).await.unwrap();
        assert_eq!(snapshot(tmp.path()), before);

        // Idempotent.
        prov.delete(&vol).await.unwrap();
        assert_eq!(snapshot(tmp.path()), before);
        assert_eq!(
            std::fs::read(vol.backing_path.join("payload")).unwrap(),
            b"keep me"
        );
    }

    #[tokio::test]
    async fn delete_foreign_volume_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let owner = make_provisioner(tmp.path(), "node-a");
        let other = make_provisioner(tmp.path(), "node-b");
        let vol = owner.provision(VolumeRequest::new("pvc-1")).await.unwrap();
        let before = snapshot(tmp.path());

        for _ in 0..2 {
            let err = other.delete(&vol).await.unwrap_err();
            assert!(err.is_ignored());
            assert!(!err.is_retryable());
        }
        assert_eq!(snapshot(tmp.path()), before);
    }

    #[tokio::test]
    async fn delete_without_annotation_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let prov = make_provisioner(tmp.path(), "node-a");
        let mut vol = prov.provision(VolumeRequest::new("pvc-1")).await.unwrap();
        vol.annotations.remove(IDENTITY_ANNOTATION);
        let before = snapshot(tmp.path());

        for _ in 0..2 {
            let err = prov.delete(&vol).await.unwrap_err();
            assert_eq!(err, ProvisionError::MissingAnnotation("pvc-1".into()));
        }
        assert_eq!(snapshot(tmp.path()), before);
    }

    #[tokio::test]
    async fn probe_healthy_root() {
        let tmp = tempfile::tempdir().unwrap();
        let prov = make_provisioner(tmp.path(), "node-a");
        assert!(prov.probe().await.unwrap());
    }

    #[tokio::test]
    async fn probe_missing_root() {
        let prov = make_provisioner(Path::new("/nonexistent/path/for/test"), "node-a");
        assert!(!prov.probe().await.unwrap());
    }

    #[tokio::test]
    async fn provisioner_name() {
        let tmp = tempfile::tempdir().unwrap();
        let prov = make_provisioner(tmp.path(), "node-a");
        assert_eq!(prov.name(), "itix.fr/hostpath");
    }
}
