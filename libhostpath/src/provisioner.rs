//! Provisioner trait.
//!
//! This is the surface an external provisioning controller drives: it calls
//! [`Provisioner::provision`] once per creation intent and
//! [`Provisioner::delete`] once per deletion intent, and owns watching,
//! retries and leader election itself.

use async_trait::async_trait;

use crate::error::ProvisionError;
use crate::types::{VolumeDescriptor, VolumeRequest};

/// Dynamic volume provisioner.
///
/// Implementations keep no per-volume state: everything needed to act on a
/// volume travels in the [`VolumeDescriptor`] and on the filesystem.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Name matched against the `provisioner` field of a storage class.
    fn name(&self) -> &str;

    /// Create the backing storage for `req` and describe it.
    ///
    /// The returned descriptor is tagged with this instance's identity.
    async fn provision(&self, req: VolumeRequest) -> Result<VolumeDescriptor, ProvisionError>;

    /// Release a volume previously returned by [`Self::provision`].
    ///
    /// Returns [`ProvisionError::Ignored`] when the volume belongs to another
    /// instance.  Safe to call repeatedly with the same descriptor.
    async fn delete(&self, volume: &VolumeDescriptor) -> Result<(), ProvisionError>;

    /// Liveness probe.  Returns `true` when the backing storage is usable.
    async fn probe(&self) -> Result<bool, ProvisionError>;
}
