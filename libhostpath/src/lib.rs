//! # libhostpath: host directory volume provisioner for RK8s
//!
//! `libhostpath` turns persistent volume requests into directories on the
//! local host.  It is the core an external provisioning controller drives:
//! the controller watches claims, elects a leader and retries; this crate
//! decides where a volume lives, creates it, and decides whether a given
//! instance may release it.
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |---|---|
//! | [`types`] | Data model: `VolumeRequest`, `VolumeDescriptor`, pass-through attributes. |
//! | [`error`] | [`ProvisionError`] enum covering all failure modes. |
//! | [`config`] | [`ProvisionerConfig`]: root directory and instance identity. |
//! | [`allocator`] | Collision-free backing path allocation. |
//! | [`provisioner`] | [`Provisioner`] trait: provision and delete. |
//! | [`backend`] | Concrete provisioners (host directories). |

pub mod allocator;
pub mod backend;
pub mod config;
pub mod error;
pub mod provisioner;
pub mod types;

// Re-export the most commonly used items at crate root for convenience.
pub use backend::hostpath::{HostPathProvisioner, PROVISIONER_NAME};
pub use config::ProvisionerConfig;
pub use error::ProvisionError;
pub use provisioner::Provisioner;
pub use types::*;
