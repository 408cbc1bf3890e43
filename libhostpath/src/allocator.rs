//! Backing path allocation.
//!
//! [`allocate`] maps a `(namespace, name)` pair onto a directory under the
//! provisioner root:
//!
//! ```text
//! <root>/
//!   <namespace>/
//!     <name>/        # first volume for this claim name
//!     <name>-01/     # next one, on collision
//!     ...
//!     <name>-99/     # last candidate before giving up
//! ```
//!
//! The allocator only decides the path.  It creates the namespace directory
//! when missing, but never the volume directory itself; that is left to the
//! caller.  Existence is checked first and the directory is created later,
//! so two calls racing on the same name can pick the same path.  The second
//! `create_dir` then fails, which callers must surface as an error.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tokio::fs::DirBuilder;
use tracing::{debug, warn};

use crate::error::ProvisionError;

/// Namespace used when the request carries no claim namespace.
pub const DEFAULT_NAMESPACE: &str = "_";

/// Highest disambiguation suffix tried before giving up.
pub const MAX_SUFFIX: u32 = 99;

/// Mode for directories created under the root.  The process umask still
/// applies; the binary clears it at startup.
pub const DIR_MODE: u32 = 0o777;

/// Pick an unused path for `name` inside `root/namespace`.
///
/// Returns `root/namespace/name` if that does not exist yet, otherwise the
/// first free `name-NN` with `NN` in `01..=99`.
pub async fn allocate(
    root: &Path,
    namespace: &str,
    name: &str,
) -> Result<PathBuf, ProvisionError> {
    validate_component("namespace", namespace)?;
    validate_component("name", name)?;

    let namespace_dir = root.join(namespace);
    ensure_namespace_dir(&namespace_dir).await?;

    // Symlinks are not followed: a dangling link still occupies its name.
    let candidate = namespace_dir.join(name);
    if tokio::fs::symlink_metadata(&candidate).await.is_err() {
        debug!(path = %candidate.display(), "allocated primary path");
        return Ok(candidate);
    }

    for i in 1..=MAX_SUFFIX {
        let candidate = namespace_dir.join(format!("{name}-{i:02}"));
        match tokio::fs::symlink_metadata(&candidate).await {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %candidate.display(), suffix = i, "allocated disambiguated path");
                return Ok(candidate);
            }
            _ => continue,
        }
    }

    warn!(
        namespace_dir = %namespace_dir.display(),
        %name,
        "all disambiguation suffixes in use",
    );
    Err(ProvisionError::Exhausted {
        name: name.to_owned(),
        namespace_dir: namespace_dir.display().to_string(),
    })
}

/// Create the namespace directory (and missing ancestors) when absent.
async fn ensure_namespace_dir(namespace_dir: &Path) -> Result<(), ProvisionError> {
    match tokio::fs::metadata(namespace_dir).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            DirBuilder::new()
                .recursive(true)
                .mode(DIR_MODE)
                .create(namespace_dir)
                .await
                .map_err(|e| ProvisionError::allocation(namespace_dir, e))?;
            debug!(path = %namespace_dir.display(), "created namespace directory");
            Ok(())
        }
        Err(e) => Err(ProvisionError::allocation(namespace_dir, e)),
    }
}

/// Reject anything that is not a single, normal path component, so the
/// allocated path can never leave the root.
fn validate_component(kind: &str, value: &str) -> Result<(), ProvisionError> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(c)), None) if c == value => Ok(()),
        _ => Err(ProvisionError::InvalidArgument(format!(
            "{kind} {value:?} is not a single path component"
        ))),
    }
}
