//! Remote directory allocation
//!
//! Claims a new directory by creating it directly: the remote `mkdir` is the
//! atomic create-if-absent check, so there is no separate existence probe.
//! Any creation failure moves on to the next candidate; collisions are not
//! told apart from other errors.

use tracing::{debug, info};

use super::error::UploadError;
use super::naming::NamingPolicy;
use crate::sftp::path_utils::join_remote_path;
use crate::sftp::RemoteFs;

/// Create a fresh randomly named directory under `parent`
pub async fn allocate_dir<R>(
    fs: &R,
    parent: &str,
    policy: NamingPolicy,
) -> Result<String, UploadError>
where
    R: RemoteFs + ?Sized,
{
    allocate_dir_from(fs, parent, policy.candidates()).await
}

/// Try each candidate name under `parent` until one is created
pub async fn allocate_dir_from<R, I>(
    fs: &R,
    parent: &str,
    candidates: I,
) -> Result<String, UploadError>
where
    R: RemoteFs + ?Sized,
    I: IntoIterator<Item = String>,
{
    let mut attempts = 0;
    for name in candidates {
        attempts += 1;
        let path = join_remote_path(parent, &name);
        match fs.create_dir(&path).await {
            Ok(()) => {
                info!("Created {} (attempt {})", path, attempts);
                return Ok(path);
            }
            Err(e) => debug!("Cannot create {}: {}", path, e),
        }
    }

    Err(UploadError::NameSpaceExhausted {
        parent: parent.to_string(),
        attempts,
    })
}
