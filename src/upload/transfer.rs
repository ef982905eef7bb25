//! File transfer into the allocated directory
//!
//! Files are copied one at a time, in order. The first failure stops the
//! run; files already copied stay where they are.

use std::path::{Path, PathBuf};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

use super::error::{TransferError, UploadError};
use super::pool::BufferPool;
use crate::sftp::path_utils::{join_remote_path, local_base_name};
use crate::sftp::RemoteFs;

/// Copy one local file to `remote_dir/<base name>`, returning bytes written.
///
/// The remote handle is explicitly closed at the end so a failing close is
/// reported instead of lost on drop.
pub async fn upload_file<R>(
    fs: &R,
    pool: &BufferPool,
    local_path: &Path,
    remote_dir: &str,
) -> Result<u64, TransferError>
where
    R: RemoteFs + ?Sized,
{
    let mut local_file = tokio::fs::File::open(local_path)
        .await
        .map_err(TransferError::LocalOpen)?;

    let name = local_base_name(local_path).ok_or_else(|| {
        TransferError::LocalOpen(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no file name",
        ))
    })?;
    let remote_path = join_remote_path(remote_dir, &name);

    let mut remote_file = fs
        .create(&remote_path)
        .await
        .map_err(TransferError::RemoteCreate)?;

    let mut buffer = pool.checkout();
    let mut transferred = 0u64;

    loop {
        let bytes_read = local_file
            .read(&mut buffer)
            .await
            .map_err(TransferError::LocalRead)?;

        if bytes_read == 0 {
            break;
        }

        remote_file
            .write_all(&buffer[..bytes_read])
            .await
            .map_err(TransferError::RemoteWrite)?;

        transferred += bytes_read as u64;
    }

    remote_file
        .shutdown()
        .await
        .map_err(TransferError::RemoteClose)?;

    debug!("Uploaded {} -> {} ({} bytes)", local_path.display(), remote_path, transferred);
    Ok(transferred)
}

/// Outcome of a completed transfer run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSummary {
    /// Remote paths written, in input order
    pub uploaded: Vec<String>,
    pub bytes: u64,
}

/// Upload `files` into `remote_dir` sequentially, stopping at the first failure.
pub async fn upload_files<R>(
    fs: &R,
    pool: &BufferPool,
    files: &[PathBuf],
    remote_dir: &str,
) -> Result<TransferSummary, UploadError>
where
    R: RemoteFs + ?Sized,
{
    let mut summary = TransferSummary {
        uploaded: Vec::with_capacity(files.len()),
        bytes: 0,
    };

    for file in files {
        let bytes = upload_file(fs, pool, file, remote_dir)
            .await
            .map_err(|source| UploadError::Transfer {
                remote_dir: remote_dir.to_string(),
                file: file.clone(),
                source,
            })?;

        let name = local_base_name(file).unwrap_or_default();
        summary.uploaded.push(join_remote_path(remote_dir, &name));
        summary.bytes += bytes;
    }

    info!(
        "Uploaded {} file(s), {} bytes to {}",
        summary.uploaded.len(),
        summary.bytes,
        remote_dir
    );
    Ok(summary)
}
