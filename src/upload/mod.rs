//! Upload pipeline
//!
//! validate local files → connect → check destination → allocate a random
//! directory → copy files in order → release the session.

pub mod allocator;
pub mod error;
pub mod naming;
pub mod pool;
pub mod transfer;

use std::path::PathBuf;

use tracing::{info, warn};

pub use allocator::{allocate_dir, allocate_dir_from};
pub use error::{TransferError, UploadError};
pub use naming::{random_id, NamingPolicy};
pub use pool::{BufferPool, PooledBuffer};
pub use transfer::{upload_file, upload_files, TransferSummary};

use crate::sftp::{RemoteFs, SftpSession};
use crate::ssh::{SshClient, SshConfig, SshSession};

/// What to upload and where
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Local files, uploaded in this order
    pub files: Vec<PathBuf>,
    /// Existing remote directory the new directory is created in
    pub remote_parent: String,
    pub policy: NamingPolicy,
}

impl UploadRequest {
    pub fn new(files: Vec<PathBuf>, remote_parent: impl Into<String>, policy: NamingPolicy) -> Self {
        Self {
            files,
            remote_parent: remote_parent.into(),
            policy,
        }
    }

    /// Check every input is an existing regular file. Touches no network.
    pub fn validate(&self) -> Result<(), UploadError> {
        if self.files.is_empty() {
            return Err(UploadError::NothingToUpload);
        }
        for path in &self.files {
            let metadata = std::fs::metadata(path).map_err(|source| UploadError::LocalFile {
                path: path.clone(),
                source,
            })?;
            if metadata.is_dir() {
                return Err(UploadError::DirectoryInput(path.clone()));
            }
            if !metadata.is_file() {
                return Err(UploadError::NotRegularFile(path.clone()));
            }
        }
        Ok(())
    }
}

/// Result of a fully successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    /// Newly created remote directory
    pub remote_dir: String,
    /// Remote paths written, in input order
    pub uploaded: Vec<String>,
    pub bytes: u64,
}

/// Run the remote half of the upload against any [`RemoteFs`].
///
/// The request is assumed validated.
pub async fn run_on<R>(
    fs: &R,
    request: &UploadRequest,
    pool: &BufferPool,
) -> Result<UploadReport, UploadError>
where
    R: RemoteFs + ?Sized,
{
    let parent = request.remote_parent.as_str();
    if !fs.file_type(parent).await?.is_dir() {
        return Err(UploadError::NotADirectory(parent.to_string()));
    }

    let remote_dir = allocate_dir(fs, parent, request.policy).await?;
    let summary = upload_files(fs, pool, &request.files, &remote_dir).await?;

    Ok(UploadReport {
        remote_dir,
        uploaded: summary.uploaded,
        bytes: summary.bytes,
    })
}

/// Validate, connect, upload, and release the session on every exit path.
pub async fn upload(request: &UploadRequest, config: SshConfig) -> Result<UploadReport, UploadError> {
    request.validate()?;

    let ssh = SshClient::new(config).connect().await?;
    let result = upload_over(&ssh, request).await;

    if let Err(e) = ssh.close().await {
        warn!("Failed to disconnect cleanly: {}", e);
    }
    result
}

async fn upload_over(ssh: &SshSession, request: &UploadRequest) -> Result<UploadReport, UploadError> {
    let sftp = SftpSession::open(ssh).await?;
    let result = run_on(&sftp, request, BufferPool::shared()).await;

    if let Err(e) = sftp.close().await {
        warn!("Failed to close SFTP session: {}", e);
    }
    if let Ok(report) = &result {
        info!("Upload complete: {}", report.remote_dir);
    }
    result
}
