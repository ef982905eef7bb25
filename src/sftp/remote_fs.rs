//! Remote filesystem seam
//!
//! The allocator and the transfer executor only need three operations from
//! the remote side. [`SftpSession`](super::SftpSession) provides them over
//! the wire; tests provide them in memory.

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use super::error::SftpError;
use super::types::FileType;

#[async_trait(?Send)]
pub trait RemoteFs {
    /// Writable remote file handle. `shutdown()` finalizes it.
    type File: AsyncWrite + Unpin;

    /// Type of the entry at `path`, following symlinks
    async fn file_type(&self, path: &str) -> Result<FileType, SftpError>;

    /// Create a single directory. Must fail if `path` already exists.
    async fn create_dir(&self, path: &str) -> Result<(), SftpError>;

    /// Create (or truncate) a file for writing
    async fn create(&self, path: &str) -> Result<Self::File, SftpError>;
}
