//! SFTP Session management
//!
//! Provides the SFTP file operations the uploader needs over an
//! authenticated SSH connection.

use async_trait::async_trait;
use russh_sftp::client::error::Error as SftpErrorInner;
use russh_sftp::client::fs::File;
use russh_sftp::client::SftpSession as RusshSftpSession;
use russh_sftp::protocol::OpenFlags;
use tracing::{debug, info};

use super::error::SftpError;
use super::remote_fs::RemoteFs;
use super::types::FileType;
use crate::ssh::SshSession;

/// SFTP Session wrapper
pub struct SftpSession {
    sftp: RusshSftpSession,
}

impl SftpSession {
    /// Open the SFTP subsystem on a fresh channel of `ssh`
    pub async fn open(ssh: &SshSession) -> Result<Self, SftpError> {
        debug!("Opening SFTP subsystem");

        let channel = ssh
            .open_session_channel()
            .await
            .map_err(|e| SftpError::ChannelError(e.to_string()))?;

        channel.request_subsystem(true, "sftp").await.map_err(|e| {
            SftpError::SubsystemNotAvailable(format!("Failed to request SFTP subsystem: {}", e))
        })?;

        let sftp = RusshSftpSession::new(channel.into_stream())
            .await
            .map_err(|e| SftpError::SubsystemNotAvailable(e.to_string()))?;

        info!("SFTP subsystem opened");
        Ok(Self { sftp })
    }

    /// Close the SFTP session
    pub async fn close(self) -> Result<(), SftpError> {
        self.sftp.close().await?;
        Ok(())
    }

    /// Map SFTP errors to our error type
    fn map_sftp_error(err: SftpErrorInner, path: &str) -> SftpError {
        let err_str = err.to_string();
        if err_str.contains("No such file") || err_str.contains("not found") {
            SftpError::FileNotFound(path.to_string())
        } else if err_str.contains("Permission denied") {
            SftpError::PermissionDenied(path.to_string())
        } else if err_str.contains("exists") {
            SftpError::AlreadyExists(path.to_string())
        } else {
            SftpError::ProtocolError(format!("{}: {}", path, err_str))
        }
    }
}

#[async_trait(?Send)]
impl RemoteFs for SftpSession {
    type File = File;

    async fn file_type(&self, path: &str) -> Result<FileType, SftpError> {
        let metadata = self
            .sftp
            .metadata(path)
            .await
            .map_err(|e| Self::map_sftp_error(e, path))?;

        Ok(if metadata.is_dir() {
            FileType::Directory
        } else if metadata.is_regular() {
            FileType::File
        } else {
            FileType::Unknown
        })
    }

    async fn create_dir(&self, path: &str) -> Result<(), SftpError> {
        debug!("Creating directory: {}", path);
        self.sftp
            .create_dir(path)
            .await
            .map_err(|e| Self::map_sftp_error(e, path))
    }

    async fn create(&self, path: &str) -> Result<File, SftpError> {
        debug!("Creating remote file: {}", path);
        self.sftp
            .open_with_flags(
                path,
                OpenFlags::CREATE | OpenFlags::TRUNCATE | OpenFlags::WRITE,
            )
            .await
            .map_err(|e| Self::map_sftp_error(e, path))
    }
}
