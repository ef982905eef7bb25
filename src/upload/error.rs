//! Upload Error types

use std::path::PathBuf;

use thiserror::Error;

use crate::sftp::SftpError;
use crate::ssh::SshError;

/// Failure while copying one file into the allocated directory
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("cannot open local file: {0}")]
    LocalOpen(#[source] std::io::Error),

    #[error("cannot read local file: {0}")]
    LocalRead(#[source] std::io::Error),

    #[error("cannot create remote file: {0}")]
    RemoteCreate(#[source] SftpError),

    #[error("cannot write remote file: {0}")]
    RemoteWrite(#[source] std::io::Error),

    #[error("cannot close remote file: {0}")]
    RemoteClose(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("nothing to upload")]
    NothingToUpload,

    #[error("{}: upload of directories is not supported", .0.display())]
    DirectoryInput(PathBuf),

    #[error("{}: not a regular file", .0.display())]
    NotRegularFile(PathBuf),

    #[error("{}: {source}", path.display())]
    LocalFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Ssh(#[from] SshError),

    #[error(transparent)]
    Sftp(#[from] SftpError),

    #[error("destination path is not a directory: {0}")]
    NotADirectory(String),

    #[error(
        "failed to create new random-named directory in {parent} after {attempts} attempts, \
         probably too many already exist"
    )]
    NameSpaceExhausted { parent: String, attempts: usize },

    #[error("{}: {source}", file.display())]
    Transfer {
        /// Allocated directory, possibly partially populated
        remote_dir: String,
        file: PathBuf,
        #[source]
        source: TransferError,
    },
}

impl UploadError {
    /// Directory created before the failure, if any
    pub fn remote_dir(&self) -> Option<&str> {
        match self {
            UploadError::Transfer { remote_dir, .. } => Some(remote_dir),
            _ => None,
        }
    }
}
