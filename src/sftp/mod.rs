//! SFTP module
//!
//! Remote directory creation and file upload over an SSH connection.

pub mod error;
pub mod path_utils;
pub mod remote_fs;
pub mod session;
pub mod types;

pub use error::SftpError;
pub use remote_fs::RemoteFs;
pub use session::SftpSession;
pub use types::*;
