//! SFTP data types

/// Remote file type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Unknown,
}

impl FileType {
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }
}

/// Constants for SFTP operations
pub mod constants {
    /// Copy buffer size for streaming uploads (256 KB)
    pub const STREAM_BUFFER_SIZE: usize = 256 * 1024;
}
