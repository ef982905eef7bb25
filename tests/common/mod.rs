//! Shared fixtures for integration tests

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use parking_lot::Mutex;
use sftp_drop::sftp::{FileType, RemoteFs, SftpError};
use tokio::io::AsyncWrite;

/// Minimal in-memory remote store
#[derive(Default, Clone)]
pub struct FakeRemote {
    pub dirs: Arc<Mutex<BTreeSet<String>>>,
    pub files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
    pub mkdir_attempts: Arc<Mutex<Vec<String>>>,
}

impl FakeRemote {
    pub fn with_dirs(dirs: &[&str]) -> Self {
        let fake = Self::default();
        fake.dirs.lock().extend(dirs.iter().map(|d| d.to_string()));
        fake
    }

    /// Directories directly below `parent`
    pub fn children(&self, parent: &str) -> Vec<String> {
        let prefix = format!("{}/", parent.trim_end_matches('/'));
        self.dirs
            .lock()
            .iter()
            .filter(|d| d.starts_with(&prefix) && !d[prefix.len()..].contains('/'))
            .cloned()
            .collect()
    }
}

#[async_trait(?Send)]
impl RemoteFs for FakeRemote {
    type File = FakeFile;

    async fn file_type(&self, path: &str) -> Result<FileType, SftpError> {
        if self.dirs.lock().contains(path) {
            Ok(FileType::Directory)
        } else if self.files.lock().contains_key(path) {
            Ok(FileType::File)
        } else {
            Err(SftpError::FileNotFound(path.to_string()))
        }
    }

    async fn create_dir(&self, path: &str) -> Result<(), SftpError> {
        self.mkdir_attempts.lock().push(path.to_string());
        if self.dirs.lock().insert(path.to_string()) {
            Ok(())
        } else {
            Err(SftpError::AlreadyExists(path.to_string()))
        }
    }

    async fn create(&self, path: &str) -> Result<FakeFile, SftpError> {
        self.files.lock().insert(path.to_string(), Vec::new());
        Ok(FakeFile {
            path: path.to_string(),
            files: self.files.clone(),
        })
    }
}

pub struct FakeFile {
    path: String,
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl AsyncWrite for FakeFile {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        self.files
            .lock()
            .entry(self.path.clone())
            .or_default()
            .extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
