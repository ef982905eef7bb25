//! In-memory [`RemoteFs`] for unit tests

use std::collections::{HashMap, HashSet};
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::AsyncWrite;

use crate::sftp::path_utils::remote_base_name;
use crate::sftp::{FileType, RemoteFs, SftpError};

#[derive(Default)]
struct State {
    dirs: HashSet<String>,
    files: HashMap<String, Arc<Mutex<Vec<u8>>>>,
    closed: HashSet<String>,
    mkdir_log: Vec<String>,
    create_log: Vec<String>,
    fail_all_mkdir: bool,
    fail_create: HashSet<String>,
    fail_close: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryFs {
    state: Arc<Mutex<State>>,
}

fn parent_of(path: &str) -> &str {
    match path.trim_end_matches('/').rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => "",
    }
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dirs<'a>(dirs: impl IntoIterator<Item = &'a str>) -> Self {
        let fs = Self::new();
        fs.state
            .lock()
            .dirs
            .extend(dirs.into_iter().map(str::to_string));
        fs
    }

    pub fn add_file(&self, path: &str, content: &[u8]) {
        self.state
            .lock()
            .files
            .insert(path.to_string(), Arc::new(Mutex::new(content.to_vec())));
    }

    pub fn fail_all_mkdir(&self) {
        self.state.lock().fail_all_mkdir = true;
    }

    /// Make `create` fail for files with this base name
    pub fn fail_create(&self, base_name: &str) {
        self.state.lock().fail_create.insert(base_name.to_string());
    }

    /// Make closing fail for files with this base name
    pub fn fail_close(&self, base_name: &str) {
        self.state.lock().fail_close.insert(base_name.to_string());
    }

    pub fn mkdir_log(&self) -> Vec<String> {
        self.state.lock().mkdir_log.clone()
    }

    pub fn create_log(&self) -> Vec<String> {
        self.state.lock().create_log.clone()
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.state.lock().dirs.contains(path)
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().files.get(path).map(|f| f.lock().clone())
    }

    pub fn is_closed(&self, path: &str) -> bool {
        self.state.lock().closed.contains(path)
    }

    /// Directories created below `parent`
    pub fn children(&self, parent: &str) -> Vec<String> {
        let state = self.state.lock();
        let mut out: Vec<String> = state
            .dirs
            .iter()
            .filter(|d| parent_of(d) == parent)
            .cloned()
            .collect();
        out.sort();
        out
    }
}

#[async_trait(?Send)]
impl RemoteFs for MemoryFs {
    type File = MemFile;

    async fn file_type(&self, path: &str) -> Result<FileType, SftpError> {
        let state = self.state.lock();
        if state.dirs.contains(path) {
            Ok(FileType::Directory)
        } else if state.files.contains_key(path) {
            Ok(FileType::File)
        } else {
            Err(SftpError::FileNotFound(path.to_string()))
        }
    }

    async fn create_dir(&self, path: &str) -> Result<(), SftpError> {
        let mut state = self.state.lock();
        state.mkdir_log.push(path.to_string());
        if state.fail_all_mkdir {
            return Err(SftpError::PermissionDenied(path.to_string()));
        }
        if state.dirs.contains(path) || state.files.contains_key(path) {
            return Err(SftpError::AlreadyExists(path.to_string()));
        }
        if !state.dirs.contains(parent_of(path)) {
            return Err(SftpError::FileNotFound(path.to_string()));
        }
        state.dirs.insert(path.to_string());
        Ok(())
    }

    async fn create(&self, path: &str) -> Result<MemFile, SftpError> {
        let mut state = self.state.lock();
        state.create_log.push(path.to_string());
        let name = remote_base_name(path).to_string();
        if state.fail_create.contains(&name) {
            return Err(SftpError::PermissionDenied(path.to_string()));
        }
        if !state.dirs.contains(parent_of(path)) {
            return Err(SftpError::FileNotFound(path.to_string()));
        }
        let data = Arc::new(Mutex::new(Vec::new()));
        state.files.insert(path.to_string(), data.clone());
        Ok(MemFile {
            path: path.to_string(),
            data,
            fail_close: state.fail_close.contains(&name),
            state: self.state.clone(),
        })
    }
}

pub struct MemFile {
    path: String,
    data: Arc<Mutex<Vec<u8>>>,
    fail_close: bool,
    state: Arc<Mutex<State>>,
}

impl AsyncWrite for MemFile {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.data.lock().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        if self.fail_close {
            return Poll::Ready(Err(io::Error::other("close rejected")));
        }
        self.state.lock().closed.insert(self.path.clone());
        Poll::Ready(Ok(()))
    }
}
