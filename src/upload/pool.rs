//! Copy buffer pool
//!
//! Buffers are checked out as [`PooledBuffer`] guards and go back to the
//! pool when the guard drops, on success and error paths alike.

use std::ops::{Deref, DerefMut};
use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing::debug;

use crate::sftp::constants::STREAM_BUFFER_SIZE;

/// Pool of fixed-size byte buffers
pub struct BufferPool {
    buffer_size: usize,
    free: Mutex<Vec<Vec<u8>>>,
}

impl BufferPool {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            free: Mutex::new(Vec::new()),
        }
    }

    /// Process-wide pool of [`STREAM_BUFFER_SIZE`] buffers
    pub fn shared() -> &'static BufferPool {
        static SHARED: OnceLock<BufferPool> = OnceLock::new();
        SHARED.get_or_init(|| BufferPool::new(STREAM_BUFFER_SIZE))
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Take a buffer, allocating only when none is free
    pub fn checkout(&self) -> PooledBuffer<'_> {
        let buf = self.free.lock().pop().unwrap_or_else(|| {
            debug!("Allocating {} byte copy buffer", self.buffer_size);
            vec![0u8; self.buffer_size]
        });
        PooledBuffer {
            pool: self,
            buf: Some(buf),
        }
    }

    /// Buffers currently idle in the pool
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }
}

/// Buffer on loan from a [`BufferPool`]
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Option<Vec<u8>>,
}

impl Deref for PooledBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.buf.as_deref().unwrap_or_default()
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.buf.as_deref_mut().unwrap_or_default()
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.free.lock().push(buf);
        }
    }
}
