//! Reusable record buffers.
//!
//! # Design Decisions
//! - Bounded: at most `capacity` idle buffers are retained, extra ones
//!   are dropped on return
//! - Buffers go back through an RAII guard, so they are returned on every
//!   exit path, including failed writes and panics

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

/// Idle buffers kept by the default pool.
pub const DEFAULT_POOL_CAPACITY: usize = 200;

/// A bounded pool of `String` buffers.
#[derive(Debug)]
pub struct BufferPool {
    idle: Mutex<Vec<String>>,
    capacity: usize,
}

impl BufferPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Check out an empty buffer.
    pub fn get(&self) -> PooledBuffer<'_> {
        let buf = self
            .idle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop()
            .unwrap_or_default();
        PooledBuffer { pool: self, buf }
    }

    /// Number of idle buffers.
    pub fn idle(&self) -> usize {
        self.idle.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn put(&self, mut buf: String) {
        buf.clear();
        let mut idle = self.idle.lock().unwrap_or_else(|e| e.into_inner());
        if idle.len() < self.capacity {
            idle.push(buf);
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

/// A buffer checked out of a [`BufferPool`]; returned on drop.
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: String,
}

impl Deref for PooledBuffer<'_> {
    type Target = String;

    fn deref(&self) -> &String {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut String {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.put(std::mem::take(&mut self.buf));
    }
}
