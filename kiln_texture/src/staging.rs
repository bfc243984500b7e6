//! Scoped staging memory for pixel data on its way to the GPU.
//!
//! A [`StagingBuffer`] owns the pixels between decode and upload. Its region is released
//! when it is dropped, on success and on every error path alike.

use std::ops::Deref;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::trace;

#[derive(Debug, Default)]
pub struct StagingPool {
    outstanding_bytes: AtomicUsize,
    staged_count: AtomicU64,
}

impl StagingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `pixels` and accounts it as live staging memory.
    pub fn stage(&self, pixels: Vec<u8>) -> StagingBuffer<'_> {
        let data = pixels.into_boxed_slice();
        self.outstanding_bytes.fetch_add(data.len(), Ordering::AcqRel);
        self.staged_count.fetch_add(1, Ordering::Relaxed);
        trace!("Staged {} bytes of pixel data", data.len());

        StagingBuffer { pool: self, data }
    }

    /// Bytes held by staging buffers that have not been released yet.
    pub fn outstanding_bytes(&self) -> usize {
        self.outstanding_bytes.load(Ordering::Acquire)
    }

    /// Number of buffers ever handed out by this pool.
    pub fn staged_count(&self) -> u64 {
        self.staged_count.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct StagingBuffer<'a> {
    pool: &'a StagingPool,
    data: Box<[u8]>,
}

impl StagingBuffer<'_> {
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Deref for StagingBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl Drop for StagingBuffer<'_> {
    fn drop(&mut self) {
        let previous = self
            .pool
            .outstanding_bytes
            .fetch_sub(self.data.len(), Ordering::AcqRel);
        if previous < self.data.len() {
            kiln_utils::debug_panic!(
                "Staging pool released {} bytes but only {previous} were outstanding",
                self.data.len()
            );
        }
        trace!("Released {} bytes of staging memory", self.data.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_on_drop() {
        let pool = StagingPool::new();

        let first = pool.stage(vec![0; 16]);
        let second = pool.stage(vec![1; 48]);
        assert_eq!(pool.outstanding_bytes(), 64);
        assert_eq!(first.len(), 16);
        assert_eq!(second.as_bytes()[0], 1);

        drop(first);
        assert_eq!(pool.outstanding_bytes(), 48);

        drop(second);
        assert_eq!(pool.outstanding_bytes(), 0);
        assert_eq!(pool.staged_count(), 2);
    }

    #[test]
    fn region_is_sized_exactly() {
        let pool = StagingPool::new();
        let mut pixels = Vec::with_capacity(1024);
        pixels.extend_from_slice(&[7; 12]);

        let staged = pool.stage(pixels);
        assert_eq!(staged.len(), 12);
        assert_eq!(pool.outstanding_bytes(), 12);
    }

    #[test]
    fn releases_while_unwinding() {
        let pool = StagingPool::new();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _staged = pool.stage(vec![0; 32]);
            panic!("upload exploded");
        }));

        assert!(result.is_err());
        assert_eq!(pool.outstanding_bytes(), 0);
    }
}
