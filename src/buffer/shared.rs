//! Shared buffers
//!
//! Bytes that several threads may read and write at once. Each byte is a
//! relaxed atomic, so concurrent unsynchronized access is racy and unordered
//! but never undefined behavior. Shared buffers cannot be detached.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use super::array_buffer::check_allocation;
use crate::error::{ViewError, ViewResult};

/// Non-detachable byte storage shared between threads.
#[derive(Clone)]
pub struct SharedArrayBuffer {
    bytes: Arc<[AtomicU8]>,
}

impl SharedArrayBuffer {
    pub fn new(byte_length: usize) -> ViewResult<Self> {
        check_allocation(byte_length, "SharedArrayBuffer::new")?;
        Ok(Self {
            bytes: (0..byte_length).map(|_| AtomicU8::new(0)).collect(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.iter().map(|b| AtomicU8::new(*b)).collect(),
        }
    }

    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }

    pub fn ptr_eq(&self, other: &SharedArrayBuffer) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }

    /// Snapshot of the current contents.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.iter().map(|b| b.load(Ordering::Relaxed)).collect()
    }

    pub(crate) fn read(&self, offset: usize, dst: &mut [u8], op: &'static str) -> ViewResult<()> {
        let src = self.range(offset, dst.len(), op)?;
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s.load(Ordering::Relaxed);
        }
        Ok(())
    }

    pub(crate) fn write(&self, offset: usize, src: &[u8], op: &'static str) -> ViewResult<()> {
        let dst = self.range(offset, src.len(), op)?;
        for (d, s) in dst.iter().zip(src) {
            d.store(*s, Ordering::Relaxed);
        }
        Ok(())
    }

    fn range(&self, offset: usize, len: usize, op: &'static str) -> ViewResult<&[AtomicU8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or(ViewError::OutOfBounds { op })
    }
}

impl fmt::Debug for SharedArrayBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedArrayBuffer")
            .field("byte_length", &self.byte_length())
            .finish()
    }
}
