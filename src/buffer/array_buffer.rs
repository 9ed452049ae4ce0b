//! Detachable array buffers
//!
//! An `ArrayBuffer` is a shared handle over lock-protected bytes. Detaching
//! drops the bytes; every later access reports `DetachedBuffer`. The lock is
//! held only for the duration of a single copy, never across user code.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::config::EngineConfig;
use crate::error::{ViewError, ViewResult};

struct ArrayBufferInner {
    /// `None` once detached
    data: RwLock<Option<Vec<u8>>>,
    /// Set for resizable buffers
    max_byte_length: Option<usize>,
}

/// Exclusive, detachable byte storage.
#[derive(Clone)]
pub struct ArrayBuffer {
    inner: Arc<ArrayBufferInner>,
}

impl ArrayBuffer {
    /// Allocate a zeroed buffer of `byte_length` bytes.
    pub fn new(byte_length: usize) -> ViewResult<Self> {
        check_allocation(byte_length, "ArrayBuffer::new")?;
        Ok(Self::from_bytes(vec![0; byte_length]))
    }

    /// Take ownership of existing bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            inner: Arc::new(ArrayBufferInner {
                data: RwLock::new(Some(bytes)),
                max_byte_length: None,
            }),
        }
    }

    /// Allocate a resizable buffer that may grow up to `max_byte_length`.
    pub fn resizable(byte_length: usize, max_byte_length: usize) -> ViewResult<Self> {
        const OP: &str = "ArrayBuffer::resizable";
        if byte_length > max_byte_length {
            return Err(ViewError::range(OP, "byte length exceeds maximum byte length"));
        }
        check_allocation(max_byte_length, OP)?;
        Ok(Self {
            inner: Arc::new(ArrayBufferInner {
                data: RwLock::new(Some(vec![0; byte_length])),
                max_byte_length: Some(max_byte_length),
            }),
        })
    }

    pub fn is_detached(&self) -> bool {
        self.inner.data.read().is_none()
    }

    /// Current byte length; 0 once detached.
    pub fn byte_length(&self) -> usize {
        self.inner.data.read().as_ref().map_or(0, Vec::len)
    }

    pub fn is_resizable(&self) -> bool {
        self.inner.max_byte_length.is_some()
    }

    pub fn max_byte_length(&self) -> usize {
        self.inner
            .max_byte_length
            .unwrap_or_else(|| self.byte_length())
    }

    /// Drop the storage. Detaching an already detached buffer is a no-op.
    pub fn detach(&self) {
        let mut data = self.inner.data.write();
        if let Some(bytes) = data.take() {
            trace!(byte_length = bytes.len(), "detached array buffer");
        }
    }

    /// Change the length of a resizable buffer; new bytes are zeroed.
    pub fn resize(&self, new_byte_length: usize) -> ViewResult<()> {
        const OP: &str = "ArrayBuffer::resize";
        let max = self
            .inner
            .max_byte_length
            .ok_or_else(|| ViewError::range(OP, "buffer is not resizable"))?;
        if new_byte_length > max {
            return Err(ViewError::range(OP, "new length exceeds maximum byte length"));
        }
        let mut data = self.inner.data.write();
        let bytes = data.as_mut().ok_or(ViewError::DetachedBuffer { op: OP })?;
        bytes.resize(new_byte_length, 0);
        trace!(new_byte_length, "resized array buffer");
        Ok(())
    }

    /// Copy of the current contents.
    pub fn to_vec(&self) -> ViewResult<Vec<u8>> {
        self.with_bytes("ArrayBuffer::to_vec", |bytes| bytes.to_vec())
    }

    pub fn ptr_eq(&self, other: &ArrayBuffer) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn with_bytes<R>(
        &self,
        op: &'static str,
        f: impl FnOnce(&[u8]) -> R,
    ) -> ViewResult<R> {
        let data = self.inner.data.read();
        let bytes = data.as_ref().ok_or(ViewError::DetachedBuffer { op })?;
        Ok(f(bytes))
    }

    pub(crate) fn with_bytes_mut<R>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> ViewResult<R> {
        let mut data = self.inner.data.write();
        let bytes = data.as_mut().ok_or(ViewError::DetachedBuffer { op })?;
        Ok(f(bytes))
    }
}

impl fmt::Debug for ArrayBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayBuffer")
            .field("byte_length", &self.byte_length())
            .field("detached", &self.is_detached())
            .field("max_byte_length", &self.inner.max_byte_length)
            .finish()
    }
}

/// Reject allocations above the configured limit.
pub(crate) fn check_allocation(byte_length: usize, op: &'static str) -> ViewResult<()> {
    let limit = EngineConfig::current().storage.max_byte_length;
    if byte_length > limit {
        return Err(ViewError::range(
            op,
            format!("allocation of {} bytes exceeds limit of {}", byte_length, limit),
        ));
    }
    Ok(())
}
