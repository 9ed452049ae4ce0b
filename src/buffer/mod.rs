//! Buffer store
//!
//! Byte storage behind views. Two variants:
//! - [`ArrayBuffer`]: exclusive, detachable, optionally resizable
//! - [`SharedArrayBuffer`]: shared between threads, never detachable
//!
//! Every byte access revalidates liveness; nothing about a buffer's state is
//! cached by its users.

pub mod array_buffer;
pub mod factory;
pub mod shared;

pub use array_buffer::ArrayBuffer;
pub use factory::{create_slice_result, BufferConstructor, BufferFactory, IntrinsicBufferConstructor};
pub use shared::SharedArrayBuffer;

use crate::bounds::Bounds;
use crate::error::{ViewError, ViewResult};
use crate::value::Value;

/// Minimal interface over detachable storage.
pub trait BufferStore {
    /// False once the storage has been detached.
    fn is_live(&self) -> bool;

    /// Current byte length; 0 when detached.
    fn byte_length(&self) -> usize;

    /// Release the storage. Shared storage refuses.
    fn detach(&self) -> ViewResult<()>;
}

impl BufferStore for ArrayBuffer {
    fn is_live(&self) -> bool {
        !self.is_detached()
    }

    fn byte_length(&self) -> usize {
        ArrayBuffer::byte_length(self)
    }

    fn detach(&self) -> ViewResult<()> {
        ArrayBuffer::detach(self);
        Ok(())
    }
}

impl BufferStore for SharedArrayBuffer {
    fn is_live(&self) -> bool {
        true
    }

    fn byte_length(&self) -> usize {
        SharedArrayBuffer::byte_length(self)
    }

    fn detach(&self) -> ViewResult<()> {
        Err(ViewError::NotDetachable {
            op: "SharedArrayBuffer::detach",
        })
    }
}

/// Storage attached to a view.
#[derive(Debug, Clone)]
pub enum Buffer {
    Array(ArrayBuffer),
    Shared(SharedArrayBuffer),
}

impl Buffer {
    pub fn is_shared(&self) -> bool {
        matches!(self, Buffer::Shared(_))
    }

    /// Whether views may observe the length changing.
    pub fn is_resizable(&self) -> bool {
        match self {
            Buffer::Array(buffer) => buffer.is_resizable(),
            Buffer::Shared(_) => false,
        }
    }

    pub fn ptr_eq(&self, other: &Buffer) -> bool {
        match (self, other) {
            (Buffer::Array(a), Buffer::Array(b)) => a.ptr_eq(b),
            (Buffer::Shared(a), Buffer::Shared(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub fn as_array_buffer(&self) -> Option<&ArrayBuffer> {
        match self {
            Buffer::Array(buffer) => Some(buffer),
            Buffer::Shared(_) => None,
        }
    }

    /// Copy `dst.len()` bytes starting at `offset`.
    pub(crate) fn read(&self, offset: usize, dst: &mut [u8], op: &'static str) -> ViewResult<()> {
        match self {
            Buffer::Array(buffer) => buffer.with_bytes(op, |bytes| {
                let src = byte_range(bytes.len(), offset, dst.len(), op)?;
                dst.copy_from_slice(&bytes[src]);
                Ok(())
            })?,
            Buffer::Shared(buffer) => buffer.read(offset, dst, op),
        }
    }

    pub(crate) fn write(&self, offset: usize, src: &[u8], op: &'static str) -> ViewResult<()> {
        match self {
            Buffer::Array(buffer) => buffer.with_bytes_mut(op, |bytes| {
                let dst = byte_range(bytes.len(), offset, src.len(), op)?;
                bytes[dst].copy_from_slice(src);
                Ok(())
            })?,
            Buffer::Shared(buffer) => buffer.write(offset, src, op),
        }
    }

    /// Overlap-safe move of `len` bytes from `src` to `dst`.
    pub(crate) fn copy_within(
        &self,
        dst: usize,
        src: usize,
        len: usize,
        op: &'static str,
    ) -> ViewResult<()> {
        match self {
            Buffer::Array(buffer) => buffer.with_bytes_mut(op, |bytes| {
                let from = byte_range(bytes.len(), src, len, op)?;
                byte_range(bytes.len(), dst, len, op)?;
                bytes.copy_within(from, dst);
                Ok(())
            })?,
            Buffer::Shared(buffer) => {
                let mut tmp = vec![0u8; len];
                buffer.read(src, &mut tmp, op)?;
                buffer.write(dst, &tmp, op)
            }
        }
    }

    /// Copy the bytes selected by `start`/`end` into a new buffer of the
    /// same variant.
    pub fn slice(&self, start: &Value, end: &Value) -> ViewResult<Buffer> {
        self.slice_with(&self.intrinsic_constructor(), start, end)
    }

    /// [`Buffer::slice`] with the result built by `ctor`.
    ///
    /// Constructing the result may run user code; the source is checked
    /// again before the copy.
    pub fn slice_with(&self, ctor: &dyn BufferFactory, start: &Value, end: &Value) -> ViewResult<Buffer> {
        const OP: &str = "slice";
        if !self.is_live() {
            return Err(ViewError::DetachedBuffer { op: OP });
        }
        let bounds = Bounds::normalize(start, end, self.byte_length(), OP)?;

        let result = create_slice_result(ctor, self, bounds.count, OP)?;

        // Coercing the bounds or constructing the result may have detached
        // or shrunk the source.
        if !self.is_live() {
            return Err(ViewError::DetachedBuffer { op: OP });
        }
        let available = self.byte_length().saturating_sub(bounds.from);
        let copied = bounds.count.min(available);
        let mut bytes = vec![0u8; copied];
        self.read(bounds.from, &mut bytes, OP)?;
        result.write(0, &bytes, OP)?;
        Ok(result)
    }

    /// Copy of the current contents.
    pub fn to_vec(&self) -> ViewResult<Vec<u8>> {
        match self {
            Buffer::Array(buffer) => buffer.to_vec(),
            Buffer::Shared(buffer) => Ok(buffer.to_vec()),
        }
    }
}

impl BufferStore for Buffer {
    fn is_live(&self) -> bool {
        match self {
            Buffer::Array(buffer) => BufferStore::is_live(buffer),
            Buffer::Shared(buffer) => BufferStore::is_live(buffer),
        }
    }

    fn byte_length(&self) -> usize {
        match self {
            Buffer::Array(buffer) => buffer.byte_length(),
            Buffer::Shared(buffer) => buffer.byte_length(),
        }
    }

    fn detach(&self) -> ViewResult<()> {
        match self {
            Buffer::Array(buffer) => BufferStore::detach(buffer),
            Buffer::Shared(buffer) => BufferStore::detach(buffer),
        }
    }
}

impl From<ArrayBuffer> for Buffer {
    fn from(buffer: ArrayBuffer) -> Self {
        Buffer::Array(buffer)
    }
}

impl From<SharedArrayBuffer> for Buffer {
    fn from(buffer: SharedArrayBuffer) -> Self {
        Buffer::Shared(buffer)
    }
}

fn byte_range(
    total: usize,
    offset: usize,
    len: usize,
    op: &'static str,
) -> ViewResult<std::ops::Range<usize>> {
    match offset.checked_add(len) {
        Some(end) if end <= total => Ok(offset..end),
        _ => Err(ViewError::OutOfBounds { op }),
    }
}
