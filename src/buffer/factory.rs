//! Buffer constructors
//!
//! `Buffer::slice_with` allocates its result through a [`BufferFactory`].
//! Whatever the factory returns must be a live buffer of the source's
//! variant, distinct from the source, and at least as long as requested.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::{ArrayBuffer, Buffer, BufferStore, SharedArrayBuffer};
use crate::error::{ViewError, ViewResult};

/// Something that can construct buffers.
pub trait BufferFactory: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Construct a buffer of at least `byte_length` bytes.
    fn construct(&self, byte_length: usize) -> ViewResult<Buffer>;
}

/// Shared handle to a buffer constructor.
pub type BufferConstructor = Arc<dyn BufferFactory>;

impl fmt::Debug for dyn BufferFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufferFactory({})", self.name())
    }
}

/// The built-in constructor of one buffer variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrinsicBufferConstructor {
    Array,
    Shared,
}

impl BufferFactory for IntrinsicBufferConstructor {
    fn name(&self) -> &str {
        match self {
            IntrinsicBufferConstructor::Array => "ArrayBuffer",
            IntrinsicBufferConstructor::Shared => "SharedArrayBuffer",
        }
    }

    fn construct(&self, byte_length: usize) -> ViewResult<Buffer> {
        match self {
            IntrinsicBufferConstructor::Array => ArrayBuffer::new(byte_length).map(Buffer::Array),
            IntrinsicBufferConstructor::Shared => {
                SharedArrayBuffer::new(byte_length).map(Buffer::Shared)
            }
        }
    }
}

impl Buffer {
    fn variant_name(&self) -> &'static str {
        match self {
            Buffer::Array(_) => "ArrayBuffer",
            Buffer::Shared(_) => "SharedArrayBuffer",
        }
    }

    /// Built-in constructor of this buffer's variant.
    pub fn intrinsic_constructor(&self) -> IntrinsicBufferConstructor {
        match self {
            Buffer::Array(_) => IntrinsicBufferConstructor::Array,
            Buffer::Shared(_) => IntrinsicBufferConstructor::Shared,
        }
    }
}

/// Construct the result of slicing `source` into `byte_length` bytes and
/// check it can receive the copy.
pub fn create_slice_result(
    ctor: &dyn BufferFactory,
    source: &Buffer,
    byte_length: usize,
    op: &'static str,
) -> ViewResult<Buffer> {
    debug!(ctor = ctor.name(), byte_length, "constructing slice result");
    let result = ctor.construct(byte_length)?;

    if result.is_shared() != source.is_shared() {
        return Err(ViewError::BufferVariant {
            op,
            expected: source.variant_name(),
            found: result.variant_name(),
        });
    }
    if !result.is_live() {
        return Err(ViewError::DetachedBuffer { op });
    }
    if result.ptr_eq(source) {
        return Err(ViewError::SameBuffer { op });
    }
    let actual = result.byte_length();
    if actual < byte_length {
        return Err(ViewError::ShortResult {
            op,
            requested: byte_length,
            actual,
        });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrinsic_constructors() {
        let array = IntrinsicBufferConstructor::Array.construct(4).unwrap();
        assert!(!array.is_shared());
        assert_eq!(array.byte_length(), 4);

        let shared = IntrinsicBufferConstructor::Shared.construct(3).unwrap();
        assert!(shared.is_shared());
        assert_eq!(shared.intrinsic_constructor(), IntrinsicBufferConstructor::Shared);
    }

    #[test]
    fn test_result_checks() {
        let source: Buffer = ArrayBuffer::new(8).unwrap().into();
        let ok = create_slice_result(&IntrinsicBufferConstructor::Array, &source, 8, "t").unwrap();
        assert!(!ok.ptr_eq(&source));

        let err = create_slice_result(&IntrinsicBufferConstructor::Shared, &source, 8, "t").unwrap_err();
        assert_eq!(err.tag(), "BufferVariantError");
        assert_eq!(
            err.to_string(),
            "t: constructor returned SharedArrayBuffer, expected ArrayBuffer"
        );
    }

    #[test]
    fn test_debug_shows_name() {
        let ctor: BufferConstructor = Arc::new(IntrinsicBufferConstructor::Shared);
        assert_eq!(format!("{:?}", ctor), "BufferFactory(SharedArrayBuffer)");
    }
}
