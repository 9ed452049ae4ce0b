//! Typed views
//!
//! A [`TypedView`] interprets a window of bytes as elements of one
//! [`ElementKind`]. Small views start with inline storage; the first call to
//! [`TypedView::buffer`] materializes an [`ArrayBuffer`] and attaches the
//! view to it, after which the buffer can be detached or resized under the
//! view's feet.
//!
//! Nothing about a view's window is cached. Length, offset and liveness are
//! re-derived from storage on every query, see [`LiveView`].

pub mod live;
pub mod receiver;

pub use live::LiveView;
pub use receiver::{Receiver, WrappedView};

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockWriteGuard};
use tracing::trace;

use crate::buffer::{array_buffer, ArrayBuffer, Buffer, BufferStore};
use crate::config::EngineConfig;
use crate::error::{ViewError, ViewResult};
use crate::kind::ElementKind;
use crate::species::ConstructorProperty;
use crate::value::{Numeric, Value};

/// How a view's element count is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewLength {
    /// Fixed element count chosen at construction
    Fixed(usize),
    /// Follows the byte length of a resizable buffer
    Tracking,
}

pub(crate) struct Storage {
    /// Element bytes while no buffer has been observed
    inline: Vec<u8>,
    /// Set once attached; `inline` is empty from then on
    buffer: Option<Buffer>,
}

struct ViewInner {
    kind: ElementKind,
    /// Offset into the buffer as constructed; stale after detachment
    byte_offset: usize,
    length: ViewLength,
    storage: RwLock<Storage>,
    constructor: RwLock<ConstructorProperty>,
}

/// Current placement of a view's elements.
pub(crate) enum Window {
    Inline { len: usize },
    Attached { buffer: Buffer, base: usize, len: usize },
    Detached,
    OutOfBounds,
}

/// Exclusive access to the bytes of one operation step.
pub(crate) enum Target<'a> {
    Inline(RwLockWriteGuard<'a, Storage>),
    Buffer {
        buffer: Buffer,
        base: usize,
        byte_len: usize,
    },
}

/// Handle to a typed view. Clones share the same view.
#[derive(Clone)]
pub struct TypedView {
    inner: Arc<ViewInner>,
}

impl TypedView {
    /// Allocate a zero-filled view of `length` elements.
    pub fn new(kind: ElementKind, length: usize) -> ViewResult<Self> {
        const OP: &str = "TypedView::new";
        let config = EngineConfig::current();
        let byte_length = length
            .checked_mul(kind.byte_width())
            .ok_or_else(|| ViewError::range(OP, "invalid typed view length"))?;
        array_buffer::check_allocation(byte_length, OP)?;

        let storage = if byte_length <= config.storage.inline_byte_limit {
            Storage {
                inline: vec![0; byte_length],
                buffer: None,
            }
        } else {
            Storage {
                inline: Vec::new(),
                buffer: Some(Buffer::Array(ArrayBuffer::new(byte_length)?)),
            }
        };
        Ok(Self::from_parts(kind, 0, ViewLength::Fixed(length), storage))
    }

    /// View a window of an existing buffer.
    ///
    /// `length` of `None` covers the rest of the buffer, tracking its length
    /// when the buffer is resizable. An empty window over a detached buffer
    /// is allowed; any other window over one is not.
    pub fn with_buffer(
        kind: ElementKind,
        buffer: Buffer,
        byte_offset: usize,
        length: Option<usize>,
    ) -> ViewResult<Self> {
        const OP: &str = "TypedView::with_buffer";
        let width = kind.byte_width();
        if byte_offset % width != 0 {
            return Err(ViewError::range(
                OP,
                format!("start offset of {} should be a multiple of {}", kind, width),
            ));
        }

        if !buffer.is_live() {
            if length == Some(0) {
                return Ok(Self::attached(kind, buffer, byte_offset, ViewLength::Fixed(0)));
            }
            return Err(ViewError::DetachedBuffer { op: OP });
        }

        let buffer_length = buffer.byte_length();
        let view_length = match length {
            None if buffer.is_resizable() => {
                if byte_offset > buffer_length {
                    return Err(ViewError::range(OP, "start offset is outside the bounds of the buffer"));
                }
                ViewLength::Tracking
            }
            None => {
                if buffer_length % width != 0 {
                    return Err(ViewError::range(
                        OP,
                        format!("byte length of {} should be a multiple of {}", kind, width),
                    ));
                }
                if byte_offset > buffer_length {
                    return Err(ViewError::range(OP, "start offset is outside the bounds of the buffer"));
                }
                ViewLength::Fixed((buffer_length - byte_offset) / width)
            }
            Some(length) => {
                let end = length
                    .checked_mul(width)
                    .and_then(|bytes| bytes.checked_add(byte_offset));
                match end {
                    Some(end) if end <= buffer_length => ViewLength::Fixed(length),
                    _ => return Err(ViewError::range(OP, format!("invalid typed view length {}", length))),
                }
            }
        };
        Ok(Self::attached(kind, buffer, byte_offset, view_length))
    }

    /// A number-kind view holding `values`.
    pub fn from_numbers(kind: ElementKind, values: &[f64]) -> ViewResult<Self> {
        let values: Vec<Numeric> = values.iter().map(|v| Numeric::Number(*v)).collect();
        Self::from_numerics(kind, &values)
    }

    /// A big-integer-kind view holding `values`.
    pub fn from_big_ints(kind: ElementKind, values: &[i128]) -> ViewResult<Self> {
        let values: Vec<Numeric> = values.iter().map(|v| Numeric::BigInt(*v)).collect();
        Self::from_numerics(kind, &values)
    }

    pub(crate) fn from_numerics(kind: ElementKind, values: &[Numeric]) -> ViewResult<Self> {
        let view = Self::new(kind, values.len())?;
        view.live().write_all(0, values, "TypedView::new")?;
        Ok(view)
    }

    fn attached(kind: ElementKind, buffer: Buffer, byte_offset: usize, length: ViewLength) -> Self {
        let storage = Storage {
            inline: Vec::new(),
            buffer: Some(buffer),
        };
        Self::from_parts(kind, byte_offset, length, storage)
    }

    fn from_parts(kind: ElementKind, byte_offset: usize, length: ViewLength, storage: Storage) -> Self {
        Self {
            inner: Arc::new(ViewInner {
                kind,
                byte_offset,
                length,
                storage: RwLock::new(storage),
                constructor: RwLock::new(ConstructorProperty::default()),
            }),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn kind(&self) -> ElementKind {
        self.inner.kind
    }

    /// Live accessor; every query goes back to storage.
    pub fn live(&self) -> LiveView<'_> {
        LiveView::new(self)
    }

    /// Element count; 0 when detached or out of bounds.
    pub fn length(&self) -> usize {
        self.live().len()
    }

    pub fn byte_length(&self) -> usize {
        self.length() << self.kind().shift()
    }

    /// Byte offset into the buffer; 0 when detached or out of bounds.
    pub fn byte_offset(&self) -> usize {
        match self.window() {
            Window::Detached | Window::OutOfBounds => 0,
            Window::Inline { .. } | Window::Attached { .. } => self.inner.byte_offset,
        }
    }

    /// Byte offset as constructed, even after detachment.
    pub(crate) fn raw_byte_offset(&self) -> usize {
        self.inner.byte_offset
    }

    pub fn is_detached(&self) -> bool {
        matches!(self.window(), Window::Detached)
    }

    pub fn is_length_tracking(&self) -> bool {
        self.inner.length == ViewLength::Tracking
    }

    /// True until the buffer has been observed.
    pub fn has_inline_storage(&self) -> bool {
        self.inner.storage.read().buffer.is_none()
    }

    /// The buffer behind this view, materializing inline storage first.
    pub fn buffer(&self) -> Buffer {
        if let Some(buffer) = self.inner.storage.read().buffer.clone() {
            return buffer;
        }
        let mut storage = self.inner.storage.write();
        if let Some(buffer) = storage.buffer.clone() {
            return buffer;
        }
        let bytes = std::mem::take(&mut storage.inline);
        trace!(kind = %self.kind(), byte_length = bytes.len(), "materialized inline view storage");
        let buffer = Buffer::Array(ArrayBuffer::from_bytes(bytes));
        storage.buffer = Some(buffer.clone());
        buffer
    }

    /// Read one element; `None` when out of range or detached.
    pub fn get(&self, index: usize) -> Option<Numeric> {
        self.live().get(index, "get").ok()
    }

    /// Coerce and store one element. Returns false when `index` is out of
    /// range or the view is detached, in which case nothing is written.
    pub fn set(&self, index: usize, value: &Value) -> ViewResult<bool> {
        const OP: &str = "set";
        let value = self.kind().coerce(value, OP)?;
        let live = self.live();
        if index >= live.len() {
            return Ok(false);
        }
        live.set(index, value, OP)?;
        Ok(true)
    }

    /// Copy of all elements.
    pub fn to_vec(&self) -> ViewResult<Vec<Numeric>> {
        let live = self.live();
        let len = live.check("to_vec")?;
        live.read_all(0, len, "to_vec")
    }

    /// All elements as `f64`; big integers are converted lossily.
    pub fn to_f64_vec(&self) -> ViewResult<Vec<f64>> {
        Ok(self.to_vec()?.iter().map(Numeric::as_f64).collect())
    }

    pub fn constructor_property(&self) -> ConstructorProperty {
        self.inner.constructor.read().clone()
    }

    /// Replace what species resolution sees as this view's constructor.
    pub fn set_constructor(&self, constructor: ConstructorProperty) {
        *self.inner.constructor.write() = constructor;
    }

    pub fn ptr_eq(&self, other: &TypedView) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ========================================================================
    // Window derivation
    // ========================================================================

    pub(crate) fn window(&self) -> Window {
        let attached = {
            let storage = self.inner.storage.read();
            match &storage.buffer {
                Some(buffer) => buffer.clone(),
                None => {
                    return Window::Inline {
                        len: storage.inline.len() >> self.kind().shift(),
                    }
                }
            }
        };
        self.attached_window(attached)
    }

    fn attached_window(&self, buffer: Buffer) -> Window {
        if !buffer.is_live() {
            return Window::Detached;
        }
        let buffer_length = buffer.byte_length();
        let base = self.inner.byte_offset;
        let shift = self.kind().shift();
        match self.inner.length {
            ViewLength::Fixed(len) => {
                let end = (len << shift).checked_add(base);
                match end {
                    Some(end) if end <= buffer_length => Window::Attached { buffer, base, len },
                    _ => Window::OutOfBounds,
                }
            }
            ViewLength::Tracking => {
                if base > buffer_length {
                    Window::OutOfBounds
                } else {
                    let len = (buffer_length - base) >> shift;
                    Window::Attached { buffer, base, len }
                }
            }
        }
    }

    /// Lock the storage for one read/write step.
    pub(crate) fn target(&self, op: &'static str) -> ViewResult<Target<'_>> {
        let storage = self.inner.storage.write();
        let Some(buffer) = storage.buffer.clone() else {
            return Ok(Target::Inline(storage));
        };
        drop(storage);
        match self.attached_window(buffer) {
            Window::Attached { buffer, base, len } => Ok(Target::Buffer {
                buffer,
                base,
                byte_len: len << self.kind().shift(),
            }),
            Window::Detached => Err(ViewError::DetachedBuffer { op }),
            Window::OutOfBounds | Window::Inline { .. } => Err(ViewError::OutOfBounds { op }),
        }
    }
}

impl Target<'_> {
    fn byte_len(&self) -> usize {
        match self {
            Target::Inline(storage) => storage.inline.len(),
            Target::Buffer { byte_len, .. } => *byte_len,
        }
    }

    fn range(&self, offset: usize, len: usize, op: &'static str) -> ViewResult<std::ops::Range<usize>> {
        match offset.checked_add(len) {
            Some(end) if end <= self.byte_len() => Ok(offset..end),
            _ => Err(ViewError::range(op, "index out of range")),
        }
    }

    pub(crate) fn read(&self, offset: usize, dst: &mut [u8], op: &'static str) -> ViewResult<()> {
        let range = self.range(offset, dst.len(), op)?;
        match self {
            Target::Inline(storage) => {
                dst.copy_from_slice(&storage.inline[range]);
                Ok(())
            }
            Target::Buffer { buffer, base, .. } => buffer.read(base + range.start, dst, op),
        }
    }

    pub(crate) fn write(&mut self, offset: usize, src: &[u8], op: &'static str) -> ViewResult<()> {
        let range = self.range(offset, src.len(), op)?;
        match self {
            Target::Inline(storage) => {
                storage.inline[range].copy_from_slice(src);
                Ok(())
            }
            Target::Buffer { buffer, base, .. } => buffer.write(*base + range.start, src, op),
        }
    }

    pub(crate) fn copy_within(
        &mut self,
        dst: usize,
        src: usize,
        len: usize,
        op: &'static str,
    ) -> ViewResult<()> {
        let from = self.range(src, len, op)?;
        self.range(dst, len, op)?;
        match self {
            Target::Inline(storage) => {
                storage.inline.copy_within(from, dst);
                Ok(())
            }
            Target::Buffer { buffer, base, .. } => {
                buffer.copy_within(*base + dst, *base + from.start, len, op)
            }
        }
    }
}

impl fmt::Debug for TypedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedView")
            .field("kind", &self.kind())
            .field("length", &self.length())
            .field("byte_offset", &self.inner.byte_offset)
            .field("detached", &self.is_detached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SharedArrayBuffer;

    #[test]
    fn test_small_views_start_inline() {
        let view = TypedView::new(ElementKind::Int32, 4).unwrap();
        assert!(view.has_inline_storage());
        assert_eq!(view.length(), 4);
        assert_eq!(view.byte_length(), 16);

        view.set(1, &Value::from(7)).unwrap();
        let buffer = view.buffer();
        assert!(!view.has_inline_storage());
        assert_eq!(view.get(1), Some(Numeric::Number(7.0)));
        assert!(buffer.ptr_eq(&view.buffer()));
    }

    #[test]
    fn test_large_views_allocate_buffer() {
        let view = TypedView::new(ElementKind::Float64, 64).unwrap();
        assert!(!view.has_inline_storage());
    }

    #[test]
    fn test_detach_zeroes_length() {
        let view = TypedView::from_numbers(ElementKind::Uint8, &[1.0, 2.0, 3.0]).unwrap();
        view.buffer().detach().unwrap();
        assert!(view.is_detached());
        assert_eq!(view.length(), 0);
        assert_eq!(view.byte_offset(), 0);
        assert_eq!(view.get(0), None);
        assert!(view.to_vec().unwrap_err().is_detached());
    }

    #[test]
    fn test_with_buffer_validation() {
        let buffer: Buffer = ArrayBuffer::new(10).unwrap().into();
        let err = TypedView::with_buffer(ElementKind::Int32, buffer.clone(), 2, None).unwrap_err();
        assert_eq!(err.tag(), "RangeError");
        let err = TypedView::with_buffer(ElementKind::Int32, buffer.clone(), 0, None).unwrap_err();
        assert_eq!(err.tag(), "RangeError");
        let err = TypedView::with_buffer(ElementKind::Int16, buffer.clone(), 4, Some(4)).unwrap_err();
        assert_eq!(err.tag(), "RangeError");

        let view = TypedView::with_buffer(ElementKind::Int16, buffer.clone(), 4, None).unwrap();
        assert_eq!(view.length(), 3);
        assert_eq!(view.byte_offset(), 4);
    }

    #[test]
    fn test_empty_window_over_detached_buffer() {
        let buffer: Buffer = ArrayBuffer::new(8).unwrap().into();
        buffer.detach().unwrap();
        let view = TypedView::with_buffer(ElementKind::Uint8, buffer.clone(), 4, Some(0)).unwrap();
        assert_eq!(view.length(), 0);
        assert!(TypedView::with_buffer(ElementKind::Uint8, buffer, 0, Some(1))
            .unwrap_err()
            .is_detached());
    }

    #[test]
    fn test_length_tracking_view() {
        let array = ArrayBuffer::resizable(8, 32).unwrap();
        let view = TypedView::with_buffer(ElementKind::Uint16, array.clone().into(), 2, None).unwrap();
        assert!(view.is_length_tracking());
        assert_eq!(view.length(), 3);
        array.resize(32).unwrap();
        assert_eq!(view.length(), 15);
        array.resize(1).unwrap();
        assert_eq!(view.length(), 0);
        assert!(matches!(view.window(), Window::OutOfBounds));
    }

    #[test]
    fn test_fixed_view_out_of_bounds_after_shrink() {
        let array = ArrayBuffer::resizable(8, 8).unwrap();
        let view = TypedView::with_buffer(ElementKind::Uint8, array.clone().into(), 0, Some(8)).unwrap();
        array.resize(4).unwrap();
        assert_eq!(view.length(), 0);
        assert_eq!(view.to_vec().unwrap_err().tag(), "OutOfBoundsError");
    }

    #[test]
    fn test_shared_buffer_view() {
        let shared = SharedArrayBuffer::new(8).unwrap();
        let view = TypedView::with_buffer(ElementKind::Int8, shared.clone().into(), 0, None).unwrap();
        view.set(0, &Value::from(-1)).unwrap();
        assert_eq!(shared.to_vec()[0], 0xff);
        assert!(view.buffer().detach().is_err());
        assert!(!view.is_detached());
    }

    #[test]
    fn test_set_out_of_range_is_ignored() {
        let view = TypedView::new(ElementKind::Uint8, 2).unwrap();
        assert!(!view.set(5, &Value::from(1)).unwrap());
        assert!(view.set(1, &Value::from(1)).unwrap());
    }
}
