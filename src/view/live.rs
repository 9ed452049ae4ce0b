//! Live element access
//!
//! `LiveView` is the only way operations touch elements. Each call
//! re-derives the view's window from storage, so a detach or resize that
//! happened inside a callback is observed by the very next access.

use super::{TypedView, Window};
use crate::error::{ViewError, ViewResult};
use crate::kind::ElementKind;
use crate::value::{Numeric, Value};

/// Accessor that re-reads the view's state on every call.
#[derive(Clone, Copy)]
pub struct LiveView<'a> {
    view: &'a TypedView,
}

impl<'a> LiveView<'a> {
    pub(super) fn new(view: &'a TypedView) -> Self {
        Self { view }
    }

    pub fn view(&self) -> &'a TypedView {
        self.view
    }

    fn kind(&self) -> ElementKind {
        self.view.kind()
    }

    /// Current element count; 0 when detached or out of bounds.
    pub fn len(&self) -> usize {
        match self.view.window() {
            Window::Inline { len } | Window::Attached { len, .. } => len,
            Window::Detached | Window::OutOfBounds => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_detached(&self) -> bool {
        matches!(self.view.window(), Window::Detached)
    }

    /// Current length, or the reason the view cannot be used.
    pub fn check(&self, op: &'static str) -> ViewResult<usize> {
        match self.view.window() {
            Window::Inline { len } | Window::Attached { len, .. } => Ok(len),
            Window::Detached => Err(ViewError::DetachedBuffer { op }),
            Window::OutOfBounds => Err(ViewError::OutOfBounds { op }),
        }
    }

    /// Read element `index`.
    pub fn get(&self, index: usize, op: &'static str) -> ViewResult<Numeric> {
        let width = self.kind().byte_width();
        let mut bytes = [0u8; 8];
        let offset = index
            .checked_mul(width)
            .ok_or_else(|| ViewError::range(op, "index out of range"))?;
        self.view.target(op)?.read(offset, &mut bytes[..width], op)?;
        Ok(self.kind().decode(&bytes[..width]))
    }

    /// Write an already coerced value to element `index`.
    pub fn set(&self, index: usize, value: Numeric, op: &'static str) -> ViewResult<()> {
        let width = self.kind().byte_width();
        let mut bytes = [0u8; 8];
        self.kind().encode(value, &mut bytes[..width], op)?;
        let offset = index
            .checked_mul(width)
            .ok_or_else(|| ViewError::range(op, "index out of range"))?;
        self.view.target(op)?.write(offset, &bytes[..width], op)
    }

    /// Coerce `value` (may run user code), then store it if `index` is still
    /// in range. Detachment during coercion is an error.
    pub fn store(&self, index: usize, value: &Value, op: &'static str) -> ViewResult<()> {
        let value = self.kind().coerce(value, op)?;
        let len = self.check(op)?;
        if index < len {
            self.set(index, value, op)?;
        }
        Ok(())
    }

    /// Element `index` if the view is usable and still that long.
    pub fn element_at(&self, index: usize, op: &'static str) -> ViewResult<Option<Numeric>> {
        let len = self.check(op)?;
        if index >= len {
            return Ok(None);
        }
        self.get(index, op).map(Some)
    }

    pub(crate) fn read_raw(&self, from: usize, count: usize, op: &'static str) -> ViewResult<Vec<u8>> {
        let shift = self.kind().shift();
        let mut bytes = vec![0u8; count << shift];
        self.view.target(op)?.read(from << shift, &mut bytes, op)?;
        Ok(bytes)
    }

    pub(crate) fn write_raw(&self, from: usize, bytes: &[u8], op: &'static str) -> ViewResult<()> {
        let shift = self.kind().shift();
        self.view.target(op)?.write(from << shift, bytes, op)
    }

    pub(crate) fn read_all(&self, from: usize, count: usize, op: &'static str) -> ViewResult<Vec<Numeric>> {
        let bytes = self.read_raw(from, count, op)?;
        Ok(self.kind().decode_all(&bytes))
    }

    pub(crate) fn write_all(&self, from: usize, values: &[Numeric], op: &'static str) -> ViewResult<()> {
        let bytes = self.kind().encode_all(values, op)?;
        self.write_raw(from, &bytes, op)
    }

    /// Overlap-safe move of `count` elements from `from` to `to`.
    pub(crate) fn move_within(&self, to: usize, from: usize, count: usize, op: &'static str) -> ViewResult<()> {
        let shift = self.kind().shift();
        self.view
            .target(op)?
            .copy_within(to << shift, from << shift, count << shift, op)
    }

    /// Store `value` into `[from, to)`.
    pub(crate) fn fill(&self, from: usize, to: usize, value: Numeric, op: &'static str) -> ViewResult<()> {
        let width = self.kind().byte_width();
        let mut pattern = [0u8; 8];
        self.kind().encode(value, &mut pattern[..width], op)?;
        let count = to.saturating_sub(from);
        let bytes: Vec<u8> = pattern[..width]
            .iter()
            .copied()
            .cycle()
            .take(count * width)
            .collect();
        self.write_raw(from, &bytes, op)
    }
}
