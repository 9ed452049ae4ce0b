//! Window operations: fill, copy_within, reverse, slice, subarray, at

use tracing::trace;

use crate::bounds::{relative_index, Bounds};
use crate::error::ViewResult;
use crate::species::{species_create_with_buffer, species_create_with_length};
use crate::value::{Numeric, Value};
use crate::view::TypedView;

impl TypedView {
    /// Store `value` into every element of the `start..end` window.
    pub fn fill(&self, value: &Value, start: &Value, end: &Value) -> ViewResult<&Self> {
        const OP: &str = "fill";
        let live = self.live();
        let len = live.check(OP)?;

        let value = self.kind().coerce(value, OP)?;
        let bounds = Bounds::normalize(start, end, len, OP)?;

        let bounds = bounds.clamp_to(live.check(OP)?);
        if !bounds.is_empty() {
            live.fill(bounds.from, bounds.to, value, OP)?;
        }
        Ok(self)
    }

    /// Move the `start..end` block to `target`, as if through a temporary
    /// copy.
    pub fn copy_within(&self, target: &Value, start: &Value, end: &Value) -> ViewResult<&Self> {
        const OP: &str = "copy_within";
        let live = self.live();
        let len = live.check(OP)?;

        let to = relative_index(target.to_integer_or_infinity(OP)?, len);
        let from = relative_index(start.to_integer_or_infinity(OP)?, len);
        let last = if end.is_undefined() {
            len
        } else {
            relative_index(end.to_integer_or_infinity(OP)?, len)
        };
        let count = last.saturating_sub(from).min(len - to);
        if count == 0 {
            return Ok(self);
        }

        // The coercions above may have shrunk the view.
        let len = live.check(OP)?;
        if from >= len || to >= len {
            return Ok(self);
        }
        let count = count.min(len - from).min(len - to);
        live.move_within(to, from, count, OP)?;
        Ok(self)
    }

    /// Reverse the elements in place.
    pub fn reverse(&self) -> ViewResult<&Self> {
        const OP: &str = "reverse";
        let live = self.live();
        let len = live.check(OP)?;
        let mut values = live.read_all(0, len, OP)?;
        values.reverse();
        live.write_all(0, &values, OP)?;
        Ok(self)
    }

    /// Copy the `start..end` window into a new view from this view's species.
    pub fn slice(&self, start: &Value, end: &Value) -> ViewResult<TypedView> {
        const OP: &str = "slice";
        let live = self.live();
        let len = live.check(OP)?;
        let bounds = Bounds::normalize(start, end, len, OP)?;

        let result = species_create_with_length(self, bounds.count, OP)?;
        if bounds.is_empty() {
            return Ok(result);
        }

        // The species constructor is user code.
        let len = live.check(OP)?;
        let window = bounds.clamp_to(len);
        if result.kind() == self.kind() && window.to == bounds.to {
            trace!(kind = %self.kind(), count = bounds.count, "slice bulk copy");
            let bytes = live.read_raw(bounds.from, bounds.count, OP)?;
            result.live().write_raw(0, &bytes, OP)?;
        } else {
            let out = result.live();
            for (n, k) in (window.from..window.to).enumerate() {
                let value = live.get(k, OP)?;
                out.set(n, value, OP)?;
            }
        }
        Ok(result)
    }

    /// A new view over the `begin..end` window of the same buffer.
    ///
    /// Succeeds on a detached view, producing an empty view.
    pub fn subarray(&self, begin: &Value, end: &Value) -> ViewResult<TypedView> {
        const OP: &str = "subarray";
        let buffer = self.buffer();
        let len = self.length();
        let bounds = Bounds::normalize(begin, end, len, OP)?;
        let byte_offset = self.raw_byte_offset() + (bounds.from << self.kind().shift());
        species_create_with_buffer(self, buffer, byte_offset, bounds.count, OP)
    }

    /// Element at a relative index; negative counts from the end.
    pub fn at(&self, index: &Value) -> ViewResult<Option<Numeric>> {
        const OP: &str = "at";
        let live = self.live();
        let len = live.check(OP)?;
        let relative = index.to_integer_or_infinity(OP)?;
        let k = if relative >= 0.0 {
            relative
        } else {
            len as f64 + relative
        };
        if k < 0.0 || k >= len as f64 {
            return Ok(None);
        }
        live.element_at(k as usize, OP)
    }
}
