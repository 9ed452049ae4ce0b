//! Element searches
//!
//! `index_of` and `last_index_of` use strict equality, `includes` uses
//! SameValueZero. The from-index coercion can run user code, so liveness is
//! checked again after it and the scan covers only the part of the entry
//! window that is still in bounds.

use crate::bounds::relative_index;
use crate::error::ViewResult;
use crate::value::{Numeric, Value};
use crate::view::TypedView;

/// The element-comparable form of a search value, if any.
fn needle(search: &Value) -> Option<Numeric> {
    match search {
        Value::Number(n) => Some(Numeric::Number(*n)),
        Value::BigInt(n) => Some(Numeric::BigInt(*n)),
        _ => None,
    }
}

impl TypedView {
    /// First index holding `search` at or after `from_index`.
    pub fn index_of(&self, search: &Value, from_index: &Value) -> ViewResult<Option<usize>> {
        const OP: &str = "index_of";
        let live = self.live();
        let len = live.check(OP)?;
        if len == 0 {
            return Ok(None);
        }
        let n = from_index.to_integer_or_infinity(OP)?;
        if n >= len as f64 {
            return Ok(None);
        }
        let start = relative_index(n, len);

        // A grown view is still searched only up to the entry length.
        let len = live.check(OP)?.min(len);
        let Some(needle) = needle(search) else {
            return Ok(None);
        };
        if start >= len {
            return Ok(None);
        }
        let values = live.read_all(start, len - start, OP)?;
        Ok(values
            .iter()
            .position(|v| v.strict_equals(&needle))
            .map(|i| start + i))
    }

    /// Last index holding `search` at or before `from_index`.
    ///
    /// An absent `from_index` searches from the end; a present one is
    /// coerced, so `Some(&Value::Undefined)` searches from index 0.
    pub fn last_index_of(&self, search: &Value, from_index: Option<&Value>) -> ViewResult<Option<usize>> {
        const OP: &str = "last_index_of";
        let live = self.live();
        let len = live.check(OP)?;
        if len == 0 {
            return Ok(None);
        }
        let n = match from_index {
            Some(value) => value.to_integer_or_infinity(OP)?,
            None => len as f64 - 1.0,
        };
        let k = if n >= 0.0 {
            n.min(len as f64 - 1.0)
        } else {
            len as f64 + n
        };
        if k < 0.0 {
            return Ok(None);
        }

        let len = live.check(OP)?;
        let Some(needle) = needle(search) else {
            return Ok(None);
        };
        if len == 0 {
            return Ok(None);
        }
        let k = (k as usize).min(len - 1);
        let values = live.read_all(0, k + 1, OP)?;
        Ok(values.iter().rposition(|v| v.strict_equals(&needle)))
    }

    /// Whether any element at or after `from_index` is SameValueZero to
    /// `search`. Finds NaN.
    pub fn includes(&self, search: &Value, from_index: &Value) -> ViewResult<bool> {
        const OP: &str = "includes";
        let live = self.live();
        let len = live.check(OP)?;
        if len == 0 {
            return Ok(false);
        }
        let n = from_index.to_integer_or_infinity(OP)?;
        if n >= len as f64 {
            return Ok(false);
        }
        let start = relative_index(n, len);

        let len = live.check(OP)?.min(len);
        let Some(needle) = needle(search) else {
            return Ok(false);
        };
        if start >= len {
            return Ok(false);
        }
        let values = live.read_all(start, len - start, OP)?;
        Ok(values.iter().any(|v| v.same_value_zero(&needle)))
    }
}
