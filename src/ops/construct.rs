//! Static constructors: from, of

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::callable;
use crate::error::{ViewError, ViewResult};
use crate::kind::ElementKind;
use crate::species::{create_with_length, ViewFactory};
use crate::value::{Numeric, ScriptFunction, Value};
use crate::view::TypedView;

/// An object with a `length` and indexed elements.
pub trait ArrayLike: Send + Sync {
    fn length(&self) -> ViewResult<Value>;
    fn get(&self, index: usize) -> ViewResult<Value>;
}

impl ArrayLike for Vec<Value> {
    fn length(&self) -> ViewResult<Value> {
        Ok(Value::from(self.len()))
    }

    fn get(&self, index: usize) -> ViewResult<Value> {
        Ok(self.as_slice().get(index).cloned().unwrap_or_default())
    }
}

/// Input to [`TypedView::from_source`].
pub enum Source {
    /// Another view; same-kind copies are done in bulk
    View(TypedView),
    /// A packed list of values
    Dense(Vec<Value>),
    /// Anything iterable; drained into a list before construction
    Iterable(Box<dyn Iterator<Item = ViewResult<Value>> + Send>),
    /// Read through `length` and indexed gets
    ArrayLike(Arc<dyn ArrayLike>),
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::View(view) => f.debug_tuple("View").field(view).finish(),
            Source::Dense(values) => f.debug_tuple("Dense").field(&values.len()).finish(),
            Source::Iterable(_) => f.write_str("Iterable"),
            Source::ArrayLike(_) => f.write_str("ArrayLike"),
        }
    }
}

impl TypedView {
    /// Build a view with `ctor` from `source`, optionally mapping each value
    /// through `map_fn` (called with `(value, index)` and `this_arg`).
    pub fn from_source(
        ctor: &dyn ViewFactory,
        source: Source,
        map_fn: &Value,
        this_arg: &Value,
    ) -> ViewResult<TypedView> {
        const OP: &str = "from";
        let mapper = if map_fn.is_undefined() {
            None
        } else {
            Some(callable(map_fn, OP, 1)?)
        };

        if mapper.is_none() {
            if let Some(kind) = ctor.intrinsic_kind() {
                match source {
                    Source::View(src) => return from_view_bulk(ctor, kind, &src),
                    Source::Dense(values) => return from_dense_bulk(ctor, kind, &values),
                    other => return from_values(ctor, other, None, this_arg),
                }
            }
        }
        from_values(ctor, source, mapper, this_arg)
    }

    /// Build a view with `ctor` holding `items`.
    pub fn of(ctor: &dyn ViewFactory, items: &[Value]) -> ViewResult<TypedView> {
        const OP: &str = "of";
        let target = create_with_length(ctor, items.len(), OP)?;
        let out = target.live();
        for (k, item) in items.iter().enumerate() {
            out.store(k, item, OP)?;
        }
        Ok(target)
    }
}

fn from_view_bulk(ctor: &dyn ViewFactory, kind: ElementKind, src: &TypedView) -> ViewResult<TypedView> {
    const OP: &str = "from";
    let src_live = src.live();
    let len = src_live.check(OP)?;
    let target = create_with_length(ctor, len, OP)?;
    if target.kind() == src.kind() {
        trace!(kind = %kind, len, "from bulk copy");
        let bytes = src_live.read_raw(0, len, OP)?;
        target.live().write_raw(0, &bytes, OP)?;
    } else {
        let values = src_live.read_all(0, len, OP)?;
        target.live().write_all(0, &values, OP)?;
    }
    Ok(target)
}

fn from_dense_bulk(ctor: &dyn ViewFactory, kind: ElementKind, values: &[Value]) -> ViewResult<TypedView> {
    const OP: &str = "from";
    let coerced = values
        .iter()
        .map(|v| kind.coerce(v, OP))
        .collect::<ViewResult<Vec<Numeric>>>()?;
    let target = create_with_length(ctor, coerced.len(), OP)?;
    target.live().write_all(0, &coerced, OP)?;
    Ok(target)
}

fn from_values(
    ctor: &dyn ViewFactory,
    source: Source,
    mapper: Option<&ScriptFunction>,
    this_arg: &Value,
) -> ViewResult<TypedView> {
    const OP: &str = "from";
    let values: Vec<Value> = match source {
        Source::View(src) => src
            .values()?
            .map(|item| item.map(|i| i.value()))
            .collect::<ViewResult<_>>()?,
        Source::Dense(values) => values,
        Source::Iterable(iter) => iter.collect::<ViewResult<_>>()?,
        Source::ArrayLike(object) => return from_array_like(ctor, object.as_ref(), mapper, this_arg),
    };

    let target = create_with_length(ctor, values.len(), OP)?;
    let out = target.live();
    for (k, value) in values.into_iter().enumerate() {
        let value = match mapper {
            Some(f) => f.call(this_arg, &[value, Value::from(k)])?,
            None => value,
        };
        out.store(k, &value, OP)?;
    }
    Ok(target)
}

fn from_array_like(
    ctor: &dyn ViewFactory,
    object: &dyn ArrayLike,
    mapper: Option<&ScriptFunction>,
    this_arg: &Value,
) -> ViewResult<TypedView> {
    const OP: &str = "from";
    let len = object.length()?.to_length(OP)?;
    let target = create_with_length(ctor, len, OP)?;
    let out = target.live();
    for k in 0..len {
        let value = object.get(k)?;
        let value = match mapper {
            Some(f) => f.call(this_arg, &[value, Value::from(k)])?,
            None => value,
        };
        out.store(k, &value, OP)?;
    }
    if out.len() < len {
        return Err(ViewError::ShortResult {
            op: OP,
            requested: len,
            actual: out.len(),
        });
    }
    Ok(target)
}
