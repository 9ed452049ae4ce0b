//! View operations
//!
//! The operations exposed on [`TypedView`](crate::TypedView), grouped by
//! shape:
//! - `window`: fill, copy_within, reverse, slice, subarray, at
//! - `callback`: every, some, find, find_index, for_each, map, filter, reduce
//! - `search`: index_of, last_index_of, includes
//! - `text`: join, to_locale_string
//! - `construct`: from, of
//!
//! Every operation validates its receiver, normalizes bounds, and checks
//! liveness again after anything that can run user code (callbacks, value
//! coercion, species constructors). Length is never carried across a
//! callback.

pub mod callback;
pub mod construct;
pub mod search;
pub mod text;
pub mod window;

pub use construct::{ArrayLike, Source};

use crate::error::{ViewError, ViewResult};
use crate::value::{ScriptFunction, Value};

/// Borrow `value` as a function or report which argument was not callable.
pub(crate) fn callable<'a>(
    value: &'a Value,
    op: &'static str,
    arg_index: usize,
) -> ViewResult<&'a ScriptFunction> {
    value
        .as_function()
        .ok_or(ViewError::NotCallable { op, arg_index })
}
