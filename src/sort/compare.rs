//! Element orderings
//!
//! The default ordering is total: `-0` sorts before `+0` and NaNs sort last,
//! equal to each other. User comparators go through [`UserComparator`],
//! which also notices when the comparator detached the view.

use std::cmp::Ordering;

use crate::error::ViewResult;
use crate::value::{Numeric, ScriptFunction, Value};
use crate::view::TypedView;

/// Total order over numbers used by the default sort.
pub fn total_order(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    if a < b {
        Ordering::Less
    } else if a > b {
        Ordering::Greater
    } else if a == 0.0 {
        // +0 and -0
        b.is_sign_negative().cmp(&a.is_sign_negative())
    } else {
        Ordering::Equal
    }
}

/// Default ordering between two element values of the same kind.
pub fn compare_numeric(a: &Numeric, b: &Numeric) -> Ordering {
    match (a, b) {
        (Numeric::Number(a), Numeric::Number(b)) => total_order(*a, *b),
        (Numeric::BigInt(a), Numeric::BigInt(b)) => a.cmp(b),
        (Numeric::Number(_), Numeric::BigInt(_)) => Ordering::Less,
        (Numeric::BigInt(_), Numeric::Number(_)) => Ordering::Greater,
    }
}

/// A user comparator bound to the view being sorted.
pub(crate) struct UserComparator<'a> {
    view: &'a TypedView,
    f: &'a ScriptFunction,
}

impl<'a> UserComparator<'a> {
    pub(crate) fn new(view: &'a TypedView, f: &'a ScriptFunction) -> Self {
        Self { view, f }
    }

    /// Call the comparator; its result is coerced to a number with NaN
    /// treated as 0.
    pub(crate) fn compare(&self, a: &Numeric, b: &Numeric) -> ViewResult<Ordering> {
        const OP: &str = "sort";
        let result = self
            .f
            .call(&Value::Undefined, &[Value::from(*a), Value::from(*b)])?;
        let v = result.to_number(OP)?;

        let live = self.view.live();
        if live.is_empty() {
            live.check(OP)?;
        }

        Ok(if v < 0.0 {
            Ordering::Less
        } else if v > 0.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        })
    }
}
