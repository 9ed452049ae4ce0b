//! Callback-driven operations
//!
//! Callbacks receive `(value, index, view)`; reducers receive
//! `(accumulator, value, index, view)`. Before each element the view is
//! checked again: a detached view fails the operation, a shrunk view ends
//! the iteration early. Iteration never passes the length read on entry,
//! even if a callback grows the view.

use super::callable;
use crate::error::{ViewError, ViewResult};
use crate::species::species_create_with_length;
use crate::value::{Numeric, ScriptFunction, Value};
use crate::view::TypedView;

impl TypedView {
    fn call_element(
        &self,
        f: &ScriptFunction,
        this_arg: &Value,
        value: Numeric,
        index: usize,
    ) -> ViewResult<Value> {
        f.call(
            this_arg,
            &[Value::from(value), Value::from(index), Value::View(self.clone())],
        )
    }

    /// Run `visit` for each element until it returns `Some`.
    fn scan<R>(
        &self,
        op: &'static str,
        callback: &Value,
        this_arg: &Value,
        mut visit: impl FnMut(usize, Numeric, Value) -> Option<R>,
    ) -> ViewResult<Option<R>> {
        let live = self.live();
        let len = live.check(op)?;
        let f = callable(callback, op, 0)?;

        for k in 0..len {
            let Some(value) = live.element_at(k, op)? else {
                break;
            };
            let result = self.call_element(f, this_arg, value, k)?;
            if let Some(found) = visit(k, value, result) {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// True when `callback` returns a truthy value for every element.
    pub fn every(&self, callback: &Value, this_arg: &Value) -> ViewResult<bool> {
        let failed = self.scan("every", callback, this_arg, |_, _, r| {
            (!r.to_boolean()).then_some(())
        })?;
        Ok(failed.is_none())
    }

    /// True when `callback` returns a truthy value for some element.
    pub fn some(&self, callback: &Value, this_arg: &Value) -> ViewResult<bool> {
        let found = self.scan("some", callback, this_arg, |_, _, r| r.to_boolean().then_some(()))?;
        Ok(found.is_some())
    }

    /// First element for which `predicate` is truthy.
    pub fn find(&self, predicate: &Value, this_arg: &Value) -> ViewResult<Option<Numeric>> {
        self.scan("find", predicate, this_arg, |_, v, r| r.to_boolean().then_some(v))
    }

    /// Index of the first element for which `predicate` is truthy.
    pub fn find_index(&self, predicate: &Value, this_arg: &Value) -> ViewResult<Option<usize>> {
        self.scan("find_index", predicate, this_arg, |k, _, r| r.to_boolean().then_some(k))
    }

    /// Last element for which `predicate` is truthy.
    pub fn find_last(&self, predicate: &Value, this_arg: &Value) -> ViewResult<Option<Numeric>> {
        Ok(self
            .scan_back("find_last", predicate, this_arg)?
            .map(|(_, v)| v))
    }

    /// Index of the last element for which `predicate` is truthy.
    pub fn find_last_index(&self, predicate: &Value, this_arg: &Value) -> ViewResult<Option<usize>> {
        Ok(self
            .scan_back("find_last_index", predicate, this_arg)?
            .map(|(k, _)| k))
    }

    fn scan_back(
        &self,
        op: &'static str,
        predicate: &Value,
        this_arg: &Value,
    ) -> ViewResult<Option<(usize, Numeric)>> {
        let live = self.live();
        let mut k = live.check(op)?;
        let f = callable(predicate, op, 0)?;
        while k > 0 {
            k -= 1;
            let Some(value) = live.element_at(k, op)? else {
                continue;
            };
            if self.call_element(f, this_arg, value, k)?.to_boolean() {
                return Ok(Some((k, value)));
            }
        }
        Ok(None)
    }

    /// Call `callback` on each element.
    pub fn for_each(&self, callback: &Value, this_arg: &Value) -> ViewResult<()> {
        self.scan("for_each", callback, this_arg, |_, _, _| None::<()>)?;
        Ok(())
    }

    /// New view (from this view's species) of the callback results.
    pub fn map(&self, callback: &Value, this_arg: &Value) -> ViewResult<TypedView> {
        const OP: &str = "map";
        let live = self.live();
        let len = live.check(OP)?;
        let f = callable(callback, OP, 0)?;
        let result = species_create_with_length(self, len, OP)?;
        let out = result.live();

        for k in 0..len {
            let Some(value) = live.element_at(k, OP)? else {
                break;
            };
            let mapped = self.call_element(f, this_arg, value, k)?;
            out.store(k, &mapped, OP)?;
        }
        Ok(result)
    }

    /// New view (from this view's species) of the elements that pass.
    pub fn filter(&self, predicate: &Value, this_arg: &Value) -> ViewResult<TypedView> {
        const OP: &str = "filter";
        let mut kept = Vec::new();
        self.scan(OP, predicate, this_arg, |_, v, r| {
            if r.to_boolean() {
                kept.push(v);
            }
            None::<()>
        })?;

        let result = species_create_with_length(self, kept.len(), OP)?;
        let out = result.live();
        for (n, value) in kept.into_iter().enumerate() {
            out.store(n, &Value::from(value), OP)?;
        }
        Ok(result)
    }

    /// Left fold. Without `initial` the first element seeds the accumulator.
    pub fn reduce(&self, callback: &Value, initial: Option<&Value>) -> ViewResult<Value> {
        const OP: &str = "reduce";
        let live = self.live();
        let len = live.check(OP)?;
        let f = callable(callback, OP, 0)?;

        let (mut acc, first) = match initial {
            Some(seed) => (seed.clone(), 0),
            None if len == 0 => return Err(ViewError::EmptyReduction { op: OP }),
            None => (Value::from(live.get(0, OP)?), 1),
        };
        for k in first..len {
            let Some(value) = live.element_at(k, OP)? else {
                break;
            };
            acc = self.call_reducer(f, acc, value, k)?;
        }
        Ok(acc)
    }

    /// Right fold. Without `initial` the last element seeds the accumulator.
    pub fn reduce_right(&self, callback: &Value, initial: Option<&Value>) -> ViewResult<Value> {
        const OP: &str = "reduce_right";
        let live = self.live();
        let len = live.check(OP)?;
        let f = callable(callback, OP, 0)?;

        let (mut acc, mut k) = match initial {
            Some(seed) => (seed.clone(), len),
            None if len == 0 => return Err(ViewError::EmptyReduction { op: OP }),
            None => (Value::from(live.get(len - 1, OP)?), len - 1),
        };
        while k > 0 {
            k -= 1;
            let Some(value) = live.element_at(k, OP)? else {
                continue;
            };
            acc = self.call_reducer(f, acc, value, k)?;
        }
        Ok(acc)
    }

    fn call_reducer(&self, f: &ScriptFunction, acc: Value, value: Numeric, index: usize) -> ViewResult<Value> {
        f.call(
            &Value::Undefined,
            &[acc, Value::from(value), Value::from(index), Value::View(self.clone())],
        )
    }
}
