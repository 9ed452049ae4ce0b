//! Iteration collaborator
//!
//! `entries`, `keys` and `values` validate the view and then ask an
//! [`IteratorFactory`] for the sequence. The default factory yields a
//! [`ViewSequence`] that re-checks the view on every pull: a detached view
//! yields one error and then ends.

use std::iter::FusedIterator;

use crate::error::ViewResult;
use crate::value::{Numeric, Value};
use crate::view::TypedView;

/// What each step of a sequence produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationMode {
    Keys,
    Values,
    Entries,
}

/// One step of a sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SequenceItem {
    Key(usize),
    Value(Numeric),
    Entry(usize, Numeric),
}

impl SequenceItem {
    /// The item as a script value; entries become their value part.
    pub fn value(&self) -> Value {
        match self {
            SequenceItem::Key(k) => Value::from(*k),
            SequenceItem::Value(v) | SequenceItem::Entry(_, v) => Value::from(*v),
        }
    }
}

/// Boxed sequence returned by a factory.
pub type ViewIterator = Box<dyn Iterator<Item = ViewResult<SequenceItem>> + Send>;

/// Produces lazy sequences over a view.
pub trait IteratorFactory {
    fn create_sequence(&self, view: &TypedView, mode: IterationMode) -> ViewIterator;
}

/// The built-in array iterator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayIteratorFactory;

impl IteratorFactory for ArrayIteratorFactory {
    fn create_sequence(&self, view: &TypedView, mode: IterationMode) -> ViewIterator {
        Box::new(ViewSequence::new(view.clone(), mode))
    }
}

/// Single-pass sequence over a view's elements.
#[derive(Debug)]
pub struct ViewSequence {
    /// `None` once exhausted or failed
    view: Option<TypedView>,
    mode: IterationMode,
    next: usize,
}

impl ViewSequence {
    pub fn new(view: TypedView, mode: IterationMode) -> Self {
        Self {
            view: Some(view),
            mode,
            next: 0,
        }
    }
}

impl Iterator for ViewSequence {
    type Item = ViewResult<SequenceItem>;

    fn next(&mut self) -> Option<Self::Item> {
        let view = self.view.as_ref()?;
        let index = self.next;
        match view.live().element_at(index, "iterator next") {
            Ok(Some(value)) => {
                self.next += 1;
                Some(Ok(match self.mode {
                    IterationMode::Keys => SequenceItem::Key(index),
                    IterationMode::Values => SequenceItem::Value(value),
                    IterationMode::Entries => SequenceItem::Entry(index, value),
                }))
            }
            Ok(None) => {
                self.view = None;
                None
            }
            Err(err) => {
                self.view = None;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for ViewSequence {}

impl TypedView {
    /// Sequence built by `factory` after validating the view.
    pub fn iterate_with(&self, factory: &dyn IteratorFactory, mode: IterationMode, op: &'static str) -> ViewResult<ViewIterator> {
        self.live().check(op)?;
        Ok(factory.create_sequence(self, mode))
    }

    pub fn entries(&self) -> ViewResult<ViewIterator> {
        self.iterate_with(&ArrayIteratorFactory, IterationMode::Entries, "entries")
    }

    pub fn keys(&self) -> ViewResult<ViewIterator> {
        self.iterate_with(&ArrayIteratorFactory, IterationMode::Keys, "keys")
    }

    pub fn values(&self) -> ViewResult<ViewIterator> {
        self.iterate_with(&ArrayIteratorFactory, IterationMode::Values, "values")
    }
}
