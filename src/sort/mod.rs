//! Sort engine
//!
//! `sort` without a comparator picks a strategy from the element kind:
//! - 8-bit kinds: counting sort
//! - 16/32-bit integers and Float32: LSD radix sort (quicksort when short)
//! - 64-bit kinds and Float64: quicksort
//!
//! With a comparator the elements are snapshotted, merge sorted stably
//! through the comparator, and written back over whatever length the view
//! has afterwards.

pub mod compare;
pub mod counting;
pub mod merge;
pub mod quick;
pub mod radix;

pub use compare::{compare_numeric, total_order};

use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use crate::config::{EngineConfig, SortConfig};
use crate::error::{ViewError, ViewResult};
use crate::kind::ElementKind;
use crate::value::{ScriptFunction, Value};
use crate::view::TypedView;
use compare::UserComparator;

/// Algorithm used for one sort call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortStrategy {
    Counting,
    Radix,
    Quick,
    Merge,
}

/// Strategy for sorting `len` elements of `kind`.
pub fn select_strategy(
    kind: ElementKind,
    len: usize,
    has_comparator: bool,
    config: &SortConfig,
) -> SortStrategy {
    if has_comparator {
        return SortStrategy::Merge;
    }
    match kind.byte_width() {
        1 => SortStrategy::Counting,
        2 | 4 if len >= config.radix_threshold => SortStrategy::Radix,
        _ => SortStrategy::Quick,
    }
}

impl TypedView {
    /// Sort in place. `comparator` is `Undefined` for the default numeric
    /// order or a function returning a negative, zero or positive number.
    pub fn sort(&self, comparator: &Value) -> ViewResult<&Self> {
        const OP: &str = "sort";
        let compare_fn = match comparator {
            Value::Undefined => None,
            Value::Function(f) => Some(f),
            _ => return Err(ViewError::NotCallable { op: OP, arg_index: 0 }),
        };

        let live = self.live();
        let len = live.check(OP)?;
        if len <= 1 {
            return Ok(self);
        }

        let config = EngineConfig::current();
        let strategy = select_strategy(self.kind(), len, compare_fn.is_some(), &config.sort);
        debug!(op = OP, kind = %self.kind(), len, ?strategy, "sorting typed view");

        match compare_fn {
            Some(f) => self.sort_with_comparator(f, len, config.sort.insertion_threshold)?,
            None => {
                let mut bytes = live.read_raw(0, len, OP)?;
                sort_bytes(self.kind(), strategy, &mut bytes, config.sort.insertion_threshold)?;
                live.write_raw(0, &bytes, OP)?;
            }
        }
        Ok(self)
    }

    fn sort_with_comparator(
        &self,
        f: &ScriptFunction,
        len: usize,
        insertion_threshold: usize,
    ) -> ViewResult<()> {
        const OP: &str = "sort";
        let live = self.live();
        let mut values = live.read_all(0, len, OP)?;

        let comparator = UserComparator::new(self, f);
        merge::merge_sort(&mut values, insertion_threshold, &mut |a, b| {
            comparator.compare(a, b)
        })?;

        let len = live.check(OP)?;
        let n = values.len().min(len);
        live.write_all(0, &values[..n], OP)
    }
}

/// Sort raw native-endian elements of `kind` with the default ordering.
pub fn sort_bytes(
    kind: ElementKind,
    strategy: SortStrategy,
    bytes: &mut [u8],
    insertion_threshold: usize,
) -> ViewResult<()> {
    match strategy {
        SortStrategy::Counting => counting::counting_sort(bytes, kind.is_signed()),
        SortStrategy::Radix => radix::radix_sort(bytes, kind),
        SortStrategy::Quick | SortStrategy::Merge => {
            let mut values = kind.decode_all(bytes);
            quick::quick_sort(&mut values, insertion_threshold, &|a, b| {
                compare_numeric(a, b) == Ordering::Less
            });
            let sorted = kind.encode_all(&values, "sort")?;
            bytes.copy_from_slice(&sorted);
        }
    }
    Ok(())
}
