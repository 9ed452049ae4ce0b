//! Stable bottom-up merge sort with a fallible comparator
//!
//! The comparator may fail (user code raised, or the view was detached);
//! the first failure aborts the sort and is returned as is.

use std::cmp::Ordering;

use crate::error::ViewResult;

/// Sort `items` stably by `cmp`. Runs of `insertion_threshold` elements are
/// sorted by insertion first, then merged pairwise.
pub fn merge_sort<T, F>(items: &mut [T], insertion_threshold: usize, cmp: &mut F) -> ViewResult<()>
where
    T: Copy,
    F: FnMut(&T, &T) -> ViewResult<Ordering>,
{
    let len = items.len();
    if len <= 1 {
        return Ok(());
    }
    let run = insertion_threshold.max(1);
    for chunk in items.chunks_mut(run) {
        insertion_sort(chunk, cmp)?;
    }

    let mut buf = items.to_vec();
    let mut in_items = true;
    let mut width = run;
    while width < len {
        let (src, dst) = if in_items {
            (&*items, &mut buf[..])
        } else {
            (&buf[..], &mut *items)
        };
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            merge(&src[start..mid], &src[mid..end], &mut dst[start..end], cmp)?;
            start = end;
        }
        in_items = !in_items;
        width *= 2;
    }
    if !in_items {
        items.copy_from_slice(&buf);
    }
    Ok(())
}

fn insertion_sort<T, F>(v: &mut [T], cmp: &mut F) -> ViewResult<()>
where
    T: Copy,
    F: FnMut(&T, &T) -> ViewResult<Ordering>,
{
    for i in 1..v.len() {
        let mut j = i;
        while j > 0 && cmp(&v[j], &v[j - 1])? == Ordering::Less {
            v.swap(j, j - 1);
            j -= 1;
        }
    }
    Ok(())
}

/// Merge two sorted runs, taking from `left` on ties.
fn merge<T, F>(left: &[T], right: &[T], out: &mut [T], cmp: &mut F) -> ViewResult<()>
where
    T: Copy,
    F: FnMut(&T, &T) -> ViewResult<Ordering>,
{
    let (mut i, mut j, mut k) = (0, 0, 0);
    while i < left.len() && j < right.len() {
        if cmp(&right[j], &left[i])? == Ordering::Less {
            out[k] = right[j];
            j += 1;
        } else {
            out[k] = left[i];
            i += 1;
        }
        k += 1;
    }
    out[k..k + left.len() - i].copy_from_slice(&left[i..]);
    k += left.len() - i;
    out[k..].copy_from_slice(&right[j..]);
    Ok(())
}
