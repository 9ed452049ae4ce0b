//! In-place quicksort: median-of-three pivot, three-way partition,
//! insertion sort for short runs. Recurses into the smaller side only.

/// Sort `v` by `less`, finishing runs of at most `insertion_threshold`
/// elements with insertion sort.
pub fn quick_sort<T, F>(mut v: &mut [T], insertion_threshold: usize, less: &F)
where
    T: Copy,
    F: Fn(&T, &T) -> bool,
{
    let threshold = insertion_threshold.max(1);
    loop {
        if v.len() <= threshold {
            insertion_sort(v, less);
            return;
        }
        let pivot = median_of_three(v, less);
        let (lt, gt) = partition(v, pivot, less);

        let (left, rest) = std::mem::take(&mut v).split_at_mut(lt);
        let right = &mut rest[gt - lt..];
        if left.len() < right.len() {
            quick_sort(left, threshold, less);
            v = right;
        } else {
            quick_sort(right, threshold, less);
            v = left;
        }
    }
}

/// Stable insertion sort.
pub fn insertion_sort<T, F>(v: &mut [T], less: &F)
where
    T: Copy,
    F: Fn(&T, &T) -> bool,
{
    for i in 1..v.len() {
        let mut j = i;
        while j > 0 && less(&v[j], &v[j - 1]) {
            v.swap(j, j - 1);
            j -= 1;
        }
    }
}

fn median_of_three<T, F>(v: &[T], less: &F) -> T
where
    T: Copy,
    F: Fn(&T, &T) -> bool,
{
    let a = v[0];
    let b = v[v.len() / 2];
    let c = v[v.len() - 1];
    if less(&a, &b) {
        if less(&b, &c) {
            b
        } else if less(&a, &c) {
            c
        } else {
            a
        }
    } else if less(&a, &c) {
        a
    } else if less(&b, &c) {
        c
    } else {
        b
    }
}

/// Rearrange into `[< pivot][== pivot][> pivot]`, returning the bounds of
/// the middle block.
fn partition<T, F>(v: &mut [T], pivot: T, less: &F) -> (usize, usize)
where
    T: Copy,
    F: Fn(&T, &T) -> bool,
{
    let (mut lt, mut i, mut gt) = (0, 0, v.len());
    while i < gt {
        if less(&v[i], &pivot) {
            v.swap(lt, i);
            lt += 1;
            i += 1;
        } else if less(&pivot, &v[i]) {
            gt -= 1;
            v.swap(i, gt);
        } else {
            i += 1;
        }
    }
    (lt, gt)
}
