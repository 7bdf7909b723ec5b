//! In-place sorting through the positional contract.
//!
//! Non-dense layouts have no contiguous slice to hand to `sort_by`, so they
//! are sorted with a quicksort that only uses `get` and `exchange`.
//!
//! Both paths use the same total order: numeric order with NaN placed last,
//! in ascending and descending sorts alike.

use std::cmp::Ordering;

use crate::access::Storage;
use crate::scalar::Scalar;

/// Ranges at or below this length are finished with insertion sort.
const INSERTION_THRESHOLD: u64 = 16;

/// Ascending order with NaN after every number.
pub(crate) fn ascending<T: Scalar>(a: T, b: T) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

/// Descending order with NaN after every number.
pub(crate) fn descending<T: Scalar>(a: T, b: T) -> Ordering {
    b.partial_cmp(&a).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

pub(crate) fn sort_slice<T: Scalar, C: Fn(T, T) -> Ordering>(slice: &mut [T], compare: C) {
    slice.sort_by(|&a, &b| compare(a, b));
}

/// Sorts `[first, limit)` of `storage` by `compare`.
pub(crate) fn quicksort<T, S, C>(storage: &mut S, first: u64, limit: u64, compare: &C)
where
    T: Scalar,
    S: Storage<T> + ?Sized,
    C: Fn(T, T) -> Ordering,
{
    let mut lo = first;
    let mut hi = limit;

    while hi.saturating_sub(lo) > INSERTION_THRESHOLD {
        let (lt, gt) = partition(storage, lo, hi, compare);
        // Recurse into the smaller side to bound the stack depth.
        if lt - lo < hi - gt {
            quicksort(storage, lo, lt, compare);
            lo = gt;
        } else {
            quicksort(storage, gt, hi, compare);
            hi = lt;
        }
    }
    insertion_sort(storage, lo, hi, compare);
}

fn order<T, S, C>(storage: &mut S, a: u64, b: u64, compare: &C)
where
    T: Scalar,
    S: Storage<T> + ?Sized,
    C: Fn(T, T) -> Ordering,
{
    if compare(storage.get(b), storage.get(a)) == Ordering::Less {
        storage.exchange(a, b, 1, 1);
    }
}

/// Median-of-three pivot, three-way partition.
///
/// Returns `(lt, gt)` such that `[lo, lt)` sorts before the pivot,
/// `[lt, gt)` is equal to it and `[gt, hi)` sorts after it. Runs of equal
/// elements, such as the zeros of a sparse array, land in the middle band and
/// are never revisited.
fn partition<T, S, C>(storage: &mut S, lo: u64, hi: u64, compare: &C) -> (u64, u64)
where
    T: Scalar,
    S: Storage<T> + ?Sized,
    C: Fn(T, T) -> Ordering,
{
    let last = hi - 1;
    let mid = lo + (hi - lo) / 2;
    order(storage, lo, mid, compare);
    order(storage, mid, last, compare);
    order(storage, lo, mid, compare);

    let pivot = storage.get(mid);
    let mut lt = lo;
    let mut i = lo;
    let mut gt = hi;
    while i < gt {
        match compare(storage.get(i), pivot) {
            Ordering::Less => {
                if i != lt {
                    storage.exchange(i, lt, 1, 1);
                }
                lt += 1;
                i += 1;
            }
            Ordering::Greater => {
                gt -= 1;
                if i != gt {
                    storage.exchange(i, gt, 1, 1);
                }
            }
            Ordering::Equal => i += 1,
        }
    }
    (lt, gt)
}

fn insertion_sort<T, S, C>(storage: &mut S, lo: u64, hi: u64, compare: &C)
where
    T: Scalar,
    S: Storage<T> + ?Sized,
    C: Fn(T, T) -> Ordering,
{
    for i in lo.saturating_add(1)..hi {
        let mut j = i;
        while j > lo && compare(storage.get(j), storage.get(j - 1)) == Ordering::Less {
            storage.exchange(j, j - 1, 1, 1);
            j -= 1;
        }
    }
}
