//! Stable merge sort.
//!
//! Returns a new vector and leaves the input alone. O(n log n) comparisons,
//! O(n) auxiliary space. Elements that compare equal keep their input order.

use std::cmp::Ordering;

/// Sort by natural ordering.
pub fn merge_sort<T: Ord + Clone>(items: &[T]) -> Vec<T> {
    merge_sort_by(items, |a, b| a.cmp(b))
}

/// Sort with a comparator.
pub fn merge_sort_by<T, F>(items: &[T], mut compare: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    sort_slice(items, &mut compare)
}

fn sort_slice<T, F>(items: &[T], compare: &mut F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items.to_vec();
    }
    let (left, right) = items.split_at(items.len() / 2);
    let left = sort_slice(left, compare);
    let right = sort_slice(right, compare);
    merge(left, right, compare)
}

fn merge<T, F>(left: Vec<T>, right: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut out = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(l, r) != Ordering::Greater,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_left { left.next() } else { right.next() };
        out.extend(next);
    }
    out
}
