//! Binary search seeded with a position hint.
//!
//! Callers tend to search the same page repeatedly with keys that move
//! monotonically, so the first probe goes to `hint - 1` (the slot after the
//! previous hit) instead of the midpoint. After the first probe the search
//! continues as a classic binary search.
//!
//! Results follow the negative-insertion-point convention: a hit returns the
//! non-negative index, a miss returns `-(insertion_point) - 1`.

use std::cmp::Ordering;
use std::convert::Infallible;

/// Hinted binary search over `size` sorted elements.
///
/// `compare(i)` must return the ordering of the searched key relative to the
/// element at index `i`. A hint outside `1..=size` means "no hint" and the
/// first probe goes to the midpoint. `size == 0` returns `-1` without
/// probing.
pub fn binary_search_with_hint<F>(size: usize, hint: isize, mut compare: F) -> isize
where
    F: FnMut(usize) -> Ordering,
{
    match try_binary_search_with_hint::<Infallible, _>(size, hint, |i| Ok(compare(i))) {
        Ok(index) => index,
        Err(never) => match never {},
    }
}

/// [`binary_search_with_hint`] for comparators that can fail. The first
/// error aborts the search.
pub fn try_binary_search_with_hint<E, F>(size: usize, hint: isize, mut compare: F) -> Result<isize, E>
where
    F: FnMut(usize) -> Result<Ordering, E>,
{
    if size == 0 {
        return Ok(-1);
    }
    let mut low: isize = 0;
    let mut high: isize = size as isize - 1;
    let mut x = hint
        .checked_sub(1)
        .filter(|probe| (0..=high).contains(probe))
        .unwrap_or(high >> 1);
    while low <= high {
        match compare(x as usize)? {
            Ordering::Greater => low = x + 1,
            Ordering::Less => high = x - 1,
            Ordering::Equal => return Ok(x),
        }
        x = ((low + high) as usize >> 1) as isize;
    }
    Ok(-(low + 1))
}

/// Convert a search result into the `Result<usize, usize>` shape of
/// `slice::binary_search`: `Ok(index)` on a hit, `Err(insertion_point)` on a
/// miss.
pub fn search_position(index: isize) -> Result<usize, usize> {
    if index >= 0 {
        Ok(index as usize)
    } else {
        Err((-(index + 1)) as usize)
    }
}

/// The hint to pass to the next search after `index` was returned.
pub fn next_hint(index: isize) -> isize {
    match search_position(index) {
        Ok(hit) => hit as isize + 1,
        Err(insertion) => insertion as isize + 1,
    }
}
