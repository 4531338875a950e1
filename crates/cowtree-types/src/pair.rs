use std::fmt;

use serde::{Deserialize, Serialize};

/// Composite key of a 32-bit and a 64-bit signed integer.
///
/// Ordering: `first` → `second` (total order, signed comparison).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntLongPair {
    first: i32,
    second: i64,
}

impl IntLongPair {
    /// Encoded width in bytes: 4-byte int followed by 8-byte long.
    pub const BYTES: usize = 12;

    pub const fn new(first: i32, second: i64) -> Self {
        Self { first, second }
    }

    pub const fn first(&self) -> i32 {
        self.first
    }

    pub const fn second(&self) -> i64 {
        self.second
    }
}

impl fmt::Debug for IntLongPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IntLongPair({}, {})", self.first, self.second)
    }
}

impl fmt::Display for IntLongPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first, self.second)
    }
}

impl From<(i32, i64)> for IntLongPair {
    fn from((first, second): (i32, i64)) -> Self {
        Self::new(first, second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_first_then_second() {
        assert!(IntLongPair::new(1, 100) < IntLongPair::new(2, 0));
        assert!(IntLongPair::new(1, 5) < IntLongPair::new(1, 6));
        assert_eq!(IntLongPair::new(3, 3), IntLongPair::from((3, 3)));
    }

    #[test]
    fn negative_values_sort_first() {
        assert!(IntLongPair::new(-1, 0) < IntLongPair::new(0, 0));
        assert!(IntLongPair::new(0, i64::MIN) < IntLongPair::new(0, -1));
    }

    #[test]
    fn display_format() {
        assert_eq!(IntLongPair::new(4, -2).to_string(), "4:-2");
    }
}
