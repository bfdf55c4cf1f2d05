//! The extended non-negative integer domain used for delete-relaxation and
//! heuristic values: an explicit sum type in place of a floating-point
//! infinity sentinel.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

/// Either a finite non-negative cost, or an explicit "unreachable" value.
///
/// `Infinite` is the top element of the total order: `Finite(n) < Infinite`
/// for every `n`, and `Infinite` absorbs addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtInt {
    Finite(u32),
    Infinite,
}

impl ExtInt {
    pub const ZERO: ExtInt = ExtInt::Finite(0);

    pub fn is_infinite(self) -> bool {
        matches!(self, ExtInt::Infinite)
    }

    pub fn finite(self) -> Option<u32> {
        match self {
            ExtInt::Finite(n) => Some(n),
            ExtInt::Infinite => None,
        }
    }
}

impl PartialOrd for ExtInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExtInt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ExtInt::Finite(a), ExtInt::Finite(b)) => a.cmp(b),
            (ExtInt::Finite(_), ExtInt::Infinite) => Ordering::Less,
            (ExtInt::Infinite, ExtInt::Finite(_)) => Ordering::Greater,
            (ExtInt::Infinite, ExtInt::Infinite) => Ordering::Equal,
        }
    }
}

impl Add for ExtInt {
    type Output = ExtInt;

    fn add(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (ExtInt::Finite(a), ExtInt::Finite(b)) => ExtInt::Finite(a.saturating_add(b)),
            _ => ExtInt::Infinite,
        }
    }
}

impl From<u32> for ExtInt {
    fn from(n: u32) -> Self {
        ExtInt::Finite(n)
    }
}

impl fmt::Display for ExtInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtInt::Finite(n) => write!(f, "{n}"),
            ExtInt::Infinite => write!(f, "infinity"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_places_infinite_last() {
        assert!(ExtInt::Finite(5) < ExtInt::Infinite);
        assert!(ExtInt::Finite(5) < ExtInt::Finite(6));
        assert_eq!(ExtInt::Infinite, ExtInt::Infinite);
    }

    #[test]
    fn addition_absorbs_infinite() {
        assert_eq!(ExtInt::Finite(2) + ExtInt::Finite(3), ExtInt::Finite(5));
        assert_eq!(ExtInt::Finite(2) + ExtInt::Infinite, ExtInt::Infinite);
        assert_eq!(ExtInt::ZERO + ExtInt::Finite(7), ExtInt::Finite(7));
    }

    #[test]
    fn addition_saturates_instead_of_wrapping() {
        assert_eq!(ExtInt::Finite(u32::MAX) + ExtInt::Finite(1), ExtInt::Finite(u32::MAX));
        assert_eq!(ExtInt::Finite(u32::MAX - 1) + ExtInt::Finite(2), ExtInt::Finite(u32::MAX));
    }

    #[test]
    fn max_over_empty_goal_is_zero() {
        let goal_deltas: Vec<ExtInt> = vec![];
        let h = goal_deltas.into_iter().max().unwrap_or(ExtInt::ZERO);
        assert_eq!(h, ExtInt::ZERO);
    }
}
