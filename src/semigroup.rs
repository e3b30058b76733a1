//! Semigroup trait for accumulating rule failures
//!
//! Batch validation never stops at the first failing rule: every message a field
//! produces is kept, and messages coming from different rules (or different
//! fields) are merged with an associative `combine`.
//!
//! # Examples
//!
//! ```
//! use formwatch::Semigroup;
//!
//! let first = vec!["This field is required.".to_string()];
//! let second = vec!["Must not be longer than 5 characters.".to_string()];
//! assert_eq!(first.combine(second).len(), 2);
//! ```

/// A type that supports an associative binary operation
///
/// # Laws
///
/// Implementations must satisfy the associativity law:
/// ```text
/// a.combine(b).combine(c) == a.combine(b.combine(c))
/// ```
///
/// `combine` takes `self` by value; clone first if the original is still needed.
pub trait Semigroup: Sized {
    /// Combine this value with another value associatively
    fn combine(self, other: Self) -> Self;
}

impl<T> Semigroup for Vec<T> {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }
}

impl Semigroup for String {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.push_str(&other);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_semigroup_keeps_order() {
        let v1 = vec!["a", "b"];
        let v2 = vec!["c"];
        assert_eq!(v1.combine(v2), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_string_semigroup() {
        let s = "Must not ".to_string().combine("be empty".to_string());
        assert_eq!(s, "Must not be empty");
    }

    #[test]
    fn test_vec_associativity() {
        let a = vec![1];
        let b = vec![2];
        let c = vec![3];
        assert_eq!(
            a.clone().combine(b.clone()).combine(c.clone()),
            a.combine(b.combine(c))
        );
    }
}
