//! Validation outcomes and field error collections
//!
//! A single rule produces a [`Validation<(), String>`]: success, or exactly one
//! message. Batch validation accumulates these per field into [`FieldErrors`],
//! and a form pass reports an ordered list of [`FieldError`] values.
//!
//! # Examples
//!
//! ```
//! use formwatch::Validation;
//!
//! let v1 = Validation::<(), _>::failure(vec!["This field is required."]);
//! let v2 = Validation::<(), _>::failure(vec!["Must not be longer than 5 characters."]);
//!
//! assert_eq!(
//!     v1.and(v2).map(|_| ()),
//!     Validation::Failure(vec![
//!         "This field is required.",
//!         "Must not be longer than 5 characters.",
//!     ])
//! );
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::Semigroup;

/// A validation that either succeeds with a value or fails with accumulated errors
///
/// Unlike `Result`, combining two failed validations with [`Validation::and`]
/// keeps both errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T, E> {
    /// Successful validation with a value
    Success(T),
    /// Failed validation with accumulated errors
    Failure(E),
}

impl<T, E> Validation<T, E> {
    /// Create a successful validation
    #[inline]
    pub fn success(value: T) -> Self {
        Validation::Success(value)
    }

    /// Create a failed validation
    #[inline]
    pub fn failure(error: E) -> Self {
        Validation::Failure(error)
    }

    /// Create a validation from a Result
    ///
    /// # Examples
    ///
    /// ```
    /// use formwatch::Validation;
    ///
    /// let v = Validation::from_result(Err::<(), _>("Passwords do not match."));
    /// assert!(v.is_failure());
    /// ```
    #[inline]
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Validation::Success(value),
            Err(error) => Validation::Failure(error),
        }
    }

    /// Check if this validation is successful
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Validation::Success(_))
    }

    /// Check if this validation failed
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Validation::Failure(_))
    }

    /// Consume the validation and keep only the error
    #[inline]
    pub fn into_failure(self) -> Option<E> {
        match self {
            Validation::Success(_) => None,
            Validation::Failure(error) => Some(error),
        }
    }

    /// Transform the success value if present
    #[inline]
    pub fn map<U, F>(self, f: F) -> Validation<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Validation::Success(value) => Validation::Success(f(value)),
            Validation::Failure(error) => Validation::Failure(error),
        }
    }

    /// Transform the error value if present
    ///
    /// # Examples
    ///
    /// ```
    /// use formwatch::Validation;
    ///
    /// let v = Validation::<(), _>::failure("This field is required.");
    /// assert_eq!(
    ///     v.map_err(|m| vec![m.to_string()]),
    ///     Validation::Failure(vec!["This field is required.".to_string()])
    /// );
    /// ```
    #[inline]
    pub fn map_err<E2, F>(self, f: F) -> Validation<T, E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Validation::Success(value) => Validation::Success(value),
            Validation::Failure(error) => Validation::Failure(f(error)),
        }
    }
}

impl<T, E: Semigroup> Validation<T, E> {
    /// Combine two validations, accumulating errors using the Semigroup instance
    pub fn and<U>(self, other: Validation<U, E>) -> Validation<(T, U), E> {
        match (self, other) {
            (Validation::Success(a), Validation::Success(b)) => Validation::Success((a, b)),
            (Validation::Failure(e1), Validation::Failure(e2)) => {
                Validation::Failure(e1.combine(e2))
            }
            (Validation::Failure(e), _) => Validation::Failure(e),
            (_, Validation::Failure(e)) => Validation::Failure(e),
        }
    }

    /// Combine all validations of an iterator, in order
    ///
    /// # Examples
    ///
    /// ```
    /// use formwatch::Validation;
    ///
    /// let result = Validation::all_of(vec![
    ///     Validation::<(), _>::failure(vec!["a"]),
    ///     Validation::success(()),
    ///     Validation::failure(vec!["b"]),
    /// ]);
    /// assert_eq!(result, Validation::Failure(vec!["a", "b"]));
    /// ```
    pub fn all_of<I>(validations: I) -> Validation<Vec<T>, E>
    where
        I: IntoIterator<Item = Validation<T, E>>,
    {
        let mut successes = Vec::new();
        let mut failure: Option<E> = None;

        for validation in validations {
            match validation {
                Validation::Success(value) => successes.push(value),
                Validation::Failure(error) => {
                    failure = Some(match failure {
                        Some(acc) => acc.combine(error),
                        None => error,
                    });
                }
            }
        }

        match failure {
            Some(error) => Validation::Failure(error),
            None => Validation::Success(successes),
        }
    }
}

/// One failed field in a form pass
///
/// `field` is the field's name, or its label when no name was given.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldError {
    /// Name (or label) of the failing field
    pub field: String,
    /// Human readable message of the first failing rule
    pub message: String,
}

impl FieldError {
    /// Create a new field error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}

/// Every message every field produced in a batch run, keyed by field name
///
/// Fields without failures are absent. Messages keep rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// An empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection holding the messages of a single field
    pub fn single(field: impl Into<String>, messages: Vec<String>) -> Self {
        let mut errors = Self::new();
        errors.extend_field(field, messages);
        errors
    }

    /// Append messages for `field`, skipping empty message lists
    pub fn extend_field(&mut self, field: impl Into<String>, messages: Vec<String>) {
        if messages.is_empty() {
            return;
        }
        self.0.entry(field.into()).or_default().extend(messages);
    }

    /// Messages recorded for `field`
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// True when no field failed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over failing fields and their messages
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// First message of each failing field, the shape a form pass reports
    pub fn first_errors(&self) -> Vec<FieldError> {
        self.iter()
            .filter_map(|(field, messages)| {
                messages.first().map(|m| FieldError::new(field, m.clone()))
            })
            .collect()
    }

    /// Convert into a validation: success when empty
    pub fn into_validation(self) -> Validation<(), FieldErrors> {
        if self.is_empty() {
            Validation::success(())
        } else {
            Validation::failure(self)
        }
    }
}

impl Semigroup for FieldErrors {
    fn combine(mut self, other: Self) -> Self {
        for (field, messages) in other.0 {
            self.extend_field(field, messages);
        }
        self
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, messages)) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", field, messages.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_both_failure_accumulates() {
        let v1 = Validation::<(), _>::failure(vec!["error1"]);
        let v2 = Validation::<(), _>::failure(vec!["error2"]);
        assert_eq!(v1.and(v2), Validation::Failure(vec!["error1", "error2"]));
    }

    #[test]
    fn test_and_second_failure() {
        let v1 = Validation::<_, Vec<&str>>::success(1);
        let v2 = Validation::<i32, _>::failure(vec!["error"]);
        assert_eq!(v1.and(v2), Validation::Failure(vec!["error"]));
    }

    #[test]
    fn test_all_of_empty_is_success() {
        let result = Validation::<(), Vec<&str>>::all_of(vec![]);
        assert_eq!(result, Validation::Success(vec![]));
    }

    #[test]
    fn test_into_failure() {
        let v = Validation::<(), _>::failure("Passwords do not match.");
        assert_eq!(v.into_failure(), Some("Passwords do not match."));
        assert_eq!(Validation::<(), &str>::success(()).into_failure(), None);
    }

    #[test]
    fn test_field_errors_skip_empty_message_lists() {
        let mut errors = FieldErrors::new();
        errors.extend_field("email", vec![]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_field_errors_combine_merges_same_field() {
        let a = FieldErrors::single("contact", vec!["This field is required.".into()]);
        let b = FieldErrors::single(
            "contact",
            vec!["Must not be shorter than 5 characters.".into()],
        );
        let merged = a.combine(b);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get("contact").map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_first_errors() {
        let errors = FieldErrors::single(
            "firstName",
            vec!["This field is required.".into(), "second".into()],
        );
        assert_eq!(
            errors.first_errors(),
            vec![FieldError::new("firstName", "This field is required.")]
        );
    }

    #[test]
    fn test_field_error_display() {
        let err = FieldError::new("email", "This must be a valid email address.");
        assert_eq!(err.to_string(), "email: This must be a valid email address.");
    }
}
