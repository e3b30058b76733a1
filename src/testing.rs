//! Testing utilities
//!
//! Helpers for tests of code built on formwatch: assertion macros for
//! [`Validation`](crate::Validation), a value-map builder, a scroll target that
//! counts its calls, and property-based testing support behind the `proptest`
//! feature.
//!
//! # Examples
//!
//! ## Assertion Macros
//!
//! ```rust
//! use formwatch::{Validation, assert_success, assert_failure};
//!
//! let success = Validation::<_, Vec<String>>::success(42);
//! assert_success!(success);
//!
//! let failure = Validation::<i32, _>::failure(vec!["error".to_string()]);
//! assert_failure!(failure);
//! ```
//!
//! ## Value Maps
//!
//! ```rust
//! use formwatch::testing::form_values;
//! use formwatch::FieldValue;
//!
//! let values = form_values([("email", "a@b.co"), ("name", "")]);
//! assert_eq!(values.get("name"), Some(&FieldValue::from("")));
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::schedule::ScrollTarget;
use crate::value::{FieldValue, FormValues};

/// Build a [`FormValues`] map from name/value pairs
pub fn form_values<I, K, V>(pairs: I) -> FormValues
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<FieldValue>,
{
    pairs
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect()
}

/// A scroll target that only counts how often it was scrolled to
///
/// ```rust
/// use formwatch::schedule::ScrollTarget;
/// use formwatch::testing::RecordingScroll;
///
/// let target = RecordingScroll::new();
/// target.scroll_into_view();
/// assert_eq!(target.count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RecordingScroll {
    count: AtomicUsize,
}

impl RecordingScroll {
    /// A target that was never scrolled to
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scrolls so far
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl ScrollTarget for RecordingScroll {
    fn scroll_into_view(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Assert that a validation succeeds.
///
/// This macro will panic if the validation is a `Failure`.
///
/// # Example
///
/// ```rust
/// use formwatch::{Validation, assert_success};
///
/// let val = Validation::<_, Vec<String>>::success(42);
/// assert_success!(val);
/// ```
#[macro_export]
macro_rules! assert_success {
    ($validation:expr) => {
        match $validation {
            $crate::Validation::Success(_) => {}
            $crate::Validation::Failure(e) => {
                panic!("Expected Success, got Failure: {:?}", e);
            }
        }
    };
}

/// Assert that a validation fails.
///
/// This macro will panic if the validation is a `Success`.
///
/// # Example
///
/// ```rust
/// use formwatch::{Validation, assert_failure};
///
/// let val = Validation::<i32, _>::failure(vec!["error".to_string()]);
/// assert_failure!(val);
/// ```
#[macro_export]
macro_rules! assert_failure {
    ($validation:expr) => {
        match $validation {
            $crate::Validation::Failure(_) => {}
            $crate::Validation::Success(v) => {
                panic!("Expected Failure, got Success: {:?}", v);
            }
        }
    };
}

/// Assert that a validation fails with specific errors.
///
/// # Example
///
/// ```rust
/// use formwatch::{FieldError, Validation, assert_validation_errors};
///
/// let error = FieldError::new("email", "This field is required.");
/// let val = Validation::<(), _>::failure(vec![error.clone()]);
/// assert_validation_errors!(val, vec![error]);
/// ```
#[macro_export]
macro_rules! assert_validation_errors {
    ($validation:expr, $expected:expr) => {
        match $validation {
            $crate::Validation::Failure(errors) => {
                assert_eq!(errors, $expected);
            }
            $crate::Validation::Success(v) => {
                panic!(
                    "Expected Failure with errors {:?}, got Success: {:?}",
                    $expected, v
                );
            }
        }
    };
}

#[cfg(feature = "proptest")]
use crate::Validation;
#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl<T, E> Arbitrary for Validation<T, E>
where
    T: Arbitrary + 'static,
    E: Arbitrary + 'static,
    T::Strategy: 'static,
    E::Strategy: 'static,
{
    type Parameters = (T::Parameters, E::Parameters);
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        let (t_params, e_params) = args;
        prop_oneof![
            any_with::<T>(t_params).prop_map(Validation::success),
            any_with::<E>(e_params).prop_map(Validation::failure),
        ]
        .boxed()
    }
}

/// Values up to two levels deep; numbers are finite
#[cfg(feature = "proptest")]
impl Arbitrary for FieldValue {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        let leaf = prop_oneof![
            Just(FieldValue::Null),
            any::<bool>().prop_map(FieldValue::Bool),
            (-1.0e6..1.0e6f64).prop_map(FieldValue::Number),
            ".{0,24}".prop_map(FieldValue::Text),
        ];
        leaf.prop_recursive(2, 16, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(FieldValue::List),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(FieldValue::Map),
            ]
        })
        .boxed()
    }
}
