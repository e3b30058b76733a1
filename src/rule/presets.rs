//! Ready-made rule sets

use super::engine::validate_all;
use super::{RuleDescriptor, RuleSet};
use crate::validation::FieldErrors;
use crate::value::FormValues;

/// Rules of the user profile form
///
/// `firstName` and `lastName` are required and at most 50 characters, `email`
/// is a required email address, `contact` is required and 5 to 15 characters.
pub fn user_info() -> RuleSet {
    RuleSet::new()
        .field(
            "firstName",
            vec![RuleDescriptor::required(), RuleDescriptor::max(50.0)],
        )
        .field(
            "lastName",
            vec![RuleDescriptor::required(), RuleDescriptor::max(50.0)],
        )
        .field(
            "email",
            vec![RuleDescriptor::required(), RuleDescriptor::email()],
        )
        .field(
            "contact",
            vec![
                RuleDescriptor::required(),
                RuleDescriptor::min(5.0),
                RuleDescriptor::max(15.0),
            ],
        )
}

/// Validate a user profile in bulk
///
/// ```rust
/// use formwatch::rule::presets::validate_user_info;
/// use formwatch::{FieldValue, FormValues};
///
/// let mut values = FormValues::new();
/// values.insert("firstName".into(), FieldValue::from("Jane"));
/// values.insert("lastName".into(), FieldValue::from("Doe"));
/// values.insert("email".into(), FieldValue::from("jane@doe.org"));
/// values.insert("contact".into(), FieldValue::from("555-0100"));
///
/// assert!(validate_user_info(&values).is_empty());
/// ```
pub fn validate_user_info(values: &FormValues) -> FieldErrors {
    validate_all(values, &user_info())
}
