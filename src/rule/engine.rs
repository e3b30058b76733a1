//! The built-in rule engine
//!
//! [`evaluate`] checks one named rule against one value. [`validate_all`] is the
//! bulk entry point: every rule of every field runs, and every message is kept.
//!
//! # Example
//!
//! ```rust
//! use formwatch::rule::engine::evaluate;
//! use formwatch::rule::RuleKind;
//! use formwatch::{FieldValue, FormValues, Validation};
//!
//! let values = FormValues::new();
//! let result = evaluate(RuleKind::Max, &FieldValue::from("toolong"), Some(3.0), &values);
//! assert_eq!(
//!     result,
//!     Validation::Failure("Must not be longer than 3 characters.".to_string())
//! );
//! ```

use std::sync::LazyLock;

use regex::Regex;

use super::{RuleKind, RuleSet};
use crate::validation::FieldErrors;
use crate::value::{FieldValue, FormValues};
use crate::Validation;

/// Message of a failed `required` rule
pub const REQUIRED_MESSAGE: &str = "This field is required.";
/// Message of a failed `email` rule
pub const EMAIL_MESSAGE: &str = "This must be a valid email address.";
/// Message of a failed `password` rule
pub const PASSWORD_MESSAGE: &str = r#"Must have at least 8 characters, upper & lowercase letters, a number and a special character (@#$_&-+()/*'":;!?~`|€^={}[]<>.,\)."#;
/// Message of a failed `confirmation` rule
pub const CONFIRMATION_MESSAGE: &str = "Passwords do not match.";

/// Minimum password length in characters
pub const PASSWORD_MIN_LEN: usize = 8;

/// Field compared against by `confirmation`
pub const CONFIRMATION_TARGET: &str = "password";

// Anchored at the end only.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email pattern compiles")
});

/// Check `value` against one built-in rule
///
/// `param` is the bound of `min`/`max`; those rules pass when it is missing.
/// `all_values` is only read by `confirmation`.
pub fn evaluate(
    kind: RuleKind,
    value: &FieldValue,
    param: Option<f64>,
    all_values: &FormValues,
) -> Validation<(), String> {
    let failed = match kind {
        RuleKind::Required => value.is_blank().then(|| REQUIRED_MESSAGE.to_string()),
        RuleKind::Email => (!is_email(value)).then(|| EMAIL_MESSAGE.to_string()),
        RuleKind::Password => (!is_strong_password(value)).then(|| PASSWORD_MESSAGE.to_string()),
        RuleKind::Confirmation => {
            let target = all_values
                .get(CONFIRMATION_TARGET)
                .unwrap_or(&FieldValue::Null);
            (value != target).then(|| CONFIRMATION_MESSAGE.to_string())
        }
        RuleKind::Max => bound(kind, param).and_then(|max| exceeds_max(value, max)),
        RuleKind::Min => bound(kind, param).and_then(|min| below_min(value, min)),
    };

    match failed {
        Some(message) => Validation::failure(message),
        None => Validation::success(()),
    }
}

/// Run every rule of every field and keep every message
///
/// Fields absent from `values` are checked as [`FieldValue::Null`]. Predicate
/// rules receive the field name.
pub fn validate_all(values: &FormValues, rules: &RuleSet) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for (field, descriptors) in rules.iter() {
        let value = values.get(field).unwrap_or(&FieldValue::Null);
        let checks = descriptors
            .iter()
            .map(|rule| rule.check(value, Some(field), values).map_err(|m| vec![m]));
        if let Some(messages) = Validation::all_of(checks).into_failure() {
            errors.extend_field(field, messages);
        }
    }
    errors
}

fn bound(kind: RuleKind, param: Option<f64>) -> Option<f64> {
    if param.is_none() {
        #[cfg(feature = "tracing")]
        tracing::warn!(rule = %kind, "rule has no bound, skipping");
        #[cfg(not(feature = "tracing"))]
        let _ = kind;
    }
    param
}

fn is_email(value: &FieldValue) -> bool {
    // Blank values are left to `required`.
    if value.is_blank() {
        return true;
    }
    EMAIL_PATTERN.is_match(&value.to_string())
}

fn is_strong_password(value: &FieldValue) -> bool {
    let text = value.to_string();
    let lower = text.chars().any(|c| c.is_ascii_lowercase());
    let upper = text.chars().any(|c| c.is_ascii_uppercase());
    let digit = text.chars().any(|c| c.is_ascii_digit());
    let special = text.chars().any(|c| !c.is_ascii_alphanumeric());
    lower && upper && digit && special && text.chars().count() >= PASSWORD_MIN_LEN
}

fn exceeds_max(value: &FieldValue, max: f64) -> Option<String> {
    match value {
        FieldValue::Text(s) => {
            let len = s.chars().count() as f64;
            (len > max).then(|| format!("Must not be longer than {} characters.", max))
        }
        other => other
            .as_number()
            .filter(|n| *n > max)
            .map(|_| format!("Must not be greater than {}.", max)),
    }
}

fn below_min(value: &FieldValue, min: f64) -> Option<String> {
    let len = value.len().filter(|len| *len > 0)? as f64;
    if len >= min {
        return None;
    }
    if value.is_text() {
        Some(format!("Must not be shorter than {} characters.", min))
    } else {
        Some(format!("Must not be less than {}.", min))
    }
}
