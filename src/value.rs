//! Dynamically-typed field values
//!
//! Inputs hand their agents whatever they hold: text, numbers, toggles, lists of
//! selected options. [`FieldValue`] models that shape and gives it the two
//! things validation needs: a notion of blankness and structural equality.

use std::collections::BTreeMap;
use std::fmt;

/// Values of every field of a form, keyed by field name
pub type FormValues = BTreeMap<String, FieldValue>;

/// The value held by one input
///
/// Equality is structural for every variant, so composite values compare by
/// content and not by identity.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    /// No value at all
    #[default]
    Null,
    /// A toggle or checkbox
    Bool(bool),
    /// Any numeric input
    Number(f64),
    /// Free text
    Text(String),
    /// Multi-select and other list inputs
    List(Vec<FieldValue>),
    /// Grouped inputs
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// True for the values a `required` rule rejects
    ///
    /// Null, empty text, empty lists and maps, `false`, zero and NaN are blank.
    ///
    /// ```
    /// use formwatch::FieldValue;
    ///
    /// assert!(FieldValue::from("").is_blank());
    /// assert!(FieldValue::Null.is_blank());
    /// assert!(!FieldValue::from("Doe").is_blank());
    /// ```
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Bool(b) => !b,
            FieldValue::Number(n) => *n == 0.0 || n.is_nan(),
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Map(entries) => entries.is_empty(),
        }
    }

    /// The text, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view used by `min`/`max` on non-text values
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Length of values that have one: characters of text, items of lists and maps
    pub fn len(&self) -> Option<usize> {
        match self {
            FieldValue::Text(s) => Some(s.chars().count()),
            FieldValue::List(items) => Some(items.len()),
            FieldValue::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// True for text values
    pub fn is_text(&self) -> bool {
        matches!(self, FieldValue::Text(_))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            FieldValue::Map(_) => write!(f, "[object]"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(value: Vec<T>) -> Self {
        FieldValue::List(value.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values() {
        assert!(FieldValue::Null.is_blank());
        assert!(FieldValue::from("").is_blank());
        assert!(FieldValue::from(false).is_blank());
        assert!(FieldValue::from(0).is_blank());
        assert!(FieldValue::from(Vec::<String>::new()).is_blank());
        assert!(FieldValue::Map(BTreeMap::new()).is_blank());
    }

    #[test]
    fn test_non_blank_values() {
        assert!(!FieldValue::from(" ").is_blank());
        assert!(!FieldValue::from(3).is_blank());
        assert!(!FieldValue::from(true).is_blank());
        assert!(!FieldValue::from(vec!["a"]).is_blank());
    }

    #[test]
    fn test_len_counts_chars_not_bytes() {
        assert_eq!(FieldValue::from("€€").len(), Some(2));
        assert_eq!(FieldValue::from(12).len(), None);
    }

    #[test]
    fn test_structural_equality_of_composites() {
        let a = FieldValue::from(vec!["x", "y"]);
        let b = FieldValue::from(vec!["x".to_string(), "y".to_string()]);
        assert_eq!(a, b);
        assert_ne!(a, FieldValue::from(vec!["y", "x"]));
    }

    #[test]
    fn test_display_matches_plain_text() {
        assert_eq!(FieldValue::from(50).to_string(), "50");
        assert_eq!(FieldValue::from(vec![1, 2]).to_string(), "1,2");
        assert_eq!(FieldValue::Null.to_string(), "null");
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(FieldValue::from(None::<&str>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some("a")), FieldValue::from("a"));
    }
}
