//! Field and form options
//!
//! Options are plain builders, set once when a field or form is created.
//!
//! ```rust
//! use formwatch::config::AgentOptions;
//! use std::time::Duration;
//!
//! let options = AgentOptions::named("email")
//!     .with_label("E-mail address")
//!     .with_scroll_delay(Duration::from_millis(50));
//! assert_eq!(options.error_label(), "email");
//! ```

use std::time::Duration;

/// Delay between a pass's first error and scrolling its field into view
pub const DEFAULT_SCROLL_DELAY: Duration = Duration::from_millis(200);

/// Options of one field
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentOptions {
    /// Field name, used as error label and passed to predicate rules
    pub name: String,
    /// Display label, the error label when `name` is empty
    pub label: String,
    /// Keep the field out of form validation
    pub skip_validation: bool,
    /// Delay before the scroll-into-view effect
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub scroll_delay: Duration,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            name: String::new(),
            label: String::new(),
            skip_validation: false,
            scroll_delay: DEFAULT_SCROLL_DELAY,
        }
    }
}

impl AgentOptions {
    /// Options for a named field
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Exclude the field from form validation
    pub fn skip_validation(mut self, skip: bool) -> Self {
        self.skip_validation = skip;
        self
    }

    /// Set the scroll delay
    pub fn with_scroll_delay(mut self, delay: Duration) -> Self {
        self.scroll_delay = delay;
        self
    }

    /// Label used in form errors: the name, or the label when unnamed
    pub fn error_label(&self) -> &str {
        if self.name.is_empty() {
            &self.label
        } else {
            &self.name
        }
    }

    /// The name, when there is one
    pub fn field_name(&self) -> Option<&str> {
        (!self.name.is_empty()).then_some(self.name.as_str())
    }
}

/// Options of one form
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FormOptions {
    /// Scroll delay given to fields mounted without their own
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub scroll_delay: Duration,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            scroll_delay: DEFAULT_SCROLL_DELAY,
        }
    }
}

impl FormOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scroll delay
    pub fn with_scroll_delay(mut self, delay: Duration) -> Self {
        self.scroll_delay = delay;
        self
    }
}

#[cfg(feature = "serde")]
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
