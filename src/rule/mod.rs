//! Rule descriptors and rule sets
//!
//! A field validates against an ordered list of [`RuleDescriptor`]s. A
//! descriptor is either one of the built-in named rules (checked by
//! [`engine::evaluate`]), an opaque predicate closure, or a factory that builds
//! such a predicate on demand.
//!
//! # Example
//!
//! ```rust
//! use formwatch::rule::{RuleDescriptor, RuleSet};
//! use formwatch::rule::engine::validate_all;
//! use formwatch::{FieldValue, FormValues};
//!
//! let rules = RuleSet::new()
//!     .field("email", vec![RuleDescriptor::required(), RuleDescriptor::email()]);
//!
//! let mut values = FormValues::new();
//! values.insert("email".into(), FieldValue::from("not-an-email"));
//!
//! let errors = validate_all(&values, &rules);
//! assert_eq!(
//!     errors.get("email").unwrap(),
//!     &["This must be a valid email address.".to_string()]
//! );
//! ```

pub mod engine;
pub mod presets;
pub mod resolver;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::value::{FieldValue, FormValues};
use crate::Validation;

pub use resolver::{ListResolver, PipeResolver};

/// Outcome of a predicate rule: `Ok(())` or the failure message
pub type RuleCheck = Result<(), String>;

/// A predicate rule: receives the value and, when known, the field name
pub type RuleFn = Arc<dyn Fn(&FieldValue, Option<&str>) -> RuleCheck + Send + Sync>;

/// A curried rule: called with no arguments to obtain the concrete predicate
pub type RuleFactory = Arc<dyn Fn() -> RuleFn + Send + Sync>;

/// Message fragments that mark a rule as rejecting empty input
///
/// Used only by the best-effort [`RuleDescriptor::probes_as_required`].
pub const EMPTY_VALUE_SIGNATURES: &[&str] = &["shouldn't be empty.", engine::REQUIRED_MESSAGE];

/// The built-in rules understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RuleKind {
    /// Value must not be blank
    Required,
    /// Value must look like an email address
    Email,
    /// Value must be a strong password
    Password,
    /// Value must equal the form's `password` value
    Confirmation,
    /// Minimum length of text or lists
    Min,
    /// Maximum length of text, maximum of numbers
    Max,
}

impl RuleKind {
    /// Name used in rule strings
    pub fn name(self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Email => "email",
            RuleKind::Password => "password",
            RuleKind::Confirmation => "confirmation",
            RuleKind::Min => "min",
            RuleKind::Max => "max",
        }
    }

    /// Whether the rule needs a numeric parameter
    pub fn takes_param(self) -> bool {
        matches!(self, RuleKind::Min | RuleKind::Max)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown rule name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRule(pub String);

impl fmt::Display for UnknownRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown validation rule `{}`", self.0)
    }
}

impl std::error::Error for UnknownRule {}

impl FromStr for RuleKind {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "required" => Ok(RuleKind::Required),
            "email" => Ok(RuleKind::Email),
            "password" => Ok(RuleKind::Password),
            "confirmation" => Ok(RuleKind::Confirmation),
            "min" => Ok(RuleKind::Min),
            "max" => Ok(RuleKind::Max),
            other => Err(UnknownRule(other.to_string())),
        }
    }
}

/// A built-in rule together with its optional parameter
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamedRule {
    /// Which rule
    pub kind: RuleKind,
    /// `min`/`max` bound
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub param: Option<f64>,
}

/// One validation rule attached to a field
#[derive(Clone)]
pub enum RuleDescriptor {
    /// A built-in rule
    Named(NamedRule),
    /// An opaque predicate
    Predicate(RuleFn),
    /// A predicate built on demand
    Factory(RuleFactory),
}

impl RuleDescriptor {
    /// Built-in rule without parameter
    pub fn named(kind: RuleKind) -> Self {
        RuleDescriptor::Named(NamedRule { kind, param: None })
    }

    /// Built-in rule with a parameter
    pub fn with_param(kind: RuleKind, param: f64) -> Self {
        RuleDescriptor::Named(NamedRule {
            kind,
            param: Some(param),
        })
    }

    /// `required`
    pub fn required() -> Self {
        Self::named(RuleKind::Required)
    }

    /// `email`
    pub fn email() -> Self {
        Self::named(RuleKind::Email)
    }

    /// `password`
    pub fn password() -> Self {
        Self::named(RuleKind::Password)
    }

    /// `confirmation`
    pub fn confirmation() -> Self {
        Self::named(RuleKind::Confirmation)
    }

    /// `min:{min}`
    pub fn min(min: f64) -> Self {
        Self::with_param(RuleKind::Min, min)
    }

    /// `max:{max}`
    pub fn max(max: f64) -> Self {
        Self::with_param(RuleKind::Max, max)
    }

    /// Wrap a predicate closure
    ///
    /// ```
    /// use formwatch::rule::RuleDescriptor;
    /// use formwatch::FieldValue;
    ///
    /// let rule = RuleDescriptor::predicate(|value, _field| match value.as_text() {
    ///     Some(s) if s.starts_with("+") => Ok(()),
    ///     _ => Err("Must start with +".to_string()),
    /// });
    /// assert!(rule.check(&FieldValue::from("+31"), None, &Default::default()).is_success());
    /// ```
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&FieldValue, Option<&str>) -> RuleCheck + Send + Sync + 'static,
    {
        RuleDescriptor::Predicate(Arc::new(f))
    }

    /// Wrap a factory returning the predicate to run
    pub fn factory<F>(f: F) -> Self
    where
        F: Fn() -> RuleFn + Send + Sync + 'static,
    {
        RuleDescriptor::Factory(Arc::new(f))
    }

    /// The built-in kind, if this is a named rule
    pub fn kind(&self) -> Option<RuleKind> {
        match self {
            RuleDescriptor::Named(rule) => Some(rule.kind),
            _ => None,
        }
    }

    /// Check `value` against this rule
    ///
    /// Factories are invoked first to obtain the concrete predicate. Named rules
    /// read sibling values (for `confirmation`) from `all_values`.
    pub fn check(
        &self,
        value: &FieldValue,
        field: Option<&str>,
        all_values: &FormValues,
    ) -> Validation<(), String> {
        match self {
            RuleDescriptor::Named(rule) => {
                engine::evaluate(rule.kind, value, rule.param, all_values)
            }
            RuleDescriptor::Predicate(f) => Validation::from_result(f(value, field)),
            RuleDescriptor::Factory(make) => Validation::from_result(make()(value, field)),
        }
    }

    /// Best-effort guess whether this rule behaves like `required`
    ///
    /// Named rules answer exactly. Closures are probed with an empty value and
    /// their message is matched against [`EMPTY_VALUE_SIGNATURES`]; closures with
    /// other wording, or that accept empty text, are missed.
    pub fn probes_as_required(&self) -> bool {
        let probe = FieldValue::from("");
        let message = match self {
            RuleDescriptor::Named(rule) => return rule.kind == RuleKind::Required,
            RuleDescriptor::Predicate(f) => f(&probe, None).err(),
            RuleDescriptor::Factory(make) => make()(&probe, None).err(),
        };
        message.is_some_and(|m| EMPTY_VALUE_SIGNATURES.iter().any(|sig| m.contains(sig)))
    }
}

impl fmt::Debug for RuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleDescriptor::Named(rule) => f.debug_tuple("Named").field(rule).finish(),
            RuleDescriptor::Predicate(_) => f.write_str("Predicate(<fn>)"),
            RuleDescriptor::Factory(_) => f.write_str("Factory(<fn>)"),
        }
    }
}

impl From<NamedRule> for RuleDescriptor {
    fn from(rule: NamedRule) -> Self {
        RuleDescriptor::Named(rule)
    }
}

/// An entry of a rule list: a descriptor or a rule string still to be parsed
#[derive(Debug, Clone)]
pub enum RuleItem {
    /// Rule string in `rule1|rule2:param` grammar
    Text(String),
    /// Ready descriptor
    Rule(RuleDescriptor),
}

impl From<RuleDescriptor> for RuleItem {
    fn from(rule: RuleDescriptor) -> Self {
        RuleItem::Rule(rule)
    }
}

impl From<&str> for RuleItem {
    fn from(text: &str) -> Self {
        RuleItem::Text(text.to_string())
    }
}

/// Where a field's rules come from
#[derive(Debug, Clone, Default)]
pub enum RuleSource {
    /// No rules
    #[default]
    None,
    /// A rule string, e.g. `"required|max:50"`
    Text(String),
    /// Descriptors mixed with rule strings, kept in the given order
    List(Vec<RuleItem>),
}

impl RuleSource {
    /// Resolve into the ordered descriptor list
    pub fn resolve(&self, resolver: &dyn ListResolver) -> Vec<RuleDescriptor> {
        match self {
            RuleSource::None => Vec::new(),
            RuleSource::Text(text) => resolver.parse(text),
            RuleSource::List(items) => items
                .iter()
                .flat_map(|item| match item {
                    RuleItem::Text(text) => resolver.parse(text),
                    RuleItem::Rule(rule) => vec![rule.clone()],
                })
                .collect(),
        }
    }

    /// Best-effort `required` detection without resolving closures' results
    ///
    /// Rule strings count when one of their `|`-separated tokens starts with
    /// `required`; descriptors use [`RuleDescriptor::probes_as_required`].
    pub fn mentions_required(&self) -> bool {
        fn text_mentions(text: &str) -> bool {
            text.split('|')
                .map(str::trim)
                .any(|token| token.split(':').next() == Some("required"))
        }

        match self {
            RuleSource::None => false,
            RuleSource::Text(text) => text_mentions(text),
            RuleSource::List(items) => items.iter().any(|item| match item {
                RuleItem::Text(text) => text_mentions(text),
                RuleItem::Rule(rule) => rule.probes_as_required(),
            }),
        }
    }
}

impl From<&str> for RuleSource {
    fn from(text: &str) -> Self {
        RuleSource::Text(text.to_string())
    }
}

impl From<String> for RuleSource {
    fn from(text: String) -> Self {
        RuleSource::Text(text)
    }
}

impl From<Vec<RuleDescriptor>> for RuleSource {
    fn from(rules: Vec<RuleDescriptor>) -> Self {
        RuleSource::List(rules.into_iter().map(RuleItem::Rule).collect())
    }
}

impl From<Vec<RuleItem>> for RuleSource {
    fn from(items: Vec<RuleItem>) -> Self {
        RuleSource::List(items)
    }
}

/// Rules for several fields, in declaration order
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    fields: Vec<(String, Vec<RuleDescriptor>)>,
}

impl RuleSet {
    /// An empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rules for a field; a repeated field appends to its rules
    pub fn field(mut self, name: impl Into<String>, rules: Vec<RuleDescriptor>) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => existing.extend(rules),
            None => self.fields.push((name, rules)),
        }
        self
    }

    /// Iterate over fields and their rules
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RuleDescriptor])> {
        self.fields
            .iter()
            .map(|(name, rules)| (name.as_str(), rules.as_slice()))
    }

    /// Number of fields with rules
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no field has rules
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_name() {
        for kind in [
            RuleKind::Required,
            RuleKind::Email,
            RuleKind::Password,
            RuleKind::Confirmation,
            RuleKind::Min,
            RuleKind::Max,
        ] {
            assert_eq!(kind.name().parse::<RuleKind>(), Ok(kind));
        }
        assert_eq!(
            "between".parse::<RuleKind>(),
            Err(UnknownRule("between".into()))
        );
    }

    #[test]
    fn test_factory_is_invoked_before_checking() {
        let rule = RuleDescriptor::factory(|| -> RuleFn {
            Arc::new(|value: &FieldValue, field: Option<&str>| {
                if value.is_blank() {
                    Err(format!("{} shouldn't be empty.", field.unwrap_or("value")))
                } else {
                    Ok(())
                }
            })
        });

        let result = rule.check(&FieldValue::from(""), Some("nickname"), &FormValues::new());
        assert_eq!(
            result,
            Validation::Failure("nickname shouldn't be empty.".to_string())
        );
    }

    #[test]
    fn test_probes_as_required_for_closures() {
        let probe_hit = RuleDescriptor::predicate(|v, _| {
            if v.is_blank() {
                Err("Field shouldn't be empty.".into())
            } else {
                Ok(())
            }
        });
        let probe_miss = RuleDescriptor::predicate(|_, _| Err("Always wrong.".into()));

        assert!(probe_hit.probes_as_required());
        assert!(!probe_miss.probes_as_required());
        assert!(RuleDescriptor::required().probes_as_required());
        assert!(!RuleDescriptor::max(5.0).probes_as_required());
    }

    #[test]
    fn test_mentions_required_in_text() {
        assert!(RuleSource::from("max:50| required").mentions_required());
        assert!(!RuleSource::from("max:50|email").mentions_required());
        assert!(!RuleSource::None.mentions_required());
    }

    #[test]
    fn test_resolve_keeps_item_order() {
        let source = RuleSource::List(vec![
            RuleItem::Rule(RuleDescriptor::email()),
            RuleItem::from("required|max:5"),
        ]);
        let kinds: Vec<_> = source
            .resolve(&PipeResolver)
            .iter()
            .filter_map(RuleDescriptor::kind)
            .collect();
        assert_eq!(kinds, vec![RuleKind::Email, RuleKind::Required, RuleKind::Max]);
    }

    #[test]
    fn test_rule_set_appends_repeated_field() {
        let set = RuleSet::new()
            .field("contact", vec![RuleDescriptor::required()])
            .field("contact", vec![RuleDescriptor::min(5.0)]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().map(|(_, r)| r.len()), Some(2));
    }
}
