//! Rule string resolution
//!
//! Fields may declare their rules as a string such as `"required|max:50"`.
//! A [`ListResolver`] turns that string into descriptors; [`PipeResolver`] is
//! the default grammar. Any `Fn(&str) -> Vec<RuleDescriptor>` is a resolver too.

use super::{NamedRule, RuleDescriptor, RuleKind};

/// Parses a rule string into an ordered descriptor list
///
/// Implementations must be pure and must return an empty list for empty or
/// whitespace-only input.
pub trait ListResolver {
    /// Parse `rules` into descriptors
    fn parse(&self, rules: &str) -> Vec<RuleDescriptor>;
}

impl<F> ListResolver for F
where
    F: Fn(&str) -> Vec<RuleDescriptor>,
{
    fn parse(&self, rules: &str) -> Vec<RuleDescriptor> {
        self(rules)
    }
}

/// The `rule1|rule2:param|...` grammar
///
/// Unknown rule names and malformed parameters are skipped.
///
/// # Example
///
/// ```rust
/// use formwatch::rule::{ListResolver, PipeResolver, RuleKind};
///
/// let rules = PipeResolver.parse("required | max:50");
/// assert_eq!(rules.len(), 2);
/// assert_eq!(rules[1].kind(), Some(RuleKind::Max));
/// assert!(PipeResolver.parse("   ").is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PipeResolver;

impl ListResolver for PipeResolver {
    fn parse(&self, rules: &str) -> Vec<RuleDescriptor> {
        rules
            .split('|')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .filter_map(parse_token)
            .collect()
    }
}

fn parse_token(token: &str) -> Option<RuleDescriptor> {
    let (name, raw_param) = match token.split_once(':') {
        Some((name, param)) => (name.trim(), Some(param.trim())),
        None => (token, None),
    };

    let kind = match name.parse::<RuleKind>() {
        Ok(kind) => kind,
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(rule = name, "{}, skipping", _err);
            return None;
        }
    };

    let param = match raw_param {
        Some(raw) if kind.takes_param() => match raw.parse::<f64>() {
            Ok(value) => Some(value),
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(rule = name, param = raw, "malformed rule parameter, skipping");
                return None;
            }
        },
        _ => None,
    };

    Some(RuleDescriptor::Named(NamedRule { kind, param }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(rules: &[RuleDescriptor]) -> Vec<(RuleKind, Option<f64>)> {
        rules
            .iter()
            .filter_map(|rule| match rule {
                RuleDescriptor::Named(named) => Some((named.kind, named.param)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_parses_in_order_with_params() {
        let rules = PipeResolver.parse("required|min:5|max:15");
        assert_eq!(
            kinds(&rules),
            vec![
                (RuleKind::Required, None),
                (RuleKind::Min, Some(5.0)),
                (RuleKind::Max, Some(15.0)),
            ]
        );
    }

    #[test]
    fn test_empty_input_yields_no_rules() {
        assert!(PipeResolver.parse("").is_empty());
        assert!(PipeResolver.parse(" | ").is_empty());
    }

    #[test]
    fn test_skips_unknown_and_malformed() {
        let rules = PipeResolver.parse("required|between:1,3|max:many|email");
        assert_eq!(
            kinds(&rules),
            vec![(RuleKind::Required, None), (RuleKind::Email, None)]
        );
    }

    #[test]
    fn test_param_ignored_for_kinds_without_one() {
        let rules = PipeResolver.parse("email:strict");
        assert_eq!(kinds(&rules), vec![(RuleKind::Email, None)]);
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |_: &str| vec![RuleDescriptor::required()];
        assert_eq!(resolver.parse("anything").len(), 1);
    }
}
