//! Per-field validation
//!
//! A [`FieldAgent`] owns one field's value, rules and error slot. It takes part
//! in form validation through a [`FormLink`]: it registers while it has rules
//! (and is not skipped), and whenever the form publishes a new epoch it
//! validates once and reports the result.
//!
//! Unlike the bulk [`validate_all`](crate::rule::engine::validate_all), an agent
//! stops at its first failing rule: a field shows one message at a time.
//!
//! # Example
//!
//! ```rust
//! use formwatch::agent::FieldAgent;
//! use formwatch::config::AgentOptions;
//! use formwatch::coordinator::FormCoordinator;
//!
//! let form = FormCoordinator::new();
//! let mut email = FieldAgent::new(AgentOptions::named("email"), form.link())
//!     .with_rules("required|email");
//!
//! email.set_value("not-an-email");
//! form.start_pass();
//! email.sync();
//!
//! assert_eq!(email.error(), Some("This must be a valid email address."));
//! assert_eq!(form.errors().len(), 1);
//! ```

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::AgentOptions;
use crate::coordinator::{Epoch, FieldTicket, FormLink, ReportOutcome};
use crate::events::{ListenerId, Listeners};
use crate::rule::{ListResolver, PipeResolver, RuleDescriptor, RuleSource};
use crate::schedule::{ScheduledTask, Scheduler, ScrollTarget};
use crate::validation::FieldError;
use crate::value::{FieldValue, FormValues};

struct ScrollHook {
    target: Arc<dyn ScrollTarget>,
    scheduler: Rc<dyn Scheduler>,
}

/// The validation side of one input
pub struct FieldAgent {
    options: AgentOptions,
    value: FieldValue,
    peer_values: FormValues,
    source: RuleSource,
    rules: Vec<RuleDescriptor>,
    error: Option<String>,
    ticket: Option<FieldTicket>,
    seen_epoch: Option<Epoch>,
    link: Option<Rc<dyn FormLink>>,
    resolver: Rc<dyn ListResolver>,
    scroll: Option<ScrollHook>,
    pending_scroll: Option<ScheduledTask>,
    error_events: Listeners<Option<String>>,
    input_events: Listeners<FieldValue>,
}

impl FieldAgent {
    /// A field taking part in the validation of the form behind `link`
    pub fn new(options: AgentOptions, link: Rc<dyn FormLink>) -> Self {
        let mut agent = Self::standalone(options);
        agent.link = Some(link);
        agent
    }

    /// A field outside any form; it only validates on demand
    pub fn standalone(options: AgentOptions) -> Self {
        Self {
            options,
            value: FieldValue::Null,
            peer_values: FormValues::new(),
            source: RuleSource::None,
            rules: Vec::new(),
            error: None,
            ticket: None,
            seen_epoch: None,
            link: None,
            resolver: Rc::new(PipeResolver),
            scroll: None,
            pending_scroll: None,
            error_events: Listeners::new(),
            input_events: Listeners::new(),
        }
    }

    /// Use another rule string grammar; rules already set are re-resolved
    pub fn with_resolver(mut self, resolver: Rc<dyn ListResolver>) -> Self {
        self.resolver = resolver;
        let source = std::mem::take(&mut self.source);
        self.set_rules(source);
        self
    }

    /// Set the initial rules
    pub fn with_rules(mut self, source: impl Into<RuleSource>) -> Self {
        self.set_rules(source);
        self
    }

    /// Set the initial value without emitting
    pub fn with_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = value.into();
        self
    }

    /// Scroll `target` into view when this field holds the first error of a pass
    pub fn with_scroll(
        mut self,
        target: Arc<dyn ScrollTarget>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        self.scroll = Some(ScrollHook { target, scheduler });
        self
    }

    /// Replace the rules, registering or deregistering as needed
    pub fn set_rules(&mut self, source: impl Into<RuleSource>) {
        self.source = source.into();
        self.rules = self.source.resolve(self.resolver.as_ref());
        self.sync_registration();
    }

    /// Include or exclude the field from form validation
    pub fn set_skip_validation(&mut self, skip: bool) {
        self.options.skip_validation = skip;
        self.sync_registration();
    }

    /// Values of sibling fields, read by rules such as `confirmation`
    pub fn set_peer_values(&mut self, values: FormValues) {
        self.peer_values = values;
    }

    /// Update the value
    ///
    /// Returns false, and does nothing, when `value` is structurally equal to
    /// the current one. Otherwise `input` listeners are notified and a shown
    /// error is re-evaluated against the new value.
    pub fn set_value(&mut self, value: impl Into<FieldValue>) -> bool {
        let value = value.into();
        if value == self.value {
            return false;
        }
        self.value = value;
        self.input_events.emit(&self.value);
        if self.error.is_some() {
            self.show_error(self.validate());
        }
        true
    }

    /// Run the rules in order and return the first failure
    ///
    /// Does not touch the error slot.
    pub fn validate(&self) -> Option<String> {
        let values = self.context_values();
        self.rules.iter().find_map(|rule| {
            rule.check(&self.value, self.options.field_name(), &values)
                .into_failure()
        })
    }

    /// Validate after the input lost focus
    ///
    /// Updates the error slot and emits `error`, without reporting to the form.
    pub fn blur(&mut self) -> Option<&str> {
        if !self.rules.is_empty() {
            self.show_error(self.validate());
        }
        self.error()
    }

    /// Take part in the form's current pass, if it is new to this field
    ///
    /// Validates exactly once per epoch, sets the error slot, emits `error`
    /// (also when valid) and reports to the form. Returns `None` when there was
    /// nothing to do.
    pub fn sync(&mut self) -> Option<ReportOutcome> {
        let link = Rc::clone(self.link.as_ref()?);
        let ticket = self.ticket?;
        let epoch = link.current_epoch()?;
        if self.seen_epoch == Some(epoch) {
            return None;
        }
        self.seen_epoch = Some(epoch);

        let error = self.validate();
        self.show_error(error.clone());
        let report = error.map(|message| FieldError::new(self.options.error_label(), message));
        let outcome = link.report_result(ticket, epoch, report);
        if let ReportOutcome::Recorded {
            first_error: true, ..
        } = outcome
        {
            self.schedule_scroll();
        }
        Some(outcome)
    }

    /// Best-effort check whether the field is required
    ///
    /// Rule strings are searched for a `required` token; closures are probed
    /// with an empty value and their message compared with known wordings.
    /// A closure that rejects empty input with other wording is not detected.
    pub fn is_required(&self) -> bool {
        self.source.mentions_required()
    }

    /// Listen for error slot updates; the payload is the new error
    pub fn on_error<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Option<String>) + 'static,
    {
        self.error_events.subscribe(listener)
    }

    /// Listen for value changes
    pub fn on_input<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&FieldValue) + 'static,
    {
        self.input_events.subscribe(listener)
    }

    /// Current error
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Current value
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Resolved rules
    pub fn rules(&self) -> &[RuleDescriptor] {
        &self.rules
    }

    /// Options the field was created with
    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    /// True while the form awaits this field in its passes
    pub fn is_registered(&self) -> bool {
        self.ticket.is_some()
    }

    /// Leave the form; same as dropping the agent
    pub fn unmount(self) {}

    fn sync_registration(&mut self) {
        let Some(link) = self.link.clone() else {
            return;
        };
        let wanted = !self.options.skip_validation && !self.rules.is_empty();
        match (self.ticket, wanted) {
            (None, true) => {
                self.ticket = Some(link.register());
                // A pass already running does not wait for this field.
                self.seen_epoch = link.current_epoch();
            }
            (Some(ticket), false) => {
                self.release(link.as_ref(), ticket);
                if self.error.is_some() {
                    self.show_error(None);
                }
            }
            _ => {}
        }
    }

    fn release(&mut self, link: &dyn FormLink, ticket: FieldTicket) {
        self.ticket = None;
        if let Err(_err) = link.deregister(ticket) {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                field = self.options.error_label(),
                error = %_err,
                "deregistration failed"
            );
        }
    }

    fn show_error(&mut self, error: Option<String>) {
        self.error = error;
        self.error_events.emit(&self.error);
    }

    fn context_values(&self) -> FormValues {
        let mut values = self.peer_values.clone();
        if let Some(name) = self.options.field_name() {
            values.insert(name.to_string(), self.value.clone());
        }
        values
    }

    fn schedule_scroll(&mut self) {
        let Some(hook) = &self.scroll else {
            return;
        };
        if let Some(previous) = self.pending_scroll.take() {
            previous.cancel();
        }
        let target = Arc::clone(&hook.target);
        let task = hook.scheduler.schedule(
            self.options.scroll_delay,
            Box::new(move || target.scroll_into_view()),
        );
        self.pending_scroll = Some(task);
    }
}

impl Drop for FieldAgent {
    fn drop(&mut self) {
        if let Some(task) = self.pending_scroll.take() {
            task.cancel();
        }
        if let (Some(link), Some(ticket)) = (self.link.clone(), self.ticket) {
            self.release(link.as_ref(), ticket);
        }
    }
}

impl fmt::Debug for FieldAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAgent")
            .field("options", &self.options)
            .field("value", &self.value)
            .field("rules", &self.rules)
            .field("error", &self.error)
            .field("ticket", &self.ticket)
            .field("seen_epoch", &self.seen_epoch)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{FormCoordinator, PassPhase};
    use crate::rule::RuleFn;
    use crate::schedule::ManualScheduler;
    use crate::testing::RecordingScroll;
    use std::cell::RefCell;
    use std::time::Duration;

    fn agent(form: &FormCoordinator, name: &str, rules: &str) -> FieldAgent {
        FieldAgent::new(AgentOptions::named(name), form.link()).with_rules(rules)
    }

    #[test]
    fn test_registers_only_with_rules() {
        let form = FormCoordinator::new();
        let mut field = FieldAgent::new(AgentOptions::named("nickname"), form.link());
        assert!(!field.is_registered());

        field.set_rules("required");
        assert!(field.is_registered());
        assert_eq!(form.registered_count(), 1);

        field.set_rules("");
        assert!(!field.is_registered());
        assert_eq!(form.registered_count(), 0);
    }

    #[test]
    fn test_deregistering_clears_error() {
        let form = FormCoordinator::new();
        let mut field = agent(&form, "nickname", "required");
        field.blur();
        assert_eq!(field.error(), Some("This field is required."));

        field.set_rules(RuleSource::None);
        assert_eq!(field.error(), None);
    }

    #[test]
    fn test_skip_validation_toggles_registration() {
        let form = FormCoordinator::new();
        let mut field = agent(&form, "nickname", "required");

        field.set_skip_validation(true);
        assert_eq!(form.registered_count(), 0);
        field.set_skip_validation(false);
        assert_eq!(form.registered_count(), 1);
    }

    #[test]
    fn test_validate_stops_at_first_failure() {
        let field = FieldAgent::standalone(AgentOptions::named("contact"))
            .with_rules("required|min:5|max:3")
            .with_value("1234");
        assert_eq!(
            field.validate().as_deref(),
            Some("Must not be shorter than 5 characters.")
        );
    }

    #[test]
    fn test_validate_is_repeatable() {
        let field = FieldAgent::standalone(AgentOptions::named("email"))
            .with_rules("email")
            .with_value("nope");
        assert_eq!(field.validate(), field.validate());
        assert_eq!(field.error(), None);
    }

    #[test]
    fn test_factory_rules_receive_field_name() {
        let rule = RuleDescriptor::factory(|| -> RuleFn {
            Arc::new(|_: &FieldValue, field: Option<&str>| {
                Err(format!("{} is taken.", field.unwrap_or("?")))
            })
        });
        let field =
            FieldAgent::standalone(AgentOptions::named("handle")).with_rules(vec![rule]);
        assert_eq!(field.validate().as_deref(), Some("handle is taken."));
    }

    #[test]
    fn test_sync_reports_once_per_epoch() {
        let form = FormCoordinator::new();
        let mut field = agent(&form, "firstName", "required");

        assert_eq!(field.sync(), None);
        form.start_pass();
        assert!(field.sync().is_some());
        assert_eq!(field.sync(), None);
        assert_eq!(form.phase(), PassPhase::Complete);
        assert_eq!(
            form.errors(),
            vec![FieldError::new("firstName", "This field is required.")]
        );
    }

    #[test]
    fn test_sync_emits_error_event_when_valid() {
        let form = FormCoordinator::new();
        let mut field = agent(&form, "lastName", "required").with_value("Doe");
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        field.on_error(move |error| sink.borrow_mut().push(error.clone()));

        form.start_pass();
        field.sync();

        assert_eq!(*events.borrow(), vec![None]);
    }

    #[test]
    fn test_registering_mid_pass_waits_for_next_pass() {
        let form = FormCoordinator::new();
        let mut early = agent(&form, "a", "required");
        form.start_pass();
        let mut late = agent(&form, "b", "required");

        assert_eq!(late.sync(), None);
        early.sync();
        assert_eq!(form.phase(), PassPhase::Complete);

        form.start_pass();
        assert!(late.sync().is_some());
    }

    #[test]
    fn test_drop_mid_pass_unblocks_form() {
        let form = FormCoordinator::new();
        let mut a = agent(&form, "a", "required");
        let b = agent(&form, "b", "required");
        form.start_pass();

        a.sync();
        drop(b);

        assert_eq!(form.phase(), PassPhase::Complete);
        assert_eq!(form.registered_count(), 1);
    }

    #[test]
    fn test_set_value_detects_structural_equality() {
        let mut field = FieldAgent::standalone(AgentOptions::named("tags"))
            .with_value(vec!["a", "b"]);
        let inputs = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&inputs);
        field.on_input(move |_| *sink.borrow_mut() += 1);

        assert!(!field.set_value(vec!["a".to_string(), "b".to_string()]));
        assert!(field.set_value(vec!["a"]));
        assert_eq!(*inputs.borrow(), 1);
    }

    #[test]
    fn test_set_value_refreshes_shown_error() {
        let mut field = FieldAgent::standalone(AgentOptions::named("firstName"))
            .with_rules("required");
        field.blur();
        assert!(field.error().is_some());

        field.set_value("Jane");
        assert_eq!(field.error(), None);
    }

    #[test]
    fn test_confirmation_reads_peer_values() {
        let mut field = FieldAgent::standalone(AgentOptions::named("password_confirmation"))
            .with_rules("confirmation")
            .with_value("Abcdef1!");
        let mut peers = FormValues::new();
        peers.insert("password".into(), FieldValue::from("Abcdef1!"));
        field.set_peer_values(peers);

        assert_eq!(field.validate(), None);
    }

    #[test]
    fn test_is_required_heuristic() {
        let by_text = FieldAgent::standalone(AgentOptions::default()).with_rules("max:5|required");
        let by_closure = FieldAgent::standalone(AgentOptions::default()).with_rules(vec![
            RuleDescriptor::predicate(|v, _| {
                if v.is_blank() {
                    Err("Name shouldn't be empty.".into())
                } else {
                    Ok(())
                }
            }),
        ]);
        let not_required = FieldAgent::standalone(AgentOptions::default()).with_rules("email");

        assert!(by_text.is_required());
        assert!(by_closure.is_required());
        assert!(!not_required.is_required());
    }

    #[test]
    fn test_first_error_schedules_scroll() {
        let form = FormCoordinator::new();
        let scheduler = Rc::new(ManualScheduler::new());
        let scroll = Arc::new(RecordingScroll::new());
        let mut first = agent(&form, "a", "required")
            .with_scroll(scroll.clone(), scheduler.clone());
        let mut second = agent(&form, "b", "required")
            .with_scroll(scroll.clone(), scheduler.clone());

        form.start_pass();
        first.sync();
        second.sync();

        assert_eq!(scheduler.pending(), 1);
        scheduler.advance(Duration::from_millis(200));
        assert_eq!(scroll.count(), 1);
    }

    #[test]
    fn test_drop_cancels_scroll() {
        let form = FormCoordinator::new();
        let scheduler = Rc::new(ManualScheduler::new());
        let scroll = Arc::new(RecordingScroll::new());
        let mut field =
            agent(&form, "a", "required").with_scroll(scroll.clone(), scheduler.clone());

        form.start_pass();
        field.sync();
        drop(field);

        scheduler.advance(Duration::from_secs(1));
        assert_eq!(scroll.count(), 0);
    }
}
