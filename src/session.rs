//! A form and its fields in one place
//!
//! Rendering layers normally own their fields and poke each agent when the form
//! publishes a new epoch. [`FormSession`] does that bookkeeping for hosts that
//! have no component tree of their own: it mounts agents against one
//! coordinator and drives a whole pass with [`FormSession::submit`].
//!
//! # Example
//!
//! ```rust
//! use formwatch::config::AgentOptions;
//! use formwatch::session::FormSession;
//! use formwatch::{FieldError, Validation};
//!
//! let mut session = FormSession::new();
//! session.mount(AgentOptions::named("firstName"), "required|max:50", "");
//! session.mount(AgentOptions::named("lastName"), "required|max:50", "Doe");
//!
//! assert_eq!(
//!     session.submit(),
//!     Some(Validation::Failure(vec![FieldError::new(
//!         "firstName",
//!         "This field is required."
//!     )]))
//! );
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::agent::FieldAgent;
use crate::config::{AgentOptions, FormOptions};
use crate::coordinator::{FormCoordinator, PassPhase};
use crate::rule::RuleSource;
use crate::schedule::{Scheduler, ScrollTarget};
use crate::validation::FieldError;
use crate::value::{FieldValue, FormValues};
use crate::Validation;

/// Identifies a field mounted in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId(u64);

/// A coordinator together with the agents mounted against it
pub struct FormSession {
    coordinator: FormCoordinator,
    options: FormOptions,
    scheduler: Option<Rc<dyn Scheduler>>,
    fields: BTreeMap<FieldId, FieldAgent>,
    next_id: u64,
}

impl FormSession {
    /// An empty session with default options
    pub fn new() -> Self {
        Self::with_options(FormOptions::default())
    }

    /// An empty session
    pub fn with_options(options: FormOptions) -> Self {
        Self {
            coordinator: FormCoordinator::new(),
            options,
            scheduler: None,
            fields: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Schedule scroll effects of scrollable fields on `scheduler`
    pub fn with_scheduler(mut self, scheduler: Rc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Mount a field with rules and an initial value
    pub fn mount(
        &mut self,
        options: AgentOptions,
        rules: impl Into<RuleSource>,
        value: impl Into<FieldValue>,
    ) -> FieldId {
        let agent = self.build(options).with_value(value).with_rules(rules);
        self.insert(agent)
    }

    /// Mount a field that scrolls `target` into view when it fails first
    ///
    /// Without a session scheduler this is the same as [`FormSession::mount`].
    pub fn mount_scrollable(
        &mut self,
        options: AgentOptions,
        rules: impl Into<RuleSource>,
        value: impl Into<FieldValue>,
        target: Arc<dyn ScrollTarget>,
    ) -> FieldId {
        let mut agent = self.build(options).with_value(value);
        if let Some(scheduler) = &self.scheduler {
            agent = agent.with_scroll(target, Rc::clone(scheduler));
        }
        let agent = agent.with_rules(rules);
        self.insert(agent)
    }

    /// Unmount a field; false when it was not mounted
    pub fn unmount(&mut self, id: FieldId) -> bool {
        self.fields.remove(&id).is_some()
    }

    /// The agent of a mounted field
    pub fn field(&self, id: FieldId) -> Option<&FieldAgent> {
        self.fields.get(&id)
    }

    /// The agent of a mounted field, mutably
    pub fn field_mut(&mut self, id: FieldId) -> Option<&mut FieldAgent> {
        self.fields.get_mut(&id)
    }

    /// The session's coordinator
    pub fn coordinator(&self) -> &FormCoordinator {
        &self.coordinator
    }

    /// Number of mounted fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no field is mounted
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Run a complete pass over every mounted field
    ///
    /// Returns `None` only when agents outside this session share the
    /// coordinator and have not reported yet.
    pub fn submit(&mut self) -> Option<Validation<(), Vec<FieldError>>> {
        let values = self.values();
        self.coordinator.start_pass();
        for agent in self.fields.values_mut() {
            agent.set_peer_values(values.clone());
            agent.sync();
        }

        let snapshot = self.coordinator.snapshot();
        if snapshot.phase != PassPhase::Complete {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                awaited = snapshot.awaited_count,
                reported = snapshot.reported_count,
                "pass still waiting for fields outside the session"
            );
            return None;
        }
        Some(if snapshot.errors.is_empty() {
            Validation::success(())
        } else {
            Validation::failure(snapshot.errors)
        })
    }

    /// Current values of every named field
    pub fn values(&self) -> FormValues {
        self.fields
            .values()
            .filter_map(|agent| {
                let name = agent.options().field_name()?;
                Some((name.to_string(), agent.value().clone()))
            })
            .collect()
    }

    fn build(&self, mut options: AgentOptions) -> FieldAgent {
        if options.scroll_delay == crate::config::DEFAULT_SCROLL_DELAY {
            options.scroll_delay = self.options.scroll_delay;
        }
        FieldAgent::new(options, self.coordinator.link())
    }

    fn insert(&mut self, agent: FieldAgent) -> FieldId {
        let id = FieldId(self.next_id);
        self.next_id += 1;
        self.fields.insert(id, agent);
        id
    }
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSession")
            .field("coordinator", &self.coordinator)
            .field("options", &self.options)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}
