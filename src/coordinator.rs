//! Form-wide validation passes
//!
//! A [`FormCoordinator`] does not know its fields. Fields register through the
//! [`FormLink`] interface and receive a [`FieldTicket`]; the coordinator only
//! counts them. A pass works like this:
//!
//! 1. [`FormCoordinator::start_pass`] clears the previous errors, snapshots the
//!    registered fields as the set to wait for, and publishes a new [`Epoch`].
//! 2. Every registered field notices the new epoch, validates itself and calls
//!    [`FormLink::report_result`] once, with or without an error.
//! 3. When the last awaited field has reported (or deregistered), the pass
//!    completes and `validated` listeners receive every collected error. An
//!    empty list means the form is valid.
//!
//! Reports tagged with an older epoch are ignored, so starting a new pass while
//! one is running simply supersedes it.
//!
//! # Example
//!
//! ```rust
//! use formwatch::coordinator::{FormCoordinator, FormLink};
//! use formwatch::FieldError;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let form = FormCoordinator::new();
//! let results = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&results);
//! form.on_validated(move |errors| sink.borrow_mut().push(errors.to_vec()));
//!
//! let first = form.register();
//! let last = form.register();
//! let epoch = form.start_pass();
//!
//! form.report_result(first, epoch, Some(FieldError::new("email", "This field is required.")));
//! form.report_result(last, epoch, None);
//!
//! assert_eq!(
//!     *results.borrow(),
//!     vec![vec![FieldError::new("email", "This field is required.")]]
//! );
//! ```

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::error::ProtocolInconsistency;
use crate::events::{ListenerId, Listeners};
use crate::validation::FieldError;

/// Identifies one validation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(u64);

impl Epoch {
    /// Build an epoch from its raw counter value
    pub fn from_raw(raw: u64) -> Self {
        Epoch(raw)
    }

    /// The raw counter value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one registered field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldTicket(u64);

impl FieldTicket {
    /// Build a ticket from its raw value
    pub fn from_raw(raw: u64) -> Self {
        FieldTicket(raw)
    }
}

impl fmt::Display for FieldTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the current pass stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassPhase {
    /// No pass was ever started
    #[default]
    Idle,
    /// Waiting for reports
    Running,
    /// Every awaited field reported; `validated` was emitted
    Complete,
}

/// What happened to a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The report counted towards the current pass
    Recorded {
        /// The report carried the first error of the pass
        first_error: bool,
        /// The report completed the pass
        completed: bool,
    },
    /// The report belongs to a superseded pass and was dropped
    Stale,
    /// The report violated the protocol and was dropped
    Rejected(ProtocolInconsistency),
}

/// The interface a field uses to take part in form validation
pub trait FormLink {
    /// Join form validation; the field is awaited from the next pass on
    fn register(&self) -> FieldTicket;

    /// Leave form validation, also in the middle of a pass
    fn deregister(&self, ticket: FieldTicket) -> Result<(), ProtocolInconsistency>;

    /// Report the field's result for the pass identified by `epoch`
    fn report_result(
        &self,
        ticket: FieldTicket,
        epoch: Epoch,
        error: Option<FieldError>,
    ) -> ReportOutcome;

    /// Epoch of the latest pass, `None` before the first one
    fn current_epoch(&self) -> Option<Epoch>;
}

/// Read-only view of a coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    /// Latest epoch
    pub epoch: Option<Epoch>,
    /// Fields currently registered
    pub registered_count: usize,
    /// Fields the current pass waits for, reported or not
    pub awaited_count: usize,
    /// Fields that reported in the current pass
    pub reported_count: usize,
    /// Errors collected in the current pass, in report order
    pub errors: Vec<FieldError>,
    /// Pass state
    pub phase: PassPhase,
}

impl FormSnapshot {
    /// True while a pass waits for reports
    pub fn pass_in_progress(&self) -> bool {
        self.phase == PassPhase::Running
    }
}

#[derive(Debug, Default)]
struct FormState {
    epoch: Option<Epoch>,
    next_ticket: u64,
    registered: BTreeSet<FieldTicket>,
    pending: BTreeSet<FieldTicket>,
    reported: BTreeSet<FieldTicket>,
    errors: Vec<FieldError>,
    phase: PassPhase,
}

impl FormState {
    /// Close a running pass once nothing is pending; true exactly once per pass
    fn try_complete(&mut self) -> bool {
        if self.phase == PassPhase::Running && self.pending.is_empty() {
            self.phase = PassPhase::Complete;
            #[cfg(feature = "tracing")]
            tracing::debug!(
                epoch = ?self.epoch,
                reported = self.reported.len(),
                errors = self.errors.len(),
                "validation pass complete"
            );
            return true;
        }
        false
    }
}

#[derive(Debug, Default)]
struct FormEvents {
    validated: Listeners<[FieldError]>,
    errors_changed: Listeners<[FieldError]>,
}

/// Per-form validation coordinator
///
/// Cheap to clone; clones share the same state. Single-threaded.
#[derive(Clone, Default)]
pub struct FormCoordinator {
    state: Rc<RefCell<FormState>>,
    events: Rc<FormEvents>,
}

impl FormCoordinator {
    /// A coordinator with no fields and no pass
    pub fn new() -> Self {
        Self::default()
    }

    /// This coordinator as the link handed to fields
    pub fn link(&self) -> Rc<dyn FormLink> {
        Rc::new(self.clone())
    }

    /// Start a new pass and return its epoch
    ///
    /// Any running pass is superseded. With no registered field the pass
    /// completes immediately and `validated` receives an empty list.
    pub fn start_pass(&self) -> Epoch {
        let (epoch, completed, cleared) = {
            let mut state = self.state.borrow_mut();
            let epoch = Epoch(state.epoch.map_or(1, |e| e.0 + 1));
            if state.phase == PassPhase::Running {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    superseded = ?state.epoch,
                    pending = state.pending.len(),
                    "superseding running validation pass"
                );
            }
            let cleared = !state.errors.is_empty();
            state.epoch = Some(epoch);
            state.errors.clear();
            state.reported.clear();
            state.pending = state.registered.clone();
            state.phase = PassPhase::Running;
            #[cfg(feature = "tracing")]
            tracing::debug!(%epoch, awaited = state.pending.len(), "validation pass started");
            (epoch, state.try_complete(), cleared)
        };

        if cleared {
            self.events.errors_changed.emit(&[]);
        }
        if completed {
            self.events.validated.emit(&[]);
        }
        epoch
    }

    /// Listen for completed passes
    pub fn on_validated<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&[FieldError]) + 'static,
    {
        self.events.validated.subscribe(listener)
    }

    /// Listen for every change of the error collection
    pub fn on_errors_changed<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&[FieldError]) + 'static,
    {
        self.events.errors_changed.subscribe(listener)
    }

    /// Remove a listener added with `on_validated` or `on_errors_changed`
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.events.validated.unsubscribe(id) || self.events.errors_changed.unsubscribe(id)
    }

    /// Current state
    pub fn snapshot(&self) -> FormSnapshot {
        let state = self.state.borrow();
        FormSnapshot {
            epoch: state.epoch,
            registered_count: state.registered.len(),
            awaited_count: state.pending.len() + state.reported.len(),
            reported_count: state.reported.len(),
            errors: state.errors.clone(),
            phase: state.phase,
        }
    }

    /// Errors collected in the current pass
    pub fn errors(&self) -> Vec<FieldError> {
        self.state.borrow().errors.clone()
    }

    /// Pass state
    pub fn phase(&self) -> PassPhase {
        self.state.borrow().phase
    }

    /// Number of registered fields
    pub fn registered_count(&self) -> usize {
        self.state.borrow().registered.len()
    }
}

impl FormLink for FormCoordinator {
    fn register(&self) -> FieldTicket {
        let mut state = self.state.borrow_mut();
        let ticket = FieldTicket(state.next_ticket);
        state.next_ticket += 1;
        state.registered.insert(ticket);
        #[cfg(feature = "tracing")]
        tracing::trace!(%ticket, registered = state.registered.len(), "field registered");
        ticket
    }

    fn deregister(&self, ticket: FieldTicket) -> Result<(), ProtocolInconsistency> {
        let completed = {
            let mut state = self.state.borrow_mut();
            if !state.registered.remove(&ticket) {
                let err = ProtocolInconsistency::UnknownRegistration { ticket };
                #[cfg(feature = "tracing")]
                tracing::warn!(%err, "ignoring deregistration");
                return Err(err);
            }
            state.pending.remove(&ticket);
            #[cfg(feature = "tracing")]
            tracing::trace!(%ticket, registered = state.registered.len(), "field deregistered");
            state.try_complete()
        };

        if completed {
            let errors = self.errors();
            self.events.validated.emit(&errors);
        }
        Ok(())
    }

    fn report_result(
        &self,
        ticket: FieldTicket,
        epoch: Epoch,
        error: Option<FieldError>,
    ) -> ReportOutcome {
        let (outcome, errors) = {
            let mut state = self.state.borrow_mut();
            if state.epoch != Some(epoch) {
                #[cfg(feature = "tracing")]
                tracing::debug!(%ticket, %epoch, current = ?state.epoch, "dropping stale report");
                return ReportOutcome::Stale;
            }
            if !state.pending.remove(&ticket) {
                let err = if state.reported.contains(&ticket) {
                    ProtocolInconsistency::DuplicateReport { ticket, epoch }
                } else {
                    ProtocolInconsistency::UnexpectedReport { ticket, epoch }
                };
                #[cfg(feature = "tracing")]
                tracing::warn!(%err, "ignoring report");
                return ReportOutcome::Rejected(err);
            }
            state.reported.insert(ticket);

            let first_error = error.is_some() && state.errors.is_empty();
            let changed = match error {
                Some(error) => {
                    state.errors.push(error);
                    true
                }
                None => false,
            };
            let completed = state.try_complete();
            let errors = (changed || completed).then(|| state.errors.clone());
            (
                ReportOutcome::Recorded {
                    first_error,
                    completed,
                },
                errors.map(|e| (e, changed)),
            )
        };

        if let Some((errors, changed)) = errors {
            if changed {
                self.events.errors_changed.emit(&errors);
            }
            if matches!(outcome, ReportOutcome::Recorded { completed: true, .. }) {
                self.events.validated.emit(&errors);
            }
        }
        outcome
    }

    fn current_epoch(&self) -> Option<Epoch> {
        self.state.borrow().epoch
    }
}

impl fmt::Debug for FormCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormCoordinator")
            .field("state", &self.snapshot())
            .field("events", &self.events)
            .finish()
    }
}
