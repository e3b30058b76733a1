//! # Formwatch
//!
//! Form validation that waits for every field.
//!
//! A form does not know its inputs. Each input owns a [`FieldAgent`] that
//! registers with the form's [`FormCoordinator`], validates itself against a
//! rule list and reports back. The coordinator runs numbered passes, collects
//! one result per registered field and announces the complete error list once
//! the last field has answered.
//!
//! ## Quick Example
//!
//! ```rust
//! use formwatch::prelude::*;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let form = FormCoordinator::new();
//! let seen = Rc::new(RefCell::new(None));
//! let sink = Rc::clone(&seen);
//! form.on_validated(move |errors| *sink.borrow_mut() = Some(errors.to_vec()));
//!
//! let mut email = FieldAgent::new(AgentOptions::named("email"), form.link())
//!     .with_rules("required|email")
//!     .with_value("someone@example.com");
//! let mut password = FieldAgent::new(AgentOptions::named("password"), form.link())
//!     .with_rules("required|password")
//!     .with_value("weak");
//!
//! form.start_pass();
//! email.sync();
//! password.sync();
//!
//! let errors = seen.borrow_mut().take().unwrap_or_default();
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors[0].field, "password");
//! ```
//!
//! Bulk validation of a whole value map, without agents, goes through
//! [`rule::engine::validate_all`] and accumulates every message per field:
//!
//! ```rust
//! use formwatch::rule::presets::validate_user_info;
//! use formwatch::{FieldValue, FormValues};
//!
//! let mut values = FormValues::new();
//! values.insert("firstName".into(), FieldValue::from(""));
//! values.insert("lastName".into(), FieldValue::from("Doe"));
//! values.insert("email".into(), FieldValue::from("jane@example.com"));
//! values.insert("contact".into(), FieldValue::from("555-0100"));
//!
//! let errors = validate_user_info(&values);
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors.get("firstName"), Some(&["This field is required.".to_string()][..]));
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod agent;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod rule;
pub mod schedule;
pub mod semigroup;
pub mod session;
pub mod testing;
pub mod validation;
pub mod value;

// Re-exports
pub use agent::FieldAgent;
pub use config::{AgentOptions, FormOptions};
pub use coordinator::{Epoch, FieldTicket, FormCoordinator, FormLink, PassPhase, ReportOutcome};
pub use error::ProtocolInconsistency;
pub use rule::{RuleDescriptor, RuleKind, RuleSet, RuleSource};
pub use semigroup::Semigroup;
pub use session::FormSession;
pub use validation::{FieldError, FieldErrors, Validation};
pub use value::{FieldValue, FormValues};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::agent::FieldAgent;
    pub use crate::config::{AgentOptions, FormOptions};
    pub use crate::coordinator::{FormCoordinator, FormLink, PassPhase, ReportOutcome};
    pub use crate::rule::{ListResolver, PipeResolver, RuleDescriptor, RuleKind, RuleSource};
    pub use crate::semigroup::Semigroup;
    pub use crate::session::FormSession;
    pub use crate::validation::{FieldError, FieldErrors, Validation};
    pub use crate::value::{FieldValue, FormValues};
}
