//! Coordination errors
//!
//! Rule failures are ordinary data ([`FieldError`](crate::FieldError)). The
//! errors here describe a misuse of the registration protocol: the coordinator
//! logs them, leaves its counters untouched and hands them back to the caller.

use std::fmt;

use crate::coordinator::{Epoch, FieldTicket};

/// A report or deregistration the coordinator could not account for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolInconsistency {
    /// `deregister` with a ticket that is not registered
    UnknownRegistration {
        /// The offending ticket
        ticket: FieldTicket,
    },
    /// A report from a field the current pass is not waiting for
    ///
    /// Happens for fields registered after the pass started, for unknown
    /// tickets, and for reports while no pass runs.
    UnexpectedReport {
        /// The reporting field
        ticket: FieldTicket,
        /// Epoch the report was tagged with
        epoch: Epoch,
    },
    /// A second report from the same field in one pass
    DuplicateReport {
        /// The reporting field
        ticket: FieldTicket,
        /// Epoch the report was tagged with
        epoch: Epoch,
    },
}

impl fmt::Display for ProtocolInconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolInconsistency::UnknownRegistration { ticket } => {
                write!(f, "deregistration of unknown field {}", ticket)
            }
            ProtocolInconsistency::UnexpectedReport { ticket, epoch } => {
                write!(f, "unexpected report from field {} in pass {}", ticket, epoch)
            }
            ProtocolInconsistency::DuplicateReport { ticket, epoch } => {
                write!(f, "duplicate report from field {} in pass {}", ticket, epoch)
            }
        }
    }
}

impl std::error::Error for ProtocolInconsistency {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ProtocolInconsistency::DuplicateReport {
            ticket: FieldTicket::from_raw(3),
            epoch: Epoch::from_raw(7),
        };
        assert_eq!(
            err.to_string(),
            "duplicate report from field #3 in pass 7"
        );
    }
}
