//! Status rule table
//!
//! Static configuration of which enrollment statuses exist and which
//! statuses each one may change to. The table is built once on first use
//! and never mutated afterwards.
//!
//! A status with an empty transition set is terminal. Looking up a status
//! that is not in the table is an error, so callers can tell "terminal"
//! apart from "unknown".

use crate::types::{RecordError, StudentStatus};
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};

/// Mapping from a status to the statuses it may transition to
#[derive(Debug, Clone)]
pub struct StatusRuleTable {
    transitions: HashMap<StudentStatus, BTreeSet<StudentStatus>>,
}

static RULES: Lazy<StatusRuleTable> = Lazy::new(StatusRuleTable::standard);

/// The process-wide rule table
pub fn rules() -> &'static StatusRuleTable {
    &RULES
}

impl StatusRuleTable {
    /// The enrollment rules in force
    pub fn standard() -> Self {
        use StudentStatus::*;
        let terminal: &[StudentStatus] = &[];

        Self::from_edges(&[
            (Studying, &[Deferred, Suspended, Graduated, DroppedOut][..]),
            (Deferred, &[Studying, DroppedOut][..]),
            (Suspended, &[Studying, DroppedOut][..]),
            (Graduated, terminal),
            (DroppedOut, terminal),
        ])
    }

    /// Build a table from `(from, allowed targets)` pairs
    ///
    /// Every status gets an entry; statuses not listed as a source are
    /// terminal. Targets are closed-set values, so the "every referenced
    /// status is valid" invariant holds by construction.
    pub fn from_edges(edges: &[(StudentStatus, &[StudentStatus])]) -> Self {
        let mut transitions: HashMap<StudentStatus, BTreeSet<StudentStatus>> = StudentStatus::ALL
            .iter()
            .map(|status| (*status, BTreeSet::new()))
            .collect();

        for (from, targets) in edges {
            transitions
                .entry(*from)
                .or_default()
                .extend(targets.iter().copied());
        }

        Self { transitions }
    }

    /// Every valid status, in declaration order
    pub fn statuses(&self) -> &'static [StudentStatus] {
        &StudentStatus::ALL
    }

    pub fn is_valid(&self, status: &str) -> bool {
        status.parse::<StudentStatus>().is_ok()
    }

    /// Allowed next statuses for a raw status string
    ///
    /// # Errors
    ///
    /// `UnknownStatus` if `status` is not a valid status.
    pub fn allowed_from(&self, status: &str) -> Result<&BTreeSet<StudentStatus>, RecordError> {
        let parsed = status
            .parse::<StudentStatus>()
            .map_err(|_| RecordError::unknown_status(status))?;
        self.targets(parsed)
            .ok_or_else(|| RecordError::unknown_status(status))
    }

    /// Allowed next statuses for a typed status
    pub fn targets(&self, status: StudentStatus) -> Option<&BTreeSet<StudentStatus>> {
        self.transitions.get(&status)
    }

    /// Whether `status` is valid and has no outgoing transitions
    ///
    /// # Errors
    ///
    /// `UnknownStatus` if `status` is not a valid status.
    pub fn is_terminal(&self, status: &str) -> Result<bool, RecordError> {
        Ok(self.allowed_from(status)?.is_empty())
    }
}
