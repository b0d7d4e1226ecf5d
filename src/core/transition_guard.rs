//! Status transition guard
//!
//! A finite-state machine over enrollment statuses: states are the valid
//! statuses, edges come from the [`StatusRuleTable`]. Requesting the status
//! a record already has is always accepted, so idempotent updates never
//! fail on the status field.

use crate::core::status_rules::{rules, StatusRuleTable};
use crate::types::{RecordError, StudentStatus};

/// Accepts or rejects status changes against a rule table
#[derive(Debug, Clone, Copy)]
pub struct StatusTransitionGuard<'a> {
    table: &'a StatusRuleTable,
}

impl StatusTransitionGuard<'static> {
    /// Guard backed by the process-wide rule table
    pub fn standard() -> Self {
        Self::new(rules())
    }
}

impl Default for StatusTransitionGuard<'static> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'a> StatusTransitionGuard<'a> {
    pub fn new(table: &'a StatusRuleTable) -> Self {
        Self { table }
    }

    /// Check a change from `current` to `requested`
    ///
    /// # Errors
    ///
    /// - `UnknownStatus` if `current` is not in the table
    /// - `Format` on `status` if `requested` is not a valid status
    /// - `IllegalTransition` if the table has no such edge
    pub fn can_transition(&self, current: &str, requested: &str) -> Result<(), RecordError> {
        if current == requested {
            return Ok(());
        }

        let allowed = self.table.allowed_from(current)?;
        let target = requested.parse::<StudentStatus>()?;

        // Same status spelled differently ("đang học" vs "Đang học")
        if current.parse::<StudentStatus>().ok() == Some(target) {
            return Ok(());
        }

        if allowed.contains(&target) {
            Ok(())
        } else {
            Err(RecordError::illegal_transition(current, requested))
        }
    }

    /// Typed form of [`can_transition`](Self::can_transition)
    pub fn check(&self, current: StudentStatus, requested: StudentStatus) -> Result<(), RecordError> {
        self.can_transition(current.as_str(), requested.as_str())
    }
}

/// Check a change against the standard rule table
pub fn can_transition(current: &str, requested: &str) -> Result<(), RecordError> {
    StatusTransitionGuard::standard().can_transition(current, requested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_same_status_always_accepted() {
        for status in StudentStatus::ALL {
            assert!(can_transition(status.as_str(), status.as_str()).is_ok());
        }
    }

    #[test]
    fn test_accepts_exactly_the_table_edges() {
        let table = rules();
        for from in StudentStatus::ALL {
            let allowed = table.targets(from).unwrap();
            for to in StudentStatus::ALL {
                let expected = from == to || allowed.contains(&to);
                assert_eq!(
                    can_transition(from.as_str(), to.as_str()).is_ok(),
                    expected,
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_graduated_is_terminal() {
        for to in StudentStatus::ALL {
            if to == StudentStatus::Graduated {
                continue;
            }
            assert_eq!(
                can_transition("Đã tốt nghiệp", to.as_str()).unwrap_err(),
                RecordError::illegal_transition("Đã tốt nghiệp", to.as_str())
            );
        }
    }

    #[rstest]
    #[case("Đang học", "Bảo lưu")]
    #[case("Bảo lưu", "Đang học")]
    #[case("Đình chỉ", "Đã thôi học")]
    #[case("Đang học", "Đã tốt nghiệp")]
    fn test_allowed_transitions(#[case] from: &str, #[case] to: &str) {
        assert!(can_transition(from, to).is_ok());
    }

    #[test]
    fn test_illegal_transition_message() {
        let err = can_transition("Bảo lưu", "Đã tốt nghiệp").unwrap_err();
        assert_eq!(err.to_string(), "illegal transition from Bảo lưu to Đã tốt nghiệp");
    }

    #[test]
    fn test_unknown_current_status_is_distinct() {
        let err = can_transition("Tạm dừng học", "Đang học").unwrap_err();
        assert_eq!(err, RecordError::unknown_status("Tạm dừng học"));
    }

    #[test]
    fn test_unknown_requested_status_is_format_error() {
        let err = can_transition("Đang học", "Tạm dừng học").unwrap_err();
        assert_eq!(err.field(), Some("status"));
        assert!(matches!(err, RecordError::Format { .. }));
    }

    #[test]
    fn test_case_variants_of_same_status() {
        assert!(can_transition("Đã tốt nghiệp", "đã tốt nghiệp").is_ok());
    }

    #[test]
    fn test_guard_with_custom_table() {
        let table = StatusRuleTable::from_edges(&[]);
        let guard = StatusTransitionGuard::new(&table);

        assert!(guard
            .check(StudentStatus::Studying, StudentStatus::Graduated)
            .is_err());
        assert!(guard
            .check(StudentStatus::Studying, StudentStatus::Studying)
            .is_ok());
    }
}
