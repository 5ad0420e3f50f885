//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the Cohort core:
//! - Row identifiers (`UserId`, `CourseId`, `LessonId`)
//! - The timestamp type used by every record (`Timestamp`)
//! - Error types (`CohortError`)
//!
//! ## Determinism Guarantees
//!
//! All identifiers:
//! - Are plain `u64` newtypes allocated by the data store
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of a user profile (learner, creator, moderator or administrator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Identifier of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CourseId(pub u64);

/// Identifier of a lesson.
///
/// Lesson ids are unique across the whole store, not just within a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LessonId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user#{}", self.0)
    }
}

impl std::fmt::Display for CourseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "course#{}", self.0)
    }
}

impl std::fmt::Display for LessonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lesson#{}", self.0)
    }
}

/// Wall-clock instant carried by records.
///
/// The core never reads the clock itself; callers pass `now` explicitly.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Cohort core.
///
/// - No silent failures
/// - Permission and transition failures are returned before any mutation
/// - The core should never panic; all errors must be recoverable
#[derive(Debug, Error)]
pub enum CohortError {
    /// The acting role does not hold the required capability.
    #[error("Permission denied: {capability} required")]
    PermissionDenied {
        /// Kebab-case name of the missing capability.
        capability: &'static str,
    },

    /// A status change was requested that the lifecycle does not allow.
    #[error("Invalid transition: cannot {action} while {from}")]
    InvalidTransition {
        /// Current status name.
        from: &'static str,
        /// Requested action name.
        action: &'static str,
    },

    /// A concurrent writer updated the record first. Retry with a fresh read.
    #[error("Write conflict on {entity}: expected revision {expected}, found {found}")]
    Conflict {
        entity: String,
        expected: u64,
        found: u64,
    },

    /// The requested row does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request was well-typed but semantically invalid.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The backing store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A row could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CohortError {
    /// Whether the caller should retry the whole read-modify-write.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, CohortError::Conflict { .. })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn identifiers_order_deterministically() {
        let set: BTreeSet<LessonId> = [LessonId(3), LessonId(1), LessonId(2)].into_iter().collect();
        let ordered: Vec<_> = set.into_iter().collect();
        assert_eq!(ordered, vec![LessonId(1), LessonId(2), LessonId(3)]);
    }

    #[test]
    fn identifiers_display_with_kind() {
        assert_eq!(UserId(7).to_string(), "user#7");
        assert_eq!(CourseId(2).to_string(), "course#2");
        assert_eq!(LessonId(9).to_string(), "lesson#9");
    }

    #[test]
    fn conflict_is_retryable() {
        let err = CohortError::Conflict {
            entity: "enrollment".to_string(),
            expected: 1,
            found: 2,
        };
        assert!(err.is_conflict());
        assert!(!CohortError::NotFound("x".to_string()).is_conflict());
    }

    #[test]
    fn permission_denied_names_capability() {
        let err = CohortError::PermissionDenied {
            capability: "manage-accounts",
        };
        assert_eq!(err.to_string(), "Permission denied: manage-accounts required");
    }
}
