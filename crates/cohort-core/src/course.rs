//! # Course Catalog
//!
//! Courses, lessons and the course lifecycle.
//!
//! ```text
//! incubating ──publish──▶ published
//!     │                      │
//!     └──────archive─────────┴──▶ archived (terminal)
//! ```
//!
//! Archived courses keep their data but are hidden from learners and
//! cannot be enrolled in or edited.

use crate::types::{CohortError, CourseId, LessonId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// COURSE STATUS
// =============================================================================

/// Lifecycle status of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CourseStatus {
    Incubating,
    Published,
    Archived,
}

impl CourseStatus {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CourseStatus::Incubating => "incubating",
            CourseStatus::Published => "published",
            CourseStatus::Archived => "archived",
        }
    }

    /// Whether learners can see and enroll in the course.
    #[must_use]
    pub fn is_learner_visible(&self) -> bool {
        matches!(self, CourseStatus::Published)
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// COURSE
// =============================================================================

/// A course owned by a creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub status: CourseStatus,
    pub owner: UserId,
    pub created_at: Timestamp,
}

impl Course {
    /// A new course in `incubating`.
    #[must_use]
    pub fn new(id: CourseId, title: impl Into<String>, owner: UserId, now: Timestamp) -> Self {
        Self {
            id,
            title: title.into(),
            status: CourseStatus::Incubating,
            owner,
            created_at: now,
        }
    }

    /// incubating → published.
    pub fn publish(&self) -> Result<Course, CohortError> {
        match self.status {
            CourseStatus::Incubating => Ok(Course {
                status: CourseStatus::Published,
                ..self.clone()
            }),
            other => Err(CohortError::InvalidTransition {
                from: other.name(),
                action: "publish",
            }),
        }
    }

    /// incubating | published → archived.
    pub fn archive(&self) -> Result<Course, CohortError> {
        match self.status {
            CourseStatus::Incubating | CourseStatus::Published => Ok(Course {
                status: CourseStatus::Archived,
                ..self.clone()
            }),
            CourseStatus::Archived => Err(CohortError::InvalidTransition {
                from: CourseStatus::Archived.name(),
                action: "archive",
            }),
        }
    }

    /// Lessons may be added until the course is archived.
    pub fn ensure_editable(&self) -> Result<(), CohortError> {
        if self.status == CourseStatus::Archived {
            return Err(CohortError::InvalidTransition {
                from: CourseStatus::Archived.name(),
                action: "edit",
            });
        }
        Ok(())
    }

    /// Enrollment requires a published course.
    pub fn ensure_enrollable(&self) -> Result<(), CohortError> {
        if !self.status.is_learner_visible() {
            return Err(CohortError::InvalidTransition {
                from: self.status.name(),
                action: "enroll",
            });
        }
        Ok(())
    }
}

// =============================================================================
// LESSON
// =============================================================================

/// A lesson inside exactly one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub course: CourseId,
    pub title: String,
    /// Traversal position, unique within the course.
    pub order_index: i64,
    pub estimated_minutes: Option<u32>,
}

// =============================================================================
// LESSON SEQUENCE
// =============================================================================

/// The ordered lesson ids of one course.
///
/// Built from lesson rows; order is ascending `order_index`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LessonSequence {
    ordered: Vec<LessonId>,
}

impl LessonSequence {
    /// Build from lesson rows in any order.
    ///
    /// Fails if two lessons share an order index or a lesson id appears twice.
    pub fn from_lessons(lessons: &[Lesson]) -> Result<Self, CohortError> {
        let mut rows: Vec<(i64, LessonId)> =
            lessons.iter().map(|l| (l.order_index, l.id)).collect();
        rows.sort();

        let mut seen = BTreeSet::new();
        for pair in rows.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(CohortError::InvalidInput(format!(
                    "order index {} used by {} and {}",
                    pair[0].0, pair[0].1, pair[1].1
                )));
            }
        }
        for (_, id) in &rows {
            if !seen.insert(*id) {
                return Err(CohortError::InvalidInput(format!("duplicate {}", id)));
            }
        }

        Ok(Self {
            ordered: rows.into_iter().map(|(_, id)| id).collect(),
        })
    }

    /// Build from ids already in traversal order.
    ///
    /// Repeated ids keep their first position.
    #[must_use]
    pub fn from_ordered(ids: impl IntoIterator<Item = LessonId>) -> Self {
        let mut seen = BTreeSet::new();
        let ordered = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        Self { ordered }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: LessonId) -> bool {
        self.ordered.contains(&id)
    }

    /// Ids in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = LessonId> + '_ {
        self.ordered.iter().copied()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> Timestamp {
        chrono::Utc
            .with_ymd_and_hms(2026, 1, 5, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn lesson(id: u64, order_index: i64) -> Lesson {
        Lesson {
            id: LessonId(id),
            course: CourseId(1),
            title: format!("Lesson {}", id),
            order_index,
            estimated_minutes: None,
        }
    }

    #[test]
    fn new_course_is_incubating() {
        let course = Course::new(CourseId(1), "Rust", UserId(4), t0());
        assert_eq!(course.status, CourseStatus::Incubating);
        assert!(course.ensure_enrollable().is_err());
    }

    #[test]
    fn publish_then_archive() {
        let course = Course::new(CourseId(1), "Rust", UserId(4), t0());
        let published = course.publish().expect("publish");
        assert_eq!(published.status, CourseStatus::Published);
        assert!(published.ensure_enrollable().is_ok());

        let archived = published.archive().expect("archive");
        assert_eq!(archived.status, CourseStatus::Archived);
        assert!(archived.ensure_editable().is_err());
        assert!(archived.ensure_enrollable().is_err());
    }

    #[test]
    fn publish_twice_is_invalid() {
        let published = Course::new(CourseId(1), "Rust", UserId(4), t0())
            .publish()
            .expect("publish");
        let err = published.publish().expect_err("already published");
        assert!(matches!(
            err,
            CohortError::InvalidTransition {
                from: "published",
                action: "publish"
            }
        ));
    }

    #[test]
    fn archived_is_terminal() {
        let archived = Course::new(CourseId(1), "Rust", UserId(4), t0())
            .archive()
            .expect("archive");
        assert!(archived.publish().is_err());
        assert!(archived.archive().is_err());
    }

    #[test]
    fn sequence_sorts_by_order_index() {
        let seq = LessonSequence::from_lessons(&[lesson(30, 3), lesson(10, 1), lesson(20, 2)])
            .expect("sequence");
        let ids: Vec<_> = seq.iter().collect();
        assert_eq!(ids, vec![LessonId(10), LessonId(20), LessonId(30)]);
    }

    #[test]
    fn sequence_rejects_shared_order_index() {
        let result = LessonSequence::from_lessons(&[lesson(1, 1), lesson(2, 1)]);
        assert!(matches!(result, Err(CohortError::InvalidInput(_))));
    }

    #[test]
    fn from_ordered_drops_repeats() {
        let seq = LessonSequence::from_ordered([LessonId(2), LessonId(1), LessonId(2)]);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.iter().next(), Some(LessonId(2)));
    }
}
