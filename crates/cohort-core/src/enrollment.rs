//! # Enrollment State Machine
//!
//! One learner's record of traversal through one course.
//!
//! ```text
//!            mark-complete (all lessons done)
//! exploring ─────────────────────────────────▶ completed
//!   │   ▲
//! pause resume
//!   ▼   │
//!  paused
//! ```
//!
//! - `completed` is a permanent milestone: later completions keep the status
//!   and the original `completed_at`.
//! - Every transition and every mark-complete updates `last_accessed_at`.
//! - Rejected actions return `InvalidTransition` and leave the record as is.

use crate::course::LessonSequence;
use crate::progress::{Progress, recompute};
use crate::types::{CohortError, CourseId, LessonId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// STATUS
// =============================================================================

/// Enrollment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnrollmentStatus {
    Exploring,
    Completed,
    Paused,
}

impl EnrollmentStatus {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            EnrollmentStatus::Exploring => "exploring",
            EnrollmentStatus::Completed => "completed",
            EnrollmentStatus::Paused => "paused",
        }
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// INTEGRITY WARNINGS
// =============================================================================

/// A data-integrity condition that did not stop the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrityWarning {
    /// The requested lesson is not part of the course; it was ignored.
    UnknownLesson { course: CourseId, lesson: LessonId },
    /// The stored record listed lessons outside the course; they were dropped.
    StrayCompletion {
        course: CourseId,
        lessons: Vec<LessonId>,
    },
}

impl std::fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityWarning::UnknownLesson { course, lesson } => {
                write!(f, "{} is not a lesson of {}", lesson, course)
            }
            IntegrityWarning::StrayCompletion { course, lessons } => {
                write!(f, "{} stray completion(s) on {}", lessons.len(), course)
            }
        }
    }
}

// =============================================================================
// ENROLLMENT
// =============================================================================

/// The enrollment record.
///
/// Percentage is not stored. Call [`Enrollment::progress`] against the
/// current lesson sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub learner: UserId,
    pub course: CourseId,
    pub status: EnrollmentStatus,
    pub completed_lessons: BTreeSet<LessonId>,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub last_accessed_at: Timestamp,
    /// Optimistic concurrency token. 0 = never written.
    pub revision: u64,
}

/// Result of a mark-complete action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkOutcome {
    pub enrollment: Enrollment,
    pub progress: Progress,
    /// True when this action moved the enrollment to `completed`.
    pub newly_completed: bool,
    pub warnings: Vec<IntegrityWarning>,
}

impl Enrollment {
    /// First enrollment: exploring, nothing completed.
    #[must_use]
    pub fn start(learner: UserId, course: CourseId, now: Timestamp) -> Self {
        Self {
            learner,
            course,
            status: EnrollmentStatus::Exploring,
            completed_lessons: BTreeSet::new(),
            started_at: now,
            completed_at: None,
            last_accessed_at: now,
            revision: 0,
        }
    }

    /// Live progress against the given lesson sequence.
    #[must_use]
    pub fn progress(&self, lessons: &LessonSequence) -> Progress {
        recompute(lessons, &self.completed_lessons)
    }

    /// Record learner access without a status change.
    #[must_use]
    pub fn touch(&self, now: Timestamp) -> Enrollment {
        Enrollment {
            last_accessed_at: now,
            ..self.clone()
        }
    }

    /// exploring → paused.
    pub fn pause(&self, now: Timestamp) -> Result<Enrollment, CohortError> {
        match self.status {
            EnrollmentStatus::Exploring => Ok(Enrollment {
                status: EnrollmentStatus::Paused,
                last_accessed_at: now,
                ..self.clone()
            }),
            other => Err(invalid(other, "pause")),
        }
    }

    /// paused → exploring.
    pub fn resume(&self, now: Timestamp) -> Result<Enrollment, CohortError> {
        match self.status {
            EnrollmentStatus::Paused => Ok(Enrollment {
                status: EnrollmentStatus::Exploring,
                last_accessed_at: now,
                ..self.clone()
            }),
            other => Err(invalid(other, "resume")),
        }
    }

    /// Union `lesson` into the completed set and derive the new status.
    ///
    /// Idempotent: repeating the call with the same lesson yields the same
    /// set, percentage and status. An id outside `lessons` is ignored and
    /// reported as a warning.
    pub fn mark_lesson_complete(
        &self,
        lessons: &LessonSequence,
        lesson: LessonId,
        now: Timestamp,
    ) -> Result<MarkOutcome, CohortError> {
        if self.status == EnrollmentStatus::Paused {
            return Err(invalid(self.status, "mark-lesson-complete"));
        }

        let mut warnings = Vec::new();
        let mut completed = self.completed_lessons.clone();

        let stray: Vec<LessonId> = completed
            .iter()
            .copied()
            .filter(|id| !lessons.contains(*id))
            .collect();
        if !stray.is_empty() {
            for id in &stray {
                completed.remove(id);
            }
            warnings.push(IntegrityWarning::StrayCompletion {
                course: self.course,
                lessons: stray,
            });
        }

        if lessons.contains(lesson) {
            completed.insert(lesson);
        } else {
            warnings.push(IntegrityWarning::UnknownLesson {
                course: self.course,
                lesson,
            });
        }

        let progress = recompute(lessons, &completed);
        let newly_completed = self.status == EnrollmentStatus::Exploring && progress.is_complete;

        let (status, completed_at) = if newly_completed {
            (EnrollmentStatus::Completed, Some(now))
        } else {
            (self.status, self.completed_at)
        };

        let enrollment = Enrollment {
            status,
            completed_lessons: completed,
            completed_at,
            last_accessed_at: now,
            ..self.clone()
        };

        Ok(MarkOutcome {
            enrollment,
            progress,
            newly_completed,
            warnings,
        })
    }

    /// `completed_at` is set iff status is `completed`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        (self.status == EnrollmentStatus::Completed) == self.completed_at.is_some()
    }
}

fn invalid(from: EnrollmentStatus, action: &'static str) -> CohortError {
    CohortError::InvalidTransition {
        from: from.name(),
        action,
    }
}

// =============================================================================
// TESTS
// =============================================================================
