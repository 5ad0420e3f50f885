//! # Course Analytics
//!
//! Enrollment summaries computed from stored records only. Integer math;
//! no sampling, no synthetic data.

use crate::course::LessonSequence;
use crate::enrollment::{Enrollment, EnrollmentStatus};
use crate::types::CourseId;
use serde::{Deserialize, Serialize};

/// Per-course enrollment summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub course: CourseId,
    pub lesson_count: usize,
    pub enrolled: usize,
    pub exploring: usize,
    pub paused: usize,
    pub completed: usize,
    /// Enrollments whose live percentage is 100.
    pub fully_progressed: usize,
    /// Rounded mean of live percentages; 0 with no enrollments.
    pub mean_percentage: u8,
}

/// Summarize `enrollments` against the course's current lessons.
#[must_use]
pub fn summarize(
    course: CourseId,
    lessons: &LessonSequence,
    enrollments: &[Enrollment],
) -> CourseSummary {
    let mut summary = CourseSummary {
        course,
        lesson_count: lessons.len(),
        enrolled: enrollments.len(),
        exploring: 0,
        paused: 0,
        completed: 0,
        fully_progressed: 0,
        mean_percentage: 0,
    };

    let mut total: u64 = 0;
    for enrollment in enrollments {
        match enrollment.status {
            EnrollmentStatus::Exploring => summary.exploring += 1,
            EnrollmentStatus::Paused => summary.paused += 1,
            EnrollmentStatus::Completed => summary.completed += 1,
        }
        let progress = enrollment.progress(lessons);
        if progress.is_complete {
            summary.fully_progressed += 1;
        }
        total = total.saturating_add(progress.percentage as u64);
    }

    if !enrollments.is_empty() {
        let n = enrollments.len() as u64;
        summary.mean_percentage = (total.saturating_mul(2).saturating_add(n) / n.saturating_mul(2))
            .min(100) as u8;
    }
    summary
}
