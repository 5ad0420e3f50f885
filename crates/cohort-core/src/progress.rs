//! # Enrollment Progress Engine
//!
//! Derives percentage, completion and the next lesson from a lesson
//! sequence and a set of completed lesson ids.
//!
//! ## Rules
//!
//! - `percentage = round(100 * |completed ∩ lessons| / N)`, integer math,
//!   halves round up. An empty course is always 0%.
//! - `is_complete` iff every lesson is completed and the course has lessons.
//! - `next_lesson` is the first incomplete lesson in traversal order.
//! - Ids outside the course are not counted and are reported as `stray`.

use crate::course::LessonSequence;
use crate::types::LessonId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Derived progress of one enrollment at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// 0..=100
    pub percentage: u8,
    pub is_complete: bool,
    pub next_lesson: Option<LessonId>,
    /// Completed ids that do not belong to the course.
    pub stray: Vec<LessonId>,
}

/// Integer `round(100 * done / total)` with halves rounding up.
///
/// `total == 0` yields 0.
#[must_use]
pub fn percentage(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = done.min(total) as u64;
    let total = total as u64;
    let rounded = (done.saturating_mul(200).saturating_add(total)) / total.saturating_mul(2);
    rounded.min(100) as u8
}

/// Recompute progress. Pure; never fails.
#[must_use]
pub fn recompute(lessons: &LessonSequence, completed: &BTreeSet<LessonId>) -> Progress {
    let done = lessons.iter().filter(|id| completed.contains(id)).count();
    let stray: Vec<LessonId> = completed
        .iter()
        .copied()
        .filter(|id| !lessons.contains(*id))
        .collect();

    let is_complete = !lessons.is_empty() && done == lessons.len();
    let next_lesson = if is_complete {
        None
    } else {
        lessons.iter().find(|id| !completed.contains(id))
    };

    Progress {
        percentage: percentage(done, lessons.len()),
        is_complete,
        next_lesson,
        stray,
    }
}

// =============================================================================
// TESTS
// =============================================================================
