//! # Innate Primitives
//!
//! Hardcoded limits for the Cohort core. Compiled in, immutable at runtime.

/// How many times a read-modify-write of one enrollment is attempted before
/// the conflict is returned to the caller.
///
/// Each attempt re-reads the record and re-applies the change, so a lost
/// race never drops the other writer's completion.
pub const MAX_WRITE_ATTEMPTS: usize = 8;

/// Maximum length for course and lesson titles, in bytes.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for profile display names, in bytes.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 120;

/// Maximum number of lessons in one course.
///
/// Bounds the cost of every progress recompute.
pub const MAX_LESSONS_PER_COURSE: usize = 1000;

/// Validate a title or name: non-blank and within `max` bytes.
pub(crate) fn validate_text(field: &str, value: &str, max: usize) -> Result<(), crate::CohortError> {
    if value.trim().is_empty() {
        return Err(crate::CohortError::InvalidInput(format!("{} must not be empty", field)));
    }
    if value.len() > max {
        return Err(crate::CohortError::InvalidInput(format!(
            "{} length {} exceeds maximum {} bytes",
            field,
            value.len(),
            max
        )));
    }
    Ok(())
}
