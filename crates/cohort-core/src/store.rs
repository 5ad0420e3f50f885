//! # Collaborator Seams
//!
//! The core reads and writes rows through [`LearningStore`] and resolves
//! roles through [`IdentityProvider`]. Both are implemented by
//! [`MemoryStore`] (volatile) and [`crate::storage::RedbStore`] (ACID, on disk).
//!
//! ## Write Contract
//!
//! `write_enrollment` is revision-checked. The stored revision must equal
//! the revision carried by the record, otherwise the write fails with
//! `CohortError::Conflict` and nothing changes. A successful write returns
//! the record with `revision + 1`.
//!
//! `create_lesson` rejects a duplicate order index, or a course already at
//! `MAX_LESSONS_PER_COURSE`, under the same lock or transaction that
//! inserts the row.

use crate::course::{Course, Lesson, LessonSequence};
use crate::enrollment::Enrollment;
use crate::primitives::MAX_LESSONS_PER_COURSE;
use crate::role::Role;
use crate::types::{CohortError, CourseId, LessonId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

// =============================================================================
// ROW TYPES
// =============================================================================

/// A user profile row. The role is kept as its stored name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub display_name: String,
    pub role: String,
    pub created_at: Timestamp,
}

impl Profile {
    /// Resolved role, or `None` for an unrecognized stored name.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// A recommendation that `candidate` be promoted to community moderator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nomination {
    pub candidate: UserId,
    pub nominated_by: UserId,
    pub created_at: Timestamp,
}

/// Row counts, for status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreStats {
    pub profiles: usize,
    pub courses: usize,
    pub lessons: usize,
    pub enrollments: usize,
    pub nominations: usize,
}

// =============================================================================
// TRAITS
// =============================================================================

/// Row-oriented data store consumed by the core.
pub trait LearningStore: Send + Sync {
    fn create_profile(
        &self,
        display_name: &str,
        role: Role,
        now: Timestamp,
    ) -> Result<Profile, CohortError>;
    fn read_profile(&self, user: UserId) -> Result<Option<Profile>, CohortError>;
    fn write_profile(&self, profile: &Profile) -> Result<(), CohortError>;

    fn create_course(&self, title: &str, owner: UserId, now: Timestamp)
    -> Result<Course, CohortError>;
    fn read_course(&self, course: CourseId) -> Result<Option<Course>, CohortError>;
    fn write_course(&self, course: &Course) -> Result<(), CohortError>;

    fn create_lesson(
        &self,
        course: CourseId,
        title: &str,
        order_index: i64,
        estimated_minutes: Option<u32>,
    ) -> Result<Lesson, CohortError>;
    fn read_lessons(&self, course: CourseId) -> Result<Vec<Lesson>, CohortError>;

    fn read_enrollment(
        &self,
        learner: UserId,
        course: CourseId,
    ) -> Result<Option<Enrollment>, CohortError>;
    fn write_enrollment(&self, enrollment: &Enrollment) -> Result<Enrollment, CohortError>;
    fn delete_enrollment(&self, learner: UserId, course: CourseId) -> Result<bool, CohortError>;
    fn course_enrollments(&self, course: CourseId) -> Result<Vec<Enrollment>, CohortError>;

    fn write_nomination(&self, nomination: &Nomination) -> Result<(), CohortError>;
    fn nominations(&self) -> Result<Vec<Nomination>, CohortError>;

    fn stats(&self) -> Result<StoreStats, CohortError>;

    /// Lesson ids of a course in traversal order.
    fn read_lesson_ids(&self, course: CourseId) -> Result<LessonSequence, CohortError> {
        LessonSequence::from_lessons(&self.read_lessons(course)?)
    }
}

/// Resolves the current role of a user.
pub trait IdentityProvider {
    /// `Ok(None)` when the user has no profile or an unrecognized role.
    fn current_role(&self, user: UserId) -> Result<Option<Role>, CohortError>;
}

impl<T: LearningStore + ?Sized> IdentityProvider for T {
    fn current_role(&self, user: UserId) -> Result<Option<Role>, CohortError> {
        Ok(self.read_profile(user)?.and_then(|p| p.role()))
    }
}

/// Shared revision check for both store implementations.
pub(crate) fn check_revision(
    stored: Option<&Enrollment>,
    incoming: &Enrollment,
) -> Result<(), CohortError> {
    let found = stored.map(|e| e.revision).unwrap_or(0);
    if found != incoming.revision {
        return Err(CohortError::Conflict {
            entity: format!("enrollment {}/{}", incoming.learner, incoming.course),
            expected: incoming.revision,
            found,
        });
    }
    Ok(())
}

/// Shared lesson slot check: the course must have room and `order_index`
/// must be unused among its `existing` lessons.
pub(crate) fn check_lesson_slot<'a>(
    course: CourseId,
    order_index: i64,
    existing: impl IntoIterator<Item = &'a Lesson>,
) -> Result<(), CohortError> {
    let mut count = 0usize;
    for lesson in existing {
        if lesson.order_index == order_index {
            return Err(CohortError::InvalidInput(format!(
                "order index {} already used in {}",
                order_index, course
            )));
        }
        count = count.saturating_add(1);
    }
    if count >= MAX_LESSONS_PER_COURSE {
        return Err(CohortError::InvalidInput(format!(
            "{} already has {} lessons",
            course, MAX_LESSONS_PER_COURSE
        )));
    }
    Ok(())
}

// =============================================================================
// MEMORY STORE
// =============================================================================

#[derive(Debug, Default)]
struct Tables {
    profiles: BTreeMap<UserId, Profile>,
    courses: BTreeMap<CourseId, Course>,
    lessons: BTreeMap<LessonId, Lesson>,
    enrollments: BTreeMap<(UserId, CourseId), Enrollment>,
    nominations: BTreeMap<UserId, Nomination>,
    next_user: u64,
    next_course: u64,
    next_lesson: u64,
}

/// Volatile store behind a single mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, CohortError> {
        self.tables
            .lock()
            .map_err(|_| CohortError::Storage("memory store lock poisoned".to_string()))
    }
}

impl LearningStore for MemoryStore {
    fn create_profile(
        &self,
        display_name: &str,
        role: Role,
        now: Timestamp,
    ) -> Result<Profile, CohortError> {
        let mut t = self.lock()?;
        t.next_user = t.next_user.saturating_add(1);
        let profile = Profile {
            id: UserId(t.next_user),
            display_name: display_name.to_string(),
            role: role.name().to_string(),
            created_at: now,
        };
        t.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    fn read_profile(&self, user: UserId) -> Result<Option<Profile>, CohortError> {
        Ok(self.lock()?.profiles.get(&user).cloned())
    }

    fn write_profile(&self, profile: &Profile) -> Result<(), CohortError> {
        self.lock()?.profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    fn create_course(
        &self,
        title: &str,
        owner: UserId,
        now: Timestamp,
    ) -> Result<Course, CohortError> {
        let mut t = self.lock()?;
        t.next_course = t.next_course.saturating_add(1);
        let course = Course::new(CourseId(t.next_course), title, owner, now);
        t.courses.insert(course.id, course.clone());
        Ok(course)
    }

    fn read_course(&self, course: CourseId) -> Result<Option<Course>, CohortError> {
        Ok(self.lock()?.courses.get(&course).cloned())
    }

    fn write_course(&self, course: &Course) -> Result<(), CohortError> {
        self.lock()?.courses.insert(course.id, course.clone());
        Ok(())
    }

    fn create_lesson(
        &self,
        course: CourseId,
        title: &str,
        order_index: i64,
        estimated_minutes: Option<u32>,
    ) -> Result<Lesson, CohortError> {
        let mut t = self.lock()?;
        check_lesson_slot(
            course,
            order_index,
            t.lessons.values().filter(|l| l.course == course),
        )?;
        t.next_lesson = t.next_lesson.saturating_add(1);
        let lesson = Lesson {
            id: LessonId(t.next_lesson),
            course,
            title: title.to_string(),
            order_index,
            estimated_minutes,
        };
        t.lessons.insert(lesson.id, lesson.clone());
        Ok(lesson)
    }

    fn read_lessons(&self, course: CourseId) -> Result<Vec<Lesson>, CohortError> {
        Ok(self
            .lock()?
            .lessons
            .values()
            .filter(|l| l.course == course)
            .cloned()
            .collect())
    }

    fn read_enrollment(
        &self,
        learner: UserId,
        course: CourseId,
    ) -> Result<Option<Enrollment>, CohortError> {
        Ok(self.lock()?.enrollments.get(&(learner, course)).cloned())
    }

    fn write_enrollment(&self, enrollment: &Enrollment) -> Result<Enrollment, CohortError> {
        let mut t = self.lock()?;
        let key = (enrollment.learner, enrollment.course);
        check_revision(t.enrollments.get(&key), enrollment)?;

        let mut written = enrollment.clone();
        written.revision = written.revision.saturating_add(1);
        t.enrollments.insert(key, written.clone());
        Ok(written)
    }

    fn delete_enrollment(&self, learner: UserId, course: CourseId) -> Result<bool, CohortError> {
        Ok(self.lock()?.enrollments.remove(&(learner, course)).is_some())
    }

    fn course_enrollments(&self, course: CourseId) -> Result<Vec<Enrollment>, CohortError> {
        Ok(self
            .lock()?
            .enrollments
            .values()
            .filter(|e| e.course == course)
            .cloned()
            .collect())
    }

    fn write_nomination(&self, nomination: &Nomination) -> Result<(), CohortError> {
        self.lock()?
            .nominations
            .insert(nomination.candidate, nomination.clone());
        Ok(())
    }

    fn nominations(&self) -> Result<Vec<Nomination>, CohortError> {
        Ok(self.lock()?.nominations.values().cloned().collect())
    }

    fn stats(&self) -> Result<StoreStats, CohortError> {
        let t = self.lock()?;
        Ok(StoreStats {
            profiles: t.profiles.len(),
            courses: t.courses.len(),
            lessons: t.lessons.len(),
            enrollments: t.enrollments.len(),
            nominations: t.nominations.len(),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
