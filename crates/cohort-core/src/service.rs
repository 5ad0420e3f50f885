//! # Learning Service
//!
//! Wires the engines to the collaborators:
//!
//! ```text
//! actor ──▶ capability gate ──▶ read rows ──▶ recompute / transition ──▶ write
//!                                   ▲                                     │
//!                                   └──────── retry on Conflict ──────────┘
//! ```
//!
//! Every operation takes the acting [`Actor`] and `now` explicitly. Nothing
//! is read from ambient state, so the same inputs give the same result.
//!
//! Permission and transition failures return before any write.

use crate::analytics::{CourseSummary, summarize};
use crate::capability::{Capability, CapabilitySet, capabilities_for, require};
use crate::course::{Course, Lesson, LessonSequence};
use crate::enrollment::{Enrollment, MarkOutcome};
use crate::primitives::{
    MAX_DISPLAY_NAME_LENGTH, MAX_TITLE_LENGTH, MAX_WRITE_ATTEMPTS, validate_text,
};
use crate::progress::Progress;
use crate::role::Role;
use crate::store::{IdentityProvider, LearningStore, MemoryStore, Nomination, Profile};
use crate::types::{CohortError, CourseId, LessonId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// ACTOR
// =============================================================================

/// The user performing an action, with the role resolved for this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user: UserId,
    pub role: Option<Role>,
}

impl Actor {
    #[must_use]
    pub fn new(user: UserId, role: Option<Role>) -> Self {
        Self { user, role }
    }

    #[must_use]
    pub fn capabilities(&self) -> CapabilitySet {
        capabilities_for(self.role)
    }

    pub fn require(&self, capability: Capability) -> Result<(), CohortError> {
        require(self.role, capability)
    }
}

/// An enrollment together with its live progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentView {
    pub enrollment: Enrollment,
    pub progress: Progress,
}

// =============================================================================
// SERVICE
// =============================================================================

/// The learning core's operation surface.
#[derive(Clone)]
pub struct LearningService {
    store: Arc<dyn LearningStore>,
}

impl std::fmt::Debug for LearningService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearningService").finish_non_exhaustive()
    }
}

impl LearningService {
    #[must_use]
    pub fn new(store: Arc<dyn LearningStore>) -> Self {
        Self { store }
    }

    /// A service over a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    #[must_use]
    pub fn store(&self) -> &dyn LearningStore {
        self.store.as_ref()
    }

    /// Resolve the acting user through the identity provider.
    pub fn actor(&self, user: UserId) -> Result<Actor, CohortError> {
        Ok(Actor::new(user, self.store.current_role(user)?))
    }

    /// Capability set of a user, as stored right now.
    pub fn capabilities(&self, user: UserId) -> Result<CapabilitySet, CohortError> {
        Ok(self.actor(user)?.capabilities())
    }

    // =========================================================================
    // ACCOUNTS
    // =========================================================================

    /// Create a profile. New accounts are always base members.
    pub fn register(&self, display_name: &str, now: Timestamp) -> Result<Profile, CohortError> {
        validate_text("display name", display_name, MAX_DISPLAY_NAME_LENGTH)?;
        let profile = self
            .store
            .create_profile(display_name.trim(), Role::BaseMember, now)?;
        tracing::info!(user = profile.id.0, "profile registered");
        Ok(profile)
    }

    /// Change another user's role. Administrators only, never on oneself.
    pub fn promote(
        &self,
        actor: &Actor,
        target: UserId,
        role: Role,
    ) -> Result<Profile, CohortError> {
        actor.require(Capability::ManageAccounts)?;
        if actor.user == target {
            tracing::warn!(user = actor.user.0, "self role change rejected");
            return Err(CohortError::PermissionDenied {
                capability: Capability::ManageAccounts.name(),
            });
        }

        let mut profile = self
            .store
            .read_profile(target)?
            .ok_or_else(|| CohortError::NotFound(target.to_string()))?;
        let previous = profile.role.clone();
        profile.role = role.name().to_string();
        self.store.write_profile(&profile)?;

        tracing::info!(
            actor = actor.user.0,
            target = target.0,
            from = %previous,
            to = %role,
            "role changed"
        );
        Ok(profile)
    }

    /// Recommend a user for community moderation.
    pub fn nominate_moderator(
        &self,
        actor: &Actor,
        candidate: UserId,
        now: Timestamp,
    ) -> Result<Nomination, CohortError> {
        actor.require(Capability::NominateModerator)?;
        let profile = self
            .store
            .read_profile(candidate)?
            .ok_or_else(|| CohortError::NotFound(candidate.to_string()))?;
        if matches!(
            profile.role(),
            Some(Role::CommunityModerator | Role::Administrator)
        ) {
            return Err(CohortError::InvalidInput(format!(
                "{} is already {}",
                candidate, profile.role
            )));
        }

        let nomination = Nomination {
            candidate,
            nominated_by: actor.user,
            created_at: now,
        };
        self.store.write_nomination(&nomination)?;
        tracing::info!(
            actor = actor.user.0,
            candidate = candidate.0,
            "moderator nominated"
        );
        Ok(nomination)
    }

    /// Open nominations for an administrator to act on.
    ///
    /// Candidates who have since become moderators or administrators are
    /// left out.
    pub fn nominations(&self, actor: &Actor) -> Result<Vec<Nomination>, CohortError> {
        actor.require(Capability::ManageAccounts)?;
        let mut open = Vec::new();
        for nomination in self.store.nominations()? {
            let role = self.store.current_role(nomination.candidate)?;
            if !matches!(
                role,
                Some(Role::CommunityModerator | Role::Administrator)
            ) {
                open.push(nomination);
            }
        }
        Ok(open)
    }

    // =========================================================================
    // COURSE CATALOG
    // =========================================================================

    pub fn create_course(
        &self,
        actor: &Actor,
        title: &str,
        now: Timestamp,
    ) -> Result<Course, CohortError> {
        actor.require(Capability::CreateContent)?;
        validate_text("title", title, MAX_TITLE_LENGTH)?;
        let course = self.store.create_course(title.trim(), actor.user, now)?;
        tracing::info!(actor = actor.user.0, course = course.id.0, "course created");
        Ok(course)
    }

    /// Append a lesson to an editable course.
    ///
    /// The store rejects a duplicate order index or a full course atomically
    /// with the insert.
    pub fn add_lesson(
        &self,
        actor: &Actor,
        course: CourseId,
        title: &str,
        order_index: i64,
        estimated_minutes: Option<u32>,
    ) -> Result<Lesson, CohortError> {
        let course = self.editable_course(actor, course)?;
        course.ensure_editable()?;
        validate_text("title", title, MAX_TITLE_LENGTH)?;

        let lesson =
            self.store
                .create_lesson(course.id, title.trim(), order_index, estimated_minutes)?;
        tracing::info!(
            course = course.id.0,
            lesson = lesson.id.0,
            order_index,
            "lesson added"
        );
        Ok(lesson)
    }

    pub fn publish_course(&self, actor: &Actor, course: CourseId) -> Result<Course, CohortError> {
        let published = self.editable_course(actor, course)?.publish()?;
        self.store.write_course(&published)?;
        tracing::info!(actor = actor.user.0, course = course.0, "course published");
        Ok(published)
    }

    pub fn archive_course(&self, actor: &Actor, course: CourseId) -> Result<Course, CohortError> {
        let archived = self.editable_course(actor, course)?.archive()?;
        self.store.write_course(&archived)?;
        tracing::info!(actor = actor.user.0, course = course.0, "course archived");
        Ok(archived)
    }

    /// Lesson ids of a course in traversal order.
    pub fn lesson_ids(&self, course: CourseId) -> Result<LessonSequence, CohortError> {
        self.store.read_lesson_ids(course)
    }

    /// Owner with create-content, or an administrator.
    fn editable_course(&self, actor: &Actor, course: CourseId) -> Result<Course, CohortError> {
        actor.require(Capability::CreateContent)?;
        let course = self.course(course)?;
        let caps = actor.capabilities();
        if course.owner != actor.user && !caps.access_admin_surface {
            return Err(CohortError::PermissionDenied {
                capability: Capability::AccessAdminSurface.name(),
            });
        }
        Ok(course)
    }

    fn course(&self, course: CourseId) -> Result<Course, CohortError> {
        self.store
            .read_course(course)?
            .ok_or_else(|| CohortError::NotFound(course.to_string()))
    }

    // =========================================================================
    // ENROLLMENT
    // =========================================================================

    /// Enroll the actor in a published course.
    ///
    /// Enrolling again returns the existing record and counts as an access.
    pub fn enroll(
        &self,
        actor: &Actor,
        course: CourseId,
        now: Timestamp,
    ) -> Result<EnrollmentView, CohortError> {
        actor.require(Capability::Enroll)?;
        self.course(course)?.ensure_enrollable()?;
        let lessons = self.store.read_lesson_ids(course)?;

        if self.store.read_enrollment(actor.user, course)?.is_some() {
            return self.revisit(actor.user, course, &lessons, now);
        }

        match self
            .store
            .write_enrollment(&Enrollment::start(actor.user, course, now))
        {
            Ok(written) => {
                tracing::info!(learner = actor.user.0, course = course.0, "enrolled");
                Ok(view(written, &lessons))
            }
            // Another request enrolled first; theirs is the record.
            Err(e) if e.is_conflict() => self.revisit(actor.user, course, &lessons, now),
            Err(e) => Err(e),
        }
    }

    /// Mark one lesson complete for the actor.
    ///
    /// The completed set is merged by union against the latest stored record
    /// and the write is retried on conflict, so concurrent completions of
    /// different lessons all survive.
    pub fn mark_lesson_complete(
        &self,
        actor: &Actor,
        course: CourseId,
        lesson: LessonId,
        now: Timestamp,
    ) -> Result<MarkOutcome, CohortError> {
        actor.require(Capability::Enroll)?;
        let status = self.course(course)?.status;
        if !status.is_learner_visible() {
            return Err(CohortError::InvalidTransition {
                from: status.name(),
                action: "mark-lesson-complete",
            });
        }
        let lessons = self.store.read_lesson_ids(course)?;

        let outcome = self.update_enrollment(actor.user, course, |current| {
            current.mark_lesson_complete(&lessons, lesson, now)
        })?;

        for warning in &outcome.warnings {
            tracing::warn!(
                learner = actor.user.0,
                course = course.0,
                "data integrity: {}",
                warning
            );
        }
        if outcome.newly_completed {
            tracing::info!(learner = actor.user.0, course = course.0, "course completed");
        }
        Ok(outcome)
    }

    pub fn pause(
        &self,
        actor: &Actor,
        course: CourseId,
        now: Timestamp,
    ) -> Result<EnrollmentView, CohortError> {
        actor.require(Capability::Enroll)?;
        let lessons = self.store.read_lesson_ids(course)?;
        let outcome = self.update_enrollment(actor.user, course, |current| {
            current.pause(now).map(|e| view(e, &lessons))
        })?;
        tracing::info!(learner = actor.user.0, course = course.0, "enrollment paused");
        Ok(outcome)
    }

    pub fn resume(
        &self,
        actor: &Actor,
        course: CourseId,
        now: Timestamp,
    ) -> Result<EnrollmentView, CohortError> {
        actor.require(Capability::Enroll)?;
        let lessons = self.store.read_lesson_ids(course)?;
        let outcome = self.update_enrollment(actor.user, course, |current| {
            current.resume(now).map(|e| view(e, &lessons))
        })?;
        tracing::info!(learner = actor.user.0, course = course.0, "enrollment resumed");
        Ok(outcome)
    }

    /// Read an enrollment with live progress.
    ///
    /// A learner reading their own record counts as an access and updates
    /// `last_accessed_at`. Reading someone else's requires view-analytics
    /// and changes nothing.
    pub fn progress(
        &self,
        actor: &Actor,
        learner: UserId,
        course: CourseId,
        now: Timestamp,
    ) -> Result<EnrollmentView, CohortError> {
        let lessons = self.store.read_lesson_ids(course)?;
        if actor.user == learner {
            actor.require(Capability::Enroll)?;
            self.revisit(learner, course, &lessons, now)
        } else {
            actor.require(Capability::ViewAnalytics)?;
            let enrollment = self.enrollment(learner, course)?;
            Ok(view(enrollment, &lessons))
        }
    }

    /// Delete an enrollment. Administrative action.
    pub fn remove_enrollment(
        &self,
        actor: &Actor,
        learner: UserId,
        course: CourseId,
    ) -> Result<bool, CohortError> {
        actor.require(Capability::ManageAccounts)?;
        let removed = self.store.delete_enrollment(learner, course)?;
        tracing::info!(
            actor = actor.user.0,
            learner = learner.0,
            course = course.0,
            removed,
            "enrollment removed"
        );
        Ok(removed)
    }

    // =========================================================================
    // ANALYTICS
    // =========================================================================

    pub fn course_summary(
        &self,
        actor: &Actor,
        course: CourseId,
    ) -> Result<CourseSummary, CohortError> {
        actor.require(Capability::ViewAnalytics)?;
        let course = self.course(course)?;
        let lessons = self.store.read_lesson_ids(course.id)?;
        let enrollments = self.store.course_enrollments(course.id)?;
        Ok(summarize(course.id, &lessons, &enrollments))
    }

    // =========================================================================
    // READ-MODIFY-WRITE
    // =========================================================================

    fn enrollment(&self, learner: UserId, course: CourseId) -> Result<Enrollment, CohortError> {
        self.store.read_enrollment(learner, course)?.ok_or_else(|| {
            CohortError::NotFound(format!("enrollment of {} in {}", learner, course))
        })
    }

    /// Learner access to an existing enrollment: bump `last_accessed_at`.
    fn revisit(
        &self,
        learner: UserId,
        course: CourseId,
        lessons: &LessonSequence,
        now: Timestamp,
    ) -> Result<EnrollmentView, CohortError> {
        self.update_enrollment(learner, course, |current| {
            Ok(view(current.touch(now), lessons))
        })
    }

    /// Apply `change` to the latest stored enrollment and write it back,
    /// retrying with a fresh read when another writer got there first.
    fn update_enrollment<T: Written>(
        &self,
        learner: UserId,
        course: CourseId,
        change: impl Fn(&Enrollment) -> Result<T, CohortError>,
    ) -> Result<T, CohortError> {
        let mut last_conflict = None;
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let current = self.enrollment(learner, course)?;
            let mut result = change(&current)?;
            match self.store.write_enrollment(result.record()) {
                Ok(written) => {
                    *result.record_mut() = written;
                    return Ok(result);
                }
                Err(e) if e.is_conflict() => {
                    tracing::debug!(
                        learner = learner.0,
                        course = course.0,
                        attempt,
                        "enrollment write conflict, retrying"
                    );
                    last_conflict = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        tracing::warn!(
            learner = learner.0,
            course = course.0,
            "enrollment write conflict persisted after {} attempts",
            MAX_WRITE_ATTEMPTS
        );
        Err(last_conflict.unwrap_or_else(|| CohortError::Conflict {
            entity: format!("enrollment {}/{}", learner, course),
            expected: 0,
            found: 0,
        }))
    }
}

/// Results that carry the enrollment record to be written.
trait Written {
    fn record(&self) -> &Enrollment;
    fn record_mut(&mut self) -> &mut Enrollment;
}

impl Written for MarkOutcome {
    fn record(&self) -> &Enrollment {
        &self.enrollment
    }
    fn record_mut(&mut self) -> &mut Enrollment {
        &mut self.enrollment
    }
}

impl Written for EnrollmentView {
    fn record(&self) -> &Enrollment {
        &self.enrollment
    }
    fn record_mut(&mut self) -> &mut Enrollment {
        &mut self.enrollment
    }
}

fn view(enrollment: Enrollment, lessons: &LessonSequence) -> EnrollmentView {
    let progress = enrollment.progress(lessons);
    EnrollmentView {
        enrollment,
        progress,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrollment::EnrollmentStatus;
    use chrono::TimeZone;

    fn now() -> Timestamp {
        chrono::Utc
            .with_ymd_and_hms(2026, 6, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    /// Service with an administrator, a creator and a learner.
    fn setup() -> (LearningService, Actor, Actor, Actor) {
        let service = LearningService::in_memory();
        let admin = service
            .store()
            .create_profile("Root", Role::Administrator, now())
            .expect("admin");
        let creator = service.register("Casey", now()).expect("creator");
        let learner = service.register("Lee", now()).expect("learner");

        let admin = service.actor(admin.id).expect("actor");
        service
            .promote(&admin, creator.id, Role::ContentCreator)
            .expect("promote");
        let creator = service.actor(creator.id).expect("actor");
        let learner = service.actor(learner.id).expect("actor");
        (service, admin, creator, learner)
    }

    fn published_course(service: &LearningService, creator: &Actor, lessons: i64) -> CourseId {
        let course = service
            .create_course(creator, "Intro", now())
            .expect("course");
        for i in 1..=lessons {
            service
                .add_lesson(creator, course.id, &format!("L{}", i), i, None)
                .expect("lesson");
        }
        service.publish_course(creator, course.id).expect("publish");
        course.id
    }

    #[test]
    fn register_defaults_to_base_member() {
        let service = LearningService::in_memory();
        let p = service.register("Sam", now()).expect("register");
        assert_eq!(p.role(), Some(Role::BaseMember));
    }

    #[test]
    fn register_rejects_blank_name() {
        let service = LearningService::in_memory();
        assert!(matches!(
            service.register("   ", now()),
            Err(CohortError::InvalidInput(_))
        ));
    }

    #[test]
    fn unknown_user_has_no_capabilities() {
        let service = LearningService::in_memory();
        assert_eq!(
            service.capabilities(UserId(404)).expect("caps"),
            CapabilitySet::none()
        );
    }

    #[test]
    fn promotion_requires_administrator() {
        let (service, _admin, creator, learner) = setup();
        let err = service
            .promote(&creator, learner.user, Role::CommunityModerator)
            .expect_err("creator cannot promote");
        assert!(matches!(err, CohortError::PermissionDenied { .. }));
        assert_eq!(
            service.actor(learner.user).expect("actor").role,
            Some(Role::BaseMember)
        );
    }

    #[test]
    fn administrator_cannot_change_own_role() {
        let (service, admin, _, _) = setup();
        assert!(
            service
                .promote(&admin, admin.user, Role::BaseMember)
                .is_err()
        );
    }

    #[test]
    fn learner_cannot_create_course() {
        let (service, _, _, learner) = setup();
        let err = service
            .create_course(&learner, "Mine", now())
            .expect_err("denied");
        assert!(matches!(
            err,
            CohortError::PermissionDenied {
                capability: "create-content"
            }
        ));
        assert_eq!(service.store().stats().expect("stats").courses, 0);
    }

    #[test]
    fn only_owner_or_admin_edits_course() {
        let (service, admin, creator, _) = setup();
        let other = service.register("Other", now()).expect("register");
        service
            .promote(&admin, other.id, Role::ContentCreator)
            .expect("promote");
        let other = service.actor(other.id).expect("actor");

        let course = service
            .create_course(&creator, "Owned", now())
            .expect("course");
        assert!(service.publish_course(&other, course.id).is_err());
        assert!(service.add_lesson(&admin, course.id, "By admin", 1, None).is_ok());
        assert!(service.publish_course(&admin, course.id).is_ok());
    }

    #[test]
    fn duplicate_order_index_rejected() {
        let (service, _, creator, _) = setup();
        let course = service
            .create_course(&creator, "Dup", now())
            .expect("course");
        service
            .add_lesson(&creator, course.id, "One", 1, None)
            .expect("lesson");
        assert!(matches!(
            service.add_lesson(&creator, course.id, "Also one", 1, None),
            Err(CohortError::InvalidInput(_))
        ));
    }

    #[test]
    fn cannot_enroll_in_incubating_course() {
        let (service, _, creator, learner) = setup();
        let course = service
            .create_course(&creator, "Draft", now())
            .expect("course");
        assert!(matches!(
            service.enroll(&learner, course.id, now()),
            Err(CohortError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn enroll_twice_returns_existing() {
        let (service, _, creator, learner) = setup();
        let course = published_course(&service, &creator, 2);
        let first = service.enroll(&learner, course, now()).expect("enroll");
        let lesson = service
            .lesson_ids(course)
            .expect("ids")
            .iter()
            .next()
            .expect("lesson");
        service
            .mark_lesson_complete(&learner, course, lesson, now())
            .expect("mark");

        let later = now() + chrono::Duration::hours(2);
        let second = service.enroll(&learner, course, later).expect("enroll");
        assert_eq!(second.enrollment.started_at, first.enrollment.started_at);
        assert_eq!(second.progress.percentage, 50);
        assert_eq!(second.enrollment.last_accessed_at, later);

        let stored = service
            .store()
            .read_enrollment(learner.user, course)
            .expect("read")
            .expect("row");
        assert_eq!(stored.last_accessed_at, later);
        assert_eq!(service.store().stats().expect("stats").enrollments, 1);
    }

    #[test]
    fn full_traversal_completes() {
        let (service, _, creator, learner) = setup();
        let course = published_course(&service, &creator, 3);
        service.enroll(&learner, course, now()).expect("enroll");

        let lessons: Vec<LessonId> = service.lesson_ids(course).expect("ids").iter().collect();
        let mut last = None;
        for lesson in &lessons {
            last = Some(
                service
                    .mark_lesson_complete(&learner, course, *lesson, now())
                    .expect("mark"),
            );
        }
        let last = last.expect("outcome");
        assert!(last.newly_completed);
        assert_eq!(last.enrollment.status, EnrollmentStatus::Completed);
        assert_eq!(last.progress.percentage, 100);
    }

    #[test]
    fn mark_without_enrollment_is_not_found() {
        let (service, _, creator, learner) = setup();
        let course = published_course(&service, &creator, 1);
        let lesson = service
            .lesson_ids(course)
            .expect("ids")
            .iter()
            .next()
            .expect("lesson");
        assert!(matches!(
            service.mark_lesson_complete(&learner, course, lesson, now()),
            Err(CohortError::NotFound(_))
        ));
    }

    #[test]
    fn reading_others_progress_needs_analytics() {
        let (service, _, creator, learner) = setup();
        let course = published_course(&service, &creator, 2);
        service.enroll(&learner, course, now()).expect("enroll");

        let peer = service.register("Peer", now()).expect("register");
        let peer = service.actor(peer.id).expect("actor");
        assert!(matches!(
            service.progress(&peer, learner.user, course, now()),
            Err(CohortError::PermissionDenied { .. })
        ));
        assert!(service.progress(&creator, learner.user, course, now()).is_ok());
    }

    #[test]
    fn nomination_requires_capability_and_eligible_candidate() {
        let (service, admin, creator, learner) = setup();
        assert!(
            service
                .nominate_moderator(&learner, creator.user, now())
                .is_err()
        );
        let n = service
            .nominate_moderator(&creator, learner.user, now())
            .expect("nominate");
        assert_eq!(n.nominated_by, creator.user);
        assert!(matches!(
            service.nominate_moderator(&creator, admin.user, now()),
            Err(CohortError::InvalidInput(_))
        ));
        // a nomination never changes the role itself
        assert_eq!(
            service.actor(learner.user).expect("actor").role,
            Some(Role::BaseMember)
        );
    }

    #[test]
    fn nominations_are_listed_for_administrators() {
        let (service, admin, creator, learner) = setup();
        let other = service.register("Robin", now()).expect("register");
        service
            .nominate_moderator(&creator, learner.user, now())
            .expect("nominate");
        service
            .nominate_moderator(&creator, other.id, now())
            .expect("nominate");

        assert!(matches!(
            service.nominations(&creator),
            Err(CohortError::PermissionDenied {
                capability: "manage-accounts"
            })
        ));
        let open = service.nominations(&admin).expect("list");
        assert_eq!(open.len(), 2);
        assert!(open.iter().all(|n| n.nominated_by == creator.user));

        // acting on a nomination closes it
        service
            .promote(&admin, learner.user, Role::CommunityModerator)
            .expect("promote");
        let open = service.nominations(&admin).expect("list");
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].candidate, other.id);
    }

    #[test]
    fn remove_enrollment_is_administrative() {
        let (service, admin, creator, learner) = setup();
        let course = published_course(&service, &creator, 1);
        service.enroll(&learner, course, now()).expect("enroll");

        assert!(
            service
                .remove_enrollment(&learner, learner.user, course)
                .is_err()
        );
        assert!(
            service
                .remove_enrollment(&admin, learner.user, course)
                .expect("remove")
        );
    }

    #[test]
    fn summary_counts_enrollments() {
        let (service, _, creator, learner) = setup();
        let course = published_course(&service, &creator, 2);
        service.enroll(&learner, course, now()).expect("enroll");
        let summary = service.course_summary(&creator, course).expect("summary");
        assert_eq!(summary.enrolled, 1);
        assert_eq!(summary.lesson_count, 2);
        assert!(service.course_summary(&learner, course).is_err());
    }
}
