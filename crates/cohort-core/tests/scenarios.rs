//! # End-to-End Scenarios
//!
//! Walk-throughs over the service with both store implementations.

use chrono::{Duration, TimeZone};
use cohort_core::{
    Actor, Capability, CohortError, CourseId, Enrollment, EnrollmentStatus, LearningService,
    LearningStore, LessonId, MemoryStore, RedbStore, Role, Timestamp, capabilities_for,
};
use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};

fn t(minutes: i64) -> Timestamp {
    chrono::Utc
        .with_ymd_and_hms(2026, 9, 1, 10, 0, 0)
        .single()
        .expect("valid timestamp")
        + Duration::minutes(minutes)
}

/// A published course with lessons A, B, C at order 1, 2, 3 and an
/// enrolled base member.
struct Fixture {
    service: LearningService,
    learner: Actor,
    course: CourseId,
    a: LessonId,
    b: LessonId,
    c: LessonId,
}

fn fixture(store: Arc<dyn LearningStore>) -> Fixture {
    let service = LearningService::new(store);
    let creator = service
        .store()
        .create_profile("Creator", Role::ContentCreator, t(0))
        .expect("creator");
    let creator = service.actor(creator.id).expect("actor");
    let learner = service.register("Learner", t(0)).expect("learner");
    let learner = service.actor(learner.id).expect("actor");

    let course = service
        .create_course(&creator, "Foundations", t(0))
        .expect("course");
    // inserted out of order on purpose
    let c = service
        .add_lesson(&creator, course.id, "C", 3, Some(20))
        .expect("lesson");
    let a = service
        .add_lesson(&creator, course.id, "A", 1, Some(10))
        .expect("lesson");
    let b = service
        .add_lesson(&creator, course.id, "B", 2, None)
        .expect("lesson");
    service
        .publish_course(&creator, course.id)
        .expect("publish");
    service.enroll(&learner, course.id, t(1)).expect("enroll");

    Fixture {
        service,
        learner,
        course: course.id,
        a: a.id,
        b: b.id,
        c: c.id,
    }
}

#[test]
fn three_lesson_walkthrough() {
    let f = fixture(Arc::new(MemoryStore::new()));

    let after_b = f
        .service
        .mark_lesson_complete(&f.learner, f.course, f.b, t(2))
        .expect("mark B");
    assert_eq!(after_b.progress.percentage, 33);
    assert_eq!(after_b.progress.next_lesson, Some(f.a));
    assert_eq!(after_b.enrollment.status, EnrollmentStatus::Exploring);
    assert!(after_b.enrollment.completed_at.is_none());

    f.service
        .mark_lesson_complete(&f.learner, f.course, f.a, t(3))
        .expect("mark A");
    let after_c = f
        .service
        .mark_lesson_complete(&f.learner, f.course, f.c, t(4))
        .expect("mark C");

    let done: BTreeSet<LessonId> = [f.a, f.b, f.c].into_iter().collect();
    assert_eq!(after_c.enrollment.completed_lessons, done);
    assert_eq!(after_c.progress.percentage, 100);
    assert_eq!(after_c.progress.next_lesson, None);
    assert_eq!(after_c.enrollment.status, EnrollmentStatus::Completed);
    assert_eq!(after_c.enrollment.completed_at, Some(t(4)));
}

#[test]
fn base_member_and_administrator_capabilities() {
    let base = capabilities_for(Some(Role::BaseMember));
    assert_eq!(base.granted(), vec![Capability::Enroll]);

    let admin = capabilities_for(Some(Role::Administrator));
    assert_eq!(admin.granted(), Capability::ALL.to_vec());
}

#[test]
fn paused_learner_resumes_and_finishes() {
    let f = fixture(Arc::new(MemoryStore::new()));
    f.service
        .mark_lesson_complete(&f.learner, f.course, f.a, t(2))
        .expect("mark");
    let paused = f.service.pause(&f.learner, f.course, t(3)).expect("pause");
    assert_eq!(paused.enrollment.status, EnrollmentStatus::Paused);
    assert!(
        f.service
            .mark_lesson_complete(&f.learner, f.course, f.b, t(4))
            .is_err()
    );

    f.service
        .resume(&f.learner, f.course, t(5))
        .expect("resume");
    for lesson in [f.b, f.c] {
        f.service
            .mark_lesson_complete(&f.learner, f.course, lesson, t(6))
            .expect("mark");
    }
    let view = f
        .service
        .progress(&f.learner, f.learner.user, f.course, t(7))
        .expect("progress");
    assert_eq!(view.enrollment.status, EnrollmentStatus::Completed);
    assert_eq!(view.enrollment.last_accessed_at, t(7));
}

#[test]
fn stale_write_conflicts_then_merge_keeps_both() {
    let f = fixture(Arc::new(MemoryStore::new()));
    let store = f.service.store();
    let lessons = store.read_lesson_ids(f.course).expect("lessons");

    // Both writers read the same empty record.
    let initial: Enrollment = store
        .read_enrollment(f.learner.user, f.course)
        .expect("read")
        .expect("row");
    let with_a = initial
        .mark_lesson_complete(&lessons, f.a, t(2))
        .expect("mark A");
    let with_b = initial
        .mark_lesson_complete(&lessons, f.b, t(2))
        .expect("mark B");

    store.write_enrollment(&with_a.enrollment).expect("A wins");
    let err = store
        .write_enrollment(&with_b.enrollment)
        .expect_err("B is stale");
    assert!(err.is_conflict());

    // The service path re-reads and unions, so B lands on top of A.
    let merged = f
        .service
        .mark_lesson_complete(&f.learner, f.course, f.b, t(3))
        .expect("retry B");
    let expected: BTreeSet<LessonId> = [f.a, f.b].into_iter().collect();
    assert_eq!(merged.enrollment.completed_lessons, expected);
    assert_eq!(merged.progress.percentage, 67);
}

fn concurrent_marks_converge(store: Arc<dyn LearningStore>) {
    let f = fixture(store);
    let lessons = [f.a, f.b, f.c];

    std::thread::scope(|s| {
        for lesson in lessons {
            let service = f.service.clone();
            let learner = f.learner;
            let course = f.course;
            s.spawn(move || {
                service
                    .mark_lesson_complete(&learner, course, lesson, t(2))
                    .expect("mark");
            });
        }
    });

    let view = f
        .service
        .progress(&f.learner, f.learner.user, f.course, t(3))
        .expect("progress");
    let all: BTreeSet<LessonId> = lessons.into_iter().collect();
    assert_eq!(view.enrollment.completed_lessons, all);
    assert_eq!(view.enrollment.status, EnrollmentStatus::Completed);
    assert!(view.enrollment.is_consistent());
}

#[test]
fn concurrent_marks_converge_in_memory() {
    concurrent_marks_converge(Arc::new(MemoryStore::new()));
}

#[test]
fn concurrent_marks_converge_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = RedbStore::open(dir.path().join("cohort.redb")).expect("open");
    concurrent_marks_converge(Arc::new(store));
}

fn racing_lesson_inserts_keep_order_unique(store: Arc<dyn LearningStore>) {
    const WRITERS: usize = 4;
    let service = LearningService::new(store);
    let creator = service
        .store()
        .create_profile("Creator", Role::ContentCreator, t(0))
        .expect("creator");
    let creator = service.actor(creator.id).expect("actor");
    let course = service
        .create_course(&creator, "Contended", t(0))
        .expect("course")
        .id;

    let start = Barrier::new(WRITERS);
    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..WRITERS)
            .map(|i| {
                let service = service.clone();
                let start = &start;
                s.spawn(move || {
                    start.wait();
                    service.add_lesson(&creator, course, &format!("First {}", i), 1, None)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("writer thread"))
            .collect()
    });

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, CohortError::InvalidInput(_)))
    );

    // The course stays usable for learners.
    service.publish_course(&creator, course).expect("publish");
    assert_eq!(service.lesson_ids(course).expect("ids").len(), 1);
    let learner = service.register("Learner", t(1)).expect("learner");
    let learner = service.actor(learner.id).expect("actor");
    let view = service.enroll(&learner, course, t(1)).expect("enroll");
    assert_eq!(view.progress.percentage, 0);
}

#[test]
fn racing_lesson_inserts_in_memory() {
    racing_lesson_inserts_keep_order_unique(Arc::new(MemoryStore::new()));
}

#[test]
fn racing_lesson_inserts_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = RedbStore::open(dir.path().join("cohort.redb")).expect("open");
    racing_lesson_inserts_keep_order_unique(Arc::new(store));
}

#[test]
fn lessons_added_after_completion_lower_percentage_only() {
    let store: Arc<dyn LearningStore> = Arc::new(MemoryStore::new());
    let f = fixture(Arc::clone(&store));
    for lesson in [f.a, f.b, f.c] {
        f.service
            .mark_lesson_complete(&f.learner, f.course, lesson, t(2))
            .expect("mark");
    }

    let course = store.read_course(f.course).expect("read").expect("course");
    let owner = f.service.actor(course.owner).expect("actor");
    let d = f
        .service
        .add_lesson(&owner, f.course, "D", 4, None)
        .expect("lesson");

    let view = f
        .service
        .progress(&f.learner, f.learner.user, f.course, t(3))
        .expect("progress");
    assert_eq!(view.progress.percentage, 75);
    assert_eq!(view.progress.next_lesson, Some(d.id));
    assert_eq!(view.enrollment.status, EnrollmentStatus::Completed);
    assert_eq!(view.enrollment.completed_at, Some(t(2)));
}

#[test]
fn archived_course_rejects_progress_but_keeps_reads() {
    let store: Arc<dyn LearningStore> = Arc::new(MemoryStore::new());
    let f = fixture(Arc::clone(&store));
    f.service
        .mark_lesson_complete(&f.learner, f.course, f.a, t(2))
        .expect("mark");

    let admin = store
        .create_profile("Admin", Role::Administrator, t(0))
        .expect("admin");
    let admin = f.service.actor(admin.id).expect("actor");
    f.service
        .archive_course(&admin, f.course)
        .expect("archive");

    assert!(
        f.service
            .mark_lesson_complete(&f.learner, f.course, f.b, t(3))
            .is_err()
    );
    let view = f
        .service
        .progress(&f.learner, f.learner.user, f.course, t(4))
        .expect("progress");
    assert_eq!(view.progress.percentage, 33);
}
