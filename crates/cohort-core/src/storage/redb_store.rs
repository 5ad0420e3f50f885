//! # redb-backed Learning Store
//!
//! A disk-backed [`LearningStore`] using the redb embedded database.
//!
//! - ACID transactions with crash safety (copy-on-write B-trees)
//! - MVCC: concurrent readers, a single serialized writer
//! - Row values are postcard-encoded model structs
//!
//! The single-writer guarantee is what makes the enrollment revision check
//! and the lesson order-index check atomic: the stored rows are read and
//! replaced inside one write transaction.

use crate::course::{Course, Lesson};
use crate::enrollment::Enrollment;
use crate::role::Role;
use crate::store::{
    LearningStore, Nomination, Profile, StoreStats, check_lesson_slot, check_revision,
};
use crate::types::{CohortError, CourseId, LessonId, Timestamp, UserId};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Table for profiles: UserId(u64) -> serialized Profile
const PROFILES: TableDefinition<u64, &[u8]> = TableDefinition::new("profiles");

/// Table for courses: CourseId(u64) -> serialized Course
const COURSES: TableDefinition<u64, &[u8]> = TableDefinition::new("courses");

/// Table for lessons: (course_id, lesson_id) -> serialized Lesson
/// Keyed by course first so one course's lessons are a contiguous range.
const LESSONS: TableDefinition<(u64, u64), &[u8]> = TableDefinition::new("lessons");

/// Table for enrollments: (learner_id, course_id) -> serialized Enrollment
const ENROLLMENTS: TableDefinition<(u64, u64), &[u8]> = TableDefinition::new("enrollments");

/// Table for moderator nominations: candidate UserId(u64) -> serialized Nomination
const NOMINATIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("nominations");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_USER: &str = "next_user_id";
const NEXT_COURSE: &str = "next_course_id";
const NEXT_LESSON: &str = "next_lesson_id";

fn io<E: std::fmt::Display>(e: E) -> CohortError {
    CohortError::Storage(e.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CohortError> {
    postcard::to_allocvec(value).map_err(|e| CohortError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CohortError> {
    postcard::from_bytes(bytes).map_err(|e| CohortError::Serialization(e.to_string()))
}

/// A disk-backed learning store.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CohortError> {
        let db = Database::create(path.as_ref()).map_err(io)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(io)?;
            let _ = write_txn.open_table(PROFILES).map_err(io)?;
            let _ = write_txn.open_table(COURSES).map_err(io)?;
            let _ = write_txn.open_table(LESSONS).map_err(io)?;
            let _ = write_txn.open_table(ENROLLMENTS).map_err(io)?;
            let _ = write_txn.open_table(NOMINATIONS).map_err(io)?;
            let _ = write_txn.open_table(METADATA).map_err(io)?;
            write_txn.commit().map_err(io)?;
        }

        Ok(Self { db })
    }

    /// Read one postcard row from a u64-keyed table.
    fn get_row<T: DeserializeOwned>(
        &self,
        def: TableDefinition<u64, &[u8]>,
        key: u64,
    ) -> Result<Option<T>, CohortError> {
        let read_txn = self.db.begin_read().map_err(io)?;
        let table = read_txn.open_table(def).map_err(io)?;
        match table.get(key).map_err(io)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    /// Upsert one postcard row into a u64-keyed table.
    fn put_row<T: Serialize>(
        &self,
        def: TableDefinition<u64, &[u8]>,
        key: u64,
        value: &T,
    ) -> Result<(), CohortError> {
        let bytes = encode(value)?;
        let write_txn = self.db.begin_write().map_err(io)?;
        {
            let mut table = write_txn.open_table(def).map_err(io)?;
            table.insert(key, bytes.as_slice()).map_err(io)?;
        }
        write_txn.commit().map_err(io)?;
        Ok(())
    }

    /// Allocate the next id for `counter` and insert the row it names, in
    /// one transaction.
    fn insert_with_next_id<T: Serialize>(
        &self,
        counter: &str,
        build: impl FnOnce(u64) -> T,
        place: impl FnOnce(&redb::WriteTransaction, &T, &[u8]) -> Result<(), CohortError>,
    ) -> Result<T, CohortError> {
        let write_txn = self.db.begin_write().map_err(io)?;
        let row = {
            let mut meta = write_txn.open_table(METADATA).map_err(io)?;
            let next = meta
                .get(counter)
                .map_err(io)?
                .map(|v| v.value())
                .unwrap_or(0)
                .saturating_add(1);
            meta.insert(counter, next).map_err(io)?;
            build(next)
        };
        let bytes = encode(&row)?;
        place(&write_txn, &row, &bytes)?;
        write_txn.commit().map_err(io)?;
        Ok(row)
    }
}

// =============================================================================
// LEARNINGSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl LearningStore for RedbStore {
    fn create_profile(
        &self,
        display_name: &str,
        role: Role,
        now: Timestamp,
    ) -> Result<Profile, CohortError> {
        self.insert_with_next_id(
            NEXT_USER,
            |id| Profile {
                id: UserId(id),
                display_name: display_name.to_string(),
                role: role.name().to_string(),
                created_at: now,
            },
            |txn, row, bytes| {
                let mut table = txn.open_table(PROFILES).map_err(io)?;
                table.insert(row.id.0, bytes).map_err(io)?;
                Ok(())
            },
        )
    }

    fn read_profile(&self, user: UserId) -> Result<Option<Profile>, CohortError> {
        self.get_row(PROFILES, user.0)
    }

    fn write_profile(&self, profile: &Profile) -> Result<(), CohortError> {
        self.put_row(PROFILES, profile.id.0, profile)
    }

    fn create_course(
        &self,
        title: &str,
        owner: UserId,
        now: Timestamp,
    ) -> Result<Course, CohortError> {
        self.insert_with_next_id(
            NEXT_COURSE,
            |id| Course::new(CourseId(id), title, owner, now),
            |txn, row, bytes| {
                let mut table = txn.open_table(COURSES).map_err(io)?;
                table.insert(row.id.0, bytes).map_err(io)?;
                Ok(())
            },
        )
    }

    fn read_course(&self, course: CourseId) -> Result<Option<Course>, CohortError> {
        self.get_row(COURSES, course.0)
    }

    fn write_course(&self, course: &Course) -> Result<(), CohortError> {
        self.put_row(COURSES, course.id.0, course)
    }

    fn create_lesson(
        &self,
        course: CourseId,
        title: &str,
        order_index: i64,
        estimated_minutes: Option<u32>,
    ) -> Result<Lesson, CohortError> {
        self.insert_with_next_id(
            NEXT_LESSON,
            |id| Lesson {
                id: LessonId(id),
                course,
                title: title.to_string(),
                order_index,
                estimated_minutes,
            },
            |txn, row, bytes| {
                let mut table = txn.open_table(LESSONS).map_err(io)?;
                let siblings = {
                    let mut rows: Vec<Lesson> = Vec::new();
                    for entry in table
                        .range((course.0, 0)..=(course.0, u64::MAX))
                        .map_err(io)?
                    {
                        let (_, value) = entry.map_err(io)?;
                        rows.push(decode(value.value())?);
                    }
                    rows
                };
                // An error here drops the transaction, counter bump included.
                check_lesson_slot(course, order_index, &siblings)?;
                table.insert((row.course.0, row.id.0), bytes).map_err(io)?;
                Ok(())
            },
        )
    }

    fn read_lessons(&self, course: CourseId) -> Result<Vec<Lesson>, CohortError> {
        let read_txn = self.db.begin_read().map_err(io)?;
        let table = read_txn.open_table(LESSONS).map_err(io)?;

        let mut lessons = Vec::new();
        for entry in table
            .range((course.0, 0)..=(course.0, u64::MAX))
            .map_err(io)?
        {
            let (_, value) = entry.map_err(io)?;
            lessons.push(decode(value.value())?);
        }
        Ok(lessons)
    }

    fn read_enrollment(
        &self,
        learner: UserId,
        course: CourseId,
    ) -> Result<Option<Enrollment>, CohortError> {
        let read_txn = self.db.begin_read().map_err(io)?;
        let table = read_txn.open_table(ENROLLMENTS).map_err(io)?;
        match table.get((learner.0, course.0)).map_err(io)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn write_enrollment(&self, enrollment: &Enrollment) -> Result<Enrollment, CohortError> {
        let key = (enrollment.learner.0, enrollment.course.0);
        let mut written = enrollment.clone();
        written.revision = written.revision.saturating_add(1);
        let bytes = encode(&written)?;

        let write_txn = self.db.begin_write().map_err(io)?;
        {
            let mut table = write_txn.open_table(ENROLLMENTS).map_err(io)?;
            let stored: Option<Enrollment> = match table.get(key).map_err(io)? {
                Some(data) => Some(decode(data.value())?),
                None => None,
            };
            // Dropping the transaction uncommitted discards everything.
            check_revision(stored.as_ref(), enrollment)?;
            table.insert(key, bytes.as_slice()).map_err(io)?;
        }
        write_txn.commit().map_err(io)?;
        Ok(written)
    }

    fn delete_enrollment(&self, learner: UserId, course: CourseId) -> Result<bool, CohortError> {
        let write_txn = self.db.begin_write().map_err(io)?;
        let removed = {
            let mut table = write_txn.open_table(ENROLLMENTS).map_err(io)?;
            table.remove((learner.0, course.0)).map_err(io)?.is_some()
        };
        write_txn.commit().map_err(io)?;
        Ok(removed)
    }

    fn course_enrollments(&self, course: CourseId) -> Result<Vec<Enrollment>, CohortError> {
        let read_txn = self.db.begin_read().map_err(io)?;
        let table = read_txn.open_table(ENROLLMENTS).map_err(io)?;

        let mut rows = Vec::new();
        for entry in table.iter().map_err(io)? {
            let (key, value) = entry.map_err(io)?;
            let (_, course_id) = key.value();
            if course_id == course.0 {
                rows.push(decode(value.value())?);
            }
        }
        Ok(rows)
    }

    fn write_nomination(&self, nomination: &Nomination) -> Result<(), CohortError> {
        self.put_row(NOMINATIONS, nomination.candidate.0, nomination)
    }

    fn nominations(&self) -> Result<Vec<Nomination>, CohortError> {
        let read_txn = self.db.begin_read().map_err(io)?;
        let table = read_txn.open_table(NOMINATIONS).map_err(io)?;

        let mut rows = Vec::new();
        for entry in table.iter().map_err(io)? {
            let (_, value) = entry.map_err(io)?;
            rows.push(decode(value.value())?);
        }
        Ok(rows)
    }

    fn stats(&self) -> Result<StoreStats, CohortError> {
        let read_txn = self.db.begin_read().map_err(io)?;
        let count = |len: u64| len as usize;
        Ok(StoreStats {
            profiles: count(read_txn.open_table(PROFILES).map_err(io)?.len().map_err(io)?),
            courses: count(read_txn.open_table(COURSES).map_err(io)?.len().map_err(io)?),
            lessons: count(read_txn.open_table(LESSONS).map_err(io)?.len().map_err(io)?),
            enrollments: count(
                read_txn
                    .open_table(ENROLLMENTS)
                    .map_err(io)?
                    .len()
                    .map_err(io)?,
            ),
            nominations: count(
                read_txn
                    .open_table(NOMINATIONS)
                    .map_err(io)?
                    .len()
                    .map_err(io)?,
            ),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::IdentityProvider;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn now() -> Timestamp {
        chrono::Utc
            .with_ymd_and_hms(2026, 4, 1, 10, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn profile_round_trip() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let p = store
            .create_profile("Ada", Role::ContentCreator, now())
            .expect("create");
        let read = store.read_profile(p.id).expect("read").expect("row");
        assert_eq!(read, p);
        assert_eq!(read.created_at, now());
        assert_eq!(
            store.current_role(p.id).expect("role"),
            Some(Role::ContentCreator)
        );
    }

    #[test]
    fn recovery_rows_and_counters_survive_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");

        let course_id = {
            let store = RedbStore::open(&db_path).expect("open db");
            let owner = store
                .create_profile("Ada", Role::ContentCreator, now())
                .expect("create");
            let course = store.create_course("Rust", owner.id, now()).expect("course");
            store
                .create_lesson(course.id, "Ownership", 1, Some(20))
                .expect("lesson");
            course.id
        };

        {
            let store = RedbStore::open(&db_path).expect("reopen db");
            let stats = store.stats().expect("stats");
            assert_eq!(stats.profiles, 1);
            assert_eq!(stats.courses, 1);
            assert_eq!(stats.lessons, 1);

            // Counters continue rather than restart
            let second = store
                .create_profile("Grace", Role::BaseMember, now())
                .expect("create");
            assert_eq!(second.id, UserId(2));
            assert_eq!(store.read_lesson_ids(course_id).expect("ids").len(), 1);
        }
    }

    #[test]
    fn lessons_are_scoped_to_course() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let a = store.create_course("A", UserId(1), now()).expect("course");
        let b = store.create_course("B", UserId(1), now()).expect("course");
        store.create_lesson(a.id, "a1", 1, None).expect("lesson");
        store.create_lesson(b.id, "b1", 1, None).expect("lesson");
        store.create_lesson(a.id, "a2", 2, None).expect("lesson");

        let lessons = store.read_lessons(a.id).expect("lessons");
        assert_eq!(lessons.len(), 2);
        assert!(lessons.iter().all(|l| l.course == a.id));
    }

    #[test]
    fn enrollment_revision_check() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let fresh = Enrollment::start(UserId(1), CourseId(1), now());
        let first = store.write_enrollment(&fresh).expect("write");
        assert_eq!(first.revision, 1);

        let err = store.write_enrollment(&fresh).expect_err("stale");
        assert!(matches!(
            err,
            CohortError::Conflict {
                expected: 0,
                found: 1,
                ..
            }
        ));

        let mut next = first.clone();
        next.completed_lessons.insert(LessonId(3));
        let second = store.write_enrollment(&next).expect("write");
        assert_eq!(second.revision, 2);

        let stored = store
            .read_enrollment(UserId(1), CourseId(1))
            .expect("read")
            .expect("row");
        assert_eq!(stored, second);
    }

    #[test]
    fn course_enrollments_filters_by_course() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        for learner in 1..=3 {
            store
                .write_enrollment(&Enrollment::start(UserId(learner), CourseId(7), now()))
                .expect("write");
        }
        store
            .write_enrollment(&Enrollment::start(UserId(1), CourseId(8), now()))
            .expect("write");

        assert_eq!(store.course_enrollments(CourseId(7)).expect("rows").len(), 3);
        assert!(store.delete_enrollment(UserId(2), CourseId(7)).expect("delete"));
        assert_eq!(store.course_enrollments(CourseId(7)).expect("rows").len(), 2);
    }

    #[test]
    fn nominations_upsert_by_candidate() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let n = Nomination {
            candidate: UserId(5),
            nominated_by: UserId(1),
            created_at: now(),
        };
        store.write_nomination(&n).expect("write");
        store
            .write_nomination(&Nomination {
                nominated_by: UserId(2),
                ..n.clone()
            })
            .expect("write");

        let rows = store.nominations().expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].nominated_by, UserId(2));
    }

    #[test]
    fn duplicate_order_index_rolls_back() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let course = store.create_course("Rust", UserId(1), now()).expect("course");
        let first = store
            .create_lesson(course.id, "Ownership", 1, None)
            .expect("lesson");
        let err = store
            .create_lesson(course.id, "Borrowing", 1, None)
            .expect_err("duplicate");
        assert!(matches!(err, CohortError::InvalidInput(_)));

        // the rejected insert did not consume an id
        let next = store
            .create_lesson(course.id, "Borrowing", 2, None)
            .expect("lesson");
        assert_eq!(next.id.0, first.id.0 + 1);
        assert_eq!(store.read_lesson_ids(course.id).expect("ids").len(), 2);
    }
}
