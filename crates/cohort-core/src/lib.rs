//! # cohort-core
//!
//! The deterministic learning core for Cohort - THE LOGIC.
//!
//! This crate decides who may do what on a learning platform, how far a
//! learner has progressed through a course, and which enrollment status
//! changes are legal.
//!
//! ## Components
//!
//! - `capability`: role → capability set, a pure function of the role
//! - `progress`: completed lessons + course lessons → percentage, next lesson
//! - `enrollment`: exploring / paused / completed lifecycle
//! - `service`: the operation surface; gates, reads, applies, writes
//! - `store` / `storage`: the data store seam and its memory and redb impls
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Never reads the clock: `now` is always an argument
//! - No floats: percentages are integer-rounded
//! - Unknown roles are denied everything

// =============================================================================
// MODULES
// =============================================================================

pub mod analytics;
pub mod capability;
pub mod course;
pub mod enrollment;
pub mod primitives;
pub mod progress;
pub mod role;
pub mod service;
pub mod storage;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{CohortError, CourseId, LessonId, Timestamp, UserId};

// =============================================================================
// RE-EXPORTS: Engines
// =============================================================================

pub use capability::{Capability, CapabilitySet, capabilities_for, require};
pub use course::{Course, CourseStatus, Lesson, LessonSequence};
pub use enrollment::{Enrollment, EnrollmentStatus, IntegrityWarning, MarkOutcome};
pub use progress::{Progress, percentage, recompute};
pub use role::Role;

// =============================================================================
// RE-EXPORTS: Service and Stores
// =============================================================================

pub use analytics::{CourseSummary, summarize};
pub use service::{Actor, EnrollmentView, LearningService};
pub use storage::RedbStore;
pub use store::{IdentityProvider, LearningStore, MemoryStore, Nomination, Profile, StoreStats};
