//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use cohort_core::{
    CapabilitySet, CohortError, EnrollmentView, MarkOutcome, Role, StoreStats, Timestamp,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH / STATUS
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Row counts of the data store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub profiles: usize,
    pub courses: usize,
    pub lessons: usize,
    pub enrollments: usize,
    pub nominations: usize,
}

impl From<StoreStats> for StatusResponse {
    fn from(stats: StoreStats) -> Self {
        Self {
            profiles: stats.profiles,
            courses: stats.courses,
            lessons: stats.lessons,
            enrollments: stats.enrollments,
            nominations: stats.nominations,
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every non-2xx response produced by a handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    /// Stable machine-readable kind, e.g. `permission_denied`.
    pub kind: String,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            success: false,
            kind: kind.into(),
            error: msg.into(),
        }
    }

    pub fn from_error(err: &CohortError) -> Self {
        let kind = match err {
            CohortError::PermissionDenied { .. } => "permission_denied",
            CohortError::InvalidTransition { .. } => "invalid_transition",
            CohortError::Conflict { .. } => "conflict",
            CohortError::NotFound(_) => "not_found",
            CohortError::InvalidInput(_) => "invalid_input",
            CohortError::Storage(_) | CohortError::Serialization(_) => "internal",
        };
        let msg = match err {
            // Do not leak storage internals to clients.
            CohortError::Storage(_) | CohortError::Serialization(_) => {
                "Internal error".to_string()
            }
            other => other.to_string(),
        };
        Self::new(kind, msg)
    }
}

// =============================================================================
// ACCOUNTS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub display_name: String,
}

/// Role change request. `role` is the kebab-case role name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoteRequest {
    pub role: String,
}

impl PromoteRequest {
    pub fn to_role(&self) -> Result<Role, CohortError> {
        Role::parse(&self.role)
            .ok_or_else(|| CohortError::InvalidInput(format!("Unknown role '{}'", self.role)))
    }
}

/// Capability set of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilitiesResponse {
    pub user: u64,
    pub role: Option<String>,
    pub capabilities: CapabilitySet,
    pub granted: Vec<String>,
}

impl CapabilitiesResponse {
    pub fn new(user: u64, role: Option<Role>, capabilities: CapabilitySet) -> Self {
        Self {
            user,
            role: role.map(|r| r.name().to_string()),
            granted: capabilities
                .granted()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            capabilities,
        }
    }
}

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLessonRequest {
    pub title: String,
    pub order_index: i64,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
}

// =============================================================================
// PROGRESS
// =============================================================================

/// An enrollment with its live progress, flattened for clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub learner: u64,
    pub course: u64,
    pub status: String,
    pub percentage: u8,
    pub is_complete: bool,
    pub next_lesson: Option<u64>,
    pub completed_lessons: Vec<u64>,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub last_accessed_at: Timestamp,
}

impl From<&EnrollmentView> for ProgressResponse {
    fn from(view: &EnrollmentView) -> Self {
        let e = &view.enrollment;
        Self {
            learner: e.learner.0,
            course: e.course.0,
            status: e.status.name().to_string(),
            percentage: view.progress.percentage,
            is_complete: view.progress.is_complete,
            next_lesson: view.progress.next_lesson.map(|l| l.0),
            completed_lessons: e.completed_lessons.iter().map(|l| l.0).collect(),
            started_at: e.started_at,
            completed_at: e.completed_at,
            last_accessed_at: e.last_accessed_at,
        }
    }
}

/// Result of completing a lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteLessonResponse {
    #[serde(flatten)]
    pub progress: ProgressResponse,
    pub newly_completed: bool,
    /// Data-integrity notes; the action still succeeded.
    pub warnings: Vec<String>,
}

impl From<MarkOutcome> for CompleteLessonResponse {
    fn from(outcome: MarkOutcome) -> Self {
        let warnings = outcome.warnings.iter().map(|w| w.to_string()).collect();
        let view = EnrollmentView {
            enrollment: outcome.enrollment,
            progress: outcome.progress,
        };
        Self {
            progress: ProgressResponse::from(&view),
            newly_completed: outcome.newly_completed,
            warnings,
        }
    }
}

/// Result of an enrollment removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveEnrollmentResponse {
    pub removed: bool,
}
