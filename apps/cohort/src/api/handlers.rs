//! # API Endpoint Handlers
//!
//! Each handler resolves the acting user, reads the clock once, and calls
//! one service operation. Errors map through [`ApiError`].

use super::{
    ApiError, AppState,
    auth::ActingUser,
    types::{
        AddLessonRequest, CapabilitiesResponse, CompleteLessonResponse, CreateCourseRequest,
        HealthResponse, ProgressResponse, PromoteRequest, RegisterRequest,
        RemoveEnrollmentResponse, StatusResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use cohort_core::{Course, CourseId, CourseSummary, Lesson, LessonId, Nomination, Profile, UserId};

type ApiResult<T> = Result<Json<T>, ApiError>;

// =============================================================================
// HEALTH / STATUS
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Store row counts.
pub async fn status_handler(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    Ok(Json(state.service.store().stats()?.into()))
}

// =============================================================================
// ACCOUNTS
// =============================================================================

/// Create a base-member profile.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let profile = state
        .service
        .register(&request.display_name, chrono::Utc::now())?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Capability set of the acting user.
pub async fn capabilities_handler(ActingUser(actor): ActingUser) -> Json<CapabilitiesResponse> {
    Json(CapabilitiesResponse::new(
        actor.user.0,
        actor.role,
        actor.capabilities(),
    ))
}

pub async fn promote_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(target): Path<u64>,
    Json(request): Json<PromoteRequest>,
) -> ApiResult<Profile> {
    let role = request.to_role()?;
    Ok(Json(state.service.promote(&actor, UserId(target), role)?))
}

pub async fn nominate_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(candidate): Path<u64>,
) -> ApiResult<Nomination> {
    Ok(Json(state.service.nominate_moderator(
        &actor,
        UserId(candidate),
        chrono::Utc::now(),
    )?))
}

/// Open moderator nominations.
pub async fn nominations_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
) -> ApiResult<Vec<Nomination>> {
    Ok(Json(state.service.nominations(&actor)?))
}

// =============================================================================
// CATALOG
// =============================================================================

pub async fn create_course_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Json(request): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    let course = state
        .service
        .create_course(&actor, &request.title, chrono::Utc::now())?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn add_lesson_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(course): Path<u64>,
    Json(request): Json<AddLessonRequest>,
) -> Result<(StatusCode, Json<Lesson>), ApiError> {
    let lesson = state.service.add_lesson(
        &actor,
        CourseId(course),
        &request.title,
        request.order_index,
        request.estimated_minutes,
    )?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

pub async fn publish_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(course): Path<u64>,
) -> ApiResult<Course> {
    Ok(Json(state.service.publish_course(&actor, CourseId(course))?))
}

pub async fn archive_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(course): Path<u64>,
) -> ApiResult<Course> {
    Ok(Json(state.service.archive_course(&actor, CourseId(course))?))
}

pub async fn analytics_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(course): Path<u64>,
) -> ApiResult<CourseSummary> {
    Ok(Json(state.service.course_summary(&actor, CourseId(course))?))
}

// =============================================================================
// ENROLLMENT
// =============================================================================

pub async fn enroll_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(course): Path<u64>,
) -> ApiResult<ProgressResponse> {
    let view = state
        .service
        .enroll(&actor, CourseId(course), chrono::Utc::now())?;
    Ok(Json(ProgressResponse::from(&view)))
}

pub async fn complete_lesson_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path((course, lesson)): Path<(u64, u64)>,
) -> ApiResult<CompleteLessonResponse> {
    let outcome = state.service.mark_lesson_complete(
        &actor,
        CourseId(course),
        LessonId(lesson),
        chrono::Utc::now(),
    )?;
    Ok(Json(outcome.into()))
}

pub async fn pause_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(course): Path<u64>,
) -> ApiResult<ProgressResponse> {
    let view = state
        .service
        .pause(&actor, CourseId(course), chrono::Utc::now())?;
    Ok(Json(ProgressResponse::from(&view)))
}

pub async fn resume_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(course): Path<u64>,
) -> ApiResult<ProgressResponse> {
    let view = state
        .service
        .resume(&actor, CourseId(course), chrono::Utc::now())?;
    Ok(Json(ProgressResponse::from(&view)))
}

/// The acting user's own progress.
pub async fn own_progress_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(course): Path<u64>,
) -> ApiResult<ProgressResponse> {
    let view = state
        .service
        .progress(&actor, actor.user, CourseId(course), chrono::Utc::now())?;
    Ok(Json(ProgressResponse::from(&view)))
}

/// Another learner's progress; requires view-analytics.
pub async fn learner_progress_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path((course, learner)): Path<(u64, u64)>,
) -> ApiResult<ProgressResponse> {
    let view = state.service.progress(
        &actor,
        UserId(learner),
        CourseId(course),
        chrono::Utc::now(),
    )?;
    Ok(Json(ProgressResponse::from(&view)))
}

pub async fn remove_enrollment_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path((course, learner)): Path<(u64, u64)>,
) -> ApiResult<RemoveEnrollmentResponse> {
    let removed = state
        .service
        .remove_enrollment(&actor, UserId(learner), CourseId(course))?;
    Ok(Json(RemoveEnrollmentResponse { removed }))
}
