//! # Cohort HTTP API Module
//!
//! This module implements the HTTP JSON API server using axum.
//!
//! ## Endpoints
//!
//! Every endpoint except `/health`, `/status` and `POST /users` needs the
//! `X-Cohort-User` header.
//!
//! - `GET /health` - Health check
//! - `GET /status` - Store row counts
//! - `POST /users` - Register a profile
//! - `GET /me/capabilities` - Capability set of the acting user
//! - `POST /users/{id}/role` - Change a user's role
//! - `POST /users/{id}/nominate` - Nominate a moderator
//! - `GET /nominations` - Open nominations (administrators)
//! - `POST /courses` - Create a course
//! - `POST /courses/{id}/lessons` - Add a lesson
//! - `POST /courses/{id}/publish`, `POST /courses/{id}/archive`
//! - `GET /courses/{id}/analytics` - Enrollment summary
//! - `POST /courses/{id}/enroll`, `/pause`, `/resume`
//! - `POST /courses/{id}/lessons/{lesson}/complete`
//! - `GET /courses/{id}/progress` - Own progress
//! - `GET /courses/{id}/progress/{learner}` - Another learner's progress
//! - `DELETE /courses/{id}/enrollments/{learner}` - Remove an enrollment
//!
//! ## Error Mapping
//!
//! | CohortError | Status |
//! |-------------|--------|
//! | PermissionDenied | 403 |
//! | InvalidTransition, Conflict | 409 |
//! | NotFound | 404 |
//! | InvalidInput | 400 |
//! | Storage, Serialization | 500 |

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::{USER_HEADER, key_matches, parse_user_header};
pub use middleware::create_rate_limiter;
pub use types::{
    AddLessonRequest, CapabilitiesResponse, CompleteLessonResponse, CreateCourseRequest,
    ErrorResponse, HealthResponse, ProgressResponse, PromoteRequest, RegisterRequest,
    RemoveEnrollmentResponse, StatusResponse,
};

use crate::config::{MAX_BODY_BYTES, ServerConfig};
use axum::{
    Json, Router,
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use cohort_core::{CohortError, LearningService};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state. The service synchronizes its own store access.
#[derive(Clone)]
pub struct AppState {
    pub service: LearningService,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(service: LearningService, config: ServerConfig) -> Self {
        Self {
            service,
            config: Arc::new(config),
        }
    }
}

// =============================================================================
// ERROR RESPONSES
// =============================================================================

/// A core error on its way to the client.
#[derive(Debug)]
pub struct ApiError(pub CohortError);

impl From<CohortError> for ApiError {
    fn from(err: CohortError) -> Self {
        Self(err)
    }
}

/// Status code for a core error.
pub fn status_for(err: &CohortError) -> StatusCode {
    match err {
        CohortError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
        CohortError::InvalidTransition { .. } | CohortError::Conflict { .. } => {
            StatusCode::CONFLICT
        }
        CohortError::NotFound(_) => StatusCode::NOT_FOUND,
        CohortError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CohortError::Storage(_) | CohortError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!(status = status.as_u16(), "Request rejected: {}", self.0);
        }
        (status, Json(ErrorResponse::from_error(&self.0))).into_response()
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from configured origins.
///
/// - `["*"]`: allows all origins (development only)
/// - `None` or no valid entries: localhost only
/// - otherwise the listed origins
fn build_cors_layer(origins: Option<&[String]>) -> CorsLayer {
    match origins {
        Some([only]) if only == "*" => {
            tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
            CorsLayer::permissive()
        }
        Some(list) => {
            let allowed: Vec<HeaderValue> = list
                .iter()
                .filter_map(|s| match s.parse::<HeaderValue>() {
                    Ok(hv) => {
                        tracing::info!("CORS: Allowing origin: {}", s);
                        Some(hv)
                    }
                    Err(e) => {
                        tracing::warn!("CORS: Invalid origin '{}': {}", s, e);
                        None
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                restrict(CorsLayer::new().allow_origin(allowed))
            }
        }
        None => build_localhost_cors(),
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse().ok())
    .collect();
    restrict(CorsLayer::new().allow_origin(origins))
}

fn restrict(layer: CorsLayer) -> CorsLayer {
    layer
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(USER_HEADER),
        ])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
/// 5. Authentication (if an API key is configured)
pub fn create_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);
    let cors = build_cors_layer(config.cors_origins.as_deref());

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/users", post(handlers::register_handler))
        .route("/me/capabilities", get(handlers::capabilities_handler))
        .route("/users/{id}/role", post(handlers::promote_handler))
        .route("/users/{id}/nominate", post(handlers::nominate_handler))
        .route("/nominations", get(handlers::nominations_handler))
        .route("/courses", post(handlers::create_course_handler))
        .route("/courses/{id}/lessons", post(handlers::add_lesson_handler))
        .route("/courses/{id}/publish", post(handlers::publish_handler))
        .route("/courses/{id}/archive", post(handlers::archive_handler))
        .route("/courses/{id}/analytics", get(handlers::analytics_handler))
        .route("/courses/{id}/enroll", post(handlers::enroll_handler))
        .route("/courses/{id}/pause", post(handlers::pause_handler))
        .route("/courses/{id}/resume", post(handlers::resume_handler))
        .route(
            "/courses/{id}/lessons/{lesson}/complete",
            post(handlers::complete_lesson_handler),
        )
        .route("/courses/{id}/progress", get(handlers::own_progress_handler))
        .route(
            "/courses/{id}/progress/{learner}",
            get(handlers::learner_progress_handler),
        )
        .route(
            "/courses/{id}/enrollments/{learner}",
            delete(handlers::remove_enrollment_handler),
        );

    match config.api_key.as_deref() {
        Some(key) => {
            tracing::info!("API key authentication enabled");
            let key: Arc<str> = Arc::from(key);
            router = router.layer(axum_middleware::from_fn_with_state(
                key,
                auth::api_key_auth_middleware,
            ));
        }
        None => tracing::warn!(
            "API key authentication DISABLED - every endpoint is reachable without a key. \
             Set COHORT_API_KEY to enable it."
        ),
    }

    match create_rate_limiter(config.rate_limit) {
        Some(limiter) => {
            tracing::info!("Rate limiting enabled: {} requests/second", config.rate_limit);
            router = router.layer(axum_middleware::from_fn_with_state(
                limiter,
                middleware::rate_limit_middleware,
            ));
        }
        None => tracing::info!("Rate limiting disabled"),
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl+C.
pub async fn run_server(service: LearningService, config: ServerConfig) -> Result<(), CohortError> {
    let addr = format!("{}:{}", config.host, config.port);
    let router = create_router(AppState::new(service, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CohortError::Storage(format!("Bind failed: {}", e)))?;

    tracing::info!("Cohort HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CohortError::Storage(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

// =============================================================================
// TESTS
// =============================================================================
