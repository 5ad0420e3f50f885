//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::config::ServerConfig;
use cohort_core::{
    CohortError, CourseId, LearningService, LearningStore, MemoryStore, RedbStore, Role, UserId,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Resolved global options shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub database: PathBuf,
    pub backend: String,
    pub json_mode: bool,
}

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(ctx: &Context, server: ServerConfig) -> Result<(), CohortError> {
    let service = open_service(ctx)?;

    println!("Cohort Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", server.host);
    println!("  Port:     {}", server.port);
    println!("  Backend:  {}", ctx.backend);
    println!("  Database: {:?}", ctx.database);
    println!();
    println!("Endpoints:");
    println!("  POST /courses/{{id}}/enroll                   - Enroll");
    println!("  POST /courses/{{id}}/lessons/{{lesson}}/complete - Complete a lesson");
    println!("  GET  /courses/{{id}}/progress                 - Own progress");
    println!("  GET  /me/capabilities                        - Capability set");
    println!("  GET  /health                                 - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(service, server).await
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new database, optionally bootstrapping an administrator.
///
/// The administrator is the only profile ever created with a role other
/// than base-member; every later role change goes through `promote`.
pub fn cmd_init(ctx: &Context, force: bool, admin: Option<&str>) -> Result<(), CohortError> {
    if ctx.backend != "redb" {
        return Err(CohortError::InvalidInput(
            "init only applies to the redb backend".to_string(),
        ));
    }
    if ctx.database.exists() {
        if !force {
            return Err(CohortError::InvalidInput(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(&ctx.database)
            .map_err(|e| CohortError::Storage(format!("Remove existing database: {}", e)))?;
    }

    let store = RedbStore::open(&ctx.database)?;
    println!("Initialized new redb database at {:?}", ctx.database);

    if let Some(name) = admin {
        let service = LearningService::new(Arc::new(store));
        let mut profile = service.register(name, chrono::Utc::now())?;
        profile.role = Role::Administrator.name().to_string();
        service.store().write_profile(&profile)?;
        tracing::info!(user = profile.id.0, "administrator bootstrapped");
        println!("Created administrator {} ({})", profile.display_name, profile.id);
    }

    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show store row counts.
pub fn cmd_status(ctx: &Context) -> Result<(), CohortError> {
    let service = open_service(ctx)?;
    let stats = service.store().stats()?;

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "database": ctx.database.to_string_lossy(),
            "backend": ctx.backend,
            "profiles": stats.profiles,
            "courses": stats.courses,
            "lessons": stats.lessons,
            "enrollments": stats.enrollments,
            "nominations": stats.nominations,
        }));
        return Ok(());
    }

    println!("Cohort Status");
    println!("=============");
    println!("Database: {:?}", ctx.database);
    println!("Backend:  {}", ctx.backend);
    println!();
    println!("Profiles:    {}", stats.profiles);
    println!("Courses:     {}", stats.courses);
    println!("Lessons:     {}", stats.lessons);
    println!("Enrollments: {}", stats.enrollments);
    println!("Nominations: {}", stats.nominations);

    Ok(())
}

// =============================================================================
// CAPABILITIES COMMAND
// =============================================================================

pub fn cmd_capabilities(ctx: &Context, user: u64) -> Result<(), CohortError> {
    let service = open_service(ctx)?;
    let actor = service.actor(UserId(user))?;
    let caps = actor.capabilities();

    if ctx.json_mode {
        let response = api::CapabilitiesResponse::new(user, actor.role, caps);
        print_json(&serde_json::to_value(&response).unwrap_or_default());
        return Ok(());
    }

    match actor.role {
        Some(role) => println!("{} is {}", actor.user, role),
        None => println!("{} has no resolvable role; everything is denied", actor.user),
    }
    for capability in cohort_core::Capability::ALL {
        let mark = if caps.allows(capability) { "yes" } else { "no" };
        println!("  {:<22} {}", capability.name(), mark);
    }
    Ok(())
}

// =============================================================================
// PROGRESS COMMAND
// =============================================================================

pub fn cmd_progress(ctx: &Context, actor: u64, course: u64, learner: u64) -> Result<(), CohortError> {
    let service = open_service(ctx)?;
    let actor = service.actor(UserId(actor))?;
    let view = service.progress(&actor, UserId(learner), CourseId(course), chrono::Utc::now())?;
    let response = api::ProgressResponse::from(&view);

    if ctx.json_mode {
        print_json(&serde_json::to_value(&response).unwrap_or_default());
        return Ok(());
    }

    println!("Progress of user#{} in course#{}", response.learner, response.course);
    println!("  Status:     {}", response.status);
    println!("  Percentage: {}%", response.percentage);
    match response.next_lesson {
        Some(next) => println!("  Next:       lesson#{}", next),
        None => println!("  Next:       -"),
    }
    println!("  Completed:  {} lesson(s)", response.completed_lessons.len());
    Ok(())
}

// =============================================================================
// PROMOTE COMMAND
// =============================================================================

pub fn cmd_promote(ctx: &Context, actor: u64, user: u64, role: &str) -> Result<(), CohortError> {
    let role = Role::parse(role)
        .ok_or_else(|| CohortError::InvalidInput(format!("Unknown role '{}'", role)))?;
    let service = open_service(ctx)?;
    let actor = service.actor(UserId(actor))?;
    let profile = service.promote(&actor, UserId(user), role)?;

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "user": profile.id.0,
            "role": profile.role,
        }));
    } else {
        println!("{} is now {}", profile.id, profile.role);
    }
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Open the configured backend.
pub fn open_service(ctx: &Context) -> Result<LearningService, CohortError> {
    let store: Arc<dyn LearningStore> = match ctx.backend.as_str() {
        "redb" => Arc::new(RedbStore::open(&ctx.database)?),
        "memory" => Arc::new(MemoryStore::new()),
        other => {
            return Err(CohortError::InvalidInput(format!(
                "Unknown backend '{}' (expected redb or memory)",
                other
            )));
        }
    };
    Ok(LearningService::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(dir: &tempfile::TempDir) -> Context {
        Context {
            database: dir.path().join("cohort.db"),
            backend: "redb".to_string(),
            json_mode: true,
        }
    }

    #[test]
    fn init_bootstraps_administrator() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = ctx(&dir);
        cmd_init(&ctx, false, Some("Root")).expect("init");

        let service = open_service(&ctx).expect("open");
        let admin = service.actor(UserId(1)).expect("actor");
        assert_eq!(admin.role, Some(Role::Administrator));
    }

    #[test]
    fn init_refuses_existing_database_without_force() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = ctx(&dir);
        cmd_init(&ctx, false, None).expect("init");
        assert!(cmd_init(&ctx, false, None).is_err());
        assert!(cmd_init(&ctx, true, None).is_ok());
    }

    #[test]
    fn promote_command_applies_gates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = ctx(&dir);
        cmd_init(&ctx, false, Some("Root")).expect("init");
        {
            let service = open_service(&ctx).expect("open");
            service.register("Sam", chrono::Utc::now()).expect("register");
        }

        assert!(cmd_promote(&ctx, 2, 1, "base-member").is_err());
        assert!(cmd_promote(&ctx, 1, 2, "wizard").is_err());
        cmd_promote(&ctx, 1, 2, "content-creator").expect("promote");

        let service = open_service(&ctx).expect("open");
        assert_eq!(
            service.actor(UserId(2)).expect("actor").role,
            Some(Role::ContentCreator)
        );
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut ctx = ctx(&dir);
        ctx.backend = "sqlite".to_string();
        assert!(open_service(&ctx).is_err());
    }
}
