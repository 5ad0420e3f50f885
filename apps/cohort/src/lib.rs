//! # cohort
//!
//! Library half of the Cohort binary: HTTP API, CLI and configuration.
//! Exposed as a library so integration tests can build the router.

pub mod api;
pub mod cli;
pub mod config;
