//! # Storage Module
//!
//! Persistent [`crate::store::LearningStore`] implementations.

mod redb_store;

pub use redb_store::RedbStore;
