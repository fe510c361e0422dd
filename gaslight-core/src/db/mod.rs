//! Queue storage for gaslight
//!
//! This module provides the durable request queue using SQLite with:
//! - Schema migrations
//! - Append, ordered enumeration and delete-by-id operations

pub mod repo;
pub mod schema;

pub use repo::Database;
