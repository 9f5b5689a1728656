//! Common library for the Quill blogging platform
//!
//! This crate provides shared infrastructure used by the API service:
//! PostgreSQL connection pooling, health checks, and the database error
//! types built on top of them.

pub mod database;
pub mod error;
