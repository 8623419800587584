//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: process-local repositories for runs without a database
//! - **cache**: Redis-backed and in-memory response caches
//! - **storage**: attachment files on the local filesystem
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cache;
pub mod memory;
pub mod persistence;
pub mod storage;
