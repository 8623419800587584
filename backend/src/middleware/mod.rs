//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such as
//! tracing and authentication.

pub mod auth;
pub mod trace;

pub use auth::BearerAuth;
pub use trace::Trace;
