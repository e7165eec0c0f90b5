//! # API Shared
//!
//! Shared definitions for the Knowledge Navigator APIs.
//!
//! Contains:
//! - Wire types (`dto` module) with OpenAPI schemas and their translation from domain values
//! - Shared services like `HealthService`
//! - Role header authorisation
//!
//! Used by `api-rest` and the workspace runner.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::{authorize, AuthError, ROLE_HEADER};
pub use dto::*;
pub use health::HealthService;
