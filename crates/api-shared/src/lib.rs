//! # API Shared
//!
//! Shared definitions for the screening APIs.
//!
//! Contains:
//! - Request/response bodies with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
