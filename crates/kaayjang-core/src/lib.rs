//! # Kaayjang Core
//!
//! Core types, errors, and utilities for the Kaayjang API.
//!
//! This crate provides foundational types used throughout the application:
//!
//! - [`errors`]: Service and HTTP error types with response conversion
//! - [`pagination`]: Page-based pagination parameters and responses
//! - [`response`]: The `{success, data, message}` response envelope
//! - [`serde`]: Custom serde deserialization helpers
//!
//! # Example
//!
//! ```ignore
//! use kaayjang_core::{AppError, ApiResponse, PaginatedResponse, PaginationParams};
//!
//! let params = PaginationParams::default();
//! let page = PaginatedResponse::new(levels, total, &params);
//! let body = ApiResponse::ok(page, "Levels retrieved successfully");
//! ```

pub mod errors;
pub mod pagination;
pub mod response;
pub mod serde;

// Re-export commonly used types at crate root
pub use errors::{AppError, INTERNAL_ERROR_MESSAGE, ServiceError, ServiceResult};
pub use pagination::{PaginatedResponse, PaginationParams, total_pages};
pub use response::ApiResponse;
