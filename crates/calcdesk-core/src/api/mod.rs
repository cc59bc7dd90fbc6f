//! REST API client module for the calculator service.
//!
//! This module provides the `ApiClient` for communicating with the
//! service's auth, user and calculation endpoints.
//!
//! The API uses bearer token authentication; the token comes from
//! the `/api/auth/login` response.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_BASE_URL, DEFAULT_HISTORY_LIMIT};
pub use error::{ApiError, FALLBACK_MESSAGE};
