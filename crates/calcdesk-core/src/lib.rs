//! calcdesk core library.
//!
//! Typed client for the calculator web service: wire models, client-side
//! validation, the REST API client and its error taxonomy, the persisted
//! bearer-token session and the application configuration.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;
pub mod validation;

pub use api::{ApiClient, ApiError};
pub use auth::{Session, SessionData};
pub use config::Config;
pub use validation::ValidationError;
