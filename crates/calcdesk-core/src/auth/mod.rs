//! Authentication module for managing the bearer-token session.
//!
//! The token is either absent (logged out) or present (logged in). It is
//! persisted to `session.json` so a restart restores the logged-in view,
//! and removed on logout.

pub mod session;

pub use session::{Session, SessionData};
