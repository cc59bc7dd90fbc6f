//! Utility functions for display formatting and input parsing.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_timestamp, parse_operand, truncate_string};
