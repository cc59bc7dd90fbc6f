//! Data models for the calculator service.
//!
//! This module contains the wire types exchanged with the REST API:
//!
//! - `Operation`: The six arithmetic operations and their display forms
//! - `User`, `NewUser`, `UserUpdate`, `PasswordChange`: Account types
//! - `LoginRequest`, `TokenResponse`: Authentication exchange
//! - `Calculation`, `NewCalculation`, `CalculationUpdate`: History entries
//! - `UserStatistics`: Aggregates over the user's history

pub mod calculation;
pub mod operation;
pub mod statistics;
pub mod user;

use serde::{Deserialize, Serialize};

pub use calculation::{Calculation, CalculationUpdate, NewCalculation};
pub use operation::{Operation, UnknownOperation};
pub use statistics::UserStatistics;
pub use user::{LoginRequest, NewUser, PasswordChange, TokenResponse, User, UserUpdate};

/// Plain acknowledgement returned by mutating endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

/// Timestamps arrive either as RFC 3339 or as naive ISO-8601 (taken as UTC).
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_formats() {
            assert!(parse("2024-01-02T03:04:05Z").is_some());
            assert!(parse("2024-01-02T03:04:05+02:00").is_some());
            assert!(parse("2024-01-02T03:04:05").is_some());
            assert!(parse("2024-01-02T03:04:05.678901").is_some());
            assert!(parse("yesterday").is_none());
        }

        #[test]
        fn test_offset_is_normalized_to_utc() {
            let dt = parse("2024-01-02T03:04:05+02:00").unwrap();
            assert_eq!(dt.to_rfc3339(), "2024-01-02T01:04:05+00:00");
        }
    }
}
