//! Client-side request validation.
//!
//! These checks mirror the service's schema constraints so that a request
//! the server would reject never leaves the client.

use thiserror::Error;

use crate::models::Operation;

pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 50;
pub const PASSWORD_MIN_LENGTH: usize = 6;
pub const PASSWORD_MAX_LENGTH: usize = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be between {min} and {max} characters")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
    },

    #[error("Invalid email address")]
    Email,

    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    #[error("Cannot divide by zero")]
    DivideByZero,

    #[error("Cannot perform modulo by zero")]
    ModuloByZero,
}

pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

/// Length is counted in characters, not bytes.
pub fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationError::Length { field, min, max });
    }
    Ok(())
}

pub fn check_username(username: &str) -> Result<(), ValidationError> {
    check_length("Username", username, USERNAME_MIN_LENGTH, USERNAME_MAX_LENGTH)
}

pub fn check_password(field: &'static str, password: &str) -> Result<(), ValidationError> {
    check_length(field, password, PASSWORD_MIN_LENGTH, PASSWORD_MAX_LENGTH)
}

/// Shape check only: `local@domain.tld`, no whitespace.
pub fn check_email(email: &str) -> Result<(), ValidationError> {
    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::Email);
    }
    let (local, domain) = email.split_once('@').ok_or(ValidationError::Email)?;
    if local.is_empty() || domain.contains('@') {
        return Err(ValidationError::Email);
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(ValidationError::Email);
    }
    Ok(())
}

pub fn check_operand(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite(field));
    }
    Ok(())
}

pub fn check_divisor(operation: Operation, operand2: f64) -> Result<(), ValidationError> {
    if operand2 != 0.0 || !operation.rejects_zero_divisor() {
        return Ok(());
    }
    match operation {
        Operation::Divide => Err(ValidationError::DivideByZero),
        _ => Err(ValidationError::ModuloByZero),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_length_counts_chars() {
        assert!(check_username("abc").is_ok());
        assert!(check_username("ab").is_err());
        assert!(check_username(&"a".repeat(50)).is_ok());
        assert!(check_username(&"a".repeat(51)).is_err());
        // Three multi-byte chars are still three characters
        assert!(check_username("äöü").is_ok());
    }

    #[test]
    fn test_length_error_message() {
        let err = check_password("Password", "12345").unwrap_err();
        assert_eq!(err.to_string(), "Password must be between 6 and 100 characters");
    }

    #[test]
    fn test_check_email() {
        assert!(check_email("user@example.com").is_ok());
        assert!(check_email("first.last@mail.example.org").is_ok());

        assert!(check_email("").is_err());
        assert!(check_email("user").is_err());
        assert!(check_email("@example.com").is_err());
        assert!(check_email("user@example").is_err());
        assert!(check_email("user@.com").is_err());
        assert!(check_email("user@example.").is_err());
        assert!(check_email("us er@example.com").is_err());
        assert!(check_email("a@b@example.com").is_err());
    }

    #[test]
    fn test_check_divisor() {
        assert_eq!(check_divisor(Operation::Divide, 0.0), Err(ValidationError::DivideByZero));
        assert_eq!(check_divisor(Operation::Modulo, -0.0), Err(ValidationError::ModuloByZero));
        assert!(check_divisor(Operation::Divide, 2.0).is_ok());
        assert!(check_divisor(Operation::Multiply, 0.0).is_ok());
        for op in Operation::ALL {
            assert_eq!(check_divisor(op, 0.0).is_err(), op.rejects_zero_divisor());
        }
        assert_eq!(
            ValidationError::DivideByZero.to_string(),
            "Cannot divide by zero"
        );
    }

    #[test]
    fn test_check_operand() {
        assert!(check_operand("First operand", 1.5).is_ok());
        assert!(check_operand("First operand", f64::NAN).is_err());
        assert!(check_operand("First operand", f64::INFINITY).is_err());
    }
}
