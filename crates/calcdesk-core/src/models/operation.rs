use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Arithmetic operations supported by the calculator service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Modulo,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
        Operation::Power,
        Operation::Modulo,
    ];

    /// Wire name used by the API
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
            Operation::Power => "power",
            Operation::Modulo => "modulo",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "×",
            Operation::Divide => "÷",
            Operation::Power => "^",
            Operation::Modulo => "%",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Operation::Add => "Addition",
            Operation::Subtract => "Subtraction",
            Operation::Multiply => "Multiplication",
            Operation::Divide => "Division",
            Operation::Power => "Power",
            Operation::Modulo => "Modulo",
        }
    }

    /// Operations whose second operand must not be zero
    pub fn rejects_zero_divisor(&self) -> bool {
        matches!(self, Operation::Divide | Operation::Modulo)
    }

    /// Get the next operation (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Operation::Add => Operation::Subtract,
            Operation::Subtract => Operation::Multiply,
            Operation::Multiply => Operation::Divide,
            Operation::Divide => Operation::Power,
            Operation::Power => Operation::Modulo,
            Operation::Modulo => Operation::Add,
        }
    }

    /// Get the previous operation (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Operation::Add => Operation::Modulo,
            Operation::Subtract => Operation::Add,
            Operation::Multiply => Operation::Subtract,
            Operation::Divide => Operation::Multiply,
            Operation::Power => Operation::Divide,
            Operation::Modulo => Operation::Power,
        }
    }

    /// Display name for a raw operation key, falling back to the key itself.
    pub fn name_for(key: &str) -> String {
        key.parse::<Operation>()
            .map(|op| op.display_name().to_string())
            .unwrap_or_else(|_| key.to_string())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown operation: {0}")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    /// Accepts the wire name (case-insensitive) or a common symbol.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "add" | "+" | "plus" => Ok(Operation::Add),
            "subtract" | "-" | "minus" => Ok(Operation::Subtract),
            "multiply" | "*" | "x" | "×" | "times" => Ok(Operation::Multiply),
            "divide" | "/" | "÷" => Ok(Operation::Divide),
            "power" | "^" | "**" | "pow" => Ok(Operation::Power),
            "modulo" | "%" | "mod" => Ok(Operation::Modulo),
            _ => Err(UnknownOperation(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_names_and_symbols() {
        assert_eq!("add".parse::<Operation>(), Ok(Operation::Add));
        assert_eq!("MULTIPLY".parse::<Operation>(), Ok(Operation::Multiply));
        assert_eq!("×".parse::<Operation>(), Ok(Operation::Multiply));
        assert_eq!("x".parse::<Operation>(), Ok(Operation::Multiply));
        assert_eq!("÷".parse::<Operation>(), Ok(Operation::Divide));
        assert_eq!("^".parse::<Operation>(), Ok(Operation::Power));
        assert_eq!(" % ".parse::<Operation>(), Ok(Operation::Modulo));
        assert!("sqrt".parse::<Operation>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Operation::Modulo).unwrap();
        assert_eq!(json, "\"modulo\"");
        let op: Operation = serde_json::from_str("\"power\"").unwrap();
        assert_eq!(op, Operation::Power);
    }

    #[test]
    fn test_name_for_unknown_key() {
        assert_eq!(Operation::name_for("divide"), "Division");
        assert_eq!(Operation::name_for("sqrt"), "sqrt");
    }

    #[test]
    fn test_rejects_zero_divisor() {
        assert!(Operation::Divide.rejects_zero_divisor());
        assert!(Operation::Modulo.rejects_zero_divisor());
        assert!(!Operation::Power.rejects_zero_divisor());
        assert!(!Operation::Add.rejects_zero_divisor());
    }

    #[test]
    fn test_next_prev_cycle() {
        for op in Operation::ALL {
            assert_eq!(op.next().prev(), op);
        }
        assert_eq!(Operation::Modulo.next(), Operation::Add);
        assert_eq!(Operation::Add.prev(), Operation::Modulo);
    }
}
