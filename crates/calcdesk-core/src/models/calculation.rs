use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationError};

use super::{timestamp, Operation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub id: i64,
    pub user_id: i64,
    pub operation: Operation,
    pub operand1: f64,
    pub operand2: f64,
    pub result: f64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Calculation {
    /// Expression without the result, e.g. `6 ÷ 3`
    pub fn expression(&self) -> String {
        format!("{} {} {}", self.operand1, self.operation.symbol(), self.operand2)
    }

    /// Full equation, e.g. `6 ÷ 3 = 2`
    pub fn equation(&self) -> String {
        format!("{} = {}", self.expression(), self.result)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCalculation {
    pub operation: Operation,
    pub operand1: f64,
    pub operand2: f64,
}

impl NewCalculation {
    pub fn new(operand1: f64, operation: Operation, operand2: f64) -> Self {
        Self {
            operation,
            operand1,
            operand2,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::check_operand("First operand", self.operand1)?;
        validation::check_operand("Second operand", self.operand2)?;
        validation::check_divisor(self.operation, self.operand2)
    }
}

/// Partial edit of a stored calculation; the server recomputes the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalculationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operand1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operand2: Option<f64>,
}

impl CalculationUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(a) = self.operand1 {
            validation::check_operand("First operand", a)?;
        }
        if let Some(b) = self.operand2 {
            validation::check_operand("Second operand", b)?;
            if let Some(op) = self.operation {
                validation::check_divisor(op, b)?;
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.operation.is_none() && self.operand1.is_none() && self.operand2.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Calculation {
        serde_json::from_str(
            r#"{
                "id": 3,
                "user_id": 1,
                "operation": "divide",
                "operand1": 6.0,
                "operand2": 4.0,
                "result": 1.5,
                "created_at": "2024-05-06T07:08:09Z"
            }"#,
        )
        .expect("Failed to parse calculation JSON")
    }

    #[test]
    fn test_equation_formatting() {
        let calc = sample();
        assert_eq!(calc.expression(), "6 ÷ 4");
        assert_eq!(calc.equation(), "6 ÷ 4 = 1.5");
    }

    #[test]
    fn test_new_calculation_rejects_zero_divisor() {
        let calc = NewCalculation::new(1.0, Operation::Modulo, 0.0);
        assert_eq!(calc.validate(), Err(ValidationError::ModuloByZero));
        assert!(NewCalculation::new(1.0, Operation::Subtract, 0.0).validate().is_ok());
    }

    #[test]
    fn test_new_calculation_serializes_wire_shape() {
        let calc = NewCalculation::new(2.0, Operation::Power, 8.0);
        let json = serde_json::to_value(&calc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "operation": "power", "operand1": 2.0, "operand2": 8.0 })
        );
    }

    #[test]
    fn test_update_checks_divisor_only_with_operation() {
        let update = CalculationUpdate {
            operand2: Some(0.0),
            ..Default::default()
        };
        assert!(update.validate().is_ok());

        let update = CalculationUpdate {
            operation: Some(Operation::Divide),
            operand2: Some(0.0),
            ..Default::default()
        };
        assert_eq!(update.validate(), Err(ValidationError::DivideByZero));
        assert!(CalculationUpdate::default().is_empty());
    }
}
