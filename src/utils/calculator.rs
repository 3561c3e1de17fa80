//! Binary arithmetic over two numbers and an operator symbol.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ServerError};

/// Supported operators. Multiplication is spelled `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "x",
            Operator::Divide => "/",
        }
    }

    pub fn apply(self, a: f64, b: f64) -> Result<f64> {
        match self {
            Operator::Add => Ok(a + b),
            Operator::Subtract => Ok(a - b),
            Operator::Multiply => Ok(a * b),
            Operator::Divide => {
                if b == 0.0 {
                    return Err(ServerError::DivisionByZero);
                }
                Ok(a / b)
            }
        }
    }
}

impl FromStr for Operator {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "x" => Ok(Operator::Multiply),
            "/" => Ok(Operator::Divide),
            other => Err(ServerError::InvalidOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Evaluate `a <op> b`.
pub fn calculate(a: f64, b: f64, op: &str) -> Result<f64> {
    op.parse::<Operator>()?.apply(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addition() {
        assert_eq!(calculate(1.0, 2.0, "+").unwrap(), 3.0);
        assert_eq!(calculate(-1.0, -1.0, "+").unwrap(), -2.0);
        assert_eq!(calculate(0.0, 5.0, "+").unwrap(), 5.0);
    }

    #[test]
    fn test_subtraction() {
        assert_eq!(calculate(5.0, 3.0, "-").unwrap(), 2.0);
        assert_eq!(calculate(-1.0, -1.0, "-").unwrap(), 0.0);
        assert_eq!(calculate(0.0, 5.0, "-").unwrap(), -5.0);
    }

    #[test]
    fn test_multiplication() {
        assert_eq!(calculate(3.0, 4.0, "x").unwrap(), 12.0);
        assert_eq!(calculate(-1.0, 5.0, "x").unwrap(), -5.0);
        assert_eq!(calculate(0.0, 5.0, "x").unwrap(), 0.0);
    }

    #[test]
    fn test_division() {
        assert_eq!(calculate(10.0, 2.0, "/").unwrap(), 5.0);
        assert_eq!(calculate(-10.0, 2.0, "/").unwrap(), -5.0);
        assert_eq!(calculate(0.0, 1.0, "/").unwrap(), 0.0);
    }

    #[test]
    fn test_division_by_zero() {
        for a in [10.0, 0.0, -3.5] {
            let err = calculate(a, 0.0, "/").unwrap_err();
            assert!(matches!(err, ServerError::DivisionByZero));
            assert_eq!(err.to_string(), "Cannot divide by zero");
        }
    }

    #[test]
    fn test_invalid_operator() {
        let err = calculate(10.0, 5.0, "%").unwrap_err();
        assert!(matches!(err, ServerError::InvalidOperator(ref op) if op == "%"));
        assert_eq!(err.to_string(), "Invalid operator");
        // `*` is not an alias for `x`
        assert!(calculate(2.0, 3.0, "*").is_err());
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(Operator::Multiply.to_string(), "x");
        assert_eq!("/".parse::<Operator>().unwrap(), Operator::Divide);
    }
}
