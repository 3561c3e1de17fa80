//! Percentage discounts on integer prices.

use crate::error::{Result, ServerError};

/// Apply `percent` off `price`, truncating the discount amount.
///
/// `percent` must lie in `0..=100`; `price` must not be negative.
pub fn apply_discount(price: i64, percent: i64) -> Result<i64> {
    if !(0..=100).contains(&percent) {
        return Err(ServerError::OutOfRange(percent));
    }
    if price < 0 {
        return Err(ServerError::Validation(format!("price must not be negative, got {}", price)));
    }

    // i128 keeps price * percent from overflowing for large prices
    let discount = (price as i128 * percent as i128 / 100) as i64;
    Ok(price - discount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_discount() {
        assert_eq!(apply_discount(100, 10).unwrap(), 90);
        assert_eq!(apply_discount(200, 50).unwrap(), 100);
        assert_eq!(apply_discount(150, 0).unwrap(), 150);
        assert_eq!(apply_discount(150, 100).unwrap(), 0);
    }

    #[test]
    fn test_calculate_discount_truncates() {
        // 33% of 10 is 3.3, truncated to 3
        assert_eq!(apply_discount(10, 33).unwrap(), 7);
        assert_eq!(apply_discount(i64::MAX, 50).unwrap(), i64::MAX - i64::MAX / 2);
    }

    #[test]
    fn test_calculate_discount_invalid() {
        assert!(matches!(apply_discount(100, -10), Err(ServerError::OutOfRange(-10))));
        assert!(matches!(apply_discount(100, 110), Err(ServerError::OutOfRange(110))));
        assert!(matches!(apply_discount(-1, 10), Err(ServerError::Validation(_))));
    }
}
