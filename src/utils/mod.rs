//! Small pure helpers: arithmetic, password strength and price discounts.

pub mod calculator;
pub mod discount;
pub mod password;

pub use calculator::{calculate, Operator};
pub use discount::apply_discount;
pub use password::is_valid_password;
