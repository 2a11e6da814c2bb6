//! Plain business records, kept separate from the store infrastructure.

pub mod customer;
pub mod invoice;
pub mod order;
pub mod product;
pub mod shipping;

pub use customer::*;
pub use invoice::*;
pub use order::*;
pub use product::*;
pub use shipping::*;

use rust_decimal::Decimal;
use thiserror::Error;

/// A field failed validation before reaching any store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct InvalidInput(pub String);

/// Returns the trimmed value, or an error naming the blank field.
pub fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, InvalidInput> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InvalidInput(format!("{field} is required")));
    }
    Ok(trimmed)
}

pub fn require_non_negative(field: &str, amount: Decimal) -> Result<Decimal, InvalidInput> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(InvalidInput(format!("{field} must not be negative, got {amount}")));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("name", "  Lina ").unwrap(), "Lina");
        assert_eq!(
            require_text("address", " \t").unwrap_err(),
            InvalidInput("address is required".into())
        );
    }

    #[test]
    fn test_require_non_negative() {
        assert_eq!(require_non_negative("price", dec!(0)).unwrap(), dec!(0));
        assert_eq!(require_non_negative("price", dec!(400)).unwrap(), dec!(400));
        assert!(require_non_negative("price", dec!(-1)).is_err());
    }
}
