//! Money helpers using decimal arithmetic.
//!
//! Prices are stored as `rust_decimal::Decimal` in the store's single currency
//! and serialized as strings (`"19.99"`) so no precision is lost in JSON.

use rust_decimal::Decimal;

/// Total for a line of `quantity` units at `unit_price`.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Format an amount for display, rounded to cents (e.g. `$19.90`).
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(Decimal::new(100, 0), 5), Decimal::new(500, 0));
        assert_eq!(line_total(Decimal::new(1999, 2), 0), Decimal::ZERO);
    }

    #[test]
    fn test_format_money_pads_cents() {
        assert_eq!(format_money(Decimal::new(199, 1)), "$19.90");
        assert_eq!(format_money(Decimal::new(5, 0)), "$5.00");
    }
}
