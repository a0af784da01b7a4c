//! Common transport-layer types shared between the analytics engine and the
//! HTTP layer. Monetary values serialize as JSON numbers, already rounded.

mod analytics;
mod dates;

pub use analytics::{BalanceResponse, BudgetStatus, CategoryBreakdown, MonthlyTrend, SummaryResponse};
pub use dates::{DateRange, month_bounds, month_name};

use rust_decimal::Decimal;

/// Rounds a monetary value to cents using banker's rounding.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_uses_bankers_rounding() {
        assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1234, 2));
        assert_eq!(round_money(Decimal::new(12355, 3)), Decimal::new(1236, 2));
        assert_eq!(round_money(Decimal::new(100, 0)), Decimal::new(100, 0));
    }
}
