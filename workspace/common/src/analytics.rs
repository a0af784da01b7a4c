use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Income and expense totals over a date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expenses: Decimal,
    /// Income minus expenses
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub transaction_count: u64,
}

/// Spending or earning per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryBreakdown {
    pub category_id: i32,
    pub category_name: String,
    /// INCOME or EXPENSE
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub transaction_count: u64,
}

/// Totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyTrend {
    /// English month name
    pub month: String,
    pub year: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub expenses: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

/// All-time balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expenses: Decimal,
}

/// A budget together with what has been spent against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BudgetStatus {
    pub budget_id: i32,
    pub category_id: i32,
    pub category_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub budget_amount: Decimal,
    /// MONTHLY, WEEKLY or YEARLY
    pub period: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub spent_amount: Decimal,
    /// Negative when over budget
    #[serde(with = "rust_decimal::serde::float")]
    pub remaining: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage_used: Decimal,
    pub is_over_budget: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_money_serializes_as_number() {
        let summary = SummaryResponse {
            total_income: Decimal::new(150050, 2),
            total_expenses: Decimal::new(25, 1),
            balance: Decimal::new(149800, 2),
            transaction_count: 3,
        };
        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            json!({
                "total_income": 1500.5,
                "total_expenses": 2.5,
                "balance": 1498.0,
                "transaction_count": 3
            })
        );
    }

    #[test]
    fn test_breakdown_uses_type_key() {
        let breakdown = CategoryBreakdown {
            category_id: 4,
            category_name: "Rent".to_string(),
            kind: "EXPENSE".to_string(),
            total_amount: Decimal::new(1200, 0),
            transaction_count: 1,
        };
        let value = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(value["type"], "EXPENSE");
        assert!(value.get("kind").is_none());
    }
}
