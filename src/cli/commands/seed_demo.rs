use anyhow::{Result, bail};
use chrono::{Days, NaiveDate, Utc};
use model::entities::{
    budget::{self, BudgetPeriod},
    category::{self, EntryType},
    prelude::*,
    transaction::{self, NewTransaction},
};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, TransactionTrait};
use tracing::{debug, info, trace, warn};

use crate::config::{connect, prepare_database};

/// Days of history generated, ending today.
const HISTORY_DAYS: u64 = 90;
/// Total number of generated transactions.
const TRANSACTION_COUNT: usize = 60;
/// Salary and rent each land once a month for three months.
const FIXED_MONTHS: u64 = 3;

const SALARY_AMOUNT: i64 = 55_000;
const RENT_AMOUNT: i64 = 18_000;
const DEFAULT_BUDGET: i64 = 5_000;

struct Profile {
    name: &'static str,
    range: (i64, i64),
    descriptions: &'static [&'static str],
}

const INCOME_PROFILES: &[Profile] = &[
    Profile {
        name: "Salary",
        range: (30_000, 80_000),
        descriptions: &["Monthly salary", "Salary payment", "Paycheck deposit"],
    },
    Profile {
        name: "Freelance",
        range: (5_000, 25_000),
        descriptions: &["Web development project", "Design work", "Consulting fee", "Contract work"],
    },
    Profile {
        name: "Investment",
        range: (1_000, 10_000),
        descriptions: &["Dividend payment", "Stock sale", "Interest income", "Mutual fund returns"],
    },
    Profile {
        name: "Gift",
        range: (500, 5_000),
        descriptions: &["Birthday gift", "Holiday bonus", "Cash gift"],
    },
    Profile {
        name: "Other Income",
        range: (100, 3_000),
        descriptions: &["Refund received", "Cashback", "Side hustle"],
    },
];

const EXPENSE_PROFILES: &[Profile] = &[
    Profile {
        name: "Food & Dining",
        range: (100, 3_000),
        descriptions: &["Grocery shopping", "Restaurant dinner", "Coffee shop", "Fast food", "Food delivery"],
    },
    Profile {
        name: "Transportation",
        range: (200, 2_000),
        descriptions: &["Fuel", "Bus fare", "Metro ticket", "Taxi ride", "Car maintenance"],
    },
    Profile {
        name: "Utilities",
        range: (500, 3_000),
        descriptions: &["Electricity bill", "Water bill", "Internet bill", "Phone bill", "Gas bill"],
    },
    Profile {
        name: "Rent",
        range: (8_000, 25_000),
        descriptions: &["Monthly rent", "Rent payment"],
    },
    Profile {
        name: "Entertainment",
        range: (200, 2_000),
        descriptions: &["Movie tickets", "Streaming subscription", "Concert tickets", "Gaming"],
    },
    Profile {
        name: "Shopping",
        range: (500, 5_000),
        descriptions: &["Clothes shopping", "Electronics", "Home decor", "Online purchase"],
    },
    Profile {
        name: "Healthcare",
        range: (200, 5_000),
        descriptions: &["Doctor visit", "Medicine", "Health checkup", "Pharmacy"],
    },
    Profile {
        name: "Education",
        range: (500, 10_000),
        descriptions: &["Online course", "Books", "Tuition fee", "Workshop"],
    },
    Profile {
        name: "Travel",
        range: (2_000, 20_000),
        descriptions: &["Flight tickets", "Hotel booking", "Vacation expenses"],
    },
    Profile {
        name: "Other Expense",
        range: (100, 1_000),
        descriptions: &["Miscellaneous", "ATM withdrawal", "Bank fees"],
    },
];

const BUDGET_AMOUNTS: &[(&str, i64)] = &[
    ("Food & Dining", 8_000),
    ("Transportation", 3_000),
    ("Utilities", 5_000),
    ("Rent", 25_000),
    ("Entertainment", 3_000),
    ("Shopping", 5_000),
    ("Healthcare", 3_000),
    ("Education", 5_000),
    ("Travel", 10_000),
    ("Other Expense", 2_000),
];

fn profile_for(kind: &EntryType, name: &str) -> Option<&'static Profile> {
    let profiles = match kind {
        EntryType::Income => INCOME_PROFILES,
        EntryType::Expense => EXPENSE_PROFILES,
    };
    profiles.iter().find(|p| p.name == name)
}

fn budget_amount_for(name: &str) -> Decimal {
    let amount = BUDGET_AMOUNTS
        .iter()
        .find(|(budget_name, _)| *budget_name == name)
        .map_or(DEFAULT_BUDGET, |(_, amount)| *amount);
    Decimal::from(amount)
}

/// Builds the sample history for `categories`, ending at `today`.
///
/// The output only depends on its inputs, so repeated seeding of an empty
/// database gives identical data.
pub fn demo_transactions(today: NaiveDate, categories: &[category::Model]) -> Vec<NewTransaction> {
    let start = today - Days::new(HISTORY_DAYS);
    let income: Vec<&category::Model> = categories
        .iter()
        .filter(|c| c.kind == EntryType::Income)
        .collect();
    let expense: Vec<&category::Model> = categories
        .iter()
        .filter(|c| c.kind == EntryType::Expense)
        .collect();

    let mut transactions = Vec::with_capacity(TRANSACTION_COUNT);

    let salary = income.iter().find(|c| c.name == "Salary").or(income.first());
    let rent = expense.iter().find(|c| c.name == "Rent").or(expense.first());
    for month in 0..FIXED_MONTHS {
        if let Some(salary) = salary {
            transactions.push(NewTransaction {
                amount: Decimal::from(SALARY_AMOUNT),
                kind: EntryType::Income,
                description: Some("Monthly salary".to_string()),
                transaction_date: start + Days::new(month * 30 + 1),
                category_id: salary.id,
            });
        }
        if let Some(rent) = rent {
            transactions.push(NewTransaction {
                amount: Decimal::from(RENT_AMOUNT),
                kind: EntryType::Expense,
                description: Some("Monthly rent".to_string()),
                transaction_date: start + Days::new(month * 30 + 5),
                category_id: rent.id,
            });
        }
    }

    if income.is_empty() && expense.is_empty() {
        return transactions;
    }

    let mut i = 0usize;
    while transactions.len() < TRANSACTION_COUNT {
        // Three in ten entries are income when both kinds exist.
        let wants_income = i % 10 < 3;
        let (pool, kind) = if (wants_income && !income.is_empty()) || expense.is_empty() {
            (&income, EntryType::Income)
        } else {
            (&expense, EntryType::Expense)
        };
        let category = pool[(i * 7 + i / 10) % pool.len()];

        let (range, description) = match profile_for(&kind, &category.name) {
            Some(profile) => (
                profile.range,
                profile.descriptions[i % profile.descriptions.len()].to_string(),
            ),
            None => match kind {
                EntryType::Income => ((1_000, 10_000), "Income".to_string()),
                EntryType::Expense => ((100, 1_000), "Expense".to_string()),
            },
        };
        let (lo, hi) = range;
        let span_cents = (hi - lo) * 100;
        let cents = lo * 100 + (i as i64 * 791_903) % span_cents;

        transactions.push(NewTransaction {
            amount: Decimal::new(cents, 2),
            kind,
            description: Some(description),
            transaction_date: start + Days::new((i as u64 * 37) % (HISTORY_DAYS + 1)),
            category_id: category.id,
        });
        i += 1;
    }

    transactions
}

async fn clear_existing(db: &DatabaseConnection) -> Result<()> {
    let txn = db.begin().await?;
    let budgets = Budget::delete_many().exec(&txn).await?;
    let transactions = Transaction::delete_many().exec(&txn).await?;
    let categories = Category::delete_many().exec(&txn).await?;
    txn.commit().await?;
    info!(
        "Cleared {} budgets, {} transactions and {} categories",
        budgets.rows_affected, transactions.rows_affected, categories.rows_affected
    );
    Ok(())
}

/// Populates `db` with sample data. Returns the number of transactions written.
pub async fn seed_into(db: &DatabaseConnection, today: NaiveDate, force: bool) -> Result<usize> {
    trace!("Entering seed_into function");
    prepare_database(db).await?;

    let existing = Transaction::find().count(db).await?;
    if existing > 0 {
        if !force {
            warn!("Database already holds {} transactions", existing);
            bail!(
                "Database already has {} transactions; rerun with --force to clear and reseed",
                existing
            );
        }
        clear_existing(db).await?;
        prepare_database(db).await?;
    }

    let categories = category::list(db).await?;
    debug!("Seeding against {} categories", categories.len());

    let samples = demo_transactions(today, &categories);
    let count = samples.len();
    for sample in samples {
        transaction::create(db, sample).await?;
    }
    info!("Created {} sample transactions", count);

    let mut budgets = 0;
    for category in categories.iter().filter(|c| c.kind == EntryType::Expense) {
        budget::create_or_update(
            db,
            category.id,
            budget_amount_for(&category.name),
            BudgetPeriod::Monthly,
        )
        .await?;
        budgets += 1;
    }
    info!("Created {} sample budgets", budgets);

    Ok(count)
}

pub async fn seed_demo(database_url: &str, force: bool) -> Result<()> {
    info!("Seeding demo data");
    debug!("Database URL: {}", database_url);

    let db = connect(database_url).await?;
    let count = seed_into(&db, Utc::now().date_naive(), force).await?;

    info!("Demo data ready: {} transactions", count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn default_categories() -> Vec<category::Model> {
        category::DEFAULT_CATEGORIES
            .iter()
            .enumerate()
            .map(|(i, (name, kind))| category::Model {
                id: i as i32 + 1,
                name: name.to_string(),
                kind: *kind,
                created_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn test_demo_transactions_shape() {
        let today = date(2024, 6, 30);
        let categories = default_categories();
        let samples = demo_transactions(today, &categories);

        assert_eq!(samples.len(), TRANSACTION_COUNT);
        let start = today - Days::new(HISTORY_DAYS);
        for sample in &samples {
            assert!(sample.amount > Decimal::ZERO);
            assert!(sample.transaction_date >= start && sample.transaction_date <= today);
            let category = categories.iter().find(|c| c.id == sample.category_id).unwrap();
            assert_eq!(category.kind, sample.kind);
        }

        let salaries = samples
            .iter()
            .filter(|s| s.description.as_deref() == Some("Monthly salary") && s.category_id == 1)
            .count();
        assert!(salaries >= 3);
        let incomes = samples.iter().filter(|s| s.kind == EntryType::Income).count();
        assert!(incomes > 6 && incomes < 30);
    }

    #[test]
    fn test_demo_transactions_are_deterministic() {
        let categories = default_categories();
        let first = demo_transactions(date(2024, 3, 1), &categories);
        let second = demo_transactions(date(2024, 3, 1), &categories);
        let key = |t: &NewTransaction| (t.amount, t.transaction_date, t.category_id);
        assert_eq!(
            first.iter().map(key).collect::<Vec<_>>(),
            second.iter().map(key).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_demo_transactions_without_categories() {
        assert!(demo_transactions(date(2024, 3, 1), &[]).is_empty());
    }

    #[test]
    fn test_budget_amount_table() {
        assert_eq!(budget_amount_for("Rent"), Decimal::from(25_000));
        assert_eq!(budget_amount_for("Pets"), Decimal::from(DEFAULT_BUDGET));
    }

    #[tokio::test]
    async fn test_seed_into_refuses_then_forces() {
        let db = setup_test_db().await;
        let today = date(2024, 6, 30);

        let count = seed_into(&db, today, false).await.unwrap();
        assert_eq!(count, TRANSACTION_COUNT);
        assert_eq!(Transaction::find().count(&db).await.unwrap(), 60);
        assert_eq!(Budget::find().count(&db).await.unwrap(), 10);
        assert_eq!(Category::find().count(&db).await.unwrap(), 15);

        assert!(seed_into(&db, today, false).await.is_err());
        assert_eq!(Transaction::find().count(&db).await.unwrap(), 60);

        seed_into(&db, today, true).await.unwrap();
        assert_eq!(Transaction::find().count(&db).await.unwrap(), 60);
        assert_eq!(Budget::find().count(&db).await.unwrap(), 10);
        assert_eq!(Category::find().count(&db).await.unwrap(), 15);
    }
}
