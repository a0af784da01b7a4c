use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use model::entities::category::{self, EntryType};
use model::entities::transaction::{self, NewTransaction};
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};

pub(crate) async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None).await.expect("Migrations failed.");
    db
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) async fn add_category(
    db: &DatabaseConnection,
    name: &str,
    kind: EntryType,
) -> category::Model {
    category::create(db, name, kind).await.unwrap()
}

/// Records a transaction; `amount` is in cents.
pub(crate) async fn add_transaction(
    db: &DatabaseConnection,
    cents: i64,
    kind: EntryType,
    date: NaiveDate,
    category_id: i32,
) -> transaction::Model {
    transaction::create(
        db,
        NewTransaction {
            amount: Decimal::new(cents, 2),
            kind,
            description: None,
            transaction_date: date,
            category_id,
        },
    )
    .await
    .unwrap()
}
