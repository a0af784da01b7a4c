use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use migration::{Migrator, MigratorTrait};
use model::entities::category;
use sea_orm::{Database, DatabaseConnection};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::auth::AuthKeys;
use crate::router::create_router;
use crate::schemas::AppState;

pub const TEST_SECRET: &str = "test-secret-key-for-the-integration-suite";

/// Create an in-memory SQLite database for testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level comes from RUST_LOG and defaults to WARN.
fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// AppState over `db` with a fixed signing secret and a one hour token lifetime
pub fn test_state(db: DatabaseConnection) -> AppState {
    AppState {
        db,
        auth: Arc::new(AuthKeys::new(TEST_SECRET, chrono::Duration::minutes(60))),
    }
}

/// Migrated database with the default categories already inserted
pub async fn setup_test_app_state() -> AppState {
    let db = setup_test_db().await;
    category::seed_defaults(&db)
        .await
        .expect("Failed to seed default categories");
    test_state(db)
}

/// Create axum app for testing
pub async fn setup_test_app() -> Router {
    let _guard = init_test_tracing();
    create_router(setup_test_app_state().await)
}

pub async fn setup_test_server() -> TestServer {
    TestServer::new(setup_test_app().await).expect("Failed to start test server")
}
