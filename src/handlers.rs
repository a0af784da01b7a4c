pub mod analytics;
pub mod auth;
pub mod budgets;
pub mod categories;
pub mod health;
pub mod root;
pub mod transactions;
