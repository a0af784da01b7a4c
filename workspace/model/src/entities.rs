//! This file serves as the root for all SeaORM entity modules.
//! Each module holds the entity definition together with the domain
//! operations performed on it.

pub mod budget;
pub mod category;
pub mod transaction;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::budget::Entity as Budget;
    pub use super::category::Entity as Category;
    pub use super::transaction::Entity as Transaction;
    pub use super::user::Entity as User;
}
